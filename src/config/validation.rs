use crate::config::types::{BrowserConfig, Config, CrawlerConfig, ForumConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_forum_config(&config.forum)?;
    validate_crawler_config(&config.crawler)?;
    validate_browser_config(&config.browser)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the target forum configuration
fn validate_forum_config(config: &ForumConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "root-url must use an http(s) scheme, got '{}'",
            url.scheme()
        )));
    }

    Ok(())
}

/// Validates traversal and pacing configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.listing_pages_per_category < 1 {
        return Err(ConfigError::Validation(format!(
            "listing_pages_per_category must be >= 1, got {}",
            config.listing_pages_per_category
        )));
    }

    if config.navigation_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout_ms must be >= 100ms, got {}ms",
            config.navigation_timeout_ms
        )));
    }

    if config.markup_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "markup_timeout_ms must be >= 100ms, got {}ms",
            config.markup_timeout_ms
        )));
    }

    Ok(())
}

/// Validates browser configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.viewport_width < 1 || config.viewport_height < 1 {
        return Err(ConfigError::Validation(format!(
            "viewport dimensions must be >= 1, got {}x{}",
            config.viewport_width, config.viewport_height
        )));
    }

    if let Some(path) = &config.chrome_path {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "chrome_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates snapshot output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.prefix.is_empty() {
        return Err(ConfigError::Validation(
            "output prefix cannot be empty".to_string(),
        ));
    }

    Ok(())
}
