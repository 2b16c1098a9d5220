//! Forage: a sequential forum thread harvester
//!
//! This crate walks a three-level forum hierarchy (categories, threads,
//! paginated posts) on a client-side-rendered site, accumulating one typed
//! record per thread and persisting progress incrementally so long runs
//! survive failures.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Forage operations
#[derive(Debug, Error)]
pub enum ForageError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Retries exhausted: {0}")]
    Retry(#[from] crawler::RetryError),

    #[error("Snapshot error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors crossing the browser/fetch boundary
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Timed out after {timeout_ms}ms waiting for '{selector}'")]
    MarkupTimeout { selector: String, timeout_ms: u64 },

    #[error("Browser session error: {0}")]
    Session(String),

    #[error("Failed to launch browser: {0}")]
    Launch(String),
}

/// Result type alias for Forage operations
pub type Result<T> = std::result::Result<T, ForageError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Orchestrator, RetryPolicy};
pub use state::{Category, CrawlState, Post, ThreadRecord, ThreadSummary};
