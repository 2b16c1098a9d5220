use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Forage
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub forum: ForumConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target forum configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ForumConfig {
    /// Root listing URL where categories are discovered
    #[serde(rename = "root-url")]
    pub root_url: String,
}

/// Traversal and pacing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum attempts per network operation
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base unit for the linear retry backoff (milliseconds)
    #[serde(rename = "retry-base-delay-ms", default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// How many listing pages to visit per category
    #[serde(
        rename = "listing-pages-per-category",
        default = "default_listing_pages"
    )]
    pub listing_pages_per_category: u32,

    /// Bound on page navigation (milliseconds)
    #[serde(
        rename = "navigation-timeout-ms",
        default = "default_navigation_timeout_ms"
    )]
    pub navigation_timeout_ms: u64,

    /// Bound on waiting for the post container markup (milliseconds)
    #[serde(rename = "markup-timeout-ms", default = "default_markup_timeout_ms")]
    pub markup_timeout_ms: u64,

    /// Pacing delay between consecutive pages of one thread (milliseconds)
    #[serde(rename = "page-pacing-ms", default = "default_page_pacing_ms")]
    pub page_pacing_ms: u64,

    /// Pacing delay between listing pages of one category (milliseconds)
    #[serde(rename = "listing-pacing-ms", default = "default_listing_pacing_ms")]
    pub listing_pacing_ms: u64,

    /// Base pacing delay after every processed thread (milliseconds)
    #[serde(rename = "thread-pacing-ms", default = "default_thread_pacing_ms")]
    pub thread_pacing_ms: u64,

    /// Random jitter added on top of the per-thread pacing (milliseconds)
    #[serde(
        rename = "thread-pacing-jitter-ms",
        default = "default_thread_pacing_jitter_ms"
    )]
    pub thread_pacing_jitter_ms: u64,

    /// Persist a partial snapshot every N processed threads (0 disables)
    #[serde(rename = "checkpoint-every", default = "default_checkpoint_every")]
    pub checkpoint_every: u32,

    /// Recycle the browser every N processed threads (0 disables)
    #[serde(rename = "recycle-every", default = "default_recycle_every")]
    pub recycle_every: u32,
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Viewport width in pixels
    #[serde(rename = "viewport-width", default = "default_viewport_width")]
    pub viewport_width: u32,

    /// Viewport height in pixels
    #[serde(rename = "viewport-height", default = "default_viewport_height")]
    pub viewport_height: u32,

    /// Path to a Chrome/Chromium executable (auto-detected when absent)
    #[serde(rename = "chrome-path", default)]
    pub chrome_path: Option<String>,
}

/// Snapshot output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory snapshot files are written into
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// Snapshot file name prefix
    #[serde(default = "default_output_prefix")]
    pub prefix: String,
}

impl CrawlerConfig {
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn markup_timeout(&self) -> Duration {
        Duration::from_millis(self.markup_timeout_ms)
    }

    pub fn page_pacing(&self) -> Duration {
        Duration::from_millis(self.page_pacing_ms)
    }

    pub fn listing_pacing(&self) -> Duration {
        Duration::from_millis(self.listing_pacing_ms)
    }

    pub fn thread_pacing(&self) -> Duration {
        Duration::from_millis(self.thread_pacing_ms)
    }

    pub fn thread_pacing_jitter(&self) -> Duration {
        Duration::from_millis(self.thread_pacing_jitter_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            listing_pages_per_category: default_listing_pages(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            markup_timeout_ms: default_markup_timeout_ms(),
            page_pacing_ms: default_page_pacing_ms(),
            listing_pacing_ms: default_listing_pacing_ms(),
            thread_pacing_ms: default_thread_pacing_ms(),
            thread_pacing_jitter_ms: default_thread_pacing_jitter_ms(),
            checkpoint_every: default_checkpoint_every(),
            recycle_every: default_recycle_every(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            chrome_path: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            prefix: default_output_prefix(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    5000
}

fn default_listing_pages() -> u32 {
    3
}

fn default_navigation_timeout_ms() -> u64 {
    30_000
}

fn default_markup_timeout_ms() -> u64 {
    10_000
}

fn default_page_pacing_ms() -> u64 {
    2000
}

fn default_listing_pacing_ms() -> u64 {
    3000
}

fn default_thread_pacing_ms() -> u64 {
    2000
}

fn default_thread_pacing_jitter_ms() -> u64 {
    3000
}

fn default_checkpoint_every() -> u32 {
    5
}

fn default_recycle_every() -> u32 {
    10
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    800
}

fn default_output_directory() -> String {
    ".".to_string()
}

fn default_output_prefix() -> String {
    "forum_data".to_string()
}
