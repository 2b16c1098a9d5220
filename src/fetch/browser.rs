//! Headless-browser fetcher built on chromiumoxide
//!
//! The browser is launched lazily on first use and lives behind a mutex so
//! it can be recycled (discarded and relaunched) mid-run while the crawl
//! holds only a shared reference to the fetcher. Each [`Session`] is one
//! browser tab, giving threads the isolation the walkers rely on.

use crate::config::BrowserConfig;
use crate::fetch::{Fetcher, PageAdvance, RenderedDocument, Session};
use crate::FetchError;
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Interval between element-presence polls in [`BrowserSession::wait_for`]
const MARKUP_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Fetcher backed by a lazily launched headless Chrome/Chromium
pub struct BrowserFetcher {
    config: BrowserConfig,
    browser: Arc<Mutex<Option<Browser>>>,
}

impl BrowserFetcher {
    /// Creates a fetcher; the browser itself launches on first use
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            browser: Arc::new(Mutex::new(None)),
        }
    }

    /// Launches the browser if it is not already running
    async fn ensure_browser(&self) -> Result<(), FetchError> {
        let mut browser_guard = self.browser.lock().await;
        if browser_guard.is_some() {
            return Ok(());
        }

        info!("Launching headless browser");

        let mut config_builder = chromiumoxide::browser::BrowserConfig::builder()
            .window_size(self.config.viewport_width, self.config.viewport_height)
            .no_sandbox()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-extensions")
            .arg("--mute-audio")
            .arg("--hide-scrollbars");

        if let Some(chrome_path) = &self.config.chrome_path {
            config_builder = config_builder.chrome_executable(chrome_path);
        }

        let browser_config = config_builder.build().map_err(FetchError::Launch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        // Drive CDP events in the background for the life of this browser
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {e}");
                }
            }
        });

        *browser_guard = Some(browser);
        info!("Headless browser ready");

        Ok(())
    }
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn session(&self) -> Result<Box<dyn Session>, FetchError> {
        self.ensure_browser().await?;

        let browser_guard = self.browser.lock().await;
        let browser = browser_guard
            .as_ref()
            .ok_or_else(|| FetchError::Session("browser not running".to_string()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Session(format!("failed to open tab: {e}")))?;

        Ok(Box::new(BrowserSession { page }))
    }

    async fn recycle(&self) -> Result<(), FetchError> {
        let mut browser_guard = self.browser.lock().await;
        if let Some(mut browser) = browser_guard.take() {
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser during recycle: {e}");
            }
        }
        // The next session() relaunches lazily
        Ok(())
    }

    async fn shutdown(&self) {
        let mut browser_guard = self.browser.lock().await;
        if let Some(mut browser) = browser_guard.take() {
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser: {e}");
            } else {
                info!("Browser shutdown complete");
            }
        }
    }
}

/// One browser tab
struct BrowserSession {
    page: Page,
}

#[async_trait]
impl Session for BrowserSession {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), FetchError> {
        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };

        match tokio::time::timeout(timeout, load).await {
            Err(_) => Err(FetchError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
            Ok(Err(e)) => Err(FetchError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Ok(Ok(())) => Ok(()),
        }
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), FetchError> {
        let poll = async {
            loop {
                if self.page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(MARKUP_POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| FetchError::MarkupTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
    }

    async fn document(&self) -> Result<RenderedDocument, FetchError> {
        let html = self
            .page
            .content()
            .await
            .map_err(|e| FetchError::Session(format!("failed to read content: {e}")))?;

        let url = self
            .page
            .url()
            .await
            .map_err(|e| FetchError::Session(format!("failed to read url: {e}")))?
            .unwrap_or_default();

        Ok(RenderedDocument { url, html })
    }

    async fn advance(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<PageAdvance, FetchError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| FetchError::Session(format!("'{selector}' not clickable: {e}")))?;

        element
            .click()
            .await
            .map_err(|e| FetchError::Session(format!("click on '{selector}' failed: {e}")))?;

        match tokio::time::timeout(timeout, self.page.wait_for_navigation()).await {
            // Wait expired after the click fired; callers treat this as an advance
            Err(_) => Ok(PageAdvance::TimedOutButTriggered),
            Ok(Err(e)) => Err(FetchError::Navigation {
                url: selector.to_string(),
                message: e.to_string(),
            }),
            Ok(Ok(_)) => Ok(PageAdvance::Navigated),
        }
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self.page.close().await {
            debug!("Failed to close tab: {e}");
        }
    }
}
