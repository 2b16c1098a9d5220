//! Fetch boundary: browser sessions and rendered documents
//!
//! The crawl core only ever talks to the [`Fetcher`] and [`Session`] traits;
//! the concrete substrate (a headless browser) lives behind them so tests
//! can script page sequences without a browser.

mod browser;

pub use browser::BrowserFetcher;

use crate::FetchError;
use async_trait::async_trait;
use std::time::Duration;

/// A snapshot of a rendered page
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// URL the snapshot was taken at
    pub url: String,

    /// Serialized DOM content
    pub html: String,
}

/// Outcome of triggering the next-page affordance
///
/// A navigation wait that expires after the trigger fired is reported as its
/// own variant rather than an error: the click most likely landed and the
/// walker continues as if the page advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAdvance {
    /// The page navigated within the wait bound
    Navigated,

    /// The trigger fired but the navigation wait expired
    TimedOutButTriggered,
}

/// Owner of the rendering substrate
///
/// Methods take `&self`; implementations manage the underlying browser with
/// interior mutability so recycling can happen while walkers hold a shared
/// reference.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Opens a new isolated session (one browser tab)
    async fn session(&self) -> Result<Box<dyn Session>, FetchError>;

    /// Discards and recreates the underlying browser
    ///
    /// Any session opened before the recycle must be assumed dead.
    async fn recycle(&self) -> Result<(), FetchError>;

    /// Releases the browser for good
    async fn shutdown(&self);
}

/// One isolated page session
#[async_trait]
pub trait Session: Send + Sync {
    /// Navigates to a URL, waiting for the load to settle
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), FetchError>;

    /// Waits until markup matching `selector` is present
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), FetchError>;

    /// Snapshots the current document
    async fn document(&self) -> Result<RenderedDocument, FetchError>;

    /// Clicks the element at `selector` and waits for the resulting navigation
    async fn advance(&self, selector: &str, timeout: Duration)
        -> Result<PageAdvance, FetchError>;

    /// Closes the session, releasing its tab
    async fn close(self: Box<Self>);
}
