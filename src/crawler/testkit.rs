//! Scripted fakes for exercising the crawl core without a browser
//!
//! A [`ScriptedSession`] serves a fixed sequence of page keys; the
//! [`StubExtractor`] maps those keys to typed extraction results, so walker
//! logic is driven end to end through the real trait seams.

use crate::extract::FieldExtractor;
use crate::fetch::{Fetcher, PageAdvance, RenderedDocument, Session};
use crate::state::{Category, Post, ThreadSummary};
use crate::FetchError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What advancing from a page does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceScript {
    Navigated,
    TimedOutButTriggered,
    Fails,
}

/// One scripted page within a session
#[derive(Debug, Clone)]
pub struct PageScript {
    /// Key reported as the document URL; the extractor stub resolves it
    pub key: String,
    /// Whether waiting for the post container times out on this page
    pub wait_fails: bool,
    /// Outcome of triggering the next-page affordance from this page
    pub advance: AdvanceScript,
}

impl PageScript {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            wait_fails: false,
            advance: AdvanceScript::Navigated,
        }
    }

    pub fn wait_fails(mut self) -> Self {
        self.wait_fails = true;
        self
    }

    pub fn advance(mut self, advance: AdvanceScript) -> Self {
        self.advance = advance;
        self
    }
}

/// Observable side effects of one scripted session
#[derive(Debug, Default)]
pub struct SessionLog {
    pub navigations: AtomicU32,
    pub documents: AtomicU32,
    pub closed: AtomicBool,
}

/// A session that walks a fixed page sequence
pub struct ScriptedSession {
    pages: Vec<PageScript>,
    position: Mutex<usize>,
    nav_failures: Mutex<u32>,
    log: Arc<SessionLog>,
}

impl ScriptedSession {
    pub fn new(pages: Vec<PageScript>) -> Self {
        Self {
            pages,
            position: Mutex::new(0),
            nav_failures: Mutex::new(0),
            log: Arc::new(SessionLog::default()),
        }
    }

    /// One page with the given key, no next-page affordance
    pub fn single(key: &str) -> Self {
        Self::new(vec![PageScript::new(key)])
    }

    /// Fails the first `n` navigations before succeeding
    pub fn with_nav_failures(self, n: u32) -> Self {
        *self.nav_failures.lock().unwrap() = n;
        self
    }

    pub fn log(&self) -> Arc<SessionLog> {
        Arc::clone(&self.log)
    }

    fn current(&self) -> PageScript {
        let position = *self.position.lock().unwrap();
        self.pages[position.min(self.pages.len().saturating_sub(1))].clone()
    }
}

#[async_trait]
impl Session for ScriptedSession {
    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), FetchError> {
        self.log.navigations.fetch_add(1, Ordering::SeqCst);
        let mut failures = self.nav_failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(FetchError::Navigation {
                url: url.to_string(),
                message: "scripted navigation failure".to_string(),
            });
        }
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), FetchError> {
        if self.current().wait_fails {
            return Err(FetchError::MarkupTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        Ok(())
    }

    async fn document(&self) -> Result<RenderedDocument, FetchError> {
        self.log.documents.fetch_add(1, Ordering::SeqCst);
        Ok(RenderedDocument {
            url: self.current().key,
            html: String::new(),
        })
    }

    async fn advance(
        &self,
        _selector: &str,
        _timeout: Duration,
    ) -> Result<PageAdvance, FetchError> {
        match self.current().advance {
            AdvanceScript::Navigated => {
                *self.position.lock().unwrap() += 1;
                Ok(PageAdvance::Navigated)
            }
            AdvanceScript::TimedOutButTriggered => {
                *self.position.lock().unwrap() += 1;
                Ok(PageAdvance::TimedOutButTriggered)
            }
            AdvanceScript::Fails => Err(FetchError::Navigation {
                url: "next-page".to_string(),
                message: "scripted advance failure".to_string(),
            }),
        }
    }

    async fn close(self: Box<Self>) {
        self.log.closed.store(true, Ordering::SeqCst);
    }
}

/// Observable side effects of a scripted fetcher
///
/// Handed out as an `Arc` so assertions survive the fetcher being boxed
/// away into an orchestrator.
#[derive(Debug, Default)]
pub struct FetcherStats {
    pub recycles: AtomicU32,
    pub sessions_opened: AtomicU32,
    pub shutdowns: AtomicU32,
}

/// Fetcher handing out pre-scripted sessions in order
#[derive(Default)]
pub struct ScriptedFetcher {
    sessions: Mutex<VecDeque<ScriptedSession>>,
    stats: Arc<FetcherStats>,
    recycle_fails: bool,
}

impl ScriptedFetcher {
    pub fn new(sessions: Vec<ScriptedSession>) -> Self {
        Self {
            sessions: Mutex::new(sessions.into()),
            ..Self::default()
        }
    }

    /// Makes every recycle fail, for driving top-level failures
    pub fn failing_recycle(mut self) -> Self {
        self.recycle_fails = true;
        self
    }

    pub fn stats(&self) -> Arc<FetcherStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn session(&self) -> Result<Box<dyn Session>, FetchError> {
        self.stats.sessions_opened.fetch_add(1, Ordering::SeqCst);
        match self.sessions.lock().unwrap().pop_front() {
            Some(session) => Ok(Box::new(session)),
            None => Err(FetchError::Session("no scripted session left".to_string())),
        }
    }

    async fn recycle(&self) -> Result<(), FetchError> {
        self.stats.recycles.fetch_add(1, Ordering::SeqCst);
        if self.recycle_fails {
            return Err(FetchError::Session("scripted recycle failure".to_string()));
        }
        Ok(())
    }

    async fn shutdown(&self) {
        self.stats.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

/// Typed extraction results for one page key
#[derive(Debug, Clone, Default)]
pub struct PageData {
    pub categories: Vec<Category>,
    pub summaries: Vec<ThreadSummary>,
    pub posts: Vec<Post>,
    pub has_next: bool,
    pub views: Option<String>,
}

/// Extractor resolving page keys to scripted [`PageData`]
#[derive(Debug, Default)]
pub struct StubExtractor {
    pages: HashMap<String, PageData>,
}

impl StubExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, key: &str, data: PageData) -> Self {
        self.pages.insert(key.to_string(), data);
        self
    }

    fn data(&self, doc: &RenderedDocument) -> PageData {
        self.pages.get(&doc.url).cloned().unwrap_or_default()
    }
}

impl FieldExtractor for StubExtractor {
    fn extract_categories(&self, doc: &RenderedDocument) -> Vec<Category> {
        self.data(doc).categories
    }

    fn extract_thread_summaries(&self, doc: &RenderedDocument) -> Vec<ThreadSummary> {
        self.data(doc).summaries
    }

    fn extract_posts(&self, doc: &RenderedDocument) -> Vec<Post> {
        self.data(doc).posts
    }

    fn has_next_page(&self, doc: &RenderedDocument) -> bool {
        self.data(doc).has_next
    }

    fn view_count_fallback(&self, doc: &RenderedDocument) -> Option<String> {
        self.data(doc).views
    }

    fn post_container_selector(&self) -> &str {
        "article.message"
    }

    fn next_page_selector(&self) -> &str {
        "a.pageNav-jump--next"
    }
}

/// A post carrying only a username, for compact test fixtures
pub fn post(username: &str) -> Post {
    Post {
        username: Some(username.to_string()),
        ..Post::default()
    }
}

/// A summary pointing at `thread_url`, for compact test fixtures
pub fn summary(title: &str, thread_url: &str) -> ThreadSummary {
    ThreadSummary {
        title: Some(title.to_string()),
        thread_url: Some(thread_url.to_string()),
        replies: None,
        views: None,
    }
}

/// A crawler config with all pacing zeroed so tests run instantly
pub fn instant_crawler_config() -> crate::config::CrawlerConfig {
    crate::config::CrawlerConfig {
        max_attempts: 3,
        retry_base_delay_ms: 0,
        listing_pages_per_category: 1,
        navigation_timeout_ms: 1000,
        markup_timeout_ms: 1000,
        page_pacing_ms: 0,
        listing_pacing_ms: 0,
        thread_pacing_ms: 0,
        thread_pacing_jitter_ms: 0,
        checkpoint_every: 0,
        recycle_every: 0,
    }
}
