//! Scripted fetcher and extractor used by the integration tests
//!
//! Sessions serve fixed page-key sequences; the extractor resolves those
//! keys to typed results, driving the real orchestration code through its
//! public trait seams without a browser.

use async_trait::async_trait;
use forage::extract::FieldExtractor;
use forage::fetch::{Fetcher, PageAdvance, RenderedDocument, Session};
use forage::state::{Category, Post, ThreadSummary};
use forage::FetchError;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted page within a session
#[derive(Debug, Clone)]
pub struct PageScript {
    pub key: String,
    pub wait_fails: bool,
}

impl PageScript {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            wait_fails: false,
        }
    }

    pub fn wait_fails(mut self) -> Self {
        self.wait_fails = true;
        self
    }
}

/// A session that walks a fixed page sequence, advancing on every trigger
pub struct ScriptedSession {
    pages: Vec<PageScript>,
    position: Mutex<usize>,
}

impl ScriptedSession {
    pub fn new(pages: Vec<PageScript>) -> Self {
        Self {
            pages,
            position: Mutex::new(0),
        }
    }

    pub fn single(key: &str) -> Self {
        Self::new(vec![PageScript::new(key)])
    }

    fn current(&self) -> PageScript {
        let position = *self.position.lock().unwrap();
        self.pages[position.min(self.pages.len().saturating_sub(1))].clone()
    }
}

#[async_trait]
impl Session for ScriptedSession {
    async fn navigate(&self, _url: &str, _timeout: Duration) -> Result<(), FetchError> {
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
        *self.position.lock().unwrap() += 1;
        Ok(PageAdvance::Navigated)
    }

    async fn close(self: Box<Self>) {}
}

/// Observable counters surviving the fetcher being boxed away
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
}

impl ScriptedFetcher {
    pub fn new(sessions: Vec<ScriptedSession>) -> Self {
        Self {
            sessions: Mutex::new(sessions.into()),
            stats: Arc::default(),
        }
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

/// A post carrying only a username and content
pub fn post(username: &str, content: &str) -> Post {
    Post {
        username: Some(username.to_string()),
        content: Some(content.to_string()),
        ..Post::default()
    }
}
