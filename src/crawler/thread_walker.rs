//! Per-thread pagination driver
//!
//! A thread is walked in one isolated session: navigate to the thread URL,
//! then repeatedly wait for the post container, snapshot, extract, and
//! advance while a next-page affordance is present. A markup wait that
//! times out aborts the walk but keeps everything collected so far.

use crate::config::CrawlerConfig;
use crate::crawler::retry::RetryPolicy;
use crate::extract::FieldExtractor;
use crate::fetch::{Fetcher, PageAdvance, Session};
use crate::state::Post;
use crate::Result;
use tracing::{debug, info, warn};

/// Everything one thread walk produced
#[derive(Debug, Default)]
pub struct ThreadHarvest {
    /// Posts in page order; the first is the original post
    pub posts: Vec<Post>,

    /// View count read off the thread page itself, when present
    pub views: Option<String>,

    /// Number of pages visited
    pub pages: u32,

    /// True when the walk stopped early and `posts` is partial
    pub aborted: bool,
}

/// Walks one thread's pages, accumulating posts
pub struct ThreadWalker<'a> {
    extractor: &'a dyn FieldExtractor,
    retry: &'a RetryPolicy,
    config: &'a CrawlerConfig,
}

impl<'a> ThreadWalker<'a> {
    pub fn new(
        extractor: &'a dyn FieldExtractor,
        retry: &'a RetryPolicy,
        config: &'a CrawlerConfig,
    ) -> Self {
        Self {
            extractor,
            retry,
            config,
        }
    }

    /// Harvests all pages of the thread at `thread_url`
    ///
    /// Opens a fresh session so a wedged thread cannot corrupt any other
    /// thread's state; the session is closed before returning, whatever the
    /// outcome.
    pub async fn walk(&self, fetcher: &dyn Fetcher, thread_url: &str) -> Result<ThreadHarvest> {
        let session = fetcher.session().await?;
        let result = self.paginate(&*session, thread_url).await;
        session.close().await;
        result
    }

    async fn paginate(&self, session: &dyn Session, thread_url: &str) -> Result<ThreadHarvest> {
        let navigation_timeout = self.config.navigation_timeout();

        self.retry
            .execute("thread navigation", move || {
                session.navigate(thread_url, navigation_timeout)
            })
            .await?;

        let mut harvest = ThreadHarvest::default();

        loop {
            harvest.pages += 1;

            // The container never appearing is terminal for this thread
            // only; whatever is collected so far is kept.
            if let Err(e) = session
                .wait_for(
                    self.extractor.post_container_selector(),
                    self.config.markup_timeout(),
                )
                .await
            {
                warn!(
                    "{thread_url}: page {} unusable ({e}); keeping {} post(s)",
                    harvest.pages,
                    harvest.posts.len()
                );
                harvest.aborted = true;
                return Ok(harvest);
            }

            let doc = session.document().await?;

            if harvest.pages == 1 {
                harvest.views = self.extractor.view_count_fallback(&doc);
            }

            let posts = self.extractor.extract_posts(&doc);
            debug!("{thread_url}: page {} yielded {} post(s)", harvest.pages, posts.len());
            harvest.posts.extend(posts);

            if !self.extractor.has_next_page(&doc) {
                info!(
                    "{thread_url}: {} post(s) across {} page(s)",
                    harvest.posts.len(),
                    harvest.pages
                );
                return Ok(harvest);
            }

            let selector = self.extractor.next_page_selector();
            let advance = self
                .retry
                .execute("next-page advance", move || {
                    session.advance(selector, navigation_timeout)
                })
                .await?;

            if advance == PageAdvance::TimedOutButTriggered {
                debug!("{thread_url}: navigation wait expired after the trigger; continuing");
            }

            tokio::time::sleep(self.config.page_pacing()).await;
        }
    }
}
