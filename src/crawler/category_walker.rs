//! Per-category listing driver
//!
//! Visits a fixed number of listing pages for one category and hands every
//! discovered thread to the [`ThreadWalker`]. Failures are contained at the
//! smallest scope that makes sense: a bad listing page skips only that page,
//! a bad thread skips only that thread.

use crate::config::CrawlerConfig;
use crate::crawler::orchestrator::ProgressTracker;
use crate::crawler::retry::RetryPolicy;
use crate::crawler::thread_walker::ThreadWalker;
use crate::extract::FieldExtractor;
use crate::fetch::Fetcher;
use crate::state::{Category, CrawlState, ThreadRecord, ThreadSummary};
use crate::Result;
use tracing::{error, info};

/// Walks one category's listing pages and the threads on them
pub struct CategoryWalker<'a> {
    extractor: &'a dyn FieldExtractor,
    retry: &'a RetryPolicy,
    config: &'a CrawlerConfig,
}

impl<'a> CategoryWalker<'a> {
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

    /// Processes the category, appending one record per harvested thread
    ///
    /// Only errors from the per-thread bookkeeping (checkpointing,
    /// recycling) escape; everything page- or thread-scoped is logged and
    /// skipped.
    pub async fn walk(
        &self,
        fetcher: &dyn Fetcher,
        category: &Category,
        state: &mut CrawlState,
        tracker: &ProgressTracker<'_>,
    ) -> Result<()> {
        let thread_walker = ThreadWalker::new(self.extractor, self.retry, self.config);

        for page_no in 1..=self.config.listing_pages_per_category {
            let listing_url = listing_page_url(&category.url, page_no);

            let summaries = match self.fetch_listing(fetcher, &listing_url).await {
                Ok(summaries) => summaries,
                Err(e) => {
                    // One bad listing page never takes the category down
                    error!("{}: listing page {page_no} failed: {e}", category.name);
                    continue;
                }
            };

            info!(
                "{}: listing page {page_no} holds {} thread(s)",
                category.name,
                summaries.len()
            );

            for summary in &summaries {
                let Some(thread_url) = summary.thread_url.as_deref() else {
                    continue;
                };

                match thread_walker.walk(fetcher, thread_url).await {
                    Ok(harvest) => {
                        let record = ThreadRecord::assemble(
                            summary,
                            thread_url,
                            &category.name,
                            harvest.posts,
                            harvest.views,
                        );
                        state.push(record);
                    }
                    Err(e) => {
                        // One bad thread never takes the listing page down
                        error!("{thread_url}: thread failed: {e}");
                    }
                }

                tracker.thread_processed(fetcher, state).await?;
            }

            tokio::time::sleep(self.config.listing_pacing()).await;
        }

        Ok(())
    }

    /// Fetches one listing page in a short-lived session
    ///
    /// The session is closed before any thread is walked so a browser
    /// recycle between threads cannot invalidate it.
    async fn fetch_listing(
        &self,
        fetcher: &dyn Fetcher,
        listing_url: &str,
    ) -> Result<Vec<ThreadSummary>> {
        let session = fetcher.session().await?;
        let navigation_timeout = self.config.navigation_timeout();

        let result = async {
            let s = &*session;
            self.retry
                .execute("listing navigation", move || {
                    s.navigate(listing_url, navigation_timeout)
                })
                .await?;

            let doc = s.document().await?;
            Ok(self.extractor.extract_thread_summaries(&doc))
        }
        .await;

        session.close().await;
        result
    }
}

/// Builds the URL of the n-th listing page of a category
///
/// Page 1 is the category URL itself; further pages use the `page-N`
/// path convention.
pub(crate) fn listing_page_url(category_url: &str, page_no: u32) -> String {
    if page_no <= 1 {
        category_url.to_string()
    } else if category_url.ends_with('/') {
        format!("{category_url}page-{page_no}")
    } else {
        format!("{category_url}/page-{page_no}")
    }
}
