//! Top-level crawl driver
//!
//! The orchestrator discovers categories, runs the category walker over
//! them, and owns the run-wide concerns: the processed-thread cadence
//! (checkpointing, browser recycling, paced delays), best-effort recovery
//! persistence when a run dies, and releasing the browser at exit.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::category_walker::CategoryWalker;
use crate::crawler::retry::RetryPolicy;
use crate::extract::FieldExtractor;
use crate::fetch::Fetcher;
use crate::output::Checkpointer;
use crate::state::{Category, CrawlState};
use crate::Result;
use rand::Rng;
use std::time::Duration;
use tracing::{error, info, warn};

/// Per-thread bookkeeping driven purely by the processed counter
///
/// Checkpointing and recycling fire on counter multiples regardless of
/// whether the thread just processed succeeded. The post-thread delay is
/// jittered to avoid a mechanical request rhythm.
pub struct ProgressTracker<'a> {
    checkpointer: &'a Checkpointer,
    config: &'a CrawlerConfig,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(checkpointer: &'a Checkpointer, config: &'a CrawlerConfig) -> Self {
        Self {
            checkpointer,
            config,
        }
    }

    /// Runs the side effects due after one attempted thread
    pub async fn thread_processed(
        &self,
        fetcher: &dyn Fetcher,
        state: &mut CrawlState,
    ) -> Result<()> {
        let processed = state.mark_processed();

        if self.config.checkpoint_every > 0 && processed % self.config.checkpoint_every == 0 {
            let path = self.checkpointer.save_partial(processed, state.records())?;
            info!(
                "checkpoint after {processed} thread(s): {} record(s) -> {}",
                state.len(),
                path.display()
            );
        }

        if self.config.recycle_every > 0 && processed % self.config.recycle_every == 0 {
            info!("recycling browser after {processed} thread(s)");
            fetcher.recycle().await?;
        }

        tokio::time::sleep(self.pacing_delay()).await;
        Ok(())
    }

    /// Base delay plus uniform random jitter
    fn pacing_delay(&self) -> Duration {
        let jitter = self.config.thread_pacing_jitter();
        if jitter.is_zero() {
            return self.config.thread_pacing();
        }
        let jitter_ms = rand::thread_rng().gen_range(0..jitter.as_millis() as u64);
        self.config.thread_pacing() + Duration::from_millis(jitter_ms)
    }
}

/// Drives a complete crawl run
pub struct Orchestrator {
    config: Config,
    fetcher: Box<dyn Fetcher>,
    extractor: Box<dyn FieldExtractor>,
    retry: RetryPolicy,
    checkpointer: Checkpointer,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        fetcher: Box<dyn Fetcher>,
        extractor: Box<dyn FieldExtractor>,
    ) -> Self {
        let retry = RetryPolicy::new(
            config.crawler.max_attempts,
            config.crawler.retry_base_delay(),
        );
        let checkpointer = Checkpointer::new(&config.output.directory, &config.output.prefix);

        Self {
            config,
            fetcher,
            extractor,
            retry,
            checkpointer,
        }
    }

    /// Runs the crawl to completion
    ///
    /// On success the full snapshot is written; on failure whatever has
    /// accumulated goes into a recovery snapshot before the error
    /// propagates. The browser is released in both cases.
    pub async fn run(&self) -> Result<CrawlState> {
        let mut state = CrawlState::new();
        let outcome = self.crawl(&mut state).await;

        self.fetcher.shutdown().await;

        match outcome {
            Ok(()) => {
                let path = self.checkpointer.save_full(state.records())?;
                info!(
                    "crawl finished: {} thread(s) -> {}",
                    state.len(),
                    path.display()
                );
                Ok(state)
            }
            Err(e) => {
                error!("crawl aborted: {e}");
                match self.checkpointer.save_recovery(state.records()) {
                    Ok(path) => warn!(
                        "recovered {} accumulated record(s) -> {}",
                        state.len(),
                        path.display()
                    ),
                    Err(save_err) => error!("failed to write recovery snapshot: {save_err}"),
                }
                Err(e)
            }
        }
    }

    async fn crawl(&self, state: &mut CrawlState) -> Result<()> {
        let categories = self.discover_categories().await?;
        info!("discovered {} categorie(s)", categories.len());

        let tracker = ProgressTracker::new(&self.checkpointer, &self.config.crawler);
        let category_walker =
            CategoryWalker::new(&*self.extractor, &self.retry, &self.config.crawler);

        for category in &categories {
            info!("category: {} ({})", category.name, category.url);
            category_walker
                .walk(&*self.fetcher, category, state, &tracker)
                .await?;
        }

        Ok(())
    }

    /// Single fetch + extract of the root listing
    ///
    /// An empty category list is accepted as-is; only the fetch itself is
    /// retried.
    async fn discover_categories(&self) -> Result<Vec<Category>> {
        let session = self.fetcher.session().await?;
        let root_url = self.config.forum.root_url.as_str();
        let navigation_timeout = self.config.crawler.navigation_timeout();

        let result = async {
            let s = &*session;
            self.retry
                .execute("root listing navigation", move || {
                    s.navigate(root_url, navigation_timeout)
                })
                .await?;

            let doc = s.document().await?;
            Ok(self.extractor.extract_categories(&doc))
        }
        .await;

        session.close().await;
        result
    }
}
