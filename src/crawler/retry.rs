//! Bounded retry with linear backoff
//!
//! Every network-facing operation in the crawl goes through [`RetryPolicy`].
//! The policy is deliberately uniform: the substrate's transient failures are
//! not reliably distinguishable from permanent ones, so every failure is
//! retryable up to the attempt cap, and the cap bounds worst-case latency.

use crate::FetchError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// A retried operation whose attempts are exhausted
///
/// Carries the final error and how many attempts were made.
#[derive(Debug, Error)]
#[error("{operation} failed after {attempts} attempt(s): {source}")]
pub struct RetryError {
    pub operation: String,
    pub attempts: u32,
    #[source]
    pub source: FetchError,
}

/// Bounded retry with a linear-in-attempt backoff
///
/// After the n-th failure the policy waits `base_delay * n` before trying
/// again. No jitter, no error classification.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Runs `op` until it succeeds or `max_attempts` attempts have failed
    ///
    /// # Arguments
    ///
    /// * `operation` - Label used in logs and the terminal error
    /// * `op` - Closure producing a fresh future per attempt
    ///
    /// # Returns
    ///
    /// * `Ok(T)` - The first successful outcome
    /// * `Err(RetryError)` - The last failure, annotated with the attempt count
    pub async fn execute<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{operation} succeeded on attempt {attempt}");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    if attempt >= self.max_attempts {
                        return Err(RetryError {
                            operation: operation.to_string(),
                            attempts: attempt,
                            source: e,
                        });
                    }

                    let backoff = self.base_delay * attempt;
                    warn!(
                        "{operation} attempt {attempt}/{} failed: {e}; retrying in {:?}",
                        self.max_attempts, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}
