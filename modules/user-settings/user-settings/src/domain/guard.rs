//! Timeouts and bounded retries around storage calls.
//!
//! Every storage call runs under [`StorageGuard::call`], so a stalled database
//! surfaces as [`StorageError::Timeout`] instead of hanging the request.
//! [`StorageGuard::retrying`] additionally retries transient failures and is only
//! used for provisioning, which is idempotent.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};

use super::store::StorageError;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,

    /// Backoff before retry `n` is `base_backoff * n`, capped at `max_backoff`.
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        (self.base_backoff * attempt).min(self.max_backoff)
    }
}

#[derive(Debug, Clone)]
pub struct StorageGuard {
    timeout: Duration,
    retry: RetryPolicy,
}

impl Default for StorageGuard {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), RetryPolicy::default())
    }
}

impl StorageGuard {
    #[must_use]
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Self {
        Self { timeout, retry }
    }

    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Run one storage call under the request-scoped timeout.
    ///
    /// # Errors
    /// The call's own error, or `Timeout` when it does not finish in time.
    pub async fn call<T, Fut>(&self, op: &'static str, fut: Fut) -> Result<T, StorageError>
    where
        Fut: Future<Output = Result<T, StorageError>>,
    {
        if let Ok(res) = timeout(self.timeout, fut).await {
            res
        } else {
            tracing::warn!(op, timeout_ms = duration_ms(self.timeout), "storage call timed out");
            Err(StorageError::Timeout(self.timeout))
        }
    }

    /// Run `attempt` until it succeeds, fails permanently, or the attempt budget is spent.
    ///
    /// `attempt` must be idempotent.
    ///
    /// # Errors
    /// The first non-transient error, or the last transient one.
    pub async fn retrying<T, F, Fut>(
        &self,
        op: &'static str,
        mut attempt: F,
    ) -> Result<T, StorageError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StorageError>>,
    {
        let mut n: u32 = 0;
        loop {
            n += 1;
            match attempt().await {
                Ok(value) => {
                    if n > 1 {
                        tracing::info!(op, attempt = n, "storage call succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_transient() && n < self.retry.max_attempts => {
                    let backoff = self.retry.backoff(n);
                    tracing::warn!(
                        op,
                        attempt = n,
                        backoff_ms = duration_ms(backoff),
                        error = %err,
                        "transient storage failure, retrying"
                    );
                    sleep(backoff).await;
                }
                Err(err) => {
                    tracing::error!(op, attempt = n, error = %err, "storage call giving up");
                    return Err(err);
                }
            }
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
