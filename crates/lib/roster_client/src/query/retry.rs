use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio::time::sleep;

use crate::error::ApiResult;

/// Upper bound on a single backoff delay.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// How often a failed read is repeated.
///
/// Only errors for which [`ApiError::is_retryable`](crate::ApiError::is_retryable)
/// holds are retried, so a 401 always fails on the first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    pub const fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_secs(1),
        }
    }

    /// Exponential backoff: `base * 2^attempt`, capped at 30 s.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_BACKOFF)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// budget is spent.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> ApiResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_retries && e.is_retryable() => {
                    let delay = self.backoff(attempt);
                    debug!("attempt {} failed ({e}); retrying in {delay:?}", attempt + 1);
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::error::ApiError;

    fn fast(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::with_retries(10);
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(3), Duration::from_secs(8));
        assert_eq!(policy.backoff(8), MAX_BACKOFF);
        assert_eq!(policy.backoff(40), MAX_BACKOFF);
    }

    #[tokio::test]
    async fn retries_transport_errors_until_success() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = fast(3)
            .run(move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ApiError::Transport("connection reset".into()))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn never_retries_unauthorized() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: ApiResult<()> = fast(5)
            .run(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Unauthorized("expired".into()))
            })
            .await;

        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn none_policy_makes_one_attempt() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: ApiResult<()> = RetryPolicy::none()
            .run(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Transport("down".into()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
