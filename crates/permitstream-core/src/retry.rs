//! Retry with exponential backoff for batch fetches.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::FetchError;

/// Backoff policy for retrying a failed batch request.
///
/// The delay before attempt `n` (1-based retry count) is
/// `initial_delay * factor^(n-1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Multiplicative factor for each subsequent retry.
    pub factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            factor: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy with no delays, for tests.
    pub fn immediate() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Delay applied before retry number `retry` (1-based).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let scale = self.factor.powi(retry.saturating_sub(1) as i32);
        Duration::from_secs_f64(self.initial_delay.as_secs_f64() * scale)
    }
}

/// Runs `op` up to `policy.max_attempts` times, sleeping between attempts.
///
/// Only errors marked retryable are retried; a permanent error propagates
/// immediately, as does the error from the final attempt.
pub async fn run_with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) if error.retryable() && attempt < max_attempts => {
                let delay = policy.delay_for_retry(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "retryable fetch failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn delays_double_per_retry() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_retry(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for_retry(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for_retry(3), Duration::from_secs(8));
    }

    #[tokio::test]
    async fn retries_retryable_errors_up_to_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), FetchError> = run_with_retry(&RetryPolicy::immediate(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(FetchError::timeout("slow upstream")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), FetchError> = run_with_retry(&RetryPolicy::immediate(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(FetchError::invalid_request("bad query")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn success_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = run_with_retry(&RetryPolicy::immediate(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(FetchError::connect("reset"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.expect("second attempt succeeds"), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
