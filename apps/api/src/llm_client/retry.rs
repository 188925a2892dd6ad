//! Bounded retry with exponential backoff, shared by every AI operation.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{error, warn};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// How many times to try an operation and how long to wait in between.
///
/// The wait before retry `n` (the first retry is `n = 1`) is
/// `base_delay * 2^n`, so the defaults wait 2s and then 4s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << retry.min(16))
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. Attempts are strictly sequential; `op` gets the
    /// 1-based attempt number. Returns the last error on failure.
    pub async fn run<T, E, F, Fut, P>(
        &self,
        operation: &str,
        request_id: &str,
        mut op: F,
        is_retryable: P,
    ) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let err = match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !is_retryable(&err) {
                warn!(
                    request_id,
                    operation,
                    attempt,
                    error = %err,
                    "attempt failed with a non-retryable error"
                );
                return Err(err);
            }

            if attempt >= max_attempts {
                error!(
                    request_id,
                    operation,
                    attempts = attempt,
                    error = %err,
                    "all attempts failed"
                );
                return Err(err);
            }

            let delay = self.delay_before_retry(attempt);
            warn!(
                request_id,
                operation,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_doubles_from_two_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_before_retry(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_before_retry(2), Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result: Result<(), String> = RetryPolicy::default()
            .run(
                "test",
                "req-1",
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("boom".to_string()) }
                },
                |_| true,
            )
            .await;

        assert_eq!(result, Err("boom".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 2s + 4s of backoff, no wait after the final attempt
        assert_eq!(started.elapsed(), Duration::from_millis(6000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_first_success() {
        let result: Result<u32, String> = RetryPolicy::default()
            .run(
                "test",
                "req-2",
                |attempt| async move {
                    if attempt < 2 {
                        Err(format!("attempt {attempt} failed"))
                    } else {
                        Ok(attempt)
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(result, Ok(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_stops_immediately() {
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = RetryPolicy::default()
            .run(
                "test",
                "req-3",
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("terminal".to_string()) }
                },
                |e| e != "terminal",
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_runs_once() {
        let policy = RetryPolicy {
            max_attempts: 0,
            base_delay: Duration::from_millis(10),
        };
        let calls = AtomicU32::new(0);

        let _: Result<(), String> = policy
            .run(
                "test",
                "req-4",
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("x".to_string()) }
                },
                |_| true,
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
