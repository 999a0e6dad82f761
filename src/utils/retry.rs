//! Bounded retry with a fixed delay
//!
//! Upstream completion calls are retried a small, fixed number of times with
//! a constant pause between attempts. There is no exponential growth and no
//! jitter.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry policy for outbound calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one (at least 1)
    pub max_attempts: u32,

    /// Pause between two consecutive attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or `max_attempts` is reached
    ///
    /// The operation receives the 1-based attempt number. The last error is
    /// returned unchanged once attempts are exhausted.
    pub async fn run<T, E, F, Fut, R>(
        &self,
        is_retryable: R,
        mut operation: F,
    ) -> RetryOutcome<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: Fn(&E) -> bool,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempts = 0;
        let mut total_delay = Duration::ZERO;

        loop {
            attempts += 1;

            match operation(attempts).await {
                Ok(value) => {
                    return RetryOutcome {
                        result: Ok(value),
                        attempts,
                        total_delay,
                    };
                }
                Err(err) => {
                    if !is_retryable(&err) {
                        tracing::debug!(attempt = attempts, error = %err, "Non-retryable failure");
                        return RetryOutcome {
                            result: Err(err),
                            attempts,
                            total_delay,
                        };
                    }

                    if attempts >= max_attempts {
                        tracing::warn!(
                            attempts,
                            error = %err,
                            "Giving up after final attempt"
                        );
                        return RetryOutcome {
                            result: Err(err),
                            attempts,
                            total_delay,
                        };
                    }

                    tracing::warn!(
                        attempt = attempts,
                        max_attempts,
                        delay_ms = self.delay.as_millis() as u64,
                        error = %err,
                        "Attempt failed, retrying"
                    );

                    sleep(self.delay).await;
                    total_delay += self.delay;
                }
            }
        }
    }
}

/// Result of a retried operation
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    /// The final result (success or last error)
    pub result: Result<T, E>,

    /// Number of attempts made
    pub attempts: u32,

    /// Total time spent waiting between attempts
    pub total_delay: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(1));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_first_attempt() {
        let policy = RetryPolicy::default();
        let calls = Arc::new(AtomicU32::new(0));

        let outcome = policy
            .run(
                |_: &String| true,
                |_| {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, String>(42)
                    }
                },
            )
            .await;

        assert_eq!(outcome.result.unwrap(), 42);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.total_delay, Duration::ZERO);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_third_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let start = Instant::now();

        let outcome = policy
            .run(
                |_: &String| true,
                |attempt| async move {
                    if attempt < 3 {
                        Err(format!("transient failure {}", attempt))
                    } else {
                        Ok(attempt)
                    }
                },
            )
            .await;

        assert_eq!(outcome.result.unwrap(), 3);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.total_delay, Duration::from_secs(2));
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_after_max_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let outcome = policy
            .run(
                |_: &String| true,
                |_| {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err::<i32, _>("always fails".to_string())
                    }
                },
            )
            .await;

        assert_eq!(outcome.result.unwrap_err(), "always fails");
        assert_eq!(outcome.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two pauses between three attempts, none after the last one
        assert_eq!(outcome.total_delay, Duration::from_secs(2));
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_stops_immediately() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let calls = Arc::new(AtomicU32::new(0));

        let outcome = policy
            .run(
                |err: &String| !err.contains("permanent"),
                |_| {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err::<i32, _>("permanent error".to_string())
                    }
                },
            )
            .await;

        assert!(outcome.result.is_err());
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.total_delay, Duration::ZERO);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
