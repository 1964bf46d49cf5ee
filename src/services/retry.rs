use std::time::Duration;
use tracing::{debug, warn};

use crate::constants;

/// Structured retry parameters: total attempt budget, initial delay, and the
/// multiplier applied after every failed attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: constants::retry::BASE_DELAY,
            backoff_factor: constants::retry::BACKOFF_FACTOR,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    fn delay_for(self, failed_attempts: u32) -> Duration {
        self.base_delay * self.backoff_factor.saturating_pow(failed_attempts - 1)
    }
}

/// Runs `operation` until it succeeds or the attempt budget is spent,
/// sleeping with exponential backoff between attempts.
///
/// The backoff sleep runs on the caller's task, so dropping the enclosing
/// future (request abandoned, timeout upstream) cancels the retry loop with
/// it.
///
/// # Errors
/// Returns the final attempt's error once `max_attempts` attempts have
/// failed.
pub async fn retry_with_backoff<F, Fut, T>(
    policy: RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        operation = operation_name,
                        attempt, "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                if attempt >= max_attempts {
                    return Err(err);
                }

                let delay = policy.delay_for(attempt);
                warn!(
                    "{} attempt {}/{} failed: {}. Retrying in {:?}",
                    operation_name, attempt, max_attempts, err, delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_first_attempt() {
        let result = retry_with_backoff(RetryPolicy::default(), "test_op", || async {
            Ok::<i32, anyhow::Error>(42)
        })
        .await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_failures() {
        let attempts = AtomicU32::new(0);

        let result = retry_with_backoff(RetryPolicy::default(), "test_op", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    anyhow::bail!("transient failure {n}")
                }
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempt_budget() {
        let attempts = AtomicU32::new(0);

        let result = retry_with_backoff(RetryPolicy::with_attempts(2), "test_op", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(anyhow::anyhow!("still broken")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
    }
}
