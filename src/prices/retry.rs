use std::future::Future;
use std::time::Duration;

use super::PriceError;

/// Bounded retry with linear backoff. Rate-limit responses wait longer than
/// other failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
    pub rate_limit_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(1_000),
            rate_limit_backoff: Duration::from_millis(5_000),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, err: &PriceError, attempt: u32) -> Duration {
        let base = match err {
            PriceError::RateLimited => self.rate_limit_backoff,
            _ => self.backoff,
        };
        base * attempt
    }
}

/// Run `op` until it succeeds or `max_attempts` calls have failed. Returns the
/// last error. There is no delay after the final attempt.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T, PriceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PriceError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts => {
                let delay = policy.delay_after(&err, attempt);
                tracing::warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:?}",
                    what,
                    attempt,
                    max_attempts,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                tracing::error!("{} failed after {} attempts: {}", what, attempt, err);
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
            rate_limit_backoff: Duration::from_secs(5),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = &AtomicU32::new(0);
        let result = with_retry(&policy(), "test", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(PriceError::Status(500))
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&policy(), "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(PriceError::Status(503))
        })
        .await;

        assert!(matches!(result, Err(PriceError::Status(503))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_waits_longer_than_generic_failure() {
        let start = Instant::now();
        let _: Result<(), _> = with_retry(&policy(), "test", || async { Err(PriceError::Status(500)) }).await;
        // 1s + 2s
        assert_eq!(start.elapsed(), Duration::from_secs(3));

        let start = Instant::now();
        let _: Result<(), _> = with_retry(&policy(), "test", || async { Err(PriceError::RateLimited) }).await;
        // 5s + 10s
        assert_eq!(start.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn zero_attempts_still_calls_once() {
        let calls = &AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        let result: Result<(), _> = with_retry(&policy, "test", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(PriceError::InvalidResponse("empty".to_string()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
