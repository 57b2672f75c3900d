//! Fixed-delay retry for remote calls.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::FeedSettings;

/// Retry policy: a bounded number of extra attempts with a constant pause between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed after the first one
    pub max_retries: u32,
    /// Pause before every retry; never grows
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Total number of attempts, first call included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Run `operation` until it succeeds or the retry budget is spent.
    ///
    /// `on_retry` is called once per retry with the failure and the retries left after it.
    /// When the budget runs out the last error is returned unchanged.
    pub async fn run<F, Fut, T, E, N>(&self, mut operation: F, mut on_retry: N) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
        N: FnMut(&E, u32),
    {
        let mut retries_left = self.max_retries;

        loop {
            match operation().await {
                Ok(value) => {
                    if retries_left < self.max_retries {
                        debug!(
                            "Operation succeeded after {} retries",
                            self.max_retries - retries_left
                        );
                    }
                    return Ok(value);
                }
                Err(e) if retries_left == 0 => {
                    warn!("Operation failed after {} attempts: {}", self.max_attempts(), e);
                    return Err(e);
                }
                Err(e) => {
                    on_retry(&e, retries_left);
                    retries_left -= 1;
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

impl From<&FeedSettings> for RetryPolicy {
    fn from(settings: &FeedSettings) -> Self {
        Self::new(settings.max_retries, settings.retry_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_success_first_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut notices = 0;

        let result = fast(3)
            .run(
                || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, String>("events")
                    }
                },
                |_, _| notices += 1,
            )
            .await;

        assert_eq!(result.unwrap(), "events");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(notices, 0);
    }

    #[tokio::test]
    async fn test_success_after_two_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut notices = Vec::new();

        let result = fast(3)
            .run(
                || {
                    let counter = counter.clone();
                    async move {
                        let count = counter.fetch_add(1, Ordering::SeqCst);
                        if count < 2 {
                            Err(format!("Attempt {}", count + 1))
                        } else {
                            Ok("events")
                        }
                    }
                },
                |e, left| notices.push(format!("{} ({} left)", e, left)),
            )
            .await;

        assert_eq!(result.unwrap(), "events");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(notices, vec!["Attempt 1 (3 left)", "Attempt 2 (2 left)"]);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut notices = 0;

        let result = fast(3)
            .run(
                || {
                    let counter = counter.clone();
                    async move {
                        let count = counter.fetch_add(1, Ordering::SeqCst);
                        Err::<(), _>(format!("failure {}", count))
                    }
                },
                |_, _| notices += 1,
            )
            .await;

        assert_eq!(result.unwrap_err(), "failure 3");
        assert_eq!(counter.load(Ordering::SeqCst), 4);
        assert_eq!(notices, 3);
    }

    #[tokio::test]
    async fn test_zero_retries_single_attempt() {
        let counter = Arc::new(AtomicU32::new(0));

        let result = fast(0)
            .run(
                || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err::<(), _>("down")
                    }
                },
                |_, _| {},
            )
            .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_delay_is_constant() {
        let start = std::time::Instant::now();
        let policy = RetryPolicy::new(2, Duration::from_millis(40));

        let _ = policy
            .run(|| async { Err::<(), _>("fail") }, |_, _| {})
            .await;

        assert!(start.elapsed() >= Duration::from_millis(80));
    }

    #[test]
    fn test_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.delay, Duration::from_millis(1000));
        assert_eq!(RetryPolicy::from(&FeedSettings::default()), policy);
    }
}
