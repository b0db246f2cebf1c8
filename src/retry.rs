//! Resilient fetch wrapper
//!
//! Bounded exponential-backoff retry for external calls. Only the transient
//! read-timeout / read-error class is retried; connection refusals, HTTP
//! status errors and decode failures surface immediately. On exhaustion the
//! last error is re-raised to the caller.
//!
//! This is the single resilience primitive in the system: every external
//! call site (registry fetch, symbol lookup, holdings fetch) wraps itself
//! in the same policy instead of duplicating it.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    /// 0.5s initial backoff, doubling, capped at 8s, 3 total attempts.
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            max_attempts: 3,
        }
    }
}

impl RetryPolicy {
    /// Run `op`, retrying while `is_transient` holds and attempts remain.
    pub async fn run<T, E, F, Fut, P>(&self, label: &str, is_transient: P, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut delay = self.base_delay;
        let mut attempt: u32 = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts && is_transient(&e) => {
                    warn!(
                        "{}: attempt {}/{} failed transiently ({}), retrying in {:?}",
                        label, attempt, self.max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay = self.next_delay(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn next_delay(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_delay)
    }
}

/// Transient read-timeout / read-error classification for reqwest calls.
/// Connection refusals, HTTP status errors and decode failures are permanent.
pub fn transient_http(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_body()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Timeout,
        Refused,
    }

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                TestError::Timeout => write!(f, "read timeout"),
                TestError::Refused => write!(f, "connection refused"),
            }
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            max_attempts: 3,
        }
    }

    fn transient(e: &TestError) -> bool {
        *e == TestError::Timeout
    }

    #[tokio::test]
    async fn test_succeeds_after_two_timeouts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = fast_policy()
            .run("test", transient, move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(TestError::Timeout)
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_reraises_last_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: Result<i32, TestError> = fast_policy()
            .run("test", transient, move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::Timeout)
                }
            })
            .await;

        assert_eq!(result, Err(TestError::Timeout));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_transient_raises_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: Result<i32, TestError> = fast_policy()
            .run("test", transient, move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::Refused)
                }
            })
            .await;

        assert_eq!(result, Err(TestError::Refused));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        let d1 = policy.base_delay;
        let d2 = policy.next_delay(d1);
        let d3 = policy.next_delay(d2);
        assert_eq!(d1, Duration::from_millis(500));
        assert_eq!(d2, Duration::from_secs(1));
        assert_eq!(d3, Duration::from_secs(2));

        let near_cap = Duration::from_secs(6);
        assert_eq!(policy.next_delay(near_cap), Duration::from_secs(8));
        assert_eq!(
            policy.next_delay(Duration::from_secs(8)),
            Duration::from_secs(8)
        );
    }
}
