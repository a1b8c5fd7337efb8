//! Bounded retry with pluggable sleeping
//!
//! Screenshot capture talks to a flaky external process, so the whole attempt
//! is repeated a fixed number of times. The delay lives behind a trait so
//! tests can run the policy without real timing.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use crate::error::DriverError;

/// Suspend-and-resume abstraction used by retry and polling loops
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fixed-count retry policy with a constant inter-attempt delay
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // Capture is retried three times total with immediate re-attempts.
        Self {
            max_attempts: 3,
            delay: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds, a fatal error occurs, or attempts run out.
    /// The last error propagates unchanged.
    pub async fn run<T, F, Fut>(&self, sleeper: &dyn Sleeper, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts || !is_retryable(&err) {
                        return Err(err);
                    }
                    debug!(
                        "attempt {}/{} failed, retrying: {err:#}",
                        attempt, self.max_attempts
                    );
                    if !self.delay.is_zero() {
                        sleeper.sleep(self.delay).await;
                    }
                }
            }
        }
    }
}

/// Errors outside [`DriverError`] come from collaborators and count as
/// transport-like, so they retry.
fn is_retryable(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DriverError>()
        .map(DriverError::is_retryable)
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct NoopSleeper;

    #[async_trait]
    impl Sleeper for NoopSleeper {
        async fn sleep(&self, _duration: Duration) {}
    }

    #[tokio::test]
    async fn test_succeeds_on_later_attempt() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);
        let result: Result<u32> = policy
            .run(&NoopSleeper, || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(DriverError::Transport("bridge busy".into()).into())
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_attempts_and_propagates_last_error() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);
        let result: Result<()> = policy
            .run(&NoopSleeper, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(DriverError::CaptureTimeout { timeout_ms: 10000 }.into()) }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DriverError>(),
            Some(DriverError::CaptureTimeout { timeout_ms: 10000 })
        ));
    }

    #[tokio::test]
    async fn test_fatal_error_short_circuits() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);
        let result: Result<()> = policy
            .run(&NoopSleeper, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(DriverError::UnknownAttribute("frame".into()).into()) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_plain_anyhow_errors_are_retried() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);
        let result: Result<()> = policy
            .run(&NoopSleeper, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(anyhow::anyhow!("connection reset")) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
