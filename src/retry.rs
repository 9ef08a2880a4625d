//! Retry policy and driver.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::Result;

/// Largest exponent applied to the base delay; keeps the shift in range.
const MAX_BACKOFF_SHIFT: u32 = 20;

/// Bounded-attempt exponential backoff policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt (0 = no retries).
    pub retries: u32,
    /// Base delay before the first retry; doubles on each subsequent one.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Create a new retry policy.
    pub fn new(retries: u32, base_delay: Duration) -> Self {
        Self {
            retries,
            base_delay,
        }
    }

    /// Delay before the given retry, counting from 1.
    ///
    /// The first retry waits the base delay; each one after doubles it.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
        let multiplier = 1u64 << shift;
        let millis = (self.base_delay.as_millis() as u64).saturating_mul(multiplier);
        Duration::from_millis(millis)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(0, crate::config::DEFAULT_RETRY_DELAY)
    }
}

/// Drive an attempt operation under the policy.
///
/// Success returns immediately. Every failure kind is retried alike until
/// the attempt budget is spent; the last failure is then re-raised
/// unchanged. The backoff wait suspends without blocking the runtime.
pub(crate) async fn run<T, F, Fut>(policy: &RetryPolicy, mut attempt_op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempts = 0u32;

    loop {
        match attempt_op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                attempts += 1;
                if attempts > policy.retries {
                    return Err(error);
                }

                let delay = policy.delay_for_attempt(attempts);
                debug!(
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Retrying request after failure"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
