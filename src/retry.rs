//! Bounded exponential-backoff retry for transient host failures.

use crate::error::RelinkError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry policy: `max_attempts` total attempts with delays `d, 2d, 4d, ...`
/// between them. Backoff state is per call; concurrent calls each run an
/// independent sequence. No jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: usize,
    initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    /// Run `operation`, retrying only on the transient rate-limit signal.
    ///
    /// Any other failure, and the final rate-limited failure once attempts
    /// are exhausted, propagates unchanged.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, RelinkError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RelinkError>>,
    {
        let mut delay = self.initial_delay;
        let mut attempt = 1usize;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_rate_limited() && attempt < self.max_attempts => {
                    debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "rate limited, backing off"
                    );
                    sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_rate_limited() {
                        warn!(attempts = attempt, "rate limited, attempts exhausted");
                    }
                    return Err(err);
                }
            }
        }
    }
}
