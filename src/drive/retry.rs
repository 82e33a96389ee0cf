/// Retry with a fixed backoff schedule for transient remote failures.
use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// A fixed, non-decreasing delay schedule. The number of delays is also the
/// maximum number of attempts; delay `i` is slept after failed attempt
/// `i + 1`, so the last delay is only used when a further attempt follows.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    pub fn from_secs(secs: &[u64]) -> Self {
        Self::new(secs.iter().map(|&s| Duration::from_secs(s)).collect())
    }

    pub fn max_attempts(&self) -> usize {
        self.delays.len().max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_secs(&[5, 15, 30, 45, 60])
    }
}

/// Run `operation` under the policy. Retryable failures are retried until
/// the schedule is exhausted; everything else returns after one attempt.
/// The same classification table applies to every remote operation, reads
/// and mutations alike.
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = policy.delays[attempt - 1];
                warn!(
                    "{} attempt {}/{} failed: {}. Retrying in {:?}",
                    operation_name, attempt, max_attempts, e, delay
                );
                sleep(delay).await;
            }
            Err(e) => {
                if attempt > 1 {
                    warn!(
                        "{} failed after {} attempts: {}",
                        operation_name, attempt, e
                    );
                } else {
                    warn!("{} failed: {}", operation_name, e);
                }
                return Err(e);
            }
        }
    }
}
