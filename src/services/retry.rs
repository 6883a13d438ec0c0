use crate::config::ServiceConfig;
use crate::error::{PipelineError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{error, warn};

/// Per-attempt timeout plus capped exponential backoff between attempts
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ServiceConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(
        max_retries: u32,
        initial_backoff: Duration,
        max_backoff: Duration,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            max_retries,
            initial_backoff,
            max_backoff,
            attempt_timeout,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Total attempts including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `call` until it succeeds, fails terminally or attempts are exhausted; the last error is returned
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let delay = self.backoff(attempt);
                warn!(
                    operation,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying service call"
                );
                sleep(delay).await;
            }

            let result = match timeout(self.attempt_timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(PipelineError::Service(format!(
                    "{} timed out after {:?}",
                    operation, self.attempt_timeout
                ))),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    warn!(operation, attempt = attempt + 1, error = %e, "Service call failed");
                    attempt += 1;
                }
                Err(e) => {
                    error!(
                        operation,
                        attempts = attempt + 1,
                        error = %e,
                        "Service call failed, giving up"
                    );
                    return Err(e);
                }
            }
        }
    }
}
