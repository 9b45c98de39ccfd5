//! Retry with exponential backoff for transient provider failures

use crate::{LLMError, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,

    /// Backoff before the second attempt
    pub initial_backoff: Duration,

    /// Upper bound on any single backoff
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given number of attempts and default backoff
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Backoff before attempt number `attempt` (0-based, so attempt 0 waits nothing)
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2_u32.saturating_pow(attempt - 1);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `operation`, retrying while it fails with a transient error
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(operation = operation_name, retries = attempt, "succeeded after retry");
                    }
                    return Ok(result);
                }
                Err(e) if e.is_transient() && attempt + 1 < self.max_attempts => {
                    attempt += 1;
                    let backoff = self.backoff_duration(attempt);
                    warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "transient failure, retrying in {backoff:?}"
                    );
                    sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Map an HTTP status and body to the matching error
pub(crate) fn classify_status(status: u16, body: String, model: &str) -> LLMError {
    match status {
        401 | 403 => LLMError::AuthenticationFailed,
        429 => LLMError::RateLimitExceeded(body),
        400 => LLMError::InvalidRequest(body),
        404 => LLMError::ModelNotFound(model.to_string()),
        500..=599 => LLMError::ServiceUnavailable(format!("HTTP {status}: {body}")),
        _ => LLMError::RequestFailed(format!("HTTP {status}: {body}")),
    }
}
