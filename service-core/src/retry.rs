//! Retry utilities for calls to external collaborators.
//!
//! Provides configurable bounded retry with exponential backoff. Only
//! transient failures (see [`AppError::is_transient`]) are retried;
//! business-rule failures surface immediately.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::error::AppError;

/// Configuration for retry behavior.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,
    /// Initial backoff duration before first retry.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add jitter to backoff duration.
    pub add_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with the specified max retries.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Create a config with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Calculate backoff duration for a given attempt.
    fn backoff_duration(&self, attempt: u32) -> Duration {
        let backoff =
            self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let backoff_ms = backoff.min(self.max_backoff.as_millis() as f64) as u64;

        let mut duration = Duration::from_millis(backoff_ms);

        if self.add_jitter {
            // Up to 25% jitter
            let jitter = (backoff_ms as f64 * 0.25 * rand::random::<f64>()) as u64;
            duration += Duration::from_millis(jitter);
        }

        duration
    }
}

/// Run `operation` with bounded retries under `config`.
///
/// `operation` is invoked at most `max_retries + 1` times. Non-transient
/// errors abort the loop immediately.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < config.max_retries => {
                let backoff = config.backoff_duration(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "transient failure, retrying"
                );
                sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_transient_failures_up_to_limit() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            add_jitter: false,
            ..Default::default()
        };

        let result: Result<(), _> = with_retry(&config, "estimate", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::DistanceUnavailable(anyhow!("timeout"))) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_business_failures() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig::with_max_retries(3);

        let result: Result<(), _> = with_retry(&config, "debit", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(AppError::InsufficientFunds {
                    balance: 50.0,
                    requested: 100.0,
                })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            add_jitter: false,
            ..Default::default()
        };

        let result = with_retry(&config, "estimate", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 1 {
                    Err(AppError::DistanceUnavailable(anyhow!("flaky")))
                } else {
                    Ok(7.5)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7.5);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
