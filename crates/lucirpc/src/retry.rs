//! Retry logic with exponential backoff for transient transport errors.
//!
//! Only [`ErrorCategory::Network`](crate::ErrorCategory::Network) failures
//! are retried. A missing section or a rejected login is never transient.

use crate::error::{Error, Result};
use crate::types::RetryConfig;
use std::thread;

/// Callback trait for retry progress notifications.
pub trait RetryCallback: Send + Sync {
    /// Called when an operation is being retried.
    ///
    /// # Arguments
    /// * `attempt` - Attempt that just failed (1-indexed)
    /// * `max_attempts` - Maximum number of attempts
    /// * `error` - The error that triggered the retry
    /// * `delay_ms` - Milliseconds until next attempt
    fn on_retry(&self, attempt: u32, max_attempts: u32, error: &Error, delay_ms: u128);
}

/// Callback that reports retries through the `log` facade.
pub struct LogCallback;

impl RetryCallback for LogCallback {
    fn on_retry(&self, attempt: u32, max_attempts: u32, error: &Error, delay_ms: u128) {
        log::warn!("attempt {attempt}/{max_attempts} failed: {error}. Retrying in {delay_ms}ms");
    }
}

/// Execute an operation with retry logic.
///
/// Retries the operation if it returns a retryable error, using exponential
/// backoff between attempts.
///
/// # Returns
/// The result of the operation, or the last error if all attempts failed.
pub fn with_retry<T, F>(
    config: &RetryConfig,
    callback: Option<&dyn RetryCallback>,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation() {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !e.is_retryable() || attempt + 1 >= max_attempts {
                    return Err(e);
                }

                let delay = config.delay_for_attempt(attempt);
                if let Some(cb) = callback {
                    cb.on_retry(attempt + 1, max_attempts, &e, delay.as_millis());
                }

                thread::sleep(delay);
                attempt += 1;
            }
        }
    }
}
