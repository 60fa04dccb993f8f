//! Bounded retries for remote jobs.
//!
//! A unit of work reports each attempt as an [`Attempt`]; the loop is driven
//! by that value alone. Exhaustion is not an error: callers turn it into the
//! [`sentinel`] text, which is recorded like any other field value.

use crate::config::RetryConfig;
use crate::error::CallError;
use std::future::Future;
use std::time::Duration;

/// How many attempts to make and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: Duration::from_millis(config.delay_ms),
        }
    }
}

/// Result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// Done; no further attempts.
    Success(T),
    /// Failed, worth trying again.
    Retry(String),
    /// Failed in a way another attempt cannot fix.
    Fatal(String),
}

impl<T> From<CallError> for Attempt<T> {
    fn from(error: CallError) -> Self {
        if is_retryable(&error) {
            Attempt::Retry(error.to_string())
        } else {
            Attempt::Fatal(error.to_string())
        }
    }
}

/// Final result of a retried unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    Success { value: T, attempts: u32 },
    /// `attempts` is what was actually made; `max_attempts` is the policy
    /// limit, which the sentinel always reports.
    Exhausted {
        attempts: u32,
        max_attempts: u32,
        last_error: String,
    },
}

impl<T> RetryOutcome<T> {
    /// Number of attempts made.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Success { attempts, .. } | RetryOutcome::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }
}

impl RetryOutcome<String> {
    /// The field value for this outcome: the text on success, the sentinel otherwise.
    pub fn into_field(self) -> String {
        match self {
            RetryOutcome::Success { value, .. } => value,
            RetryOutcome::Exhausted { max_attempts, .. } => sentinel(max_attempts),
        }
    }
}

/// Placeholder recorded when a job never succeeded.
pub fn sentinel(attempts: u32) -> String {
    format!("[ERROR after {attempts} attempts]")
}

/// Determine whether a call error is worth retrying.
///
/// Transport failures, malformed responses and arity mismatches are all
/// retryable: the remote side is unreliable and a second answer may differ.
/// Only a job that is invalid before it is sent is not.
pub fn is_retryable(error: &CallError) -> bool {
    match error {
        CallError::Transport { .. }
        | CallError::MalformedResponse(_)
        | CallError::ArityMismatch { .. } => true,
        CallError::InvalidJob(_) => false,
    }
}

/// Run `work` until it succeeds, fails fatally, or `policy.max_attempts`
/// attempts have been made. `work` receives the 1-based attempt number.
///
/// The delay only separates attempts; nothing sleeps after the last one.
/// Failures are logged at debug level with `label` so verbose runs show
/// which image and prompt were retried.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut work: F) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        match work(attempt).await {
            Attempt::Success(value) => {
                return RetryOutcome::Success {
                    value,
                    attempts: attempt,
                }
            }
            Attempt::Fatal(reason) => {
                tracing::debug!("{label}: attempt {attempt}/{max_attempts} failed fatally: {reason}");
                return RetryOutcome::Exhausted {
                    attempts: attempt,
                    max_attempts,
                    last_error: reason,
                };
            }
            Attempt::Retry(reason) => {
                tracing::debug!("{label}: attempt {attempt}/{max_attempts} failed: {reason}");
                last_error = reason;
                if attempt < max_attempts && !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    tracing::warn!("{label}: giving up after {max_attempts} attempts: {last_error}");
    RetryOutcome::Exhausted {
        attempts: max_attempts,
        max_attempts,
        last_error,
    }
}
