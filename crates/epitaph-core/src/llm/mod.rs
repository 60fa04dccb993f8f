//! Remote vision model integration.
//!
//! A [`RemoteClient`] performs exactly one request per call; the response
//! validator turns raw JSON into text; the retry controller wraps each job
//! with bounded attempts and converts exhaustion into a sentinel value.

pub(crate) mod anthropic;
pub(crate) mod provider;
pub(crate) mod response;
pub mod retry;

pub use anthropic::AnthropicClient;
pub use provider::{load_api_key, redact_key, resolve_env_var, ImageInput, Job, RemoteClient};
pub use response::validate_response;
pub use retry::{sentinel, with_retry, Attempt, RetryOutcome, RetryPolicy};
