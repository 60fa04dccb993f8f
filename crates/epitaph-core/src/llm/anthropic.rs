//! Anthropic client for the Messages API.
//!
//! Sends an optional base64 image block followed by the prompt text. One
//! call to [`RemoteClient::send`] is exactly one HTTP request; retries belong
//! to the caller.

use super::provider::{load_api_key, redact_key, ImageInput, Job, RemoteClient};
use crate::config::{ApiConfig, LimitsConfig};
use crate::error::{CallError, ConfigError};
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Anthropic client using the Messages API.
pub struct AnthropicClient {
    api_key: String,
    api: ApiConfig,
    limits: LimitsConfig,
    client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(api_key: &str, api: ApiConfig, limits: LimitsConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(api.timeout_ms))
            .build()
            .map_err(|e| ConfigError::ValidationError(format!("HTTP client: {e}")))?;
        Ok(Self {
            api_key: api_key.to_string(),
            api,
            limits,
            client,
        })
    }

    /// Build a client from config, loading the key from `credentials` (or
    /// the configured key / environment variable).
    pub fn from_config(
        api: &ApiConfig,
        limits: &LimitsConfig,
        credentials: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let api_key = load_api_key(api, credentials)?;
        Self::new(&api_key, api.clone(), limits.clone())
    }
}

// --- Request types ---

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "image")]
    Image { source: ImageSource },
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: String,
    media_type: String,
    data: String,
}

/// Build the request body for a job.
///
/// An image that cannot be attached (too large, unsupported, unreadable)
/// is dropped with a warning and the request goes out as text only.
fn build_request(job: &Job, model: &str, max_tokens: u32, limits: &LimitsConfig) -> MessagesRequest {
    let mut content = Vec::with_capacity(2);

    if let Some(path) = &job.image {
        match ImageInput::from_path(path, limits) {
            Ok(image) => content.push(ContentBlock::Image {
                source: ImageSource {
                    source_type: "base64".to_string(),
                    media_type: image.media_type,
                    data: image.data,
                },
            }),
            Err(e) => tracing::warn!("{e}; continuing with text only"),
        }
    }

    content.push(ContentBlock::Text {
        text: job.prompt.clone(),
    });

    MessagesRequest {
        model: model.to_string(),
        max_tokens,
        messages: vec![Message {
            role: "user".to_string(),
            content,
        }],
    }
}

#[async_trait]
impl RemoteClient for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.api.model
    }

    async fn send(&self, job: &Job) -> Result<serde_json::Value, CallError> {
        if job.prompt.trim().is_empty() {
            return Err(CallError::InvalidJob("prompt is empty".to_string()));
        }

        let body = build_request(job, &self.api.model, self.api.max_tokens, &self.limits);
        let has_image = matches!(
            body.messages[0].content.first(),
            Some(ContentBlock::Image { .. })
        );
        tracing::debug!(
            endpoint = %self.api.endpoint,
            model = %self.api.model,
            api_key = %redact_key(&self.api_key),
            has_image,
            "Sending request for {}",
            job.label()
        );

        if self.api.pacing_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.api.pacing_delay_ms)).await;
        }

        let resp = self
            .client
            .post(&self.api.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api.anthropic_version)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CallError::Transport {
                message: format!("Anthropic request failed: {e}"),
                status_code: None,
            })?;

        let status = resp.status();
        tracing::debug!("Response status: {status}");
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(CallError::Transport {
                message: format!("Anthropic HTTP {status}: {text}"),
                status_code: Some(status.as_u16()),
            });
        }

        resp.json::<serde_json::Value>()
            .await
            .map_err(|e| CallError::MalformedResponse(format!("body is not JSON: {e}")))
    }
}
