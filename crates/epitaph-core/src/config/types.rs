//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Remote vision model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Messages API endpoint
    pub endpoint: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Value of the `anthropic-version` header
    pub anthropic_version: String,

    /// Maximum tokens the model may generate per call
    pub max_tokens: u32,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Fixed wait before every request, to stay under the rate limit
    pub pacing_delay_ms: u64,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// File holding the API key. Takes precedence over `api_key`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            anthropic_version: "2023-06-01".to_string(),
            max_tokens: 1024,
            timeout_ms: 30_000,
            pacing_delay_ms: 1000,
            api_key: "${ANTHROPIC_API_KEY}".to_string(),
            credentials_file: None,
        }
    }
}

/// Limits on images attached to requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum image size in megabytes
    pub max_image_mb: u64,

    /// Extensions that may be attached (case-insensitive)
    pub image_formats: Vec<String>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_image_mb: 5,
            image_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "gif".to_string(),
                "webp".to_string(),
            ],
        }
    }
}

impl LimitsConfig {
    /// The image size limit in bytes.
    pub fn max_image_bytes(&self) -> u64 {
        self.max_image_mb.saturating_mul(1024 * 1024)
    }
}

/// Retry settings for remote jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per job before the sentinel value is recorded
    pub max_attempts: u32,

    /// Fixed delay between attempts in milliseconds
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 2000,
        }
    }
}

/// OCR engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract executable
    pub command: String,

    /// Tesseract language pack
    pub language: String,

    /// OCR engine mode (0-3). 3 = default, LSTM when available.
    pub engine_mode: u8,

    /// Page segmentation mode. 11 = sparse text, which suits weathered stone.
    pub page_segmentation_mode: u8,

    /// Characters tesseract may emit. Empty disables the whitelist.
    pub char_whitelist: String,

    /// Minimum word confidence in [0, 1]
    pub confidence_threshold: f32,

    /// Per-image timeout in milliseconds
    pub timeout_ms: u64,

    /// Extensions picked up by folder transcription
    pub image_formats: Vec<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: "tesseract".to_string(),
            language: "eng".to_string(),
            engine_mode: 3,
            page_segmentation_mode: 11,
            char_whitelist:
                "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.-+ ".to_string(),
            confidence_threshold: 0.1,
            timeout_ms: 60_000,
            image_formats: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "tiff".to_string(),
                "bmp".to_string(),
            ],
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
