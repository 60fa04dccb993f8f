//! Remote client trait, job and image payload types, credential loading.

use super::response::validate_response;
use crate::config::{ApiConfig, LimitsConfig};
use crate::error::{CallError, ConfigError, ImageError};
use async_trait::async_trait;
use base64::Engine;
use std::path::{Path, PathBuf};

/// One unit of remote work: a prompt, an optional image, and the column its
/// answer lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Text prompt for the model
    pub prompt: String,
    /// Image to attach, if any
    pub image: Option<PathBuf>,
    /// Column name the result is recorded under
    pub field: String,
}

impl Job {
    /// A text-only job.
    pub fn text(prompt: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            field: field.into(),
        }
    }

    /// A job that attaches an image ahead of the prompt.
    pub fn with_image(
        prompt: impl Into<String>,
        image: impl Into<PathBuf>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            image: Some(image.into()),
            field: field.into(),
        }
    }

    /// Short label for log lines: image file name (if any) and field.
    pub fn label(&self) -> String {
        match self.image.as_deref().and_then(Path::file_name) {
            Some(name) => format!("{} / {}", name.to_string_lossy(), self.field),
            None => self.field.clone(),
        }
    }
}

/// Base64-encoded image ready to send to the API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Read and encode an image file, enforcing the size limit and the
    /// extension allow-list.
    ///
    /// The size check runs before the extension check so an oversized file
    /// is never read into memory.
    pub fn from_path(path: &Path, limits: &LimitsConfig) -> Result<Self, ImageError> {
        let size_bytes = std::fs::metadata(path)
            .map_err(|source| ImageError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        let max_bytes = limits.max_image_bytes();
        if size_bytes > max_bytes {
            return Err(ImageError::ImageTooLarge {
                path: path.to_path_buf(),
                size_bytes,
                max_bytes,
            });
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let allowed = limits
            .image_formats
            .iter()
            .any(|fmt| fmt.eq_ignore_ascii_case(&extension));
        let media_type = match media_type_for(&extension) {
            Some(media_type) if allowed => media_type,
            _ => {
                return Err(ImageError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    extension,
                })
            }
        };

        let bytes = std::fs::read(path).map_err(|source| ImageError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        })
    }
}

/// Map a lowercase file extension to the media type the API expects.
fn media_type_for(extension: &str) -> Option<&'static str> {
    match extension {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// A client able to send one job to a remote vision model.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the assembler holds a `Box<dyn RemoteClient>`). Implementations never
/// retry: one call to `send` is one attempt.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Client name for logging (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Model identifier used for requests.
    fn model(&self) -> &str;

    /// Send one job and return the raw JSON response.
    async fn send(&self, job: &Job) -> Result<serde_json::Value, CallError>;

    /// Send one job and extract the response text.
    async fn complete(&self, job: &Job) -> Result<String, CallError> {
        let raw = self.send(job).await?;
        validate_response(&raw)
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Load the API key: the credentials file wins, then `api_key` (which may
/// reference an environment variable).
pub fn load_api_key(api: &ApiConfig, credentials: Option<&Path>) -> Result<String, ConfigError> {
    if let Some(path) = credentials {
        let key = std::fs::read_to_string(path).map_err(|e| ConfigError::Credentials {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::Credentials {
                path: path.to_path_buf(),
                reason: "file is empty".to_string(),
            });
        }
        return Ok(key.to_string());
    }
    resolve_env_var(&api.api_key).ok_or(ConfigError::MissingApiKey)
}

/// Shorten a secret for diagnostics: the first 10 characters, then `...`.
pub fn redact_key(key: &str) -> String {
    let prefix: String = key.chars().take(10).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_image_input_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "stone.PNG", &[0x89, 0x50, 0x4E, 0x47]);
        let input = ImageInput::from_path(&path, &LimitsConfig::default()).unwrap();
        assert_eq!(input.media_type, "image/png");
        assert_eq!(input.data, "iVBORw==");
    }

    #[test]
    fn test_image_input_jpg_maps_to_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "stone.jpg", &[0xFF, 0xD8, 0xFF]);
        let input = ImageInput::from_path(&path, &LimitsConfig::default()).unwrap();
        assert_eq!(input.media_type, "image/jpeg");
    }

    #[test]
    fn test_image_input_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "stone.bmp", &[0x42, 0x4D]);
        let err = ImageInput::from_path(&path, &LimitsConfig::default()).unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedFormat { ref extension, .. } if extension == "bmp"));
    }

    #[test]
    fn test_image_input_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let limits = LimitsConfig {
            max_image_mb: 1,
            ..LimitsConfig::default()
        };
        let path = write_file(dir.path(), "huge.png", &vec![0u8; 1024 * 1024 + 1]);
        let err = ImageInput::from_path(&path, &limits).unwrap_err();
        assert!(matches!(
            err,
            ImageError::ImageTooLarge {
                size_bytes: 1_048_577,
                max_bytes: 1_048_576,
                ..
            }
        ));
    }

    #[test]
    fn test_image_input_exactly_at_limit_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let limits = LimitsConfig {
            max_image_mb: 1,
            ..LimitsConfig::default()
        };
        let path = write_file(dir.path(), "edge.webp", &vec![0u8; 1024 * 1024]);
        let input = ImageInput::from_path(&path, &limits).unwrap();
        assert_eq!(input.media_type, "image/webp");
    }

    #[test]
    fn test_image_input_missing_file() {
        let err = ImageInput::from_path(Path::new("/nonexistent/stone.png"), &LimitsConfig::default())
            .unwrap_err();
        assert!(matches!(err, ImageError::Read { .. }));
    }

    #[test]
    fn test_job_label() {
        let job = Job::with_image("Describe", "/data/row3/smith.jpg", "Description");
        assert_eq!(job.label(), "smith.jpg / Description");
        assert_eq!(Job::text("Extract", "Fields").label(), "Fields");
    }

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }

    #[test]
    fn test_load_api_key_prefers_credentials_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "key.txt", b"  sk-ant-from-file\n");
        let api = ApiConfig {
            api_key: "sk-ant-from-config".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(load_api_key(&api, Some(&path)).unwrap(), "sk-ant-from-file");
        assert_eq!(load_api_key(&api, None).unwrap(), "sk-ant-from-config");
    }

    #[test]
    fn test_load_api_key_empty_credentials_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "key.txt", b"\n");
        let err = load_api_key(&ApiConfig::default(), Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Credentials { .. }));
    }

    #[test]
    fn test_load_api_key_missing() {
        let api = ApiConfig {
            api_key: "${DEFINITELY_NOT_SET_XYZ_123}".to_string(),
            ..ApiConfig::default()
        };
        assert!(matches!(load_api_key(&api, None), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_redact_key() {
        assert_eq!(redact_key("sk-ant-api03-secret"), "sk-ant-api...");
        assert_eq!(redact_key("short"), "short...");
    }
}
