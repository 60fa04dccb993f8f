//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.api.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.endpoint must not be empty".into(),
            ));
        }
        if self.api.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.model must not be empty".into(),
            ));
        }
        if self.api.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "api.max_tokens must be > 0".into(),
            ));
        }
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.max_image_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_mb must be > 0".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be > 0".into(),
            ));
        }
        if self.ocr.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "ocr.timeout_ms must be > 0".into(),
            ));
        }
        if self.ocr.engine_mode > 3 {
            return Err(ConfigError::ValidationError(
                "ocr.engine_mode must be between 0 and 3".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.ocr.confidence_threshold) {
            return Err(ConfigError::ValidationError(
                "ocr.confidence_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_validate_rejects_empty_endpoint() {
        let mut config = Config::default();
        config.api.endpoint = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api.endpoint"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.api.timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_unknown_engine_mode() {
        let mut config = Config::default();
        config.ocr.engine_mode = 4;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("engine_mode"));
    }

    #[test]
    fn test_validate_rejects_invalid_confidence_threshold() {
        let mut config = Config::default();
        config.ocr.confidence_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("confidence_threshold"));

        config.ocr.confidence_threshold = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("confidence_threshold"));
    }
}
