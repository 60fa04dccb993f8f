//! Logging initialization.
//!
//! Logs go to stderr; stdout carries table output. Debug level is the
//! verbose-diagnostics switch: it adds per-attempt failure causes and the
//! redacted request layout to the log.

use epitaph_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directive for a run: `-v` forces debug, otherwise the configured
/// level. `RUST_LOG` still wins over both.
pub fn default_directive(config: &Config, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else if config.logging.level.trim().is_empty() {
        "info".to_string()
    } else {
        config.logging.level.to_lowercase()
    }
}

/// Initialize the subscriber from config, with CLI overrides.
pub fn init_from_config(config: &Config, verbose: bool, json_logs: bool) {
    let directive = default_directive(config, verbose);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let json_format = json_logs || config.logging.format == "json";

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_forces_debug() {
        let mut config = Config::default();
        config.logging.level = "warn".to_string();
        assert_eq!(default_directive(&config, true), "debug");
        assert_eq!(default_directive(&config, false), "warn");
    }

    #[test]
    fn blank_level_falls_back_to_info() {
        let mut config = Config::default();
        config.logging.level = " ".to_string();
        assert_eq!(default_directive(&config, false), "info");
    }
}
