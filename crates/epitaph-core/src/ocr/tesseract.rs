use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use super::OcrEngine;
use crate::config::OcrConfig;
use crate::error::OcrError;

/// Word-level rows in tesseract's TSV output.
const WORD_LEVEL: &str = "5";

/// Runs the `tesseract` executable once per image.
pub struct TesseractEngine {
    config: OcrConfig,
}

impl TesseractEngine {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.config.command);
        cmd.arg(path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language)
            .arg("--oem")
            .arg(self.config.engine_mode.to_string())
            .arg("--psm")
            .arg(self.config.page_segmentation_mode.to_string());
        if !self.config.char_whitelist.is_empty() {
            cmd.arg("-c").arg(format!(
                "tessedit_char_whitelist={}",
                self.config.char_whitelist
            ));
        }
        cmd.arg("tsv")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, path: &Path, confidence_threshold: f32) -> Result<String, OcrError> {
        tracing::debug!("Running {} on {:?}", self.config.command, path);

        let child = self.command(path).spawn().map_err(|e| OcrError::Spawn {
            command: self.config.command.clone(),
            source: e,
        })?;

        let output = match timeout(
            Duration::from_millis(self.config.timeout_ms),
            child.wait_with_output(),
        )
        .await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(OcrError::Spawn {
                    command: self.config.command.clone(),
                    source: e,
                })
            }
            // The child is killed when its future is dropped.
            Err(_) => {
                return Err(OcrError::Timeout {
                    timeout_ms: self.config.timeout_ms,
                })
            }
        };

        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(parse_tsv(
            &String::from_utf8_lossy(&output.stdout),
            confidence_threshold,
        ))
    }
}

/// Join the recognised words of a tesseract TSV dump.
///
/// Keeps word-level rows whose confidence (0-100 in the dump) is at least
/// `confidence_threshold * 100` and whose text is not blank. The header and
/// malformed rows are ignored.
pub fn parse_tsv(tsv: &str, confidence_threshold: f32) -> String {
    let min_conf = confidence_threshold * 100.0;
    let mut words = Vec::new();

    for line in tsv.lines() {
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 12 || cols[0] != WORD_LEVEL {
            continue;
        }
        let Ok(conf) = cols[10].trim().parse::<f32>() else {
            continue;
        };
        let text = cols[11].trim();
        if conf >= min_conf && !text.is_empty() {
            words.push(text);
        }
    }

    words.join(" ")
}
