//! OCR over gravestone photographs.
//!
//! The engine is a collaborator behind [`OcrEngine`]; [`transcribe_folder`]
//! turns a folder of photographs into an `Image Name` / `OCR Transcription`
//! table that feeds structured extraction.

mod tesseract;

pub use tesseract::{parse_tsv, TesseractEngine};

use async_trait::async_trait;
use std::path::Path;

use crate::error::OcrError;
use crate::pipeline::{filter_by_extension, list_files_in_folder, AssemblyStats};
use crate::table::Table;

pub use crate::prompts::IMAGE_NAME_COLUMN;

/// Column holding the recognised text.
pub const TRANSCRIPTION_COLUMN: &str = "OCR Transcription";

/// Text recognition engine.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Engine name for logging.
    fn name(&self) -> &str;

    /// Recognise the words in one image, keeping those with confidence at or
    /// above `confidence_threshold` (0 to 1), joined by single spaces.
    async fn recognize(&self, path: &Path, confidence_threshold: f32) -> Result<String, OcrError>;
}

/// Transcribe every image in `folder` whose extension is in `formats`.
///
/// An image the engine fails on still gets a row; its transcription is the
/// error text and it is counted in [`AssemblyStats::failed`]. A folder that cannot be read yields an empty table and sets
/// [`AssemblyStats::folder_error`].
pub async fn transcribe_folder(
    engine: &dyn OcrEngine,
    folder: &Path,
    confidence_threshold: f32,
    formats: &[String],
) -> (Table, AssemblyStats) {
    let columns = vec![
        IMAGE_NAME_COLUMN.to_string(),
        TRANSCRIPTION_COLUMN.to_string(),
    ];
    let mut stats = AssemblyStats::default();

    let files = match list_files_in_folder(folder) {
        Ok(files) => filter_by_extension(files, formats),
        Err(e) => {
            tracing::error!("{e}");
            stats.folder_error = Some(e);
            return (Table::empty(columns), stats);
        }
    };
    tracing::info!("Running {} on {} image(s)", engine.name(), files.len());

    let mut rows = Vec::with_capacity(files.len());
    for file in &files {
        tracing::info!("Processing {} ({} bytes)...", file.file_name, file.size);
        let text = match engine.recognize(&file.path, confidence_threshold).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("OCR failed for {:?}: {e}", file.path);
                stats.failed += 1;
                format!("Error processing {}: {e}", file.path.display())
            }
        };
        rows.push(vec![file.file_name.clone(), text]);
        stats.items += 1;
    }

    // Every row is built with exactly two fields.
    let table = Table::build(rows, columns.clone()).unwrap_or_else(|e| {
        tracing::error!("{e}");
        Table::empty(columns)
    });
    (table, stats)
}
