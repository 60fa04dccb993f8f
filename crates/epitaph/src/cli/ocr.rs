//! The `epitaph ocr` command: transcribe a folder of photographs.

use clap::Args;
use epitaph_core::{transcribe_folder, Config, TesseractEngine};
use std::path::PathBuf;
use std::time::Instant;

use super::common::{expand_path, print_summary, resolve_threshold, write_table, OutputArgs};

/// Arguments for the `ocr` command.
#[derive(Args, Debug, Default)]
pub struct OcrArgs {
    /// Folder of gravestone photographs
    #[arg(required = true)]
    pub folder: PathBuf,

    /// Minimum word confidence, 0-1 (defaults to `ocr.confidence_threshold`)
    #[arg(short, long)]
    pub threshold: Option<f32>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Execute the ocr command.
pub async fn execute(args: OcrArgs, config: &Config) -> anyhow::Result<()> {
    let threshold = resolve_threshold(args.threshold, config)?;
    let folder = expand_path(&args.folder);
    let engine = TesseractEngine::new(&config.ocr);

    let start = Instant::now();
    let (table, stats) =
        transcribe_folder(&engine, &folder, threshold, &config.ocr.image_formats).await;

    write_table(&table, &args.output, config)?;
    print_summary("OCR", &stats, start.elapsed());
    Ok(())
}
