//! The `epitaph extract` command: structured records from transcriptions.
//!
//! The input is either a folder of photographs, which is run through OCR
//! first, or a JSON/JSONL table such as the one `epitaph ocr` writes.

use anyhow::Context;
use clap::Args;
use epitaph_core::ocr::TRANSCRIPTION_COLUMN as OCR_COLUMN;
use epitaph_core::prompts::{extract_columns, DEFAULT_EXTRACT_FIELDS, DEFAULT_EXTRACT_PROMPT};
use epitaph_core::{read_column, transcribe_folder, Config, TesseractEngine};
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::common::{
    build_assembler, create_progress_bar, expand_path, print_summary, resolve_threshold,
    write_table, ApiArgs, OutputArgs,
};

/// Arguments for the `extract` command.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Folder of photographs (OCR runs first) or a JSON/JSONL table of transcriptions
    #[arg(required = true)]
    pub input: PathBuf,

    /// Column holding the transcriptions when the input is a table
    #[arg(long, default_value = OCR_COLUMN)]
    pub transcription_column: String,

    /// Prompt placed before each transcription
    #[arg(short, long, conflicts_with = "prompt_file")]
    pub prompt: Option<String>,

    /// Read the prompt from a file
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// Field expected in each answer, in answer order; repeat for several
    #[arg(long = "field")]
    pub fields: Vec<String>,

    /// Minimum OCR word confidence (0-1) when the input is a folder
    #[arg(long)]
    pub threshold: Option<f32>,

    #[command(flatten)]
    pub api: ApiArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Values match the clap annotations above.
impl Default for ExtractArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            transcription_column: OCR_COLUMN.to_string(),
            prompt: None,
            prompt_file: None,
            fields: Vec::new(),
            threshold: None,
            api: ApiArgs::default(),
            output: OutputArgs::default(),
        }
    }
}

/// Pick the prompt and field list for a run.
///
/// The built-in prompt asks for the built-in fields, so `--field` is only
/// accepted together with a custom prompt.
pub fn resolve_prompt(args: &ExtractArgs) -> anyhow::Result<(String, Vec<String>)> {
    let custom = match (&args.prompt, &args.prompt_file) {
        (Some(prompt), _) => Some(prompt.clone()),
        (None, Some(path)) => {
            let path = expand_path(path);
            Some(
                std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read prompt file {path:?}"))?,
            )
        }
        (None, None) => None,
    };

    match custom {
        Some(prompt) => {
            if prompt.trim().is_empty() {
                anyhow::bail!("The extraction prompt is empty");
            }
            let fields = if args.fields.is_empty() {
                DEFAULT_EXTRACT_FIELDS.iter().map(|f| f.to_string()).collect()
            } else {
                args.fields.clone()
            };
            Ok((prompt, fields))
        }
        None if !args.fields.is_empty() => {
            anyhow::bail!("--field requires --prompt or --prompt-file asking for those fields")
        }
        None => Ok((
            DEFAULT_EXTRACT_PROMPT.to_string(),
            DEFAULT_EXTRACT_FIELDS.iter().map(|f| f.to_string()).collect(),
        )),
    }
}

/// Transcriptions from a folder (via OCR) or a table file.
async fn load_transcriptions(
    input: &Path,
    args: &ExtractArgs,
    config: &Config,
) -> anyhow::Result<Vec<String>> {
    if input.is_dir() {
        let threshold = resolve_threshold(args.threshold, config)?;
        let engine = TesseractEngine::new(&config.ocr);
        let start = Instant::now();
        let (table, stats) =
            transcribe_folder(&engine, input, threshold, &config.ocr.image_formats).await;
        print_summary("OCR", &stats, start.elapsed());
        Ok(table.column(OCR_COLUMN)?.into_iter().map(str::to_string).collect())
    } else {
        read_column(input, &args.transcription_column)
            .with_context(|| format!("Failed to read transcriptions from {input:?}"))
    }
}

/// Execute the extract command.
pub async fn execute(args: ExtractArgs, config: &Config) -> anyhow::Result<()> {
    let (prompt, fields) = resolve_prompt(&args)?;
    let columns = extract_columns(&fields);
    let input = expand_path(&args.input);

    let progress = create_progress_bar("extracting...");
    let assembler = build_assembler(config, &args.api, &progress)?;

    let transcriptions = load_transcriptions(&input, &args, config).await?;
    if transcriptions.is_empty() {
        tracing::warn!("No transcriptions found in {:?}", input);
    }

    let start = Instant::now();
    let assembly = assembler
        .extract_from_transcriptions(&transcriptions, &prompt, &columns)
        .await?;
    progress.finish_and_clear();

    write_table(&assembly.table, &args.output, config)?;
    print_summary("Extract", &assembly.stats, start.elapsed());
    Ok(())
}
