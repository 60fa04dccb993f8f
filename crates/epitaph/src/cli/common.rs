//! Pieces shared by the `describe`, `extract` and `ocr` commands.

use anyhow::Context;
use clap::{Args, ValueEnum};
use epitaph_core::llm::RemoteClient;
use epitaph_core::{
    AnthropicClient, Assembler, AssemblyStats, Config, OutputFormat as CoreOutputFormat,
    OutputWriter, RetryPolicy, Table,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Supported output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON array of records
    Json,
    /// One JSON record per line (newline-delimited)
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Remote model overrides.
#[derive(Args, Debug, Default, Clone)]
pub struct ApiArgs {
    /// Model identifier (overrides `api.model`)
    #[arg(long)]
    pub model: Option<String>,

    /// File holding the API key (overrides `api.credentials_file`)
    #[arg(long, env = "EPITAPH_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Attempts per job before the sentinel is recorded (overrides `retry.max_attempts`)
    #[arg(long)]
    pub max_attempts: Option<u32>,
}

/// Where and how the resulting table is written.
#[derive(Args, Debug, Default, Clone)]
pub struct OutputArgs {
    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to `output.format`)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Expand `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// Build the remote client and assembler from config plus CLI overrides.
///
/// The assembler advances `progress` after every finished item.
pub fn build_assembler(
    config: &Config,
    api: &ApiArgs,
    progress: &ProgressBar,
) -> anyhow::Result<Assembler> {
    let mut api_config = config.api.clone();
    if let Some(model) = &api.model {
        api_config.model = model.clone();
    }
    let mut retry = config.retry.clone();
    if let Some(max_attempts) = api.max_attempts {
        retry.max_attempts = max_attempts;
    }

    let credentials = api
        .credentials
        .as_deref()
        .map(expand_path)
        .or_else(|| config.credentials_path());
    let client = AnthropicClient::from_config(&api_config, &config.limits, credentials.as_deref())
        .context("Failed to set up the API client")?;
    let policy = RetryPolicy::from(&retry);
    tracing::info!(
        "Using {} via {} ({} attempt(s) per job, {:?} between attempts)",
        client.model(),
        client.name(),
        policy.max_attempts,
        policy.delay
    );

    let progress = progress.clone();
    Ok(
        Assembler::new(Box::new(client), policy).with_progress(move |done, total| {
            progress.set_length(total as u64);
            progress.set_position(done as u64);
        }),
    )
}

/// OCR confidence threshold from the CLI or config, checked to lie in [0, 1].
pub fn resolve_threshold(cli: Option<f32>, config: &Config) -> anyhow::Result<f32> {
    let threshold = cli.unwrap_or(config.ocr.confidence_threshold);
    if !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!("Confidence threshold must be between 0 and 1, got {threshold}");
    }
    Ok(threshold)
}

/// Output format from the CLI, else config, else JSON.
pub fn resolve_format(args: &OutputArgs, config: &Config) -> CoreOutputFormat {
    args.format.map(Into::into).unwrap_or_else(|| {
        CoreOutputFormat::parse(&config.output.format).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown output format {:?} in config, using json",
                config.output.format
            );
            CoreOutputFormat::Json
        })
    })
}

/// Write `table` to the output file or stdout.
pub fn write_table(table: &Table, args: &OutputArgs, config: &Config) -> anyhow::Result<()> {
    let format = resolve_format(args, config);
    let pretty = args.pretty || config.output.pretty;

    match &args.output {
        Some(path) => {
            let path = expand_path(path);
            let file = File::create(&path)
                .with_context(|| format!("Failed to create output file {path:?}"))?;
            let mut writer = OutputWriter::new(BufWriter::new(file), format, pretty);
            writer.write_table(table)?;
            writer.flush()?;
            tracing::info!(
                "Wrote {} record(s) to {:?}",
                writer.records_written(),
                path
            );
        }
        None => {
            let stdout = io::stdout();
            let mut writer = OutputWriter::new(stdout.lock(), format, pretty);
            writer.write_table(table)?;
            writer.flush()?;
        }
    }
    Ok(())
}

pub fn create_progress_bar(message: &str) -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb.set_message(message.to_string());
    pb
}

/// Print a run summary to stderr.
pub fn print_summary(title: &str, stats: &AssemblyStats, elapsed: Duration) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("    {title}");
    eprintln!("  ====================================");
    if let Some(err) = &stats.folder_error {
        eprintln!("    {err}");
        eprintln!("  ------------------------------------");
    }
    eprintln!("    Rows:         {:>8}", stats.items);
    if stats.jobs > 0 {
        eprintln!("    Jobs:         {:>8}", stats.jobs);
        eprintln!("    Attempts:     {:>8}", stats.attempts);
    }
    if stats.exhausted > 0 {
        eprintln!("    Sentinels:    {:>8}", stats.exhausted);
    }
    if stats.failed > 0 {
        eprintln!("    Failed:       {:>8}", stats.failed);
    }
    if stats.repaired > 0 {
        eprintln!("    Repaired:     {:>8}", stats.repaired);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("  ====================================");
}
