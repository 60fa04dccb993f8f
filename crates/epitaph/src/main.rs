//! Epitaph CLI - gravestone photographs to tables.
//!
//! Runs a vision model and an OCR engine over folders of gravestone
//! photographs and writes the answers as JSON or JSON Lines tables.
//!
//! # Usage
//!
//! ```bash
//! # Describe every photograph with the built-in prompts
//! epitaph describe ./stones/ --output descriptions.json
//!
//! # Transcribe with OCR, then extract name and dates
//! epitaph ocr ./stones/ --output ocr.jsonl --format jsonl
//! epitaph extract ocr.jsonl --output records.json
//!
//! # View configuration
//! epitaph config show
//! ```

use clap::{Parser, Subcommand};
use epitaph_core::Config;
use std::path::PathBuf;

mod cli;
mod logging;

/// Epitaph - extract gravestone descriptions and records from photographs.
#[derive(Parser, Debug)]
#[command(name = "epitaph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging, including per-attempt failure causes
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "EPITAPH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run prompts against every photograph in a folder
    Describe(cli::describe::DescribeArgs),

    /// Extract structured fields from OCR transcriptions
    Extract(cli::extract::ExtractArgs),

    /// Transcribe the photographs in a folder with OCR
    Ocr(cli::ocr::OcrArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings use eprintln.
    let config_path = cli
        .config
        .as_deref()
        .map(cli::common::expand_path)
        .unwrap_or_else(Config::default_path);
    let config = if cli.config.is_some() {
        Config::load_from(&config_path)?
    } else {
        match Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `epitaph config path`."
                );
                Config::default()
            }
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Epitaph v{}", epitaph_core::VERSION);

    let run = async {
        match cli.command {
            Commands::Describe(args) => cli::describe::execute(args, &config).await,
            Commands::Extract(args) => cli::extract::execute(args, &config).await,
            Commands::Ocr(args) => cli::ocr::execute(args, &config).await,
            Commands::Config(args) => cli::config::execute(args, &config, &config_path).await,
        }
    };

    // Dropping the run future also abandons any pending retry delay.
    tokio::select! {
        result = run => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted; no output written");
            std::process::exit(130);
        }
    }
}
