//! Epitaph Core - gravestone photographs to tables.
//!
//! Epitaph drives many independent calls against a vision model API and an
//! OCR engine, and assembles the answers into tables that stay consistent
//! when individual calls fail.
//!
//! # Architecture
//!
//! ```text
//! Folder → Images × Prompts → Retry → Remote model → Validate → Row → Table
//! Folder → OCR → Transcriptions → Retry → Remote model → Parse/Repair → Row → Table
//! ```
//!
//! Every job is wrapped by the retry controller; a job that never succeeds
//! becomes the sentinel `"[ERROR after N attempts]"` in its own field and
//! nothing else.
//!
//! # Usage
//!
//! ```rust,ignore
//! use epitaph_core::{Assembler, AnthropicClient, Config, RetryPolicy};
//!
//! #[tokio::main]
//! async fn main() -> epitaph_core::Result<()> {
//!     let config = Config::load()?;
//!     let client = AnthropicClient::from_config(&config.api, &config.limits, None)?;
//!     let assembler = Assembler::new(Box::new(client), RetryPolicy::from(&config.retry));
//!
//!     let assembly = assembler
//!         .describe_images("./stones".as_ref(), &prompts, &columns)
//!         .await?;
//!     println!("{}", serde_json::to_string(&assembly.table)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod llm;
pub mod ocr;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod table;

pub use config::Config;
pub use error::{
    CallError, ConfigError, EpitaphError, FolderAccessError, ImageError, OcrError, Result,
    TableError,
};
pub use llm::{AnthropicClient, Job, RemoteClient, RetryOutcome, RetryPolicy};
pub use ocr::{transcribe_folder, OcrEngine, TesseractEngine};
pub use output::{read_column, OutputFormat, OutputWriter};
pub use pipeline::{Assembler, Assembly, AssemblyStats};
pub use table::{Row, Table};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
