//! Batch assembly of tables from remote jobs.
//!
//! - **discovery**: list the files in an input folder
//! - **describe**: one row per image, one field per prompt
//! - **extract**: one row per transcription, fields parsed from a delimited answer
//!
//! Processing is strictly sequential: one job (with all of its retries) is
//! finished before the next starts. A job's failure only ever affects its
//! own field.

pub mod describe;
pub mod discovery;
pub mod extract;

pub use discovery::{filter_by_extension, list_files_in_folder, DiscoveredFile};
pub use extract::{fit_row, parse_fields, MISSING_FIELD};

use crate::error::FolderAccessError;
use crate::llm::{RemoteClient, RetryOutcome, RetryPolicy};
use crate::table::Table;

/// Progress callback: `(items done, items total)`.
pub type ProgressFn = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Counters for one assembler run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    /// Images or transcriptions processed
    pub items: usize,
    /// Retry-wrapped jobs run
    pub jobs: usize,
    /// Remote attempts made across all jobs
    pub attempts: u64,
    /// Jobs that ended in the sentinel value
    pub exhausted: usize,
    /// Items whose collaborator (the OCR engine) failed; the row holds the error text
    pub failed: usize,
    /// Rows whose length had to be truncated or padded
    pub repaired: usize,
    /// Set when the input folder could not be read
    pub folder_error: Option<FolderAccessError>,
}

impl AssemblyStats {
    pub(crate) fn record<T>(&mut self, outcome: &RetryOutcome<T>) {
        self.jobs += 1;
        self.attempts += u64::from(outcome.attempts());
        if matches!(outcome, RetryOutcome::Exhausted { .. }) {
            self.exhausted += 1;
        }
    }
}

/// A finished table and how it was produced.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub table: Table,
    pub stats: AssemblyStats,
}

/// Drives remote jobs through the retry controller and collects rows.
pub struct Assembler {
    client: Box<dyn RemoteClient>,
    policy: RetryPolicy,
    on_progress: Option<ProgressFn>,
}

impl Assembler {
    pub fn new(client: Box<dyn RemoteClient>, policy: RetryPolicy) -> Self {
        Self {
            client,
            policy,
            on_progress: None,
        }
    }

    /// Report progress after every finished item.
    pub fn with_progress<F>(mut self, on_progress: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(on_progress));
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn client(&self) -> &dyn RemoteClient {
        self.client.as_ref()
    }

    fn report_progress(&self, done: usize, total: usize) {
        if let Some(on_progress) = &self.on_progress {
            on_progress(done, total);
        }
    }
}
