//! Image-description mode: every prompt against every image in a folder.

use std::path::Path;

use super::{list_files_in_folder, Assembler, Assembly, AssemblyStats};
use crate::error::TableError;
use crate::llm::{with_retry, Attempt, Job};
use crate::table::{Row, Table};

impl Assembler {
    /// Run each prompt against each file in `folder`.
    ///
    /// Rows are `[file name, answer to prompt 1, answer to prompt 2, ...]` in
    /// folder order. `columns` must hold `1 + prompts.len()` names; a
    /// mismatch surfaces as [`TableError::SchemaMismatch`]. A folder that
    /// cannot be read produces an empty table with
    /// [`AssemblyStats::folder_error`] set.
    pub async fn describe_images(
        &self,
        folder: &Path,
        prompts: &[String],
        columns: &[String],
    ) -> Result<Assembly, TableError> {
        let mut stats = AssemblyStats::default();

        let files = match list_files_in_folder(folder) {
            Ok(files) => files,
            Err(e) => {
                tracing::error!("{e}");
                stats.folder_error = Some(e);
                return Ok(Assembly {
                    table: Table::empty(columns.to_vec()),
                    stats,
                });
            }
        };
        tracing::info!(
            "Describing {} image(s) with {} prompt(s) using {}",
            files.len(),
            prompts.len(),
            self.client().model()
        );

        let mut rows: Vec<Row> = Vec::with_capacity(files.len());
        for (index, file) in files.iter().enumerate() {
            tracing::debug!("Processing {} ({} bytes)", file.file_name, file.size);
            let mut row = Vec::with_capacity(1 + prompts.len());
            row.push(file.file_name.clone());

            for (prompt_index, prompt) in prompts.iter().enumerate() {
                let field = columns
                    .get(prompt_index + 1)
                    .cloned()
                    .unwrap_or_else(|| format!("prompt {}", prompt_index + 1));
                let job = Job::with_image(prompt.as_str(), &file.path, field);
                let label = job.label();
                let client = self.client();
                let job = &job;

                let outcome = with_retry(self.policy(), &label, |_| async move {
                    match client.complete(job).await {
                        Ok(text) => Attempt::Success(text),
                        Err(e) => Attempt::from(e),
                    }
                })
                .await;
                stats.record(&outcome);
                row.push(outcome.into_field());
            }

            rows.push(row);
            stats.items += 1;
            self.report_progress(index + 1, files.len());
        }

        let table = Table::build(rows, columns.to_vec())?;
        Ok(Assembly { table, stats })
    }
}
