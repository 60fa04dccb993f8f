//! Structured-extraction mode: pull delimited fields out of transcriptions.

use super::{Assembler, Assembly, AssemblyStats};
use crate::error::{CallError, TableError};
use crate::llm::{sentinel, with_retry, Attempt, Job, RetryOutcome};
use crate::table::{Row, Table};

/// Placeholder for a field the model never supplied.
pub const MISSING_FIELD: &str = "[MISSING]";

/// Split a comma-delimited answer into trimmed fields.
pub fn parse_fields(response: &str) -> Vec<String> {
    response
        .split(',')
        .map(|field| field.trim().to_string())
        .collect()
}

/// Force `row` to exactly `width` fields, dropping extras or padding with
/// [`MISSING_FIELD`]. Returns whether the row was changed.
pub fn fit_row(row: &mut Row, width: usize) -> bool {
    if row.len() == width {
        return false;
    }
    tracing::warn!(
        "Row has {} fields, expected {width}; {}",
        row.len(),
        if row.len() > width {
            "truncating"
        } else {
            "padding with [MISSING]"
        }
    );
    row.resize(width, MISSING_FIELD.to_string());
    true
}

impl Assembler {
    /// Send `prompt + transcription` for every transcription and parse the
    /// answer into `columns.len() - 1` fields; the transcription itself fills
    /// the last column.
    ///
    /// An answer with the wrong number of fields counts as a failed attempt.
    /// When every attempt fails the row holds the sentinel in each extracted
    /// field. Every transcription contributes one row, in input order.
    pub async fn extract_from_transcriptions(
        &self,
        transcriptions: &[String],
        prompt: &str,
        columns: &[String],
    ) -> Result<Assembly, TableError> {
        let mut stats = AssemblyStats::default();
        let expected = columns.len().saturating_sub(1);
        let field = columns
            .first()
            .cloned()
            .unwrap_or_else(|| "fields".to_string());
        tracing::info!(
            "Extracting {expected} field(s) from {} transcription(s) using {}",
            transcriptions.len(),
            self.client().model()
        );

        let mut rows: Vec<Row> = Vec::with_capacity(transcriptions.len());
        for (index, transcription) in transcriptions.iter().enumerate() {
            let job = Job::text(format!("{prompt}{transcription}"), field.as_str());
            let label = format!("transcription {}", index + 1);
            let client = self.client();
            let job = &job;
            let name = label.as_str();

            let outcome = with_retry(self.policy(), name, |_| async move {
                match client.complete(job).await {
                    Ok(text) => {
                        let fields = parse_fields(&text);
                        if fields.len() == expected {
                            Attempt::Success(fields)
                        } else {
                            tracing::debug!("{name}: unexpected answer {text:?}");
                            Attempt::from(CallError::ArityMismatch {
                                expected,
                                actual: fields.len(),
                            })
                        }
                    }
                    Err(e) => Attempt::from(e),
                }
            })
            .await;
            stats.record(&outcome);

            let mut row = match outcome {
                RetryOutcome::Success { value, .. } => value,
                RetryOutcome::Exhausted { max_attempts, .. } => {
                    vec![sentinel(max_attempts); expected]
                }
            };
            row.push(transcription.clone());
            if fit_row(&mut row, columns.len()) {
                stats.repaired += 1;
            }

            rows.push(row);
            stats.items += 1;
            self.report_progress(index + 1, transcriptions.len());
        }

        let table = Table::build(rows, columns.to_vec())?;
        Ok(Assembly { table, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{RemoteClient, RetryPolicy};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Mock client that answers from a script, one entry per call, repeating
    /// the last entry once the script runs out.
    struct ScriptedClient {
        script: Vec<Result<String, CallError>>,
        call_count: Arc<AtomicU32>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedClient {
        fn new(script: Vec<Result<&str, CallError>>) -> Self {
            Self {
                script: script
                    .into_iter()
                    .map(|r| r.map(str::to_string))
                    .collect(),
                call_count: Arc::new(AtomicU32::new(0)),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn always(answer: &str) -> Self {
            Self::new(vec![Ok(answer)])
        }
    }

    #[async_trait]
    impl RemoteClient for ScriptedClient {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "mock-v1"
        }

        async fn send(&self, job: &Job) -> Result<Value, CallError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst) as usize;
            self.prompts.lock().unwrap().push(job.prompt.clone());
            let step = self.script[idx.min(self.script.len() - 1)].clone();
            step.map(|text| json!({"content": [{"type": "text", "text": text}]}))
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            delay: Duration::ZERO,
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn columns() -> Vec<String> {
        strings(&["f1", "f2", "f3", "transcription"])
    }

    #[test]
    fn test_parse_fields_trims() {
        assert_eq!(parse_fields("A, B ,C"), strings(&["A", "B", "C"]));
        assert_eq!(parse_fields(""), strings(&[""]));
        assert_eq!(parse_fields("A,,B"), strings(&["A", "", "B"]));
    }

    #[test]
    fn test_fit_row_pads_and_truncates() {
        let mut short = strings(&["a"]);
        assert!(fit_row(&mut short, 3));
        assert_eq!(short, strings(&["a", "[MISSING]", "[MISSING]"]));

        let mut long = strings(&["a", "b", "c", "d"]);
        assert!(fit_row(&mut long, 2));
        assert_eq!(long, strings(&["a", "b"]));

        let mut exact = strings(&["a", "b"]);
        assert!(!fit_row(&mut exact, 2));
    }

    #[tokio::test]
    async fn test_parses_answer_and_appends_transcription() {
        let client = ScriptedClient::always("A, B, C");
        let prompts = client.prompts.clone();
        let assembler = Assembler::new(Box::new(client), fast_policy());

        let transcription = "IN LOVING MEMORY OF JOHN SMITH".to_string();
        let assembly = assembler
            .extract_from_transcriptions(&[transcription.clone()], "Extract: ", &columns())
            .await
            .unwrap();

        assert_eq!(
            assembly.table.rows(),
            &[vec![
                "A".to_string(),
                "B".to_string(),
                "C".to_string(),
                transcription.clone()
            ]]
        );
        assert_eq!(
            *prompts.lock().unwrap(),
            vec![format!("Extract: {transcription}")]
        );
    }

    #[tokio::test]
    async fn test_arity_mismatch_retries_then_sentinel() {
        let client = ScriptedClient::always("A, B");
        let call_count = client.call_count.clone();
        let assembler = Assembler::new(Box::new(client), fast_policy());

        let assembly = assembler
            .extract_from_transcriptions(&strings(&["HERE LIES"]), "Extract: ", &columns())
            .await
            .unwrap();

        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        assert_eq!(
            assembly.table.rows()[0],
            strings(&[
                "[ERROR after 3 attempts]",
                "[ERROR after 3 attempts]",
                "[ERROR after 3 attempts]",
                "HERE LIES"
            ])
        );
        assert_eq!(assembly.stats.exhausted, 1);
        assert_eq!(assembly.stats.repaired, 0);
    }

    #[tokio::test]
    async fn test_arity_mismatch_then_correct_answer() {
        let client = ScriptedClient::new(vec![Ok("A, B"), Ok("A, B, C, D"), Ok("A, B, C")]);
        let call_count = client.call_count.clone();
        let assembler = Assembler::new(Box::new(client), fast_policy());

        let assembly = assembler
            .extract_from_transcriptions(&strings(&["T"]), "p", &columns())
            .await
            .unwrap();

        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        assert_eq!(assembly.table.rows()[0], strings(&["A", "B", "C", "T"]));
        assert_eq!(assembly.stats.exhausted, 0);
    }

    #[tokio::test]
    async fn test_transport_failure_then_success() {
        let client = ScriptedClient::new(vec![
            Err(CallError::Transport {
                message: "timed out".to_string(),
                status_code: None,
            }),
            Ok("A, B, C"),
        ]);
        let assembler = Assembler::new(Box::new(client), fast_policy());

        let assembly = assembler
            .extract_from_transcriptions(&strings(&["T"]), "p", &columns())
            .await
            .unwrap();

        assert_eq!(assembly.table.rows()[0], strings(&["A", "B", "C", "T"]));
        assert_eq!(assembly.stats.attempts, 2);
    }

    #[tokio::test]
    async fn test_every_transcription_gets_a_row() {
        let assembler = Assembler::new(Box::new(ScriptedClient::always("x, y, z")), fast_policy());
        let transcriptions = strings(&["first stone", "second stone", "third stone"]);

        let assembly = assembler
            .extract_from_transcriptions(&transcriptions, "p", &columns())
            .await
            .unwrap();

        assert_eq!(assembly.table.len(), 3);
        assert_eq!(
            assembly.table.column("transcription").unwrap(),
            vec!["first stone", "second stone", "third stone"]
        );
        assert_eq!(assembly.stats.items, 3);
    }

    #[tokio::test]
    async fn test_no_transcriptions_yields_empty_table() {
        let client = ScriptedClient::always("x, y, z");
        let call_count = client.call_count.clone();
        let assembler = Assembler::new(Box::new(client), fast_policy());

        let assembly = assembler
            .extract_from_transcriptions(&[], "p", &columns())
            .await
            .unwrap();

        assert!(assembly.table.is_empty());
        assert_eq!(call_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_identical_runs_serialize_identically() {
        let transcriptions = strings(&["JOHN SMITH 1820 1888", "MARY SMITH 1825 1890"]);
        let mut outputs = Vec::new();
        for _ in 0..2 {
            let client = ScriptedClient::new(vec![Ok("A, B"), Ok("Smith, 1820, 1888")]);
            let assembler = Assembler::new(Box::new(client), fast_policy());
            let assembly = assembler
                .extract_from_transcriptions(&transcriptions, "p", &columns())
                .await
                .unwrap();
            outputs.push(serde_json::to_vec(&assembly.table).unwrap());
        }
        assert_eq!(outputs[0], outputs[1]);
    }
}
