//! Table output as JSON or JSON Lines, and reading a column back in.
//!
//! A table is written as an array of records (JSON) or one record per line
//! (JSONL). Record keys follow the table's column order.

use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{EpitaphError, TableError};
use crate::table::Table;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON array of records
    Json,
    /// One JSON record per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }

    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::JsonLines => "jsonl",
        }
    }
}

/// A writer that serializes tables to JSON or JSONL format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    records_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            records_written: 0,
        }
    }

    /// Write every record of `table`.
    pub fn write_table(&mut self, table: &Table) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                self.write_value(table, self.pretty)?;
                self.records_written += table.len();
            }
            OutputFormat::JsonLines => {
                for record in table.records() {
                    self.write_value(&record, false)?;
                    self.records_written += 1;
                }
            }
        }
        Ok(())
    }

    fn write_value<T: Serialize + ?Sized>(&mut self, item: &T, pretty: bool) -> io::Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Read one column from a table file written by [`OutputWriter`].
///
/// Accepts either a JSON array of records or JSON Lines. Non-string values
/// are rendered as JSON text; a record without the column is an error.
pub fn read_column(path: &Path, column: &str) -> Result<Vec<String>, EpitaphError> {
    let content = std::fs::read_to_string(path)?;
    let records: Vec<Value> = if content.trim_start().starts_with('[') {
        serde_json::from_str(&content)?
    } else {
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()?
    };

    records
        .iter()
        .map(|record| -> Result<String, EpitaphError> {
            match record.get(column) {
                Some(Value::String(s)) => Ok(s.clone()),
                Some(Value::Null) => Ok(String::new()),
                Some(other) => Ok(other.to_string()),
                None => Err(TableError::UnknownColumn(column.to_string()).into()),
            }
        })
        .collect()
}
