//! Error types for the Epitaph extraction pipeline.
//!
//! Errors are split by how far they are allowed to travel:
//!
//! - [`CallError`] describes one failed remote attempt. The retry controller
//!   consumes it; it never escapes an assembler.
//! - [`ImageError`] degrades a single request to text-only.
//! - [`FolderAccessError`] degrades a whole run to an empty table.
//! - [`TableError`] is the one hard stop: rows that cannot fit the declared
//!   columns.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Epitaph operations.
#[derive(Error, Debug)]
pub enum EpitaphError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Table construction errors
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// OCR engine errors
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// No API key in the credentials file, config, or environment
    #[error("API key not set. Set ANTHROPIC_API_KEY, api.api_key, or api.credentials_file.")]
    MissingApiKey,

    /// The credentials file could not be used
    #[error("Cannot read credentials from {path}: {reason}")]
    Credentials { path: PathBuf, reason: String },
}

/// Failure of a single remote attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// Timeout, connection failure, or non-2xx status
    #[error("transport failure: {message}")]
    Transport {
        message: String,
        status_code: Option<u16>,
    },

    /// Response arrived but lacks the expected `content[0].text` shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Response parsed to the wrong number of delimited fields
    #[error("expected {expected} fields, response had {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// The job itself can never succeed (e.g. an empty prompt)
    #[error("invalid job: {0}")]
    InvalidJob(String),
}

/// Reasons an image cannot be attached to a request.
#[derive(Error, Debug)]
pub enum ImageError {
    /// File exceeds the configured byte limit
    #[error("Image too large: {path} ({size_bytes} bytes > {max_bytes} bytes)")]
    ImageTooLarge {
        path: PathBuf,
        size_bytes: u64,
        max_bytes: u64,
    },

    /// Extension outside the allow-list
    #[error("Unsupported image format for {path}: {extension:?}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// File could not be read
    #[error("Cannot read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Row/column arity violations at table construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A row does not have exactly one field per declared column
    #[error("Row {row} has {actual} fields but the table declares {expected} columns")]
    SchemaMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Requested column is not part of the table
    #[error("Unknown column: {0:?}")]
    UnknownColumn(String),
}

/// An input folder could not be enumerated. Non-fatal: the run yields an
/// empty table and carries this error in its statistics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot read folder {path}: {reason}")]
pub struct FolderAccessError {
    pub path: PathBuf,
    pub reason: String,
}

/// OCR engine failures.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR executable could not be started
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The OCR process exceeded its time budget
    #[error("OCR timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The OCR process exited unsuccessfully
    #[error("OCR exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// Convenience type alias for Epitaph results.
pub type Result<T> = std::result::Result<T, EpitaphError>;
