//! Error types for carrier ingestion
//!
//! Three layers, by how far a failure reaches:
//!
//! - [`RowError`]: one CSV row is unusable. The row is dropped and reported,
//!   the file continues.
//! - [`CoercionError`]: a required field of a well-formed row cannot be typed.
//!   The extract is structurally broken; the file is aborted.
//! - [`IngestError`]: anything that stops the run (configuration, I/O, store).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// A CSV row that could not be turned into carrier records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// Cell count differs from the fixed carrier arity
    #[error("expected {expected} fields, got {found}")]
    FieldCount { expected: usize, found: usize },

    /// Split recovery found no `]` in the cargo cell
    #[error("no closing bracket in cargo_carried cell '{cell}'")]
    NoSplitBoundary { cell: String },

    /// Split recovery produced records that do not coerce
    #[error("split record is invalid: {0}")]
    SplitCoercion(#[from] CoercionError),
}

/// A required carrier field with a value that cannot be typed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    #[error("{field} must be an integer, got '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("cargo_carried literal '{value}' is malformed at offset {offset}: {reason}")]
    CargoLiteral {
        value: String,
        offset: usize,
        reason: String,
    },
}

/// Failure that aborts the ingestion run
#[derive(Error, Debug)]
pub enum IngestError {
    /// Configuration file missing, unreadable or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parsing failed
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A row in `file` failed required-field coercion
    #[error("Invalid carrier in {}: {source}", .file.display())]
    Coercion {
        file: PathBuf,
        #[source]
        source: CoercionError,
    },

    /// CSV reader failed (bad encoding, unreadable file)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Backing store failure
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Insert of an `mc_number` that is already stored
    #[error("Carrier with mc_number {0} already exists")]
    DuplicateKey(i64),

    /// Stored or outgoing document could not be (de)serialized
    #[error("Document error: {0}")]
    Document(#[from] serde_json::Error),

    /// Watermark file unreadable or unwritable
    #[error("Watermark error at {}: {source}", .path.display())]
    Watermark {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File system operation failed
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Attach the file being processed to a coercion failure
    pub fn coercion(file: impl Into<PathBuf>, source: CoercionError) -> Self {
        Self::Coercion {
            file: file.into(),
            source,
        }
    }

    /// Create a watermark I/O error
    pub fn watermark(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Watermark {
            path: path.into(),
            source,
        }
    }
}
