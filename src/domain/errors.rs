//! Domain error types
//!
//! This module defines the error hierarchy for claimrecon.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main claimrecon error type
///
/// This is the primary error type used throughout the application.
/// Stage-specific failures are carried by [`FormatError`] and [`QueryError`].
#[derive(Debug, Error)]
pub enum ClaimReconError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File format detection or extraction errors
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Dataset failed a fatal integrity rule
    #[error("Validation error: {0}")]
    Validation(String),

    /// Query parameter or view construction errors
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Claim store connectivity or schema errors
    #[error("Database error: {0}")]
    Database(String),

    /// Batch-level write failures
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// One reader that was tried while extracting a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderAttempt {
    /// Reader method (e.g. "csv", "xlsx", "ods")
    pub method: String,

    /// Why the reader failed
    pub reason: String,
}

impl ReaderAttempt {
    /// Creates a new reader attempt record
    pub fn new(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            reason: reason.into(),
        }
    }
}

/// File format errors
///
/// Raised by the format detector and the tabular extractor. None of these are
/// fatal to the process; the caller may retry with a different file.
#[derive(Debug, Error)]
pub enum FormatError {
    /// File extension is not a supported tabular or spreadsheet format
    #[error("Unsupported file format: '{0}'")]
    Unsupported(String),

    /// File could not be opened or read
    #[error("Failed to read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    /// Every available reader failed
    #[error("No reader could extract data ({})", describe_attempts(.attempts))]
    Extraction { attempts: Vec<ReaderAttempt> },

    /// Extraction succeeded but produced zero data rows
    #[error("File contains no data rows")]
    NoRows,
}

fn describe_attempts(attempts: &[ReaderAttempt]) -> String {
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.method, a.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Query errors
///
/// Reported before any data is touched whenever possible. Never silently
/// defaulted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// Sort or filter column not produced by the view
    #[error("Unknown column '{column}'. Available columns: {}", .available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    /// A date bound could not be parsed
    #[error("Invalid date '{0}'. Use YYYY-MM-DD")]
    InvalidDate(String),

    /// Start date lies after end date
    #[error("Start date {start} cannot be later than end date {end}")]
    InvalidDateRange { start: String, end: String },

    /// Only one of filter column / filter value was supplied
    #[error("filter_column and filter_value must be supplied together")]
    IncompleteFilter,

    /// Sort order other than ASC/DESC
    #[error("Invalid sort order '{0}'. Must be ASC or DESC")]
    InvalidSortOrder(String),

    /// The persisted schema lacks columns the view needs
    #[error("Missing columns for {view} view: {}", .columns.join(", "))]
    MissingColumns { view: String, columns: Vec<String> },

    /// The claim store holds no rows at all
    #[error("No data available. Ingest a file first")]
    NoData,
}

// Conversion from std::io::Error
impl From<std::io::Error> for ClaimReconError {
    fn from(err: std::io::Error) -> Self {
        ClaimReconError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ClaimReconError {
    fn from(err: serde_json::Error) -> Self {
        ClaimReconError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ClaimReconError {
    fn from(err: toml::de::Error) -> Self {
        ClaimReconError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv writer/reader errors
impl From<csv::Error> for ClaimReconError {
    fn from(err: csv::Error) -> Self {
        ClaimReconError::Serialization(format!("CSV error: {err}"))
    }
}
