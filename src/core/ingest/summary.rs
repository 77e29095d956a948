//! Ingest summary and reporting
//!
//! Every upload ends in an [`IngestSummary`], whatever the outcome short of an
//! unrecoverable I/O failure.

use crate::adapters::store::UploadStatus;
use crate::core::ingest::tariff::AdjustmentSummary;
use serde::Serialize;
use std::time::Duration;

/// Summary of one ingest
#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    /// Name of the uploaded file
    pub file_name: String,

    /// Rows extracted from the file
    pub total_rows: usize,

    /// Rows classified new (after write-time reclassification)
    pub new_rows: usize,

    /// Rows already persisted, or with an empty SEP
    pub duplicate_rows: usize,

    /// Rows committed (or that would be, on a dry run)
    pub inserted_rows: usize,

    /// New rows that could not be committed
    pub failed_rows: usize,

    /// SEP values classified duplicate
    pub duplicate_keys: Vec<String>,

    /// Non-fatal validation findings
    pub warnings: Vec<String>,

    pub errors: Vec<IngestError>,

    /// Rows per tariff regime
    pub adjustment: AdjustmentSummary,

    /// Informational 0..=100 data-quality score
    pub integrity_score: u8,

    #[serde(serialize_with = "serialize_duration_ms", rename = "duration_ms")]
    pub duration: Duration,

    pub dry_run: bool,

    /// Shutdown was requested before every batch ran
    pub interrupted: bool,

    pub status: UploadStatus,
}

fn serialize_duration_ms<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl IngestSummary {
    /// Create an empty summary for a file
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            total_rows: 0,
            new_rows: 0,
            duplicate_rows: 0,
            inserted_rows: 0,
            failed_rows: 0,
            duplicate_keys: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            adjustment: AdjustmentSummary::default(),
            integrity_score: 100,
            duration: Duration::from_secs(0),
            dry_run: false,
            interrupted: false,
            status: UploadStatus::Success,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: IngestError) {
        self.errors.push(error);
    }

    /// Marks the upload rejected with the given error
    pub fn reject(&mut self, error: IngestError) {
        self.status = UploadStatus::Rejected;
        self.add_error(error);
    }

    /// Derives the final status from the counters
    ///
    /// Rejected uploads keep their status.
    pub fn finalize_status(&mut self) {
        if self.status == UploadStatus::Rejected {
            return;
        }
        self.status = if self.failed_rows == 0 && !self.interrupted && self.errors.is_empty() {
            UploadStatus::Success
        } else if self.inserted_rows > 0 {
            UploadStatus::Partial
        } else {
            UploadStatus::Failed
        };
    }

    /// True when nothing failed and nothing was rejected
    pub fn is_successful(&self) -> bool {
        self.status == UploadStatus::Success
    }

    /// First error message, used for the upload log
    pub fn first_error(&self) -> Option<String> {
        self.errors.first().map(|e| match &e.context {
            Some(ctx) => format!("{} ({ctx})", e.message),
            None => e.message.clone(),
        })
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            file = %self.file_name,
            status = %self.status,
            total_rows = self.total_rows,
            new_rows = self.new_rows,
            duplicate_rows = self.duplicate_rows,
            inserted_rows = self.inserted_rows,
            failed_rows = self.failed_rows,
            integrity_score = self.integrity_score,
            dry_run = self.dry_run,
            duration_ms = self.duration.as_millis() as u64,
            "Ingest summary"
        );

        for warning in &self.warnings {
            tracing::warn!(file = %self.file_name, warning = %warning, "Data quality warning");
        }

        for error in &self.errors {
            tracing::warn!(
                error_type = ?error.error_type,
                message = %error.message,
                context = error.context.as_deref().unwrap_or(""),
                "Ingest error"
            );
        }
    }
}

/// Stage an ingest error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestErrorType {
    /// Detection or extraction
    Format,
    /// Fatal integrity rule
    Validation,
    /// Batch write failure
    Persistence,
    /// Store unreachable or key read failed
    Store,
}

/// Ingest error with context
#[derive(Debug, Clone, Serialize)]
pub struct IngestError {
    pub error_type: IngestErrorType,
    pub message: String,

    /// Optional context (e.g. batch number)
    pub context: Option<String>,
}

impl IngestError {
    /// Create a new ingest error
    pub fn new(error_type: IngestErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_summary() {
        let summary = IngestSummary::new("claims.csv");
        assert_eq!(summary.file_name, "claims.csv");
        assert_eq!(summary.total_rows, 0);
        assert_eq!(summary.integrity_score, 100);
        assert!(summary.is_successful());
    }

    #[test]
    fn test_finalize_status() {
        let mut summary = IngestSummary::new("a.csv");
        summary.inserted_rows = 5;
        summary.finalize_status();
        assert_eq!(summary.status, UploadStatus::Success);

        summary.failed_rows = 2;
        summary.finalize_status();
        assert_eq!(summary.status, UploadStatus::Partial);

        summary.inserted_rows = 0;
        summary.finalize_status();
        assert_eq!(summary.status, UploadStatus::Failed);
    }

    #[test]
    fn test_interrupted_with_inserts_is_partial() {
        let mut summary = IngestSummary::new("a.csv");
        summary.inserted_rows = 100;
        summary.failed_rows = 50;
        summary.interrupted = true;
        summary.finalize_status();
        assert_eq!(summary.status, UploadStatus::Partial);
    }

    #[test]
    fn test_rejected_is_sticky() {
        let mut summary = IngestSummary::new("a.csv");
        summary.reject(IngestError::new(IngestErrorType::Validation, "no SEP"));
        summary.finalize_status();
        assert_eq!(summary.status, UploadStatus::Rejected);
        assert!(!summary.is_successful());
        assert_eq!(summary.first_error().as_deref(), Some("no SEP"));
    }

    #[test]
    fn test_error_with_context() {
        let error = IngestError::new(IngestErrorType::Persistence, "connection reset")
            .with_context("batch=3");
        assert_eq!(error.context.as_deref(), Some("batch=3"));

        let mut summary = IngestSummary::new("a.csv");
        summary.add_error(error);
        assert_eq!(
            summary.first_error().as_deref(),
            Some("connection reset (batch=3)")
        );
    }

    #[test]
    fn test_serializes_duration_in_ms() {
        let summary = IngestSummary::new("a.csv").with_duration(Duration::from_millis(1500));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["duration_ms"], 1500);
        assert_eq!(json["status"], "success");
    }
}
