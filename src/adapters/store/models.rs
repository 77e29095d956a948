//! Records exchanged with a claim store

use crate::domain::ClaimRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a row was not written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Identifier already present at write time
    UniqueViolation,
    /// Any other rejection (constraint, connectivity, rollback)
    Rejected,
}

/// A row the store refused
#[derive(Debug, Clone)]
pub struct FailedRow {
    /// The row as submitted
    pub row: ClaimRow,

    /// Store-provided reason
    pub reason: String,

    /// Failure classification
    pub kind: FailureKind,
}

impl FailedRow {
    /// Row rejected because its identifier already exists
    pub fn unique_violation(row: ClaimRow) -> Self {
        let sep = row.claim_id().map(|id| id.into_inner()).unwrap_or_default();
        Self {
            row,
            reason: format!("SEP '{sep}' already exists"),
            kind: FailureKind::UniqueViolation,
        }
    }

    /// Row rejected for any other reason
    pub fn rejected(row: ClaimRow, reason: impl Into<String>) -> Self {
        Self {
            row,
            reason: reason.into(),
            kind: FailureKind::Rejected,
        }
    }
}

/// Outcome of one `insert_batch` call
#[derive(Debug, Clone, Default)]
pub struct BatchInsertResult {
    /// Rows committed
    pub inserted_count: usize,

    /// Rows not committed, with reasons
    pub failed_rows: Vec<FailedRow>,
}

/// Final status of one upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    /// Every new row was inserted
    Success,
    /// Some batches or rows failed
    Partial,
    /// Format or validation failure; nothing persisted
    Rejected,
    /// Nothing could be persisted
    Failed,
}

impl UploadStatus {
    /// Lowercase label stored alongside the log
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Success => "success",
            UploadStatus::Partial => "partial",
            UploadStatus::Rejected => "rejected",
            UploadStatus::Failed => "failed",
        }
    }
}

impl std::str::FromStr for UploadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(UploadStatus::Success),
            "partial" => Ok(UploadStatus::Partial),
            "rejected" => Ok(UploadStatus::Rejected),
            "failed" => Ok(UploadStatus::Failed),
            other => Err(format!("Unknown upload status '{other}'")),
        }
    }
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit record for one ingest attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadLog {
    pub id: Uuid,
    pub filename: String,
    pub file_size: u64,
    pub rows_processed: usize,
    pub rows_inserted: usize,
    pub rows_duplicate: usize,
    pub rows_failed: usize,
    pub status: UploadStatus,
    pub error_message: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl UploadLog {
    /// Creates a log entry stamped now
    pub fn new(filename: impl Into<String>, file_size: u64, status: UploadStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            file_size,
            rows_processed: 0,
            rows_inserted: 0,
            rows_duplicate: 0,
            rows_failed: 0,
            status,
            error_message: None,
            uploaded_at: Utc::now(),
        }
    }
}

/// Aggregate store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_claims: usize,
    /// Distinct non-empty MRN values
    pub distinct_patients: usize,
    pub total_uploads: usize,
    pub last_upload_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CellValue;
    use std::str::FromStr;

    #[test]
    fn test_upload_status_roundtrip() {
        for status in [
            UploadStatus::Success,
            UploadStatus::Partial,
            UploadStatus::Rejected,
            UploadStatus::Failed,
        ] {
            assert_eq!(UploadStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(UploadStatus::from_str("done").is_err());
    }

    #[test]
    fn test_unique_violation_reason_names_sep() {
        let row = ClaimRow::from_pairs([("SEP", CellValue::from_raw("X9"))]);
        let failed = FailedRow::unique_violation(row);
        assert_eq!(failed.kind, FailureKind::UniqueViolation);
        assert!(failed.reason.contains("X9"));
    }
}
