//! PostgreSQL row models
//!
//! Mapping between domain records and the `claims` / `upload_logs` tables.

use crate::adapters::store::{UploadLog, UploadStatus};
use crate::core::ingest::validate::row_hash;
use crate::domain::{columns, ClaimReconError, ClaimRow, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio_postgres::Row;
use uuid::Uuid;

/// One row of the `claims` table
#[derive(Debug, Clone)]
pub struct PostgreSQLClaim {
    /// Claim identifier (primary key)
    pub sep: String,

    /// Full row as a flat JSON object
    pub data: Value,

    /// SHA-256 of the row content
    pub row_hash: String,

    /// Medical record number, denormalised for patient counts
    pub mrn: Option<String>,
}

impl PostgreSQLClaim {
    /// Converts a domain row; fails when the row has no identifier
    pub fn from_domain(row: &ClaimRow) -> Result<Self> {
        let sep = row
            .claim_id()
            .ok_or_else(|| ClaimReconError::Persistence(format!("{} is empty", columns::SEP)))?
            .into_inner();
        let mrn = Some(row.text(columns::MRN)).filter(|m| !m.is_empty());

        Ok(Self {
            sep,
            data: serde_json::to_value(row)?,
            row_hash: row_hash(row),
            mrn,
        })
    }
}

/// Decodes the `data` column back into a domain row
pub fn claim_from_json(data: Value) -> Result<ClaimRow> {
    Ok(serde_json::from_value(data)?)
}

/// Decodes one `upload_logs` row
pub fn upload_log_from_row(row: &Row) -> Result<UploadLog> {
    let status: String = get(row, "status")?;
    let status = status
        .parse::<UploadStatus>()
        .map_err(ClaimReconError::Serialization)?;

    Ok(UploadLog {
        id: get::<Uuid>(row, "id")?,
        filename: get(row, "filename")?,
        file_size: count(get(row, "file_size")?),
        rows_processed: count(get(row, "rows_processed")?) as usize,
        rows_inserted: count(get(row, "rows_inserted")?) as usize,
        rows_duplicate: count(get(row, "rows_duplicate")?) as usize,
        rows_failed: count(get(row, "rows_failed")?) as usize,
        status,
        error_message: get(row, "error_message")?,
        uploaded_at: get::<DateTime<Utc>>(row, "uploaded_at")?,
    })
}

fn get<'a, T>(row: &'a Row, column: &str) -> Result<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(column)
        .map_err(|e| ClaimReconError::Database(format!("Failed to read column {column}: {e}")))
}

fn count(value: i64) -> u64 {
    value.max(0) as u64
}

/// Converts an unsigned count to the BIGINT parameter type
pub fn to_bigint(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CellValue;

    #[test]
    fn test_from_domain() {
        let row = ClaimRow::from_pairs([
            ("SEP", CellValue::from_raw("0301R001")),
            ("MRN", CellValue::from_raw("123")),
            ("LOS", CellValue::Number(3.0)),
        ]);
        let claim = PostgreSQLClaim::from_domain(&row).unwrap();
        assert_eq!(claim.sep, "0301R001");
        assert_eq!(claim.mrn.as_deref(), Some("123"));
        assert_eq!(claim.data["LOS"], serde_json::json!(3.0));
        assert_eq!(claim.row_hash.len(), 64);

        let back = claim_from_json(claim.data).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_from_domain_requires_sep() {
        let row = ClaimRow::from_pairs([("MRN", CellValue::from_raw("123"))]);
        assert!(PostgreSQLClaim::from_domain(&row).is_err());
    }

    #[test]
    fn test_bigint_conversion_saturates() {
        assert_eq!(to_bigint(42), 42);
        assert_eq!(to_bigint(u64::MAX), i64::MAX);
        assert_eq!(count(-1), 0);
    }
}
