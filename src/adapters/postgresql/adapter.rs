//! PostgreSQL adapter implementing the claim store trait

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{
    claim_from_json, to_bigint, upload_log_from_row, PostgreSQLClaim,
};
use crate::adapters::store::{BatchInsertResult, ClaimStore, FailedRow, StoreStats, UploadLog};
use crate::domain::{ClaimReconError, ClaimRow, Dataset, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

const INSERT_CLAIM: &str = r#"
    INSERT INTO claims (sep, data, row_hash, mrn)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (sep) DO NOTHING
"#;

const INSERT_UPLOAD: &str = r#"
    INSERT INTO upload_logs (
        id, filename, file_size, rows_processed, rows_inserted,
        rows_duplicate, rows_failed, status, error_message, uploaded_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
"#;

/// PostgreSQL implementation of [`ClaimStore`]
///
/// Claims are kept as one JSONB document per SEP so the persisted schema can
/// grow with whatever columns the uploaded files carry.
pub struct PostgreSQLClaimStore {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLClaimStore {
    /// Create a new PostgreSQL claim store
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

fn db_err(context: &str) -> impl Fn(tokio_postgres::Error) -> ClaimReconError + '_ {
    move |e| ClaimReconError::Database(format!("{context}: {e}"))
}

#[async_trait]
impl ClaimStore for PostgreSQLClaimStore {
    fn backend_name(&self) -> &'static str {
        "postgresql"
    }

    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    async fn existing_keys(&self) -> Result<HashSet<String>> {
        let conn = self.client.get_connection().await?;
        let rows = conn
            .query("SELECT sep FROM claims", &[])
            .await
            .map_err(db_err("Failed to read claim keys"))?;
        Ok(rows.iter().map(|r| r.get::<_, String>(0)).collect())
    }

    async fn insert_batch(&self, rows: Vec<ClaimRow>) -> Result<BatchInsertResult> {
        let mut conn = self.client.get_connection().await?;
        let tx = conn
            .transaction()
            .await
            .map_err(db_err("Failed to begin transaction"))?;
        let statement = tx
            .prepare(INSERT_CLAIM)
            .await
            .map_err(db_err("Failed to prepare insert"))?;

        let mut result = BatchInsertResult::default();

        for row in rows {
            let claim = match PostgreSQLClaim::from_domain(&row) {
                Ok(claim) => claim,
                Err(e) => {
                    result.failed_rows.push(FailedRow::rejected(row, e.to_string()));
                    continue;
                }
            };

            // Any error here drops `tx`, which rolls the whole batch back
            let affected = tx
                .execute(
                    &statement,
                    &[&claim.sep, &claim.data, &claim.row_hash, &claim.mrn],
                )
                .await
                .map_err(|e| {
                    ClaimReconError::Persistence(format!(
                        "Insert of SEP '{}' failed: {e}",
                        claim.sep
                    ))
                })?;

            if affected == 0 {
                result.failed_rows.push(FailedRow::unique_violation(row));
            } else {
                result.inserted_count += 1;
            }
        }

        tx.commit()
            .await
            .map_err(|e| ClaimReconError::Persistence(format!("Commit failed: {e}")))?;

        tracing::debug!(
            inserted = result.inserted_count,
            failed = result.failed_rows.len(),
            "PostgreSQL batch committed"
        );
        Ok(result)
    }

    async fn fetch_rows(&self, columns: &[String]) -> Result<Dataset> {
        let schema: BTreeSet<String> = self.schema_columns().await?.into_iter().collect();
        let header: Vec<String> = columns
            .iter()
            .filter(|c| schema.contains(*c))
            .cloned()
            .collect();

        let conn = self.client.get_connection().await?;
        let rows = conn
            .query("SELECT data FROM claims ORDER BY inserted_at, sep", &[])
            .await
            .map_err(db_err("Failed to read claims"))?;

        let mut claims = Vec::with_capacity(rows.len());
        for row in rows {
            let claim = claim_from_json(row.get::<_, serde_json::Value>(0))?;
            claims.push(claim.project(&header));
        }
        Ok(Dataset::with_rows(header, claims))
    }

    async fn schema_columns(&self) -> Result<Vec<String>> {
        let conn = self.client.get_connection().await?;
        let rows = conn
            .query(
                "SELECT DISTINCT jsonb_object_keys(data) AS key FROM claims ORDER BY key",
                &[],
            )
            .await
            .map_err(db_err("Failed to read claim schema"))?;
        Ok(rows.iter().map(|r| r.get::<_, String>(0)).collect())
    }

    async fn record_upload(&self, log: &UploadLog) -> Result<()> {
        let conn = self.client.get_connection().await?;
        conn.execute(
            INSERT_UPLOAD,
            &[
                &log.id,
                &log.filename,
                &to_bigint(log.file_size),
                &to_bigint(log.rows_processed as u64),
                &to_bigint(log.rows_inserted as u64),
                &to_bigint(log.rows_duplicate as u64),
                &to_bigint(log.rows_failed as u64),
                &log.status.as_str(),
                &log.error_message,
                &log.uploaded_at,
            ],
        )
        .await
        .map_err(db_err("Failed to record upload log"))?;
        Ok(())
    }

    async fn recent_uploads(&self, limit: usize) -> Result<Vec<UploadLog>> {
        let conn = self.client.get_connection().await?;
        let rows = conn
            .query(
                "SELECT * FROM upload_logs ORDER BY uploaded_at DESC LIMIT $1",
                &[&to_bigint(limit as u64)],
            )
            .await
            .map_err(db_err("Failed to read upload logs"))?;
        rows.iter().map(upload_log_from_row).collect()
    }

    async fn stats(&self) -> Result<StoreStats> {
        let conn = self.client.get_connection().await?;
        let claims = conn
            .query_one("SELECT COUNT(*), COUNT(DISTINCT mrn) FROM claims", &[])
            .await
            .map_err(db_err("Failed to count claims"))?;
        let uploads = conn
            .query_one("SELECT COUNT(*), MAX(uploaded_at) FROM upload_logs", &[])
            .await
            .map_err(db_err("Failed to count uploads"))?;

        Ok(StoreStats {
            total_claims: claims.get::<_, i64>(0).max(0) as usize,
            distinct_patients: claims.get::<_, i64>(1).max(0) as usize,
            total_uploads: uploads.get::<_, i64>(0).max(0) as usize,
            last_upload_at: uploads.get::<_, Option<DateTime<Utc>>>(1),
        })
    }
}
