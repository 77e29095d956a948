//! Claim store abstraction
//!
//! The ingest pipeline and the query engine only talk to persistence through
//! [`ClaimStore`]. Implementations must enforce identifier uniqueness at write
//! time: a row whose SEP already exists is reported as
//! [`FailureKind::UniqueViolation`](super::FailureKind::UniqueViolation), never
//! overwritten.

use super::models::{BatchInsertResult, StoreStats, UploadLog};
use crate::domain::{ClaimRow, Dataset, Result};
use async_trait::async_trait;
use std::collections::HashSet;

/// Keyed, queryable row store for claims
#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Short backend name for logs ("memory", "file", "postgresql")
    fn backend_name(&self) -> &'static str;

    /// Test the store connection
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn test_connection(&self) -> Result<()>;

    /// Create tables or files the store needs, if missing
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    async fn ensure_schema(&self) -> Result<()>;

    /// Every identifier currently persisted
    ///
    /// Read fresh on every call; callers must not cache it across uploads.
    async fn existing_keys(&self) -> Result<HashSet<String>>;

    /// Insert one batch as an independent commit unit
    ///
    /// Rows whose identifier already exists come back in `failed_rows` with
    /// `UniqueViolation`. An `Err` means nothing from this batch was committed.
    async fn insert_batch(&self, rows: Vec<ClaimRow>) -> Result<BatchInsertResult>;

    /// All persisted rows narrowed to `columns`
    ///
    /// The returned dataset's header is the subset of `columns` present in the
    /// persisted schema (the union of keys over all rows), in `columns` order.
    async fn fetch_rows(&self, columns: &[String]) -> Result<Dataset>;

    /// Columns present in the persisted schema, sorted
    async fn schema_columns(&self) -> Result<Vec<String>>;

    /// Record an upload audit entry
    async fn record_upload(&self, log: &UploadLog) -> Result<()>;

    /// Most recent upload logs, newest first
    async fn recent_uploads(&self, limit: usize) -> Result<Vec<UploadLog>>;

    /// Aggregate statistics
    async fn stats(&self) -> Result<StoreStats>;
}
