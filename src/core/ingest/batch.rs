//! Batch persistence of new rows
//!
//! Each batch is an independent commit unit. A failed batch is recorded and
//! the next batch still runs.

use crate::adapters::store::{ClaimStore, FailureKind};
use crate::domain::ClaimRow;
use std::sync::Arc;

/// Outcome of one or more batches
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Rows committed
    pub successful: usize,
    /// Rows that could not be committed
    pub failed: usize,
    /// Rows rejected at write time because the SEP already existed
    pub duplicates: usize,
    /// SEP values of write-time duplicates
    pub duplicate_keys: Vec<String>,
    /// Failure messages
    pub errors: Vec<String>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_success(&mut self) {
        self.successful += 1;
    }

    pub fn add_failure(&mut self, error: String) {
        self.failed += 1;
        self.errors.push(error);
    }

    pub fn add_duplicate(&mut self, key: String) {
        self.duplicates += 1;
        self.duplicate_keys.push(key);
    }

    /// Marks every row of a batch failed with one shared reason
    pub fn fail_all(&mut self, count: usize, error: String) {
        self.failed += count;
        self.errors.push(error);
    }

    /// Merge another batch result into this one
    pub fn merge(&mut self, other: BatchResult) {
        self.successful += other.successful;
        self.failed += other.failed;
        self.duplicates += other.duplicates;
        self.duplicate_keys.extend(other.duplicate_keys);
        self.errors.extend(other.errors);
    }
}

/// Writes rows to the store one batch at a time
pub struct BatchPersister {
    store: Arc<dyn ClaimStore>,
    batch_size: usize,
    dry_run: bool,
}

impl BatchPersister {
    /// Create a new persister; a zero batch size is treated as 1
    pub fn new(store: Arc<dyn ClaimStore>, batch_size: usize, dry_run: bool) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
            dry_run,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches needed for `rows` rows
    pub fn batch_count(&self, rows: usize) -> usize {
        rows.div_ceil(self.batch_size)
    }

    /// Persist one batch
    ///
    /// Never returns an error: a store failure marks every row of the batch
    /// failed with the store's reason.
    pub async fn persist_batch(&self, batch_number: usize, rows: Vec<ClaimRow>) -> BatchResult {
        let mut result = BatchResult::new();
        let count = rows.len();

        if count == 0 {
            return result;
        }

        if self.dry_run {
            tracing::info!(
                batch = batch_number,
                rows = count,
                "DRY RUN: would insert batch"
            );
            result.successful = count;
            return result;
        }

        match self.store.insert_batch(rows).await {
            Ok(insert) => {
                result.successful = insert.inserted_count;
                for failed in insert.failed_rows {
                    let sep = failed
                        .row
                        .claim_id()
                        .map(|id| id.into_inner())
                        .unwrap_or_default();
                    match failed.kind {
                        FailureKind::UniqueViolation => {
                            tracing::debug!(sep = %sep, "Write-time duplicate");
                            result.add_duplicate(sep);
                        }
                        FailureKind::Rejected => {
                            tracing::warn!(sep = %sep, reason = %failed.reason, "Row rejected by store");
                            result.add_failure(format!("SEP '{sep}': {}", failed.reason));
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!(batch = batch_number, rows = count, error = %e, "Batch insert failed");
                result.fail_all(count, format!("Batch {batch_number} failed: {e}"));
            }
        }

        result
    }
}
