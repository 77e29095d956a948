//! Duplicate detection against the persisted key set
//!
//! The key set is read once per upload and never cached. The check is
//! advisory: the store still enforces uniqueness at write time, and the
//! coordinator reclassifies write-time violations as duplicates.

use crate::adapters::store::ClaimStore;
use crate::domain::{ClaimRow, Dataset, Result};
use std::collections::HashSet;

/// Rows split into new and duplicate
#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    /// Rows with a non-empty SEP not yet persisted, in file order
    pub new_rows: Vec<ClaimRow>,

    /// Rows already persisted, or with an empty SEP
    pub duplicate_rows: Vec<ClaimRow>,

    /// SEP values of persisted duplicates, in file order
    pub duplicate_keys: Vec<String>,
}

/// Partitions rows using a key set the caller already holds
///
/// A row with a null or empty SEP lands in `duplicate_rows`; it contributes
/// no entry to `duplicate_keys`.
pub fn partition_with_keys(dataset: &Dataset, existing: &HashSet<String>) -> DedupOutcome {
    let mut outcome = DedupOutcome::default();

    for row in &dataset.rows {
        match row.claim_id() {
            Some(id) if !existing.contains(id.as_str()) => outcome.new_rows.push(row.clone()),
            Some(id) => {
                outcome.duplicate_keys.push(id.into_inner());
                outcome.duplicate_rows.push(row.clone());
            }
            None => outcome.duplicate_rows.push(row.clone()),
        }
    }

    outcome
}

/// Fetches the current key set from the store and partitions the dataset
pub async fn partition(dataset: &Dataset, store: &dyn ClaimStore) -> Result<DedupOutcome> {
    let existing = store.existing_keys().await?;
    let outcome = partition_with_keys(dataset, &existing);

    tracing::info!(
        existing_keys = existing.len(),
        new_rows = outcome.new_rows.len(),
        duplicate_rows = outcome.duplicate_rows.len(),
        "Duplicate detection complete"
    );

    Ok(outcome)
}
