//! In-process claim store with an optional JSON snapshot file
//!
//! With no snapshot path the store lives only as long as the process, which is
//! what tests and dry runs want. With a path, the full state is rewritten
//! after every committed batch and every recorded upload, via a temporary file
//! renamed over the target so a crash never leaves a half-written snapshot.

use super::models::{BatchInsertResult, FailedRow, StoreStats, UploadLog};
use super::traits::ClaimStore;
use crate::domain::{columns, ClaimReconError, ClaimRow, Dataset, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    claims: Vec<ClaimRow>,
    #[serde(default)]
    uploads: Vec<UploadLog>,
}

#[derive(Debug, Default)]
struct State {
    claims: Vec<ClaimRow>,
    keys: HashSet<String>,
    uploads: Vec<UploadLog>,
}

impl State {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        let keys = snapshot
            .claims
            .iter()
            .filter_map(ClaimRow::claim_id)
            .map(|id| id.into_inner())
            .collect();
        Self {
            claims: snapshot.claims,
            keys,
            uploads: snapshot.uploads,
        }
    }

    fn schema(&self) -> BTreeSet<String> {
        self.claims
            .iter()
            .flat_map(|row| row.fields().keys().cloned())
            .collect()
    }
}

/// Claim store backed by process memory
#[derive(Debug)]
pub struct MemoryClaimStore {
    state: RwLock<State>,
    snapshot_path: Option<PathBuf>,
}

impl Default for MemoryClaimStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryClaimStore {
    /// Creates an empty, non-persistent store
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            snapshot_path: None,
        }
    }

    /// Opens a snapshot-backed store, loading existing state when the file exists
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(|e| {
                    ClaimReconError::Database(format!(
                        "Corrupt store file {}: {e}",
                        path.display()
                    ))
                })?;
                tracing::info!(
                    path = %path.display(),
                    claims = snapshot.claims.len(),
                    uploads = snapshot.uploads.len(),
                    "Loaded claim store snapshot"
                );
                State::from_snapshot(snapshot)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => State::default(),
            Err(e) => {
                return Err(ClaimReconError::Database(format!(
                    "Failed to read store file {}: {e}",
                    path.display()
                )))
            }
        };

        Ok(Self {
            state: RwLock::new(state),
            snapshot_path: Some(path),
        })
    }

    /// Snapshot file, if this store persists
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    async fn write_snapshot(&self, state: &State) -> Result<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        #[derive(Serialize)]
        struct SnapshotRef<'a> {
            claims: &'a [ClaimRow],
            uploads: &'a [UploadLog],
        }

        let bytes = serde_json::to_vec(&SnapshotRef {
            claims: &state.claims,
            uploads: &state.uploads,
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl ClaimStore for MemoryClaimStore {
    fn backend_name(&self) -> &'static str {
        if self.snapshot_path.is_some() {
            "file"
        } else {
            "memory"
        }
    }

    async fn test_connection(&self) -> Result<()> {
        if let Some(parent) = self
            .snapshot_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
        {
            if !parent.exists() {
                tracing::debug!(dir = %parent.display(), "Store directory will be created on first write");
            }
        }
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        let state = self.state.read().await;
        if let Some(path) = &self.snapshot_path {
            if !path.exists() {
                self.write_snapshot(&state).await?;
            }
        }
        Ok(())
    }

    async fn existing_keys(&self) -> Result<HashSet<String>> {
        Ok(self.state.read().await.keys.clone())
    }

    async fn insert_batch(&self, rows: Vec<ClaimRow>) -> Result<BatchInsertResult> {
        let mut state = self.state.write().await;
        let rollback_len = state.claims.len();
        let mut added_keys = Vec::new();
        let mut result = BatchInsertResult::default();

        for row in rows {
            let Some(id) = row.claim_id() else {
                result
                    .failed_rows
                    .push(FailedRow::rejected(row, format!("{} is empty", columns::SEP)));
                continue;
            };
            if state.keys.contains(id.as_str()) {
                result.failed_rows.push(FailedRow::unique_violation(row));
                continue;
            }
            state.keys.insert(id.as_str().to_string());
            added_keys.push(id.into_inner());
            state.claims.push(row);
            result.inserted_count += 1;
        }

        if result.inserted_count > 0 {
            if let Err(e) = self.write_snapshot(&state).await {
                state.claims.truncate(rollback_len);
                for key in &added_keys {
                    state.keys.remove(key);
                }
                return Err(ClaimReconError::Persistence(format!(
                    "Failed to write store snapshot: {e}"
                )));
            }
        }

        Ok(result)
    }

    async fn fetch_rows(&self, columns: &[String]) -> Result<Dataset> {
        let state = self.state.read().await;
        let schema = state.schema();
        let header: Vec<String> = columns
            .iter()
            .filter(|c| schema.contains(*c))
            .cloned()
            .collect();
        let rows = state.claims.iter().map(|r| r.project(&header)).collect();
        Ok(Dataset::with_rows(header, rows))
    }

    async fn schema_columns(&self) -> Result<Vec<String>> {
        Ok(self.state.read().await.schema().into_iter().collect())
    }

    async fn record_upload(&self, log: &UploadLog) -> Result<()> {
        let mut state = self.state.write().await;
        state.uploads.push(log.clone());
        if let Err(e) = self.write_snapshot(&state).await {
            state.uploads.pop();
            return Err(ClaimReconError::Persistence(format!(
                "Failed to record upload log: {e}"
            )));
        }
        Ok(())
    }

    async fn recent_uploads(&self, limit: usize) -> Result<Vec<UploadLog>> {
        let state = self.state.read().await;
        let mut uploads = state.uploads.clone();
        uploads.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        uploads.truncate(limit);
        Ok(uploads)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let state = self.state.read().await;
        let patients: HashSet<String> = state
            .claims
            .iter()
            .map(|r| r.text(columns::MRN))
            .filter(|m| !m.is_empty())
            .collect();
        Ok(StoreStats {
            total_claims: state.claims.len(),
            distinct_patients: patients.len(),
            total_uploads: state.uploads.len(),
            last_upload_at: state.uploads.iter().map(|u| u.uploaded_at).max(),
        })
    }
}
