//! End-to-end tests for the ingest pipeline against in-process stores

use async_trait::async_trait;
use claimrecon::adapters::store::{
    BatchInsertResult, ClaimStore, MemoryClaimStore, StoreStats, UploadLog, UploadStatus,
};
use claimrecon::config::ClaimReconConfig;
use claimrecon::core::ingest::{partition_with_keys, IngestCoordinator, INTERRUPTED_REASON};
use claimrecon::domain::{CellValue, ClaimReconError, ClaimRow, Dataset, Result};
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use tokio::sync::watch;

const HEADER: &str = "SEP;MRN;NAMA_PASIEN;INACBG;TOTAL_TARIF;TARIF_RS;LOS;ADMISSION_DATE";

/// Store wrapper that fails chosen batches, hides keys from the read-time
/// check, or trips the shutdown flag after a number of batches
struct ScriptedStore {
    inner: MemoryClaimStore,
    calls: AtomicUsize,
    failing_batches: HashSet<usize>,
    hide_existing_keys: bool,
    shutdown_after: Option<(usize, Mutex<Option<watch::Sender<bool>>>)>,
}

impl ScriptedStore {
    fn new() -> Self {
        Self {
            inner: MemoryClaimStore::new(),
            calls: AtomicUsize::new(0),
            failing_batches: HashSet::new(),
            hide_existing_keys: false,
            shutdown_after: None,
        }
    }

    fn failing(mut self, batches: &[usize]) -> Self {
        self.failing_batches = batches.iter().copied().collect();
        self
    }

    fn hiding_keys(mut self) -> Self {
        self.hide_existing_keys = true;
        self
    }

    fn shutdown_after(mut self, batches: usize, tx: watch::Sender<bool>) -> Self {
        self.shutdown_after = Some((batches, Mutex::new(Some(tx))));
        self
    }
}

#[async_trait]
impl ClaimStore for ScriptedStore {
    fn backend_name(&self) -> &'static str {
        "scripted"
    }

    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn existing_keys(&self) -> Result<HashSet<String>> {
        if self.hide_existing_keys {
            return Ok(HashSet::new());
        }
        self.inner.existing_keys().await
    }

    async fn insert_batch(&self, rows: Vec<ClaimRow>) -> Result<BatchInsertResult> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some((after, tx)) = &self.shutdown_after {
            if call == *after {
                let sender = tx.lock().unwrap().take();
                if let Some(sender) = sender {
                    let _ = sender.send(true);
                }
            }
        }

        if self.failing_batches.contains(&call) {
            return Err(ClaimReconError::Persistence(format!(
                "connection reset during batch {call}"
            )));
        }
        self.inner.insert_batch(rows).await
    }

    async fn fetch_rows(&self, columns: &[String]) -> Result<Dataset> {
        self.inner.fetch_rows(columns).await
    }

    async fn schema_columns(&self) -> Result<Vec<String>> {
        self.inner.schema_columns().await
    }

    async fn record_upload(&self, log: &UploadLog) -> Result<()> {
        self.inner.record_upload(log).await
    }

    async fn recent_uploads(&self, limit: usize) -> Result<Vec<UploadLog>> {
        self.inner.recent_uploads(limit).await
    }

    async fn stats(&self) -> Result<StoreStats> {
        self.inner.stats().await
    }
}

fn config(batch_size: usize) -> ClaimReconConfig {
    let mut config = ClaimReconConfig::default();
    config.ingest.batch_size = batch_size;
    config
}

fn coordinator(
    store: Arc<dyn ClaimStore>,
    batch_size: usize,
    dry_run: bool,
) -> IngestCoordinator {
    let (_tx, rx) = watch::channel(false);
    IngestCoordinator::new(store, &config(batch_size), dry_run, rx)
}

fn claims_csv(seps: &[&str]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for (i, sep) in seps.iter().enumerate() {
        writeln!(
            file,
            "{sep};MR{i};Pasien {i};K-4-17-0;{};1000000;{};0{}/01/2024",
            1_200_000 + i * 1000,
            i % 5 + 1,
            i % 9 + 1
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}

fn seps(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("0301R00{i:04}V000001")).collect()
}

async fn seed(store: &dyn ClaimStore, keys: &[String]) {
    let rows = keys
        .iter()
        .map(|k| ClaimRow::from_pairs([("SEP", CellValue::from_raw(k))]))
        .collect();
    store.insert_batch(rows).await.unwrap();
}

async fn ingest(coordinator: &IngestCoordinator, path: &Path) -> claimrecon::core::ingest::IngestSummary {
    coordinator.ingest_file(path).await.unwrap()
}

#[tokio::test]
async fn test_existing_claims_are_skipped() {
    let store = Arc::new(MemoryClaimStore::new());
    let keys = seps(10);
    seed(store.as_ref(), &keys[..3]).await;

    let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let file = claims_csv(&refs);
    let summary = ingest(&coordinator(store.clone(), 100, false), file.path()).await;

    assert_eq!(summary.status, UploadStatus::Success);
    assert_eq!(summary.total_rows, 10);
    assert_eq!(summary.new_rows, 7);
    assert_eq!(summary.duplicate_rows, 3);
    assert_eq!(summary.new_rows + summary.duplicate_rows, summary.total_rows);
    assert_eq!(summary.inserted_rows, 7);
    assert_eq!(summary.duplicate_keys, keys[..3].to_vec());
    assert_eq!(store.stats().await.unwrap().total_claims, 10);
}

#[test]
fn test_partition_counts_empty_identifier_as_duplicate() {
    let keys = seps(10);
    let mut rows: Vec<ClaimRow> = keys[..9]
        .iter()
        .map(|k| ClaimRow::from_pairs([("SEP", CellValue::from_raw(k))]))
        .collect();
    rows.push(ClaimRow::from_pairs([("SEP", CellValue::Null)]));
    let dataset = Dataset::with_rows(vec!["SEP".into()], rows);
    let existing: HashSet<String> = keys[..3].iter().cloned().collect();

    let outcome = partition_with_keys(&dataset, &existing);
    assert_eq!(outcome.new_rows.len(), 6);
    assert_eq!(outcome.duplicate_rows.len(), 4);
}

#[tokio::test]
async fn test_empty_identifier_rejects_upload() {
    let store = Arc::new(MemoryClaimStore::new());
    let file = claims_csv(&["A1", "", "A3"]);
    let summary = ingest(&coordinator(store.clone(), 100, false), file.path()).await;

    assert_eq!(summary.status, UploadStatus::Rejected);
    assert_eq!(summary.inserted_rows, 0);
    assert_eq!(store.stats().await.unwrap().total_claims, 0);

    // Rejections are still audited
    let uploads = store.recent_uploads(5).await.unwrap();
    assert_eq!(uploads[0].status, UploadStatus::Rejected);
    assert!(uploads[0].error_message.as_deref().unwrap().contains("SEP"));
}

#[tokio::test]
async fn test_reupload_is_idempotent() {
    let store = Arc::new(MemoryClaimStore::new());
    let keys = seps(25);
    let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let file = claims_csv(&refs);
    let coordinator = coordinator(store.clone(), 10, false);

    let first = ingest(&coordinator, file.path()).await;
    assert_eq!(first.status, UploadStatus::Success);
    assert_eq!(first.inserted_rows, 25);

    let second = ingest(&coordinator, file.path()).await;
    assert_eq!(second.new_rows, 0);
    assert_eq!(second.duplicate_rows, second.total_rows);
    assert_eq!(second.inserted_rows, 0);
    assert_eq!(second.status, UploadStatus::Success);

    // The adjustment ran once, on the first upload only
    let ds = store.fetch_rows(&["TARIF_RS".to_string()]).await.unwrap();
    assert!(ds.rows.iter().all(|r| r.hospital_tariff() == 790_000.0));
    assert_eq!(store.stats().await.unwrap().total_uploads, 2);
}

#[tokio::test]
async fn test_failed_batch_does_not_roll_back_others() {
    let store = Arc::new(ScriptedStore::new().failing(&[2]));
    let keys = seps(7);
    let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let file = claims_csv(&refs);

    let summary = ingest(&coordinator(store.clone(), 3, false), file.path()).await;

    assert_eq!(summary.status, UploadStatus::Partial);
    assert_eq!(summary.inserted_rows, 4);
    assert_eq!(summary.failed_rows, 3);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].context.as_deref(), Some("batch=2"));
    assert!(summary.errors[0].message.contains("connection reset"));

    let stored = store.existing_keys().await.unwrap();
    assert!(stored.contains(&keys[0]));
    assert!(!stored.contains(&keys[3]));
    assert!(stored.contains(&keys[6]));

    let uploads = store.recent_uploads(1).await.unwrap();
    assert_eq!(uploads[0].status, UploadStatus::Partial);
    assert_eq!(uploads[0].rows_failed, 3);
}

#[tokio::test]
async fn test_every_batch_failing_is_failed() {
    let store = Arc::new(ScriptedStore::new().failing(&[1, 2]));
    let file = claims_csv(&["A1", "A2", "A3"]);
    let summary = ingest(&coordinator(store, 2, false), file.path()).await;

    assert_eq!(summary.status, UploadStatus::Failed);
    assert_eq!(summary.failed_rows, 3);
    assert_eq!(summary.errors.len(), 2);
}

#[tokio::test]
async fn test_write_time_conflict_counts_as_duplicate() {
    let store = Arc::new(ScriptedStore::new().hiding_keys());
    seed(store.as_ref(), &["A2".to_string()]).await;

    let file = claims_csv(&["A1", "A2", "A3"]);
    let summary = ingest(&coordinator(store.clone(), 100, false), file.path()).await;

    assert_eq!(summary.status, UploadStatus::Success);
    assert_eq!(summary.inserted_rows, 2);
    assert_eq!(summary.new_rows, 2);
    assert_eq!(summary.duplicate_rows, 1);
    assert_eq!(summary.failed_rows, 0);
    assert_eq!(summary.duplicate_keys, vec!["A2".to_string()]);
}

#[tokio::test]
async fn test_shutdown_between_batches() {
    let (tx, rx) = watch::channel(false);
    let store = Arc::new(ScriptedStore::new().shutdown_after(1, tx));
    let keys = seps(10);
    let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let file = claims_csv(&refs);

    let coordinator = IngestCoordinator::new(store.clone(), &config(4), false, rx);
    let summary = ingest(&coordinator, file.path()).await;

    assert!(summary.interrupted);
    assert_eq!(summary.inserted_rows, 4);
    assert_eq!(summary.failed_rows, 6);
    assert_eq!(summary.status, UploadStatus::Partial);
    assert!(summary.errors.iter().any(|e| e.message == INTERRUPTED_REASON));
    assert_eq!(store.existing_keys().await.unwrap().len(), 4);

    // Resuming with the same file picks up the remainder
    let (_tx, rx) = watch::channel(false);
    let resumed = IngestCoordinator::new(store.clone(), &config(4), false, rx);
    let summary = ingest(&resumed, file.path()).await;
    assert_eq!(summary.duplicate_rows, 4);
    assert_eq!(summary.inserted_rows, 6);
    assert_eq!(summary.status, UploadStatus::Success);
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let store = Arc::new(MemoryClaimStore::new());
    let file = claims_csv(&["A1", "A2", "A3"]);
    let summary = ingest(&coordinator(store.clone(), 2, true), file.path()).await;

    assert!(summary.dry_run);
    assert_eq!(summary.status, UploadStatus::Success);
    assert_eq!(summary.inserted_rows, 3);
    assert_eq!(summary.adjustment.zero_count, 3);

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_claims, 0);
    assert_eq!(stats.total_uploads, 0);
}

#[tokio::test]
async fn test_file_store_persists_across_coordinators() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("claims.json");
    let file = claims_csv(&["A1", "A2"]);

    {
        let store = Arc::new(MemoryClaimStore::open(&path).await.unwrap());
        let summary = ingest(&coordinator(store, 100, false), file.path()).await;
        assert_eq!(summary.inserted_rows, 2);
    }

    let store = Arc::new(MemoryClaimStore::open(&path).await.unwrap());
    let summary = ingest(&coordinator(store, 100, false), file.path()).await;
    assert_eq!(summary.duplicate_rows, 2);
    assert_eq!(summary.inserted_rows, 0);
}
