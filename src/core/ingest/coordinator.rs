//! Ingest coordinator - runs one file through the whole pipeline
//!
//! detect → extract → normalise → validate → deduplicate → adjust → persist.
//! Format and validation failures reject the upload before anything is
//! written. Batch failures are recorded and the remaining batches still run.

use crate::adapters::store::{ClaimStore, UploadLog};
use crate::config::ClaimReconConfig;
use crate::core::ingest::batch::BatchPersister;
use crate::core::ingest::dedup;
use crate::core::ingest::detect::FormatDetector;
use crate::core::ingest::extract::TabularExtractor;
use crate::core::ingest::summary::{IngestError, IngestErrorType, IngestSummary};
use crate::core::ingest::tariff::TariffAdjustmentEngine;
use crate::core::ingest::validate::IntegrityValidator;
use crate::domain::{Dataset, FormatError, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Reason recorded for rows left unwritten after a shutdown request
pub const INTERRUPTED_REASON: &str = "ingestion interrupted";

/// Ingest coordinator
pub struct IngestCoordinator {
    store: Arc<dyn ClaimStore>,
    detector: FormatDetector,
    extractor: TabularExtractor,
    validator: IntegrityValidator,
    tariff: TariffAdjustmentEngine,
    persister: BatchPersister,
    dry_run: bool,
    shutdown_signal: watch::Receiver<bool>,
}

impl IngestCoordinator {
    /// Create a new ingest coordinator
    pub fn new(
        store: Arc<dyn ClaimStore>,
        config: &ClaimReconConfig,
        dry_run: bool,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            persister: BatchPersister::new(store.clone(), config.ingest.batch_size, dry_run),
            store,
            detector: FormatDetector::from_config(&config.ingest),
            extractor: TabularExtractor::new(),
            validator: IntegrityValidator::new(),
            tariff: TariffAdjustmentEngine::new(),
            dry_run,
            shutdown_signal,
        }
    }

    /// The store this coordinator writes to
    pub fn store(&self) -> &Arc<dyn ClaimStore> {
        &self.store
    }

    /// Ingest one file
    ///
    /// Always returns a summary; the `Result` is reserved for failures the
    /// caller cannot act on per upload.
    pub async fn ingest_file(&self, path: &Path) -> Result<IngestSummary> {
        let start_time = Instant::now();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        crate::log_ingest_start!(file_name, file_size);

        let extracted = self
            .detector
            .detect(path)
            .and_then(|detection| {
                tracing::info!(
                    file = %file_name,
                    format = %detection.format,
                    encoding = detection.encoding.name(),
                    confidence = detection.encoding_confidence,
                    delimiter = detection.delimiter_name(),
                    "Format detected"
                );
                self.extractor.extract(path, &detection)
            });

        let table = match extracted {
            Ok(table) => table,
            Err(e) => {
                let summary = self.format_rejection(&file_name, e);
                return Ok(self
                    .finish(summary, file_size, start_time)
                    .await);
            }
        };

        for attempt in &table.failed_attempts {
            tracing::debug!(method = %attempt.method, reason = %attempt.reason, "Reader failed");
        }
        tracing::info!(
            file = %file_name,
            reader = %table.reader,
            rows = table.dataset.len(),
            columns = table.dataset.columns.len(),
            dropped_rows = table.dropped_rows,
            dropped_columns = table.dropped_columns,
            "File extracted"
        );

        self.ingest_extracted(&file_name, file_size, table.dataset, start_time)
            .await
    }

    /// Ingest rows that were already extracted
    pub async fn ingest_dataset(
        &self,
        file_name: &str,
        file_size: u64,
        dataset: Dataset,
    ) -> Result<IngestSummary> {
        self.ingest_extracted(file_name, file_size, dataset, Instant::now())
            .await
    }

    fn format_rejection(&self, file_name: &str, error: FormatError) -> IngestSummary {
        tracing::warn!(file = %file_name, error = %error, "Upload rejected");
        let mut summary = IngestSummary::new(file_name);
        summary.dry_run = self.dry_run;
        summary.reject(IngestError::new(IngestErrorType::Format, error.to_string()));
        summary
    }

    async fn ingest_extracted(
        &self,
        file_name: &str,
        file_size: u64,
        mut dataset: Dataset,
        start_time: Instant,
    ) -> Result<IngestSummary> {
        let mut summary = IngestSummary::new(file_name);
        summary.dry_run = self.dry_run;
        summary.total_rows = dataset.len();

        dataset.normalize_numeric();

        let report = self.validator.validate(&dataset);
        summary.warnings = report.warnings.clone();
        summary.integrity_score = report.integrity_score;

        if let Err(e) = report.into_result() {
            tracing::warn!(file = %file_name, error = %e, "Upload rejected");
            summary.reject(IngestError::new(IngestErrorType::Validation, e.to_string()));
            return Ok(self.finish(summary, file_size, start_time).await);
        }

        let outcome = match dedup::partition(&dataset, self.store.as_ref()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to read existing claim keys");
                summary.new_rows = 0;
                summary.add_error(
                    IngestError::new(IngestErrorType::Store, e.to_string())
                        .with_context("existing_keys"),
                );
                return Ok(self.finish(summary, file_size, start_time).await);
            }
        };

        summary.new_rows = outcome.new_rows.len();
        summary.duplicate_rows = outcome.duplicate_rows.len();
        summary.duplicate_keys = outcome.duplicate_keys;

        let mut fresh = Dataset::with_rows(dataset.columns, outcome.new_rows);
        summary.adjustment = self.tariff.apply(&mut fresh);

        self.persist(fresh, &mut summary).await;

        Ok(self.finish(summary, file_size, start_time).await)
    }

    async fn persist(&self, dataset: Dataset, summary: &mut IngestSummary) {
        let batch_size = self.persister.batch_size();
        let total_batches = self.persister.batch_count(dataset.len());
        let mut pending = dataset.rows;
        let mut batch_number = 0;

        while !pending.is_empty() {
            if *self.shutdown_signal.borrow() {
                tracing::warn!(
                    remaining_rows = pending.len(),
                    completed_batches = batch_number,
                    "Shutdown requested, stopping before next batch"
                );
                summary.interrupted = true;
                summary.failed_rows += pending.len();
                summary.add_error(
                    IngestError::new(IngestErrorType::Persistence, INTERRUPTED_REASON)
                        .with_context(format!("{} row(s) not written", pending.len())),
                );
                break;
            }

            let rest = pending.split_off(pending.len().min(batch_size));
            let batch = std::mem::replace(&mut pending, rest);
            batch_number += 1;

            crate::log_batch_processing!(batch_number, total_batches);
            let result = self.persister.persist_batch(batch_number, batch).await;

            summary.inserted_rows += result.successful;
            summary.failed_rows += result.failed;

            // Write-time uniqueness violations move from new to duplicate
            summary.new_rows -= result.duplicates;
            summary.duplicate_rows += result.duplicates;
            summary.duplicate_keys.extend(result.duplicate_keys);

            for error in result.errors {
                summary.add_error(
                    IngestError::new(IngestErrorType::Persistence, error)
                        .with_context(format!("batch={batch_number}")),
                );
            }
        }
    }

    async fn finish(
        &self,
        mut summary: IngestSummary,
        file_size: u64,
        start_time: Instant,
    ) -> IngestSummary {
        summary.finalize_status();
        summary = summary.with_duration(start_time.elapsed());

        if self.dry_run {
            tracing::info!(file = %summary.file_name, "DRY RUN: upload log not recorded");
        } else {
            let mut log = UploadLog::new(summary.file_name.clone(), file_size, summary.status);
            log.rows_processed = summary.total_rows;
            log.rows_inserted = summary.inserted_rows;
            log.rows_duplicate = summary.duplicate_rows;
            log.rows_failed = summary.failed_rows;
            log.error_message = summary.first_error();

            if let Err(e) = self.store.record_upload(&log).await {
                tracing::warn!(error = %e, "Failed to record upload log");
            }
        }

        summary.log_summary();
        crate::log_ingest_complete!(
            summary.file_name,
            summary.total_rows,
            summary.inserted_rows,
            summary.duration
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::{MemoryClaimStore, UploadStatus};
    use crate::domain::{CellValue, ClaimRow};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn coordinator(store: Arc<MemoryClaimStore>, dry_run: bool) -> IngestCoordinator {
        let (_tx, rx) = watch::channel(false);
        IngestCoordinator::new(store, &ClaimReconConfig::default(), dry_run, rx)
    }

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_ingest_csv_end_to_end() {
        let store = Arc::new(MemoryClaimStore::new());
        let file = csv_file(
            "SEP;MRN;NAMA_PASIEN;INACBG;TARIF_RS;LOS\n\
             S1;1;Budi;K-4-17-I;1000000;3\n\
             S2;2;Sari;ABC;500000;x\n",
        );

        let summary = coordinator(store.clone(), false)
            .ingest_file(file.path())
            .await
            .unwrap();

        assert_eq!(summary.status, UploadStatus::Success);
        assert_eq!(summary.total_rows, 2);
        assert_eq!(summary.inserted_rows, 2);
        assert_eq!(summary.adjustment.roman_count, 1);

        let ds = store
            .fetch_rows(&["SEP".to_string(), "TARIF_RS".to_string(), "LOS".to_string()])
            .await
            .unwrap();
        let s1 = ds.rows.iter().find(|r| r.text("SEP") == "S1").unwrap();
        assert_eq!(s1.hospital_tariff(), 730_000.0);
        let s2 = ds.rows.iter().find(|r| r.text("SEP") == "S2").unwrap();
        assert_eq!(s2.get("LOS"), Some(&CellValue::Number(0.0)));

        let uploads = store.recent_uploads(10).await.unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].rows_inserted, 2);
    }

    #[tokio::test]
    async fn test_unsupported_file_is_rejected_and_logged() {
        let store = Arc::new(MemoryClaimStore::new());
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();

        let summary = coordinator(store.clone(), false)
            .ingest_file(file.path())
            .await
            .unwrap();

        assert_eq!(summary.status, UploadStatus::Rejected);
        assert_eq!(summary.errors[0].error_type, IngestErrorType::Format);
        let uploads = store.recent_uploads(10).await.unwrap();
        assert_eq!(uploads[0].status, UploadStatus::Rejected);
    }

    #[tokio::test]
    async fn test_missing_identifier_blocks_persistence() {
        let store = Arc::new(MemoryClaimStore::new());
        let ds = Dataset::with_rows(
            vec!["SEP".into()],
            vec![
                ClaimRow::from_pairs([("SEP", CellValue::from_raw("A"))]),
                ClaimRow::from_pairs([("SEP", CellValue::Null)]),
            ],
        );

        let summary = coordinator(store.clone(), false)
            .ingest_dataset("bad.csv", 0, ds)
            .await
            .unwrap();

        assert_eq!(summary.status, UploadStatus::Rejected);
        assert_eq!(summary.inserted_rows, 0);
        assert!(store.existing_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_before_first_batch() {
        let store = Arc::new(MemoryClaimStore::new());
        let (tx, rx) = watch::channel(false);
        let coordinator =
            IngestCoordinator::new(store.clone(), &ClaimReconConfig::default(), false, rx);
        tx.send(true).unwrap();

        let ds = Dataset::with_rows(
            vec!["SEP".into()],
            vec![ClaimRow::from_pairs([("SEP", CellValue::from_raw("A"))])],
        );
        let summary = coordinator.ingest_dataset("a.csv", 0, ds).await.unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.failed_rows, 1);
        assert_eq!(summary.status, UploadStatus::Failed);
        assert_eq!(summary.errors[0].message, INTERRUPTED_REASON);
    }
}
