//! Ingest command implementation
//!
//! Runs one file through detection, extraction, validation, deduplication,
//! tariff adjustment and batched persistence.

use super::{connect_or_exit, load_or_exit, EXIT_CONFIG, EXIT_FATAL, EXIT_PARTIAL, EXIT_REJECTED, EXIT_SUCCESS};
use crate::adapters::store::UploadStatus;
use crate::core::ingest::{IngestCoordinator, IngestSummary, INTERRUPTED_REASON};
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Billing extract to ingest (csv, tsv, txt, xlsx, xls, xlsb, ods)
    pub file: PathBuf,

    /// Run the full pipeline without writing to the store
    #[arg(long)]
    pub dry_run: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestArgs {
    /// Execute the ingest command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(file = %self.file.display(), "Starting ingest command");

        let config = match load_or_exit(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        if !self.file.is_file() {
            eprintln!("❌ File not found: {}", self.file.display());
            return Ok(EXIT_CONFIG);
        }

        let dry_run = config.dry_run(self.dry_run);
        if dry_run {
            tracing::info!("Dry run mode enabled - no data will be written");
            if !self.json {
                println!("🔍 DRY RUN MODE - No data will be written to the claim store");
                println!();
            }
        }

        let store = match connect_or_exit(&config).await {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let coordinator = IngestCoordinator::new(store, &config, dry_run, shutdown_signal);
        let summary = match coordinator.ingest_file(&self.file).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Ingest failed");
                eprintln!("Ingest failed: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }

        Ok(exit_code(&summary))
    }
}

fn print_summary(summary: &IngestSummary) {
    println!("📊 Ingest Summary: {}", summary.file_name);
    println!("  Status: {}", summary.status);
    println!("  Total Rows: {}", summary.total_rows);
    println!("  New: {}", summary.new_rows);
    println!("  Duplicates: {}", summary.duplicate_rows);
    println!("  Inserted: {}", summary.inserted_rows);
    println!("  Failed: {}", summary.failed_rows);
    println!(
        "  Tariff Adjustments: {} (x0.79: {}, x0.73: {})",
        summary.adjustment.adjusted_rows(),
        summary.adjustment.zero_count,
        summary.adjustment.roman_count
    );
    println!("  Integrity Score: {}", summary.integrity_score);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if !summary.duplicate_keys.is_empty() {
        const SHOWN: usize = 10;
        println!("🔁 Duplicate SEPs:");
        for key in summary.duplicate_keys.iter().take(SHOWN) {
            println!("  - {key}");
        }
        if summary.duplicate_keys.len() > SHOWN {
            println!("  ... and {} more", summary.duplicate_keys.len() - SHOWN);
        }
        println!();
    }

    if !summary.warnings.is_empty() {
        println!("⚠️  Warnings:");
        for warning in &summary.warnings {
            println!("  - {warning}");
        }
        println!();
    }

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in &summary.errors {
            println!("  - {:?}: {}", error.error_type, error.message);
            if let Some(context) = &error.context {
                println!("    Context: {context}");
            }
        }
        println!();
    }

    if summary.interrupted {
        println!("⚠️  Ingest interrupted; remaining rows reported as '{INTERRUPTED_REASON}'.");
        println!("   Re-run the same file to ingest them; stored rows are skipped as duplicates.");
    } else {
        match summary.status {
            UploadStatus::Success => println!("✅ Ingest completed successfully!"),
            UploadStatus::Partial => println!("⚠️  Ingest completed with failures"),
            UploadStatus::Rejected => println!("❌ Upload rejected"),
            UploadStatus::Failed => println!("❌ Ingest failed"),
        }
    }
}

/// Maps a summary to the process exit code
pub fn exit_code(summary: &IngestSummary) -> i32 {
    match summary.status {
        UploadStatus::Success => EXIT_SUCCESS,
        UploadStatus::Partial => EXIT_PARTIAL,
        UploadStatus::Rejected => EXIT_REJECTED,
        UploadStatus::Failed => EXIT_FATAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(UploadStatus::Success, 0)]
    #[test_case(UploadStatus::Partial, 1)]
    #[test_case(UploadStatus::Rejected, 3)]
    #[test_case(UploadStatus::Failed, 5)]
    fn test_exit_codes(status: UploadStatus, code: i32) {
        let mut summary = IngestSummary::new("claims.csv");
        summary.status = status;
        assert_eq!(exit_code(&summary), code);
    }

    #[tokio::test]
    async fn test_missing_config_is_config_error() {
        let args = IngestArgs {
            file: PathBuf::from("claims.csv"),
            dry_run: false,
            json: false,
        };
        let (_tx, rx) = watch::channel(false);
        let code = args
            .execute("/nonexistent/claimrecon.toml", rx)
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
