//! Inspect command implementation
//!
//! Detection, extraction and validation only. The store is never opened.

use super::{load_or_exit, EXIT_REJECTED, EXIT_SUCCESS};
use crate::config::ClaimReconConfig;
use crate::core::ingest::{FormatDetector, IntegrityValidator, TabularExtractor};
use clap::Args;
use std::path::{Path, PathBuf};

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// File to inspect
    pub file: PathBuf,
}

impl InspectArgs {
    /// Execute the inspect command
    ///
    /// A missing configuration file falls back to defaults, since only the
    /// ingest settings are used.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = if Path::new(config_path).exists() {
            match load_or_exit(config_path) {
                Ok(c) => c,
                Err(code) => return Ok(code),
            }
        } else {
            tracing::debug!(config_path = %config_path, "No configuration file; using defaults");
            ClaimReconConfig::default()
        };

        println!("🔍 Inspecting {}", self.file.display());
        println!();

        let detection = match FormatDetector::from_config(&config.ingest).detect(&self.file) {
            Ok(d) => d,
            Err(e) => {
                println!("❌ {e}");
                return Ok(EXIT_REJECTED);
            }
        };
        println!("  Format: {}", detection.format);
        println!(
            "  Encoding: {} (confidence {:.2})",
            detection.encoding.name(),
            detection.encoding_confidence
        );
        println!("  Delimiter: {}", detection.delimiter_name());

        let table = match TabularExtractor::new().extract(&self.file, &detection) {
            Ok(t) => t,
            Err(e) => {
                println!();
                println!("❌ {e}");
                return Ok(EXIT_REJECTED);
            }
        };
        println!("  Reader: {}", table.reader);
        for attempt in &table.failed_attempts {
            println!("    tried {}: {}", attempt.method, attempt.reason);
        }
        println!("  Rows: {}", table.dataset.len());
        println!("  Columns: {}", table.dataset.columns.len());
        if table.dropped_rows > 0 || table.dropped_columns > 0 {
            println!(
                "  Dropped: {} empty row(s), {} empty column(s)",
                table.dropped_rows, table.dropped_columns
            );
        }
        println!();

        let mut dataset = table.dataset;
        dataset.normalize_numeric();
        let report = IntegrityValidator::new().validate(&dataset);
        println!("  Integrity Score: {}", report.integrity_score);

        for warning in &report.warnings {
            println!("  ⚠️  {warning}");
        }
        for error in &report.errors {
            println!("  ❌ {error}");
        }
        println!();

        if report.valid {
            println!("✅ File would be accepted");
            Ok(EXIT_SUCCESS)
        } else {
            println!("❌ File would be rejected");
            Ok(EXIT_REJECTED)
        }
    }
}
