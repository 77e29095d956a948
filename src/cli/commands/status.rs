//! Status command implementation
//!
//! Prints store statistics and the most recent upload logs.

use super::{connect_or_exit, load_or_exit, EXIT_FATAL, EXIT_SUCCESS};
use crate::adapters::store::UploadStatus;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Number of recent uploads to show
    #[arg(long, default_value_t = 10)]
    pub uploads: usize,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking claim store status");

        println!("📊 Claim Store Status");
        println!();

        let config = match load_or_exit(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let store = match connect_or_exit(&config).await {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let stats = match store.stats().await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to read store statistics");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        println!("  Backend: {}", store.backend_name());
        println!("  Claims: {}", stats.total_claims);
        println!("  Patients: {}", stats.distinct_patients);
        println!("  Uploads: {}", stats.total_uploads);
        println!(
            "  Last Upload: {}",
            stats
                .last_upload_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "Never".to_string())
        );
        println!();

        let uploads = match store.recent_uploads(self.uploads).await {
            Ok(u) => u,
            Err(e) => {
                println!("❌ Failed to load upload history");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        if uploads.is_empty() {
            println!("No uploads recorded.");
            println!("Run 'claimrecon ingest <FILE>' to load a billing extract.");
            return Ok(EXIT_SUCCESS);
        }

        println!(
            "{:<20} {:<30} {:<12} {:>8} {:>8} {:>8} {:>8}",
            "Uploaded", "File", "Status", "Rows", "Inserted", "Dupes", "Failed"
        );
        println!("{}", "-".repeat(100));

        for log in &uploads {
            let status = match log.status {
                UploadStatus::Success => "✅ success",
                UploadStatus::Partial => "⚠️  partial",
                UploadStatus::Rejected => "❌ rejected",
                UploadStatus::Failed => "❌ failed",
            };
            println!(
                "{:<20} {:<30} {:<12} {:>8} {:>8} {:>8} {:>8}",
                log.uploaded_at.format("%Y-%m-%d %H:%M:%S"),
                truncate(&log.filename, 30),
                status,
                log.rows_processed,
                log.rows_inserted,
                log.rows_duplicate,
                log.rows_failed
            );
            if let Some(message) = &log.error_message {
                println!("    {message}");
            }
        }

        println!();
        Ok(EXIT_SUCCESS)
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let kept: String = value.chars().take(width.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
