//! Validate config command implementation

use super::{EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::{load_config, StoreTarget};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates after applying overrides
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Store Target: {}", config.store_target);

        match config.store_target {
            StoreTarget::Memory => {
                println!("  Note: the memory store does not persist between runs");
            }
            StoreTarget::File => {
                if let Some(ref file_config) = config.file_store {
                    println!("  Store File: {}", file_config.path);
                }
            }
            StoreTarget::PostgreSQL => {
                if let Some(ref pg_config) = config.postgresql {
                    use secrecy::ExposeSecret;
                    println!(
                        "  PostgreSQL Connection: {}",
                        crate::adapters::postgresql::client::redact(
                            pg_config.connection_string.expose_secret().as_ref()
                        )
                    );
                    println!("  Max Connections: {}", pg_config.max_connections);
                    println!("  SSL Mode: {}", pg_config.ssl_mode);
                }
            }
        }

        println!("  Batch Size: {}", config.ingest.batch_size);
        println!(
            "  Fallback Encodings: {}",
            config.ingest.fallback_encodings.join(", ")
        );
        println!("  Query Row Limit: {}", config.query.default_limit);
        if config.logging.local_enabled {
            println!(
                "  Log Files: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        }
        println!();
        Ok(EXIT_SUCCESS)
    }
}
