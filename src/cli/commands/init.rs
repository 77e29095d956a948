//! `claimrecon init`: writes a starter `claimrecon.toml`

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Config file to write
    #[arg(short, long, default_value = "claimrecon.toml")]
    pub output: String,

    /// Include every section with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Replace the file if it exists
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, with_examples = self.with_examples, "Writing starter config");

        println!("📝 Initializing claimrecon configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ {} exists; pass --force to replace it", self.output);
            return Ok(EXIT_CONFIG);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Wrote {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Review {}", self.output);
                println!("  2. Set store_target to 'file' or 'postgresql'");
                println!("  3. For PostgreSQL, put CLAIMRECON_PG_URL in a .env file");
                println!("  4. Validate configuration: claimrecon validate-config");
                println!("  5. Ingest a billing extract: claimrecon ingest <FILE>");
                println!("  6. Run a view: claimrecon query financial");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Could not write {}: {e}", self.output);
                Ok(EXIT_FATAL)
            }
        }
    }

    /// File store, defaults everywhere else
    fn generate_minimal_config() -> String {
        r#"# claimrecon configuration

# Claim store (memory | file | postgresql)
store_target = "file"

[application]
log_level = "info"
dry_run = false

[ingest]
batch_size = 100

[file_store]
path = "./data/claims.json"
"#
        .to_string()
    }

    /// Generate configuration with every section documented
    fn generate_config_with_examples() -> String {
        r#"# claimrecon configuration
#
# ${VAR} placeholders are replaced from the environment (and .env).
# CLAIMRECON_<SECTION>_<KEY> variables override values in this file.

# Claim store (memory | file | postgresql)
store_target = "file"

# ============================================================================
# Application
# ============================================================================
[application]
# trace | debug | info | warn | error
log_level = "info"

# Run the full pipeline without writing claims or upload logs
dry_run = false

# ============================================================================
# Ingestion
# ============================================================================
[ingest]
# Rows per store transaction (1-5000)
batch_size = 100

# Bytes sampled for encoding detection (10240-51200)
encoding_sample_bytes = 32768

# Lines sampled for delimiter detection (5-10)
delimiter_sample_lines = 10

# Encodings tried, in order, when the sample is not valid UTF-8
fallback_encodings = ["utf-8", "windows-1252", "iso-8859-1"]

# ============================================================================
# Query output
# ============================================================================
[query]
# Rows printed by `claimrecon query` (0 = all)
default_limit = 100

# ============================================================================
# Claim stores (configure the one selected by store_target)
# ============================================================================
[file_store]
path = "./data/claims.json"

# [postgresql]
# connection_string = "${CLAIMRECON_PG_URL}"
# max_connections = 10
# connection_timeout_seconds = 30
# statement_timeout_seconds = 60
# disable | allow | prefer | require | verify-ca | verify-full
# ssl_mode = "prefer"

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "./logs"

# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
