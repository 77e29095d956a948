//! CLI command implementations
//!
//! Every command returns the process exit code:
//! 0 success, 1 partial success, 2 configuration error, 3 upload rejected,
//! 4 store connection failure, 5 fatal error.

pub mod ingest;
pub mod init;
pub mod inspect;
pub mod query;
pub mod status;
pub mod validate;

use crate::adapters::store::{create_claim_store, ClaimStore};
use crate::config::{load_config, ClaimReconConfig};
use std::sync::Arc;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_REJECTED: i32 = 3;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// Loads the configuration, printing the failure and returning the exit code on error
pub(crate) fn load_or_exit(config_path: &str) -> Result<ClaimReconConfig, i32> {
    load_config(config_path).map_err(|e| {
        tracing::error!(error = %e, config_path = %config_path, "Failed to load configuration");
        eprintln!("❌ Failed to load configuration file");
        eprintln!("   Error: {e}");
        EXIT_CONFIG
    })
}

/// Opens the configured store and makes sure its schema exists
pub(crate) async fn connect_or_exit(
    config: &ClaimReconConfig,
) -> Result<Arc<dyn ClaimStore>, i32> {
    let store = match create_claim_store(config).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "Failed to open claim store");
            eprintln!("❌ Failed to connect to claim store");
            eprintln!("   Error: {e}");
            return Err(EXIT_CONNECTION);
        }
    };

    if let Err(e) = store.test_connection().await {
        tracing::error!(error = %e, backend = store.backend_name(), "Claim store unreachable");
        eprintln!("❌ Claim store is unreachable");
        eprintln!("   Error: {e}");
        return Err(EXIT_CONNECTION);
    }

    if let Err(e) = store.ensure_schema().await {
        tracing::error!(error = %e, backend = store.backend_name(), "Failed to prepare claim store");
        eprintln!("❌ Failed to prepare claim store");
        eprintln!("   Error: {e}");
        return Err(EXIT_CONNECTION);
    }

    Ok(store)
}
