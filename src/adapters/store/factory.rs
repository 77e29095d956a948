//! Claim store factory
//!
//! Builds the store selected by `store_target` in the configuration.

use super::memory::MemoryClaimStore;
use super::traits::ClaimStore;
use crate::adapters::postgresql::adapter::PostgreSQLClaimStore;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::schema::{ClaimReconConfig, StoreTarget};
use crate::domain::{ClaimReconError, Result};
use std::sync::Arc;

/// Create a claim store based on the configuration
///
/// # Errors
///
/// Returns a configuration error if the selected backend has no settings
/// section, or a database error if the backend cannot be opened.
pub async fn create_claim_store(config: &ClaimReconConfig) -> Result<Arc<dyn ClaimStore>> {
    match config.store_target {
        StoreTarget::Memory => {
            tracing::info!("Creating in-memory claim store");
            Ok(Arc::new(MemoryClaimStore::new()) as Arc<dyn ClaimStore>)
        }
        StoreTarget::File => {
            let file_config = config.file_store.as_ref().ok_or_else(|| {
                ClaimReconError::Configuration(
                    "store_target is 'file' but [file_store] is missing".to_string(),
                )
            })?;

            tracing::info!(path = %file_config.path, "Opening file-backed claim store");
            let store = MemoryClaimStore::open(&file_config.path).await?;
            Ok(Arc::new(store) as Arc<dyn ClaimStore>)
        }
        StoreTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                ClaimReconError::Configuration(
                    "store_target is 'postgresql' but [postgresql] is missing".to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL claim store");
            let client = PostgreSQLClient::new(pg_config.clone()).await?;
            Ok(Arc::new(PostgreSQLClaimStore::new(client)) as Arc<dyn ClaimStore>)
        }
    }
}
