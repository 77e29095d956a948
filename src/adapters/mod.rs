//! Persistence integrations.
//!
//! - [`store`] - the [`ClaimStore`](store::ClaimStore) trait, the in-memory and
//!   file-snapshot backends, and the factory that picks one from configuration
//! - [`postgresql`] - PostgreSQL backend
//!
//! ```rust,no_run
//! use claimrecon::adapters::store::{create_claim_store, ClaimStore};
//! use claimrecon::config::ClaimReconConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = create_claim_store(&ClaimReconConfig::default()).await?;
//! store.ensure_schema().await?;
//! let stats = store.stats().await?;
//! println!("{} claims", stats.total_claims);
//! # Ok(())
//! # }
//! ```

pub mod postgresql;
pub mod store;
