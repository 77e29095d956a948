//! Core business logic for claimrecon.
//!
//! - [`ingest`] - file ingestion, validation, deduplication, tariff adjustment and persistence
//! - [`views`] - the six analytical views over persisted claims
//! - [`query`] - typed query parameters and the engine that applies them to a view
//!
//! # Example
//!
//! ```rust,no_run
//! use claimrecon::adapters::store::create_claim_store;
//! use claimrecon::config::ClaimReconConfig;
//! use claimrecon::core::ingest::IngestCoordinator;
//! use claimrecon::core::query::{QueryEngine, QueryFilter, QueryParams};
//! use claimrecon::core::views::ViewKind;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClaimReconConfig::default();
//! let store = create_claim_store(&config).await?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = IngestCoordinator::new(store.clone(), &config, false, shutdown_rx);
//! let summary = coordinator.ingest_file(Path::new("claims.csv")).await?;
//! println!("inserted {} of {}", summary.inserted_rows, summary.total_rows);
//!
//! let filter = QueryFilter::parse(&QueryParams::default(), ViewKind::Financial)?;
//! let table = QueryEngine::new(store).run(ViewKind::Financial, &filter).await?;
//! println!("{} rows", table.rows.len());
//! # Ok(())
//! # }
//! ```

pub mod ingest;
pub mod query;
pub mod views;
