// ClaimRecon - Hospital claim reconciliation
// Copyright (c) 2025 ClaimRecon Contributors
// Licensed under the MIT License

//! # claimrecon
//!
//! claimrecon ingests hospital insurance billing extracts (delimited text or
//! spreadsheets), reconciles them against a persisted claim store, and derives
//! analytical views over the stored claims.
//!
//! ## Overview
//!
//! - **Ingesting** files with format, encoding and delimiter detection
//! - **Validating** dataset integrity and skipping already-stored claims by SEP
//! - **Adjusting** hospital tariffs by case-mix severity before persistence
//! - **Querying** six views (financial, patient, LOS, INACBG, tariff gap,
//!   ventilator) with sorting, admission-date ranges and value filters
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Ingest pipeline, analytical views and the query engine
//! - [`adapters`] - Claim stores (memory, file snapshot, PostgreSQL)
//! - [`domain`] - Rows, identifiers, column catalogue and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use claimrecon::adapters::store::create_claim_store;
//! use claimrecon::config::load_config;
//! use claimrecon::core::ingest::IngestCoordinator;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("claimrecon.toml")?;
//!     let store = create_claim_store(&config).await?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let coordinator = IngestCoordinator::new(store, &config, false, shutdown_rx);
//!     let summary = coordinator.ingest_file(Path::new("claims.csv")).await?;
//!
//!     println!(
//!         "{}: {} new, {} duplicate, {} inserted",
//!         summary.status, summary.new_rows, summary.duplicate_rows, summary.inserted_rows
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`], whose error is
//! [`domain::ClaimReconError`]. Format and query failures carry the structured
//! [`domain::FormatError`] and [`domain::QueryError`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
