//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for claimrecon using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// claimrecon - hospital claim reconciliation
#[derive(Parser, Debug)]
#[command(name = "claimrecon")]
#[command(version, about, long_about = None)]
#[command(author = "ClaimRecon Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "claimrecon.toml", env = "CLAIMRECON_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CLAIMRECON_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest a billing extract into the claim store
    Ingest(commands::ingest::IngestArgs),

    /// Run an analytical view over persisted claims
    Query(commands::query::QueryArgs),

    /// Detect, extract and validate a file without touching the store
    Inspect(commands::inspect::InspectArgs),

    /// Show store statistics and recent uploads
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
