//! Configuration management for claimrecon.
//!
//! claimrecon reads a TOML file (`claimrecon.toml` by default) with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CLAIMRECON_<SECTION>_<KEY>` overrides
//! - Default values for every optional setting
//! - Validation after overrides are applied
//!
//! # Example Configuration
//!
//! ```toml
//! store_target = "postgresql"
//!
//! [application]
//! log_level = "info"
//!
//! [ingest]
//! batch_size = 100
//! fallback_encodings = ["utf-8", "windows-1252"]
//!
//! [postgresql]
//! connection_string = "${CLAIMRECON_PG_URL}"
//! ssl_mode = "prefer"
//!
//! [logging]
//! local_enabled = true
//! local_path = "./logs"
//! ```
//!
//! ```rust,no_run
//! use claimrecon::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("claimrecon.toml")?;
//! println!("Store: {}", config.store_target);
//! println!("Batch size: {}", config.ingest.batch_size);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_str};
pub use schema::{
    ApplicationConfig, ClaimReconConfig, FileStoreConfig, IngestConfig, LoggingConfig,
    PostgreSQLConfig, QueryConfig, StoreTarget,
};
pub use secret::{secret_string, SecretString, SecretValue};
