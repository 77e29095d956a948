//! Logging and observability
//!
//! Structured logging through `tracing`, with an optional rotating JSON file.
//!
//! ```no_run
//! use claimrecon::logging::init_logging;
//! use claimrecon::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(file = "claims.csv", "Ingest requested");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an ingest
///
/// ```no_run
/// use claimrecon::log_ingest_start;
///
/// log_ingest_start!("claims_2024_01.csv", 2048u64);
/// ```
#[macro_export]
macro_rules! log_ingest_start {
    ($file:expr, $size:expr) => {
        tracing::info!(file = %$file, size_bytes = $size, "Starting ingest");
    };
}

/// Log the completion of an ingest
///
/// ```no_run
/// use claimrecon::log_ingest_complete;
/// use std::time::Duration;
///
/// log_ingest_complete!("claims.csv", 120, 118, Duration::from_secs(2));
/// ```
#[macro_export]
macro_rules! log_ingest_complete {
    ($file:expr, $total:expr, $inserted:expr, $duration:expr) => {
        tracing::info!(
            file = %$file,
            total_rows = $total,
            inserted_rows = $inserted,
            duration_ms = $duration.as_millis(),
            "Ingest completed"
        );
    };
}

/// Log an error with context
///
/// ```no_run
/// use claimrecon::log_error_with_context;
/// use claimrecon::domain::ClaimReconError;
///
/// let error = ClaimReconError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log progress through the persistence batches
///
/// ```no_run
/// use claimrecon::log_batch_processing;
///
/// log_batch_processing!(3, 10);
/// ```
#[macro_export]
macro_rules! log_batch_processing {
    ($current:expr, $total:expr) => {
        tracing::debug!(
            batch = $current,
            total_batches = $total,
            progress_pct = ($current as f64 / ($total as f64).max(1.0) * 100.0),
            "Processing batch"
        );
    };
}
