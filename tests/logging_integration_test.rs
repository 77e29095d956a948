//! Integration tests for logging functionality
//!
//! A global subscriber can only be installed once per process, so every
//! initialisation lives in a single test.

use claimrecon::config::LoggingConfig;
use claimrecon::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "./logs");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_file_logging_initialisation() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("debug", &config).unwrap();
    assert!(guard.has_file_output());
    assert!(log_path.exists());

    claimrecon::log_ingest_start!("claims.csv", 1024u64);
    claimrecon::log_batch_processing!(1, 3);
    tracing::info!(file = "claims.csv", "written to the file layer");

    // A second installation is refused rather than panicking
    assert!(init_logging("info", &LoggingConfig::default()).is_err());
}
