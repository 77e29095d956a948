//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{ClaimReconConfig, StoreTarget};
use super::secret::secret_string;
use crate::domain::errors::ClaimReconError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ClaimReconConfig
/// 4. Applies environment variable overrides (CLAIMRECON_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a configuration error if the file is missing or unreadable, a
/// referenced variable is unset, the TOML is malformed, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use claimrecon::config::loader::load_config;
///
/// let config = load_config("claimrecon.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ClaimReconConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ClaimReconError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ClaimReconError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_str(&contents)
}

/// Same as [`load_config`] but from an in-memory TOML document
pub fn load_config_str(contents: &str) -> Result<ClaimReconConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: ClaimReconConfig = toml::from_str(&contents)
        .map_err(|e| ClaimReconError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ClaimReconError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ClaimReconError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ClaimReconError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.trim().parse::<T>().map(Some).map_err(|_| {
            ClaimReconError::Configuration(format!("Invalid value '{val}' for {name}"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using the CLAIMRECON_* prefix
///
/// Variables follow the pattern CLAIMRECON_<SECTION>_<KEY>, for example
/// CLAIMRECON_INGEST_BATCH_SIZE or CLAIMRECON_POSTGRESQL_CONNECTION_STRING.
fn apply_env_overrides(config: &mut ClaimReconConfig) -> Result<()> {
    if let Ok(val) = std::env::var("CLAIMRECON_STORE_TARGET") {
        config.store_target = match val.to_lowercase().as_str() {
            "memory" => StoreTarget::Memory,
            "file" => StoreTarget::File,
            "postgresql" => StoreTarget::PostgreSQL,
            other => {
                return Err(ClaimReconError::Configuration(format!(
                    "Invalid CLAIMRECON_STORE_TARGET '{other}'. Must be one of: memory, file, postgresql"
                )))
            }
        };
    }

    // Application overrides
    if let Ok(val) = std::env::var("CLAIMRECON_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = parse_env("CLAIMRECON_APPLICATION_DRY_RUN")? {
        config.application.dry_run = val;
    }

    // Ingest overrides
    if let Some(val) = parse_env("CLAIMRECON_INGEST_BATCH_SIZE")? {
        config.ingest.batch_size = val;
    }
    if let Some(val) = parse_env("CLAIMRECON_INGEST_ENCODING_SAMPLE_BYTES")? {
        config.ingest.encoding_sample_bytes = val;
    }
    if let Some(val) = parse_env("CLAIMRECON_INGEST_DELIMITER_SAMPLE_LINES")? {
        config.ingest.delimiter_sample_lines = val;
    }

    // Query overrides
    if let Some(val) = parse_env("CLAIMRECON_QUERY_DEFAULT_LIMIT")? {
        config.query.default_limit = val;
    }

    // File store overrides
    if let Ok(val) = std::env::var("CLAIMRECON_FILE_STORE_PATH") {
        match config.file_store {
            Some(ref mut file_store) => file_store.path = val,
            None => config.file_store = Some(super::schema::FileStoreConfig { path: val }),
        }
    }

    // PostgreSQL overrides (only if PostgreSQL is configured)
    if let Some(ref mut pg_config) = config.postgresql {
        if let Ok(val) = std::env::var("CLAIMRECON_POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = secret_string(val);
        }
        if let Some(val) = parse_env("CLAIMRECON_POSTGRESQL_MAX_CONNECTIONS")? {
            pg_config.max_connections = val;
        }
        if let Some(val) = parse_env("CLAIMRECON_POSTGRESQL_STATEMENT_TIMEOUT_SECONDS")? {
            pg_config.statement_timeout_seconds = val;
        }
        if let Ok(val) = std::env::var("CLAIMRECON_POSTGRESQL_SSL_MODE") {
            pg_config.ssl_mode = val;
        }
    }

    // Logging overrides
    if let Some(val) = parse_env("CLAIMRECON_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("CLAIMRECON_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("CLAIMRECON_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("CLAIMRECON_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${CLAIMRECON_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("CLAIMRECON_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("CLAIMRECON_LOADER_MISSING_VAR");
        let input = "password = \"${CLAIMRECON_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("CLAIMRECON_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# password = \"${CLAIMRECON_LOADER_NEVER_SET}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-claimrecon.toml");
        assert!(matches!(result, Err(ClaimReconError::Configuration(_))));
    }

    #[test]
    fn test_load_config_empty_document_uses_defaults() {
        let config = load_config_str("").unwrap();
        assert_eq!(config.store_target, StoreTarget::Memory);
        assert_eq!(config.ingest.batch_size, 100);
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
store_target = "file"

[application]
log_level = "debug"

[ingest]
batch_size = 250

[file_store]
path = "data/claims.json"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.store_target, StoreTarget::File);
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.ingest.batch_size, 250);
        assert_eq!(config.file_store.unwrap().path, "data/claims.json");
    }

    #[test]
    fn test_load_config_validation_failure() {
        let err = load_config_str("[ingest]\nbatch_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }
}
