//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BastionConfig, CredentialConfig, StoreBackend};
use super::secret::secret_string;
use crate::domain::errors::BastionError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into BastionConfig
/// 4. Applies environment variable overrides (BASTION_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, a referenced variable is not
/// set, TOML parsing fails or validation fails.
///
/// # Examples
///
/// ```no_run
/// use bastion::config::loader::load_config;
///
/// let config = load_config("bastion.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BastionConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BastionError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BastionError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: BastionConfig = toml::from_str(&contents)
        .map_err(|e| BastionError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        BastionError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. All missing variables are reported in
/// a single error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| BastionError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
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
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(BastionError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using BASTION_* prefix
///
/// Environment variables follow the pattern: BASTION_<SECTION>_<KEY>
/// For example: BASTION_STORE_PROJECT_ID, BASTION_EXPORT_OUTPUT_DIR
fn apply_env_overrides(config: &mut BastionConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("BASTION_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("BASTION_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Store overrides
    if let Ok(val) = std::env::var("BASTION_STORE_BACKEND") {
        config.store.backend = match val.to_lowercase().as_str() {
            "firestore" => StoreBackend::Firestore,
            "local" => StoreBackend::Local,
            other => {
                return Err(BastionError::Configuration(format!(
                    "Invalid BASTION_STORE_BACKEND '{other}'. Must be one of: firestore, local"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("BASTION_STORE_PROJECT_ID") {
        config.store.project_id = val;
    }
    if let Ok(val) = std::env::var("BASTION_STORE_DATABASE_ID") {
        config.store.database_id = val;
    }
    if let Ok(val) = std::env::var("BASTION_STORE_BASE_URL") {
        config.store.base_url = val;
    }
    if let Ok(val) = std::env::var("BASTION_STORE_LOCAL_PATH") {
        config.store.local_path = Some(val);
    }
    if let Ok(val) = std::env::var("BASTION_STORE_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.store.timeout_seconds = timeout;
        }
    }
    // The embedded credential wins over the file credential, matching hosted
    // deployments that mount the key as a secret variable.
    if let Ok(val) = std::env::var("BASTION_STORE_CREDENTIAL_JSON") {
        config.store.credential = Some(CredentialConfig::Embedded {
            json: secret_string(val),
        });
    } else if let Ok(val) = std::env::var("BASTION_STORE_CREDENTIAL_PATH") {
        config.store.credential = Some(CredentialConfig::File { path: val });
    }

    // Migration overrides
    if let Ok(val) = std::env::var("BASTION_MIGRATION_DEFAULT_COLLECTION") {
        config.migration.default_collection = val;
    }
    if let Ok(val) = std::env::var("BASTION_MIGRATION_DEFAULT_DOCUMENT_ID") {
        config.migration.default_document_id = val;
    }
    if let Ok(val) = std::env::var("BASTION_MIGRATION_MAX_CONCURRENCY") {
        if let Ok(concurrency) = val.parse() {
            config.migration.max_concurrency = concurrency;
        }
    }

    // Export overrides
    if let Ok(val) = std::env::var("BASTION_EXPORT_RESTRICTED_COLLECTION") {
        config.export.restricted_collection = val;
    }
    if let Ok(val) = std::env::var("BASTION_EXPORT_RESTRICTED_DOCUMENT_ID") {
        config.export.restricted_document_id = val;
    }
    if let Ok(val) = std::env::var("BASTION_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("BASTION_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("BASTION_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
