//! Validate config command implementation
//!
//! Loads and validates the configuration file and prints a summary with
//! secrets left out.

use super::{fail, finish};
use crate::config::{load_config, BastionConfig, CredentialConfig, StoreBackend};
use crate::core::engine::Response;
use clap::Args;
use serde::Serialize;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

/// Non-secret view of a valid configuration
#[derive(Debug, Serialize)]
pub struct ConfigSummary {
    pub config_path: String,
    pub log_level: String,
    pub dry_run: bool,
    pub backend: String,
    pub store: String,
    pub credential: String,
    pub default_document: String,
    pub max_concurrency: usize,
    pub restricted_document: String,
    pub output_dir: String,
    pub file_prefix: String,
    pub file_logging: bool,
}

impl ConfigSummary {
    fn new(config_path: &str, config: &BastionConfig) -> Self {
        let store = match config.store.backend {
            StoreBackend::Firestore => format!(
                "{} ({}/{})",
                config.store.base_url, config.store.project_id, config.store.database_id
            ),
            StoreBackend::Local => config.store.local_path.clone().unwrap_or_default(),
        };
        let credential = match &config.store.credential {
            Some(CredentialConfig::File { path }) => format!("file: {path}"),
            Some(CredentialConfig::Embedded { .. }) => "embedded".to_string(),
            None => "none".to_string(),
        };

        Self {
            config_path: config_path.to_string(),
            log_level: config.application.log_level.clone(),
            dry_run: config.application.dry_run,
            backend: format!("{:?}", config.store.backend).to_lowercase(),
            store,
            credential,
            default_document: format!(
                "{}/{}",
                config.migration.default_collection, config.migration.default_document_id
            ),
            max_concurrency: config.migration.max_concurrency,
            restricted_document: format!(
                "{}/{}",
                config.export.restricted_collection, config.export.restricted_document_id
            ),
            output_dir: config.export.output_dir.clone(),
            file_prefix: config.export.file_prefix.clone(),
            file_logging: config.logging.local_enabled,
        }
    }
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        // load_config validates before returning
        match load_config(config_path) {
            Ok(config) => finish(&Response::success(ConfigSummary::new(config_path, &config))),
            Err(e) => fail(&e),
        }
    }
}
