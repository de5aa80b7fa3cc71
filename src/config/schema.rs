//! Configuration schema types
//!
//! This module defines the configuration structure for Bastion.

use crate::config::SecretString;
use crate::domain::{BastionError, CollectionName, DocumentId, DocumentPath};
use serde::{Deserialize, Serialize};

/// Document store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Firestore over its REST API
    #[default]
    Firestore,
    /// JSON file on local disk
    Local,
}

/// Main Bastion configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BastionConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Document store connection
    pub store: StoreConfig,

    /// Migration settings
    #[serde(default)]
    pub migration: MigrationConfig,

    /// Snapshot export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BastionConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.store.validate()?;
        self.migration.validate()?;
        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (compute everything, write nothing)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Service account credential source
///
/// `file` reads the service-account JSON from disk at connect time;
/// `embedded` carries the JSON inline (usually injected with `${VAR}`
/// substitution from a secret store).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CredentialConfig {
    /// Path to a service-account JSON key file
    File {
        /// Key file path
        path: String,
    },
    /// Service-account JSON held in memory
    Embedded {
        /// Raw key JSON
        json: SecretString,
    },
}

impl CredentialConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        match self {
            CredentialConfig::File { path } if path.trim().is_empty() => {
                Err("store.credential.path cannot be empty".to_string())
            }
            CredentialConfig::Embedded { json } if json.expose_secret().is_empty() => {
                Err("store.credential.json cannot be empty".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend type
    #[serde(default)]
    pub backend: StoreBackend,

    /// Firestore project id
    #[serde(default)]
    pub project_id: String,

    /// Firestore database id
    #[serde(default = "default_database_id")]
    pub database_id: String,

    /// Firestore REST base URL (point at the emulator for local testing)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// OAuth2 token endpoint for the service-account exchange
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Page size for list calls
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Store file for the local backend
    #[serde(default)]
    pub local_path: Option<String>,

    /// Credential source; none means unauthenticated (emulator)
    #[serde(default)]
    pub credential: Option<CredentialConfig>,
}

impl StoreConfig {
    fn validate(&self) -> Result<(), String> {
        match self.backend {
            StoreBackend::Firestore => {
                if self.project_id.trim().is_empty() {
                    return Err(
                        "store.project_id is required when backend = 'firestore'".to_string()
                    );
                }

                if self.database_id.trim().is_empty() {
                    return Err("store.database_id cannot be empty".to_string());
                }

                for (name, value) in [("base_url", &self.base_url), ("token_url", &self.token_url)]
                {
                    let parsed = url::Url::parse(value)
                        .map_err(|e| format!("store.{name} is not a valid URL: {e}"))?;
                    if parsed.scheme() != "http" && parsed.scheme() != "https" {
                        return Err(format!("store.{name} must start with http:// or https://"));
                    }
                }

                if let Some(credential) = &self.credential {
                    credential.validate()?;
                }
            }
            StoreBackend::Local => {
                if self
                    .local_path
                    .as_ref()
                    .map(|p| p.trim().is_empty())
                    .unwrap_or(true)
                {
                    return Err("store.local_path is required when backend = 'local'".to_string());
                }
            }
        }

        if self.timeout_seconds == 0 {
            return Err("store.timeout_seconds must be > 0".to_string());
        }

        if !(1..=1000).contains(&self.page_size) {
            return Err(format!(
                "store.page_size must be between 1 and 1000, got {}",
                self.page_size
            ));
        }

        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Firestore,
            project_id: String::new(),
            database_id: default_database_id(),
            base_url: default_base_url(),
            token_url: default_token_url(),
            timeout_seconds: default_timeout_seconds(),
            page_size: default_page_size(),
            local_path: None,
            credential: None,
        }
    }
}

/// Migration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Collection used for bare document ids and the default coordinate
    #[serde(default = "default_users_collection")]
    pub default_collection: String,

    /// Document migrated when the caller names no target
    #[serde(default = "default_designated_document_id")]
    pub default_document_id: String,

    /// Documents migrated concurrently by `migrate-all`
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl MigrationConfig {
    fn validate(&self) -> Result<(), String> {
        self.default_path().map_err(|e| e.to_string())?;

        if !(1..=64).contains(&self.max_concurrency) {
            return Err(format!(
                "migration.max_concurrency must be between 1 and 64, got {}",
                self.max_concurrency
            ));
        }

        Ok(())
    }

    /// Default collection as a typed name
    pub fn default_collection(&self) -> Result<CollectionName, BastionError> {
        CollectionName::new(self.default_collection.clone())
            .map_err(|e| BastionError::Configuration(format!("migration.default_collection: {e}")))
    }

    /// Default coordinate used when the caller supplies no target
    pub fn default_path(&self) -> Result<DocumentPath, BastionError> {
        let id = DocumentId::new(self.default_document_id.clone()).map_err(|e| {
            BastionError::Configuration(format!("migration.default_document_id: {e}"))
        })?;
        Ok(DocumentPath::new(self.default_collection()?, id))
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            default_collection: default_users_collection(),
            default_document_id: default_designated_document_id(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

/// Snapshot export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Collection exported with a single designated document only
    #[serde(default = "default_users_collection")]
    pub restricted_collection: String,

    /// The one document of the restricted collection that is exported
    #[serde(default = "default_designated_document_id")]
    pub restricted_document_id: String,

    /// Directory receiving backup artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Artifact file name prefix
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        self.restricted_path().map_err(|e| e.to_string())?;

        if self.output_dir.trim().is_empty() {
            return Err("export.output_dir cannot be empty".to_string());
        }

        if self.file_prefix.trim().is_empty()
            || self.file_prefix.contains('/')
            || self.file_prefix.contains('\\')
        {
            return Err(format!(
                "export.file_prefix must be a plain file name prefix, got '{}'",
                self.file_prefix
            ));
        }

        Ok(())
    }

    /// The designated document of the restricted collection
    pub fn restricted_path(&self) -> Result<DocumentPath, BastionError> {
        let collection = CollectionName::new(self.restricted_collection.clone()).map_err(|e| {
            BastionError::Configuration(format!("export.restricted_collection: {e}"))
        })?;
        let id = DocumentId::new(self.restricted_document_id.clone()).map_err(|e| {
            BastionError::Configuration(format!("export.restricted_document_id: {e}"))
        })?;
        Ok(DocumentPath::new(collection, id))
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            restricted_collection: default_users_collection(),
            restricted_document_id: default_designated_document_id(),
            output_dir: default_output_dir(),
            file_prefix: default_file_prefix(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled = true".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_database_id() -> String {
    "(default)".to_string()
}

fn default_base_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_page_size() -> usize {
    300
}

fn default_users_collection() -> String {
    "users".to_string()
}

fn default_designated_document_id() -> String {
    "TQAmmVfIpOeNiRflXKSeL1NX2ak2".to_string()
}

fn default_max_concurrency() -> usize {
    8
}

fn default_output_dir() -> String {
    "backups".to_string()
}

fn default_file_prefix() -> String {
    "firestore_backup".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
