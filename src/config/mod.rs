//! Configuration management for Bastion.
//!
//! Bastion uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `BASTION_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bastion::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bastion.toml")?;
//!
//! println!("Project: {}", config.store.project_id);
//! println!("Backups go to: {}", config.export.output_dir);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level, dry run
//! - [`StoreConfig`] - backend, Firestore project, credential source
//! - [`MigrationConfig`] - default coordinate, batch concurrency
//! - [`ExportConfig`] - restricted collection, artifact directory and prefix
//! - [`LoggingConfig`] - local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [store]
//! backend = "firestore"
//! project_id = "fatins"
//!
//! [store.credential]
//! type = "embedded"
//! json = "${FIRESTORE_SERVICE_ACCOUNT}"
//!
//! [migration]
//! default_collection = "users"
//! max_concurrency = 8
//!
//! [export]
//! restricted_collection = "users"
//! restricted_document_id = "TQAmmVfIpOeNiRflXKSeL1NX2ak2"
//! output_dir = "backups"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, BastionConfig, CredentialConfig, ExportConfig, LoggingConfig,
    MigrationConfig, StoreBackend, StoreConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
