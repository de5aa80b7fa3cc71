//! Document store factory
//!
//! This module selects and builds the store backend named in configuration.

use crate::adapters::firestore::FirestoreStore;
use crate::adapters::store::{DocumentStore, LocalStore};
use crate::config::schema::{StoreBackend, StoreConfig};
use crate::domain::{BastionError, Result};
use std::sync::Arc;

/// Create a document store based on the configuration
///
/// # Returns
///
/// Returns an Arc-wrapped trait object shared by every engine component
///
/// # Errors
///
/// Returns an error if the backend cannot be created (invalid base URL,
/// unreadable credential, malformed local store file)
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Firestore => {
            tracing::info!(
                project_id = %config.project_id,
                database_id = %config.database_id,
                "Creating Firestore store"
            );
            let store = FirestoreStore::new(config)?;
            Ok(Arc::new(store) as Arc<dyn DocumentStore>)
        }
        StoreBackend::Local => {
            let path = config.local_path.as_deref().ok_or_else(|| {
                BastionError::Configuration(
                    "store.local_path is required when backend = 'local'".to_string(),
                )
            })?;

            tracing::info!(path = %path, "Opening local store");
            let store = LocalStore::open(path).await?;
            Ok(Arc::new(store) as Arc<dyn DocumentStore>)
        }
    }
}
