//! Migration engine
//!
//! Migrates one document (read, transform, overwrite) or every document of a
//! collection with bounded concurrency.

use super::batch::BatchResult;
use super::registry::MigrationRegistry;
use crate::adapters::store::DocumentStore;
use crate::config::MigrationConfig;
use crate::domain::{
    BastionError, CollectionName, DocumentFailure, DocumentId, DocumentPath, Fields, Result,
};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;

/// Which document to migrate
///
/// Resolution precedence: `id` (looked up in the configured default
/// collection), then `path`, then the configured default coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationTarget {
    /// Document id in the default collection
    pub id: Option<DocumentId>,

    /// Full document path
    pub path: Option<DocumentPath>,
}

impl MigrationTarget {
    /// Target a document of the default collection by id
    pub fn id(id: DocumentId) -> Self {
        Self {
            id: Some(id),
            path: None,
        }
    }

    /// Target a document by full path
    pub fn path(path: DocumentPath) -> Self {
        Self {
            id: None,
            path: Some(path),
        }
    }

    /// Resolve against the configured defaults
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configured defaults are invalid.
    pub fn resolve(&self, config: &MigrationConfig) -> Result<DocumentPath> {
        match (&self.id, &self.path) {
            (Some(id), _) => Ok(DocumentPath::new(config.default_collection()?, id.clone())),
            (None, Some(path)) => Ok(path.clone()),
            (None, None) => config.default_path(),
        }
    }
}

/// Outcome of migrating a single document
#[derive(Debug, Clone, PartialEq)]
pub enum MigrationOutcome {
    /// The document does not exist; nothing was written
    NotFound,

    /// No step applied; nothing was written
    Unchanged(Fields),

    /// At least one step applied and the document was overwritten
    /// (unless running dry)
    Migrated {
        /// New document content
        content: Fields,
        /// Steps applied, as `name@vN`
        steps: Vec<String>,
    },
}

impl MigrationOutcome {
    /// Short status label
    pub fn status(&self) -> &'static str {
        match self {
            MigrationOutcome::NotFound => "not_found",
            MigrationOutcome::Unchanged(_) => "unchanged",
            MigrationOutcome::Migrated { .. } => "migrated",
        }
    }

    /// Document content after the migration, if the document exists
    pub fn content(&self) -> Option<&Fields> {
        match self {
            MigrationOutcome::NotFound => None,
            MigrationOutcome::Unchanged(content) => Some(content),
            MigrationOutcome::Migrated { content, .. } => Some(content),
        }
    }
}

/// Applies the migration registry to stored documents
pub struct MigrationEngine {
    store: Arc<dyn DocumentStore>,
    registry: Arc<MigrationRegistry>,
    config: MigrationConfig,
    dry_run: bool,
}

impl MigrationEngine {
    /// Create an engine with the stock registry
    pub fn new(store: Arc<dyn DocumentStore>, config: MigrationConfig) -> Self {
        Self {
            store,
            registry: Arc::new(MigrationRegistry::default()),
            config,
            dry_run: false,
        }
    }

    /// Compute migrations without writing them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Migrate the document named by `target`
    ///
    /// # Errors
    ///
    /// Returns an error if the configured defaults are invalid or the store
    /// read or write fails. A missing document is not an error.
    pub async fn migrate_document(&self, target: &MigrationTarget) -> Result<MigrationOutcome> {
        let path = target.resolve(&self.config)?;
        self.migrate_path(&path).await
    }

    /// Migrate the document at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the store read or write fails.
    pub async fn migrate_path(&self, path: &DocumentPath) -> Result<MigrationOutcome> {
        let Some(mut content) = self.store.get(path).await? else {
            tracing::info!(document = %path, "Document not found, nothing to migrate");
            return Ok(MigrationOutcome::NotFound);
        };

        let steps = self.registry.run(&mut content);
        if steps.is_empty() {
            tracing::debug!(document = %path, "No migration step applies");
            return Ok(MigrationOutcome::Unchanged(content));
        }

        if self.dry_run {
            tracing::info!(
                document = %path,
                steps = ?steps,
                "Dry run: migration computed, not written"
            );
        } else {
            self.store.set(path, &content).await?;
            tracing::info!(document = %path, steps = ?steps, "Document migrated");
        }

        Ok(MigrationOutcome::Migrated { content, steps })
    }

    /// Migrate every document of `collection`
    ///
    /// Documents run on a pool of `max_concurrency` tasks. Once `shutdown`
    /// carries `true` no further document is started; documents already in
    /// flight finish and the result is flagged as interrupted.
    ///
    /// # Errors
    ///
    /// Returns [`BastionError::Enumeration`] if the collection cannot be
    /// listed. Per-document failures are recorded in the result instead.
    pub async fn migrate_all(
        &self,
        collection: &CollectionName,
        shutdown: watch::Receiver<bool>,
    ) -> Result<BatchResult> {
        let ids = self
            .store
            .list_document_ids(collection)
            .await
            .map_err(|e| {
                BastionError::Enumeration(format!("Failed to list collection '{collection}': {e}"))
            })?;

        let total = ids.len();
        tracing::info!(
            collection = %collection,
            documents = total,
            max_concurrency = self.config.max_concurrency,
            dry_run = self.dry_run,
            "Starting batch migration"
        );

        let outcomes: Vec<(DocumentId, Result<MigrationOutcome>)> = stream::iter(ids)
            .take_while(|_| futures::future::ready(!*shutdown.borrow()))
            .map(|id| {
                let path = DocumentPath::new(collection.clone(), id.clone());
                async move { (id, self.migrate_path(&path).await) }
            })
            .buffer_unordered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let mut result = BatchResult::new(collection.as_str());
        for (id, outcome) in outcomes {
            match outcome {
                Ok(MigrationOutcome::NotFound) => result.add_not_found(id.into_inner()),
                Ok(MigrationOutcome::Unchanged(content)) => {
                    result.add_success(id.into_inner(), content, false, false)
                }
                Ok(MigrationOutcome::Migrated { content, .. }) => {
                    result.add_success(id.into_inner(), content, true, !self.dry_run)
                }
                Err(e) => {
                    tracing::warn!(
                        collection = %collection,
                        document_id = %id,
                        error = %e,
                        "Failed to migrate document"
                    );
                    result.add_failure(DocumentFailure::new(id.into_inner(), e.to_string()));
                }
            }
        }

        if result.attempted < total {
            result.interrupted = true;
            tracing::warn!(
                collection = %collection,
                started = result.attempted,
                total = total,
                "Batch migration interrupted by shutdown signal"
            );
        }

        result.finalize();
        result.log_summary();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MemoryStore;
    use crate::domain::{fields_from_json, FieldValue};
    use serde_json::json;

    fn engine(store: Arc<MemoryStore>) -> MigrationEngine {
        MigrationEngine::new(store, MigrationConfig::default())
    }

    fn legacy_character(level: i64) -> Fields {
        fields_from_json(json!({
            "name": "Aria",
            "stats": {"level": level, "hpTotal": 30, "skillPoints": 9}
        }))
    }

    #[test]
    fn test_target_resolution_precedence() {
        let config = MigrationConfig::default();
        let id = DocumentId::new("c1").unwrap();
        let path = DocumentPath::parse("characters/c2").unwrap();

        let both = MigrationTarget {
            id: Some(id.clone()),
            path: Some(path.clone()),
        };
        assert_eq!(both.resolve(&config).unwrap().to_string(), "users/c1");
        assert_eq!(
            MigrationTarget::path(path).resolve(&config).unwrap().to_string(),
            "characters/c2"
        );
        assert_eq!(
            MigrationTarget::default().resolve(&config).unwrap().to_string(),
            "users/TQAmmVfIpOeNiRflXKSeL1NX2ak2"
        );
    }

    #[tokio::test]
    async fn test_document_without_stats_is_untouched() {
        let store = Arc::new(
            MemoryStore::new()
                .with_document("users/u1", fields_from_json(json!({"name": "Aria"})))
                .unwrap(),
        );

        let outcome = engine(store.clone())
            .migrate_document(&MigrationTarget::id(DocumentId::new("u1").unwrap()))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            MigrationOutcome::Unchanged(fields_from_json(json!({"name": "Aria"})))
        );
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let store = Arc::new(MemoryStore::new());

        let outcome = engine(store.clone())
            .migrate_document(&MigrationTarget::default())
            .await
            .unwrap();

        assert_eq!(outcome, MigrationOutcome::NotFound);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_migrated_document_is_written_once() {
        let store = Arc::new(
            MemoryStore::new()
                .with_document("characters/c1", legacy_character(3))
                .unwrap(),
        );
        let path = DocumentPath::parse("characters/c1").unwrap();

        let outcome = engine(store.clone()).migrate_path(&path).await.unwrap();

        assert_eq!(outcome.status(), "migrated");
        assert_eq!(store.write_count(), 1);
        let stored = store.peek(&path).unwrap();
        assert_eq!(Some(&stored), outcome.content());
        let stats = stored["stats"].as_map().unwrap();
        assert_eq!(stats["level"], FieldValue::Integer(3));
        assert!(!stats.contains_key("skillPoints"));
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let store = Arc::new(
            MemoryStore::new()
                .with_document("characters/c1", legacy_character(3))
                .unwrap(),
        );
        let path = DocumentPath::parse("characters/c1").unwrap();

        let outcome = engine(store.clone())
            .with_dry_run(true)
            .migrate_path(&path)
            .await
            .unwrap();

        assert_eq!(outcome.status(), "migrated");
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.peek(&path), Some(legacy_character(3)));
    }

    #[tokio::test]
    async fn test_migrate_all_isolates_failures() {
        let store = Arc::new(
            MemoryStore::new()
                .with_document("characters/a", legacy_character(1))
                .unwrap()
                .with_document("characters/b", legacy_character(2))
                .unwrap()
                .with_document("characters/c", fields_from_json(json!({"name": "NPC"})))
                .unwrap(),
        );
        store.fail_writes_for(&DocumentPath::parse("characters/b").unwrap());
        let (_tx, rx) = watch::channel(false);

        let result = engine(store.clone())
            .migrate_all(&CollectionName::new("characters").unwrap(), rx)
            .await
            .unwrap();

        assert_eq!(result.attempted, 3);
        assert_eq!(result.processed, 2);
        assert_eq!(result.written, 1);
        assert_eq!(result.documents.len(), 2);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].document_id, "b");
        assert!(!result.interrupted);
    }

    #[tokio::test]
    async fn test_dry_run_batch_counts_only_plain_documents_as_unchanged() {
        let store = Arc::new(
            MemoryStore::new()
                .with_document("characters/a", legacy_character(1))
                .unwrap()
                .with_document("characters/b", legacy_character(2))
                .unwrap()
                .with_document("characters/c", fields_from_json(json!({"name": "NPC"})))
                .unwrap(),
        );
        let (_tx, rx) = watch::channel(false);

        let result = engine(store.clone())
            .with_dry_run(true)
            .migrate_all(&CollectionName::new("characters").unwrap(), rx)
            .await
            .unwrap();

        assert_eq!(result.processed, 3);
        assert_eq!(result.migrated, 2);
        assert_eq!(result.written, 0);
        assert_eq!(result.unchanged(), 1);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_migrate_all_enumeration_failure_is_fatal() {
        let store = Arc::new(MemoryStore::new());
        let characters = CollectionName::new("characters").unwrap();
        store.fail_listing_of(&characters);
        let (_tx, rx) = watch::channel(false);

        let err = engine(store).migrate_all(&characters, rx).await.unwrap_err();

        assert!(matches!(err, BastionError::Enumeration(_)));
    }

    #[tokio::test]
    async fn test_migrate_all_stops_when_cancelled() {
        let store = Arc::new(
            MemoryStore::new()
                .with_document("characters/a", legacy_character(1))
                .unwrap()
                .with_document("characters/b", legacy_character(2))
                .unwrap(),
        );
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let result = engine(store.clone())
            .migrate_all(&CollectionName::new("characters").unwrap(), rx)
            .await
            .unwrap();

        assert_eq!(result.attempted, 0);
        assert_eq!(result.processed, 0);
        assert!(result.interrupted);
        assert_eq!(store.write_count(), 0);
    }
}
