//! Integration tests for document and batch migration

use async_trait::async_trait;
use bastion::adapters::store::{DocumentStore, MemoryStore};
use bastion::config::MigrationConfig;
use bastion::core::migration::{MigrationEngine, MigrationOutcome, MigrationTarget};
use bastion::domain::{
    fields_from_json, BastionError, CollectionName, DocumentId, DocumentPath, Fields, Result,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::watch;

fn config(max_concurrency: usize) -> MigrationConfig {
    MigrationConfig {
        default_collection: "characters".to_string(),
        default_document_id: "c1".to_string(),
        max_concurrency,
    }
}

fn characters() -> CollectionName {
    CollectionName::new("characters").unwrap()
}

#[tokio::test]
async fn test_document_without_stats_is_left_alone() {
    let original = fields_from_json(json!({"name": "Aria", "inventory": {"gold": 12}}));
    let store = Arc::new(
        MemoryStore::new()
            .with_document("characters/c1", original.clone())
            .unwrap(),
    );
    let engine = MigrationEngine::new(store.clone(), config(4));

    let outcome = engine
        .migrate_document(&MigrationTarget::default())
        .await
        .unwrap();

    assert_eq!(outcome, MigrationOutcome::Unchanged(original));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_legacy_stats_become_point_layout() {
    let store = Arc::new(
        MemoryStore::new()
            .with_document(
                "characters/c1",
                fields_from_json(json!({
                    "name": "Aria",
                    "stats": {
                        "level": 3,
                        "hpTotal": 30,
                        "hpCurrent": 20,
                        "manaTotal": 10,
                        "manaCurrent": 5,
                        "basePointsAvailable": 99,
                        "basePointsSpent": 7,
                        "combatTokensAvailable": 1,
                        "combatTokensSpent": 3,
                        "strength": 14
                    }
                })),
            )
            .unwrap(),
    );
    let engine = MigrationEngine::new(store.clone(), config(4));

    engine
        .migrate_document(&MigrationTarget::id(DocumentId::new("c1").unwrap()))
        .await
        .unwrap();

    let stored = store
        .peek(&DocumentPath::parse("characters/c1").unwrap())
        .unwrap();
    let expected = fields_from_json(json!({
        "name": "Aria",
        "stats": {
            "level": 3,
            "hpTotal": 30,
            "hpCurrent": 20,
            "manaTotal": 10,
            "manaCurrent": 5,
            "basePointsAvailable": 4,
            "basePointsSpent": 0,
            "combatTokensAvailable": 50,
            "combatTokensSpent": 0
        }
    }));
    assert_eq!(stored, expected);
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn test_missing_carried_fields_take_defaults() {
    let store = Arc::new(
        MemoryStore::new()
            .with_document(
                "characters/c1",
                fields_from_json(json!({"stats": {"hpTotal": 12, "level": null}})),
            )
            .unwrap(),
    );
    let engine = MigrationEngine::new(store.clone(), config(4));

    let outcome = engine
        .migrate_document(&MigrationTarget::default())
        .await
        .unwrap();

    let stats = outcome.content().unwrap()["stats"].as_map().unwrap().clone();
    assert_eq!(stats["level"].as_i64(), Some(1));
    assert_eq!(stats["hpTotal"].as_i64(), Some(12));
    assert_eq!(stats["manaCurrent"].as_i64(), Some(0));
    assert_eq!(stats.len(), 9);
}

#[tokio::test]
async fn test_missing_document_is_not_an_error() {
    let store = Arc::new(MemoryStore::new());
    let engine = MigrationEngine::new(store.clone(), config(4));

    let outcome = engine
        .migrate_path(&DocumentPath::parse("characters/ghost").unwrap())
        .await
        .unwrap();

    assert_eq!(outcome, MigrationOutcome::NotFound);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_empty_collection() {
    let store = Arc::new(MemoryStore::new());
    let engine = MigrationEngine::new(store, config(4));
    let (_tx, rx) = watch::channel(false);

    let result = engine.migrate_all(&characters(), rx).await.unwrap();

    assert_eq!(result.attempted, 0);
    assert_eq!(result.processed, 0);
    assert!(result.documents.is_empty());
    assert!(result.is_successful());
}

#[tokio::test]
async fn test_failing_document_does_not_abort_batch() {
    let mut store = MemoryStore::new();
    for id in ["a", "b", "c", "d"] {
        store = store
            .with_document(
                &format!("characters/{id}"),
                fields_from_json(json!({"stats": {"level": 2}})),
            )
            .unwrap();
    }
    let store = Arc::new(store);
    store.fail_reads_for(&DocumentPath::parse("characters/b").unwrap());
    store.fail_writes_for(&DocumentPath::parse("characters/d").unwrap());
    let engine = MigrationEngine::new(store.clone(), config(2));
    let (_tx, rx) = watch::channel(false);

    let result = engine.migrate_all(&characters(), rx).await.unwrap();

    assert_eq!(result.attempted, 4);
    assert_eq!(result.processed, 2);
    assert_eq!(result.written, 2);
    let failed: Vec<_> = result
        .failures
        .iter()
        .map(|f| f.document_id.as_str())
        .collect();
    assert_eq!(failed, vec!["b", "d"]);
    assert!(result.documents.contains_key("a"));
    assert!(result.documents.contains_key("c"));
    assert!(!result.interrupted);
}

#[tokio::test]
async fn test_enumeration_failure_is_fatal() {
    let store = Arc::new(MemoryStore::new());
    store.fail_listing_of(&characters());
    let engine = MigrationEngine::new(store, config(4));
    let (_tx, rx) = watch::channel(false);

    let err = engine.migrate_all(&characters(), rx).await.unwrap_err();

    assert!(matches!(err, BastionError::Enumeration(_)));
}

/// Raises the shutdown signal on the first read
struct SignallingStore {
    inner: MemoryStore,
    shutdown: watch::Sender<bool>,
}

#[async_trait]
impl DocumentStore for SignallingStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Fields>> {
        let _ = self.shutdown.send(true);
        self.inner.get(path).await
    }

    async fn set(&self, path: &DocumentPath, fields: &Fields) -> Result<()> {
        self.inner.set(path, fields).await
    }

    async fn list_document_ids(&self, collection: &CollectionName) -> Result<Vec<DocumentId>> {
        self.inner.list_document_ids(collection).await
    }

    async fn list_collection_names(&self) -> Result<Vec<CollectionName>> {
        self.inner.list_collection_names().await
    }

    fn describe(&self) -> String {
        "signalling".to_string()
    }
}

#[tokio::test]
async fn test_shutdown_stops_new_documents() {
    let mut inner = MemoryStore::new();
    for id in ["a", "b", "c"] {
        inner = inner
            .with_document(
                &format!("characters/{id}"),
                fields_from_json(json!({"stats": {}})),
            )
            .unwrap();
    }
    let (tx, rx) = watch::channel(false);
    let store = Arc::new(SignallingStore {
        inner,
        shutdown: tx,
    });
    let engine = MigrationEngine::new(store.clone(), config(1));

    let result = engine.migrate_all(&characters(), rx).await.unwrap();

    // the document in flight finishes, nothing after it starts
    assert_eq!(result.attempted, 1);
    assert_eq!(result.processed, 1);
    assert_eq!(result.written, 1);
    assert!(result.interrupted);
    assert!(!result.is_successful());
    assert_eq!(store.inner.write_count(), 1);
}

#[tokio::test]
async fn test_raised_signal_starts_nothing() {
    let store = Arc::new(
        MemoryStore::new()
            .with_document("characters/a", fields_from_json(json!({"stats": {}})))
            .unwrap(),
    );
    let engine = MigrationEngine::new(store.clone(), config(4));
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let result = engine.migrate_all(&characters(), rx).await.unwrap();

    assert_eq!(result.processed, 0);
    assert!(result.interrupted);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_dry_run_batch_writes_nothing() {
    let store = Arc::new(
        MemoryStore::new()
            .with_document("characters/a", fields_from_json(json!({"stats": {"level": 5}})))
            .unwrap(),
    );
    let engine = MigrationEngine::new(store.clone(), config(4)).with_dry_run(true);
    let (_tx, rx) = watch::channel(false);

    let result = engine.migrate_all(&characters(), rx).await.unwrap();

    assert_eq!(result.processed, 1);
    assert_eq!(result.migrated, 1);
    assert_eq!(result.written, 0);
    assert_eq!(result.unchanged(), 0);
    let stats = result.documents["a"]["stats"].as_map().unwrap().clone();
    assert_eq!(stats["combatTokensAvailable"].as_i64(), Some(50));
    assert_eq!(store.write_count(), 0);
}
