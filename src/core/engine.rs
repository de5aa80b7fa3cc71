//! Engine facade
//!
//! [`Engine`] is the surface callers drive. It wires the migration engine,
//! the snapshot exporter and the schema provisioner to one store and one
//! artifact sink, and wraps every outcome in a [`Response`] envelope so no
//! error leaves the engine unstructured.

use super::migration::{BatchResult, MigrationEngine, MigrationOutcome, MigrationTarget};
use super::schema::{SchemaProvisioner, SeedReport};
use super::snapshot::{encoder, ExportReport, SnapshotExporter};
use crate::adapters::sink::ArtifactSink;
use crate::adapters::store::DocumentStore;
use crate::config::{BastionConfig, MigrationConfig};
use crate::domain::{BastionError, CollectionName, DocumentFailure, DocumentPath, Fields, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Uniform result envelope
///
/// Serializes as `{"status":"success","data":...}` or
/// `{"status":"error","kind":...,"message":...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { kind: String, message: String },
}

impl<T> Response<T> {
    pub fn success(data: T) -> Self {
        Response::Success { data }
    }

    pub fn error(err: &BastionError) -> Self {
        Response::Error {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Response::Success { data } => Some(data),
            Response::Error { .. } => None,
        }
    }

    /// Error kind, for an error response
    pub fn error_kind(&self) -> Option<&str> {
        match self {
            Response::Success { .. } => None,
            Response::Error { kind, .. } => Some(kind.as_str()),
        }
    }
}

impl<T: Serialize> Response<T> {
    /// Render the envelope as 2-space indented JSON
    ///
    /// # Errors
    ///
    /// Returns [`BastionError::Serialization`] if rendering fails.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of migrating one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationReport {
    pub path: String,

    /// `migrated`, `unchanged` or `not_found`
    pub status: String,

    /// Steps applied, as `name@vN`
    pub steps: Vec<String>,

    /// Document content after the migration
    pub content: Option<Value>,

    /// Why `content` is missing for a document that exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding_error: Option<String>,

    pub dry_run: bool,
}

/// Result of migrating a collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub collection: String,

    /// Documents started, including not found and failed ones
    pub attempted: usize,

    /// Documents handled successfully
    pub processed: usize,

    /// Documents a migration step changed; on a dry run none were written
    pub migrated: usize,

    pub written: usize,

    /// Documents no step changed
    pub unchanged: usize,
    pub not_found: Vec<String>,
    pub failures: Vec<DocumentFailure>,
    pub interrupted: bool,
    pub dry_run: bool,

    /// Final content per document; `null` where the content has no JSON form
    pub documents: BTreeMap<String, Value>,

    /// Documents whose content could not be rendered
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub encoding_errors: Vec<DocumentFailure>,
}

impl BatchReport {
    /// Whether every document succeeded and the batch ran to the end
    pub fn is_successful(&self) -> bool {
        self.failures.is_empty() && !self.interrupted
    }
}

/// Result of seeding one schema template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedView {
    pub template: String,
    pub path: String,
    pub content: Value,
    pub dry_run: bool,
}

/// One fetched document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentView {
    pub path: String,
    pub exists: bool,
    pub content: Option<Value>,
}

/// Document ids of a collection, or the collection names of the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    /// Collection listed; `None` when listing collection names
    pub collection: Option<String>,
    pub entries: Vec<String>,
}

/// Batch engine over one document store
pub struct Engine {
    store: Arc<dyn DocumentStore>,
    migrations: MigrationEngine,
    exporter: SnapshotExporter,
    provisioner: SchemaProvisioner,
    migration_config: MigrationConfig,
    dry_run: bool,
}

impl Engine {
    /// Create an engine from configuration
    ///
    /// `config.application.dry_run` puts every write path in dry-run mode.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        sink: Arc<dyn ArtifactSink>,
        config: &BastionConfig,
    ) -> Self {
        let dry_run = config.application.dry_run;
        Self {
            migrations: MigrationEngine::new(store.clone(), config.migration.clone())
                .with_dry_run(dry_run),
            exporter: SnapshotExporter::new(store.clone(), sink, config.export.clone())
                .with_dry_run(dry_run),
            provisioner: SchemaProvisioner::new(store.clone()).with_dry_run(dry_run),
            migration_config: config.migration.clone(),
            store,
            dry_run,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Migrate one document
    pub async fn migrate_document(&self, target: &MigrationTarget) -> Response<MigrationReport> {
        respond("migrate", self.try_migrate_document(target).await)
    }

    /// Migrate every document of `collection`
    ///
    /// Raising `shutdown` stops new documents from starting.
    pub async fn migrate_all(
        &self,
        collection: &CollectionName,
        shutdown: watch::Receiver<bool>,
    ) -> Response<BatchReport> {
        let result = self
            .migrations
            .migrate_all(collection, shutdown)
            .await
            .map(|batch| self.batch_report(batch));
        respond("migrate_all", result)
    }

    /// Export the whole store to one artifact
    pub async fn export_all(&self) -> Response<ExportReport> {
        respond("export", self.exporter.export_all().await)
    }

    /// Seed the schema template named `name`
    pub async fn seed_schema(&self, name: &str) -> Response<SeedView> {
        let result = self
            .provisioner
            .seed_schema(name)
            .await
            .and_then(|report| seed_view(&report));
        respond("seed", result)
    }

    /// Seed every schema template, stopping at the first failure
    pub async fn seed_all(&self) -> Response<Vec<SeedView>> {
        let result = self
            .provisioner
            .seed_all()
            .await
            .and_then(|reports| reports.iter().map(seed_view).collect());
        respond("seed_all", result)
    }

    /// Fetch one document, the configured default coordinate if `path` is `None`
    pub async fn show(&self, path: Option<&DocumentPath>) -> Response<DocumentView> {
        respond("show", self.try_show(path).await)
    }

    /// List the ids of `collection`, or the collection names if `None`
    pub async fn list(&self, collection: Option<&CollectionName>) -> Response<Listing> {
        let result = match collection {
            Some(name) => self.store.list_document_ids(name).await.map(|ids| Listing {
                collection: Some(name.to_string()),
                entries: ids.into_iter().map(|id| id.into_inner()).collect(),
            }),
            None => self.store.list_collection_names().await.map(|names| Listing {
                collection: None,
                entries: names.into_iter().map(|n| n.into_inner()).collect(),
            }),
        };
        respond("list", result)
    }

    async fn try_migrate_document(&self, target: &MigrationTarget) -> Result<MigrationReport> {
        let path = target.resolve(&self.migration_config)?;
        let outcome = self.migrations.migrate_path(&path).await?;
        let path = path.to_string();
        let (content, encoding_error) = match outcome.content() {
            Some(fields) => render(&path, fields),
            None => (None, None),
        };
        let steps = match &outcome {
            MigrationOutcome::Migrated { steps, .. } => steps.clone(),
            _ => Vec::new(),
        };

        Ok(MigrationReport {
            status: outcome.status().to_string(),
            path,
            steps,
            content,
            encoding_error,
            dry_run: self.dry_run,
        })
    }

    async fn try_show(&self, path: Option<&DocumentPath>) -> Result<DocumentView> {
        let path = match path {
            Some(path) => path.clone(),
            None => self.migration_config.default_path()?,
        };
        let fields = self.store.get(&path).await?;
        let path = path.to_string();
        let content = fields
            .map(|fields| encoder::encode_fields(&path, &fields))
            .transpose()?;

        Ok(DocumentView {
            exists: content.is_some(),
            path,
            content,
        })
    }

    fn batch_report(&self, batch: BatchResult) -> BatchReport {
        let mut documents = BTreeMap::new();
        let mut encoding_errors = Vec::new();
        for (id, fields) in &batch.documents {
            let path = format!("{}/{id}", batch.collection);
            let (content, error) = render(&path, fields);
            if let Some(message) = error {
                encoding_errors.push(DocumentFailure::new(id.clone(), message));
            }
            documents.insert(id.clone(), content.unwrap_or(Value::Null));
        }

        BatchReport {
            unchanged: batch.unchanged(),
            collection: batch.collection,
            attempted: batch.attempted,
            processed: batch.processed,
            migrated: batch.migrated,
            written: batch.written,
            not_found: batch.not_found,
            failures: batch.failures,
            interrupted: batch.interrupted,
            dry_run: self.dry_run,
            documents,
            encoding_errors,
        }
    }
}

/// Encode content for a report
///
/// The write has already happened when this runs, so a value with no JSON
/// form drops the content from the report instead of failing the operation.
fn render(path: &str, fields: &Fields) -> (Option<Value>, Option<String>) {
    match encoder::encode_fields(path, fields) {
        Ok(value) => (Some(value), None),
        Err(e) => {
            tracing::warn!(document = %path, error = %e, "Document content left out of report");
            (None, Some(e.to_string()))
        }
    }
}

fn seed_view(report: &SeedReport) -> Result<SeedView> {
    let path = report.path.to_string();
    Ok(SeedView {
        template: report.template.to_string(),
        content: encoder::encode_fields(&path, &report.content)?,
        path,
        dry_run: report.dry_run,
    })
}

fn respond<T>(operation: &str, result: Result<T>) -> Response<T> {
    match result {
        Ok(data) => Response::success(data),
        Err(e) => {
            tracing::error!(operation, kind = e.kind(), error = %e, "Operation failed");
            Response::error(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sink::MemorySink;
    use crate::adapters::store::MemoryStore;
    use crate::domain::{fields_from_json, DocumentId, FieldValue};
    use serde_json::json;

    fn engine_with(store: Arc<MemoryStore>, dry_run: bool) -> (Engine, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let mut config = BastionConfig::default();
        config.application.dry_run = dry_run;
        config.migration.default_collection = "characters".to_string();
        config.export.restricted_collection = "users".to_string();
        config.export.restricted_document_id = "u1".to_string();
        (Engine::new(store, sink.clone(), &config), sink)
    }

    #[test]
    fn test_envelope_shape() {
        let ok: Response<Value> = Response::success(json!({"n": 1}));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"status": "success", "data": {"n": 1}})
        );

        let err: Response<Value> =
            Response::error(&BastionError::UnknownTemplate("potion".to_string()));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["kind"], "unknown_template");
        assert!(value["message"].as_str().unwrap().contains("potion"));
    }

    #[tokio::test]
    async fn test_migrate_document_by_id() {
        let store = Arc::new(
            MemoryStore::new()
                .with_document(
                    "characters/c1",
                    fields_from_json(json!({
                        "name": "Aria",
                        "stats": {"level": 3, "basePointsSpent": 9}
                    })),
                )
                .unwrap(),
        );
        let (engine, _) = engine_with(store.clone(), false);

        let response = engine
            .migrate_document(&MigrationTarget::id(DocumentId::new("c1").unwrap()))
            .await;

        let report = response.data().unwrap();
        assert_eq!(report.status, "migrated");
        assert_eq!(report.path, "characters/c1");
        assert_eq!(report.steps, vec!["stats-layout@v2"]);
        let content = report.content.as_ref().unwrap();
        assert_eq!(content["name"], "Aria");
        assert_eq!(content["stats"]["level"], 3);
        assert_eq!(content["stats"]["basePointsSpent"], 0);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_migrated_content_without_json_form_is_left_out() {
        let mut fields = fields_from_json(json!({"stats": {"level": 2}}));
        fields.insert("avatar".to_string(), FieldValue::Bytes(vec![0xff]));
        let store = Arc::new(MemoryStore::new().with_document("characters/c2", fields).unwrap());
        let (engine, _) = engine_with(store.clone(), false);

        let response = engine
            .migrate_document(&MigrationTarget::path(DocumentPath::parse("characters/c2").unwrap()))
            .await;

        let report = response.data().unwrap();
        assert_eq!(report.status, "migrated");
        assert!(report.content.is_none());
        assert!(report.encoding_error.as_ref().unwrap().contains("characters/c2.avatar"));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_migrate_missing_document() {
        let store = Arc::new(MemoryStore::new());
        let (engine, _) = engine_with(store.clone(), false);

        let response = engine
            .migrate_document(&MigrationTarget::id(DocumentId::new("ghost").unwrap()))
            .await;

        let report = response.data().unwrap();
        assert_eq!(report.status, "not_found");
        assert!(report.content.is_none());
        assert!(report.encoding_error.is_none());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_migrate_all_reports_failures() {
        let store = Arc::new(
            MemoryStore::new()
                .with_document("characters/a", fields_from_json(json!({"stats": {}})))
                .unwrap()
                .with_document("characters/b", fields_from_json(json!({"name": "B"})))
                .unwrap()
                .with_document("characters/c", fields_from_json(json!({"stats": {}})))
                .unwrap(),
        );
        store.fail_writes_for(&DocumentPath::parse("characters/c").unwrap());
        let (engine, _) = engine_with(store.clone(), false);
        let (_tx, rx) = watch::channel(false);

        let response = engine
            .migrate_all(&CollectionName::new("characters").unwrap(), rx)
            .await;

        let report = response.data().unwrap();
        assert_eq!(report.attempted, 3);
        assert_eq!(report.processed, 2);
        assert_eq!(report.migrated, 1);
        assert_eq!(report.written, 1);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].document_id, "c");
        assert!(!report.is_successful());
        assert_eq!(report.documents["b"], json!({"name": "B"}));
    }

    #[tokio::test]
    async fn test_migrate_all_enumeration_failure_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        let characters = CollectionName::new("characters").unwrap();
        store.fail_listing_of(&characters);
        let (engine, _) = engine_with(store, false);
        let (_tx, rx) = watch::channel(false);

        let response = engine.migrate_all(&characters, rx).await;

        assert_eq!(response.error_kind(), Some("enumeration"));
    }

    #[tokio::test]
    async fn test_export_writes_artifact() {
        let store = Arc::new(
            MemoryStore::new()
                .with_document("users/u1", fields_from_json(json!({"n": 1})))
                .unwrap()
                .with_document("users/u2", fields_from_json(json!({"n": 2})))
                .unwrap(),
        );
        let (engine, sink) = engine_with(store, false);

        let response = engine.export_all().await;

        let report = response.data().unwrap();
        assert_eq!(report.documents, 1);
        let text = sink.get(&report.artifact).unwrap();
        assert_eq!(encoder::checksum(&text), report.checksum);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["data"]["snapshot"], json!({"users": {"u1": {"n": 1}}}));
    }

    #[tokio::test]
    async fn test_dry_run_seed_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let (engine, _) = engine_with(store.clone(), true);

        let response = engine.seed_schema("Armatura").await;

        let view = response.data().unwrap();
        assert!(view.dry_run);
        assert_eq!(view.path, "utils/schema_armatura");
        assert!(view.content["General"].is_object());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_seed_unknown_template() {
        let store = Arc::new(MemoryStore::new());
        let (engine, _) = engine_with(store, false);

        let response = engine.seed_schema("potion").await;

        assert!(!response.is_success());
        assert_eq!(response.error_kind(), Some("unknown_template"));
    }

    #[tokio::test]
    async fn test_seed_all_returns_four_views() {
        let store = Arc::new(MemoryStore::new());
        let (engine, _) = engine_with(store.clone(), false);

        let response = engine.seed_all().await;

        assert_eq!(response.data().unwrap().len(), 4);
        assert_eq!(store.write_count(), 4);
    }

    #[tokio::test]
    async fn test_show_and_list() {
        let store = Arc::new(
            MemoryStore::new()
                .with_document("characters/c1", fields_from_json(json!({"name": "Aria"})))
                .unwrap()
                .with_document("items/i1", fields_from_json(json!({})))
                .unwrap(),
        );
        let (engine, _) = engine_with(store, false);

        let shown = engine
            .show(Some(&DocumentPath::parse("characters/c1").unwrap()))
            .await;
        assert_eq!(shown.data().unwrap().content, Some(json!({"name": "Aria"})));

        let missing = engine
            .show(Some(&DocumentPath::parse("characters/zz").unwrap()))
            .await;
        assert!(!missing.data().unwrap().exists);

        let names = engine.list(None).await;
        assert_eq!(names.data().unwrap().entries, vec!["characters", "items"]);

        let ids = engine
            .list(Some(&CollectionName::new("characters").unwrap()))
            .await;
        assert_eq!(ids.data().unwrap().entries, vec!["c1"]);
    }
}
