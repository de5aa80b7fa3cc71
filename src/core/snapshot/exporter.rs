//! Full-store snapshot export

use super::encoder::{checksum, encode_fields, to_pretty_text};
use crate::adapters::sink::ArtifactSink;
use crate::adapters::store::DocumentStore;
use crate::config::ExportConfig;
use crate::domain::{BastionError, CollectionName, DocumentPath, Fields, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// In-memory image of the store: collection name to document id to content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    collections: BTreeMap<String, BTreeMap<String, Fields>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection, even if it ends up holding no document
    pub fn add_collection(&mut self, collection: &CollectionName) {
        self.collections.entry(collection.to_string()).or_default();
    }

    /// Add a document
    pub fn insert(&mut self, path: &DocumentPath, content: Fields) {
        self.collections
            .entry(path.collection().to_string())
            .or_default()
            .insert(path.id().to_string(), content);
    }

    /// Documents of one collection
    pub fn collection(&self, name: &str) -> Option<&BTreeMap<String, Fields>> {
        self.collections.get(name)
    }

    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    pub fn document_count(&self) -> usize {
        self.collections.values().map(BTreeMap::len).sum()
    }

    /// Encode the snapshot as a JSON value
    ///
    /// # Errors
    ///
    /// Returns [`BastionError::Encoding`] naming the first field with no JSON
    /// encoding.
    pub fn to_json(&self) -> Result<Value> {
        let mut root = Map::new();
        for (collection, documents) in &self.collections {
            let mut encoded = Map::new();
            for (id, content) in documents {
                encoded.insert(
                    id.clone(),
                    encode_fields(&format!("{collection}/{id}"), content)?,
                );
            }
            root.insert(collection.clone(), Value::Object(encoded));
        }
        Ok(Value::Object(root))
    }
}

impl Serialize for Snapshot {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_json()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

/// Artifact name for an export started at `now`
///
/// Names sort chronologically within one prefix.
pub fn backup_file_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}_{}.json", now.format("%Y%m%d_%H%M%S"))
}

/// Result of a snapshot export
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    /// Artifact name
    pub artifact: String,

    /// Where the artifact was written; `None` on a dry run
    pub location: Option<String>,

    /// Number of collections exported
    pub collections: usize,

    /// Number of documents exported
    pub documents: usize,

    /// SHA-256 of the artifact text
    pub checksum: String,

    /// Size of the artifact text in bytes
    pub bytes: usize,

    /// Whether the write was skipped
    pub dry_run: bool,

    /// The exported data, encoded as in the artifact
    pub snapshot: Snapshot,
}

/// Exports the entire store to one artifact
pub struct SnapshotExporter {
    store: Arc<dyn DocumentStore>,
    sink: Arc<dyn ArtifactSink>,
    config: ExportConfig,
    dry_run: bool,
}

impl SnapshotExporter {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        sink: Arc<dyn ArtifactSink>,
        config: ExportConfig,
    ) -> Self {
        Self {
            store,
            sink,
            config,
            dry_run: false,
        }
    }

    /// Build and encode the snapshot without writing the artifact
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Export the store, naming the artifact after the current UTC time
    ///
    /// # Errors
    ///
    /// Any listing, read, encoding or sink failure aborts the export; no
    /// artifact is written in that case.
    pub async fn export_all(&self) -> Result<ExportReport> {
        self.export_at(Utc::now()).await
    }

    /// Export the store, naming the artifact after `now`
    ///
    /// # Errors
    ///
    /// See [`export_all`](Self::export_all).
    pub async fn export_at(&self, now: DateTime<Utc>) -> Result<ExportReport> {
        let start_time = Instant::now();
        tracing::info!(
            store = %self.store.describe(),
            dry_run = self.dry_run,
            "Starting snapshot export"
        );

        let snapshot = self.collect().await?;
        let text = to_pretty_text(&snapshot.to_json()?)?;
        let artifact = backup_file_name(&self.config.file_prefix, now);
        let digest = checksum(&text);

        let location = if self.dry_run {
            tracing::info!(artifact = %artifact, "Dry run: snapshot encoded, not written");
            None
        } else {
            Some(self.sink.write_artifact(&artifact, &text).await?)
        };

        let report = ExportReport {
            collections: snapshot.collection_count(),
            documents: snapshot.document_count(),
            snapshot,
            artifact,
            location,
            checksum: digest,
            bytes: text.len(),
            dry_run: self.dry_run,
        };

        tracing::info!(
            artifact = %report.artifact,
            collections = report.collections,
            documents = report.documents,
            bytes = report.bytes,
            checksum = %report.checksum,
            duration_ms = start_time.elapsed().as_millis() as u64,
            "Snapshot export completed"
        );

        Ok(report)
    }

    /// Traverse the store into a snapshot
    ///
    /// The restricted collection contributes only its designated document.
    async fn collect(&self) -> Result<Snapshot> {
        let restricted = self.config.restricted_path()?;

        let collections = self.store.list_collection_names().await.map_err(|e| {
            BastionError::Enumeration(format!("Failed to list collections: {e}"))
        })?;

        let mut snapshot = Snapshot::new();
        for collection in &collections {
            snapshot.add_collection(collection);

            if collection == restricted.collection() {
                tracing::debug!(
                    collection = %collection,
                    document_id = %restricted.id(),
                    "Restricted collection, exporting designated document only"
                );
                if let Some(content) = self.store.get(&restricted).await? {
                    snapshot.insert(&restricted, content);
                }
                continue;
            }

            let ids = self.store.list_document_ids(collection).await.map_err(|e| {
                BastionError::Enumeration(format!(
                    "Failed to list collection '{collection}': {e}"
                ))
            })?;

            for id in ids {
                let path = DocumentPath::new(collection.clone(), id);
                match self.store.get(&path).await? {
                    Some(content) => snapshot.insert(&path, content),
                    None => tracing::debug!(document = %path, "Document vanished during export"),
                }
            }

            tracing::debug!(
                collection = %collection,
                documents = snapshot.collection(collection.as_str()).map_or(0, BTreeMap::len),
                "Collection exported"
            );
        }

        Ok(snapshot)
    }
}
