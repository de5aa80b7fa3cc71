//! JSON file document store
//!
//! Keeps the whole store in one JSON file for offline work. The file maps
//! collection name to document id to the document's `fields` object in the
//! Firestore typed-value encoding, so a store can be seeded from REST
//! responses verbatim:
//!
//! ```json
//! {
//!   "users": {
//!     "u1": { "name": { "stringValue": "Aria" } }
//!   }
//! }
//! ```
//!
//! The file is read once on open and rewritten after every `set`.

use super::memory::Collections;
use super::traits::DocumentStore;
use crate::adapters::firestore::codec::{decode_fields, encode_fields};
use crate::domain::{
    BastionError, CollectionName, DocumentId, DocumentPath, Fields, Result, StoreError,
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Document store persisted to a local JSON file
pub struct LocalStore {
    path: PathBuf,
    collections: RwLock<Collections>,
}

impl LocalStore {
    /// Open the store at `path`
    ///
    /// A missing file opens an empty store; the file is created on the first
    /// write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let collections = if tokio::fs::try_exists(&path).await? {
            let text = tokio::fs::read_to_string(&path).await?;
            parse_store(&text).map_err(|e| {
                BastionError::Store(StoreError::InvalidResponse(format!(
                    "Local store {} is malformed: {e}",
                    path.display()
                )))
            })?
        } else {
            tracing::info!(path = %path.display(), "Local store file not found, starting empty");
            Collections::new()
        };

        Ok(Self {
            path,
            collections: RwLock::new(collections),
        })
    }

    async fn flush(&self, collections: &Collections) -> Result<()> {
        let text = serde_json::to_string_pretty(&render_store(collections))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, text).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

fn parse_store(text: &str) -> Result<Collections> {
    let root: Map<String, Value> = serde_json::from_str(text)?;
    let mut collections = Collections::new();

    for (collection, documents) in root {
        let name = CollectionName::new(collection).map_err(BastionError::InvalidPath)?;
        let documents = documents.as_object().ok_or_else(|| {
            BastionError::Serialization(format!("collection '{name}' is not an object"))
        })?;

        let entry = collections.entry(name).or_default();
        for (id, fields) in documents {
            let id = DocumentId::new(id.as_str()).map_err(BastionError::InvalidPath)?;
            entry.insert(id, decode_fields(Some(fields))?);
        }
    }

    Ok(collections)
}

fn render_store(collections: &Collections) -> Value {
    Value::Object(
        collections
            .iter()
            .map(|(name, documents)| {
                let documents = documents
                    .iter()
                    .map(|(id, fields)| (id.to_string(), encode_fields(fields)))
                    .collect();
                (name.to_string(), Value::Object(documents))
            })
            .collect(),
    )
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Fields>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(path.collection())
            .and_then(|docs| docs.get(path.id()))
            .cloned())
    }

    async fn set(&self, path: &DocumentPath, fields: &Fields) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(path.collection().clone())
            .or_default()
            .insert(path.id().clone(), fields.clone());

        self.flush(&collections).await.map_err(|e| {
            BastionError::Store(StoreError::WriteFailed {
                path: path.to_string(),
                message: e.to_string(),
            })
        })
    }

    async fn list_document_ids(&self, collection: &CollectionName) -> Result<Vec<DocumentId>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_collection_names(&self) -> Result<Vec<CollectionName>> {
        let collections = self.collections.read().await;
        Ok(collections
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn describe(&self) -> String {
        format!("local://{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{fields_from_json, FieldValue};
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path().join("store.json")).await.unwrap();

        assert!(store.list_collection_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reads_typed_value_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("store.json");
        std::fs::write(
            &file,
            json!({
                "users": {
                    "u1": {
                        "name": {"stringValue": "Aria"},
                        "createdAt": {"timestampValue": "2024-03-09T18:30:00.123456789Z"}
                    }
                }
            })
            .to_string(),
        )
        .unwrap();

        let store = LocalStore::open(&file).await.unwrap();
        let fields = store
            .get(&DocumentPath::parse("users/u1").unwrap())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fields["name"], FieldValue::from("Aria"));
        assert!(matches!(fields["createdAt"], FieldValue::Timestamp(_)));
    }

    #[tokio::test]
    async fn test_set_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("nested").join("store.json");
        let path = DocumentPath::parse("utils/schema_arma").unwrap();
        let fields = fields_from_json(json!({"General": {"Nome": ""}}));

        {
            let store = LocalStore::open(&file).await.unwrap();
            store.set(&path, &fields).await.unwrap();
        }

        let reopened = LocalStore::open(&file).await.unwrap();
        assert_eq!(reopened.get(&path).await.unwrap(), Some(fields));
        assert!(!file.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_malformed_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("store.json");
        std::fs::write(&file, r#"{"users": {"u1": {"x": {"weirdValue": 1}}}}"#).unwrap();

        let result = LocalStore::open(&file).await;

        assert!(result.is_err());
    }
}
