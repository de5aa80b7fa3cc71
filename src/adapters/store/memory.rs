//! In-memory document store
//!
//! Backs dry runs and tests. Supports failure injection per document path or
//! collection so batch error isolation can be exercised without a network.

use super::traits::DocumentStore;
use crate::domain::{
    BastionError, CollectionName, DocumentId, DocumentPath, Fields, Result, StoreError,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Documents grouped by collection
pub type Collections = BTreeMap<CollectionName, BTreeMap<DocumentId, Fields>>;

#[derive(Default)]
struct FailurePlan {
    reads: BTreeSet<DocumentPath>,
    writes: BTreeSet<DocumentPath>,
    listings: BTreeSet<CollectionName>,
    collection_names: bool,
}

/// Document store held entirely in process memory
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    failures: RwLock<FailurePlan>,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `collections`
    pub fn from_collections(collections: Collections) -> Self {
        Self {
            collections: RwLock::new(collections),
            ..Default::default()
        }
    }

    /// Insert a document without counting it as a write
    pub fn insert(&self, path: &DocumentPath, fields: Fields) {
        self.collections_mut()
            .entry(path.collection().clone())
            .or_default()
            .insert(path.id().clone(), fields);
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with_document(self, path: &str, fields: Fields) -> Result<Self> {
        let path = DocumentPath::parse(path)?;
        self.insert(&path, fields);
        Ok(self)
    }

    /// Read a document without going through the async trait
    pub fn peek(&self, path: &DocumentPath) -> Option<Fields> {
        self.collections_ref()
            .get(path.collection())
            .and_then(|docs| docs.get(path.id()))
            .cloned()
    }

    /// Copy of every document, grouped by collection
    pub fn dump(&self) -> Collections {
        self.collections_ref().clone()
    }

    /// Number of `set` calls that reached the store
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every read of `path` fail
    pub fn fail_reads_for(&self, path: &DocumentPath) {
        self.failures_mut().reads.insert(path.clone());
    }

    /// Make every write of `path` fail
    pub fn fail_writes_for(&self, path: &DocumentPath) {
        self.failures_mut().writes.insert(path.clone());
    }

    /// Make listing `collection` fail
    pub fn fail_listing_of(&self, collection: &CollectionName) {
        self.failures_mut().listings.insert(collection.clone());
    }

    /// Make listing collection names fail
    pub fn fail_collection_names(&self) {
        self.failures_mut().collection_names = true;
    }

    fn collections_ref(&self) -> RwLockReadGuard<'_, Collections> {
        self.collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn collections_mut(&self) -> RwLockWriteGuard<'_, Collections> {
        self.collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn failures_ref(&self) -> RwLockReadGuard<'_, FailurePlan> {
        self.failures
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn failures_mut(&self) -> RwLockWriteGuard<'_, FailurePlan> {
        self.failures
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Fields>> {
        if self.failures_ref().reads.contains(path) {
            return Err(BastionError::Store(StoreError::ReadFailed {
                path: path.to_string(),
                message: "injected read failure".to_string(),
            }));
        }
        Ok(self.peek(path))
    }

    async fn set(&self, path: &DocumentPath, fields: &Fields) -> Result<()> {
        if self.failures_ref().writes.contains(path) {
            return Err(BastionError::Store(StoreError::WriteFailed {
                path: path.to_string(),
                message: "injected write failure".to_string(),
            }));
        }
        self.insert(path, fields.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_document_ids(&self, collection: &CollectionName) -> Result<Vec<DocumentId>> {
        if self.failures_ref().listings.contains(collection) {
            return Err(BastionError::Store(StoreError::ListFailed {
                target: collection.to_string(),
                message: "injected listing failure".to_string(),
            }));
        }
        Ok(self
            .collections_ref()
            .get(collection)
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn list_collection_names(&self) -> Result<Vec<CollectionName>> {
        if self.failures_ref().collection_names {
            return Err(BastionError::Store(StoreError::ListFailed {
                target: "collections".to_string(),
                message: "injected listing failure".to_string(),
            }));
        }
        Ok(self
            .collections_ref()
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
