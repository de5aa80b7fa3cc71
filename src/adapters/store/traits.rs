//! Document store abstraction
//!
//! This module defines the minimal contract the engine consumes from a
//! document store. Every backend (Firestore, local file, in-memory) implements
//! [`DocumentStore`].

use crate::domain::{CollectionName, DocumentId, DocumentPath, Fields, Result};
use async_trait::async_trait;

/// Document store client
///
/// Implementations are shared read-only across operations behind an `Arc`.
///
/// # Concurrency
///
/// `get` followed by `set` is not atomic and no implementation offers a
/// compare-and-swap. A writer that changes a document between the engine's
/// read and its overwrite loses that change.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(fields))` if the document exists, `Ok(None)` if it
    /// does not.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails for reasons other than "not found".
    async fn get(&self, path: &DocumentPath) -> Result<Option<Fields>>;

    /// Overwrite a document with `fields`, creating it if needed
    ///
    /// Any field not present in `fields` is removed from the stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn set(&self, path: &DocumentPath, fields: &Fields) -> Result<()>;

    /// List the identifiers of every document in a collection
    ///
    /// Only identifiers are returned; contents must be fetched with [`get`].
    ///
    /// [`get`]: DocumentStore::get
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    async fn list_document_ids(&self, collection: &CollectionName) -> Result<Vec<DocumentId>>;

    /// List the names of every top-level collection
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    async fn list_collection_names(&self) -> Result<Vec<CollectionName>>;

    /// Human readable backend description for logs
    fn describe(&self) -> String;
}
