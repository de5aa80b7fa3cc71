//! Batch migration results
//!
//! Per-document outcomes of `migrate-all` are folded into a [`BatchResult`];
//! a failing document is recorded and never aborts the batch.

use crate::domain::{DocumentFailure, Fields};
use std::collections::BTreeMap;

/// Result of migrating a collection
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Collection that was migrated
    pub collection: String,

    /// Final content of every document handled successfully, migrated or not
    pub documents: BTreeMap<String, Fields>,

    /// Documents started (successes, not found and failures)
    pub attempted: usize,

    /// Documents handled successfully, migrated or unchanged
    pub processed: usize,

    /// Documents a migration step changed, written or not
    pub migrated: usize,

    /// Documents actually overwritten in the store
    pub written: usize,

    /// Documents listed but gone by the time they were fetched
    pub not_found: Vec<String>,

    /// Per-document failures
    pub failures: Vec<DocumentFailure>,

    /// Whether cancellation stopped the batch before every document started
    pub interrupted: bool,
}

impl BatchResult {
    /// Create an empty result for `collection`
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Default::default()
        }
    }

    /// Record a document that was handled successfully
    ///
    /// `migrated` says whether a step changed the document, `written` whether
    /// the change reached the store.
    pub fn add_success(
        &mut self,
        document_id: impl Into<String>,
        content: Fields,
        migrated: bool,
        written: bool,
    ) {
        self.attempted += 1;
        self.processed += 1;
        if migrated {
            self.migrated += 1;
        }
        if written {
            self.written += 1;
        }
        self.documents.insert(document_id.into(), content);
    }

    /// Record a document that disappeared between listing and fetch
    pub fn add_not_found(&mut self, document_id: impl Into<String>) {
        self.attempted += 1;
        self.not_found.push(document_id.into());
    }

    /// Record a failed document
    pub fn add_failure(&mut self, failure: DocumentFailure) {
        self.attempted += 1;
        self.failures.push(failure);
    }

    /// Sort the id lists so reports do not depend on completion order
    pub fn finalize(&mut self) {
        self.not_found.sort();
        self.failures.sort_by(|a, b| a.document_id.cmp(&b.document_id));
    }

    /// Successful documents no step changed
    pub fn unchanged(&self) -> usize {
        self.processed.saturating_sub(self.migrated)
    }

    /// Check if every attempted document succeeded and the batch ran to the end
    pub fn is_successful(&self) -> bool {
        self.failures.is_empty() && !self.interrupted
    }

    /// Log a summary of the batch
    pub fn log_summary(&self) {
        tracing::info!(
            collection = %self.collection,
            attempted = self.attempted,
            processed = self.processed,
            migrated = self.migrated,
            written = self.written,
            unchanged = self.unchanged(),
            not_found = self.not_found.len(),
            failed = self.failures.len(),
            interrupted = self.interrupted,
            "Batch migration completed"
        );

        for failure in &self.failures {
            tracing::warn!(
                collection = %self.collection,
                document_id = %failure.document_id,
                error = %failure.message,
                "Document migration failed"
            );
        }
    }
}
