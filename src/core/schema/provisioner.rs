//! Schema template seeding

use super::templates::TemplateKind;
use crate::adapters::store::DocumentStore;
use crate::domain::{BastionError, CollectionName, DocumentId, DocumentPath, Fields, Result};
use std::sync::Arc;

/// Result of seeding one template
#[derive(Debug, Clone, PartialEq)]
pub struct SeedReport {
    /// Category seeded
    pub template: TemplateKind,

    /// Where the template was written
    pub path: DocumentPath,

    /// Content written
    pub content: Fields,

    /// Whether the write was skipped
    pub dry_run: bool,
}

/// Writes canonical schema templates to their well-known documents
pub struct SchemaProvisioner {
    store: Arc<dyn DocumentStore>,
    dry_run: bool,
}

impl SchemaProvisioner {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            dry_run: false,
        }
    }

    /// Build templates without writing them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Document path of a template
    ///
    /// # Errors
    ///
    /// Never fails for the built-in categories; the error path exists because
    /// coordinates are validated on construction.
    pub fn path_for(kind: TemplateKind) -> Result<DocumentPath> {
        let collection =
            CollectionName::new(TemplateKind::COLLECTION).map_err(BastionError::InvalidPath)?;
        let id = DocumentId::new(kind.document_id()).map_err(BastionError::InvalidPath)?;
        Ok(DocumentPath::new(collection, id))
    }

    /// Seed the template named `name`
    ///
    /// The name is validated before the store is touched.
    ///
    /// # Errors
    ///
    /// Returns [`BastionError::UnknownTemplate`] for an unrecognized name, or
    /// a store error if the write fails.
    pub async fn seed_schema(&self, name: &str) -> Result<SeedReport> {
        let kind: TemplateKind = name.parse()?;
        self.seed(kind).await
    }

    /// Seed one template
    ///
    /// Overwrites the target document wholesale with no read first; fields
    /// previously stored there are gone afterwards.
    ///
    /// # Errors
    ///
    /// Returns a store error if the write fails.
    pub async fn seed(&self, kind: TemplateKind) -> Result<SeedReport> {
        let path = Self::path_for(kind)?;
        let content = kind.template().to_fields()?;

        if self.dry_run {
            tracing::info!(
                template = %kind,
                document = %path,
                "Dry run: template built, not written"
            );
        } else {
            self.store.set(&path, &content).await?;
            tracing::info!(template = %kind, document = %path, "Schema template seeded");
        }

        Ok(SeedReport {
            template: kind,
            path,
            content,
            dry_run: self.dry_run,
        })
    }

    /// Seed every template in order, stopping at the first failure
    ///
    /// # Errors
    ///
    /// Returns the first store error; templates seeded before it stay written.
    pub async fn seed_all(&self) -> Result<Vec<SeedReport>> {
        let mut reports = Vec::with_capacity(TemplateKind::ALL.len());
        for kind in TemplateKind::ALL {
            reports.push(self.seed(kind).await?);
        }
        Ok(reports)
    }
}
