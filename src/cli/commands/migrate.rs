//! Migrate command implementation
//!
//! Migrates a single document, by id in the default collection, by path, or
//! the configured default coordinate.

use super::{build_engine, dry_run_override, fail, finish};
use crate::core::migration::MigrationTarget;
use crate::domain::{BastionError, DocumentId, DocumentPath};
use clap::Args;
use std::time::Instant;

/// Arguments for the migrate command
#[derive(Args, Debug, Default)]
pub struct MigrateArgs {
    /// Document id in the configured default collection; wins over --path
    #[arg(long)]
    pub id: Option<String>,

    /// Document path as collection/id
    #[arg(long)]
    pub path: Option<String>,

    /// Compute the migration without writing it
    #[arg(long)]
    pub dry_run: bool,
}

impl MigrateArgs {
    /// Build the migration target from the flags
    ///
    /// # Errors
    ///
    /// Returns [`BastionError::InvalidPath`] for a malformed id or path.
    pub fn target(&self) -> Result<MigrationTarget, BastionError> {
        let mut target = MigrationTarget::default();
        if let Some(id) = &self.id {
            target.id = Some(DocumentId::new(id.clone()).map_err(BastionError::InvalidPath)?);
        }
        if let Some(path) = &self.path {
            target.path = Some(DocumentPath::parse(path)?);
        }
        Ok(target)
    }

    /// Execute the migrate command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let target = match self.target() {
            Ok(target) => target,
            Err(e) => return fail(&e),
        };

        let engine = match build_engine(config_path, dry_run_override(self.dry_run)).await {
            Ok(engine) => engine,
            Err(e) => return fail(&e),
        };

        let scope = self
            .id
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or("default document");
        crate::log_operation_start!("migrate", scope);
        let start = Instant::now();

        let response = engine.migrate_document(&target).await;

        crate::log_operation_complete!("migrate", response.is_success(), start.elapsed());
        finish(&response)
    }
}
