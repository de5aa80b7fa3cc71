//! Migrate-all command implementation

use super::{
    build_engine, dry_run_override, exit_code_for_kind, fail, EXIT_INTERRUPTED, EXIT_PARTIAL,
    EXIT_SUCCESS,
};
use crate::core::engine::{BatchReport, Response};
use crate::domain::{BastionError, CollectionName};
use clap::Args;
use std::time::Instant;
use tokio::sync::watch;

/// Arguments for the migrate-all command
#[derive(Args, Debug)]
pub struct MigrateAllArgs {
    /// Collection whose documents are migrated
    #[arg(long)]
    pub collection: String,

    /// Compute the migrations without writing them
    #[arg(long)]
    pub dry_run: bool,
}

impl MigrateAllArgs {
    /// Execute the migrate-all command
    ///
    /// Raising `shutdown_signal` stops new documents from starting; the
    /// command then exits with 130.
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let collection = match CollectionName::new(self.collection.clone()) {
            Ok(name) => name,
            Err(e) => return fail(&BastionError::InvalidPath(e)),
        };

        let engine = match build_engine(config_path, dry_run_override(self.dry_run)).await {
            Ok(engine) => engine,
            Err(e) => return fail(&e),
        };

        crate::log_operation_start!("migrate_all", collection);
        let start = Instant::now();

        let response = engine.migrate_all(&collection, shutdown_signal).await;

        crate::log_operation_complete!("migrate_all", response.is_success(), start.elapsed());
        println!("{}", response.to_pretty_json()?);
        Ok(batch_exit_code(&response))
    }
}

/// 130 if interrupted, 1 if any document failed, the error mapping otherwise
fn batch_exit_code(response: &Response<BatchReport>) -> i32 {
    match response {
        Response::Success { data } if data.interrupted => EXIT_INTERRUPTED,
        Response::Success { data } if !data.failures.is_empty() => EXIT_PARTIAL,
        Response::Success { .. } => EXIT_SUCCESS,
        Response::Error { kind, .. } => exit_code_for_kind(kind),
    }
}
