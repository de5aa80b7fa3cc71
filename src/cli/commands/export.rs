//! Export command implementation
//!
//! Writes a snapshot of the whole store to the artifact directory.

use super::{build_engine, fail, finish};
use clap::Args;
use std::time::Instant;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Override the artifact directory
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Build and encode the snapshot without writing the artifact
    #[arg(long)]
    pub dry_run: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let engine = match build_engine(config_path, |config| {
            if let Some(dir) = &self.output_dir {
                tracing::info!(output_dir = %dir, "Overriding output directory from CLI");
                config.export.output_dir = dir.clone();
            }
            if self.dry_run {
                tracing::info!("Enabling dry-run mode from CLI");
                config.application.dry_run = true;
            }
        })
        .await
        {
            Ok(engine) => engine,
            Err(e) => return fail(&e),
        };

        crate::log_operation_start!("export", "all collections");
        let start = Instant::now();

        let response = engine.export_all().await;

        crate::log_operation_complete!("export", response.is_success(), start.elapsed());
        finish(&response)
    }
}
