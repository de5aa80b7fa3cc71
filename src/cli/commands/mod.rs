//! CLI command implementations
//!
//! Every command prints one response envelope to stdout and maps it to an
//! exit code.

pub mod export;
pub mod init;
pub mod list;
pub mod migrate;
pub mod migrate_all;
pub mod seed;
pub mod show;
pub mod validate;

use crate::adapters::sink::FileSystemSink;
use crate::adapters::store::create_store;
use crate::config::{load_config, BastionConfig};
use crate::core::engine::{Engine, Response};
use crate::domain::BastionError;
use serde::Serialize;
use std::sync::Arc;

pub const EXIT_SUCCESS: i32 = 0;
/// Batch finished with per-document failures
pub const EXIT_PARTIAL: i32 = 1;
/// Configuration or caller error
pub const EXIT_CONFIG: i32 = 2;
/// Store unreachable or credentials rejected
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;
/// Stopped by SIGINT/SIGTERM
pub const EXIT_INTERRUPTED: i32 = 130;

/// Exit code for an error envelope kind
pub fn exit_code_for_kind(kind: &str) -> i32 {
    match kind {
        "configuration" | "unknown_template" | "invalid_path" => EXIT_CONFIG,
        "connection" | "authentication" => EXIT_CONNECTION,
        _ => EXIT_FATAL,
    }
}

/// Print `response` to stdout and return its exit code
pub(crate) fn finish<T: Serialize>(response: &Response<T>) -> anyhow::Result<i32> {
    println!("{}", response.to_pretty_json()?);
    Ok(match response.error_kind() {
        None => EXIT_SUCCESS,
        Some(kind) => exit_code_for_kind(kind),
    })
}

/// Report an error raised before the engine ran
pub(crate) fn fail(err: &BastionError) -> anyhow::Result<i32> {
    tracing::error!(kind = err.kind(), error = %err, "Command failed");
    finish(&Response::<()>::error(err))
}

/// Force dry-run mode when the flag is given
pub(crate) fn dry_run_override(dry_run: bool) -> impl FnOnce(&mut BastionConfig) {
    move |config| {
        if dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
    }
}

/// Load configuration, apply CLI overrides and build an engine
///
/// # Errors
///
/// Returns a configuration error if loading or re-validation fails, or the
/// store construction error.
pub(crate) async fn build_engine(
    config_path: &str,
    overrides: impl FnOnce(&mut BastionConfig),
) -> Result<Engine, BastionError> {
    let mut config = load_config(config_path)?;
    overrides(&mut config);
    config.validate().map_err(|e| {
        BastionError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    if config.application.dry_run {
        tracing::info!("Dry run mode enabled - nothing will be written");
    }

    let store = create_store(&config.store).await?;
    tracing::debug!(store = %store.describe(), "Store ready");
    let sink = Arc::new(FileSystemSink::new(&config.export.output_dir));

    Ok(Engine::new(store, sink, &config))
}
