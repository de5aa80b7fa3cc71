//! Init command implementation
//!
//! Writes a sample configuration file.

use super::{fail, finish};
use crate::core::engine::Response;
use crate::domain::BastionError;
use clap::Args;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Sample configuration written by `init`
pub const SAMPLE_CONFIG: &str = include_str!("../../../bastion.toml.example");

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "bastion.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct Created {
    path: String,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            return fail(&BastionError::Configuration(format!(
                "Configuration file already exists: {} (use --force to overwrite)",
                self.output
            )));
        }

        if let Err(e) = fs::write(&self.output, SAMPLE_CONFIG) {
            return fail(&BastionError::from(e));
        }

        finish(&Response::success(Created {
            path: self.output.clone(),
        }))
    }
}
