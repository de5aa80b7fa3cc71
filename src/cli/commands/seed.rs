//! Seed command implementation
//!
//! Overwrites one schema template document, or all four.

use super::{build_engine, dry_run_override, fail, finish};
use crate::core::schema::TemplateKind;
use clap::Args;
use std::time::Instant;

/// Arguments for the seed command
#[derive(Args, Debug, Default)]
pub struct SeedArgs {
    /// Template to seed (armor, weapon, accessory, consumable)
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub template: Option<String>,

    /// Seed every template
    #[arg(long)]
    pub all: bool,

    /// Build the templates without writing them
    #[arg(long)]
    pub dry_run: bool,
}

impl SeedArgs {
    /// Execute the seed command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        // reject unknown names before connecting
        if let Some(name) = &self.template {
            if let Err(e) = name.parse::<TemplateKind>() {
                return fail(&e);
            }
        }

        let engine = match build_engine(config_path, dry_run_override(self.dry_run)).await {
            Ok(engine) => engine,
            Err(e) => return fail(&e),
        };

        let start = Instant::now();
        match &self.template {
            Some(name) if !self.all => {
                crate::log_operation_start!("seed", name);
                let response = engine.seed_schema(name).await;
                crate::log_operation_complete!("seed", response.is_success(), start.elapsed());
                finish(&response)
            }
            _ => {
                crate::log_operation_start!("seed_all", TemplateKind::COLLECTION);
                let response = engine.seed_all().await;
                crate::log_operation_complete!("seed_all", response.is_success(), start.elapsed());
                finish(&response)
            }
        }
    }
}
