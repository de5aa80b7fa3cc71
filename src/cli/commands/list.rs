//! List command implementation

use super::{build_engine, fail, finish};
use crate::domain::{BastionError, CollectionName};
use clap::Args;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// List the document ids of this collection instead of collection names
    #[arg(long)]
    pub collection: Option<String>,
}

impl ListArgs {
    /// Execute the list command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let collection = match self.collection.clone().map(CollectionName::new).transpose() {
            Ok(collection) => collection,
            Err(e) => return fail(&BastionError::InvalidPath(e)),
        };

        let engine = match build_engine(config_path, |_| {}).await {
            Ok(engine) => engine,
            Err(e) => return fail(&e),
        };

        finish(&engine.list(collection.as_ref()).await)
    }
}
