//! Show command implementation

use super::{build_engine, fail, finish};
use crate::domain::DocumentPath;
use clap::Args;

/// Arguments for the show command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Document path as collection/id; defaults to the configured document
    #[arg(long)]
    pub path: Option<String>,
}

impl ShowArgs {
    /// Execute the show command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let path = match self.path.as_deref().map(DocumentPath::parse).transpose() {
            Ok(path) => path,
            Err(e) => return fail(&e),
        };

        let engine = match build_engine(config_path, |_| {}).await {
            Ok(engine) => engine,
            Err(e) => return fail(&e),
        };

        finish(&engine.show(path.as_ref()).await)
    }
}
