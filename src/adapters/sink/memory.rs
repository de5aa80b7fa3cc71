//! In-memory sink for tests and dry runs

use super::ArtifactSink;
use crate::domain::{BastionError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Keeps artifacts in a map keyed by name
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Mutex<BTreeMap<String, String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents of the artifact called `name`
    pub fn get(&self, name: &str) -> Option<String> {
        self.artifacts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned()
    }

    /// Names of every stored artifact, sorted
    pub fn names(&self) -> Vec<String> {
        self.artifacts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn write_artifact(&self, name: &str, contents: &str) -> Result<String> {
        let mut artifacts = self
            .artifacts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if artifacts.contains_key(name) {
            return Err(BastionError::Artifact(format!(
                "Artifact {name} already exists"
            )));
        }

        artifacts.insert(name.to_string(), contents.to_string());
        Ok(name.to_string())
    }
}
