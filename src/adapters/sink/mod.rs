//! Artifact sinks
//!
//! A sink stores named, write-once artifacts (snapshot exports).

pub mod filesystem;
pub mod memory;

pub use filesystem::FileSystemSink;
pub use memory::MemorySink;

use crate::domain::Result;
use async_trait::async_trait;

/// Write-once artifact store
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Store `contents` under `name`
    ///
    /// # Returns
    ///
    /// The location of the stored artifact (a filesystem path, or the name
    /// itself for in-memory sinks).
    ///
    /// # Errors
    ///
    /// Returns [`BastionError::Artifact`](crate::domain::BastionError::Artifact)
    /// if an artifact with the same name already exists or the write fails.
    async fn write_artifact(&self, name: &str, contents: &str) -> Result<String>;
}
