//! Local directory sink

use super::ArtifactSink;
use crate::domain::{BastionError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Writes artifacts as files in one directory
#[derive(Debug, Clone)]
pub struct FileSystemSink {
    directory: PathBuf,
}

impl FileSystemSink {
    /// Create a sink rooted at `directory`; the directory is created on the
    /// first write
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    /// Directory artifacts are written to
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl ArtifactSink for FileSystemSink {
    async fn write_artifact(&self, name: &str, contents: &str) -> Result<String> {
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(BastionError::Artifact(format!(
                "Invalid artifact name '{name}'"
            )));
        }

        tokio::fs::create_dir_all(&self.directory).await.map_err(|e| {
            BastionError::Artifact(format!(
                "Failed to create output directory {}: {e}",
                self.directory.display()
            ))
        })?;

        let path = self.directory.join(name);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => BastionError::Artifact(format!(
                    "Artifact {} already exists",
                    path.display()
                )),
                _ => BastionError::Artifact(format!("Failed to create {}: {e}", path.display())),
            })?;

        let written = async {
            file.write_all(contents.as_bytes()).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            // Remove the partial artifact
            let _ = tokio::fs::remove_file(&path).await;
            return Err(BastionError::Artifact(format!(
                "Failed to write {}: {e}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), bytes = contents.len(), "Artifact written");
        Ok(path.display().to_string())
    }
}
