//! Local filesystem seen-id store.
//!
//! The set is stored as a JSON array of ids. Writes go to a sibling `.tmp`
//! file that is then renamed over the target, so a crash mid-write leaves
//! the previous state in place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{SeenIdStore, SeenIds};

/// Seen-id store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct LocalSeenStore {
    path: PathBuf,
}

impl LocalSeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Strict load; errors on unreadable or invalid content.
    async fn try_load(&self) -> Result<SeenIds> {
        let Some(bytes) = self.read_bytes().await? else {
            return Ok(SeenIds::new());
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(SeenIds::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl SeenIdStore for LocalSeenStore {
    async fn load(&self) -> SeenIds {
        self.try_load().await.unwrap_or_else(|e| {
            log::warn!(
                "Could not read seen ids from {}, starting from an empty set: {}",
                self.path.display(),
                e
            );
            SeenIds::new()
        })
    }

    async fn save(&self, ids: &SeenIds) -> Result<()> {
        let bytes = serde_json::to_vec(ids)?;
        self.write_bytes(&bytes).await
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
