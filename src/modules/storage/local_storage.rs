//! Local filesystem evidence storage
//!
//! Stored names are `{prefix}_{uuid-v7-simple}.{ext}`. The client's file
//! name never reaches the path, and files are opened with `create_new` so an
//! existing object is never overwritten.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// URL path segment the upload directory is mounted under
pub const PUBLIC_PREFIX: &str = "uploads";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to prepare upload directory: {0}")]
    Directory(std::io::Error),

    #[error("Failed to write file: {0}")]
    Write(std::io::Error),

    #[error("Invalid object name: {0}")]
    InvalidName(String),
}

/// A file that has been written to storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Generated name, e.g. `guided_0192f3c1....jpg`
    pub name: String,
    /// Server-relative URL, e.g. `uploads/guided_0192f3c1....jpg`
    pub url: String,
    pub size: u64,
}

#[async_trait]
pub trait EvidenceStorage: Send + Sync {
    /// Write `data` under a freshly generated name
    async fn store(
        &self,
        prefix: &str,
        extension: &str,
        data: &[u8],
    ) -> Result<StoredObject, StorageError>;

    /// Remove a previously stored object. Missing objects are not an error.
    async fn remove(&self, name: &str) -> Result<(), StorageError>;
}

pub struct LocalEvidenceStorage {
    root: PathBuf,
}

impl LocalEvidenceStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload directory if it does not exist yet
    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(StorageError::Directory)
    }

    fn generate_name(prefix: &str, extension: &str) -> String {
        format!("{}_{}.{}", prefix, Uuid::now_v7().simple(), extension)
    }

    fn object_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        let is_plain = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
            && !name.starts_with('.');
        if !is_plain {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl EvidenceStorage for LocalEvidenceStorage {
    async fn store(
        &self,
        prefix: &str,
        extension: &str,
        data: &[u8],
    ) -> Result<StoredObject, StorageError> {
        self.ensure_root().await?;

        let name = Self::generate_name(prefix, extension);
        let path = self.object_path(&name)?;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(StorageError::Write)?;

        if let Err(e) = write_all_and_sync(&mut file, data).await {
            drop(file);
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                warn!("Failed to remove partial upload {}: {}", path.display(), cleanup);
            }
            return Err(StorageError::Write(e));
        }

        debug!("Stored {} ({} bytes)", name, data.len());

        Ok(StoredObject {
            url: format!("{}/{}", PUBLIC_PREFIX, name),
            name,
            size: data.len() as u64,
        })
    }

    async fn remove(&self, name: &str) -> Result<(), StorageError> {
        let path = self.object_path(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed {}", name);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Write(e)),
        }
    }
}

async fn write_all_and_sync(file: &mut tokio::fs::File, data: &[u8]) -> std::io::Result<()> {
    file.write_all(data).await?;
    file.flush().await?;
    file.sync_all().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("uploads");
        let storage = LocalEvidenceStorage::new(&root);

        let stored = storage.store("guided", "png", b"payload").await.unwrap();

        assert!(stored.name.starts_with("guided_"));
        assert!(stored.name.ends_with(".png"));
        assert_eq!(stored.url, format!("uploads/{}", stored.name));
        assert_eq!(stored.size, 7);
        let on_disk = tokio::fs::read(root.join(&stored.name)).await.unwrap();
        assert_eq!(on_disk, b"payload");
    }

    #[tokio::test]
    async fn test_concurrent_stores_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalEvidenceStorage::new(dir.path());

        let (a, b) = tokio::join!(
            storage.store("quick", "jpg", b"first"),
            storage.store("quick", "jpg", b"second"),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.name, b.name);
        assert_eq!(tokio::fs::read(dir.path().join(&a.name)).await.unwrap(), b"first");
        assert_eq!(tokio::fs::read(dir.path().join(&b.name)).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalEvidenceStorage::new(dir.path());
        let stored = storage.store("guided", "pdf", b"%PDF-").await.unwrap();

        storage.remove(&stored.name).await.unwrap();
        assert!(!dir.path().join(&stored.name).exists());
        storage.remove(&stored.name).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_rejects_path_components() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalEvidenceStorage::new(dir.path());

        let err = storage.remove("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)));
        let err = storage.remove("").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)));
    }
}
