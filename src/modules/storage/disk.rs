use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Blob store keyed by server-generated filenames under a root directory.
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Generate a unique, unguessable on-disk filename, preserving the
    /// original extension. Random names make concurrent uploads collision-free.
    pub fn generate_filename(original_name: &str) -> String {
        let id = Uuid::new_v4();
        match Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
        {
            Some(ext) => format!("{}.{}", id, ext),
            None => id.to_string(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Write a blob, creating parent directories as needed.
    pub async fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                tracing::error!("Failed to create storage directory {:?}: {}", parent, e);
                AppError::Internal(format!("storage write failed: {}", e))
            })?;
        }
        fs::write(&path, data).await.map_err(|e| {
            tracing::error!("Failed to write blob {:?}: {}", path, e);
            AppError::Internal(format!("storage write failed: {}", e))
        })
    }

    /// Read a blob. A missing file surfaces as NotFound, not an internal error.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound("File not found on disk".to_string()))
            }
            Err(e) => {
                tracing::error!("Failed to read blob {:?}: {}", path, e);
                Err(AppError::Internal(format!("storage read failed: {}", e)))
            }
        }
    }

    /// Best-effort delete. The relational store is the authoritative record;
    /// a missing or undeletable file is logged and swallowed.
    pub async fn delete_best_effort(&self, key: &str) {
        let path = self.path_for(key);
        if let Err(e) = fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to delete blob {:?}: {}", path, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_read_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path());

        storage.write("docs/a.txt", b"hello").await.unwrap();
        assert_eq!(storage.read("docs/a.txt").await.unwrap(), b"hello");

        storage.delete_best_effort("docs/a.txt").await;
        assert!(matches!(
            storage.read("docs/a.txt").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn deleting_a_missing_blob_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path());
        // Must not panic or error
        storage.delete_best_effort("never-existed.bin").await;
    }

    #[test]
    fn generated_filenames_keep_the_extension_and_are_unique() {
        let a = DiskStorage::generate_filename("report.pdf");
        let b = DiskStorage::generate_filename("report.pdf");
        assert!(a.ends_with(".pdf"));
        assert!(b.ends_with(".pdf"));
        assert_ne!(a, b);

        let bare = DiskStorage::generate_filename("noextension");
        assert!(!bare.contains('.'));
    }
}
