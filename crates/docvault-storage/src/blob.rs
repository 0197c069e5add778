//! Local filesystem blob store.

use std::path::{Path, PathBuf};
use std::pin::Pin;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;

/// A stream of file bytes.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Metadata for a stored blob.
#[derive(Debug, Clone)]
pub struct BlobMeta {
    /// Path relative to the store root.
    pub path: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Last modification time, if the filesystem reports one.
    pub modified: Option<DateTime<Utc>>,
}

/// Blob store rooted at a single local directory.
///
/// All paths handed to this store are relative; absolute components and
/// `..` segments are rejected so a path from the database can never
/// escape the root.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a blob store rooted at the given directory, creating it
    /// if necessary.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path to an absolute path within the root.
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let clean = path.trim_start_matches('/');
        let relative = Path::new(clean);
        if relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return Err(AppError::storage(format!("Invalid storage path: {path}")));
        }
        Ok(self.root.join(relative))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Whether the root directory is reachable.
    pub async fn health_check(&self) -> bool {
        self.root.exists() && self.root.is_dir()
    }

    /// Write a blob, creating parent directories as needed.
    pub async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write file: {path}"),
                e,
            )
        })?;

        debug!(path, bytes = data.len(), "Wrote blob");
        Ok(())
    }

    /// Open a blob as a byte stream.
    pub async fn read(&self, path: &str) -> AppResult<ByteStream> {
        let full_path = self.resolve(path)?;
        let file = fs::File::open(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("File not found: {path}"))
            } else {
                AppError::with_source(ErrorKind::Storage, format!("Failed to open file: {path}"), e)
            }
        })?;

        Ok(Box::pin(ReaderStream::new(file)))
    }

    /// Read a blob fully into memory.
    pub async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(path)?;
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("File not found: {path}"))
            } else {
                AppError::with_source(ErrorKind::Storage, format!("Failed to read file: {path}"), e)
            }
        })?;
        Ok(Bytes::from(data))
    }

    /// Delete a blob. Deleting a path that does not exist is not an error.
    pub async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                debug!(path, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete file: {path}"),
                e,
            )),
        }
    }

    /// Whether a blob exists.
    pub async fn exists(&self, path: &str) -> AppResult<bool> {
        Ok(self.resolve(path)?.exists())
    }

    /// Metadata for a single blob.
    pub async fn metadata(&self, path: &str) -> AppResult<BlobMeta> {
        let full_path = self.resolve(path)?;
        let meta = fs::metadata(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Path not found: {path}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to get metadata: {path}"),
                    e,
                )
            }
        })?;

        Ok(BlobMeta {
            path: path.to_string(),
            size_bytes: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    /// Walk the entire store and return metadata for every blob,
    /// with paths relative to the root.
    pub async fn list_all(&self) -> AppResult<Vec<BlobMeta>> {
        let mut blobs = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to list directory: {}", dir.display()),
                    e,
                )
            })?;

            while let Some(entry) = entries.next_entry().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
            })? {
                let entry_path = entry.path();
                let meta = entry.metadata().await.map_err(|e| {
                    AppError::with_source(ErrorKind::Storage, "Failed to read entry metadata", e)
                })?;

                if meta.is_dir() {
                    pending.push(entry_path);
                } else if let Ok(relative) = entry_path.strip_prefix(&self.root) {
                    blobs.push(BlobMeta {
                        path: relative.to_string_lossy().replace('\\', "/"),
                        size_bytes: meta.len(),
                        modified: meta.modified().ok().map(DateTime::<Utc>::from),
                    });
                }
            }
        }

        Ok(blobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::ErrorKind;

    async fn store() -> (tempfile::TempDir, BlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path().to_str().unwrap()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_write_read_delete_round_trip() {
        let (_dir, store) = store().await;

        store
            .write("2024/01/a.pdf", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        assert!(store.exists("2024/01/a.pdf").await.unwrap());

        let data = store.read_bytes("2024/01/a.pdf").await.unwrap();
        assert_eq!(&data[..], b"hello");

        store.delete("2024/01/a.pdf").await.unwrap();
        assert!(!store.exists("2024/01/a.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let (_dir, store) = store().await;
        store.delete("never/was/here.bin").await.unwrap();
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let (_dir, store) = store().await;
        let err = store.read_bytes("missing.txt").await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_parent_traversal_rejected() {
        let (_dir, store) = store().await;
        let err = store.read_bytes("../outside.txt").await.unwrap_err();
        assert!(err.is(ErrorKind::Storage));

        let err = store
            .write("a/../../etc/passwd", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Storage));
    }

    #[tokio::test]
    async fn test_list_all_walks_nested_directories() {
        let (_dir, store) = store().await;
        store.write("a/one.txt", Bytes::from_static(b"1")).await.unwrap();
        store
            .write("a/b/two.txt", Bytes::from_static(b"22"))
            .await
            .unwrap();
        store.write("three.txt", Bytes::from_static(b"333")).await.unwrap();

        let mut paths: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.path)
            .collect();
        paths.sort();
        assert_eq!(paths, vec!["a/b/two.txt", "a/one.txt", "three.txt"]);
    }
}
