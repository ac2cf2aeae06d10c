use anyhow::Context;
use async_trait::async_trait;
use movieverse_config::PathManager;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Durable string-keyed storage of whole serialized documents.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored under `key` yet.
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_paths(paths: &PathManager) -> anyhow::Result<Self> {
        let dir = paths.storage_dir();
        std::fs::create_dir_all(&dir).with_context(|| format!("creating storage directory {}", dir.display()))?;
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No stored data at {}", path.display());
                Ok(None)
            }
            Err(source) => Err(StorageError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let write_error = |source| StorageError::Write {
            key: key.to_string(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(write_error)?;

        // Atomic write: temp file, then rename over the old record
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, value).await.map_err(write_error)?;
        tokio::fs::rename(&temp_path, &path).await.map_err(write_error)?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.put(key, value);
        store
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.blobs.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned()
    }

    pub fn put(&self, key: &str, value: &str) {
        self.blobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.put(key, value);
        Ok(())
    }
}

#[async_trait]
impl<S: BlobStore + ?Sized> BlobStore for std::sync::Arc<S> {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key).await
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(dir.path());
        assert_eq!(store.read("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_write_then_read() {
        let dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(dir.path().join("nested"));

        store.write("movieverse_watchlist", "[1]").await.unwrap();
        store.write("movieverse_watchlist", "[2]").await.unwrap();

        assert_eq!(store.read("movieverse_watchlist").await.unwrap().as_deref(), Some("[2]"));
        assert!(store.path_for("movieverse_watchlist").exists());
        assert!(!dir.path().join("nested/movieverse_watchlist.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_from_paths_creates_directory() {
        let dir = TempDir::new().unwrap();
        let paths = PathManager::with_base(dir.path().to_path_buf());
        let store = FileBlobStore::from_paths(&paths).unwrap();
        assert!(store.dir().is_dir());
        assert_eq!(store.dir(), paths.storage_dir().as_path());
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryBlobStore::with_blob("a", "1");
        assert_eq!(store.read("a").await.unwrap().as_deref(), Some("1"));
        store.write("b", "2").await.unwrap();
        assert_eq!(store.get("b").as_deref(), Some("2"));
    }
}
