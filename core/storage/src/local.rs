//! Local filesystem blob store.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::store::BlobStore;
use classvault_common::{Error, Result, StorageKey};

/// Local filesystem blob store.
///
/// Stores each blob as one file named by its storage key under a root
/// directory. `StorageKey` construction rejects path separators, so keys
/// cannot escape the root.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a new local store rooted at the given directory.
    ///
    /// # Postconditions
    /// - Root directory exists after this returns Ok
    ///
    /// # Errors
    /// - `Error::Io` if the root cannot be created
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.exists() {
            std::fs::create_dir_all(&root)?;
        }
        Ok(Self { root })
    }

    fn blob_path(&self, key: &StorageKey) -> PathBuf {
        self.root.join(key.as_str())
    }
}

#[async_trait]
impl BlobStore for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn put(&self, key: &StorageKey, data: Vec<u8>) -> Result<()> {
        fs::write(self.blob_path(key), &data).await?;
        Ok(())
    }

    async fn get(&self, key: &StorageKey) -> Result<Vec<u8>> {
        let path = self.blob_path(key);
        if !path.exists() {
            return Err(Error::NotFound(format!("Blob not found: {}", key)));
        }
        Ok(fs::read(&path).await?)
    }

    async fn delete(&self, key: &StorageKey) -> Result<()> {
        let path = self.blob_path(key);
        if !path.exists() {
            return Err(Error::NotFound(format!("Blob not found: {}", key)));
        }
        fs::remove_file(&path).await?;
        Ok(())
    }

    async fn exists(&self, key: &StorageKey) -> Result<bool> {
        Ok(self.blob_path(key).exists())
    }
}
