//! In-memory blob store for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::store::BlobStore;
use classvault_common::{Error, Result, StorageKey};

/// In-memory blob store.
///
/// Useful for testing and development. All data is stored in memory and lost
/// on drop.
#[derive(Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn put(&self, key: &StorageKey, data: Vec<u8>) -> Result<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| Error::Storage("Blob map lock poisoned".to_string()))?;
        blobs.insert(key.as_str().to_string(), data);
        Ok(())
    }

    async fn get(&self, key: &StorageKey) -> Result<Vec<u8>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| Error::Storage("Blob map lock poisoned".to_string()))?;
        blobs
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Blob not found: {}", key)))
    }

    async fn delete(&self, key: &StorageKey) -> Result<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| Error::Storage("Blob map lock poisoned".to_string()))?;
        blobs
            .remove(key.as_str())
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("Blob not found: {}", key)))
    }

    async fn exists(&self, key: &StorageKey) -> Result<bool> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| Error::Storage("Blob map lock poisoned".to_string()))?;
        Ok(blobs.contains_key(key.as_str()))
    }
}
