//! Blob store trait definition.

use async_trait::async_trait;

use classvault_common::{Result, StorageKey};

/// Storage backend for encrypted blobs.
///
/// Keys form a flat namespace; the bytes under a key are immutable in intent
/// (updates create a new object under a new key), though `put` will overwrite
/// so crash recovery can re-run a write.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Get the backend name (e.g., "memory", "local").
    fn name(&self) -> &str;

    /// Store a blob under a key.
    ///
    /// # Postconditions
    /// - The blob is durably persisted before this returns Ok
    ///
    /// # Errors
    /// - `Error::Storage` or `Error::Io` on backend failure
    async fn put(&self, key: &StorageKey, data: Vec<u8>) -> Result<()>;

    /// Fetch the complete blob stored under a key.
    ///
    /// # Errors
    /// - `Error::NotFound` if no blob exists under the key
    async fn get(&self, key: &StorageKey) -> Result<Vec<u8>>;

    /// Remove the blob stored under a key.
    ///
    /// # Errors
    /// - `Error::NotFound` if no blob exists under the key
    async fn delete(&self, key: &StorageKey) -> Result<()>;

    /// Check whether a blob exists under a key.
    async fn exists(&self, key: &StorageKey) -> Result<bool>;
}
