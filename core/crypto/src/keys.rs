//! Key types with secure memory handling.
//!
//! All key types automatically zeroize their memory on drop to prevent
//! sensitive data from persisting in memory.

use classvault_common::{Error, Result};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of encryption keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Length of CBC initialization vectors in bytes (one AES block).
pub const IV_LENGTH: usize = 16;

/// Master key derived from the long-term secret at process start.
///
/// Encrypts shared-scope objects directly and seeds the per-principal
/// vault key derivation.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    key: [u8; KEY_LENGTH],
}

impl MasterKey {
    /// Create a master key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterKey([REDACTED])")
    }
}

/// Key scoped to one encryption domain: the shared pool, or a single
/// principal's personal vault.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ScopedKey {
    key: [u8; KEY_LENGTH],
}

impl ScopedKey {
    /// Create a scoped key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for ScopedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopedKey([REDACTED])")
    }
}

/// Salt for master key derivation.
///
/// Fixed for the lifetime of a deployment; changing it changes every derived
/// key and orphans all existing ciphertext.
#[derive(Debug, Clone)]
pub struct Salt(Vec<u8>);

impl Salt {
    /// Create a salt from bytes.
    ///
    /// # Errors
    /// - Returns error if the salt is empty
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::Config("KDF salt cannot be empty".to_string()));
        }
        Ok(Self(bytes))
    }

    /// Generate a random 32-byte salt.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut salt = vec![0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut salt);
        Self(salt)
    }

    /// Get the salt bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Per-encryption random initialization vector.
///
/// Stored alongside the ciphertext as a hex string; set exactly once at
/// creation and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iv([u8; IV_LENGTH]);

impl Iv {
    /// Generate a fresh cryptographically random IV.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut iv = [0u8; IV_LENGTH];
        rand::rngs::OsRng.fill_bytes(&mut iv);
        Self(iv)
    }

    /// Create an IV from raw bytes.
    pub fn from_bytes(bytes: [u8; IV_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse an IV from its hex representation.
    ///
    /// # Errors
    /// - Returns `Error::Integrity` if the string is not 16 hex-encoded bytes,
    ///   since a mangled IV means the stored record cannot decrypt its blob
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|_| Error::Integrity("IV is not valid hex".to_string()))?;
        let bytes: [u8; IV_LENGTH] = bytes
            .try_into()
            .map_err(|_| Error::Integrity("IV has wrong length".to_string()))?;
        Ok(Self(bytes))
    }

    /// Hex representation, as persisted in object metadata.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get the IV bytes.
    pub fn as_bytes(&self) -> &[u8; IV_LENGTH] {
        &self.0
    }
}
