//! Common error types for ClassVault.

use thiserror::Error;

/// Top-level error type for ClassVault operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Authorization failure. Reported to the caller, never fatal.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// No such object, or no such blob in the underlying store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Hash or decryption mismatch. Distinct from absence because it may
    /// indicate tampering.
    #[error("Integrity check failed: {0}")]
    Integrity(String),

    /// I/O failure reading or writing the blob or metadata store.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Missing or invalid master secret or salt at startup. Fatal.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cryptographic operation failed.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
