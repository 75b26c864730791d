//! Cryptographic primitives for ClassVault.
//!
//! This crate provides:
//! - Master key derivation with scrypt, computed once at startup
//! - Per-principal vault key derivation with PBKDF2-HMAC-SHA512
//! - AES-256-CBC encryption with a fresh random IV per operation
//! - SHA-256 content digests for integrity verification
//!
//! # Security Guarantees
//! - All key material is automatically zeroized on drop
//! - No plaintext or key material is ever logged
//! - Digest comparison is constant-time

pub mod cipher;
pub mod integrity;
pub mod kdf;
pub mod keys;

pub use cipher::{decrypt, encrypt, BLOCK_LENGTH};
pub use integrity::{digest, verify};
pub use kdf::KeyDerivation;
pub use keys::{Iv, MasterKey, Salt, ScopedKey, IV_LENGTH, KEY_LENGTH};
