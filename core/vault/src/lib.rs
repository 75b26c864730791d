//! Vault engine for ClassVault.
//!
//! This crate composes key derivation, encryption, integrity checking,
//! access control and the two logging paths into the user-facing flows:
//! shared-file storage (teacher/student pool) and personal-vault storage.
//!
//! # Architecture
//! The [`VaultStore`] orchestrator sits between the (excluded) web layer and
//! the blob store, handling all encryption and decryption transparently and
//! writing to the audit trail and security log as the last steps of every
//! operation.

pub mod access;
pub mod catalog;
pub mod config;
pub mod object;
pub mod store;

pub use catalog::Catalog;
pub use config::{VaultConfig, CATALOG_FILENAME};
pub use object::{
    AccessLogEntry, Category, StoredObject, StoredObjectRef, VaultItemDetails, VaultMetadata,
};
pub use store::{RequestContext, RetrievedObject, VaultStore};
