//! Blob storage abstraction for ClassVault.
//!
//! Encrypted bytes are addressed by opaque storage keys in a flat keyspace.
//! The store never sees plaintext or metadata; everything above the key is
//! the vault crate's concern.
//!
//! # Design Principles
//! - Backend isolation: no backend-specific logic in vault or crypto modules
//! - Async operations: all I/O is async
//! - Unified error semantics: consistent error types across backends

pub mod local;
pub mod memory;
pub mod store;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use store::BlobStore;
