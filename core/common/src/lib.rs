//! Common types shared across ClassVault modules.
//!
//! This crate provides the error taxonomy and the foundational domain types
//! (principals, roles, scopes, identifiers) used by every other crate in the
//! workspace.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ObjectId, Principal, PrincipalId, Role, Scope, SensitiveBytes, StorageKey};
