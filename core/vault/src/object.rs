//! Persisted object metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use classvault_audit::AuditAction;
use classvault_common::{ObjectId, PrincipalId, Role, Scope, StorageKey};

/// Category tag for personal-vault items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Credentials,
    Research,
    Academic,
    Exam,
    #[default]
    Other,
}

/// Vault-scope extension of a stored object.
///
/// `last_accessed` is the only mutable field on an object; it is bumped on
/// each successful read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultMetadata {
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub last_accessed: DateTime<Utc>,
}

/// Caller-supplied details for a vault-scope upload.
#[derive(Debug, Clone, Default)]
pub struct VaultItemDetails {
    pub category: Category,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// One entry in a stored object's access history. Never removed or edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessLogEntry {
    pub principal: PrincipalId,
    pub action: AuditAction,
    pub timestamp: DateTime<Utc>,
    pub origin: String,
}

/// Metadata record for one encrypted blob.
///
/// `iv` and `hash` are set exactly once at creation and never mutated; the
/// encrypted bytes under `storage_key` are immutable after write. An update
/// creates a new object rather than mutating one in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredObject {
    pub id: ObjectId,
    pub storage_key: StorageKey,
    pub original_name: String,
    pub size: u64,
    pub content_type: String,
    pub owner: PrincipalId,
    /// Display name of the owner at upload time, for listings.
    pub owner_name: String,
    /// Role of the owner at upload time. Principals are immutable, so this
    /// stands in for the source system's live teacher-table lookup when
    /// deciding shared-scope visibility.
    pub owner_role: Role,
    pub created_at: DateTime<Utc>,
    /// Hex-encoded initialization vector.
    pub iv: String,
    /// Hex-encoded SHA-256 digest of the plaintext.
    pub hash: String,
    pub scope: Scope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault: Option<VaultMetadata>,
    pub access_log: Vec<AccessLogEntry>,
}

impl StoredObject {
    /// Listing view of this object: everything a caller needs to address and
    /// display it, without the access history.
    pub fn to_ref(&self) -> StoredObjectRef {
        StoredObjectRef {
            id: self.id.clone(),
            storage_key: self.storage_key.clone(),
            original_name: self.original_name.clone(),
            size: self.size,
            content_type: self.content_type.clone(),
            uploader: self.owner_name.clone(),
            created_at: self.created_at,
            scope: self.scope,
            vault: self.vault.clone(),
        }
    }
}

/// Reference to a stored object, as returned from `store` and `list_for`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredObjectRef {
    pub id: ObjectId,
    pub storage_key: StorageKey,
    pub original_name: String,
    pub size: u64,
    pub content_type: String,
    pub uploader: String,
    pub created_at: DateTime<Utc>,
    pub scope: Scope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault: Option<VaultMetadata>,
}
