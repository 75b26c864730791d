//! Object catalog: the metadata table.
//!
//! One record per stored object, indexed by object id and by storage key.
//! The table lives behind a single `RwLock`, so access-log appends and
//! `last_accessed` updates for any one object are serialized and keep causal
//! order. A JSON snapshot is persisted through the blob store by the
//! orchestrator after every mutation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::object::{AccessLogEntry, StoredObject, StoredObjectRef};
use classvault_common::{Error, ObjectId, Principal, Result, Role, Scope, StorageKey};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogState {
    objects: HashMap<String, StoredObject>,
    /// storage key -> object id. Rebuilt on load, never persisted.
    #[serde(skip)]
    by_key: HashMap<String, String>,
}

impl CatalogState {
    fn rebuild_index(&mut self) {
        self.by_key = self
            .objects
            .iter()
            .map(|(id, obj)| (obj.storage_key.as_str().to_string(), id.clone()))
            .collect();
    }
}

/// In-memory metadata table with snapshot persistence.
#[derive(Default)]
pub struct Catalog {
    state: RwLock<CatalogState>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a catalog from a persisted snapshot.
    ///
    /// # Errors
    /// - `Error::Serialization` if the snapshot cannot be parsed
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self> {
        let mut state: CatalogState =
            serde_json::from_slice(bytes).map_err(|e| Error::Serialization(e.to_string()))?;
        state.rebuild_index();
        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Serialize the catalog for persistence.
    pub async fn snapshot(&self) -> Result<Vec<u8>> {
        let state = self.state.read().await;
        serde_json::to_vec(&*state).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Insert a new object record.
    ///
    /// # Errors
    /// - `Error::InvalidInput` if the id or storage key is already present
    pub async fn insert(&self, object: StoredObject) -> Result<()> {
        let mut state = self.state.write().await;

        if state.objects.contains_key(object.id.as_str()) {
            return Err(Error::InvalidInput(format!(
                "Object already cataloged: {}",
                object.id
            )));
        }
        if state.by_key.contains_key(object.storage_key.as_str()) {
            return Err(Error::InvalidInput(format!(
                "Storage key already cataloged: {}",
                object.storage_key
            )));
        }

        state
            .by_key
            .insert(object.storage_key.as_str().to_string(), object.id.as_str().to_string());
        state.objects.insert(object.id.as_str().to_string(), object);
        Ok(())
    }

    /// Look up an object by id.
    pub async fn get(&self, id: &ObjectId) -> Option<StoredObject> {
        self.state.read().await.objects.get(id.as_str()).cloned()
    }

    /// Look up an object by storage key.
    pub async fn get_by_key(&self, key: &StorageKey) -> Option<StoredObject> {
        let state = self.state.read().await;
        let id = state.by_key.get(key.as_str())?;
        state.objects.get(id).cloned()
    }

    /// Remove an object record, returning it.
    ///
    /// # Errors
    /// - `Error::NotFound` if no record exists under the id
    pub async fn remove(&self, id: &ObjectId) -> Result<StoredObject> {
        let mut state = self.state.write().await;
        let object = state
            .objects
            .remove(id.as_str())
            .ok_or_else(|| Error::NotFound(format!("Object not found: {}", id)))?;
        state.by_key.remove(object.storage_key.as_str());
        Ok(object)
    }

    /// Append an access-log entry and, for vault-scope objects, bump
    /// `last_accessed` to the entry timestamp.
    ///
    /// Runs entirely under the write lock: entries for one object land in
    /// the causal order of the reads that produced them.
    pub async fn record_access(&self, id: &ObjectId, entry: AccessLogEntry) -> Result<()> {
        let mut state = self.state.write().await;
        let object = state
            .objects
            .get_mut(id.as_str())
            .ok_or_else(|| Error::NotFound(format!("Object not found: {}", id)))?;

        if let Some(vault) = object.vault.as_mut() {
            vault.last_accessed = entry.timestamp;
        }
        object.access_log.push(entry);
        Ok(())
    }

    /// Objects visible to a principal within a scope, newest first.
    ///
    /// Shared scope follows the asymmetric visibility rules; vault scope is
    /// owner-only.
    pub async fn list_for(&self, principal: &Principal, scope: Scope) -> Vec<StoredObjectRef> {
        let state = self.state.read().await;
        let mut refs: Vec<StoredObjectRef> = state
            .objects
            .values()
            .filter(|obj| obj.scope == scope)
            .filter(|obj| match scope {
                Scope::Shared => match principal.role {
                    Role::Teacher => true,
                    Role::Student => obj.owner_role == Role::Teacher,
                },
                Scope::Vault => obj.owner == principal.id,
            })
            .map(StoredObject::to_ref)
            .collect();

        refs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Category, VaultMetadata};
    use chrono::Utc;
    use classvault_audit::AuditAction;
    use classvault_common::PrincipalId;

    fn principal(id: &str, role: Role) -> Principal {
        Principal::new(PrincipalId::new(id).unwrap(), id, role)
    }

    fn object(owner: &Principal, scope: Scope, name: &str) -> StoredObject {
        StoredObject {
            id: ObjectId::generate(),
            storage_key: StorageKey::generate(),
            original_name: name.to_string(),
            size: 10,
            content_type: "application/pdf".to_string(),
            owner: owner.id.clone(),
            owner_name: owner.display_name.clone(),
            owner_role: owner.role,
            created_at: Utc::now(),
            iv: "00".repeat(16),
            hash: "ab".repeat(32),
            scope,
            vault: match scope {
                Scope::Vault => Some(VaultMetadata {
                    category: Category::Other,
                    description: None,
                    tags: Vec::new(),
                    last_accessed: Utc::now(),
                }),
                Scope::Shared => None,
            },
            access_log: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let catalog = Catalog::new();
        let teacher = principal("t1", Role::Teacher);
        let obj = object(&teacher, Scope::Shared, "syllabus.pdf");
        let id = obj.id.clone();
        let key = obj.storage_key.clone();

        catalog.insert(obj).await.unwrap();

        assert!(catalog.get(&id).await.is_some());
        assert_eq!(catalog.get_by_key(&key).await.unwrap().id, id);
    }

    #[tokio::test]
    async fn test_duplicate_insert_fails() {
        let catalog = Catalog::new();
        let teacher = principal("t1", Role::Teacher);
        let obj = object(&teacher, Scope::Shared, "syllabus.pdf");

        catalog.insert(obj.clone()).await.unwrap();
        assert!(catalog.insert(obj).await.is_err());
    }

    #[tokio::test]
    async fn test_remove_drops_both_indexes() {
        let catalog = Catalog::new();
        let teacher = principal("t1", Role::Teacher);
        let obj = object(&teacher, Scope::Shared, "syllabus.pdf");
        let id = obj.id.clone();
        let key = obj.storage_key.clone();

        catalog.insert(obj).await.unwrap();
        catalog.remove(&id).await.unwrap();

        assert!(catalog.get(&id).await.is_none());
        assert!(catalog.get_by_key(&key).await.is_none());
        assert!(matches!(
            catalog.remove(&id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_record_access_appends_and_touches_vault_timestamp() {
        let catalog = Catalog::new();
        let student = principal("s1", Role::Student);
        let obj = object(&student, Scope::Vault, "notes.txt");
        let id = obj.id.clone();
        let uploaded_at = obj.vault.as_ref().unwrap().last_accessed;

        catalog.insert(obj).await.unwrap();

        let later = uploaded_at + chrono::Duration::seconds(5);
        catalog
            .record_access(
                &id,
                AccessLogEntry {
                    principal: student.id.clone(),
                    action: AuditAction::Read,
                    timestamp: later,
                    origin: "127.0.0.1".to_string(),
                },
            )
            .await
            .unwrap();

        let stored = catalog.get(&id).await.unwrap();
        assert_eq!(stored.access_log.len(), 1);
        assert_eq!(stored.vault.unwrap().last_accessed, later);
    }

    #[tokio::test]
    async fn test_list_for_applies_visibility_rules() {
        let catalog = Catalog::new();
        let teacher = principal("t1", Role::Teacher);
        let student = principal("s1", Role::Student);
        let other = principal("s2", Role::Student);

        catalog.insert(object(&teacher, Scope::Shared, "t.pdf")).await.unwrap();
        catalog.insert(object(&student, Scope::Shared, "s.pdf")).await.unwrap();
        catalog.insert(object(&student, Scope::Vault, "v.txt")).await.unwrap();

        // Teacher sees both shared files.
        assert_eq!(catalog.list_for(&teacher, Scope::Shared).await.len(), 2);
        // Student sees only the teacher-authored shared file.
        let visible = catalog.list_for(&other, Scope::Shared).await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].original_name, "t.pdf");
        // Vault listing is owner-only.
        assert_eq!(catalog.list_for(&student, Scope::Vault).await.len(), 1);
        assert!(catalog.list_for(&other, Scope::Vault).await.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip_rebuilds_key_index() {
        let catalog = Catalog::new();
        let teacher = principal("t1", Role::Teacher);
        let obj = object(&teacher, Scope::Shared, "syllabus.pdf");
        let key = obj.storage_key.clone();

        catalog.insert(obj).await.unwrap();
        let bytes = catalog.snapshot().await.unwrap();

        let restored = Catalog::from_snapshot(&bytes).unwrap();
        assert!(restored.get_by_key(&key).await.is_some());
    }
}
