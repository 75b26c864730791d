//! Vault orchestrator: the user-facing storage flows.
//!
//! Every operation runs the same straight-line sequence: authorize, do the
//! cryptographic work, move the blob, update the catalog, then log. Blob
//! writes land before their metadata so a crash never leaves a catalog entry
//! pointing at nothing. Audit and security logging are best-effort: a logging
//! failure is reported through `tracing` and never fails the operation that
//! triggered it.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use classvault_audit::{
    AuditAction, AuditDetails, AuditRecord, AuditSink, EventStatus, SecurityEvent, SecurityLog,
    EVENT_FILE_DELETE, EVENT_FILE_DOWNLOAD, EVENT_FILE_UPLOAD,
};
use classvault_common::{Error, ObjectId, Principal, Result, Scope, StorageKey};
use classvault_crypto::{cipher, integrity, Iv, KeyDerivation};
use classvault_storage::BlobStore;

use crate::access;
use crate::catalog::Catalog;
use crate::config::{VaultConfig, CATALOG_FILENAME};
use crate::object::{
    AccessLogEntry, StoredObject, StoredObjectRef, VaultItemDetails, VaultMetadata,
};

/// Per-request caller identity and connection facts, carried into every
/// operation for authorization and logging.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub principal: Principal,
    /// Network origin of the request, e.g. a client IP.
    pub origin: String,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn new(principal: Principal, origin: impl Into<String>, user_agent: Option<String>) -> Self {
        Self {
            principal,
            origin: origin.into(),
            user_agent,
        }
    }
}

/// Decrypted object returned from [`VaultStore::retrieve`].
pub struct RetrievedObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub original_name: String,
}

/// The vault engine.
///
/// Owns the derived keys, the object catalog and handles to the blob store
/// and both logging sinks. Callers never see ciphertext, IVs or keys; they
/// hand in plaintext and get plaintext back.
pub struct VaultStore {
    keys: KeyDerivation,
    blobs: Arc<dyn BlobStore>,
    catalog: Catalog,
    catalog_key: StorageKey,
    /// Serializes snapshot-plus-put in `persist_catalog`: snapshots must land
    /// in the order they were taken, or a staler snapshot overwrites a newer
    /// one and rolls back a committed mutation in the persisted state.
    persist_lock: tokio::sync::Mutex<()>,
    audit: Arc<dyn AuditSink>,
    security: Arc<dyn SecurityLog>,
}

impl VaultStore {
    /// Open the vault: derive keys from configuration and load the persisted
    /// catalog snapshot if one exists.
    ///
    /// # Errors
    /// - `Error::Config` if the configuration is unusable (fatal at startup)
    /// - `Error::Serialization` if a persisted catalog snapshot is corrupt
    /// - `Error::Storage` if the snapshot cannot be read
    pub async fn open(
        config: VaultConfig,
        blobs: Arc<dyn BlobStore>,
        audit: Arc<dyn AuditSink>,
        security: Arc<dyn SecurityLog>,
    ) -> Result<Self> {
        let keys = KeyDerivation::new(config.master_secret(), config.kdf_salt())?;
        let catalog_key = StorageKey::new(CATALOG_FILENAME)?;

        let catalog = if blobs.exists(&catalog_key).await? {
            let snapshot = blobs.get(&catalog_key).await?;
            let catalog = Catalog::from_snapshot(&snapshot)?;
            info!(provider = blobs.name(), "Loaded catalog snapshot");
            catalog
        } else {
            info!(provider = blobs.name(), "Starting with empty catalog");
            Catalog::new()
        };

        Ok(Self {
            keys,
            blobs,
            catalog,
            catalog_key,
            persist_lock: tokio::sync::Mutex::new(()),
            audit,
            security,
        })
    }

    /// Encrypt and store a payload in the given scope.
    ///
    /// Vault-scope uploads take [`VaultItemDetails`]; shared-scope uploads
    /// ignore them.
    ///
    /// # Errors
    /// - `Error::InvalidInput` if the payload is empty
    /// - `Error::AccessDenied` if the principal may not write to the scope
    /// - `Error::Storage` if the blob or catalog write fails
    pub async fn store(
        &self,
        ctx: &RequestContext,
        scope: Scope,
        original_name: &str,
        content_type: &str,
        payload: Vec<u8>,
        details: Option<VaultItemDetails>,
    ) -> Result<StoredObjectRef> {
        if payload.is_empty() {
            return Err(Error::InvalidInput("Cannot store an empty payload".to_string()));
        }

        debug!(
            principal = %ctx.principal.id,
            %scope,
            name = original_name,
            size = payload.len(),
            "Storing object"
        );

        match self
            .store_inner(ctx, scope, original_name, content_type, payload, details)
            .await
        {
            Ok(stored) => {
                self.log_audit(ctx, AuditAction::Write, scope, &stored.id, original_name, None)
                    .await;
                self.log_event(
                    EVENT_FILE_UPLOAD,
                    ctx,
                    EventStatus::Success,
                    format!("File \"{}\" encrypted and stored in {}", original_name, scope),
                )
                .await;
                info!(principal = %ctx.principal.id, id = %stored.id, "Object stored");
                Ok(stored)
            }
            Err(err) => {
                self.log_event(
                    EVENT_FILE_UPLOAD,
                    ctx,
                    EventStatus::Error,
                    format!("Failed to store \"{}\": {}", original_name, err),
                )
                .await;
                Err(err)
            }
        }
    }

    async fn store_inner(
        &self,
        ctx: &RequestContext,
        scope: Scope,
        original_name: &str,
        content_type: &str,
        payload: Vec<u8>,
        details: Option<VaultItemDetails>,
    ) -> Result<StoredObjectRef> {
        if !access::can_write(&ctx.principal, scope) {
            return Err(Error::AccessDenied(format!(
                "{} may not write to {} scope",
                ctx.principal.id, scope
            )));
        }

        let key = self.keys.scoped_key(scope, &ctx.principal.id);
        let hash = integrity::digest(&payload);
        let size = payload.len() as u64;
        let (iv, ciphertext) = cipher::encrypt(&key, &payload);

        let now = Utc::now();
        let vault = match scope {
            Scope::Vault => {
                let details = details.unwrap_or_default();
                Some(VaultMetadata {
                    category: details.category,
                    description: details.description,
                    tags: details.tags,
                    last_accessed: now,
                })
            }
            Scope::Shared => None,
        };

        let object = StoredObject {
            id: ObjectId::generate(),
            storage_key: StorageKey::generate(),
            original_name: original_name.to_string(),
            size,
            content_type: content_type.to_string(),
            owner: ctx.principal.id.clone(),
            owner_name: ctx.principal.display_name.clone(),
            owner_role: ctx.principal.role,
            created_at: now,
            iv: iv.to_hex(),
            hash,
            scope,
            vault,
            access_log: Vec::new(),
        };
        let stored_ref = object.to_ref();

        // Blob first, metadata second: a failure here leaves at worst an
        // orphaned blob, never a dangling catalog entry.
        self.blobs.put(&object.storage_key, ciphertext).await?;
        self.catalog.insert(object).await?;
        self.persist_catalog().await?;

        Ok(stored_ref)
    }

    /// Fetch, decrypt and verify an object addressed by storage key within a
    /// scope.
    ///
    /// A successful read appends to the object's access log and, for vault
    /// objects, bumps `last_accessed`.
    ///
    /// # Errors
    /// - `Error::NotFound` if no object exists under the key in that scope
    /// - `Error::AccessDenied` if the visibility rules exclude the principal
    /// - `Error::Integrity` if decryption fails or the digest does not match
    pub async fn retrieve(
        &self,
        ctx: &RequestContext,
        scope: Scope,
        key: &StorageKey,
    ) -> Result<RetrievedObject> {
        match self.retrieve_inner(ctx, scope, key).await {
            Ok((object, retrieved)) => {
                self.log_audit(
                    ctx,
                    AuditAction::Read,
                    scope,
                    &object.id,
                    &object.original_name,
                    None,
                )
                .await;
                self.log_event(
                    EVENT_FILE_DOWNLOAD,
                    ctx,
                    EventStatus::Success,
                    format!("File \"{}\" decrypted and delivered", object.original_name),
                )
                .await;
                debug!(principal = %ctx.principal.id, id = %object.id, "Object retrieved");
                Ok(retrieved)
            }
            Err(err) => {
                // A miss reveals nothing worth alerting on; everything else
                // (denied access, integrity failure) is security-relevant.
                if !matches!(err, Error::NotFound(_)) {
                    self.log_event(
                        EVENT_FILE_DOWNLOAD,
                        ctx,
                        EventStatus::Error,
                        format!("Failed to retrieve \"{}\": {}", key, err),
                    )
                    .await;
                }
                Err(err)
            }
        }
    }

    async fn retrieve_inner(
        &self,
        ctx: &RequestContext,
        scope: Scope,
        key: &StorageKey,
    ) -> Result<(StoredObject, RetrievedObject)> {
        let object = self
            .catalog
            .get_by_key(key)
            .await
            .filter(|obj| obj.scope == scope)
            .ok_or_else(|| Error::NotFound(format!("Object not found: {}", key)))?;

        if !access::can_read(&ctx.principal, &object) {
            return Err(Error::AccessDenied(format!(
                "{} may not read object {}",
                ctx.principal.id, object.id
            )));
        }

        // Keys are derived from the owner, not the reader: a teacher reading
        // a student's shared upload must reconstruct the student's key.
        let key_material = self.keys.scoped_key(object.scope, &object.owner);
        let iv = Iv::from_hex(&object.iv)?;
        let ciphertext = self.blobs.get(&object.storage_key).await?;
        let plaintext = cipher::decrypt(&key_material, &iv, &ciphertext)?;

        if !integrity::verify(&plaintext, &object.hash) {
            return Err(Error::Integrity(format!(
                "Digest mismatch for object {}",
                object.id
            )));
        }

        self.catalog
            .record_access(
                &object.id,
                AccessLogEntry {
                    principal: ctx.principal.id.clone(),
                    action: AuditAction::Read,
                    timestamp: Utc::now(),
                    origin: ctx.origin.clone(),
                },
            )
            .await?;
        self.persist_catalog().await?;

        let retrieved = RetrievedObject {
            bytes: plaintext,
            content_type: object.content_type.clone(),
            original_name: object.original_name.clone(),
        };
        Ok((object, retrieved))
    }

    /// Delete an object and its encrypted blob.
    ///
    /// # Errors
    /// - `Error::NotFound` if no object exists under the id in that scope
    /// - `Error::AccessDenied` if the principal is not the owner
    /// - `Error::Storage` if the encrypted blob is already missing, which is
    ///   surfaced rather than papered over
    pub async fn remove(&self, ctx: &RequestContext, scope: Scope, id: &ObjectId) -> Result<()> {
        match self.remove_inner(ctx, scope, id).await {
            Ok(object) => {
                self.log_audit(
                    ctx,
                    AuditAction::Delete,
                    scope,
                    id,
                    &object.original_name,
                    None,
                )
                .await;
                self.log_event(
                    EVENT_FILE_DELETE,
                    ctx,
                    EventStatus::Success,
                    format!("File \"{}\" deleted", object.original_name),
                )
                .await;
                info!(principal = %ctx.principal.id, %id, "Object deleted");
                Ok(())
            }
            Err(err) => {
                if !matches!(err, Error::NotFound(_)) {
                    self.log_event(
                        EVENT_FILE_DELETE,
                        ctx,
                        EventStatus::Error,
                        format!("Failed to delete object {}: {}", id, err),
                    )
                    .await;
                }
                Err(err)
            }
        }
    }

    async fn remove_inner(
        &self,
        ctx: &RequestContext,
        scope: Scope,
        id: &ObjectId,
    ) -> Result<StoredObject> {
        let object = self
            .catalog
            .get(id)
            .await
            .filter(|obj| obj.scope == scope)
            .ok_or_else(|| Error::NotFound(format!("Object not found: {}", id)))?;

        if !access::can_delete(&ctx.principal, &object) {
            return Err(Error::AccessDenied(format!(
                "{} may not delete object {}",
                ctx.principal.id, object.id
            )));
        }

        match self.blobs.delete(&object.storage_key).await {
            Ok(()) => {}
            Err(Error::NotFound(_)) => {
                // The catalog said the blob exists. Surface the divergence
                // instead of silently completing the delete.
                return Err(Error::Storage(format!(
                    "Encrypted blob missing for object {}",
                    object.id
                )));
            }
            Err(err) => return Err(err),
        }

        let object = self.catalog.remove(id).await?;
        self.persist_catalog().await?;
        Ok(object)
    }

    /// Objects visible to the caller within a scope, newest first.
    pub async fn list_for(&self, ctx: &RequestContext, scope: Scope) -> Vec<StoredObjectRef> {
        self.catalog.list_for(&ctx.principal, scope).await
    }

    /// Audit history for one object, newest first.
    pub async fn history_for(&self, id: &ObjectId) -> Result<Vec<AuditRecord>> {
        self.audit.history_for(id).await
    }

    /// Security events visible to the caller, newest first.
    pub async fn security_log(&self, ctx: &RequestContext) -> Result<Vec<SecurityEvent>> {
        self.security.query(&ctx.principal).await
    }

    async fn persist_catalog(&self) -> Result<()> {
        // Held across both steps: each snapshot written here was taken after
        // the previous write completed, so the last write to land contains
        // every mutation committed before it.
        let _guard = self.persist_lock.lock().await;
        let snapshot = self.catalog.snapshot().await?;
        self.blobs.put(&self.catalog_key, snapshot).await
    }

    async fn log_audit(
        &self,
        ctx: &RequestContext,
        action: AuditAction,
        scope: Scope,
        id: &ObjectId,
        original_name: &str,
        note: Option<String>,
    ) {
        let record = AuditRecord::new(
            ctx.principal.id.clone(),
            action,
            scope,
            id.clone(),
            AuditDetails {
                original_name: original_name.to_string(),
                note,
            },
            ctx.origin.clone(),
            ctx.user_agent.clone(),
        );
        if let Err(err) = self.audit.append(record).await {
            warn!(%err, "Audit append failed");
        }
    }

    async fn log_event(&self, event: &str, ctx: &RequestContext, status: EventStatus, details: String) {
        if let Err(err) = self
            .security
            .record(event, Some(&ctx.principal), status, details, &ctx.origin)
            .await
        {
            warn!(%err, "Security event append failed");
        }
    }
}
