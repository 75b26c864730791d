//! Append-only audit trail of actions against resources.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use classvault_common::{ObjectId, PrincipalId, Result, Scope};

/// Action recorded against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Read,
    Write,
    Delete,
}

/// Structured detail payload for an audit record.
///
/// The source system stored a free-form object here; every call site only
/// ever carried a filename and an occasional note, so the schema is fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditDetails {
    /// Original (pre-encryption) name of the file involved.
    pub original_name: String,
    /// Optional free text, e.g. a failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One row of the audit trail.
///
/// Rows are owned by the subsystem, not by any principal: the actor reference
/// may dangle after principal deletion, which is acceptable for history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub actor: PrincipalId,
    pub action: AuditAction,
    /// Which partition the resource lives in (shared pool or personal vault).
    pub resource: Scope,
    pub resource_id: ObjectId,
    pub details: AuditDetails,
    pub origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    /// Build a record timestamped now.
    pub fn new(
        actor: PrincipalId,
        action: AuditAction,
        resource: Scope,
        resource_id: ObjectId,
        details: AuditDetails,
        origin: impl Into<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            actor,
            action,
            resource,
            resource_id,
            details,
            origin: origin.into(),
            user_agent,
            timestamp: Utc::now(),
        }
    }
}

/// Sink for audit records.
///
/// Appends are best-effort from the caller's point of view: the orchestrator
/// traps and reports failures instead of propagating them into the primary
/// operation's result.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append a record. Records are never edited or removed afterwards.
    async fn append(&self, record: AuditRecord) -> Result<()>;

    /// All records touching a resource, newest first.
    async fn history_for(&self, resource_id: &ObjectId) -> Result<Vec<AuditRecord>>;

    /// All records produced by an actor, newest first.
    async fn activity_for(&self, actor: &PrincipalId) -> Result<Vec<AuditRecord>>;
}

/// In-memory audit trail.
#[derive(Default)]
pub struct MemoryAuditTrail {
    records: RwLock<Vec<AuditRecord>>,
}

impl MemoryAuditTrail {
    /// Create a new empty trail.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditTrail {
    async fn append(&self, record: AuditRecord) -> Result<()> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn history_for(&self, resource_id: &ObjectId) -> Result<Vec<AuditRecord>> {
        let records = self.records.read().await;
        // Appends happen in timestamp order, so reverse iteration is
        // newest-first without a sort.
        Ok(records
            .iter()
            .rev()
            .filter(|r| &r.resource_id == resource_id)
            .cloned()
            .collect())
    }

    async fn activity_for(&self, actor: &PrincipalId) -> Result<Vec<AuditRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .filter(|r| &r.actor == actor)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(actor: &str, resource_id: &ObjectId, name: &str) -> AuditRecord {
        AuditRecord::new(
            PrincipalId::new(actor).unwrap(),
            AuditAction::Read,
            Scope::Shared,
            resource_id.clone(),
            AuditDetails {
                original_name: name.to_string(),
                note: None,
            },
            "127.0.0.1",
            Some("test-agent".to_string()),
        )
    }

    #[tokio::test]
    async fn test_history_for_filters_and_orders_newest_first() {
        let trail = MemoryAuditTrail::new();
        let target = ObjectId::generate();
        let other = ObjectId::generate();

        trail.append(record("u1", &target, "first.pdf")).await.unwrap();
        trail.append(record("u2", &other, "other.pdf")).await.unwrap();
        trail.append(record("u1", &target, "second.pdf")).await.unwrap();

        let history = trail.history_for(&target).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].details.original_name, "second.pdf");
        assert_eq!(history[1].details.original_name, "first.pdf");
    }

    #[tokio::test]
    async fn test_activity_for_filters_by_actor() {
        let trail = MemoryAuditTrail::new();
        let resource = ObjectId::generate();

        trail.append(record("alice", &resource, "a.pdf")).await.unwrap();
        trail.append(record("bob", &resource, "b.pdf")).await.unwrap();

        let activity = trail
            .activity_for(&PrincipalId::new("alice").unwrap())
            .await
            .unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].details.original_name, "a.pdf");
    }

    #[test]
    fn test_action_serializes_uppercase() {
        let json = serde_json::to_string(&AuditAction::Read).unwrap();
        assert_eq!(json, "\"READ\"");
    }
}
