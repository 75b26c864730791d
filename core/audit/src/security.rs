//! Append-only security event log with role-scoped visibility.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use classvault_common::{Principal, Result, Role};

/// Actor name recorded when no principal is known (e.g. a failed login
/// before the account is resolved).
pub const ANONYMOUS_ACTOR: &str = "Anonymous";

/// Maximum number of events returned by a single query.
pub const SECURITY_LOG_QUERY_CAP: usize = 100;

/// Event name for uploads into either scope.
pub const EVENT_FILE_UPLOAD: &str = "File Upload";
/// Event name for downloads from either scope.
pub const EVENT_FILE_DOWNLOAD: &str = "File Download";
/// Event name for deletions from either scope.
pub const EVENT_FILE_DELETE: &str = "File Delete";

/// Outcome recorded with a security event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Success,
    Error,
}

/// One security-relevant event.
///
/// `actor_name` is a plain string, not a principal reference, so events
/// survive principal deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub timestamp: DateTime<Utc>,
    pub event: String,
    pub actor_name: String,
    pub status: EventStatus,
    pub details: String,
    pub origin: String,
}

/// Sink and query surface for security events.
#[async_trait]
pub trait SecurityLog: Send + Sync {
    /// Append an event. A `None` principal is recorded as "Anonymous".
    async fn record(
        &self,
        event: &str,
        principal: Option<&Principal>,
        status: EventStatus,
        details: String,
        origin: &str,
    ) -> Result<()>;

    /// Events visible to the requesting principal, newest first, capped at
    /// [`SECURITY_LOG_QUERY_CAP`].
    ///
    /// Teachers see every event. Students see only events whose actor name
    /// equals their own display name. The filter is name-based, not
    /// id-based, preserved from the source system; see DESIGN.md.
    async fn query(&self, requesting: &Principal) -> Result<Vec<SecurityEvent>>;
}

/// In-memory security event log.
#[derive(Default)]
pub struct MemorySecurityLog {
    events: RwLock<Vec<SecurityEvent>>,
}

impl MemorySecurityLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecurityLog for MemorySecurityLog {
    async fn record(
        &self,
        event: &str,
        principal: Option<&Principal>,
        status: EventStatus,
        details: String,
        origin: &str,
    ) -> Result<()> {
        let actor_name = principal
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| ANONYMOUS_ACTOR.to_string());

        self.events.write().await.push(SecurityEvent {
            timestamp: Utc::now(),
            event: event.to_string(),
            actor_name,
            status,
            details,
            origin: origin.to_string(),
        });
        Ok(())
    }

    async fn query(&self, requesting: &Principal) -> Result<Vec<SecurityEvent>> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .rev()
            .filter(|e| match requesting.role {
                Role::Teacher => true,
                Role::Student => e.actor_name == requesting.display_name,
            })
            .take(SECURITY_LOG_QUERY_CAP)
            .cloned()
            .collect())
    }
}
