//! Audit and security-event logging for ClassVault.
//!
//! Two append-only paths record every access:
//! - the audit trail: structured records of actions against resources,
//!   queryable by resource or by actor;
//! - the security event log: a narrative log of security-relevant events
//!   with role-scoped visibility on read.
//!
//! Both are best-effort relative to the business operation that triggers
//! them: the orchestrator swallows append failures rather than letting a log
//! write mask the primary result.

pub mod security;
pub mod trail;

pub use security::{
    EventStatus, MemorySecurityLog, SecurityEvent, SecurityLog, ANONYMOUS_ACTOR,
    EVENT_FILE_DELETE, EVENT_FILE_DOWNLOAD, EVENT_FILE_UPLOAD, SECURITY_LOG_QUERY_CAP,
};
pub use trail::{AuditAction, AuditDetails, AuditRecord, AuditSink, MemoryAuditTrail};
