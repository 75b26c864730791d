//! Access control decisions.
//!
//! Pure functions over a principal and an object record; no side effects.
//! Denial is reported by the orchestrator as `Error::AccessDenied`, never a
//! crash.

use crate::object::StoredObject;
use classvault_common::{Principal, Role, Scope};

/// May the principal read this object?
///
/// Shared scope is asymmetric: teachers see every shared object, students
/// see only teacher-authored ones. Vault scope is strictly owner-only.
pub fn can_read(principal: &Principal, object: &StoredObject) -> bool {
    match object.scope {
        Scope::Shared => match principal.role {
            Role::Teacher => true,
            Role::Student => object.owner_role == Role::Teacher,
        },
        Scope::Vault => object.owner == principal.id,
    }
}

/// May the principal write into this scope?
///
/// Any authenticated principal may write. Quotas are explicitly out of
/// scope; callers wanting them must enforce them outside this subsystem.
pub fn can_write(_principal: &Principal, _scope: Scope) -> bool {
    true
}

/// May the principal delete this object?
///
/// Owner-only, in both scopes.
pub fn can_delete(principal: &Principal, object: &StoredObject) -> bool {
    object.owner == principal.id
}
