//! Stateless role-hierarchy checks consulted by every mutating operation.
//!
//! Predicates are pure and re-evaluated per call; nothing is cached.
//! Repositories perform no authorization of their own, so an operation must
//! pass through here before any privileged store access.

use crate::error::{ForbiddenReason, MembershipError};
use crate::types::{WorkspaceMembership, WorkspaceRole};

/// Whether `role` may create or cancel invites and remove members.
pub fn can_manage(role: WorkspaceRole) -> bool {
    matches!(role, WorkspaceRole::Owner | WorkspaceRole::Admin)
}

/// Requires any accepted membership, returning it.
pub fn ensure_member(
    membership: Option<WorkspaceMembership>,
) -> Result<WorkspaceMembership, MembershipError> {
    membership.ok_or(MembershipError::Forbidden(ForbiddenReason::NotMember))
}

/// Requires an accepted membership with a managing role, returning it.
pub fn ensure_manager(
    membership: Option<WorkspaceMembership>,
) -> Result<WorkspaceMembership, MembershipError> {
    let membership = ensure_member(membership)?;
    if can_manage(membership.role) {
        Ok(membership)
    } else {
        Err(MembershipError::Forbidden(ForbiddenReason::NotManager))
    }
}

/// Checks every condition for removing `target` on behalf of `caller`:
/// no self-removal (any role), caller must manage, owner is untouchable.
pub fn ensure_removal_allowed(
    caller: &WorkspaceMembership,
    target: &WorkspaceMembership,
) -> Result<(), MembershipError> {
    if caller.user_id == target.user_id {
        return Err(MembershipError::Forbidden(ForbiddenReason::SelfRemoval));
    }
    if !can_manage(caller.role) {
        return Err(MembershipError::Forbidden(ForbiddenReason::NotManager));
    }
    if target.role == WorkspaceRole::Owner {
        return Err(MembershipError::Forbidden(ForbiddenReason::OwnerProtected));
    }
    Ok(())
}
