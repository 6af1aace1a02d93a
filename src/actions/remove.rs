use chrono::Utc;
use uuid::Uuid;

use crate::error::MembershipError;
use crate::events::{dispatch, MembershipEvent};
use crate::guard::ensure_removal_allowed;
use crate::repository::MembershipRepository;
use crate::types::Identity;

/// Action to remove a member from a workspace.
///
/// The owner can never be removed, and no caller can remove themselves;
/// see [`crate::guard::ensure_removal_allowed`] for the full predicate.
pub struct RemoveMember<M>
where
    M: MembershipRepository,
{
    memberships: M,
}

impl<M> RemoveMember<M>
where
    M: MembershipRepository,
{
    pub fn new(memberships: M) -> Self {
        Self { memberships }
    }

    /// Removes `target_user_id` from the workspace.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - membership deleted
    /// - `Err(Unauthorized)` - no authenticated caller
    /// - `Err(Forbidden)` - caller lacks a managing role, target is the
    ///   owner, or the caller targeted themselves
    /// - `Err(NotFound)` - target holds no membership in this workspace
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "remove_member", skip_all, err)
    )]
    pub async fn execute(
        &self,
        caller: Option<&Identity>,
        workspace_id: Uuid,
        target_user_id: Uuid,
    ) -> Result<(), MembershipError> {
        let caller = caller.ok_or(MembershipError::Unauthorized)?;

        let caller_membership = self
            .memberships
            .find_by_workspace_and_user(workspace_id, caller.user_id)
            .await?
            .ok_or(MembershipError::Forbidden(
                crate::error::ForbiddenReason::NotMember,
            ))?;

        let target_membership = self
            .memberships
            .find_by_workspace_and_user(workspace_id, target_user_id)
            .await?
            .ok_or(MembershipError::NotFound)?;

        ensure_removal_allowed(&caller_membership, &target_membership)?;

        if !self
            .memberships
            .delete_by_workspace_and_user(workspace_id, target_user_id)
            .await?
        {
            // Raced with another removal; the end state is what was asked for.
            return Err(MembershipError::NotFound);
        }

        log::info!(
            target: "anteroom",
            "msg=\"member removed\", workspace_id={workspace_id}, user_id={target_user_id}, removed_by={}",
            caller.user_id
        );

        dispatch(MembershipEvent::MemberRemoved {
            workspace_id,
            user_id: target_user_id,
            removed_by: caller.user_id,
            at: Utc::now(),
        })
        .await;

        Ok(())
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::ForbiddenReason;
    use crate::mocks::MockMembershipRepository;
    use crate::repository::NewMembership;
    use crate::types::WorkspaceRole;

    struct Fixture {
        memberships: Arc<MockMembershipRepository>,
        workspace_id: Uuid,
        owner: Identity,
        admin: Identity,
        editor: Identity,
    }

    async fn setup() -> Fixture {
        let memberships = Arc::new(MockMembershipRepository::new());
        let workspace_id = Uuid::new_v4();
        let owner = Identity::new(Uuid::new_v4(), "owner@example.com");
        let admin = Identity::new(Uuid::new_v4(), "admin@example.com");
        let editor = Identity::new(Uuid::new_v4(), "editor@example.com");

        for (identity, role) in [
            (&owner, WorkspaceRole::Owner),
            (&admin, WorkspaceRole::Admin),
            (&editor, WorkspaceRole::Editor),
        ] {
            memberships
                .insert(NewMembership {
                    workspace_id,
                    user_id: identity.user_id,
                    role,
                    invited_by: None,
                    accepted_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        Fixture {
            memberships,
            workspace_id,
            owner,
            admin,
            editor,
        }
    }

    #[tokio::test]
    async fn test_admin_removes_editor() {
        let f = setup().await;
        let action = RemoveMember::new(Arc::clone(&f.memberships));

        action
            .execute(Some(&f.admin), f.workspace_id, f.editor.user_id)
            .await
            .unwrap();

        assert!(f
            .memberships
            .find_by_workspace_and_user(f.workspace_id, f.editor.user_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_owner_is_protected_from_every_caller() {
        let f = setup().await;
        let action = RemoveMember::new(Arc::clone(&f.memberships));

        let err = action
            .execute(Some(&f.admin), f.workspace_id, f.owner.user_id)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            MembershipError::Forbidden(ForbiddenReason::OwnerProtected)
        );

        // Owner targeting themselves trips the self-removal rule first;
        // either way the row survives.
        let err = action
            .execute(Some(&f.owner), f.workspace_id, f.owner.user_id)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            MembershipError::Forbidden(ForbiddenReason::SelfRemoval)
        );

        assert!(f
            .memberships
            .find_by_workspace_and_user(f.workspace_id, f.owner.user_id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_self_removal_forbidden() {
        let f = setup().await;
        let action = RemoveMember::new(Arc::clone(&f.memberships));

        let err = action
            .execute(Some(&f.admin), f.workspace_id, f.admin.user_id)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            MembershipError::Forbidden(ForbiddenReason::SelfRemoval)
        );
    }

    #[tokio::test]
    async fn test_editor_cannot_remove() {
        let f = setup().await;
        let action = RemoveMember::new(Arc::clone(&f.memberships));

        let err = action
            .execute(Some(&f.editor), f.workspace_id, f.admin.user_id)
            .await
            .unwrap_err();
        assert_eq!(err, MembershipError::Forbidden(ForbiddenReason::NotManager));
    }

    #[tokio::test]
    async fn test_non_member_and_unauthenticated_denied() {
        let f = setup().await;
        let action = RemoveMember::new(Arc::clone(&f.memberships));

        let outsider = Identity::new(Uuid::new_v4(), "outsider@example.com");
        let err = action
            .execute(Some(&outsider), f.workspace_id, f.editor.user_id)
            .await
            .unwrap_err();
        assert_eq!(err, MembershipError::Forbidden(ForbiddenReason::NotMember));

        let err = action
            .execute(None, f.workspace_id, f.editor.user_id)
            .await
            .unwrap_err();
        assert_eq!(err, MembershipError::Unauthorized);
    }

    #[tokio::test]
    async fn test_unknown_target_not_found() {
        let f = setup().await;
        let action = RemoveMember::new(Arc::clone(&f.memberships));

        let err = action
            .execute(Some(&f.admin), f.workspace_id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err, MembershipError::NotFound);
    }
}
