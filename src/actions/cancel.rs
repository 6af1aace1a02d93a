use chrono::Utc;
use uuid::Uuid;

use crate::error::MembershipError;
use crate::events::{dispatch, MembershipEvent};
use crate::guard::ensure_manager;
use crate::repository::{InviteRepository, MembershipRepository};
use crate::types::Identity;

/// Action to cancel a pending invite.
///
/// Deletion is scoped to the workspace, so an invite id from another tenant
/// can never be cancelled through it.
pub struct CancelInvite<I, M>
where
    I: InviteRepository,
    M: MembershipRepository,
{
    invites: I,
    memberships: M,
}

impl<I, M> CancelInvite<I, M>
where
    I: InviteRepository,
    M: MembershipRepository,
{
    pub fn new(invites: I, memberships: M) -> Self {
        Self {
            invites,
            memberships,
        }
    }

    /// Cancels the invite.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - invite deleted
    /// - `Err(Unauthorized)` - no authenticated caller
    /// - `Err(Forbidden)` - caller is not an owner/admin member
    /// - `Err(NotFound)` - no such pending invite in this workspace
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "cancel_invite", skip_all, err)
    )]
    pub async fn execute(
        &self,
        caller: Option<&Identity>,
        workspace_id: Uuid,
        invite_id: Uuid,
    ) -> Result<(), MembershipError> {
        let caller = caller.ok_or(MembershipError::Unauthorized)?;

        let membership = self
            .memberships
            .find_by_workspace_and_user(workspace_id, caller.user_id)
            .await?;
        ensure_manager(membership)?;

        if !self.invites.delete_scoped(invite_id, workspace_id).await? {
            return Err(MembershipError::NotFound);
        }

        log::info!(
            target: "anteroom",
            "msg=\"invite cancelled\", workspace_id={workspace_id}, invite_id={invite_id}, cancelled_by={}",
            caller.user_id
        );

        dispatch(MembershipEvent::InviteCancelled {
            workspace_id,
            invite_id,
            cancelled_by: caller.user_id,
            at: Utc::now(),
        })
        .await;

        Ok(())
    }
}
