use uuid::Uuid;

use crate::config::AnteroomConfig;
use crate::error::{ForbiddenReason, MembershipError};
use crate::repository::{Directory, InviteRepository, MembershipRepository};
use crate::types::{Identity, WorkspaceInvite, WorkspaceMember};

/// Action to list the members of a workspace, joined with directory data.
///
/// The primary path is the privileged roster aggregation (one round trip,
/// pre-joined display names). When that errors or comes back empty, the
/// fallback fetches raw membership rows and batch-resolves display names
/// through the directory. Emails are always batch-resolved through the
/// directory afterward; a member whose address the directory cannot produce
/// is listed without one rather than failing the view.
pub struct ListMembers<M, D>
where
    M: MembershipRepository,
    D: Directory,
{
    memberships: M,
    directory: D,
    config: AnteroomConfig,
}

impl<M, D> ListMembers<M, D>
where
    M: MembershipRepository,
    D: Directory,
{
    pub fn new(memberships: M, directory: D, config: AnteroomConfig) -> Self {
        Self {
            memberships,
            directory,
            config,
        }
    }

    /// Lists the workspace's members, oldest membership first.
    ///
    /// Any accepted member may list; managers decide what to do with the
    /// result.
    ///
    /// # Returns
    ///
    /// - `Ok(members)` - the assembled view
    /// - `Err(Unauthorized)` - no authenticated caller
    /// - `Err(Forbidden(NotMember))` - caller holds no membership here
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "list_members", skip_all, err)
    )]
    pub async fn execute(
        &self,
        caller: Option<&Identity>,
        workspace_id: Uuid,
    ) -> Result<Vec<WorkspaceMember>, MembershipError> {
        let caller = caller.ok_or(MembershipError::Unauthorized)?;
        self.memberships
            .find_by_workspace_and_user(workspace_id, caller.user_id)
            .await?
            .ok_or(MembershipError::Forbidden(ForbiddenReason::NotMember))?;

        let entries = match self.memberships.roster(workspace_id).await {
            Ok(entries) if !entries.is_empty() => entries,
            Ok(_) | Err(_) => self.roster_fallback(workspace_id).await?,
        };

        let user_ids: Vec<Uuid> = entries.iter().map(|e| e.membership.user_id).collect();
        let emails = self.directory.emails_of(&user_ids).await?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let email = emails.get(&entry.membership.user_id).cloned();
                WorkspaceMember {
                    display_name: entry
                        .display_name
                        .unwrap_or_else(|| self.config.placeholder_display_name.clone()),
                    email,
                    membership: entry.membership,
                }
            })
            .collect())
    }

    /// Raw membership rows plus a batch directory lookup, for deployments
    /// where the roster aggregation is unavailable.
    async fn roster_fallback(
        &self,
        workspace_id: Uuid,
    ) -> Result<Vec<crate::repository::RosterEntry>, MembershipError> {
        log::debug!(
            target: "anteroom",
            "msg=\"roster aggregation unavailable, using fallback\", workspace_id={workspace_id}"
        );

        let rows = self.memberships.list_by_workspace(workspace_id).await?;
        let user_ids: Vec<Uuid> = rows.iter().map(|m| m.user_id).collect();
        let names = self.directory.display_names_of(&user_ids).await?;

        Ok(rows
            .into_iter()
            .map(|membership| crate::repository::RosterEntry {
                display_name: names.get(&membership.user_id).cloned(),
                membership,
            })
            .collect())
    }
}

/// Action to list a workspace's pending invites, newest first.
///
/// Thin pass-through to the invite store once membership is established.
pub struct ListInvites<I, M>
where
    I: InviteRepository,
    M: MembershipRepository,
{
    invites: I,
    memberships: M,
}

impl<I, M> ListInvites<I, M>
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

    /// # Returns
    ///
    /// - `Ok(invites)` - pending invites, newest first (tokens are skipped
    ///   when the records are serialized)
    /// - `Err(Unauthorized)` - no authenticated caller
    /// - `Err(Forbidden(NotMember))` - caller holds no membership here
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "list_invites", skip_all, err)
    )]
    pub async fn execute(
        &self,
        caller: Option<&Identity>,
        workspace_id: Uuid,
    ) -> Result<Vec<WorkspaceInvite>, MembershipError> {
        let caller = caller.ok_or(MembershipError::Unauthorized)?;
        self.memberships
            .find_by_workspace_and_user(workspace_id, caller.user_id)
            .await?
            .ok_or(MembershipError::Forbidden(ForbiddenReason::NotMember))?;

        self.invites.list_by_workspace(workspace_id).await
    }
}
