use chrono::Utc;

use crate::config::AnteroomConfig;
use crate::error::MembershipError;
use crate::events::{dispatch, MembershipEvent};
use crate::guard::ensure_manager;
use crate::repository::{
    Directory, InviteEmail, InviteMailer, InviteRepository, MembershipRepository, NewInvite,
    WorkspaceRepository,
};
use crate::token::{compute_expiry, generate_invite_token_with};
use crate::types::{Identity, InviteRole, InviteTarget, WorkspaceInvite};
use crate::validators::{validate_email, validate_guest_name};

/// Whether the invite notification reached the mail provider.
///
/// Delivery failure never fails invite creation: the invite row exists and
/// the token works, the invitee just has not been told. Callers surface this
/// so a manager can resend or share the link by hand.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Failed { error: String },
    /// Shareable links are distributed by the manager, not mailed.
    NotApplicable,
}

/// Output from creating an invite.
#[derive(Debug, Clone)]
pub struct CreateInviteOutput {
    pub invite: WorkspaceInvite,
    /// The short acceptance URL carrying the token: `{base}/i/{token}`.
    pub accept_url: String,
    pub delivery: DeliveryStatus,
}

/// Input for creating an email-targeted invite.
#[derive(Debug, Clone)]
pub struct CreateEmailInviteInput {
    pub workspace_id: uuid::Uuid,
    pub email: String,
    pub role: InviteRole,
}

/// Action to invite a user to a workspace by email.
///
/// This action:
/// 1. Requires an authenticated caller with a managing role in the workspace
/// 2. Validates and normalizes the address (trimmed, lowercased)
/// 3. Rejects a duplicate pending invite for the same address
/// 4. Enforces the optional member cap (accepted members + pending invites)
/// 5. Creates the invite with a fresh token and sends the notification email
///
/// Mailer failure is downgraded to [`DeliveryStatus::Failed`] in the output;
/// the invite row is already committed at that point and the token is live.
pub struct CreateEmailInvite<W, I, M, D, E>
where
    W: WorkspaceRepository,
    I: InviteRepository,
    M: MembershipRepository,
    D: Directory,
    E: InviteMailer,
{
    workspaces: W,
    invites: I,
    memberships: M,
    directory: D,
    mailer: E,
    config: AnteroomConfig,
}

impl<W, I, M, D, E> CreateEmailInvite<W, I, M, D, E>
where
    W: WorkspaceRepository,
    I: InviteRepository,
    M: MembershipRepository,
    D: Directory,
    E: InviteMailer,
{
    pub fn new(
        workspaces: W,
        invites: I,
        memberships: M,
        directory: D,
        mailer: E,
        config: AnteroomConfig,
    ) -> Self {
        Self {
            workspaces,
            invites,
            memberships,
            directory,
            mailer,
            config,
        }
    }

    /// Creates the invite and attempts delivery.
    ///
    /// # Returns
    ///
    /// - `Ok(output)` with the invite, acceptance URL, and delivery status
    /// - `Err(Unauthorized)` - no authenticated caller
    /// - `Err(NotFound)` - workspace does not exist
    /// - `Err(Forbidden)` - caller is not an owner/admin member
    /// - `Err(Validation(_))` - address rejected
    /// - `Err(Conflict)` - a pending invite for this address already exists
    /// - `Err(MemberLimitExceeded)` - workspace is at its member cap
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "create_email_invite", skip_all, err)
    )]
    pub async fn execute(
        &self,
        caller: Option<&Identity>,
        input: CreateEmailInviteInput,
    ) -> Result<CreateInviteOutput, MembershipError> {
        let caller = caller.ok_or(MembershipError::Unauthorized)?;

        let workspace = self
            .workspaces
            .find_by_id(input.workspace_id)
            .await?
            .ok_or(MembershipError::NotFound)?;

        let membership = self
            .memberships
            .find_by_workspace_and_user(workspace.id, caller.user_id)
            .await?;
        ensure_manager(membership)?;

        // Stored lowercase so the (workspace, email) invariant holds
        // case-insensitively.
        let address = input.email.trim().to_lowercase();
        validate_email(&address)?;

        if self
            .invites
            .find_pending_by_email(workspace.id, &address)
            .await?
            .is_some()
        {
            return Err(MembershipError::Conflict);
        }

        self.check_member_limit(workspace.id).await?;

        let token = generate_invite_token_with(self.config.token_bytes);
        let accept_url = self.config.invite_url(token.expose_secret());

        // The storage unique constraint closes the check-then-insert race:
        // a concurrent duplicate surfaces as Conflict from the repository.
        let invite = self
            .invites
            .create(NewInvite {
                workspace_id: workspace.id,
                target: InviteTarget::email(address.clone()),
                role: input.role,
                token,
                invited_by: caller.user_id,
                expires_at: compute_expiry(self.config.invite_expiry),
            })
            .await?;

        log::info!(
            target: "anteroom",
            "msg=\"invite created\", workspace_id={}, invite_id={}, role=\"{}\", token=\"{}\"",
            invite.workspace_id,
            invite.id,
            invite.role.as_str(),
            invite.token.fragment()
        );

        dispatch(MembershipEvent::InviteCreated {
            workspace_id: invite.workspace_id,
            invite_id: invite.id,
            shareable_link: false,
            at: Utc::now(),
        })
        .await;

        let inviter_name = self
            .directory
            .display_name_of(caller.user_id)
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| self.config.placeholder_display_name.clone());

        let delivery = match self
            .mailer
            .send_invite(InviteEmail {
                to: address,
                inviter_name,
                workspace_name: workspace.name,
                accept_url: accept_url.clone(),
            })
            .await
        {
            Ok(()) => DeliveryStatus::Sent,
            Err(e) => {
                log::error!(
                    target: "anteroom",
                    "msg=\"invite email delivery failed\", workspace_id={}, invite_id={}, error=\"{e}\"",
                    invite.workspace_id,
                    invite.id
                );
                dispatch(MembershipEvent::InviteEmailFailed {
                    workspace_id: invite.workspace_id,
                    invite_id: invite.id,
                    error: e.to_string(),
                    at: Utc::now(),
                })
                .await;
                DeliveryStatus::Failed {
                    error: e.to_string(),
                }
            }
        };

        Ok(CreateInviteOutput {
            invite,
            accept_url,
            delivery,
        })
    }

    async fn check_member_limit(&self, workspace_id: uuid::Uuid) -> Result<(), MembershipError> {
        let Some(limit) = self.config.max_members_per_workspace else {
            return Ok(());
        };
        let members = self.memberships.count_by_workspace(workspace_id).await?;
        let pending = self.invites.count_by_workspace(workspace_id).await?;
        if members + pending >= u64::from(limit) {
            return Err(MembershipError::MemberLimitExceeded { limit });
        }
        Ok(())
    }
}

/// Input for creating a shareable-link invite.
#[derive(Debug, Clone)]
pub struct CreateLinkInviteInput {
    pub workspace_id: uuid::Uuid,
    /// Display name for whoever the link is meant for.
    pub guest_name: String,
    /// Defaults to [`AnteroomConfig::default_link_role`] when `None`.
    pub role: Option<InviteRole>,
}

/// Action to mint a shareable invite link.
///
/// Anyone who is authenticated and holds the link may accept it, so the only
/// per-invitee data is a display name. No email is sent; the manager
/// distributes the returned URL themselves.
pub struct CreateLinkInvite<W, I, M>
where
    W: WorkspaceRepository,
    I: InviteRepository,
    M: MembershipRepository,
{
    workspaces: W,
    invites: I,
    memberships: M,
    config: AnteroomConfig,
}

impl<W, I, M> CreateLinkInvite<W, I, M>
where
    W: WorkspaceRepository,
    I: InviteRepository,
    M: MembershipRepository,
{
    pub fn new(workspaces: W, invites: I, memberships: M, config: AnteroomConfig) -> Self {
        Self {
            workspaces,
            invites,
            memberships,
            config,
        }
    }

    /// Creates the link invite.
    ///
    /// # Returns
    ///
    /// - `Ok(output)` with the invite and acceptance URL
    ///   (`delivery` is always [`DeliveryStatus::NotApplicable`])
    /// - `Err(Unauthorized)` - no authenticated caller
    /// - `Err(NotFound)` - workspace does not exist
    /// - `Err(Forbidden)` - caller is not an owner/admin member
    /// - `Err(Validation(_))` - guest name rejected
    /// - `Err(MemberLimitExceeded)` - workspace is at its member cap
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "create_link_invite", skip_all, err)
    )]
    pub async fn execute(
        &self,
        caller: Option<&Identity>,
        input: CreateLinkInviteInput,
    ) -> Result<CreateInviteOutput, MembershipError> {
        let caller = caller.ok_or(MembershipError::Unauthorized)?;

        let workspace = self
            .workspaces
            .find_by_id(input.workspace_id)
            .await?
            .ok_or(MembershipError::NotFound)?;

        let membership = self
            .memberships
            .find_by_workspace_and_user(workspace.id, caller.user_id)
            .await?;
        ensure_manager(membership)?;

        let guest_name = validate_guest_name(&input.guest_name)?;
        let role = input.role.unwrap_or(self.config.default_link_role);

        if let Some(limit) = self.config.max_members_per_workspace {
            let members = self.memberships.count_by_workspace(workspace.id).await?;
            let pending = self.invites.count_by_workspace(workspace.id).await?;
            if members + pending >= u64::from(limit) {
                return Err(MembershipError::MemberLimitExceeded { limit });
            }
        }

        let token = generate_invite_token_with(self.config.token_bytes);
        let accept_url = self.config.invite_url(token.expose_secret());

        let invite = self
            .invites
            .create(NewInvite {
                workspace_id: workspace.id,
                target: InviteTarget::shareable_link(guest_name),
                role,
                token,
                invited_by: caller.user_id,
                expires_at: compute_expiry(self.config.invite_expiry),
            })
            .await?;

        log::info!(
            target: "anteroom",
            "msg=\"link invite created\", workspace_id={}, invite_id={}, role=\"{}\", token=\"{}\"",
            invite.workspace_id,
            invite.id,
            invite.role.as_str(),
            invite.token.fragment()
        );

        dispatch(MembershipEvent::InviteCreated {
            workspace_id: invite.workspace_id,
            invite_id: invite.id,
            shareable_link: true,
            at: Utc::now(),
        })
        .await;

        Ok(CreateInviteOutput {
            invite,
            accept_url,
            delivery: DeliveryStatus::NotApplicable,
        })
    }
}
