//! Repository and collaborator traits.
//!
//! Storage traits ([`WorkspaceRepository`], [`InviteRepository`],
//! [`MembershipRepository`]) are implemented by the `sqlite` and `postgres`
//! backends and by the in-memory mocks. Collaborator traits ([`Directory`],
//! [`InviteMailer`], [`SessionProvider`]) wrap services the host application
//! already has: a profile/identity provider, an outbound mailer, and its
//! session mechanism.
//!
//! None of these perform authorization. Actions consult
//! [`crate::guard`] first and only then touch the store; implementations
//! must never be parameterized by caller-supplied filters beyond the keys
//! in these signatures.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::MembershipError;
use crate::token::InviteToken;
use crate::types::{
    Identity, InviteRole, InviteTarget, Workspace, WorkspaceInvite, WorkspaceMembership,
    WorkspaceRole,
};

/// Data for inserting a pending invite.
#[derive(Debug, Clone)]
pub struct NewInvite {
    pub workspace_id: Uuid,
    pub target: InviteTarget,
    pub role: InviteRole,
    pub token: InviteToken,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Data for inserting an accepted membership.
#[derive(Debug, Clone)]
pub struct NewMembership {
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub role: WorkspaceRole,
    pub invited_by: Option<Uuid>,
    pub accepted_at: DateTime<Utc>,
}

/// Outcome of a membership insert.
///
/// The (workspace, user) unique constraint is the serialization point for
/// concurrent acceptance: when the row already exists the insert reports
/// `AlreadyMember` instead of an error, and callers treat it as success.
#[derive(Debug, Clone, PartialEq)]
pub enum MembershipInsert {
    Created(WorkspaceMembership),
    AlreadyMember,
}

/// A membership row pre-joined with a directory display name.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub membership: WorkspaceMembership,
    pub display_name: Option<String>,
}

/// Read-only access to workspaces. Rows are owned by the host application.
#[async_trait]
pub trait WorkspaceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>, MembershipError>;
}

/// Persistence for pending invites.
#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Inserts a pending invite.
    ///
    /// A duplicate (workspace, stored target) must surface as
    /// [`MembershipError::Conflict`], including when the duplicate is only
    /// detected by the storage unique constraint under a race.
    async fn create(&self, data: NewInvite) -> Result<WorkspaceInvite, MembershipError>;

    /// Point lookup by token. Reserved for acceptance; never exposed to
    /// manager-facing listings.
    async fn find_by_token(&self, token: &str)
        -> Result<Option<WorkspaceInvite>, MembershipError>;

    /// Finds a pending email-targeted invite for `address` (stored
    /// lowercase) in the workspace. Link invites never match.
    async fn find_pending_by_email(
        &self,
        workspace_id: Uuid,
        address: &str,
    ) -> Result<Option<WorkspaceInvite>, MembershipError>;

    /// Pending invites for a workspace, newest first.
    async fn list_by_workspace(
        &self,
        workspace_id: Uuid,
    ) -> Result<Vec<WorkspaceInvite>, MembershipError>;

    /// Number of pending invites in a workspace.
    async fn count_by_workspace(&self, workspace_id: Uuid) -> Result<u64, MembershipError>;

    /// Deletes by id. Missing rows are not an error; acceptance uses this
    /// as a best-effort cleanup.
    async fn delete(&self, id: Uuid) -> Result<(), MembershipError>;

    /// Deletes by id scoped to a workspace. Returns whether a row went away.
    async fn delete_scoped(
        &self,
        id: Uuid,
        workspace_id: Uuid,
    ) -> Result<bool, MembershipError>;
}

/// Persistence for accepted memberships.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Inserts a membership, reporting a (workspace, user) duplicate as
    /// [`MembershipInsert::AlreadyMember`] rather than an error.
    async fn insert(&self, data: NewMembership) -> Result<MembershipInsert, MembershipError>;

    async fn find_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceMembership>, MembershipError>;

    /// Memberships of a workspace, oldest first.
    async fn list_by_workspace(
        &self,
        workspace_id: Uuid,
    ) -> Result<Vec<WorkspaceMembership>, MembershipError>;

    /// Number of accepted members in a workspace.
    async fn count_by_workspace(&self, workspace_id: Uuid) -> Result<u64, MembershipError>;

    /// Privileged aggregation: memberships pre-joined with display names in
    /// one round trip. Callers fall back to
    /// [`MembershipRepository::list_by_workspace`] plus a directory batch
    /// when this errors or comes back empty.
    async fn roster(&self, workspace_id: Uuid) -> Result<Vec<RosterEntry>, MembershipError>;

    /// Deletes one member's row. Returns whether a row went away.
    async fn delete_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, MembershipError>;
}

/// External profile/identity lookups.
///
/// Implementations tolerate unknown users by returning `Ok(None)`; callers
/// degrade to placeholders rather than failing a whole listing.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn display_name_of(&self, user_id: Uuid) -> Result<Option<String>, MembershipError>;

    async fn email_of(&self, user_id: Uuid) -> Result<Option<String>, MembershipError>;

    /// Batch display-name lookup. The default loops over
    /// [`Directory::display_name_of`] for providers without a batch API;
    /// individual failures are logged and skipped.
    async fn display_names_of(
        &self,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, MembershipError> {
        let mut names = HashMap::with_capacity(user_ids.len());
        for id in user_ids {
            match self.display_name_of(*id).await {
                Ok(Some(name)) => {
                    names.insert(*id, name);
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!(target: "anteroom", "msg=\"directory display-name lookup failed\", user_id={id}, error=\"{e}\"");
                }
            }
        }
        Ok(names)
    }

    /// Batch email lookup, same contract as
    /// [`Directory::display_names_of`].
    async fn emails_of(
        &self,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, MembershipError> {
        let mut emails = HashMap::with_capacity(user_ids.len());
        for id in user_ids {
            match self.email_of(*id).await {
                Ok(Some(email)) => {
                    emails.insert(*id, email);
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!(target: "anteroom", "msg=\"directory email lookup failed\", user_id={id}, error=\"{e}\"");
                }
            }
        }
        Ok(emails)
    }
}

/// Outbound invite notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteEmail {
    pub to: String,
    pub inviter_name: String,
    pub workspace_name: String,
    pub accept_url: String,
}

/// Sends invite notifications through the host application's mailer.
#[async_trait]
pub trait InviteMailer: Send + Sync {
    /// Delivery failures should come back as
    /// [`MembershipError::ExternalService`]; the create-invite operation
    /// downgrades them to a delivery status instead of failing.
    async fn send_invite(&self, email: InviteEmail) -> Result<(), MembershipError>;
}

/// Resolves a bearer credential to the caller's identity.
///
/// Absence of a session is a first-class state: `Ok(None)`, never an error.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn identify(&self, credential: &str) -> Result<Option<Identity>, MembershipError>;
}

// Delegating impls so a shared `Arc<Repo>` satisfies the trait bounds of
// actions and resolvers that want ownership.

#[async_trait]
impl<T> WorkspaceRepository for std::sync::Arc<T>
where
    T: WorkspaceRepository + ?Sized,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>, MembershipError> {
        (**self).find_by_id(id).await
    }
}

#[async_trait]
impl<T> InviteRepository for std::sync::Arc<T>
where
    T: InviteRepository + ?Sized,
{
    async fn create(&self, data: NewInvite) -> Result<WorkspaceInvite, MembershipError> {
        (**self).create(data).await
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<WorkspaceInvite>, MembershipError> {
        (**self).find_by_token(token).await
    }

    async fn find_pending_by_email(
        &self,
        workspace_id: Uuid,
        address: &str,
    ) -> Result<Option<WorkspaceInvite>, MembershipError> {
        (**self).find_pending_by_email(workspace_id, address).await
    }

    async fn list_by_workspace(
        &self,
        workspace_id: Uuid,
    ) -> Result<Vec<WorkspaceInvite>, MembershipError> {
        (**self).list_by_workspace(workspace_id).await
    }

    async fn count_by_workspace(&self, workspace_id: Uuid) -> Result<u64, MembershipError> {
        (**self).count_by_workspace(workspace_id).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), MembershipError> {
        (**self).delete(id).await
    }

    async fn delete_scoped(
        &self,
        id: Uuid,
        workspace_id: Uuid,
    ) -> Result<bool, MembershipError> {
        (**self).delete_scoped(id, workspace_id).await
    }
}

#[async_trait]
impl<T> MembershipRepository for std::sync::Arc<T>
where
    T: MembershipRepository + ?Sized,
{
    async fn insert(&self, data: NewMembership) -> Result<MembershipInsert, MembershipError> {
        (**self).insert(data).await
    }

    async fn find_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceMembership>, MembershipError> {
        (**self).find_by_workspace_and_user(workspace_id, user_id).await
    }

    async fn list_by_workspace(
        &self,
        workspace_id: Uuid,
    ) -> Result<Vec<WorkspaceMembership>, MembershipError> {
        (**self).list_by_workspace(workspace_id).await
    }

    async fn count_by_workspace(&self, workspace_id: Uuid) -> Result<u64, MembershipError> {
        (**self).count_by_workspace(workspace_id).await
    }

    async fn roster(&self, workspace_id: Uuid) -> Result<Vec<RosterEntry>, MembershipError> {
        (**self).roster(workspace_id).await
    }

    async fn delete_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, MembershipError> {
        (**self).delete_by_workspace_and_user(workspace_id, user_id).await
    }
}

#[async_trait]
impl<T> Directory for std::sync::Arc<T>
where
    T: Directory + ?Sized,
{
    async fn display_name_of(&self, user_id: Uuid) -> Result<Option<String>, MembershipError> {
        (**self).display_name_of(user_id).await
    }

    async fn email_of(&self, user_id: Uuid) -> Result<Option<String>, MembershipError> {
        (**self).email_of(user_id).await
    }

    async fn display_names_of(
        &self,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, MembershipError> {
        (**self).display_names_of(user_ids).await
    }

    async fn emails_of(
        &self,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, MembershipError> {
        (**self).emails_of(user_ids).await
    }
}

#[async_trait]
impl<T> InviteMailer for std::sync::Arc<T>
where
    T: InviteMailer + ?Sized,
{
    async fn send_invite(&self, email: InviteEmail) -> Result<(), MembershipError> {
        (**self).send_invite(email).await
    }
}

#[async_trait]
impl<T> SessionProvider for std::sync::Arc<T>
where
    T: SessionProvider + ?Sized,
{
    async fn identify(&self, credential: &str) -> Result<Option<Identity>, MembershipError> {
        (**self).identify(credential).await
    }
}
