//! Core data model: workspaces, invites, memberships, roles, identities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::token::InviteToken;

/// Role carried by an accepted workspace membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceRole {
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl WorkspaceRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    /// Parses the storage representation of a role.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "owner" => Some(Self::Owner),
            "admin" => Some(Self::Admin),
            "editor" => Some(Self::Editor),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }
}

/// Role granted by an invite.
///
/// Deliberately has no owner variant: ownership is assigned at workspace
/// creation and can never be minted through the invitation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteRole {
    Admin,
    Editor,
    Viewer,
}

impl InviteRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    /// Parses the storage representation of an invite role.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "editor" => Some(Self::Editor),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }
}

impl From<InviteRole> for WorkspaceRole {
    fn from(role: InviteRole) -> Self {
        match role {
            InviteRole::Admin => Self::Admin,
            InviteRole::Editor => Self::Editor,
            InviteRole::Viewer => Self::Viewer,
        }
    }
}

/// Who an invite admits: one address, or anyone holding the link.
///
/// The legacy storage encoding (a marker string inside the `email` column)
/// lives at the repository boundary; see [`crate::token::encode_target`] and
/// [`crate::token::decode_target`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InviteTarget {
    /// Only a session whose email matches may accept.
    Email { address: String },
    /// Any authenticated session may accept; `guest_name` is display-only.
    ShareableLink { guest_name: String },
}

impl InviteTarget {
    pub fn email(address: impl Into<String>) -> Self {
        Self::Email {
            address: address.into(),
        }
    }

    pub fn shareable_link(guest_name: impl Into<String>) -> Self {
        Self::ShareableLink {
            guest_name: guest_name.into(),
        }
    }

    pub fn is_shareable_link(&self) -> bool {
        matches!(self, Self::ShareableLink { .. })
    }

    /// Whether a session with `session_email` may accept this invite.
    ///
    /// Email targets match case-insensitively; shareable links admit anyone.
    pub fn admits_email(&self, session_email: &str) -> bool {
        match self {
            Self::Email { address } => {
                address.to_lowercase() == session_email.trim().to_lowercase()
            }
            Self::ShareableLink { .. } => true,
        }
    }

    /// Human-facing label for list views: the address or the guest name.
    pub fn label(&self) -> &str {
        match self {
            Self::Email { address } => address,
            Self::ShareableLink { guest_name } => guest_name,
        }
    }
}

/// Tenant boundary. Owned by the host application; this crate only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A pending, token-bearing offer of membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceInvite {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub target: InviteTarget,
    pub role: InviteRole,
    #[serde(skip_serializing)]
    pub token: InviteToken,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// An accepted, role-bearing link between a user and a workspace.
///
/// There is no pending membership state: a row exists only once acceptance
/// has completed, so `accepted_at` is always set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceMembership {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub user_id: Uuid,
    pub role: WorkspaceRole,
    pub invited_by: Option<Uuid>,
    pub accepted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A membership joined with directory data for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceMember {
    #[serde(flatten)]
    pub membership: WorkspaceMembership,
    pub display_name: String,
    pub email: Option<String>,
}

/// An authenticated caller, as supplied by the external session collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

impl Identity {
    pub fn new(user_id: Uuid, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
        }
    }
}
