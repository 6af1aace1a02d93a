use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Membership events emitted by anteroom actions.
///
/// Events are always fired from actions. If no listeners are registered,
/// they are silently ignored (no-op). Register listeners via
/// [`register_membership_listeners`](crate::register_membership_listeners)
/// to handle events.
///
/// Events carry ids rather than addresses or tokens, so they are safe to
/// forward into logs and metrics as-is.
#[derive(Debug, Clone)]
pub enum MembershipEvent {
    // invite lifecycle
    InviteCreated {
        workspace_id: Uuid,
        invite_id: Uuid,
        shareable_link: bool,
        at: DateTime<Utc>,
    },
    InviteCancelled {
        workspace_id: Uuid,
        invite_id: Uuid,
        cancelled_by: Uuid,
        at: DateTime<Utc>,
    },
    InviteAccepted {
        workspace_id: Uuid,
        user_id: Uuid,
        already_member: bool,
        at: DateTime<Utc>,
    },

    // membership lifecycle
    MemberRemoved {
        workspace_id: Uuid,
        user_id: Uuid,
        removed_by: Uuid,
        at: DateTime<Utc>,
    },

    // notification delivery
    InviteEmailFailed {
        workspace_id: Uuid,
        invite_id: Uuid,
        error: String,
        at: DateTime<Utc>,
    },
}

impl MembershipEvent {
    /// Returns a dot-separated event name for logging/tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InviteCreated { .. } => "invite.created",
            Self::InviteCancelled { .. } => "invite.cancelled",
            Self::InviteAccepted { .. } => "invite.accepted",
            Self::MemberRemoved { .. } => "member.removed",
            Self::InviteEmailFailed { .. } => "invite.email_failed",
        }
    }

    /// Returns the timestamp when this event occurred.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::InviteCreated { at, .. }
            | Self::InviteCancelled { at, .. }
            | Self::InviteAccepted { at, .. }
            | Self::MemberRemoved { at, .. }
            | Self::InviteEmailFailed { at, .. } => *at,
        }
    }

    /// Returns the workspace the event belongs to.
    pub fn workspace_id(&self) -> Uuid {
        match self {
            Self::InviteCreated { workspace_id, .. }
            | Self::InviteCancelled { workspace_id, .. }
            | Self::InviteAccepted { workspace_id, .. }
            | Self::MemberRemoved { workspace_id, .. }
            | Self::InviteEmailFailed { workspace_id, .. } => *workspace_id,
        }
    }
}
