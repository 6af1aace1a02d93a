//! Error types for membership and invitation operations.

use crate::validators::ValidationError;

/// Why an authenticated caller was refused a mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenReason {
    /// The caller holds no accepted membership in the workspace.
    NotMember,
    /// The caller's role may not manage invites or members.
    NotManager,
    /// The target membership belongs to the workspace owner.
    OwnerProtected,
    /// The caller tried to remove their own membership.
    SelfRemoval,
}

/// Errors returned by membership and invitation operations.
///
/// `Display` output is written for end users: callers are expected to render
/// the message directly rather than translating error codes themselves.
/// Operations never panic on expected failures; everything an invitee or
/// manager can trigger is a variant here.
#[derive(Debug, Clone, PartialEq)]
pub enum MembershipError {
    /// No authenticated session.
    Unauthorized,
    /// Authenticated, but the operation is not allowed.
    Forbidden(ForbiddenReason),
    /// A pending invite for this workspace and address already exists.
    Conflict,
    /// The invite or workspace does not exist.
    NotFound,
    /// The submitted token resolves to nothing.
    InvalidToken,
    /// The session email does not match an email-targeted invite.
    EmailMismatch {
        /// The address the invite was issued to.
        expected: String,
    },
    /// The workspace has reached its configured member cap.
    MemberLimitExceeded { limit: u32 },
    /// Caller-supplied input was rejected.
    Validation(ValidationError),
    /// An external collaborator (e.g. the mailer) failed.
    ExternalService(String),
    /// Unexpected persistence failure; the message is passed through.
    Store(String),
}

impl std::fmt::Display for MembershipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "You must be signed in to do this"),
            Self::Forbidden(reason) => match reason {
                ForbiddenReason::NotMember => {
                    write!(f, "You are not a member of this workspace")
                }
                ForbiddenReason::NotManager => {
                    write!(f, "Only workspace owners and admins can do this")
                }
                ForbiddenReason::OwnerProtected => {
                    write!(f, "The workspace owner cannot be removed")
                }
                ForbiddenReason::SelfRemoval => {
                    write!(f, "You cannot remove yourself from the workspace")
                }
            },
            Self::Conflict => {
                write!(f, "A pending invite for this email already exists in this workspace")
            }
            Self::NotFound => write!(f, "Invite or workspace not found"),
            Self::InvalidToken => write!(f, "This invite is invalid or no longer available"),
            Self::EmailMismatch { expected } => {
                write!(f, "This invite was sent to {expected}; sign in with that account to accept it")
            }
            Self::MemberLimitExceeded { limit } => {
                write!(f, "This workspace has reached its limit of {limit} members")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::ExternalService(msg) => write!(f, "External service error: {msg}"),
            Self::Store(msg) => write!(f, "Storage error: {msg}"),
        }
    }
}

impl MembershipError {
    /// Stable machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::InvalidToken => "invalid_token",
            Self::EmailMismatch { .. } => "email_mismatch",
            Self::MemberLimitExceeded { .. } => "member_limit_exceeded",
            Self::Validation(_) => "validation",
            Self::ExternalService(_) => "external_service",
            Self::Store(_) => "storage",
        }
    }
}

impl std::error::Error for MembershipError {}

impl From<ValidationError> for MembershipError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}
