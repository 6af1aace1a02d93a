use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actions::DeliveryStatus;
use crate::error::MembershipError;
use crate::types::{InviteRole, WorkspaceInvite, WorkspaceMembership};

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct InviteMemberRequest {
    pub email: String,
    pub role: InviteRole,
}

#[derive(Debug, Deserialize)]
pub struct CreateLinkInviteRequest {
    pub guest_name: String,
    /// Defaults to the configured link role when omitted.
    pub role: Option<InviteRole>,
}

#[derive(Debug, Deserialize)]
pub struct AcceptInviteRequest {
    pub token: String,
}

// Response DTOs

/// Invite records serialize without their token, so this response leaks the
/// capability only through `accept_url`, which the caller asked to mint.
#[derive(Debug, Serialize)]
pub struct CreateInviteResponse {
    pub invite: WorkspaceInvite,
    pub accept_url: String,
    pub delivery: DeliveryStatus,
}

#[derive(Debug, Serialize)]
pub struct AcceptInviteResponse {
    pub workspace_id: Uuid,
    pub already_member: bool,
    pub membership: Option<WorkspaceMembership>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// 401 body for acceptance: carries the login URL that round-trips the
/// token through sign-in.
#[derive(Debug, Serialize)]
pub struct LoginRequiredResponse {
    pub error: String,
    pub code: String,
    pub login_url: String,
}

impl From<&MembershipError> for ErrorResponse {
    fn from(err: &MembershipError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_owned(),
        }
    }
}
