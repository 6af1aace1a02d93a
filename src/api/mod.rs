//! Axum HTTP layer.
//!
//! Thin handlers over the actions in [`crate::actions`]: routes parse the
//! request, run the action, and map [`MembershipError`](crate::MembershipError)
//! to a status code. All authorization decisions stay in the actions.
//!
//! Enable the `axum` feature to use this module.

mod error;
mod handlers;
mod middleware;
mod routes;
mod types;

pub use error::AppError;
pub use middleware::{extract_bearer_token, CallerSession};
pub use routes::{accept_routes, membership_routes, MembershipState};
pub use types::{
    AcceptInviteRequest, AcceptInviteResponse, CreateInviteResponse, CreateLinkInviteRequest,
    ErrorResponse, InviteMemberRequest, LoginRequiredResponse, MessageResponse,
};
