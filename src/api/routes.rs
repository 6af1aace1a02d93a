//! Route configuration for the membership endpoints.

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;

use super::handlers;
use crate::config::AnteroomConfig;
use crate::repository::{
    Directory, InviteMailer, InviteRepository, MembershipRepository, SessionProvider,
    WorkspaceRepository,
};
use crate::resolve::InviteResolver;

/// Application state for membership routes.
///
/// Holds the repositories and collaborators the handlers need, plus the
/// resolver chain and configuration used by acceptance.
#[derive(Clone)]
pub struct MembershipState<W, I, M, D, E, S> {
    /// Workspace repository for existence checks.
    pub workspaces: W,
    /// Invite repository.
    pub invites: I,
    /// Membership repository.
    pub memberships: M,
    /// Directory for display names and emails.
    pub directory: D,
    /// Outbound invite mailer.
    pub mailer: E,
    /// Session provider for bearer credentials.
    pub sessions: S,
    /// Ordered token resolution chain for acceptance.
    pub resolvers: Vec<Arc<dyn InviteResolver>>,
    /// Shared configuration.
    pub config: AnteroomConfig,
}

/// Creates the workspace-scoped membership routes.
///
/// # Routes
///
/// ## Invites
/// - `POST /workspaces/:id/invites` - Invite by email
/// - `POST /workspaces/:id/invites/link` - Mint a shareable link
/// - `GET /workspaces/:id/invites` - List pending invites
/// - `DELETE /workspaces/:id/invites/:invite_id` - Cancel an invite
///
/// ## Members
/// - `GET /workspaces/:id/members` - List members
/// - `DELETE /workspaces/:id/members/:user_id` - Remove a member
pub fn membership_routes<W, I, M, D, E, S>() -> Router<MembershipState<W, I, M, D, E, S>>
where
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    I: InviteRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    D: Directory + Clone + Send + Sync + 'static,
    E: InviteMailer + Clone + Send + Sync + 'static,
    S: SessionProvider + Clone + Send + Sync + 'static,
{
    Router::new()
        // Invites
        .route(
            "/workspaces/:id/invites",
            post(handlers::create_email_invite::<W, I, M, D, E, S>),
        )
        .route(
            "/workspaces/:id/invites/link",
            post(handlers::create_link_invite::<W, I, M, D, E, S>),
        )
        .route(
            "/workspaces/:id/invites",
            get(handlers::list_invites::<W, I, M, D, E, S>),
        )
        .route(
            "/workspaces/:id/invites/:invite_id",
            delete(handlers::cancel_invite::<W, I, M, D, E, S>),
        )
        // Members
        .route(
            "/workspaces/:id/members",
            get(handlers::list_members::<W, I, M, D, E, S>),
        )
        .route(
            "/workspaces/:id/members/:user_id",
            delete(handlers::remove_member::<W, I, M, D, E, S>),
        )
}

/// Creates the acceptance routes.
///
/// These are separate because they are mounted at the application root
/// rather than under `/workspaces/:id`.
///
/// # Routes
/// - `POST /invite/accept` - Accept an invite by token
/// - `GET /i/:token` - Redirect a short invite link to the acceptance page
pub fn accept_routes<W, I, M, D, E, S>() -> Router<MembershipState<W, I, M, D, E, S>>
where
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    I: InviteRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    D: Directory + Clone + Send + Sync + 'static,
    E: InviteMailer + Clone + Send + Sync + 'static,
    S: SessionProvider + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/invite/accept",
            post(handlers::accept_invite::<W, I, M, D, E, S>),
        )
        .route(
            "/i/:token",
            get(handlers::invite_link_redirect::<W, I, M, D, E, S>),
        )
}
