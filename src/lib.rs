//! Workspace membership and invitation management for multi-tenant
//! applications: unguessable capability-token invites (email-targeted or
//! shareable links), a stateless role-hierarchy guard, and an acceptance
//! flow that stays correct under concurrent and replayed accepts.
//!
//! The crate is storage-agnostic at its core: operations are action structs
//! generic over repository traits, with `sqlx`-backed SQLite and Postgres
//! implementations behind cargo features and in-memory mocks behind the
//! `mocks` feature. An optional `axum` feature adds a ready-made HTTP layer.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use anteroom::actions::{AcceptInvite, CreateEmailInvite, CreateEmailInviteInput};
//! use anteroom::config::AnteroomConfig;
//! use anteroom::resolve::{InviteResolver, StoreResolver};
//! use anteroom::sqlite::{self, migrations};
//! use anteroom::types::{Identity, InviteRole};
//!
//! # async fn demo(pool: sqlx::SqlitePool, mailer: Arc<dyn anteroom::repository::InviteMailer>, directory: Arc<dyn anteroom::repository::Directory>, manager: Identity, invitee: Identity, workspace_id: uuid::Uuid) -> Result<(), anteroom::MembershipError> {
//! migrations::run(&pool).await?;
//! let (workspaces, invites, memberships) = sqlite::create_repositories(pool);
//! let invites = Arc::new(invites);
//! let config = AnteroomConfig::new("https://app.example.com");
//!
//! // A manager mints an invite; the token travels by email.
//! let create = CreateEmailInvite::new(
//!     workspaces,
//!     Arc::clone(&invites),
//!     memberships.clone(),
//!     directory,
//!     mailer,
//!     config.clone(),
//! );
//! let output = create
//!     .execute(
//!         Some(&manager),
//!         CreateEmailInviteInput {
//!             workspace_id,
//!             email: "new@example.com".into(),
//!             role: InviteRole::Editor,
//!         },
//!     )
//!     .await?;
//!
//! // The invitee accepts through the resolution chain.
//! let resolvers: Vec<Arc<dyn InviteResolver>> =
//!     vec![Arc::new(StoreResolver::new(Arc::clone(&invites)))];
//! let accept = AcceptInvite::new(resolvers, invites, memberships, config);
//! let accepted = accept.execute(Some(&invitee), output.invite.token.expose_secret()).await?;
//! assert_eq!(accepted.workspace_id, workspace_id);
//! # Ok(())
//! # }
//! ```
//!
//! # Feature flags
//!
//! - `mocks`: in-memory repositories and collaborators for testing
//! - `sqlite` / `postgres`: `sqlx`-backed repositories and migrations
//! - `axum`: HTTP routes, handlers, and a session extractor
//! - `tracing`: spans on actions and repositories

pub mod actions;
pub mod config;
pub mod error;
pub mod events;
pub mod guard;
pub mod repository;
pub mod resolve;
pub mod token;
pub mod types;
pub mod validators;

#[cfg(feature = "mocks")]
pub mod mocks;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "axum")]
pub mod api;

pub use config::AnteroomConfig;
pub use error::{ForbiddenReason, MembershipError};
pub use events::register_membership_listeners;
pub use token::{generate_invite_token, InviteToken};
pub use types::{
    Identity, InviteRole, InviteTarget, Workspace, WorkspaceInvite, WorkspaceMember,
    WorkspaceMembership, WorkspaceRole,
};
