//! Database migrations for `PostgreSQL`.
//!
//! Migrations are embedded at compile time with [`sqlx::migrate!`] and
//! tracked by sqlx's own migrations table.
//!
//! # Example
//!
//! ```rust,ignore
//! use anteroom::postgres::migrations;
//! use sqlx::PgPool;
//!
//! async fn setup_database(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//!     migrations::run(pool).await?;
//!     Ok(())
//! }
//! ```

use sqlx::PgPool;

/// Runs all migrations.
///
/// This includes tables for:
/// - `workspaces`
/// - `profiles`
/// - `workspace_memberships`
/// - `workspace_invites`
///
/// plus the `anteroom_invite_by_token` lookup function used by
/// [`FunctionResolver`](crate::postgres::FunctionResolver).
pub async fn run(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
