//! `PostgreSQL` database backend implementations.
//!
//! This module provides Postgres-backed implementations of the storage
//! traits plus a resolver over the privileged token-lookup SQL function.
//! Enable the `postgres` feature to use these implementations.

mod invite;
mod membership;
pub mod migrations;
mod resolver;
mod workspace;

pub use invite::PostgresInviteRepository;
pub use membership::PostgresMembershipRepository;
pub use resolver::FunctionResolver;
use sqlx::PgPool;
pub use workspace::PostgresWorkspaceRepository;

/// Creates all Postgres repository instances from a connection pool.
pub fn create_repositories(
    pool: PgPool,
) -> (
    PostgresWorkspaceRepository,
    PostgresInviteRepository,
    PostgresMembershipRepository,
) {
    (
        PostgresWorkspaceRepository::new(pool.clone()),
        PostgresInviteRepository::new(pool.clone()),
        PostgresMembershipRepository::new(pool),
    )
}

/// Whether a database error is a unique-constraint violation.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation
    )
}
