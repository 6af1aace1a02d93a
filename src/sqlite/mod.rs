//! `SQLite` database backend implementations.
//!
//! This module provides `SQLite`-backed implementations of the storage
//! traits. Enable the `sqlite` feature to use these implementations.

mod invite;
mod membership;
pub mod migrations;
mod workspace;

pub use invite::SqliteInviteRepository;
pub use membership::SqliteMembershipRepository;
use sqlx::SqlitePool;
pub use workspace::SqliteWorkspaceRepository;

/// Creates all `SQLite` repository instances from a connection pool.
pub fn create_repositories(
    pool: SqlitePool,
) -> (
    SqliteWorkspaceRepository,
    SqliteInviteRepository,
    SqliteMembershipRepository,
) {
    (
        SqliteWorkspaceRepository::new(pool.clone()),
        SqliteInviteRepository::new(pool.clone()),
        SqliteMembershipRepository::new(pool),
    )
}

/// Parses a TEXT uuid column, surfacing corruption as a store error.
pub(crate) fn parse_uuid(value: &str, column: &str) -> Result<uuid::Uuid, crate::MembershipError> {
    value.parse().map_err(|_| {
        crate::MembershipError::Store(format!("invalid uuid in column {column}: {value}"))
    })
}

/// Whether a database error is a unique-constraint violation.
///
/// Both the invite and membership tables lean on unique indexes to
/// serialize concurrent writers, so this is checked before generic error
/// mapping.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation
    )
}
