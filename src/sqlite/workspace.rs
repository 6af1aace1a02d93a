//! `SQLite` implementation of [`WorkspaceRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::MembershipError;
use crate::repository::WorkspaceRepository;
use crate::types::Workspace;

use super::parse_uuid;

/// `SQLite`-backed workspace repository.
///
/// Read-only: workspace rows are created and owned by the host application.
#[derive(Clone)]
pub struct SqliteWorkspaceRepository {
    pool: SqlitePool,
}

impl SqliteWorkspaceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct WorkspaceRecord {
    id: String,
    name: String,
    owner_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<WorkspaceRecord> for Workspace {
    type Error = MembershipError;

    fn try_from(row: WorkspaceRecord) -> Result<Self, Self::Error> {
        Ok(Workspace {
            id: parse_uuid(&row.id, "workspaces.id")?,
            name: row.name,
            owner_id: parse_uuid(&row.owner_id, "workspaces.owner_id")?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl WorkspaceRepository for SqliteWorkspaceRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>, MembershipError> {
        let row: Option<WorkspaceRecord> = sqlx::query_as(
            "SELECT id, name, owner_id, created_at FROM workspaces WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"find_workspace_by_id\", error=\"{e}\"");
            MembershipError::Store(e.to_string())
        })?;

        row.map(Workspace::try_from).transpose()
    }
}
