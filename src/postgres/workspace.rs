//! `PostgreSQL` implementation of [`WorkspaceRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::MembershipError;
use crate::repository::WorkspaceRepository;
use crate::types::Workspace;

/// Postgres-backed workspace repository.
///
/// Read-only: workspace rows are created and owned by the host application.
#[derive(Clone)]
pub struct PostgresWorkspaceRepository {
    pool: PgPool,
}

impl PostgresWorkspaceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct WorkspaceRecord {
    id: Uuid,
    name: String,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<WorkspaceRecord> for Workspace {
    fn from(row: WorkspaceRecord) -> Self {
        Workspace {
            id: row.id,
            name: row.name,
            owner_id: row.owner_id,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl WorkspaceRepository for PostgresWorkspaceRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>, MembershipError> {
        let row: Option<WorkspaceRecord> = sqlx::query_as(
            "SELECT id, name, owner_id, created_at FROM workspaces WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"find_workspace_by_id\", error=\"{e}\"");
            MembershipError::Store(e.to_string())
        })?;

        Ok(row.map(Into::into))
    }
}
