//! `SQLite` implementation of [`MembershipRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::MembershipError;
use crate::repository::{MembershipInsert, MembershipRepository, NewMembership, RosterEntry};
use crate::types::{WorkspaceMembership, WorkspaceRole};

use super::{is_unique_violation, parse_uuid};

/// `SQLite`-backed membership repository.
#[derive(Clone)]
pub struct SqliteMembershipRepository {
    pool: SqlitePool,
}

impl SqliteMembershipRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct MembershipRecord {
    id: String,
    workspace_id: String,
    user_id: String,
    role: String,
    invited_by: Option<String>,
    accepted_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MembershipRecord> for WorkspaceMembership {
    type Error = MembershipError;

    fn try_from(row: MembershipRecord) -> Result<Self, Self::Error> {
        let role = WorkspaceRole::parse(&row.role).ok_or_else(|| {
            MembershipError::Store(format!("invalid membership role: {}", row.role))
        })?;
        let invited_by = row
            .invited_by
            .as_deref()
            .map(|v| parse_uuid(v, "workspace_memberships.invited_by"))
            .transpose()?;

        Ok(WorkspaceMembership {
            id: parse_uuid(&row.id, "workspace_memberships.id")?,
            workspace_id: parse_uuid(&row.workspace_id, "workspace_memberships.workspace_id")?,
            user_id: parse_uuid(&row.user_id, "workspace_memberships.user_id")?,
            role,
            invited_by,
            accepted_at: row.accepted_at,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct RosterRecord {
    #[sqlx(flatten)]
    membership: MembershipRecord,
    display_name: Option<String>,
}

impl TryFrom<RosterRecord> for RosterEntry {
    type Error = MembershipError;

    fn try_from(row: RosterRecord) -> Result<Self, Self::Error> {
        Ok(RosterEntry {
            membership: row.membership.try_into()?,
            display_name: row.display_name,
        })
    }
}

#[async_trait]
impl MembershipRepository for SqliteMembershipRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), err))]
    async fn insert(&self, data: NewMembership) -> Result<MembershipInsert, MembershipError> {
        let id = Uuid::new_v4();

        let result: Result<MembershipRecord, sqlx::Error> = sqlx::query_as(
            r"
            INSERT INTO workspace_memberships (id, workspace_id, user_id, role, invited_by, accepted_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, workspace_id, user_id, role, invited_by, accepted_at, created_at
            ",
        )
        .bind(id.to_string())
        .bind(data.workspace_id.to_string())
        .bind(data.user_id.to_string())
        .bind(data.role.as_str())
        .bind(data.invited_by.map(|u| u.to_string()))
        .bind(data.accepted_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(MembershipInsert::Created(row.try_into()?)),
            // The (workspace, user) unique index is the serialization point
            // for concurrent acceptance: losing the race is success.
            Err(e) if is_unique_violation(&e) => Ok(MembershipInsert::AlreadyMember),
            Err(e) => {
                log::error!(target: "anteroom", "msg=\"database error\", operation=\"insert_membership\", error=\"{e}\"");
                Err(MembershipError::Store(e.to_string()))
            }
        }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceMembership>, MembershipError> {
        let row: Option<MembershipRecord> = sqlx::query_as(
            "SELECT id, workspace_id, user_id, role, invited_by, accepted_at, created_at FROM workspace_memberships WHERE workspace_id = ? AND user_id = ?",
        )
        .bind(workspace_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"find_membership\", error=\"{e}\"");
            MembershipError::Store(e.to_string())
        })?;

        row.map(WorkspaceMembership::try_from).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn list_by_workspace(
        &self,
        workspace_id: Uuid,
    ) -> Result<Vec<WorkspaceMembership>, MembershipError> {
        let rows: Vec<MembershipRecord> = sqlx::query_as(
            r"
            SELECT id, workspace_id, user_id, role, invited_by, accepted_at, created_at
            FROM workspace_memberships
            WHERE workspace_id = ?
            ORDER BY created_at ASC
            ",
        )
        .bind(workspace_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"list_memberships_by_workspace\", error=\"{e}\"");
            MembershipError::Store(e.to_string())
        })?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn count_by_workspace(&self, workspace_id: Uuid) -> Result<u64, MembershipError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM workspace_memberships WHERE workspace_id = ?",
        )
        .bind(workspace_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"count_memberships_by_workspace\", error=\"{e}\"");
            MembershipError::Store(e.to_string())
        })?;

        Ok(count as u64)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn roster(&self, workspace_id: Uuid) -> Result<Vec<RosterEntry>, MembershipError> {
        let rows: Vec<RosterRecord> = sqlx::query_as(
            r"
            SELECT m.id, m.workspace_id, m.user_id, m.role, m.invited_by, m.accepted_at, m.created_at,
                   p.display_name
            FROM workspace_memberships m
            LEFT JOIN profiles p ON p.user_id = m.user_id
            WHERE m.workspace_id = ?
            ORDER BY m.created_at ASC
            ",
        )
        .bind(workspace_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"roster\", error=\"{e}\"");
            MembershipError::Store(e.to_string())
        })?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, MembershipError> {
        let result = sqlx::query(
            "DELETE FROM workspace_memberships WHERE workspace_id = ? AND user_id = ?",
        )
        .bind(workspace_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"delete_membership\", error=\"{e}\"");
            MembershipError::Store(e.to_string())
        })?;

        Ok(result.rows_affected() > 0)
    }
}
