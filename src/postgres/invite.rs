//! `PostgreSQL` implementation of [`InviteRepository`].
//!
//! The invite target is persisted in the single `email` column; shareable
//! links are encoded with a marker prefix at this boundary and decoded on
//! the way back out. See [`crate::token::encode_target`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::MembershipError;
use crate::repository::{InviteRepository, NewInvite};
use crate::token::{decode_target, encode_target, InviteToken};
use crate::types::{InviteRole, WorkspaceInvite};

use super::is_unique_violation;

/// Postgres-backed invite repository.
#[derive(Clone)]
pub struct PostgresInviteRepository {
    pool: PgPool,
}

impl PostgresInviteRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
pub(super) struct InviteRecord {
    id: Uuid,
    workspace_id: Uuid,
    email: String,
    role: String,
    token: String,
    invited_by: Uuid,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<InviteRecord> for WorkspaceInvite {
    type Error = MembershipError;

    fn try_from(row: InviteRecord) -> Result<Self, Self::Error> {
        let role = InviteRole::parse(&row.role)
            .ok_or_else(|| MembershipError::Store(format!("invalid invite role: {}", row.role)))?;

        Ok(WorkspaceInvite {
            id: row.id,
            workspace_id: row.workspace_id,
            target: decode_target(&row.email),
            role,
            token: InviteToken::new(row.token),
            invited_by: row.invited_by,
            expires_at: row.expires_at,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl InviteRepository for PostgresInviteRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, data), err))]
    async fn create(&self, data: NewInvite) -> Result<WorkspaceInvite, MembershipError> {
        let stored_target = encode_target(&data.target);

        let row: InviteRecord = sqlx::query_as(
            r"
            INSERT INTO workspace_invites (id, workspace_id, email, role, token, invited_by, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, workspace_id, email, role, token, invited_by, expires_at, created_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(data.workspace_id)
        .bind(&stored_target)
        .bind(data.role.as_str())
        .bind(data.token.expose_secret())
        .bind(data.invited_by)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return MembershipError::Conflict;
            }
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"create_invite\", error=\"{e}\"");
            MembershipError::Store(e.to_string())
        })?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<WorkspaceInvite>, MembershipError> {
        let row: Option<InviteRecord> = sqlx::query_as(
            "SELECT id, workspace_id, email, role, token, invited_by, expires_at, created_at FROM workspace_invites WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"find_invite_by_token\", error=\"{e}\"");
            MembershipError::Store(e.to_string())
        })?;

        row.map(WorkspaceInvite::try_from).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, address), err))]
    async fn find_pending_by_email(
        &self,
        workspace_id: Uuid,
        address: &str,
    ) -> Result<Option<WorkspaceInvite>, MembershipError> {
        // Addresses are stored trimmed and lowercased; link markers carry a
        // prefix no address can, so plain equality never matches them.
        let row: Option<InviteRecord> = sqlx::query_as(
            "SELECT id, workspace_id, email, role, token, invited_by, expires_at, created_at FROM workspace_invites WHERE workspace_id = $1 AND email = $2",
        )
        .bind(workspace_id)
        .bind(address.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"find_invite_by_email\", error=\"{e}\"");
            MembershipError::Store(e.to_string())
        })?;

        row.map(WorkspaceInvite::try_from).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn list_by_workspace(
        &self,
        workspace_id: Uuid,
    ) -> Result<Vec<WorkspaceInvite>, MembershipError> {
        let rows: Vec<InviteRecord> = sqlx::query_as(
            r"
            SELECT id, workspace_id, email, role, token, invited_by, expires_at, created_at
            FROM workspace_invites
            WHERE workspace_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"list_invites_by_workspace\", error=\"{e}\"");
            MembershipError::Store(e.to_string())
        })?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn count_by_workspace(&self, workspace_id: Uuid) -> Result<u64, MembershipError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM workspace_invites WHERE workspace_id = $1")
                .bind(workspace_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    log::error!(target: "anteroom", "msg=\"database error\", operation=\"count_invites_by_workspace\", error=\"{e}\"");
                    MembershipError::Store(e.to_string())
                })?;

        Ok(count as u64)
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete(&self, id: Uuid) -> Result<(), MembershipError> {
        sqlx::query("DELETE FROM workspace_invites WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!(target: "anteroom", "msg=\"database error\", operation=\"delete_invite\", error=\"{e}\"");
                MembershipError::Store(e.to_string())
            })?;

        Ok(())
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn delete_scoped(&self, id: Uuid, workspace_id: Uuid) -> Result<bool, MembershipError> {
        let result = sqlx::query(
            "DELETE FROM workspace_invites WHERE id = $1 AND workspace_id = $2",
        )
        .bind(id)
        .bind(workspace_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "anteroom", "msg=\"database error\", operation=\"delete_invite_scoped\", error=\"{e}\"");
            MembershipError::Store(e.to_string())
        })?;

        Ok(result.rows_affected() > 0)
    }
}
