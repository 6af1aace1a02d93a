//! Resolver over the `anteroom_invite_by_token` SQL function.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::MembershipError;
use crate::resolve::InviteResolver;
use crate::types::WorkspaceInvite;

use super::invite::InviteRecord;

/// Resolves tokens through the `anteroom_invite_by_token` SQL function.
///
/// The function is a narrow `SECURITY DEFINER` interface, so this resolver
/// works even when the connecting role has no direct read access to the
/// invites table. Chain it ahead of
/// [`StoreResolver`](crate::resolve::StoreResolver) and acceptance degrades
/// gracefully when the function is absent.
#[derive(Clone)]
pub struct FunctionResolver {
    pool: PgPool,
}

impl FunctionResolver {
    /// Create a new resolver with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InviteResolver for FunctionResolver {
    fn name(&self) -> &'static str {
        "sql-function"
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn resolve(&self, token: &str) -> Result<Option<WorkspaceInvite>, MembershipError> {
        let row: Option<InviteRecord> =
            sqlx::query_as("SELECT * FROM anteroom_invite_by_token($1)")
                .bind(token)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    log::error!(target: "anteroom", "msg=\"database error\", operation=\"invite_by_token_function\", error=\"{e}\"");
                    MembershipError::Store(e.to_string())
                })?;

        row.map(WorkspaceInvite::try_from).transpose()
    }
}
