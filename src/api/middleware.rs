use std::marker::PhantomData;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::error::AppError;
use super::routes::MembershipState;
use crate::repository::{
    Directory, InviteMailer, InviteRepository, MembershipRepository, SessionProvider,
    WorkspaceRepository,
};
use crate::types::Identity;

/// Resolves the `Authorization` bearer credential to the caller's identity.
///
/// A missing or unknown credential extracts as `None` rather than rejecting:
/// whether anonymity is acceptable is the action's decision, and acceptance
/// wants to answer it with a login redirect instead of a bare 401.
#[derive(Debug, Clone)]
pub struct CallerSession<S>
where
    S: SessionProvider,
{
    identity: Option<Identity>,
    _marker: PhantomData<S>,
}

impl<S> CallerSession<S>
where
    S: SessionProvider,
{
    /// Returns the authenticated identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Returns the inner identity, consuming the wrapper.
    pub fn into_inner(self) -> Option<Identity> {
        self.identity
    }
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
}

#[async_trait]
impl<W, I, M, D, E, S> FromRequestParts<MembershipState<W, I, M, D, E, S>> for CallerSession<S>
where
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    I: InviteRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    D: Directory + Clone + Send + Sync + 'static,
    E: InviteMailer + Clone + Send + Sync + 'static,
    S: SessionProvider + Clone + Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &MembershipState<W, I, M, D, E, S>,
    ) -> Result<Self, Self::Rejection> {
        let identity = match extract_bearer_token(&parts.headers) {
            Some(credential) => state.sessions.identify(&credential).await.map_err(AppError)?,
            None => None,
        };

        Ok(CallerSession {
            identity,
            _marker: PhantomData,
        })
    }
}
