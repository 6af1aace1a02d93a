//! Token-to-invite resolution chain.
//!
//! Acceptance resolves a submitted token through an ordered list of
//! strategies: typically a privileged single-purpose lookup first, then a
//! more privileged direct store query as fallback, so acceptance keeps
//! working when the preferred path is unavailable in a deployment. Each
//! strategy is independently testable, and adding or removing one is a
//! local change to the list handed to
//! [`AcceptInvite`](crate::actions::AcceptInvite).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::MembershipError;
use crate::repository::InviteRepository;
use crate::token::token_fragment;
use crate::types::WorkspaceInvite;

/// One strategy for turning a token into a pending invite.
#[async_trait]
pub trait InviteResolver: Send + Sync {
    /// Short name for log lines.
    fn name(&self) -> &'static str;

    /// Attempts to resolve `token`. `Ok(None)` means "not found here";
    /// errors are absorbed by the chain so later strategies still run.
    async fn resolve(&self, token: &str) -> Result<Option<WorkspaceInvite>, MembershipError>;
}

/// Walks `resolvers` in order; the first hit wins.
///
/// A resolver error is logged and treated as "no result" so the fallback
/// exists precisely for deployments where an earlier path is broken.
pub async fn resolve_invite(
    resolvers: &[Arc<dyn InviteResolver>],
    token: &str,
) -> Option<WorkspaceInvite> {
    for resolver in resolvers {
        match resolver.resolve(token).await {
            Ok(Some(invite)) => {
                log::debug!(target: "anteroom", "msg=\"token resolved\", resolver=\"{}\", token=\"{}\", invite_id={}", resolver.name(), token_fragment(token), invite.id);
                return Some(invite);
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!(target: "anteroom", "msg=\"invite resolver failed\", resolver=\"{}\", token=\"{}\", error=\"{e}\"", resolver.name(), token_fragment(token));
            }
        }
    }
    None
}

/// Resolver backed by any [`InviteRepository`]'s direct token lookup.
///
/// This is the most privileged strategy and usually sits last in the chain.
pub struct StoreResolver<I> {
    invites: I,
}

impl<I> StoreResolver<I>
where
    I: InviteRepository,
{
    pub fn new(invites: I) -> Self {
        Self { invites }
    }
}

#[async_trait]
impl<I> InviteResolver for StoreResolver<I>
where
    I: InviteRepository,
{
    fn name(&self) -> &'static str {
        "store"
    }

    async fn resolve(&self, token: &str) -> Result<Option<WorkspaceInvite>, MembershipError> {
        self.invites.find_by_token(token).await
    }
}
