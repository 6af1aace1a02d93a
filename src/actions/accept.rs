use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::config::AnteroomConfig;
use crate::error::MembershipError;
use crate::events::{dispatch, MembershipEvent};
use crate::repository::{InviteRepository, MembershipInsert, MembershipRepository, NewMembership};
use crate::resolve::{resolve_invite, InviteResolver};
use crate::token::token_fragment;
use crate::types::{Identity, InviteTarget, WorkspaceMembership};

/// Output from accepting an invite.
#[derive(Debug, Clone)]
pub struct AcceptInviteOutput {
    /// Workspace the caller now belongs to; used for the post-accept redirect.
    pub workspace_id: Uuid,
    /// The membership row this acceptance created, or `None` when the caller
    /// was already a member and the accept converged idempotently.
    pub membership: Option<WorkspaceMembership>,
    pub already_member: bool,
}

/// Action to turn an invite token into a workspace membership.
///
/// The token resolves through an ordered chain of
/// [`InviteResolver`] strategies; typically a privileged single-purpose
/// lookup first, then a direct store query as fallback. The sequence is not
/// one transaction: the membership unique constraint is the serialization
/// point, and a duplicate insert is reported as success, which is what makes
/// concurrent accepts of the same token converge without locks.
///
/// Expiry is deliberately never checked; see
/// [`AnteroomConfig::invite_expiry`].
pub struct AcceptInvite<I, M>
where
    I: InviteRepository,
    M: MembershipRepository,
{
    resolvers: Vec<Arc<dyn InviteResolver>>,
    invites: I,
    memberships: M,
    config: AnteroomConfig,
}

impl<I, M> AcceptInvite<I, M>
where
    I: InviteRepository,
    M: MembershipRepository,
{
    pub fn new(
        resolvers: Vec<Arc<dyn InviteResolver>>,
        invites: I,
        memberships: M,
        config: AnteroomConfig,
    ) -> Self {
        Self {
            resolvers,
            invites,
            memberships,
            config,
        }
    }

    /// Accepts the invite identified by `token` on behalf of `caller`.
    ///
    /// # Returns
    ///
    /// - `Ok(output)` - membership exists (created now or previously)
    /// - `Err(Unauthorized)` - no session; the HTTP layer turns this into a
    ///   login redirect that carries the token forward for re-entry
    /// - `Err(InvalidToken)` - no resolver produced an invite for the token
    /// - `Err(EmailMismatch)` - email-targeted invite, different session email
    /// - `Err(MemberLimitExceeded)` - workspace full (new members only;
    ///   re-acceptance by an existing member still succeeds)
    /// - `Err(Store(_))` - unexpected persistence failure
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "accept_invite", skip_all, err)
    )]
    pub async fn execute(
        &self,
        caller: Option<&Identity>,
        token: &str,
    ) -> Result<AcceptInviteOutput, MembershipError> {
        let token = token.trim();
        let caller = caller.ok_or(MembershipError::Unauthorized)?;

        let invite = resolve_invite(&self.resolvers, token)
            .await
            .ok_or(MembershipError::InvalidToken)?;

        if let InviteTarget::Email { address } = &invite.target {
            if !invite.target.admits_email(&caller.email) {
                log::info!(
                    target: "anteroom",
                    "msg=\"accept rejected, email mismatch\", workspace_id={}, invite_id={}, token=\"{}\"",
                    invite.workspace_id,
                    invite.id,
                    token_fragment(token)
                );
                return Err(MembershipError::EmailMismatch {
                    expected: address.clone(),
                });
            }
        }

        // The cap only blocks genuinely new members; an existing membership
        // short-circuits to success so replayed accepts stay idempotent even
        // in a full workspace.
        if let Some(limit) = self.config.max_members_per_workspace {
            let members = self.memberships.count_by_workspace(invite.workspace_id).await?;
            if members >= u64::from(limit) {
                let existing = self
                    .memberships
                    .find_by_workspace_and_user(invite.workspace_id, caller.user_id)
                    .await?;
                if existing.is_none() {
                    return Err(MembershipError::MemberLimitExceeded { limit });
                }
            }
        }

        let inserted = self
            .memberships
            .insert(NewMembership {
                workspace_id: invite.workspace_id,
                user_id: caller.user_id,
                role: invite.role.into(),
                invited_by: Some(invite.invited_by),
                accepted_at: Utc::now(),
            })
            .await?;

        let (membership, already_member) = match inserted {
            MembershipInsert::Created(membership) => (Some(membership), false),
            // Unique violation means the desired end state already holds:
            // a concurrent duplicate accept or a stale replay of a consumed
            // link. Success, not an error.
            MembershipInsert::AlreadyMember => (None, true),
        };

        // Best-effort cleanup. A failure here (including a racing accept
        // having deleted the row first) leaves a pending invite that any
        // later accept converges through the same path.
        if let Err(e) = self.invites.delete(invite.id).await {
            log::warn!(
                target: "anteroom",
                "msg=\"failed to delete accepted invite\", invite_id={}, error=\"{e}\"",
                invite.id
            );
        }

        log::info!(
            target: "anteroom",
            "msg=\"invite accepted\", workspace_id={}, user_id={}, already_member={}",
            invite.workspace_id,
            caller.user_id,
            already_member
        );

        dispatch(MembershipEvent::InviteAccepted {
            workspace_id: invite.workspace_id,
            user_id: caller.user_id,
            already_member,
            at: Utc::now(),
        })
        .await;

        Ok(AcceptInviteOutput {
            workspace_id: invite.workspace_id,
            membership,
            already_member,
        })
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use super::*;
    use crate::mocks::{FailingResolver, MockInviteRepository, MockMembershipRepository};
    use crate::repository::NewInvite;
    use crate::resolve::StoreResolver;
    use crate::token::{compute_expiry, generate_invite_token};
    use crate::types::{InviteRole, InviteTarget, WorkspaceRole};
    use chrono::Duration;

    struct Fixture {
        invites: Arc<MockInviteRepository>,
        memberships: Arc<MockMembershipRepository>,
        workspace_id: Uuid,
        inviter: Uuid,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                invites: Arc::new(MockInviteRepository::new()),
                memberships: Arc::new(MockMembershipRepository::new()),
                workspace_id: Uuid::new_v4(),
                inviter: Uuid::new_v4(),
            }
        }

        async fn seed_invite(&self, target: InviteTarget, role: InviteRole) -> String {
            let token = generate_invite_token();
            let raw = token.expose_secret().to_owned();
            self.invites
                .create(NewInvite {
                    workspace_id: self.workspace_id,
                    target,
                    role,
                    token,
                    invited_by: self.inviter,
                    expires_at: compute_expiry(Duration::days(36_500)),
                })
                .await
                .unwrap();
            raw
        }

        fn action(
            &self,
            config: AnteroomConfig,
        ) -> AcceptInvite<Arc<MockInviteRepository>, Arc<MockMembershipRepository>> {
            let resolvers: Vec<Arc<dyn InviteResolver>> =
                vec![Arc::new(StoreResolver::new(Arc::clone(&self.invites)))];
            AcceptInvite::new(
                resolvers,
                Arc::clone(&self.invites),
                Arc::clone(&self.memberships),
                config,
            )
        }
    }

    #[tokio::test]
    async fn test_accept_email_invite() {
        let f = Fixture::new();
        let raw = f
            .seed_invite(InviteTarget::email("new@x.com"), InviteRole::Editor)
            .await;
        let caller = Identity::new(Uuid::new_v4(), "new@x.com");

        let output = f
            .action(AnteroomConfig::default())
            .execute(Some(&caller), &raw)
            .await
            .unwrap();

        assert_eq!(output.workspace_id, f.workspace_id);
        assert!(!output.already_member);
        let membership = output.membership.unwrap();
        assert_eq!(membership.role, WorkspaceRole::Editor);
        assert_eq!(membership.invited_by, Some(f.inviter));

        // Invite row consumed: the token no longer resolves.
        assert!(f.invites.find_by_token(&raw).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_accept_trims_token() {
        let f = Fixture::new();
        let raw = f
            .seed_invite(InviteTarget::email("new@x.com"), InviteRole::Viewer)
            .await;
        let caller = Identity::new(Uuid::new_v4(), "new@x.com");

        let padded = format!("  {raw}\n");
        let output = f
            .action(AnteroomConfig::default())
            .execute(Some(&caller), &padded)
            .await
            .unwrap();
        assert_eq!(output.workspace_id, f.workspace_id);
    }

    #[tokio::test]
    async fn test_unauthenticated_caller() {
        let f = Fixture::new();
        let raw = f
            .seed_invite(InviteTarget::email("new@x.com"), InviteRole::Editor)
            .await;

        let err = f
            .action(AnteroomConfig::default())
            .execute(None, &raw)
            .await
            .unwrap_err();
        assert_eq!(err, MembershipError::Unauthorized);

        // No state change: the invite is still pending for re-entry.
        assert!(f.invites.find_by_token(&raw).await.unwrap().is_some());
        assert_eq!(f.memberships.count_by_workspace(f.workspace_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_token_invalid() {
        let f = Fixture::new();
        let caller = Identity::new(Uuid::new_v4(), "new@x.com");

        let err = f
            .action(AnteroomConfig::default())
            .execute(Some(&caller), "no-such-token")
            .await
            .unwrap_err();
        assert_eq!(err, MembershipError::InvalidToken);
    }

    #[tokio::test]
    async fn test_email_mismatch_names_expected_address() {
        let f = Fixture::new();
        let raw = f
            .seed_invite(InviteTarget::email("new@x.com"), InviteRole::Editor)
            .await;
        let caller = Identity::new(Uuid::new_v4(), "other@x.com");

        let err = f
            .action(AnteroomConfig::default())
            .execute(Some(&caller), &raw)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            MembershipError::EmailMismatch {
                expected: "new@x.com".to_owned()
            }
        );
        assert_eq!(f.memberships.count_by_workspace(f.workspace_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_email_match_is_case_insensitive() {
        let f = Fixture::new();
        let raw = f
            .seed_invite(InviteTarget::email("new@x.com"), InviteRole::Editor)
            .await;
        let caller = Identity::new(Uuid::new_v4(), "NEW@X.COM");

        assert!(f
            .action(AnteroomConfig::default())
            .execute(Some(&caller), &raw)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_link_invite_admits_any_session() {
        let f = Fixture::new();
        let raw = f
            .seed_invite(
                InviteTarget::shareable_link("Grandma"),
                InviteRole::Viewer,
            )
            .await;
        let caller = Identity::new(Uuid::new_v4(), "whoever@example.com");

        let output = f
            .action(AnteroomConfig::default())
            .execute(Some(&caller), &raw)
            .await
            .unwrap();
        assert_eq!(output.membership.unwrap().role, WorkspaceRole::Viewer);
    }

    #[tokio::test]
    async fn test_double_accept_is_idempotent() {
        let f = Fixture::new();
        let raw = f
            .seed_invite(InviteTarget::email("new@x.com"), InviteRole::Editor)
            .await;
        let caller = Identity::new(Uuid::new_v4(), "new@x.com");
        let action = f.action(AnteroomConfig::default());

        let first = action.execute(Some(&caller), &raw).await.unwrap();
        assert!(!first.already_member);

        // The invite row is gone, so a replay would normally be InvalidToken.
        // Re-seed the same situation a slow network produces: membership
        // exists, invite row still present (first delete not yet through).
        let raw2 = f
            .seed_invite(InviteTarget::email("new@x.com"), InviteRole::Editor)
            .await;
        let second = action.execute(Some(&caller), &raw2).await.unwrap();
        assert!(second.already_member);
        assert!(second.membership.is_none());
        assert_eq!(second.workspace_id, f.workspace_id);
        assert_eq!(f.memberships.count_by_workspace(f.workspace_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_accepts_converge() {
        let f = Fixture::new();
        let raw = f
            .seed_invite(InviteTarget::email("new@x.com"), InviteRole::Editor)
            .await;
        let caller = Identity::new(Uuid::new_v4(), "new@x.com");
        let action = f.action(AnteroomConfig::default());

        let (a, b) = tokio::join!(
            action.execute(Some(&caller), &raw),
            action.execute(Some(&caller), &raw)
        );
        // Both terminate in success regardless of interleaving, and exactly
        // one membership row exists.
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(f.memberships.count_by_workspace(f.workspace_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invite_delete_failure_does_not_fail_accept() {
        let f = Fixture::new();
        let raw = f
            .seed_invite(InviteTarget::email("new@x.com"), InviteRole::Editor)
            .await;
        let caller = Identity::new(Uuid::new_v4(), "new@x.com");
        f.invites.set_fail_deletes(true);

        let output = f
            .action(AnteroomConfig::default())
            .execute(Some(&caller), &raw)
            .await
            .unwrap();
        assert!(!output.already_member);

        // Invite still present; re-entry through the same token converges.
        f.invites.set_fail_deletes(false);
        let again = f
            .action(AnteroomConfig::default())
            .execute(Some(&caller), &raw)
            .await
            .unwrap();
        assert!(again.already_member);
        assert_eq!(f.memberships.count_by_workspace(f.workspace_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_resolution_falls_back_past_broken_resolver() {
        let f = Fixture::new();
        let raw = f
            .seed_invite(InviteTarget::email("new@x.com"), InviteRole::Editor)
            .await;
        let caller = Identity::new(Uuid::new_v4(), "new@x.com");

        let resolvers: Vec<Arc<dyn InviteResolver>> = vec![
            Arc::new(FailingResolver),
            Arc::new(StoreResolver::new(Arc::clone(&f.invites))),
        ];
        let action = AcceptInvite::new(
            resolvers,
            Arc::clone(&f.invites),
            Arc::clone(&f.memberships),
            AnteroomConfig::default(),
        );

        assert!(action.execute(Some(&caller), &raw).await.is_ok());
    }

    #[tokio::test]
    async fn test_member_limit_blocks_new_members_only() {
        let f = Fixture::new();
        let config = AnteroomConfig::capped("http://localhost:3000", 1);

        let first_raw = f
            .seed_invite(InviteTarget::email("first@x.com"), InviteRole::Editor)
            .await;
        let first = Identity::new(Uuid::new_v4(), "first@x.com");
        f.action(config.clone())
            .execute(Some(&first), &first_raw)
            .await
            .unwrap();

        // Workspace is full: a new invitee is blocked.
        let second_raw = f
            .seed_invite(InviteTarget::email("second@x.com"), InviteRole::Editor)
            .await;
        let second = Identity::new(Uuid::new_v4(), "second@x.com");
        let err = f
            .action(config.clone())
            .execute(Some(&second), &second_raw)
            .await
            .unwrap_err();
        assert_eq!(err, MembershipError::MemberLimitExceeded { limit: 1 });

        // An existing member replaying an accept still succeeds at the cap.
        let replay_raw = f
            .seed_invite(InviteTarget::email("first@x.com"), InviteRole::Editor)
            .await;
        let replay = f
            .action(config)
            .execute(Some(&first), &replay_raw)
            .await
            .unwrap();
        assert!(replay.already_member);
    }

    #[tokio::test]
    async fn test_expired_looking_invite_still_accepts() {
        // Expiry is interoperability data, not policy; acceptance never
        // checks it.
        let f = Fixture::new();
        let token = generate_invite_token();
        let raw = token.expose_secret().to_owned();
        f.invites
            .create(NewInvite {
                workspace_id: f.workspace_id,
                target: InviteTarget::email("new@x.com"),
                role: InviteRole::Editor,
                token,
                invited_by: f.inviter,
                expires_at: Utc::now() - Duration::days(1),
            })
            .await
            .unwrap();
        let caller = Identity::new(Uuid::new_v4(), "new@x.com");

        assert!(f
            .action(AnteroomConfig::default())
            .execute(Some(&caller), &raw)
            .await
            .is_ok());
    }
}
