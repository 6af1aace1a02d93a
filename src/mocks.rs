#![allow(clippy::significant_drop_tightening)]

//! In-memory implementations of every repository and collaborator trait.
//!
//! Enabled by the `mocks` feature. Intended for host-application tests and
//! for this crate's own unit tests; nothing here is durable or safe to use
//! in production. Mutating failure toggles let tests exercise store and
//! external-service error paths without a real backend.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::MembershipError;
use crate::repository::{
    Directory, InviteEmail, InviteMailer, InviteRepository, MembershipInsert,
    MembershipRepository, NewInvite, NewMembership, RosterEntry, SessionProvider,
    WorkspaceRepository,
};
use crate::resolve::InviteResolver;
use crate::types::{Identity, InviteTarget, Workspace, WorkspaceInvite, WorkspaceMembership};

fn poisoned() -> MembershipError {
    MembershipError::Store("lock poisoned".into())
}

pub struct MockWorkspaceRepository {
    workspaces: RwLock<HashMap<Uuid, Workspace>>,
}

impl MockWorkspaceRepository {
    pub fn new() -> Self {
        Self {
            workspaces: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, workspace: Workspace) -> Result<(), MembershipError> {
        let mut workspaces = self.workspaces.write().map_err(|_| poisoned())?;
        workspaces.insert(workspace.id, workspace);
        Ok(())
    }

    /// Builds and stores a workspace, returning the stored row.
    pub fn seed(&self, name: &str, owner_id: Uuid) -> Result<Workspace, MembershipError> {
        let workspace = Workspace {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            owner_id,
            created_at: Utc::now(),
        };
        self.insert(workspace.clone())?;
        Ok(workspace)
    }
}

impl Default for MockWorkspaceRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkspaceRepository for MockWorkspaceRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>, MembershipError> {
        let workspaces = self.workspaces.read().map_err(|_| poisoned())?;
        Ok(workspaces.get(&id).cloned())
    }
}

pub struct MockInviteRepository {
    invites: RwLock<HashMap<Uuid, WorkspaceInvite>>,
    fail_deletes: AtomicBool,
}

impl MockInviteRepository {
    pub fn new() -> Self {
        Self {
            invites: RwLock::new(HashMap::new()),
            fail_deletes: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent delete fail with a store error.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

impl Default for MockInviteRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InviteRepository for MockInviteRepository {
    async fn create(&self, data: NewInvite) -> Result<WorkspaceInvite, MembershipError> {
        let mut invites = self.invites.write().map_err(|_| poisoned())?;

        // Mirrors the storage unique constraints: one row per token, one
        // pending email invite per (workspace, address). Link targets carry
        // a random marker suffix in real storage, so equal guest names do
        // not collide.
        for existing in invites.values() {
            if existing.token == data.token {
                return Err(MembershipError::Conflict);
            }
            if existing.workspace_id == data.workspace_id {
                if let (
                    InviteTarget::Email { address },
                    InviteTarget::Email { address: new_address },
                ) = (&existing.target, &data.target)
                {
                    if address == new_address {
                        return Err(MembershipError::Conflict);
                    }
                }
            }
        }

        let invite = WorkspaceInvite {
            id: Uuid::new_v4(),
            workspace_id: data.workspace_id,
            target: data.target,
            role: data.role,
            token: data.token,
            invited_by: data.invited_by,
            expires_at: data.expires_at,
            created_at: Utc::now(),
        };
        invites.insert(invite.id, invite.clone());

        Ok(invite)
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<WorkspaceInvite>, MembershipError> {
        let invites = self.invites.read().map_err(|_| poisoned())?;
        Ok(invites
            .values()
            .find(|i| i.token.expose_secret() == token)
            .cloned())
    }

    async fn find_pending_by_email(
        &self,
        workspace_id: Uuid,
        address: &str,
    ) -> Result<Option<WorkspaceInvite>, MembershipError> {
        let invites = self.invites.read().map_err(|_| poisoned())?;
        Ok(invites
            .values()
            .find(|i| {
                i.workspace_id == workspace_id
                    && matches!(&i.target, InviteTarget::Email { address: a } if a == address)
            })
            .cloned())
    }

    async fn list_by_workspace(
        &self,
        workspace_id: Uuid,
    ) -> Result<Vec<WorkspaceInvite>, MembershipError> {
        let invites = self.invites.read().map_err(|_| poisoned())?;
        let mut rows: Vec<WorkspaceInvite> = invites
            .values()
            .filter(|i| i.workspace_id == workspace_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn count_by_workspace(&self, workspace_id: Uuid) -> Result<u64, MembershipError> {
        let invites = self.invites.read().map_err(|_| poisoned())?;
        Ok(invites
            .values()
            .filter(|i| i.workspace_id == workspace_id)
            .count() as u64)
    }

    async fn delete(&self, id: Uuid) -> Result<(), MembershipError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(MembershipError::Store("delete failed".into()));
        }
        let mut invites = self.invites.write().map_err(|_| poisoned())?;
        invites.remove(&id);
        Ok(())
    }

    async fn delete_scoped(
        &self,
        id: Uuid,
        workspace_id: Uuid,
    ) -> Result<bool, MembershipError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(MembershipError::Store("delete failed".into()));
        }
        let mut invites = self.invites.write().map_err(|_| poisoned())?;
        match invites.get(&id) {
            Some(invite) if invite.workspace_id == workspace_id => {
                invites.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

pub struct MockMembershipRepository {
    memberships: RwLock<HashMap<Uuid, WorkspaceMembership>>,
    profiles: RwLock<HashMap<Uuid, String>>,
    fail_roster: AtomicBool,
}

impl MockMembershipRepository {
    pub fn new() -> Self {
        Self {
            memberships: RwLock::new(HashMap::new()),
            profiles: RwLock::new(HashMap::new()),
            fail_roster: AtomicBool::new(false),
        }
    }

    /// Seeds the display name the roster join would produce for `user_id`.
    pub fn set_display_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> Result<(), MembershipError> {
        let mut profiles = self.profiles.write().map_err(|_| poisoned())?;
        profiles.insert(user_id, name.to_owned());
        Ok(())
    }

    /// Makes [`MembershipRepository::roster`] fail with a store error so
    /// tests can drive the enumerator down its fallback path.
    pub fn set_fail_roster(&self, fail: bool) {
        self.fail_roster.store(fail, Ordering::SeqCst);
    }
}

impl Default for MockMembershipRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MembershipRepository for MockMembershipRepository {
    async fn insert(&self, data: NewMembership) -> Result<MembershipInsert, MembershipError> {
        let mut memberships = self.memberships.write().map_err(|_| poisoned())?;

        let duplicate = memberships
            .values()
            .any(|m| m.workspace_id == data.workspace_id && m.user_id == data.user_id);
        if duplicate {
            return Ok(MembershipInsert::AlreadyMember);
        }

        let membership = WorkspaceMembership {
            id: Uuid::new_v4(),
            workspace_id: data.workspace_id,
            user_id: data.user_id,
            role: data.role,
            invited_by: data.invited_by,
            accepted_at: data.accepted_at,
            created_at: Utc::now(),
        };
        memberships.insert(membership.id, membership.clone());

        Ok(MembershipInsert::Created(membership))
    }

    async fn find_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceMembership>, MembershipError> {
        let memberships = self.memberships.read().map_err(|_| poisoned())?;
        Ok(memberships
            .values()
            .find(|m| m.workspace_id == workspace_id && m.user_id == user_id)
            .cloned())
    }

    async fn list_by_workspace(
        &self,
        workspace_id: Uuid,
    ) -> Result<Vec<WorkspaceMembership>, MembershipError> {
        let memberships = self.memberships.read().map_err(|_| poisoned())?;
        let mut rows: Vec<WorkspaceMembership> = memberships
            .values()
            .filter(|m| m.workspace_id == workspace_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn count_by_workspace(&self, workspace_id: Uuid) -> Result<u64, MembershipError> {
        let memberships = self.memberships.read().map_err(|_| poisoned())?;
        Ok(memberships
            .values()
            .filter(|m| m.workspace_id == workspace_id)
            .count() as u64)
    }

    async fn roster(&self, workspace_id: Uuid) -> Result<Vec<RosterEntry>, MembershipError> {
        if self.fail_roster.load(Ordering::SeqCst) {
            return Err(MembershipError::Store("roster unavailable".into()));
        }

        let rows = self.list_by_workspace(workspace_id).await?;
        let profiles = self.profiles.read().map_err(|_| poisoned())?;
        Ok(rows
            .into_iter()
            .map(|membership| {
                let display_name = profiles.get(&membership.user_id).cloned();
                RosterEntry {
                    membership,
                    display_name,
                }
            })
            .collect())
    }

    async fn delete_by_workspace_and_user(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, MembershipError> {
        let mut memberships = self.memberships.write().map_err(|_| poisoned())?;
        let before = memberships.len();
        memberships.retain(|_, m| !(m.workspace_id == workspace_id && m.user_id == user_id));
        Ok(memberships.len() < before)
    }
}

pub struct MockDirectory {
    names: RwLock<HashMap<Uuid, String>>,
    emails: RwLock<HashMap<Uuid, String>>,
    failing: RwLock<HashSet<Uuid>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self {
            names: RwLock::new(HashMap::new()),
            emails: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
        }
    }

    pub fn set_display_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> Result<(), MembershipError> {
        let mut names = self.names.write().map_err(|_| poisoned())?;
        names.insert(user_id, name.to_owned());
        Ok(())
    }

    pub fn set_email(&self, user_id: Uuid, email: &str) -> Result<(), MembershipError> {
        let mut emails = self.emails.write().map_err(|_| poisoned())?;
        emails.insert(user_id, email.to_owned());
        Ok(())
    }

    /// Makes every lookup for `user_id` fail with a store error.
    pub fn fail_for(&self, user_id: Uuid) -> Result<(), MembershipError> {
        let mut failing = self.failing.write().map_err(|_| poisoned())?;
        failing.insert(user_id);
        Ok(())
    }

    fn check(&self, user_id: Uuid) -> Result<(), MembershipError> {
        let failing = self.failing.read().map_err(|_| poisoned())?;
        if failing.contains(&user_id) {
            return Err(MembershipError::Store("directory offline".into()));
        }
        Ok(())
    }
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Directory for MockDirectory {
    async fn display_name_of(&self, user_id: Uuid) -> Result<Option<String>, MembershipError> {
        self.check(user_id)?;
        let names = self.names.read().map_err(|_| poisoned())?;
        Ok(names.get(&user_id).cloned())
    }

    async fn email_of(&self, user_id: Uuid) -> Result<Option<String>, MembershipError> {
        self.check(user_id)?;
        let emails = self.emails.read().map_err(|_| poisoned())?;
        Ok(emails.get(&user_id).cloned())
    }
}

pub struct MockInviteMailer {
    sent: RwLock<Vec<InviteEmail>>,
    fail: AtomicBool,
}

impl MockInviteMailer {
    pub fn new() -> Self {
        Self {
            sent: RwLock::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent send fail with an external-service error.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Everything delivered so far, oldest first.
    pub fn sent(&self) -> Result<Vec<InviteEmail>, MembershipError> {
        let sent = self.sent.read().map_err(|_| poisoned())?;
        Ok(sent.clone())
    }
}

impl Default for MockInviteMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InviteMailer for MockInviteMailer {
    async fn send_invite(&self, email: InviteEmail) -> Result<(), MembershipError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MembershipError::ExternalService(
                "mail provider rejected the message".into(),
            ));
        }
        let mut sent = self.sent.write().map_err(|_| poisoned())?;
        sent.push(email);
        Ok(())
    }
}

pub struct MockSessionProvider {
    sessions: RwLock<HashMap<String, Identity>>,
}

impl MockSessionProvider {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, credential: &str, identity: Identity) -> Result<(), MembershipError> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        sessions.insert(credential.to_owned(), identity);
        Ok(())
    }
}

impl Default for MockSessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionProvider for MockSessionProvider {
    async fn identify(&self, credential: &str) -> Result<Option<Identity>, MembershipError> {
        let sessions = self.sessions.read().map_err(|_| poisoned())?;
        Ok(sessions.get(credential).cloned())
    }
}

/// Resolver that always errors. Pairs with
/// [`StoreResolver`](crate::resolve::StoreResolver) in chain-fallback tests.
pub struct FailingResolver;

#[async_trait]
impl InviteResolver for FailingResolver {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn resolve(&self, _token: &str) -> Result<Option<WorkspaceInvite>, MembershipError> {
        Err(MembershipError::Store("resolver offline".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{compute_expiry, generate_invite_token};
    use crate::types::{InviteRole, WorkspaceRole};
    use chrono::Duration;

    fn invite_for(workspace_id: Uuid, target: InviteTarget) -> NewInvite {
        NewInvite {
            workspace_id,
            target,
            role: InviteRole::Editor,
            token: generate_invite_token(),
            invited_by: Uuid::new_v4(),
            expires_at: compute_expiry(Duration::days(36_500)),
        }
    }

    fn membership_for(workspace_id: Uuid, user_id: Uuid) -> NewMembership {
        NewMembership {
            workspace_id,
            user_id,
            role: WorkspaceRole::Editor,
            invited_by: Some(Uuid::new_v4()),
            accepted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_workspace_repository() {
        let repo = MockWorkspaceRepository::new();
        let workspace = repo.seed("Family budget", Uuid::new_v4()).unwrap();

        let found = repo.find_by_id(workspace.id).await.unwrap();
        assert_eq!(found, Some(workspace));

        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invite_repository() {
        let repo = MockInviteRepository::new();
        let workspace_id = Uuid::new_v4();

        let data = invite_for(workspace_id, InviteTarget::email("kim@example.com"));
        let raw = data.token.expose_secret().to_owned();
        let invite = repo.create(data).await.unwrap();

        let by_token = repo.find_by_token(&raw).await.unwrap();
        assert_eq!(by_token.as_ref().map(|i| i.id), Some(invite.id));

        let pending = repo
            .find_pending_by_email(workspace_id, "kim@example.com")
            .await
            .unwrap();
        assert!(pending.is_some());
        assert!(repo
            .find_pending_by_email(Uuid::new_v4(), "kim@example.com")
            .await
            .unwrap()
            .is_none());

        assert_eq!(repo.count_by_workspace(workspace_id).await.unwrap(), 1);

        repo.delete(invite.id).await.unwrap();
        assert!(repo.find_by_token(&raw).await.unwrap().is_none());
        repo.delete(invite.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_link_invites_never_match_email_lookup() {
        let repo = MockInviteRepository::new();
        let workspace_id = Uuid::new_v4();

        repo.create(invite_for(
            workspace_id,
            InviteTarget::shareable_link("Grandma"),
        ))
        .await
        .unwrap();

        assert!(repo
            .find_pending_by_email(workspace_id, "grandma@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_invite_conflicts() {
        let repo = MockInviteRepository::new();
        let workspace_id = Uuid::new_v4();

        repo.create(invite_for(workspace_id, InviteTarget::email("kim@example.com")))
            .await
            .unwrap();

        let err = repo
            .create(invite_for(workspace_id, InviteTarget::email("kim@example.com")))
            .await
            .unwrap_err();
        assert!(matches!(err, MembershipError::Conflict));

        // Same address in a different workspace is fine.
        repo.create(invite_for(Uuid::new_v4(), InviteTarget::email("kim@example.com")))
            .await
            .unwrap();

        // Equal guest names never collide; real storage disambiguates link
        // targets with a random marker suffix.
        repo.create(invite_for(
            workspace_id,
            InviteTarget::shareable_link("Grandma"),
        ))
        .await
        .unwrap();
        repo.create(invite_for(
            workspace_id,
            InviteTarget::shareable_link("Grandma"),
        ))
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_token_conflicts() {
        let repo = MockInviteRepository::new();
        let token = generate_invite_token();

        let mut first = invite_for(Uuid::new_v4(), InviteTarget::email("a@example.com"));
        first.token = token.clone();
        repo.create(first).await.unwrap();

        let mut second = invite_for(Uuid::new_v4(), InviteTarget::email("b@example.com"));
        second.token = token;
        let err = repo.create(second).await.unwrap_err();
        assert!(matches!(err, MembershipError::Conflict));
    }

    #[tokio::test]
    async fn test_invite_list_is_newest_first() {
        let repo = MockInviteRepository::new();
        let workspace_id = Uuid::new_v4();

        for n in 0..3 {
            let mut data = invite_for(
                workspace_id,
                InviteTarget::email(format!("user{n}@example.com")),
            );
            data.expires_at = compute_expiry(Duration::days(1));
            repo.create(data).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let rows = repo.list_by_workspace(workspace_id).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].created_at >= rows[1].created_at);
        assert!(rows[1].created_at >= rows[2].created_at);
    }

    #[tokio::test]
    async fn test_delete_scoped_checks_workspace() {
        let repo = MockInviteRepository::new();
        let workspace_id = Uuid::new_v4();
        let invite = repo
            .create(invite_for(workspace_id, InviteTarget::email("kim@example.com")))
            .await
            .unwrap();

        assert!(!repo.delete_scoped(invite.id, Uuid::new_v4()).await.unwrap());
        assert!(repo.delete_scoped(invite.id, workspace_id).await.unwrap());
        assert!(!repo.delete_scoped(invite.id, workspace_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_fail_deletes_toggle() {
        let repo = MockInviteRepository::new();
        let invite = repo
            .create(invite_for(Uuid::new_v4(), InviteTarget::email("kim@example.com")))
            .await
            .unwrap();

        repo.set_fail_deletes(true);
        assert!(repo.delete(invite.id).await.is_err());

        repo.set_fail_deletes(false);
        repo.delete(invite.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_membership_repository() {
        let repo = MockMembershipRepository::new();
        let workspace_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let inserted = repo.insert(membership_for(workspace_id, user_id)).await.unwrap();
        let MembershipInsert::Created(membership) = inserted else {
            panic!("first insert should create");
        };
        assert_eq!(membership.role, WorkspaceRole::Editor);

        let again = repo.insert(membership_for(workspace_id, user_id)).await.unwrap();
        assert_eq!(again, MembershipInsert::AlreadyMember);
        assert_eq!(repo.count_by_workspace(workspace_id).await.unwrap(), 1);

        let found = repo
            .find_by_workspace_and_user(workspace_id, user_id)
            .await
            .unwrap();
        assert_eq!(found, Some(membership));

        assert!(repo
            .delete_by_workspace_and_user(workspace_id, user_id)
            .await
            .unwrap());
        assert!(!repo
            .delete_by_workspace_and_user(workspace_id, user_id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_membership_list_is_oldest_first() {
        let repo = MockMembershipRepository::new();
        let workspace_id = Uuid::new_v4();

        for _ in 0..3 {
            repo.insert(membership_for(workspace_id, Uuid::new_v4()))
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let rows = repo.list_by_workspace(workspace_id).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].created_at <= rows[1].created_at);
        assert!(rows[1].created_at <= rows[2].created_at);
    }

    #[tokio::test]
    async fn test_roster_and_failure_toggle() {
        let repo = MockMembershipRepository::new();
        let workspace_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        repo.insert(membership_for(workspace_id, user_id)).await.unwrap();
        repo.insert(membership_for(workspace_id, Uuid::new_v4()))
            .await
            .unwrap();
        repo.set_display_name(user_id, "Kim").unwrap();

        let roster = repo.roster(workspace_id).await.unwrap();
        assert_eq!(roster.len(), 2);
        let named = roster
            .iter()
            .find(|e| e.membership.user_id == user_id)
            .unwrap();
        assert_eq!(named.display_name.as_deref(), Some("Kim"));
        assert!(roster
            .iter()
            .any(|e| e.membership.user_id != user_id && e.display_name.is_none()));

        repo.set_fail_roster(true);
        assert!(repo.roster(workspace_id).await.is_err());
    }

    #[tokio::test]
    async fn test_directory_batch_skips_failing_users() {
        let directory = MockDirectory::new();
        let good = Uuid::new_v4();
        let bad = Uuid::new_v4();
        let missing = Uuid::new_v4();

        directory.set_display_name(good, "Kim").unwrap();
        directory.set_display_name(bad, "Sam").unwrap();
        directory.fail_for(bad).unwrap();

        let names = directory
            .display_names_of(&[good, bad, missing])
            .await
            .unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names.get(&good).map(String::as_str), Some("Kim"));
    }

    #[tokio::test]
    async fn test_mailer_records_sends_and_fails_on_demand() {
        let mailer = MockInviteMailer::new();
        let email = InviteEmail {
            to: "kim@example.com".into(),
            inviter_name: "Sam".into(),
            workspace_name: "Family budget".into(),
            accept_url: "http://localhost:3000/invite/accept?token=abc".into(),
        };

        mailer.send_invite(email.clone()).await.unwrap();
        assert_eq!(mailer.sent().unwrap(), vec![email.clone()]);

        mailer.set_fail(true);
        let err = mailer.send_invite(email).await.unwrap_err();
        assert!(matches!(err, MembershipError::ExternalService(_)));
        assert_eq!(mailer.sent().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_session_provider() {
        let sessions = MockSessionProvider::new();
        let identity = Identity::new(Uuid::new_v4(), "kim@example.com");
        sessions.insert("token-abc", identity.clone()).unwrap();

        assert_eq!(sessions.identify("token-abc").await.unwrap(), Some(identity));
        assert!(sessions.identify("unknown").await.unwrap().is_none());
    }
}
