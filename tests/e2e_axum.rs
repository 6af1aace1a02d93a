//! End-to-end tests for the Axum HTTP API layer.
//!
//! These tests use mock repositories - no database required.
//! Run with: `cargo test --features "axum mocks" --test e2e_axum`

#![cfg(all(feature = "axum", feature = "mocks"))]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use anteroom::api::{accept_routes, membership_routes, MembershipState};
use anteroom::mocks::{
    MockDirectory, MockInviteMailer, MockInviteRepository, MockMembershipRepository,
    MockSessionProvider, MockWorkspaceRepository,
};
use anteroom::repository::{MembershipRepository, NewMembership};
use anteroom::resolve::{InviteResolver, StoreResolver};
use anteroom::types::{Identity, Workspace, WorkspaceRole};
use anteroom::AnteroomConfig;

const OWNER_TOKEN: &str = "session-owner";

struct World {
    app: Router,
    sessions: Arc<MockSessionProvider>,
    memberships: Arc<MockMembershipRepository>,
    workspace: Workspace,
    owner: Identity,
}

async fn create_world() -> World {
    let workspaces = Arc::new(MockWorkspaceRepository::new());
    let invites = Arc::new(MockInviteRepository::new());
    let memberships = Arc::new(MockMembershipRepository::new());
    let directory = Arc::new(MockDirectory::new());
    let mailer = Arc::new(MockInviteMailer::new());
    let sessions = Arc::new(MockSessionProvider::new());

    let owner = Identity::new(Uuid::new_v4(), "owner@example.com");
    let workspace = workspaces.seed("Family budget", owner.user_id).unwrap();
    memberships
        .insert(NewMembership {
            workspace_id: workspace.id,
            user_id: owner.user_id,
            role: WorkspaceRole::Owner,
            invited_by: None,
            accepted_at: Utc::now(),
        })
        .await
        .unwrap();
    sessions.insert(OWNER_TOKEN, owner.clone()).unwrap();

    let resolvers: Vec<Arc<dyn InviteResolver>> =
        vec![Arc::new(StoreResolver::new(Arc::clone(&invites)))];
    let state = MembershipState {
        workspaces,
        invites,
        memberships: Arc::clone(&memberships),
        directory,
        mailer,
        sessions: Arc::clone(&sessions),
        resolvers,
        config: AnteroomConfig::new("https://app.example.com"),
    };

    let app = Router::new()
        .merge(membership_routes())
        .merge(accept_routes())
        .with_state(state);

    World {
        app,
        sessions,
        memberships,
        workspace,
        owner,
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn invite_kim(world: &World) -> (serde_json::Value, String) {
    let (status, body) = send(
        &world.app,
        "POST",
        &format!("/workspaces/{}/invites", world.workspace.id),
        Some(OWNER_TOKEN),
        Some(serde_json::json!({"email": "kim@example.com", "role": "editor"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let accept_url = body["accept_url"].as_str().unwrap().to_owned();
    let token = accept_url.rsplit("/i/").next().unwrap().to_owned();
    (body, token)
}

#[tokio::test]
async fn test_create_invite_success() {
    let world = create_world().await;
    let (body, _token) = invite_kim(&world).await;

    assert_eq!(body["delivery"]["status"], "sent");
    assert_eq!(body["invite"]["target"]["kind"], "email");
    assert_eq!(body["invite"]["target"]["address"], "kim@example.com");
    assert!(
        body["invite"].get("token").is_none(),
        "invite JSON must not carry the raw token"
    );
}

#[tokio::test]
async fn test_create_invite_requires_authentication() {
    let world = create_world().await;
    let (status, body) = send(
        &world.app,
        "POST",
        &format!("/workspaces/{}/invites", world.workspace.id),
        None,
        Some(serde_json::json!({"email": "kim@example.com", "role": "editor"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn test_create_invite_requires_manager_role() {
    let world = create_world().await;
    let viewer = Identity::new(Uuid::new_v4(), "viewer@example.com");
    world
        .memberships
        .insert(NewMembership {
            workspace_id: world.workspace.id,
            user_id: viewer.user_id,
            role: WorkspaceRole::Viewer,
            invited_by: Some(world.owner.user_id),
            accepted_at: Utc::now(),
        })
        .await
        .unwrap();
    world.sessions.insert("session-viewer", viewer).unwrap();

    let (status, body) = send(
        &world.app,
        "POST",
        &format!("/workspaces/{}/invites", world.workspace.id),
        Some("session-viewer"),
        Some(serde_json::json!({"email": "kim@example.com", "role": "editor"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");
}

#[tokio::test]
async fn test_duplicate_invite_conflicts() {
    let world = create_world().await;
    invite_kim(&world).await;

    let (status, body) = send(
        &world.app,
        "POST",
        &format!("/workspaces/{}/invites", world.workspace.id),
        Some(OWNER_TOKEN),
        Some(serde_json::json!({"email": "KIM@example.com", "role": "viewer"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn test_invalid_email_is_bad_request() {
    let world = create_world().await;
    let (status, body) = send(
        &world.app,
        "POST",
        &format!("/workspaces/{}/invites", world.workspace.id),
        Some(OWNER_TOKEN),
        Some(serde_json::json!({"email": "not-an-email", "role": "editor"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
}

#[tokio::test]
async fn test_create_link_invite() {
    let world = create_world().await;
    let (status, body) = send(
        &world.app,
        "POST",
        &format!("/workspaces/{}/invites/link", world.workspace.id),
        Some(OWNER_TOKEN),
        Some(serde_json::json!({"guest_name": "Grandma"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["delivery"]["status"], "not_applicable");
    assert_eq!(body["invite"]["target"]["kind"], "shareable_link");
    assert_eq!(body["invite"]["target"]["guest_name"], "Grandma");
    assert_eq!(body["invite"]["role"], "editor", "config default role");
}

#[tokio::test]
async fn test_accept_invite_end_to_end() {
    let world = create_world().await;
    let (_body, token) = invite_kim(&world).await;

    let kim = Identity::new(Uuid::new_v4(), "kim@example.com");
    world.sessions.insert("session-kim", kim).unwrap();

    let (status, body) = send(
        &world.app,
        "POST",
        "/invite/accept",
        Some("session-kim"),
        Some(serde_json::json!({"token": token})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["workspace_id"], world.workspace.id.to_string());
    assert_eq!(body["already_member"], false);
    assert_eq!(body["membership"]["role"], "editor");

    // The new member shows up in the member list.
    let (status, body) = send(
        &world.app,
        "GET",
        &format!("/workspaces/{}/members", world.workspace.id),
        Some("session-kim"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unauthenticated_accept_gets_login_url() {
    let world = create_world().await;
    let (_body, token) = invite_kim(&world).await;

    let (status, body) = send(
        &world.app,
        "POST",
        "/invite/accept",
        None,
        Some(serde_json::json!({"token": token})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
    let login_url = body["login_url"].as_str().unwrap();
    assert!(login_url.contains("/login?redirect=%2Finvite%2Faccept%3Ftoken%3D"));
    assert!(login_url.ends_with(&token), "token round-trips through login");
}

#[tokio::test]
async fn test_accept_with_unknown_token_is_bad_request() {
    let world = create_world().await;
    let kim = Identity::new(Uuid::new_v4(), "kim@example.com");
    world.sessions.insert("session-kim", kim).unwrap();

    let (status, body) = send(
        &world.app,
        "POST",
        "/invite/accept",
        Some("session-kim"),
        Some(serde_json::json!({"token": "no-such-token"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_token");
}

#[tokio::test]
async fn test_email_mismatch_names_expected_address() {
    let world = create_world().await;
    let (_body, token) = invite_kim(&world).await;

    let stranger = Identity::new(Uuid::new_v4(), "stranger@example.com");
    world.sessions.insert("session-stranger", stranger).unwrap();

    let (status, body) = send(
        &world.app,
        "POST",
        "/invite/accept",
        Some("session-stranger"),
        Some(serde_json::json!({"token": token})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "email_mismatch");
    assert!(body["error"].as_str().unwrap().contains("kim@example.com"));
}

#[tokio::test]
async fn test_short_link_redirects_to_accept_page() {
    let world = create_world().await;
    let request = Request::builder()
        .method("GET")
        .uri("/i/sometoken123")
        .body(Body::empty())
        .unwrap();

    let response = world.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://app.example.com/invite/accept?token=sometoken123"
    );
}

#[tokio::test]
async fn test_list_and_cancel_invite() {
    let world = create_world().await;
    invite_kim(&world).await;

    let (status, body) = send(
        &world.app,
        "GET",
        &format!("/workspaces/{}/invites", world.workspace.id),
        Some(OWNER_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].get("token").is_none());
    let invite_id = listed[0]["id"].as_str().unwrap().to_owned();

    let (status, _body) = send(
        &world.app,
        "DELETE",
        &format!("/workspaces/{}/invites/{invite_id}", world.workspace.id),
        Some(OWNER_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &world.app,
        "DELETE",
        &format!("/workspaces/{}/invites/{invite_id}", world.workspace.id),
        Some(OWNER_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_remove_member_rules_over_http() {
    let world = create_world().await;
    let editor = Identity::new(Uuid::new_v4(), "editor@example.com");
    world
        .memberships
        .insert(NewMembership {
            workspace_id: world.workspace.id,
            user_id: editor.user_id,
            role: WorkspaceRole::Editor,
            invited_by: Some(world.owner.user_id),
            accepted_at: Utc::now(),
        })
        .await
        .unwrap();

    // The owner is protected.
    let (status, body) = send(
        &world.app,
        "DELETE",
        &format!(
            "/workspaces/{}/members/{}",
            world.workspace.id, world.owner.user_id
        ),
        Some(OWNER_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    // Removing the editor works.
    let (status, body) = send(
        &world.app,
        "DELETE",
        &format!(
            "/workspaces/{}/members/{}",
            world.workspace.id, editor.user_id
        ),
        Some(OWNER_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "member removed");
}
