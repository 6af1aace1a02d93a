use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use uuid::Uuid;

use super::error::AppError;
use super::middleware::CallerSession;
use super::routes::MembershipState;
use super::types::{
    AcceptInviteRequest, AcceptInviteResponse, CreateInviteResponse, CreateLinkInviteRequest,
    InviteMemberRequest, LoginRequiredResponse, MessageResponse,
};
use crate::actions::{
    AcceptInvite, CancelInvite, CreateEmailInvite, CreateEmailInviteInput, CreateLinkInvite,
    CreateLinkInviteInput, ListInvites, ListMembers, RemoveMember,
};
use crate::error::MembershipError;
use crate::repository::{
    Directory, InviteMailer, InviteRepository, MembershipRepository, SessionProvider,
    WorkspaceRepository,
};

pub async fn create_email_invite<W, I, M, D, E, S>(
    State(state): State<MembershipState<W, I, M, D, E, S>>,
    session: CallerSession<S>,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<InviteMemberRequest>,
) -> Result<impl IntoResponse, AppError>
where
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    I: InviteRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    D: Directory + Clone + Send + Sync + 'static,
    E: InviteMailer + Clone + Send + Sync + 'static,
    S: SessionProvider + Clone + Send + Sync + 'static,
{
    let action = CreateEmailInvite::new(
        state.workspaces.clone(),
        state.invites.clone(),
        state.memberships.clone(),
        state.directory.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    let output = action
        .execute(
            session.identity(),
            CreateEmailInviteInput {
                workspace_id,
                email: body.email,
                role: body.role,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateInviteResponse {
            invite: output.invite,
            accept_url: output.accept_url,
            delivery: output.delivery,
        }),
    ))
}

pub async fn create_link_invite<W, I, M, D, E, S>(
    State(state): State<MembershipState<W, I, M, D, E, S>>,
    session: CallerSession<S>,
    Path(workspace_id): Path<Uuid>,
    Json(body): Json<CreateLinkInviteRequest>,
) -> Result<impl IntoResponse, AppError>
where
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    I: InviteRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    D: Directory + Clone + Send + Sync + 'static,
    E: InviteMailer + Clone + Send + Sync + 'static,
    S: SessionProvider + Clone + Send + Sync + 'static,
{
    let action = CreateLinkInvite::new(
        state.workspaces.clone(),
        state.invites.clone(),
        state.memberships.clone(),
        state.config.clone(),
    );

    let output = action
        .execute(
            session.identity(),
            CreateLinkInviteInput {
                workspace_id,
                guest_name: body.guest_name,
                role: body.role,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateInviteResponse {
            invite: output.invite,
            accept_url: output.accept_url,
            delivery: output.delivery,
        }),
    ))
}

pub async fn list_invites<W, I, M, D, E, S>(
    State(state): State<MembershipState<W, I, M, D, E, S>>,
    session: CallerSession<S>,
    Path(workspace_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    I: InviteRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    D: Directory + Clone + Send + Sync + 'static,
    E: InviteMailer + Clone + Send + Sync + 'static,
    S: SessionProvider + Clone + Send + Sync + 'static,
{
    let action = ListInvites::new(state.invites.clone(), state.memberships.clone());
    let invites = action.execute(session.identity(), workspace_id).await?;
    Ok(Json(invites))
}

pub async fn cancel_invite<W, I, M, D, E, S>(
    State(state): State<MembershipState<W, I, M, D, E, S>>,
    session: CallerSession<S>,
    Path((workspace_id, invite_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError>
where
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    I: InviteRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    D: Directory + Clone + Send + Sync + 'static,
    E: InviteMailer + Clone + Send + Sync + 'static,
    S: SessionProvider + Clone + Send + Sync + 'static,
{
    let action = CancelInvite::new(state.invites.clone(), state.memberships.clone());
    action
        .execute(session.identity(), workspace_id, invite_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "invite cancelled".to_owned(),
    }))
}

pub async fn list_members<W, I, M, D, E, S>(
    State(state): State<MembershipState<W, I, M, D, E, S>>,
    session: CallerSession<S>,
    Path(workspace_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError>
where
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    I: InviteRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    D: Directory + Clone + Send + Sync + 'static,
    E: InviteMailer + Clone + Send + Sync + 'static,
    S: SessionProvider + Clone + Send + Sync + 'static,
{
    let action = ListMembers::new(
        state.memberships.clone(),
        state.directory.clone(),
        state.config.clone(),
    );
    let members = action.execute(session.identity(), workspace_id).await?;
    Ok(Json(members))
}

pub async fn remove_member<W, I, M, D, E, S>(
    State(state): State<MembershipState<W, I, M, D, E, S>>,
    session: CallerSession<S>,
    Path((workspace_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError>
where
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    I: InviteRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    D: Directory + Clone + Send + Sync + 'static,
    E: InviteMailer + Clone + Send + Sync + 'static,
    S: SessionProvider + Clone + Send + Sync + 'static,
{
    let action = RemoveMember::new(state.memberships.clone());
    action
        .execute(session.identity(), workspace_id, user_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "member removed".to_owned(),
    }))
}

/// Accepts an invite token on behalf of the caller's session.
///
/// An unauthenticated call gets a 401 whose body carries the login URL
/// round-tripping the token, so the client can send the invitee through
/// sign-in and back into acceptance.
pub async fn accept_invite<W, I, M, D, E, S>(
    State(state): State<MembershipState<W, I, M, D, E, S>>,
    session: CallerSession<S>,
    Json(body): Json<AcceptInviteRequest>,
) -> Result<Response, AppError>
where
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    I: InviteRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    D: Directory + Clone + Send + Sync + 'static,
    E: InviteMailer + Clone + Send + Sync + 'static,
    S: SessionProvider + Clone + Send + Sync + 'static,
{
    let action = AcceptInvite::new(
        state.resolvers.clone(),
        state.invites.clone(),
        state.memberships.clone(),
        state.config.clone(),
    );

    match action.execute(session.identity(), &body.token).await {
        Ok(output) => Ok(Json(AcceptInviteResponse {
            workspace_id: output.workspace_id,
            already_member: output.already_member,
            membership: output.membership,
        })
        .into_response()),
        Err(MembershipError::Unauthorized) => Ok((
            StatusCode::UNAUTHORIZED,
            Json(LoginRequiredResponse {
                error: MembershipError::Unauthorized.to_string(),
                code: MembershipError::Unauthorized.code().to_owned(),
                login_url: state.config.login_redirect_url(body.token.trim()),
            }),
        )
            .into_response()),
        Err(err) => Err(AppError(err)),
    }
}

/// Redirects a short invite link (`/i/:token`) to the acceptance page.
pub async fn invite_link_redirect<W, I, M, D, E, S>(
    State(state): State<MembershipState<W, I, M, D, E, S>>,
    Path(token): Path<String>,
) -> Redirect
where
    W: WorkspaceRepository + Clone + Send + Sync + 'static,
    I: InviteRepository + Clone + Send + Sync + 'static,
    M: MembershipRepository + Clone + Send + Sync + 'static,
    D: Directory + Clone + Send + Sync + 'static,
    E: InviteMailer + Clone + Send + Sync + 'static,
    S: SessionProvider + Clone + Send + Sync + 'static,
{
    Redirect::temporary(&state.config.accept_page_url(token.trim()))
}
