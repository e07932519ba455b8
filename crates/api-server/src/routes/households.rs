//! Member and invite routes for the active household
//!
//! Sharing is additive: when the bearer session is in legacy mode these
//! routes answer with the fixed unavailable notice instead of an error
//! that would block the rest of the app.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use sv_core::household::resolution::resolve_or_legacy;
use sv_core::household::{invites, Invite, Membership};
use sv_core::inventory::ItemScope;
use sv_core::session::SessionContext;

use crate::state::AppState;

use super::auth::{
    forbidden, map_core_error, require_identity, sharing_unavailable, ErrorResponse, RouteError,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendInviteRequest {
    pub email: String,
}

async fn shared_session_for(
    state: &AppState,
    headers: &HeaderMap,
    household_id: Uuid,
) -> Result<(sv_core::identity::Identity, SessionContext), RouteError> {
    let identity = require_identity(headers)?;
    let session =
        resolve_or_legacy(state.household_store(), state.item_store(), &identity).await;
    if session.is_legacy() {
        return Err(sharing_unavailable());
    }
    if !session
        .memberships
        .iter()
        .any(|entry| entry.id == household_id)
    {
        return Err(forbidden("Cross-household access denied"));
    }
    Ok((identity, session))
}

async fn list_members(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(household_id): Path<Uuid>,
) -> Result<Json<Vec<Membership>>, (StatusCode, Json<ErrorResponse>)> {
    shared_session_for(&state, &headers, household_id).await?;
    let members = invites::list_members(state.household_store(), household_id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(members))
}

async fn list_invites(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(household_id): Path<Uuid>,
) -> Result<Json<Vec<Invite>>, (StatusCode, Json<ErrorResponse>)> {
    shared_session_for(&state, &headers, household_id).await?;
    let pending = invites::list_pending_invites(state.household_store(), household_id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(pending))
}

async fn send_invite(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(household_id): Path<Uuid>,
    Json(req): Json<SendInviteRequest>,
) -> Result<(StatusCode, Json<Invite>), (StatusCode, Json<ErrorResponse>)> {
    let (identity, _session) = shared_session_for(&state, &headers, household_id).await?;
    let invite = invites::send_invite(
        state.household_store(),
        &identity,
        household_id,
        &req.email,
    )
    .await
    .map_err(map_core_error)?;

    state
        .notify_scope(&ItemScope::Household(household_id), "invites:changed")
        .await;
    Ok((StatusCode::CREATED, Json(invite)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/households/{household_id}/members",
            get(list_members),
        )
        .route(
            "/api/v1/households/{household_id}/invites",
            get(list_invites).post(send_invite),
        )
}
