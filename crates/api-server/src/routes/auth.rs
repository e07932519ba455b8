//! Sign-in endpoints and session resolution
//!
//! Registration and login both end with household resolution for the
//! signed-in identity, so the client always receives a usable session —
//! in the worst case a legacy one.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sv_core::household::resolution::{resolve_or_legacy, switch_household};
use sv_core::identity::Identity;
use sv_core::session::SessionContext;

use crate::auth::{identity_from_headers, issue_session_jwt, AuthError, UserSummary};
use crate::state::AppState;

/// Fixed notice shown wherever the sharing surface is unavailable.
pub const SHARING_UNAVAILABLE_NOTICE: &str =
    "Sharing is unavailable right now. Your items are safe in your personal inventory.";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type RouteError = (StatusCode, Json<ErrorResponse>);

pub fn route_error(status: StatusCode, error: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

pub fn unauthorized(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::UNAUTHORIZED, error)
}

pub fn forbidden(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::FORBIDDEN, error)
}

pub fn bad_request(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::BAD_REQUEST, error)
}

pub fn conflict(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::CONFLICT, error)
}

pub fn sharing_unavailable() -> RouteError {
    route_error(StatusCode::SERVICE_UNAVAILABLE, SHARING_UNAVAILABLE_NOTICE)
}

pub fn internal_error(error: impl std::fmt::Display) -> RouteError {
    route_error(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}

pub fn map_auth_error(err: AuthError) -> RouteError {
    match err {
        AuthError::InvalidInput(message) => bad_request(message),
        AuthError::Unauthorized(message) => unauthorized(message),
        AuthError::Conflict(message) => conflict(message),
        AuthError::Storage(message) => internal_error(message),
    }
}

pub fn map_core_error(err: sv_core::Error) -> RouteError {
    match err {
        sv_core::Error::InvalidInput(message) => bad_request(message),
        sv_core::Error::Forbidden(message) => forbidden(message),
        sv_core::Error::PermissionDenied(message) => forbidden(message),
        sv_core::Error::NotFound(message) => route_error(StatusCode::NOT_FOUND, message),
        sv_core::Error::Conflict(message) => conflict(message),
        other => internal_error(other),
    }
}

/// Identity from the bearer token, or 401.
pub fn require_identity(headers: &HeaderMap) -> Result<Identity, RouteError> {
    identity_from_headers(headers).map_err(unauthorized)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    email: String,
    password: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwitchHouseholdRequest {
    household_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    token: String,
    expires_at: String,
    uid: String,
    email: String,
    name: String,
    session: SessionContext,
}

fn format_expiry(exp: usize) -> String {
    DateTime::<Utc>::from_timestamp(exp as i64, 0)
        .map(|value| value.to_rfc3339())
        .unwrap_or_else(|| Utc::now().to_rfc3339())
}

fn identity_of(user: &UserSummary) -> Identity {
    Identity::new(
        user.id.to_string(),
        user.email.clone(),
        user.display_name.clone(),
    )
}

async fn signed_in_response(
    state: &AppState,
    user: UserSummary,
) -> Result<AuthResponse, RouteError> {
    let (token, exp) = issue_session_jwt(&user).map_err(internal_error)?;
    let identity = identity_of(&user);
    let session =
        resolve_or_legacy(state.household_store(), state.item_store(), &identity).await;
    Ok(AuthResponse {
        token,
        expires_at: format_expiry(exp),
        uid: user.id.to_string(),
        email: user.email,
        name: user.display_name,
        session,
    })
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), RouteError> {
    let user = state
        .user_store()
        .register(&req.email, &req.password, &req.name)
        .await
        .map_err(map_auth_error)?;
    let response = signed_in_response(&state, user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, RouteError> {
    let user = state
        .user_store()
        .login(&req.email, &req.password)
        .await
        .map_err(map_auth_error)?;
    let response = signed_in_response(&state, user).await?;
    Ok(Json(response))
}

async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionContext>, RouteError> {
    let identity = require_identity(&headers)?;
    let session =
        resolve_or_legacy(state.household_store(), state.item_store(), &identity).await;
    Ok(Json(session))
}

async fn switch_active_household(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SwitchHouseholdRequest>,
) -> Result<Json<SessionContext>, RouteError> {
    let identity = require_identity(&headers)?;
    let mut session =
        resolve_or_legacy(state.household_store(), state.item_store(), &identity).await;
    if session.is_legacy() {
        return Err(sharing_unavailable());
    }
    switch_household(
        state.household_store(),
        &identity,
        &mut session,
        req.household_id,
    )
    .await
    .map_err(map_core_error)?;
    Ok(Json(session))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/session", get(session))
        .route("/api/v1/session/household", post(switch_active_household))
}
