//! Identity provider: user registry plus JWT session tokens.
//!
//! The household core only ever sees the [`Identity`] value resolved
//! from a bearer token; everything else here is provider plumbing.

mod jwt;
mod store;

pub use jwt::{issue_session_jwt, verify_session_jwt, SessionClaims};
pub use store::{AuthError, UserStore, UserSummary};

use axum::http::HeaderMap;
use sv_core::identity::Identity;

/// Resolve the signed-in identity from an `Authorization: Bearer` header.
pub fn identity_from_headers(headers: &HeaderMap) -> Result<Identity, String> {
    let header = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| "Missing Authorization header".to_string())?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| "Expected a Bearer token".to_string())?;
    let claims = verify_session_jwt(token)?;
    Ok(Identity::new(claims.sub, claims.email, claims.name))
}
