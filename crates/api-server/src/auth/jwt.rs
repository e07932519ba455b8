use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::store::UserSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub exp: usize,
}

fn jwt_secret() -> String {
    std::env::var("SV_JWT_SECRET").unwrap_or_else(|_| "dev-jwt-secret-change-me".to_string())
}

fn token_ttl_hours() -> i64 {
    std::env::var("SV_TOKEN_TTL_HOURS")
        .ok()
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|ttl| *ttl > 0)
        .unwrap_or(24)
}

pub fn issue_session_jwt(user: &UserSummary) -> Result<(String, usize), String> {
    let exp = (Utc::now() + Duration::hours(token_ttl_hours())).timestamp() as usize;
    let claims = SessionClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        name: user.display_name.clone(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_bytes()),
    )
    .map(|token| (token, exp))
    .map_err(|err| format!("Failed to sign session JWT: {}", err))
}

pub fn verify_session_jwt(token: &str) -> Result<SessionClaims, String> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_bytes()),
        &validation,
    )
    .map(|decoded| decoded.claims)
    .map_err(|err| format!("Invalid session JWT: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn issue_and_verify_round_trip() {
        let user = UserSummary {
            id: Uuid::new_v4(),
            email: "dev@example.com".to_string(),
            display_name: "Dev".to_string(),
            created_at: Utc::now(),
        };
        let (token, exp) = issue_session_jwt(&user).unwrap();
        let claims = verify_session_jwt(&token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "dev@example.com");
        assert_eq!(claims.name, "Dev");
        assert_eq!(claims.exp, exp);
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_session_jwt("not-a-token").is_err());
    }
}
