use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct User {
    id: Uuid,
    email: String,
    display_name: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    disabled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredUsers {
    users: Vec<User>,
}

/// File-backed user registry with salted password hashes.
#[derive(Clone)]
pub struct UserStore {
    state: Arc<RwLock<HashMap<Uuid, User>>>,
    file_path: PathBuf,
}

impl UserStore {
    pub async fn new(file_path: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let file_path = file_path.into();
        let state = load_users(&file_path).await?;
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            file_path,
        })
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserSummary, AuthError> {
        let normalized_email = normalize_email(email)?;
        validate_password(password)?;
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(AuthError::InvalidInput("Name cannot be empty".to_string()));
        }

        let mut state = self.state.write().await;
        if state.values().any(|user| user.email == normalized_email) {
            return Err(AuthError::Conflict(format!(
                "User '{}' already exists",
                normalized_email
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: normalized_email,
            display_name: display_name.to_string(),
            password_hash: hash_password(password),
            created_at: Utc::now(),
            disabled_at: None,
        };
        state.insert(user.id, user.clone());
        persist_users(&self.file_path, &state).await?;
        Ok(user_to_summary(&user))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserSummary, AuthError> {
        let normalized_email = normalize_email(email)?;
        let state = self.state.read().await;
        let user = state
            .values()
            .find(|user| user.email == normalized_email)
            .ok_or_else(|| AuthError::Unauthorized("Invalid credentials".to_string()))?;
        if user.disabled_at.is_some() || !verify_password(&user.password_hash, password) {
            return Err(AuthError::Unauthorized("Invalid credentials".to_string()));
        }
        Ok(user_to_summary(user))
    }

    pub async fn get(&self, id: Uuid) -> Option<UserSummary> {
        let state = self.state.read().await;
        state.get(&id).map(user_to_summary)
    }
}

fn user_to_summary(user: &User) -> UserSummary {
    UserSummary {
        id: user.id,
        email: user.email.clone(),
        display_name: user.display_name.clone(),
        created_at: user.created_at,
    }
}

async fn load_users(path: &Path) -> Result<HashMap<Uuid, User>, AuthError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| AuthError::Storage(format!("Failed to read user state: {}", err)))?;
    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }
    let stored: StoredUsers = serde_json::from_str(&content)
        .map_err(|err| AuthError::Storage(format!("Failed to parse user state: {}", err)))?;
    Ok(stored.users.into_iter().map(|user| (user.id, user)).collect())
}

async fn persist_users(path: &Path, state: &HashMap<Uuid, User>) -> Result<(), AuthError> {
    let stored = StoredUsers {
        users: state.values().cloned().collect(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AuthError::Storage(format!("Failed to serialize user state: {}", err)))?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| AuthError::Storage(format!("Failed to create user dir: {}", err)))?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|err| AuthError::Storage(format!("Failed to write user state: {}", err)))?;
    Ok(())
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return Err(AuthError::InvalidInput("Invalid email".to_string()));
    }
    Ok(normalized)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < 8 {
        return Err(AuthError::InvalidInput(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

fn hash_password(password: &str) -> String {
    let mut salt = [0_u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    format!(
        "v1${}${}",
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(digest)
    )
}

fn verify_password(stored_hash: &str, password: &str) -> bool {
    let mut parts = stored_hash.split('$');
    let version = parts.next();
    let encoded_salt = parts.next();
    let encoded_digest = parts.next();
    if version != Some("v1") || encoded_salt.is_none() || encoded_digest.is_none() {
        return false;
    }

    let salt = match URL_SAFE_NO_PAD.decode(encoded_salt.unwrap()) {
        Ok(value) => value,
        Err(_) => return false,
    };
    let expected_digest = match URL_SAFE_NO_PAD.decode(encoded_digest.unwrap()) {
        Ok(value) => value,
        Err(_) => return false,
    };

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(password.as_bytes());
    let actual_digest = hasher.finalize();
    expected_digest == actual_digest.as_slice()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn build_store() -> (UserStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = UserStore::new(temp_dir.path().join("users.json")).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn register_and_login_roundtrip() {
        let (store, _temp_dir) = build_store().await;
        let registered = store
            .register("Owner@Example.com", "verysecurepw", "Owner")
            .await
            .unwrap();
        assert_eq!(registered.email, "owner@example.com");

        let logged_in = store.login("owner@example.com", "verysecurepw").await.unwrap();
        assert_eq!(logged_in.id, registered.id);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let (store, _temp_dir) = build_store().await;
        store
            .register("owner@example.com", "verysecurepw", "Owner")
            .await
            .unwrap();
        let result = store.register("owner@example.com", "differentpw", "Other").await;
        assert!(matches!(result.unwrap_err(), AuthError::Conflict(_)));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (store, _temp_dir) = build_store().await;
        store
            .register("owner@example.com", "verysecurepw", "Owner")
            .await
            .unwrap();
        let result = store.login("owner@example.com", "wrong-password").await;
        assert!(matches!(result.unwrap_err(), AuthError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn short_password_rejected() {
        let (store, _temp_dir) = build_store().await;
        let result = store.register("owner@example.com", "short", "Owner").await;
        assert!(matches!(result.unwrap_err(), AuthError::InvalidInput(_)));
    }
}
