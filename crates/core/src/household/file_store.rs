//! File-based household storage implementation
//!
//! Stores households, memberships, invites and profiles as a JSON
//! snapshot on disk, persisted on every mutation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{Household, Invite, InviteStatus, Membership, UserProfile};
use super::store::HouseholdStore;
use crate::identity::Identity;
use crate::{Error, Result};

#[derive(Debug, Default)]
struct SharedState {
    households: HashMap<Uuid, Household>,
    /// Kept in insertion order; discovery order matters to resolution.
    memberships: Vec<Membership>,
    invites: HashMap<Uuid, Invite>,
    profiles: HashMap<String, UserProfile>,
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct StoredSharedState {
    households: Vec<Household>,
    memberships: Vec<Membership>,
    invites: Vec<Invite>,
    profiles: Vec<UserProfile>,
}

impl From<StoredSharedState> for SharedState {
    fn from(value: StoredSharedState) -> Self {
        Self {
            households: value
                .households
                .into_iter()
                .map(|item| (item.id, item))
                .collect(),
            memberships: value.memberships,
            invites: value
                .invites
                .into_iter()
                .map(|item| (item.id, item))
                .collect(),
            profiles: value
                .profiles
                .into_iter()
                .map(|item| (item.uid.clone(), item))
                .collect(),
        }
    }
}

impl From<&SharedState> for StoredSharedState {
    fn from(value: &SharedState) -> Self {
        Self {
            households: value.households.values().cloned().collect(),
            memberships: value.memberships.clone(),
            invites: value.invites.values().cloned().collect(),
            profiles: value.profiles.values().cloned().collect(),
        }
    }
}

/// JSON-file household store.
#[derive(Clone)]
pub struct FileHouseholdStore {
    state: Arc<RwLock<SharedState>>,
    path: PathBuf,
}

impl FileHouseholdStore {
    /// Open (or lazily create) the store backed by `path`.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = load_state(&path).await?;
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            path,
        })
    }

    async fn persist(&self, state: &SharedState) -> Result<()> {
        let content = serde_json::to_string_pretty(&StoredSharedState::from(state))?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

async fn load_state(path: &Path) -> Result<SharedState> {
    if !path.exists() {
        return Ok(SharedState::default());
    }
    let content = tokio::fs::read_to_string(path).await?;
    if content.trim().is_empty() {
        return Ok(SharedState::default());
    }
    let stored: StoredSharedState = serde_json::from_str(&content)?;
    Ok(stored.into())
}

#[async_trait]
impl HouseholdStore for FileHouseholdStore {
    async fn create_household(&self, name: &str, owner: &Identity) -> Result<Household> {
        let household = Household {
            id: Uuid::new_v4(),
            name: name.to_string(),
            owner_uid: owner.uid.clone(),
            owner_email: owner.email.clone(),
            created_at: Utc::now(),
        };
        let mut state = self.state.write().await;
        state.households.insert(household.id, household.clone());
        self.persist(&state).await?;
        Ok(household)
    }

    async fn get_household(&self, id: Uuid) -> Result<Option<Household>> {
        let state = self.state.read().await;
        Ok(state.households.get(&id).cloned())
    }

    async fn put_membership(&self, membership: Membership) -> Result<Membership> {
        let mut state = self.state.write().await;
        if !state.households.contains_key(&membership.household_id) {
            return Err(Error::NotFound(format!(
                "Household not found: {}",
                membership.household_id
            )));
        }
        let existing = state.memberships.iter().position(|entry| {
            entry.household_id == membership.household_id && entry.uid == membership.uid
        });
        match existing {
            Some(index) => state.memberships[index] = membership.clone(),
            None => state.memberships.push(membership.clone()),
        }
        self.persist(&state).await?;
        Ok(membership)
    }

    async fn get_membership(&self, household_id: Uuid, uid: &str) -> Result<Option<Membership>> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .iter()
            .find(|entry| entry.household_id == household_id && entry.uid == uid)
            .cloned())
    }

    async fn memberships_for_uid(&self, uid: &str) -> Result<Vec<Membership>> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .iter()
            .filter(|entry| entry.uid == uid)
            .cloned()
            .collect())
    }

    async fn members_of_household(&self, household_id: Uuid) -> Result<Vec<Membership>> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .iter()
            .filter(|entry| entry.household_id == household_id)
            .cloned()
            .collect())
    }

    async fn create_invite(
        &self,
        household_id: Uuid,
        invited_email: &str,
        invited_by: &Identity,
    ) -> Result<Invite> {
        let invite = Invite {
            id: Uuid::new_v4(),
            household_id,
            invited_email: invited_email.trim().to_string(),
            invited_email_lower: invited_email.trim().to_lowercase(),
            invited_by_uid: invited_by.uid.clone(),
            invited_by_email: invited_by.email.clone(),
            status: InviteStatus::Pending,
            created_at: Utc::now(),
            accepted_by_uid: None,
            accepted_by_email: None,
            accepted_at: None,
        };
        let mut state = self.state.write().await;
        if !state.households.contains_key(&household_id) {
            return Err(Error::NotFound(format!(
                "Household not found: {}",
                household_id
            )));
        }
        state.invites.insert(invite.id, invite.clone());
        self.persist(&state).await?;
        Ok(invite)
    }

    async fn pending_invites_for_email(&self, email_lower: &str) -> Result<Vec<Invite>> {
        let state = self.state.read().await;
        Ok(state
            .invites
            .values()
            .filter(|invite| {
                invite.status == InviteStatus::Pending && invite.invited_email_lower == email_lower
            })
            .cloned()
            .collect())
    }

    async fn pending_invites_for_household(&self, household_id: Uuid) -> Result<Vec<Invite>> {
        let state = self.state.read().await;
        Ok(state
            .invites
            .values()
            .filter(|invite| {
                invite.status == InviteStatus::Pending && invite.household_id == household_id
            })
            .cloned()
            .collect())
    }

    async fn mark_invite_accepted(
        &self,
        household_id: Uuid,
        invite_id: Uuid,
        accepted_by: &Identity,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let invite = state
            .invites
            .get_mut(&invite_id)
            .filter(|invite| invite.household_id == household_id)
            .ok_or_else(|| Error::NotFound(format!("Invite not found: {}", invite_id)))?;
        invite.status = InviteStatus::Accepted;
        invite.accepted_by_uid = Some(accepted_by.uid.clone());
        invite.accepted_by_email = Some(accepted_by.email.clone());
        invite.accepted_at = Some(Utc::now());
        self.persist(&state).await?;
        Ok(())
    }

    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>> {
        let state = self.state.read().await;
        Ok(state.profiles.get(uid).cloned())
    }

    async fn upsert_profile(&self, profile: UserProfile) -> Result<()> {
        let mut state = self.state.write().await;
        state.profiles.insert(profile.uid.clone(), profile);
        self.persist(&state).await?;
        Ok(())
    }
}
