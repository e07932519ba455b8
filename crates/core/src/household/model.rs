//! Household record definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::identity::Identity;
use crate::Error;

/// Role an identity holds within a household.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseholdRole {
    Owner,
    Member,
}

impl HouseholdRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Member => "member",
        }
    }

    pub fn can_send_invites(self) -> bool {
        matches!(self, Self::Owner)
    }
}

impl FromStr for HouseholdRole {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "member" => Ok(Self::Member),
            _ => Err(Error::InvalidInput(format!(
                "Unsupported role '{}'",
                value
            ))),
        }
    }
}

/// Lifecycle of an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    Pending,
    Accepted,
}

/// The sharing/ownership boundary for a set of inventory items.
///
/// Created once at provisioning; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    pub id: Uuid,
    pub name: String,
    pub owner_uid: String,
    pub owner_email: String,
    pub created_at: DateTime<Utc>,
}

/// Join record granting an identity a role within a household.
///
/// Keyed by `(household_id, uid)`; exactly one per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub household_id: Uuid,
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub role: HouseholdRole,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(household_id: Uuid, identity: &Identity, role: HouseholdRole) -> Self {
        Self {
            household_id,
            uid: identity.uid.clone(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            role,
            created_at: Utc::now(),
        }
    }
}

/// A pending offer of membership addressed to an email, redeemable by the
/// matching identity at sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    pub id: Uuid,
    pub household_id: Uuid,
    pub invited_email: String,
    /// Normalized form used for matching at acceptance time.
    pub invited_email_lower: String,
    pub invited_by_uid: String,
    pub invited_by_email: String,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_by_uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_by_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
}

/// Per-identity profile; remembers the last active household across
/// sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub active_household_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrated_legacy_items_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn new(identity: &Identity) -> Self {
        Self {
            uid: identity.uid.clone(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            active_household_id: None,
            migrated_legacy_items_at: None,
        }
    }
}

/// One entry of the session's membership list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdSummary {
    pub id: Uuid,
    pub name: String,
    pub role: HouseholdRole,
}
