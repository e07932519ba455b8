//! Session context
//!
//! The explicit, per-sign-in value that says which inventory an identity
//! sees. Rebuilt in full by household resolution at every sign-in and
//! dropped at sign-out; nothing here is ambient.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::household::model::{HouseholdRole, HouseholdSummary};
use crate::identity::Identity;
use crate::inventory::store::ItemScope;

/// How the session reaches its inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Shared-household mode: items live under the active household.
    Shared,
    /// Degraded single-user mode: shared data is unreachable, items live
    /// under the identity's personal collection. Sharing features are
    /// unavailable but item CRUD works.
    Legacy,
}

/// Everything household resolution decides for one sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub mode: SessionMode,
    pub active_household_id: Option<Uuid>,
    pub active_role: Option<HouseholdRole>,
    /// Households the identity belongs to, sorted by name.
    pub memberships: Vec<HouseholdSummary>,
}

impl SessionContext {
    /// The degraded fallback session: no household, no sharing surface.
    pub fn legacy() -> Self {
        Self {
            mode: SessionMode::Legacy,
            active_household_id: None,
            active_role: None,
            memberships: Vec::new(),
        }
    }

    pub fn is_legacy(&self) -> bool {
        self.mode == SessionMode::Legacy
    }

    pub fn is_owner(&self) -> bool {
        self.active_role == Some(HouseholdRole::Owner)
    }

    /// Resolve the item collection this session reads and writes.
    ///
    /// `None` means no usable collection is established; callers must
    /// no-op rather than invent a path.
    pub fn item_scope(&self, identity: &Identity) -> Option<ItemScope> {
        match self.mode {
            SessionMode::Legacy => {
                if identity.uid.is_empty() {
                    None
                } else {
                    Some(ItemScope::User(identity.uid.clone()))
                }
            }
            SessionMode::Shared => self.active_household_id.map(ItemScope::Household),
        }
    }
}
