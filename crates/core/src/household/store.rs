//! Household store trait
//!
//! Defines the interface the resolution state machine and the invite
//! manager run against. Implementations classify failures as
//! [`Error::PermissionDenied`] (recoverable, triggers the legacy
//! fallback) versus everything else (fatal to the operation).

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{Household, Invite, Membership, UserProfile};
use crate::identity::Identity;
use crate::Result;

/// Storage seam for households, memberships, invites and profiles.
#[async_trait]
pub trait HouseholdStore: Send + Sync {
    /// Create a household with a store-generated id, owned by `owner`.
    async fn create_household(&self, name: &str, owner: &Identity) -> Result<Household>;

    /// Point read of a household.
    async fn get_household(&self, id: Uuid) -> Result<Option<Household>>;

    /// Create or replace the membership for `(membership.household_id,
    /// membership.uid)`.
    async fn put_membership(&self, membership: Membership) -> Result<Membership>;

    /// Point read of a membership by its `(household_id, uid)` key.
    async fn get_membership(&self, household_id: Uuid, uid: &str) -> Result<Option<Membership>>;

    /// All memberships held by `uid`, across every household, in
    /// discovery order.
    async fn memberships_for_uid(&self, uid: &str) -> Result<Vec<Membership>>;

    /// All memberships of one household.
    async fn members_of_household(&self, household_id: Uuid) -> Result<Vec<Membership>>;

    /// Create a pending invite with a store-generated id.
    async fn create_invite(
        &self,
        household_id: Uuid,
        invited_email: &str,
        invited_by: &Identity,
    ) -> Result<Invite>;

    /// All pending invites addressed to a normalized email, across every
    /// household.
    async fn pending_invites_for_email(&self, email_lower: &str) -> Result<Vec<Invite>>;

    /// Pending invites of one household.
    async fn pending_invites_for_household(&self, household_id: Uuid) -> Result<Vec<Invite>>;

    /// Mark an invite accepted, recording who accepted it and when.
    async fn mark_invite_accepted(
        &self,
        household_id: Uuid,
        invite_id: Uuid,
        accepted_by: &Identity,
    ) -> Result<()>;

    /// Point read of a profile.
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>>;

    /// Create or replace a profile.
    async fn upsert_profile(&self, profile: UserProfile) -> Result<()>;
}
