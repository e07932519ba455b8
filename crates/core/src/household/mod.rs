//! Household sharing: the ownership boundary for a shared inventory.
//!
//! A household is the tenant a set of inventory items belongs to. This
//! module holds the records (households, memberships, invites, user
//! profiles), the store seam they live behind, and the sign-in resolution
//! state machine that decides which household an identity sees.

pub mod file_store;
pub mod invites;
pub mod model;
pub mod resolution;
pub mod store;

pub use file_store::FileHouseholdStore;
pub use model::{
    Household, HouseholdRole, HouseholdSummary, Invite, InviteStatus, Membership, UserProfile,
};
pub use resolution::{resolve_or_legacy, resolve_session, switch_household};
pub use store::HouseholdStore;
