//! Membership and invite management for the active household
//!
//! Invites address an email; the matching identity redeems them at its
//! next sign-in (see [`super::resolution`]).

use uuid::Uuid;

use super::model::{Invite, Membership};
use super::store::HouseholdStore;
use crate::identity::Identity;
use crate::{Error, Result};

/// Create a pending invite for `email` in `household_id`.
///
/// Only the household owner may invite. Rejected without a write when
/// the email is malformed, is the caller's own, or already has a
/// pending invite in this household.
pub async fn send_invite(
    store: &dyn HouseholdStore,
    identity: &Identity,
    household_id: Uuid,
    email: &str,
) -> Result<Invite> {
    let membership = store
        .get_membership(household_id, &identity.uid)
        .await?
        .ok_or_else(|| Error::Forbidden("Not a member of this household".to_string()))?;
    if !membership.role.can_send_invites() {
        return Err(Error::Forbidden(
            "Only the household owner can send invites".to_string(),
        ));
    }

    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return Err(Error::InvalidInput("Enter a valid email address".to_string()));
    }
    if normalized == identity.email_lower() {
        return Err(Error::InvalidInput("You are already a member".to_string()));
    }

    let pending = store.pending_invites_for_household(household_id).await?;
    if pending
        .iter()
        .any(|invite| invite.invited_email_lower == normalized)
    {
        return Err(Error::Conflict(format!(
            "An invite for {} is already pending",
            normalized
        )));
    }

    store.create_invite(household_id, email, identity).await
}

/// Members of a household, sorted by email.
pub async fn list_members(
    store: &dyn HouseholdStore,
    household_id: Uuid,
) -> Result<Vec<Membership>> {
    let mut members = store.members_of_household(household_id).await?;
    members.sort_by(|a, b| a.email.cmp(&b.email));
    Ok(members)
}

/// Pending invites of a household, sorted by normalized invited email.
pub async fn list_pending_invites(
    store: &dyn HouseholdStore,
    household_id: Uuid,
) -> Result<Vec<Invite>> {
    let mut invites = store.pending_invites_for_household(household_id).await?;
    invites.sort_by(|a, b| a.invited_email_lower.cmp(&b.invited_email_lower));
    Ok(invites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::household::file_store::FileHouseholdStore;
    use crate::household::model::HouseholdRole;
    use tempfile::TempDir;

    async fn create_store() -> (FileHouseholdStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileHouseholdStore::new(temp_dir.path().join("households.json"))
            .await
            .unwrap();
        (store, temp_dir)
    }

    fn alice() -> Identity {
        Identity::new("uid-alice", "alice@example.com", "Alice")
    }

    fn bob() -> Identity {
        Identity::new("uid-bob", "bob@example.com", "Bob")
    }

    async fn seed_household(store: &FileHouseholdStore) -> Uuid {
        let household = store.create_household("Alice's Household", &alice()).await.unwrap();
        store
            .put_membership(Membership::new(household.id, &alice(), HouseholdRole::Owner))
            .await
            .unwrap();
        household.id
    }

    #[tokio::test]
    async fn owner_sends_invite() {
        let (store, _temp) = create_store().await;
        let household_id = seed_household(&store).await;

        let invite = send_invite(&store, &alice(), household_id, "Bob@Example.com")
            .await
            .unwrap();
        assert_eq!(invite.invited_email_lower, "bob@example.com");
        assert_eq!(invite.invited_by_uid, "uid-alice");

        let pending = list_pending_invites(&store, household_id).await.unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn member_cannot_send_invite() {
        let (store, _temp) = create_store().await;
        let household_id = seed_household(&store).await;
        store
            .put_membership(Membership::new(household_id, &bob(), HouseholdRole::Member))
            .await
            .unwrap();

        let result = send_invite(&store, &bob(), household_id, "carol@example.com").await;
        match result.unwrap_err() {
            Error::Forbidden(_) => {}
            e => panic!("Expected Forbidden, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn duplicate_pending_invite_rejected() {
        let (store, _temp) = create_store().await;
        let household_id = seed_household(&store).await;

        send_invite(&store, &alice(), household_id, "bob@example.com")
            .await
            .unwrap();
        let result = send_invite(&store, &alice(), household_id, "BOB@example.com").await;
        match result.unwrap_err() {
            Error::Conflict(_) => {}
            e => panic!("Expected Conflict, got: {:?}", e),
        }

        let pending = list_pending_invites(&store, household_id).await.unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn self_invite_rejected() {
        let (store, _temp) = create_store().await;
        let household_id = seed_household(&store).await;

        let result = send_invite(&store, &alice(), household_id, "Alice@Example.com").await;
        match result.unwrap_err() {
            Error::InvalidInput(message) => assert!(message.contains("already a member")),
            e => panic!("Expected InvalidInput, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn malformed_email_rejected() {
        let (store, _temp) = create_store().await;
        let household_id = seed_household(&store).await;

        assert!(send_invite(&store, &alice(), household_id, "").await.is_err());
        assert!(send_invite(&store, &alice(), household_id, "not-an-email").await.is_err());
    }

    #[tokio::test]
    async fn member_list_sorted_by_email() {
        let (store, _temp) = create_store().await;
        let household_id = seed_household(&store).await;
        store
            .put_membership(Membership::new(household_id, &bob(), HouseholdRole::Member))
            .await
            .unwrap();

        let members = list_members(&store, household_id).await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].email, "alice@example.com");
        assert_eq!(members[1].email, "bob@example.com");
    }
}
