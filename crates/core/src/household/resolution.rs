//! Household resolution state machine
//!
//! Runs once per sign-in and decides which household's inventory the
//! identity sees: accepts pending invites, discovers memberships,
//! provisions a personal household on first sign-in (migrating legacy
//! per-user items into it), and selects the active household.
//!
//! Sharing must never block sign-in: any failure here degrades the
//! session to legacy mode instead of surfacing as a hard error.

use chrono::Utc;
use futures::future;
use tracing::{info, warn};
use uuid::Uuid;

use super::model::{HouseholdRole, HouseholdSummary, Membership, UserProfile};
use super::store::HouseholdStore;
use crate::identity::Identity;
use crate::inventory::store::{ItemScope, ItemStore};
use crate::session::{SessionContext, SessionMode};
use crate::{Error, Result};

/// Run full resolution for a signed-in identity.
///
/// Steps execute in order; each depends on the previous. The returned
/// session is always in shared mode; callers wanting the legacy
/// fallback use [`resolve_or_legacy`].
pub async fn resolve_session(
    households: &dyn HouseholdStore,
    items: &dyn ItemStore,
    identity: &Identity,
) -> Result<SessionContext> {
    accept_pending_invites(households, identity).await?;

    let mut memberships = households.memberships_for_uid(&identity.uid).await?;

    // Discovery came up empty: the profile may still remember a
    // household whose membership record is reachable by point read.
    if memberships.is_empty() {
        if let Some(prior) = stored_active_membership(households, identity).await? {
            memberships.push(prior);
        }
    }

    // Every identity ends resolution with at least one household.
    if memberships.is_empty() {
        let membership = provision_personal_household(households, items, identity).await?;
        memberships.push(membership);
    }

    // Resolve display names; memberships pointing at a missing household
    // record are dropped.
    let mut entries = Vec::with_capacity(memberships.len());
    for membership in &memberships {
        if let Some(household) = households.get_household(membership.household_id).await? {
            entries.push(HouseholdSummary {
                id: household.id,
                name: household.name,
                role: membership.role,
            });
        }
    }
    if entries.is_empty() {
        return Err(Error::Storage(format!(
            "No household records found for uid {}",
            identity.uid
        )));
    }

    let profile = households.get_profile(&identity.uid).await?;
    let stored_active = profile.as_ref().and_then(|p| p.active_household_id);
    let active_id = stored_active
        .filter(|id| entries.iter().any(|entry| entry.id == *id))
        .unwrap_or(entries[0].id);
    let active_role = entries
        .iter()
        .find(|entry| entry.id == active_id)
        .map(|entry| entry.role);

    let mut profile = profile.unwrap_or_else(|| UserProfile::new(identity));
    profile.email = identity.email.clone();
    profile.display_name = identity.display_name.clone();
    profile.active_household_id = Some(active_id);
    households.upsert_profile(profile).await?;

    entries.sort_by(|a, b| a.name.cmp(&b.name));

    info!(
        uid = %identity.uid,
        active_household = %active_id,
        households = entries.len(),
        "household resolution complete"
    );

    Ok(SessionContext {
        mode: SessionMode::Shared,
        active_household_id: Some(active_id),
        active_role,
        memberships: entries,
    })
}

/// Resolution with the legacy fallback applied.
///
/// Permission denials are the expected "shared data rules not active
/// yet" signal; anything else is unexpected but still must not block
/// sign-in. Both degrade to a legacy session.
pub async fn resolve_or_legacy(
    households: &dyn HouseholdStore,
    items: &dyn ItemStore,
    identity: &Identity,
) -> SessionContext {
    match resolve_session(households, items, identity).await {
        Ok(session) => session,
        Err(err) if err.is_permission_denied() => {
            info!(uid = %identity.uid, error = %err, "shared data unavailable, using legacy mode");
            SessionContext::legacy()
        }
        Err(err) => {
            warn!(uid = %identity.uid, error = %err, "household resolution failed, using legacy mode");
            SessionContext::legacy()
        }
    }
}

/// Switch the active household to another of the session's memberships.
///
/// Switching to a household the identity is not a member of is a silent
/// no-op.
pub async fn switch_household(
    households: &dyn HouseholdStore,
    identity: &Identity,
    session: &mut SessionContext,
    target: Uuid,
) -> Result<()> {
    let Some(entry) = session.memberships.iter().find(|entry| entry.id == target) else {
        return Ok(());
    };
    session.active_household_id = Some(target);
    session.active_role = Some(entry.role);

    let mut profile = households
        .get_profile(&identity.uid)
        .await?
        .unwrap_or_else(|| UserProfile::new(identity));
    profile.active_household_id = Some(target);
    households.upsert_profile(profile).await?;
    Ok(())
}

/// Step 1: redeem every pending invite addressed to the identity's
/// normalized email. Invites are independent of one another, so the
/// acceptances run concurrently.
async fn accept_pending_invites(
    households: &dyn HouseholdStore,
    identity: &Identity,
) -> Result<()> {
    let email_lower = identity.email_lower();
    if email_lower.is_empty() {
        return Ok(());
    }

    let invites = match households.pending_invites_for_email(&email_lower).await {
        Ok(invites) => invites,
        Err(err) if err.is_permission_denied() => {
            info!(uid = %identity.uid, "invite lookup denied, treating as none pending");
            return Ok(());
        }
        Err(err) => return Err(err),
    };
    if invites.is_empty() {
        return Ok(());
    }

    let results = future::join_all(invites.into_iter().map(|invite| async move {
        // Membership first, then the invite flips to accepted; a crash
        // in between leaves a pending invite that the next sign-in
        // redeems again against the same (household, uid) key.
        let membership = Membership::new(invite.household_id, identity, HouseholdRole::Member);
        households.put_membership(membership).await?;
        households
            .mark_invite_accepted(invite.household_id, invite.id, identity)
            .await
    }))
    .await;

    for result in results {
        match result {
            Ok(()) => {}
            Err(err) if err.is_permission_denied() => {
                info!(uid = %identity.uid, error = %err, "invite acceptance denied, skipped");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Step 3: the profile's remembered household, if its membership record
/// still exists.
async fn stored_active_membership(
    households: &dyn HouseholdStore,
    identity: &Identity,
) -> Result<Option<Membership>> {
    let Some(profile) = households.get_profile(&identity.uid).await? else {
        return Ok(None);
    };
    let Some(prior) = profile.active_household_id else {
        return Ok(None);
    };
    households.get_membership(prior, &identity.uid).await
}

/// Step 4: create a personal household, make the identity its owner and
/// migrate any legacy per-user items into it.
async fn provision_personal_household(
    households: &dyn HouseholdStore,
    items: &dyn ItemStore,
    identity: &Identity,
) -> Result<Membership> {
    let name = personal_household_name(identity);
    let household = households.create_household(&name, identity).await?;
    let membership = households
        .put_membership(Membership::new(
            household.id,
            identity,
            HouseholdRole::Owner,
        ))
        .await?;

    let migrated = migrate_legacy_items(items, identity, household.id).await?;

    let mut profile = households
        .get_profile(&identity.uid)
        .await?
        .unwrap_or_else(|| UserProfile::new(identity));
    profile.migrated_legacy_items_at = Some(Utc::now());
    households.upsert_profile(profile).await?;

    info!(
        uid = %identity.uid,
        household = %household.id,
        migrated_items = migrated,
        "provisioned personal household"
    );
    Ok(membership)
}

async fn migrate_legacy_items(
    items: &dyn ItemStore,
    identity: &Identity,
    household_id: Uuid,
) -> Result<usize> {
    let legacy_scope = ItemScope::User(identity.uid.clone());
    let target_scope = ItemScope::Household(household_id);

    let legacy_items = items.list(&legacy_scope).await?;
    let count = legacy_items.len();
    for item in legacy_items {
        items.merge_from(&target_scope, item).await?;
    }
    Ok(count)
}

fn personal_household_name(identity: &Identity) -> String {
    let label = identity.label().trim();
    if label.is_empty() {
        "My Household".to_string()
    } else {
        format!("{}'s Household", label)
    }
}
