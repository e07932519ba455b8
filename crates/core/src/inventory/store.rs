//! Item store trait and scope resolution
//!
//! All item reads and writes name an [`ItemScope`]: the legacy per-user
//! collection or a shared per-household collection. Callers never build
//! storage paths themselves; a household switch or legacy fallback
//! redirects subsequent operations by changing the scope alone.

use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

use super::model::{InventoryItem, ItemDraft};
use crate::Result;

/// The collection an item operation targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemScope {
    /// Legacy single-user collection keyed by uid.
    User(String),
    /// Shared collection of one household.
    Household(Uuid),
}

impl ItemScope {
    /// Stable key; doubles as the watch-room name for change events.
    pub fn key(&self) -> String {
        match self {
            Self::User(uid) => format!("user:{}", uid),
            Self::Household(id) => format!("household:{}", id),
        }
    }
}

impl fmt::Display for ItemScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Repository interface for inventory item CRUD.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Create an item with a store-assigned id and timestamp.
    async fn add(&self, scope: &ItemScope, draft: ItemDraft) -> Result<InventoryItem>;

    /// Get an item by id.
    async fn get(&self, scope: &ItemScope, id: Uuid) -> Result<Option<InventoryItem>>;

    /// All items in the scope, newest first (`created_at` descending).
    async fn list(&self, scope: &ItemScope) -> Result<Vec<InventoryItem>>;

    /// Replace the client-supplied fields of an existing item, keeping
    /// its id and `created_at`.
    async fn update(&self, scope: &ItemScope, id: Uuid, draft: ItemDraft)
        -> Result<InventoryItem>;

    /// Delete by id; `false` when nothing was there.
    async fn delete(&self, scope: &ItemScope, id: Uuid) -> Result<bool>;

    /// Migration upsert: write `item` into the scope under its existing
    /// id, field by field, overwriting any previous document with that
    /// id. `created_at` travels with the item.
    async fn merge_from(&self, scope: &ItemScope, item: InventoryItem) -> Result<InventoryItem>;
}
