//! File-based item storage implementation
//!
//! Stores every scope's items in one JSON file on disk, keyed by scope.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{InventoryItem, ItemDraft};
use super::store::{ItemScope, ItemStore};
use crate::{Error, Result};

type ScopeItems = HashMap<Uuid, InventoryItem>;

/// JSON-file item store.
#[derive(Clone)]
pub struct FileItemStore {
    state: Arc<RwLock<HashMap<String, ScopeItems>>>,
    path: PathBuf,
}

impl FileItemStore {
    /// Open (or lazily create) the store backed by `path`.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = load_state(&path).await?;
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            path,
        })
    }

    async fn persist(&self, state: &HashMap<String, ScopeItems>) -> Result<()> {
        let stored: HashMap<&String, Vec<&InventoryItem>> = state
            .iter()
            .map(|(scope, items)| (scope, items.values().collect()))
            .collect();
        let content = serde_json::to_string_pretty(&stored)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

async fn load_state(path: &Path) -> Result<HashMap<String, ScopeItems>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = tokio::fs::read_to_string(path).await?;
    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }
    let stored: HashMap<String, Vec<InventoryItem>> = serde_json::from_str(&content)?;
    Ok(stored
        .into_iter()
        .map(|(scope, items)| {
            (
                scope,
                items.into_iter().map(|item| (item.id, item)).collect(),
            )
        })
        .collect())
}

fn item_from_draft(id: Uuid, draft: ItemDraft, created_at: chrono::DateTime<Utc>) -> InventoryItem {
    InventoryItem {
        id,
        metal: draft.metal,
        category: draft.category,
        item_type: draft.item_type.trim().to_string(),
        grams_per_item: draft.grams_per_item,
        quantity: draft.quantity,
        year: draft.year,
        notes: draft.notes.trim().to_string(),
        created_at,
    }
}

#[async_trait]
impl ItemStore for FileItemStore {
    async fn add(&self, scope: &ItemScope, draft: ItemDraft) -> Result<InventoryItem> {
        draft.validate()?;
        let item = item_from_draft(Uuid::new_v4(), draft, Utc::now());
        {
            let mut state = self.state.write().await;
            state
                .entry(scope.key())
                .or_default()
                .insert(item.id, item.clone());
            self.persist(&state).await?;
        }
        Ok(item)
    }

    async fn get(&self, scope: &ItemScope, id: Uuid) -> Result<Option<InventoryItem>> {
        let state = self.state.read().await;
        Ok(state
            .get(&scope.key())
            .and_then(|items| items.get(&id))
            .cloned())
    }

    async fn list(&self, scope: &ItemScope) -> Result<Vec<InventoryItem>> {
        let state = self.state.read().await;
        let mut items: Vec<InventoryItem> = state
            .get(&scope.key())
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn update(
        &self,
        scope: &ItemScope,
        id: Uuid,
        draft: ItemDraft,
    ) -> Result<InventoryItem> {
        draft.validate()?;
        let updated = {
            let mut state = self.state.write().await;
            let items = state
                .get_mut(&scope.key())
                .ok_or_else(|| Error::NotFound(format!("Item not found: {}", id)))?;
            let existing = items
                .get(&id)
                .ok_or_else(|| Error::NotFound(format!("Item not found: {}", id)))?;
            let updated = item_from_draft(id, draft, existing.created_at);
            items.insert(id, updated.clone());
            self.persist(&state).await?;
            updated
        };
        Ok(updated)
    }

    async fn delete(&self, scope: &ItemScope, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let removed = state
            .get_mut(&scope.key())
            .map(|items| items.remove(&id).is_some())
            .unwrap_or(false);
        if removed {
            self.persist(&state).await?;
        }
        Ok(removed)
    }

    async fn merge_from(&self, scope: &ItemScope, item: InventoryItem) -> Result<InventoryItem> {
        let mut state = self.state.write().await;
        state
            .entry(scope.key())
            .or_default()
            .insert(item.id, item.clone());
        self.persist(&state).await?;
        Ok(item)
    }
}
