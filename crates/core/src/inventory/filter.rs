//! Client-side item filtering
//!
//! Case-insensitive substring search over an item's descriptive fields,
//! combined with an optional exact metal filter.

use super::model::{InventoryItem, Metal};

#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub search: String,
    pub metal: Option<Metal>,
}

impl ItemFilter {
    pub fn new(search: impl Into<String>, metal: Option<Metal>) -> Self {
        Self {
            search: search.into(),
            metal,
        }
    }

    /// An empty filter shows the unfiltered list.
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.metal.is_none()
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        if let Some(metal) = self.metal {
            if item.metal != metal {
                return false;
            }
        }

        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let mut haystack = vec![
            item.metal.as_str().to_string(),
            item.item_type.clone(),
            item.category.as_str().to_string(),
        ];
        if let Some(year) = item.year {
            haystack.push(year.to_string());
        }
        if !item.notes.is_empty() {
            haystack.push(item.notes.clone());
        }
        haystack.join(" ").to_lowercase().contains(&needle)
    }

    pub fn apply(&self, items: Vec<InventoryItem>) -> Vec<InventoryItem> {
        if self.is_empty() {
            return items;
        }
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::model::ItemCategory;
    use chrono::Utc;
    use uuid::Uuid;

    fn item(metal: Metal, item_type: &str, year: Option<i32>, notes: &str) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            metal,
            category: ItemCategory::Coin,
            item_type: item_type.to_string(),
            grams_per_item: 2.5,
            quantity: 1,
            year,
            notes: notes.to_string(),
            created_at: Utc::now(),
        }
    }

    fn sample() -> Vec<InventoryItem> {
        vec![
            item(Metal::Gold, "1 Goldback (1/1000 oz)", None, ""),
            item(Metal::Silver, "Dime", Some(1962), "inherited"),
        ]
    }

    #[test]
    fn metal_filter_selects_exactly_that_metal() {
        let filter = ItemFilter::new("", Some(Metal::Silver));
        let filtered = filter.apply(sample());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].metal, Metal::Silver);
    }

    #[test]
    fn search_matches_across_fields() {
        let filter = ItemFilter::new("1962", None);
        assert_eq!(filter.apply(sample()).len(), 1);

        let filter = ItemFilter::new("INHERITED", None);
        assert_eq!(filter.apply(sample()).len(), 1);

        let filter = ItemFilter::new("goldback", None);
        assert_eq!(filter.apply(sample()).len(), 1);
    }

    #[test]
    fn no_match_yields_empty() {
        let filter = ItemFilter::new("palladium", None);
        assert!(filter.apply(sample()).is_empty());
    }

    #[test]
    fn empty_filter_shows_everything() {
        let filter = ItemFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(sample()).len(), 2);
    }

    #[test]
    fn search_and_metal_combine() {
        let filter = ItemFilter::new("dime", Some(Metal::Gold));
        assert!(filter.apply(sample()).is_empty());
    }
}
