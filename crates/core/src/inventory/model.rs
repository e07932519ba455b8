//! Inventory item model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::{Error, Result};

/// Tracked metals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Gold,
    Silver,
    Platinum,
}

impl Metal {
    pub const ALL: [Metal; 3] = [Metal::Gold, Metal::Silver, Metal::Platinum];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Silver => "silver",
            Self::Platinum => "platinum",
        }
    }
}

impl FromStr for Metal {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "gold" => Ok(Self::Gold),
            "silver" => Ok(Self::Silver),
            "platinum" => Ok(Self::Platinum),
            _ => Err(Error::InvalidInput(format!("Unsupported metal '{}'", value))),
        }
    }
}

/// Item category: a minted coin (or Goldback note) vs generic bullion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Coin,
    Bullion,
}

impl ItemCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Coin => "coin",
            Self::Bullion => "bullion",
        }
    }
}

/// A single inventory line: one kind of item held in some quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub metal: Metal,
    pub category: ItemCategory,
    /// Coin-type name, Goldback denomination, or free-text bullion label.
    pub item_type: String,
    pub grams_per_item: f64,
    pub quantity: u32,
    /// Only meaningful for silver coins.
    pub year: Option<i32>,
    pub notes: String,
    /// Store-assigned; used as the sort key and never client-mutated.
    pub created_at: DateTime<Utc>,
}

/// Client-supplied fields of an item, validated before any write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub metal: Metal,
    pub category: ItemCategory,
    pub item_type: String,
    pub grams_per_item: f64,
    pub quantity: u32,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub notes: String,
}

impl ItemDraft {
    pub fn validate(&self) -> Result<()> {
        if self.item_type.trim().is_empty() {
            return Err(Error::InvalidInput("Item type cannot be empty".to_string()));
        }
        if !(self.grams_per_item > 0.0) {
            return Err(Error::InvalidInput(
                "Grams per item must be greater than zero".to_string(),
            ));
        }
        if self.quantity == 0 {
            return Err(Error::InvalidInput(
                "Quantity must be at least one".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ItemDraft {
        ItemDraft {
            metal: Metal::Silver,
            category: ItemCategory::Coin,
            item_type: "Dime".to_string(),
            grams_per_item: 2.5,
            quantity: 4,
            year: Some(1962),
            notes: String::new(),
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn empty_item_type_rejected() {
        let mut d = draft();
        d.item_type = "   ".to_string();
        assert!(d.validate().is_err());
    }

    #[test]
    fn non_positive_grams_rejected() {
        let mut d = draft();
        d.grams_per_item = 0.0;
        assert!(d.validate().is_err());
        d.grams_per_item = -1.0;
        assert!(d.validate().is_err());
    }

    #[test]
    fn zero_quantity_rejected() {
        let mut d = draft();
        d.quantity = 0;
        assert!(d.validate().is_err());
    }

    #[test]
    fn metal_parses_case_insensitively() {
        assert_eq!("Gold".parse::<Metal>().unwrap(), Metal::Gold);
        assert!("copper".parse::<Metal>().is_err());
    }
}
