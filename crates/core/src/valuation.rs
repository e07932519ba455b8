//! Item valuation engine
//!
//! Pure aggregation of inventory items against spot prices. A metal
//! whose price is unknown contributes zero value; its grams still count
//! toward the weight totals.

use serde::Serialize;
use std::collections::HashMap;

use crate::inventory::model::{InventoryItem, ItemCategory, Metal};
use crate::prices::SpotPrices;

/// Grams per troy ounce.
pub const TROY_OUNCE_GRAMS: f64 = 31.1034768;

/// Weight and value aggregates for one metal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalTotals {
    pub grams: f64,
    pub value: f64,
    /// Troy ounces held as coins (or Goldbacks).
    pub coin_troy_oz: f64,
    /// Troy ounces held as bullion.
    pub bullion_troy_oz: f64,
}

/// Count of one coin type held.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinCount {
    pub metal: Metal,
    pub label: String,
    pub quantity: u32,
}

/// Full valuation snapshot for a set of items.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationTotals {
    pub by_metal: HashMap<Metal, MetalTotals>,
    pub total_value: f64,
    pub item_count: usize,
    pub coin_counts: Vec<CoinCount>,
}

/// Compute aggregates over `items` at the given prices.
pub fn compute_totals(items: &[InventoryItem], prices: &SpotPrices) -> ValuationTotals {
    let mut by_metal: HashMap<Metal, MetalTotals> =
        Metal::ALL.iter().map(|m| (*m, MetalTotals::default())).collect();
    let mut coin_quantities: HashMap<(Metal, String), u32> = HashMap::new();

    for item in items {
        let grams = item.grams_per_item * item.quantity as f64;
        let troy_oz = grams / TROY_OUNCE_GRAMS;
        let entry = by_metal.entry(item.metal).or_default();
        entry.grams += grams;
        match item.category {
            ItemCategory::Coin => entry.coin_troy_oz += troy_oz,
            ItemCategory::Bullion => entry.bullion_troy_oz += troy_oz,
        }
        if let Some(price_per_gram) = prices.price_per_gram(item.metal) {
            entry.value += grams * price_per_gram;
        }

        if item.category == ItemCategory::Coin {
            let label = coin_count_label(item.metal, &item.item_type);
            *coin_quantities.entry((item.metal, label)).or_default() += item.quantity;
        }
    }

    let total_value = by_metal.values().map(|totals| totals.value).sum();

    let mut coin_counts: Vec<CoinCount> = coin_quantities
        .into_iter()
        .map(|((metal, label), quantity)| CoinCount {
            metal,
            label,
            quantity,
        })
        .collect();
    coin_counts.sort_by(|a, b| {
        a.metal
            .as_str()
            .cmp(b.metal.as_str())
            .then_with(|| a.label.cmp(&b.label))
    });

    ValuationTotals {
        by_metal,
        total_value,
        item_count: items.len(),
        coin_counts,
    }
}

/// Grouping label for coin counts. Goldback types carry a trailing
/// fraction annotation ("1 Goldback (1/1000 oz)") that collapses so all
/// sizes of a denomination group together.
fn coin_count_label(metal: Metal, item_type: &str) -> String {
    if metal != Metal::Gold {
        return item_type.to_string();
    }
    let trimmed = item_type.trim_end();
    if let Some(open) = trimmed.rfind(" (") {
        if trimmed.ends_with(')') {
            return trimmed[..open].to_string();
        }
    }
    trimmed.to_string()
}
