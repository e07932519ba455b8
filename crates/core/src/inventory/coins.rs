//! Coin weight tables
//!
//! Fixed per-metal gram weights for known coin types and Goldback
//! denominations. The `Custom` entry is the manual-entry escape hatch:
//! its grams are whatever the user typed.

use super::model::{ItemCategory, ItemDraft, Metal};

pub const CUSTOM_COIN_TYPE: &str = "Custom";

/// US coin weights in grams, face-value silver-era sizes.
const COIN_GRAMS_DEFAULT: &[(&str, f64)] = &[
    ("Dollar", 24.05),
    ("Half Dollar", 12.5),
    ("Quarter", 6.25),
    ("Dime", 2.5),
    (CUSTOM_COIN_TYPE, 0.0),
];

/// 90% silver coinage uses the lighter Half Dollar weight.
const COIN_GRAMS_SILVER: &[(&str, f64)] = &[
    ("Dollar", 24.05),
    ("Half Dollar", 11.25),
    ("Quarter", 6.25),
    ("Dime", 2.5),
    (CUSTOM_COIN_TYPE, 0.0),
];

/// Goldback denominations with their gold content.
const COIN_GRAMS_GOLDBACK: &[(&str, f64)] = &[
    ("1/2 Goldback (1/2000 oz)", 0.016),
    ("1 Goldback (1/1000 oz)", 0.031),
    ("5 Goldback (1/200 oz)", 0.156),
    ("10 Goldback (1/100 oz)", 0.311),
    ("25 Goldback (1/40 oz)", 0.778),
    ("50 Goldback (1/20 oz)", 1.555),
];

/// Coin picker configuration for one metal.
#[derive(Debug, Clone, Copy)]
pub struct CoinConfig {
    /// Field label shown next to the coin-type picker.
    pub label: &'static str,
    pub entries: &'static [(&'static str, f64)],
}

pub fn coin_config(metal: Metal) -> CoinConfig {
    match metal {
        Metal::Gold => CoinConfig {
            label: "Goldback",
            entries: COIN_GRAMS_GOLDBACK,
        },
        Metal::Silver => CoinConfig {
            label: "Coin Type",
            entries: COIN_GRAMS_SILVER,
        },
        Metal::Platinum => CoinConfig {
            label: "Coin Type",
            entries: COIN_GRAMS_DEFAULT,
        },
    }
}

/// Display label for the coin category under a metal.
pub fn category_label(metal: Metal) -> &'static str {
    match metal {
        Metal::Gold => "Goldback",
        _ => "Coin",
    }
}

/// Gram weight of a known coin type under a metal.
///
/// Silver resolves through the silver table; gold through the Goldback
/// denominations, falling back to the default coin table; everything
/// else through the default table. `Custom` never resolves — its weight
/// is user-supplied.
pub fn coin_grams(metal: Metal, coin_type: &str) -> Option<f64> {
    if coin_type == CUSTOM_COIN_TYPE {
        return None;
    }
    let lookup = |entries: &'static [(&'static str, f64)]| {
        entries
            .iter()
            .find(|(name, _)| *name == coin_type)
            .map(|(_, grams)| *grams)
    };
    match metal {
        Metal::Silver => lookup(COIN_GRAMS_SILVER),
        Metal::Gold => lookup(COIN_GRAMS_GOLDBACK).or_else(|| lookup(COIN_GRAMS_DEFAULT)),
        Metal::Platinum => lookup(COIN_GRAMS_DEFAULT),
    }
}

/// Replace a coin draft's grams with the table weight when its type is a
/// known non-`Custom` entry for the metal. Applied on add and on edit.
pub fn apply_coin_grams(draft: &mut ItemDraft) {
    if draft.category != ItemCategory::Coin {
        return;
    }
    if let Some(grams) = coin_grams(draft.metal, &draft.item_type) {
        draft.grams_per_item = grams;
    }
}
