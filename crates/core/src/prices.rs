//! Spot price cache and fetch client
//!
//! One HTTP GET per metal against a configurable endpoint. Fetches run
//! concurrently and succeed independently: a failed metal keeps its
//! previous price while the others update.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::inventory::model::Metal;
use crate::valuation::TROY_OUNCE_GRAMS;
use crate::{Error, Result};

const DEFAULT_GOLD_URL: &str = "https://api.gold-api.com/price/XAU";
const DEFAULT_SILVER_URL: &str = "https://api.gold-api.com/price/XAG";
const DEFAULT_PLATINUM_URL: &str = "https://api.gold-api.com/price/XPT";

/// Latest known spot price per metal, in USD per troy ounce.
///
/// Plain data holder; overwritten per metal on each successful fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotPrices {
    pub gold: Option<f64>,
    pub silver: Option<f64>,
    pub platinum: Option<f64>,
    /// Human-readable label of the most recent successful fetch.
    pub updated_at: Option<String>,
}

impl SpotPrices {
    pub fn get(&self, metal: Metal) -> Option<f64> {
        match metal {
            Metal::Gold => self.gold,
            Metal::Silver => self.silver,
            Metal::Platinum => self.platinum,
        }
    }

    pub fn set(&mut self, metal: Metal, price: f64) {
        match metal {
            Metal::Gold => self.gold = Some(price),
            Metal::Silver => self.silver = Some(price),
            Metal::Platinum => self.platinum = Some(price),
        }
    }

    /// Price per gram, derived from the per-ounce spot price.
    pub fn price_per_gram(&self, metal: Metal) -> Option<f64> {
        self.get(metal).map(|per_oz| per_oz / TROY_OUNCE_GRAMS)
    }
}

/// Per-metal price endpoint URLs.
#[derive(Debug, Clone)]
pub struct PriceEndpoints {
    pub gold: String,
    pub silver: String,
    pub platinum: String,
}

impl Default for PriceEndpoints {
    fn default() -> Self {
        Self {
            gold: DEFAULT_GOLD_URL.to_string(),
            silver: DEFAULT_SILVER_URL.to_string(),
            platinum: DEFAULT_PLATINUM_URL.to_string(),
        }
    }
}

impl PriceEndpoints {
    /// Endpoints from `SV_PRICE_{GOLD,SILVER,PLATINUM}_URL`, with the
    /// public gold-api.com endpoints as defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            gold: std::env::var("SV_PRICE_GOLD_URL").unwrap_or(defaults.gold),
            silver: std::env::var("SV_PRICE_SILVER_URL").unwrap_or(defaults.silver),
            platinum: std::env::var("SV_PRICE_PLATINUM_URL").unwrap_or(defaults.platinum),
        }
    }

    fn url(&self, metal: Metal) -> &str {
        match metal {
            Metal::Gold => &self.gold,
            Metal::Silver => &self.silver,
            Metal::Platinum => &self.platinum,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceQuote {
    price: f64,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    updated_at_readable: Option<String>,
}

/// HTTP client for the spot price source.
#[derive(Clone)]
pub struct SpotPriceClient {
    http: reqwest::Client,
    endpoints: PriceEndpoints,
}

impl SpotPriceClient {
    pub fn new(endpoints: PriceEndpoints) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoints,
        }
    }

    pub fn from_env() -> Self {
        Self::new(PriceEndpoints::from_env())
    }

    async fn fetch_one(&self, metal: Metal) -> Result<(f64, Option<String>)> {
        let url = self.endpoints.url(metal);
        let response = self
            .http
            .get(url)
            .header("cache-control", "no-cache")
            .send()
            .await
            .map_err(|err| {
                Error::PriceFetch(format!("Request failed for {}: {}", metal.as_str(), err))
            })?;
        if !response.status().is_success() {
            return Err(Error::PriceFetch(format!(
                "Price fetch failed for {}: HTTP {}",
                metal.as_str(),
                response.status()
            )));
        }
        let quote: PriceQuote = response.json().await.map_err(|err| {
            Error::PriceFetch(format!("Bad price payload for {}: {}", metal.as_str(), err))
        })?;
        Ok((quote.price, quote.updated_at_readable.or(quote.updated_at)))
    }

    /// Fetch all metals concurrently and fold the results over the
    /// previous snapshot. Failed metals keep their previous price.
    pub async fn refresh(&self, current: &SpotPrices) -> SpotPrices {
        let (gold, silver, platinum) = futures::join!(
            self.fetch_one(Metal::Gold),
            self.fetch_one(Metal::Silver),
            self.fetch_one(Metal::Platinum),
        );

        let mut next = current.clone();
        let mut latest_label = None;
        for (metal, result) in [
            (Metal::Gold, gold),
            (Metal::Silver, silver),
            (Metal::Platinum, platinum),
        ] {
            match result {
                Ok((price, label)) => {
                    next.set(metal, price);
                    if label.is_some() {
                        latest_label = label;
                    }
                }
                Err(err) => {
                    warn!(metal = metal.as_str(), error = %err, "spot price fetch failed");
                }
            }
        }
        next.updated_at = latest_label;
        next
    }
}
