use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetPrice {
    pub usd: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usd_24h_change: Option<f64>,
}

/// Upper-cased symbol to USD price.
pub type PriceTable = BTreeMap<String, AssetPrice>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSourceKind {
    Live,
    Cache,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub prices: PriceTable,
    pub source: PriceSourceKind,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl PriceQuote {
    pub fn usd(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).map(|p| p.usd)
    }
}
