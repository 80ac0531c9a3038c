//! CoinGecko `simple/price` client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::PriceError;
use crate::types::price::{AssetPrice, PriceTable};

/// Supported symbols and their CoinGecko ids.
const SYMBOL_IDS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("SOL", "solana"),
    ("USDC", "usd-coin"),
    ("USDT", "tether"),
    ("BNB", "binancecoin"),
    ("JUP", "jupiter-exchange-solana"),
    ("BONK", "bonk"),
    ("WIF", "dogwifcoin"),
    ("RAY", "raydium"),
    ("JTO", "jito-governance-token"),
    ("PYTH", "pyth-network"),
];

pub fn coingecko_id(symbol: &str) -> Option<&'static str> {
    SYMBOL_IDS
        .iter()
        .find(|(sym, _)| sym.eq_ignore_ascii_case(symbol))
        .map(|(_, id)| *id)
}

/// Anything that can produce current USD prices for a set of symbols.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_prices(&self, symbols: &[String]) -> Result<PriceTable, PriceError>;

    /// Whether this source can price `symbol` at all.
    fn supports(&self, _symbol: &str) -> bool {
        true
    }
}

#[derive(Debug, Deserialize)]
struct SimplePrice {
    usd: Option<f64>,
    usd_24h_change: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, PriceError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    fn supports(&self, symbol: &str) -> bool {
        coingecko_id(symbol).is_some()
    }

    #[instrument(skip(self))]
    async fn fetch_prices(&self, symbols: &[String]) -> Result<PriceTable, PriceError> {
        let wanted: Vec<(&String, &str)> = symbols
            .iter()
            .filter_map(|sym| coingecko_id(sym).map(|id| (sym, id)))
            .collect();
        if wanted.is_empty() {
            return Ok(PriceTable::new());
        }

        let ids = wanted.iter().map(|(_, id)| *id).collect::<Vec<_>>().join(",");
        let url = format!("{}/simple/price", self.base_url);
        debug!("Fetching prices from: {} ids={}", url, ids);

        let mut request = self.client.get(&url).query(&[
            ("ids", ids.as_str()),
            ("vs_currencies", "usd"),
            ("include_24hr_change", "true"),
        ]);
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceError::RateLimited);
        }
        if !status.is_success() {
            return Err(PriceError::Status(status.as_u16()));
        }

        let body: HashMap<String, SimplePrice> = response.json().await?;
        let table: PriceTable = wanted
            .into_iter()
            .filter_map(|(sym, id)| {
                let entry = body.get(id)?;
                Some((
                    sym.clone(),
                    AssetPrice {
                        usd: entry.usd?,
                        usd_24h_change: entry.usd_24h_change,
                    },
                ))
            })
            .collect();

        if table.is_empty() {
            return Err(PriceError::InvalidResponse(
                "no requested prices in response".to_string(),
            ));
        }
        Ok(table)
    }
}
