use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::cache::TtlCache;
use super::coingecko::PriceSource;
use super::fallback::fallback_prices;
use super::retry::{with_retry, RetryPolicy};
use crate::types::price::{PriceQuote, PriceSourceKind, PriceTable};

/// Symbols served when a request names none.
pub const DEFAULT_SYMBOLS: &[&str] = &["BTC", "ETH", "SOL", "USDC"];

/// Best-effort price lookup: cache, then upstream with retry, then the static
/// fallback table. Never fails.
pub struct PriceService {
    source: Arc<dyn PriceSource>,
    cache: TtlCache<PriceTable>,
    retry: RetryPolicy,
}

impl PriceService {
    pub fn new(source: Arc<dyn PriceSource>, ttl: Duration, retry: RetryPolicy) -> Self {
        Self {
            source,
            cache: TtlCache::new(ttl),
            retry,
        }
    }

    pub async fn prices(&self, symbols: &[String]) -> PriceQuote {
        self.prices_at(symbols, Utc::now()).await
    }

    /// Symbols the source cannot price never trigger a fetch. A fresh entry
    /// is served when it holds every priceable requested symbol; otherwise the
    /// requested symbols are fetched together with the default set and the
    /// previously cached symbols, so alternating requests share one entry.
    pub async fn prices_at(&self, symbols: &[String], now: DateTime<Utc>) -> PriceQuote {
        let requested = normalize_symbols(symbols);
        let priceable: Vec<String> = requested
            .iter()
            .filter(|s| self.source.supports(s))
            .cloned()
            .collect();

        if let Some(entry) = self.cache.fresh(now).await {
            if priceable.iter().all(|s| entry.value.contains_key(s)) {
                debug!("price cache hit for {:?}", requested);
                return PriceQuote {
                    prices: subset(&entry.value, &requested),
                    source: PriceSourceKind::Cache,
                    fetched_at: Some(entry.fetched_at),
                };
            }
        }

        if priceable.is_empty() {
            debug!("no priceable symbols in {:?}", requested);
            return fallback_quote(&requested);
        }

        let wanted = self.working_set(&priceable).await;
        let source = &self.source;
        let wanted = &wanted;
        match with_retry(&self.retry, "price fetch", move || source.fetch_prices(wanted)).await {
            Ok(table) if !table.is_empty() => {
                let prices = subset(&table, &requested);
                self.cache.replace(table, now).await;
                PriceQuote {
                    prices,
                    source: PriceSourceKind::Live,
                    fetched_at: Some(now),
                }
            }
            Ok(_) => {
                warn!("upstream returned no prices for {:?}, serving fallback", wanted);
                fallback_quote(&requested)
            }
            Err(err) => {
                warn!("serving fallback prices: {}", err);
                fallback_quote(&requested)
            }
        }
    }

    /// Requested symbols first, then the defaults and whatever the cache held.
    async fn working_set(&self, priceable: &[String]) -> Vec<String> {
        let mut wanted = priceable.to_vec();
        let defaults = DEFAULT_SYMBOLS.iter().map(|s| s.to_string());
        let cached: Vec<String> = match self.cache.latest().await {
            Some(entry) => entry.value.into_keys().collect(),
            None => Vec::new(),
        };
        for sym in defaults.chain(cached) {
            if self.source.supports(&sym) && !wanted.contains(&sym) {
                wanted.push(sym);
            }
        }
        wanted
    }
}

fn fallback_quote(symbols: &[String]) -> PriceQuote {
    PriceQuote {
        prices: fallback_prices(symbols),
        source: PriceSourceKind::Fallback,
        fetched_at: None,
    }
}

/// Trim, upper-case and de-duplicate; empty input means the default set.
fn normalize_symbols(symbols: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for sym in symbols {
        let sym = sym.trim().to_uppercase();
        if !sym.is_empty() && !out.contains(&sym) {
            out.push(sym);
        }
    }
    if out.is_empty() {
        out = DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect();
    }
    out
}

fn subset(table: &PriceTable, symbols: &[String]) -> PriceTable {
    symbols
        .iter()
        .filter_map(|s| table.get(s).map(|p| (s.clone(), *p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_dedups_and_defaults() {
        let got = normalize_symbols(&["sol".into(), " SOL ".into(), "btc".into()]);
        assert_eq!(got, vec!["SOL".to_string(), "BTC".to_string()]);

        let got = normalize_symbols(&["  ".into()]);
        assert_eq!(got.len(), DEFAULT_SYMBOLS.len());
    }
}
