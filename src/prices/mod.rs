//! Upstream price data: TTL cache, bounded retry, CoinGecko client, static
//! fallback table, and the top-agents recommendation proxy.

pub mod agents;
pub mod cache;
pub mod coingecko;
pub mod fallback;
pub mod retry;
pub mod service;

pub use agents::{TopAgentsError, TopAgentsService};
pub use cache::{CacheEntry, TtlCache};
pub use coingecko::{coingecko_id, CoinGeckoClient, PriceSource};
pub use fallback::fallback_prices;
pub use retry::{with_retry, RetryPolicy};
pub use service::{PriceService, DEFAULT_SYMBOLS};

/// Errors from upstream price and recommendation APIs.
#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by upstream")]
    RateLimited,

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}
