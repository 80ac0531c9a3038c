//! Common test utilities and fixtures

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use trade_companion::api::auth::{create_token, TokenVerifier};
use trade_companion::api::routes::{app_router, AppState};
use trade_companion::api::status::ConfigStatus;
use trade_companion::chat::ChatRelay;
use trade_companion::persistence::{MemoryStore, TradeStore};
use trade_companion::prices::{PriceError, PriceService, PriceSource, RetryPolicy, TopAgentsService};
use trade_companion::types::price::{AssetPrice, PriceTable};
use trade_companion::wallet::WalletProbe;

pub const TEST_SECRET: &[u8] = b"test-jwt-secret";

/// Nothing listens here; requests to it fail fast.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        backoff: Duration::from_millis(1),
        rate_limit_backoff: Duration::from_millis(2),
    }
}

pub fn bearer(user_id: &str) -> String {
    format!("Bearer {}", create_token(TEST_SECRET, user_id).unwrap())
}

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    RateLimited,
    Status(u16),
}

/// Price source serving a fixed table, or failing every call. Only symbols in
/// the table count as supported.
pub struct FakePriceSource {
    table: PriceTable,
    failure: Option<Failure>,
    calls: AtomicUsize,
}

impl FakePriceSource {
    pub fn new(prices: &[(&str, f64)]) -> Self {
        let table = prices
            .iter()
            .map(|(sym, usd)| {
                (
                    sym.to_string(),
                    AssetPrice {
                        usd: *usd,
                        usd_24h_change: None,
                    },
                )
            })
            .collect();
        Self {
            table,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: Failure) -> Self {
        Self {
            table: PriceTable::new(),
            failure: Some(failure),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for FakePriceSource {
    async fn fetch_prices(&self, symbols: &[String]) -> Result<PriceTable, PriceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Some(Failure::RateLimited) => return Err(PriceError::RateLimited),
            Some(Failure::Status(code)) => return Err(PriceError::Status(code)),
            None => {}
        }
        Ok(symbols
            .iter()
            .filter_map(|s| self.table.get(s).map(|p| (s.clone(), *p)))
            .collect())
    }

    fn supports(&self, symbol: &str) -> bool {
        self.failure.is_some() || self.table.contains_key(symbol)
    }
}

/// Knobs for building an `AppState` against fakes and mock servers.
pub struct TestApp {
    pub store: Arc<dyn TradeStore>,
    pub prices: Arc<dyn PriceSource>,
    pub price_ttl: Duration,
    pub agents_url: Option<String>,
    pub openai_key: Option<String>,
    pub openai_url: String,
    pub rpc_url: String,
    pub wallet_address: Option<String>,
    pub status: ConfigStatus,
}

impl Default for TestApp {
    fn default() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            prices: Arc::new(FakePriceSource::new(&[("BTC", 60_000.0), ("ETH", 3_000.0), ("SOL", 150.0)])),
            price_ttl: Duration::from_secs(300),
            agents_url: None,
            openai_key: None,
            openai_url: UNREACHABLE_URL.to_string(),
            rpc_url: UNREACHABLE_URL.to_string(),
            wallet_address: None,
            status: ConfigStatus::default(),
        }
    }
}

impl TestApp {
    pub fn state(self) -> AppState {
        AppState {
            store: self.store,
            prices: Arc::new(PriceService::new(self.prices, self.price_ttl, fast_retry())),
            agents: Arc::new(
                TopAgentsService::new(self.agents_url, Duration::from_secs(300), fast_retry()).unwrap(),
            ),
            chat: Arc::new(ChatRelay::new(self.openai_key, &self.openai_url, "gpt-4o-mini").unwrap()),
            wallet: Arc::new(WalletProbe::new(&self.rpc_url, self.wallet_address).unwrap()),
            verifier: Arc::new(TokenVerifier::hs256(TEST_SECRET)),
            status: self.status,
        }
    }

    /// Spawn the app on a random port and return (base_url, server task).
    pub async fn spawn(self) -> (String, tokio::task::JoinHandle<()>) {
        let state = self.state();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);
        let app = app_router(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (base_url, handle)
    }
}
