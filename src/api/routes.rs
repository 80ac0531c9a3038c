use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::auth::TokenVerifier;
use crate::api::status::ConfigStatus;
use crate::api::{chat, portfolio, prices, status, trades, wallet};
use crate::chat::ChatRelay;
use crate::persistence::TradeStore;
use crate::prices::{PriceService, TopAgentsService};
use crate::wallet::WalletProbe;

/// Shared resources handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TradeStore>,
    pub prices: Arc<PriceService>,
    pub agents: Arc<TopAgentsService>,
    pub chat: Arc<ChatRelay>,
    pub wallet: Arc<WalletProbe>,
    pub verifier: Arc<TokenVerifier>,
    pub status: ConfigStatus,
}

async fn health() -> &'static str {
    "healthy"
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/trades", post(trades::create_trade).get(trades::list_trades))
        .route("/api/portfolio", get(portfolio::get_portfolio))
        .route("/api/prices", get(prices::get_prices))
        .route("/api/top-agents", get(prices::get_top_agents))
        .route("/api/chat", post(chat::chat))
        .route("/api/wallet/address", get(wallet::get_address))
        .route("/api/wallet/balance", get(wallet::get_balance))
        .route("/api/config/status", get(status::get_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the browser front end. No origins configured allows any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(parsed)
    }
}
