use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::routes::AppState;
use crate::error::ApiError;
use crate::types::price::PriceQuote;

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    /// Comma-separated symbols, e.g. `BTC,ETH,SOL`.
    pub symbols: Option<String>,
}

/// GET /api/prices: best-effort prices; never fails on upstream errors.
pub async fn get_prices(
    State(state): State<AppState>,
    query: Result<Query<PriceQuery>, QueryRejection>,
) -> Result<Json<PriceQuote>, ApiError> {
    let Query(query) = query?;
    let symbols: Vec<String> = query
        .symbols
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::to_string)
        .collect();
    Ok(Json(state.prices.prices(&symbols).await))
}

/// GET /api/top-agents: cached passthrough of the recommendation service.
pub async fn get_top_agents(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.agents.top_agents().await?))
}
