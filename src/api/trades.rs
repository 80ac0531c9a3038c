use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::auth::AuthUser;
use crate::api::routes::AppState;
use crate::error::ApiError;
use crate::types::position::Position;
use crate::types::trade::{NewTrade, Trade};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

#[derive(Debug, Serialize)]
pub struct TradeRecorded {
    pub trade: Trade,
    /// None when the trade closed the position.
    pub position: Option<Position>,
}

#[derive(Debug, Deserialize)]
pub struct TradeListQuery {
    pub symbol: Option<String>,
    pub limit: Option<usize>,
}

/// POST /api/trades: record a trade and update the caller's position.
pub async fn create_trade(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<NewTrade>, JsonRejection>,
) -> Result<(StatusCode, Json<TradeRecorded>), ApiError> {
    let Json(new_trade) = payload?;
    let trade = new_trade.validate(&user.user_id)?;

    let position = state.store.record_trade(&trade).await?;
    tracing::info!(
        user_id = %trade.user_id,
        symbol = %trade.symbol,
        kind = trade.kind.as_str(),
        quantity = trade.quantity,
        price = trade.price,
        closed = position.is_none(),
        "trade recorded"
    );

    Ok((StatusCode::CREATED, Json(TradeRecorded { trade, position })))
}

/// GET /api/trades: the caller's trades, newest first.
pub async fn list_trades(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<TradeListQuery>, QueryRejection>,
) -> Result<Json<Vec<Trade>>, ApiError> {
    let Query(query) = query?;
    let symbol = query
        .symbol
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty());
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let trades = state
        .store
        .list_trades(&user.user_id, symbol.as_deref(), limit)
        .await?;
    Ok(Json(trades))
}
