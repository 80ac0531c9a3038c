use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::routes::AppState;
use crate::error::ApiError;
use crate::wallet::WalletBalance;

#[derive(Debug, Serialize)]
pub struct WalletAddress {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub address: Option<String>,
}

/// GET /api/wallet/address: the configured agent wallet.
pub async fn get_address(State(state): State<AppState>) -> Result<Json<WalletAddress>, ApiError> {
    let address = state
        .wallet
        .address()
        .ok_or_else(|| ApiError::NotFound("No wallet configured".to_string()))?;
    Ok(Json(WalletAddress {
        address: address.to_string(),
    }))
}

/// GET /api/wallet/balance: SOL balance of `?address=` or the agent wallet.
pub async fn get_balance(
    State(state): State<AppState>,
    query: Result<Query<BalanceQuery>, QueryRejection>,
) -> Result<Json<WalletBalance>, ApiError> {
    let Query(query) = query?;
    let address = query
        .address
        .filter(|a| !a.trim().is_empty())
        .or_else(|| state.wallet.address().map(str::to_string))
        .ok_or_else(|| ApiError::BadRequest("address is required".to_string()))?;

    Ok(Json(state.wallet.balance(&address).await?))
}
