use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::auth::AuthUser;
use crate::api::routes::AppState;
use crate::error::ApiError;
use crate::positions::value_portfolio;
use crate::types::position::PortfolioSummary;
use crate::types::price::{PriceQuote, PriceSourceKind, PriceTable};

#[derive(Debug, Deserialize)]
pub struct PortfolioQuery {
    pub symbol: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PortfolioResponse {
    #[serde(flatten)]
    pub summary: PortfolioSummary,
    /// Absent when there was nothing to price.
    pub price_source: Option<PriceSourceKind>,
}

/// GET /api/portfolio: the caller's positions valued at current prices.
pub async fn get_portfolio(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<PortfolioQuery>, QueryRejection>,
) -> Result<Json<PortfolioResponse>, ApiError> {
    let Query(query) = query?;
    let symbol = query
        .symbol
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty());

    let positions = state
        .store
        .list_positions(&user.user_id, symbol.as_deref())
        .await?;

    let (quote, price_source) = if positions.is_empty() {
        let empty = PriceQuote {
            prices: PriceTable::new(),
            source: PriceSourceKind::Cache,
            fetched_at: None,
        };
        (empty, None)
    } else {
        let symbols: Vec<String> = positions.iter().map(|p| p.symbol.clone()).collect();
        let quote = state.prices.prices(&symbols).await;
        let source = quote.source;
        (quote, Some(source))
    };

    Ok(Json(PortfolioResponse {
        summary: value_portfolio(positions, &quote),
        price_source,
    }))
}
