use serde::{Deserialize, Serialize};

use crate::types::trade::{Price, Qty};

/// Holding per (user, symbol). Quantity is always positive while the record exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub user_id: String,
    pub symbol: String,
    pub quantity: Qty,
    pub average_price: Price,
}

/// Position enriched with a market price for the portfolio view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionValuation {
    #[serde(flatten)]
    pub position: Position,
    pub current_price: Option<Price>,
    pub market_value: Option<f64>,
    pub unrealized_pnl: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub positions: Vec<PositionValuation>,
    pub total_cost: f64,
    pub total_value: f64,
    pub total_unrealized_pnl: f64,
}
