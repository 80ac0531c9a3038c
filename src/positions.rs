//! Position accounting: apply_trade, unrealized_pnl, valuation.
//! Pure functions, testable without storage or HTTP.

use crate::types::position::{PortfolioSummary, Position, PositionValuation};
use crate::types::price::PriceQuote;
use crate::types::trade::{Price, Trade, TradeKind};

/// Next state of a (user, symbol) position after one trade.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionUpdate {
    Upsert(Position),
    Delete,
}

/// Apply one trade to the prior position (None = nothing held).
/// Buy adds with a weighted-average cost basis; sell reduces and leaves the
/// basis unchanged. Quantity at or below zero removes the position.
/// Quantity and price must already be validated as positive.
pub fn apply_trade(existing: Option<&Position>, trade: &Trade) -> PositionUpdate {
    let (old_qty, old_avg) = match existing {
        Some(pos) => (pos.quantity, pos.average_price),
        None => (0.0, 0.0),
    };

    let (new_qty, new_avg) = match trade.kind {
        TradeKind::Buy => {
            let new_qty = old_qty + trade.quantity;
            let new_avg = (old_qty * old_avg + trade.quantity * trade.price) / new_qty;
            (new_qty, new_avg)
        }
        TradeKind::Sell => (old_qty - trade.quantity, old_avg),
    };

    if new_qty <= 0.0 {
        return PositionUpdate::Delete;
    }

    PositionUpdate::Upsert(Position {
        user_id: trade.user_id.clone(),
        symbol: trade.symbol.clone(),
        quantity: new_qty,
        average_price: new_avg,
    })
}

/// Unrealized P&L: (current_price - average_price) * quantity.
pub fn unrealized_pnl(position: &Position, current_price: Price) -> f64 {
    (current_price - position.average_price) * position.quantity
}

/// Value each position at the quoted price. Positions with no quote still
/// count toward total cost but not toward value or P&L.
pub fn value_portfolio(positions: Vec<Position>, quote: &PriceQuote) -> PortfolioSummary {
    let mut total_cost = 0.0;
    let mut total_value = 0.0;
    let mut total_unrealized_pnl = 0.0;

    let positions = positions
        .into_iter()
        .map(|position| {
            total_cost += position.quantity * position.average_price;
            let current_price = quote.usd(&position.symbol);
            let market_value = current_price.map(|p| p * position.quantity);
            let pnl = current_price.map(|p| unrealized_pnl(&position, p));
            total_value += market_value.unwrap_or(0.0);
            total_unrealized_pnl += pnl.unwrap_or(0.0);
            PositionValuation {
                position,
                current_price,
                market_value,
                unrealized_pnl: pnl,
            }
        })
        .collect();

    PortfolioSummary {
        positions,
        total_cost,
        total_value,
        total_unrealized_pnl,
    }
}
