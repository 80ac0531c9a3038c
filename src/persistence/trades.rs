//! Trade persistence: insert once, list for API.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::types::trade::{Trade, TradeKind};

#[derive(Debug, FromRow)]
pub struct TradeRow {
    pub id: Uuid,
    pub user_id: String,
    pub symbol: String,
    pub quantity: f64,
    pub price: f64,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

/// Convert a row to a Trade. Skips rows with an unknown kind.
fn trade_row_to_trade(row: TradeRow) -> Option<Trade> {
    let Some(kind) = TradeKind::parse(&row.kind) else {
        tracing::warn!(trade_id = %row.id, kind = %row.kind, "skipping trade row with unknown kind");
        return None;
    };
    Some(Trade {
        id: row.id,
        user_id: row.user_id,
        symbol: row.symbol,
        quantity: row.quantity,
        price: row.price,
        kind,
        timestamp: row.created_at,
    })
}

/// List trades for a user, newest first, optional symbol (for GET /api/trades).
pub async fn list_trades_for_user(
    pool: &PgPool,
    user_id: &str,
    symbol_opt: Option<&str>,
    limit: usize,
) -> Result<Vec<Trade>, sqlx::Error> {
    let rows = if let Some(symbol) = symbol_opt {
        sqlx::query_as::<_, TradeRow>(
            "SELECT id, user_id, symbol, quantity, price, kind, created_at \
             FROM trades WHERE user_id = $1 AND symbol = $2 ORDER BY created_at DESC LIMIT $3",
        )
        .bind(user_id)
        .bind(symbol)
        .bind(limit as i64)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, TradeRow>(
            "SELECT id, user_id, symbol, quantity, price, kind, created_at \
             FROM trades WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(pool)
        .await?
    };
    Ok(rows.into_iter().filter_map(trade_row_to_trade).collect())
}

/// Insert a single trade.
pub async fn insert_trade(conn: &mut PgConnection, trade: &Trade) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO trades (id, user_id, symbol, quantity, price, kind, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(trade.id)
    .bind(&trade.user_id)
    .bind(&trade.symbol)
    .bind(trade.quantity)
    .bind(trade.price)
    .bind(trade.kind.as_str())
    .bind(trade.timestamp)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
