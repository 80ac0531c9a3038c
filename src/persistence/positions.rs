//! Position persistence: locked read, upsert, delete, list.

use sqlx::{FromRow, PgConnection, PgPool};

use crate::types::position::Position;

#[derive(Debug, FromRow)]
pub struct PositionRow {
    pub user_id: String,
    pub symbol: String,
    pub quantity: f64,
    pub average_price: f64,
}

impl From<PositionRow> for Position {
    fn from(row: PositionRow) -> Self {
        Position {
            user_id: row.user_id,
            symbol: row.symbol,
            quantity: row.quantity,
            average_price: row.average_price,
        }
    }
}

/// Serialize writers on (user, symbol) until the transaction ends. Row locks
/// alone miss the first trade, when no row exists yet.
pub async fn lock_position(conn: &mut PgConnection, user_id: &str, symbol: &str) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1), hashtext($2))")
        .bind(user_id)
        .bind(symbol)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Read a position and lock its row until the surrounding transaction ends.
pub async fn get_position_for_update(
    conn: &mut PgConnection,
    user_id: &str,
    symbol: &str,
) -> Result<Option<Position>, sqlx::Error> {
    let row = sqlx::query_as::<_, PositionRow>(
        "SELECT user_id, symbol, quantity, average_price FROM positions \
         WHERE user_id = $1 AND symbol = $2 FOR UPDATE",
    )
    .bind(user_id)
    .bind(symbol)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.map(Position::from))
}

/// Upsert a position (insert or update on conflict).
pub async fn upsert_position(conn: &mut PgConnection, position: &Position) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO positions (user_id, symbol, quantity, average_price, updated_at) \
         VALUES ($1, $2, $3, $4, NOW()) \
         ON CONFLICT (user_id, symbol) DO UPDATE SET quantity = $3, average_price = $4, updated_at = NOW()",
    )
    .bind(&position.user_id)
    .bind(&position.symbol)
    .bind(position.quantity)
    .bind(position.average_price)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Remove a closed position. No-op when absent.
pub async fn delete_position(
    conn: &mut PgConnection,
    user_id: &str,
    symbol: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM positions WHERE user_id = $1 AND symbol = $2")
        .bind(user_id)
        .bind(symbol)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// List positions for a user, optional symbol filter (for GET /api/portfolio).
pub async fn list_positions_for_user(
    pool: &PgPool,
    user_id: &str,
    symbol_filter: Option<&str>,
) -> Result<Vec<Position>, sqlx::Error> {
    let rows = if let Some(symbol) = symbol_filter {
        sqlx::query_as::<_, PositionRow>(
            "SELECT user_id, symbol, quantity, average_price FROM positions \
             WHERE user_id = $1 AND symbol = $2 ORDER BY symbol",
        )
        .bind(user_id)
        .bind(symbol)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, PositionRow>(
            "SELECT user_id, symbol, quantity, average_price FROM positions \
             WHERE user_id = $1 ORDER BY symbol",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?
    };
    Ok(rows.into_iter().map(Position::from).collect())
}
