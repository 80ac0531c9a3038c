//! Storage seam used by the HTTP layer: Postgres in production, in-memory
//! when no database is configured.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{positions, trades};
use crate::positions::{apply_trade, PositionUpdate};
use crate::types::position::Position;
use crate::types::trade::Trade;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait TradeStore: Send + Sync {
    /// Record the trade and apply it to the user's position in one step.
    /// Returns the resulting position, or None when it was closed.
    async fn record_trade(&self, trade: &Trade) -> Result<Option<Position>, StoreError>;

    async fn list_trades(
        &self,
        user_id: &str,
        symbol: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Trade>, StoreError>;

    async fn list_positions(
        &self,
        user_id: &str,
        symbol: Option<&str>,
    ) -> Result<Vec<Position>, StoreError>;
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TradeStore for PgStore {
    async fn record_trade(&self, trade: &Trade) -> Result<Option<Position>, StoreError> {
        let mut tx = self.pool.begin().await?;

        positions::lock_position(&mut tx, &trade.user_id, &trade.symbol).await?;
        trades::insert_trade(&mut tx, trade).await?;
        let existing = positions::get_position_for_update(&mut tx, &trade.user_id, &trade.symbol).await?;

        let result = match apply_trade(existing.as_ref(), trade) {
            PositionUpdate::Upsert(position) => {
                positions::upsert_position(&mut tx, &position).await?;
                Some(position)
            }
            PositionUpdate::Delete => {
                positions::delete_position(&mut tx, &trade.user_id, &trade.symbol).await?;
                None
            }
        };

        tx.commit().await?;
        Ok(result)
    }

    async fn list_trades(
        &self,
        user_id: &str,
        symbol: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Trade>, StoreError> {
        Ok(trades::list_trades_for_user(&self.pool, user_id, symbol, limit).await?)
    }

    async fn list_positions(
        &self,
        user_id: &str,
        symbol: Option<&str>,
    ) -> Result<Vec<Position>, StoreError> {
        Ok(positions::list_positions_for_user(&self.pool, user_id, symbol).await?)
    }
}
