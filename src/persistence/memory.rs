//! In-memory store for running without a database and for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{StoreError, TradeStore};
use crate::positions::{apply_trade, PositionUpdate};
use crate::types::position::Position;
use crate::types::trade::Trade;

#[derive(Default)]
struct Inner {
    trades: Vec<Trade>,
    positions: HashMap<(String, String), Position>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TradeStore for MemoryStore {
    async fn record_trade(&self, trade: &Trade) -> Result<Option<Position>, StoreError> {
        let mut guard = self.inner.write().await;
        guard.trades.push(trade.clone());

        let key = (trade.user_id.clone(), trade.symbol.clone());
        match apply_trade(guard.positions.get(&key), trade) {
            PositionUpdate::Upsert(position) => {
                guard.positions.insert(key, position.clone());
                Ok(Some(position))
            }
            PositionUpdate::Delete => {
                guard.positions.remove(&key);
                Ok(None)
            }
        }
    }

    async fn list_trades(
        &self,
        user_id: &str,
        symbol: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Trade>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard
            .trades
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id && symbol.is_none_or(|s| t.symbol == s))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_positions(
        &self,
        user_id: &str,
        symbol: Option<&str>,
    ) -> Result<Vec<Position>, StoreError> {
        let guard = self.inner.read().await;
        let mut positions: Vec<Position> = guard
            .positions
            .iter()
            .filter(|((uid, sym), _)| uid == user_id && symbol.is_none_or(|s| sym == s))
            .map(|(_, pos)| pos.clone())
            .collect();
        positions.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(positions)
    }
}
