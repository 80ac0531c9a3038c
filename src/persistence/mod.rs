//! Database layer: pool, migrations, trade and position access, and the
//! `TradeStore` seam with its Postgres and in-memory implementations.

mod memory;
mod pool;
mod positions;
mod store;
mod trades;

pub use memory::MemoryStore;
pub use pool::{create_pool_and_migrate, run_migrations};
pub use positions::{
    delete_position, get_position_for_update, list_positions_for_user, lock_position, upsert_position,
    PositionRow,
};
pub use sqlx::PgPool;
pub use store::{PgStore, StoreError, TradeStore};
pub use trades::{insert_trade, list_trades_for_user, TradeRow};
