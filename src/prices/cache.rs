use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at: DateTime<Utc>,
}

/// Single-value cache with a fixed time-to-live. The caller supplies `now`,
/// so expiry is deterministic under test. Writes replace the value wholesale;
/// the most recent write wins.
pub struct TtlCache<T> {
    ttl: Duration,
    entry: RwLock<Option<CacheEntry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    /// The cached entry if its age at `now` is below the TTL.
    pub async fn fresh(&self, now: DateTime<Utc>) -> Option<CacheEntry<T>> {
        let guard = self.entry.read().await;
        guard
            .as_ref()
            .filter(|entry| is_fresh(entry.fetched_at, now, self.ttl))
            .cloned()
    }

    /// The cached entry regardless of age.
    pub async fn latest(&self) -> Option<CacheEntry<T>> {
        self.entry.read().await.clone()
    }

    pub async fn replace(&self, value: T, now: DateTime<Utc>) {
        *self.entry.write().await = Some(CacheEntry {
            value,
            fetched_at: now,
        });
    }
}

fn is_fresh(fetched_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    match (now - fetched_at).to_std() {
        Ok(age) => age < ttl,
        // fetched_at in the future (clock skew between writers): treat as fresh
        Err(_) => true,
    }
}
