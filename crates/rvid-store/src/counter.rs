//! Persistent generation counter.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreResult;

/// Monotonic counter operations.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn incr(&self, key: &str) -> StoreResult<u64>;
    async fn get(&self, key: &str) -> StoreResult<u64>;
}

/// Counts jobs ever started. Display-only and eventually consistent;
/// incremented on every accepted start regardless of job outcome.
pub struct GenerationCounter {
    store: Arc<dyn CounterStore>,
    key: String,
}

impl GenerationCounter {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self {
            store,
            key: "rvid:generations".to_string(),
        }
    }

    /// Record one started job.
    pub async fn record_started(&self) -> StoreResult<u64> {
        self.store.incr(&self.key).await
    }

    /// Current total.
    pub async fn current(&self) -> StoreResult<u64> {
        self.store.get(&self.key).await
    }
}
