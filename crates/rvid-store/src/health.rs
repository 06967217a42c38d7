//! Store liveness probe.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::memory::MemoryStore;
use crate::redis_store::RedisStore;

/// Reachability check, used by readiness endpoints.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self) -> StoreResult<()>;
}

#[async_trait]
impl HealthProbe for RedisStore {
    async fn probe(&self) -> StoreResult<()> {
        self.ping().await
    }
}

#[async_trait]
impl HealthProbe for MemoryStore {
    async fn probe(&self) -> StoreResult<()> {
        Ok(())
    }
}
