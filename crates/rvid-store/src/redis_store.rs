//! Redis-backed store.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::debug;
use uuid::Uuid;

use crate::counter::CounterStore;
use crate::error::StoreResult;
use crate::limiter::{WindowSnapshot, WindowStore};

/// Store client over a shared Redis instance.
///
/// Constructed once at startup; callers should `connect()` immediately
/// and treat failure as fatal rather than discovering a dead store on
/// the first request.
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    /// Create a new store client.
    pub fn new(redis_url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    /// Create from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        Self::new(&redis_url)
    }

    /// Verify the store is reachable.
    pub async fn connect(&self) -> StoreResult<()> {
        self.ping().await
    }

    /// Liveness probe.
    pub async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn().await?;
        redis::cmd("PING").query_async::<()>(&mut conn).await?;
        Ok(())
    }

    async fn conn(&self) -> StoreResult<MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl WindowStore for RedisStore {
    async fn record_attempt(
        &self,
        key: &str,
        now_ms: i64,
        window_ms: i64,
    ) -> StoreResult<WindowSnapshot> {
        let mut conn = self.conn().await?;

        // Members must be unique so concurrent same-millisecond attempts
        // are each charged.
        let member = format!("{}-{}", now_ms, Uuid::new_v4());
        let window_start = now_ms - window_ms;

        // MULTI/EXEC keeps evict-append-count atomic per key.
        let (count, oldest): (u64, Vec<(String, i64)>) = redis::pipe()
            .atomic()
            .cmd("ZREMRANGEBYSCORE")
            .arg(key)
            .arg("-inf")
            // Exclusive bound: an entry exactly on the window boundary
            // still counts.
            .arg(format!("({}", window_start))
            .ignore()
            .cmd("ZADD")
            .arg(key)
            .arg(now_ms)
            .arg(&member)
            .ignore()
            .cmd("ZCARD")
            .arg(key)
            .cmd("ZRANGE")
            .arg(key)
            .arg(0)
            .arg(0)
            .arg("WITHSCORES")
            .cmd("PEXPIRE")
            .arg(key)
            .arg(window_ms)
            .ignore()
            .query_async(&mut conn)
            .await?;

        let oldest_ms = oldest.first().map(|(_, score)| *score).unwrap_or(now_ms);
        debug!(key = %key, count, oldest_ms, "Recorded rate-limit attempt");

        Ok(WindowSnapshot { count, oldest_ms })
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn incr(&self, key: &str) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        let value: u64 = conn.incr(key, 1).await?;
        Ok(value)
    }

    async fn get(&self, key: &str) -> StoreResult<u64> {
        let mut conn = self.conn().await?;
        let value: Option<u64> = conn.get(key).await?;
        Ok(value.unwrap_or(0))
    }
}
