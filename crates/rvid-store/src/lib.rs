//! Shared mutable state behind an injected store interface.
//!
//! The rate-limit window per client identity and the persistent
//! generation counter are the only state this subsystem owns. Both live
//! behind small traits so the gateway takes a store by injection:
//! Redis in production, an in-memory map in tests and single-process
//! deployments. Stores connect at startup and fail fast if unreachable.

pub mod counter;
pub mod error;
pub mod health;
pub mod limiter;
pub mod memory;
pub mod redis_store;

pub use counter::{CounterStore, GenerationCounter};
pub use error::{StoreError, StoreResult};
pub use health::HealthProbe;
pub use limiter::{
    FailurePolicy, RateLimitConfig, RateLimitDecision, RateLimiter, WindowSnapshot, WindowStore,
};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
