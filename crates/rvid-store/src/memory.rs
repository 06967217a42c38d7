//! In-memory store for tests and single-process deployments.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::counter::CounterStore;
use crate::error::StoreResult;
use crate::limiter::{WindowSnapshot, WindowStore};

/// Mutex-serialized map store. Same contract as the Redis store, minus
/// persistence across processes.
#[derive(Default)]
pub struct MemoryStore {
    windows: Mutex<HashMap<String, Vec<i64>>>,
    counter: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: move every timestamp recorded under `key` by
    /// `delta_ms`, so window eviction can be exercised without sleeping.
    pub fn shift_timestamps(&self, key: &str, delta_ms: i64) {
        let mut windows = self.windows.lock().expect("window map poisoned");
        if let Some(entries) = windows.get_mut(key) {
            for ts in entries.iter_mut() {
                *ts += delta_ms;
            }
        }
    }
}

#[async_trait]
impl WindowStore for MemoryStore {
    async fn record_attempt(
        &self,
        key: &str,
        now_ms: i64,
        window_ms: i64,
    ) -> StoreResult<WindowSnapshot> {
        let mut windows = self.windows.lock().expect("window map poisoned");
        let entries = windows.entry(key.to_string()).or_default();

        // Evict strictly-older-than-window entries; one sitting exactly
        // on the boundary still counts.
        let cutoff = now_ms - window_ms;
        entries.retain(|&ts| ts >= cutoff);
        entries.push(now_ms);

        Ok(WindowSnapshot {
            count: entries.len() as u64,
            oldest_ms: entries.iter().copied().min().unwrap_or(now_ms),
        })
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn incr(&self, _key: &str) -> StoreResult<u64> {
        Ok(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn get(&self, _key: &str) -> StoreResult<u64> {
        Ok(self.counter.load(Ordering::SeqCst))
    }
}
