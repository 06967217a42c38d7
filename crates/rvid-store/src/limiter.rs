//! Sliding-window admission control.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tracing::warn;

use crate::error::StoreResult;

/// What the limiter does when the backing store is unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Admit the request. A store outage should not lock out a
    /// legitimate user from an otherwise healthy backend.
    #[default]
    Open,
    /// Deny the request until the store comes back.
    Closed,
}

impl FailurePolicy {
    /// Parse from config text; anything other than "closed" is open.
    pub fn from_str_lossy(s: &str) -> Self {
        if s.eq_ignore_ascii_case("closed") {
            FailurePolicy::Closed
        } else {
            FailurePolicy::Open
        }
    }
}

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum attempts per window.
    pub quota: u64,
    /// Trailing window length in seconds.
    pub window_secs: u64,
    /// Behavior when the store is unreachable.
    pub policy: FailurePolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            quota: 20,
            window_secs: 3600,
            policy: FailurePolicy::Open,
        }
    }
}

impl RateLimitConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            quota: std::env::var("RVID_RATE_LIMIT_QUOTA")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
            window_secs: std::env::var("RVID_RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600),
            policy: std::env::var("RVID_RATE_LIMIT_POLICY")
                .map(|s| FailurePolicy::from_str_lossy(&s))
                .unwrap_or_default(),
        }
    }
}

/// Result of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the attempt is admitted.
    pub allowed: bool,
    /// The configured quota.
    pub limit: u64,
    /// Attempts left in the current window.
    pub remaining: u64,
    /// Unix seconds after which the oldest counted attempt expires.
    pub reset_at: u64,
}

/// State of one identity's window after recording an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot {
    /// Attempts inside the window, including the one just recorded.
    pub count: u64,
    /// Timestamp (ms) of the oldest attempt still counted.
    pub oldest_ms: i64,
}

/// One atomic operation over an identity's window: evict entries older
/// than the window, append the current attempt, report what remains.
/// Implementations must serialize this per key so concurrent attempts
/// from the same identity are each charged exactly once.
#[async_trait]
pub trait WindowStore: Send + Sync {
    async fn record_attempt(
        &self,
        key: &str,
        now_ms: i64,
        window_ms: i64,
    ) -> StoreResult<WindowSnapshot>;
}

/// Sliding-window rate limiter keyed by client identity.
pub struct RateLimiter {
    store: Arc<dyn WindowStore>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn WindowStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    /// Check and charge one attempt for `identity`.
    ///
    /// The attempt is recorded whether or not it is admitted: the
    /// limiter counts attempts, not successes.
    pub async fn admit(&self, identity: &str) -> RateLimitDecision {
        let now_ms = unix_millis();
        let window_ms = (self.config.window_secs as i64) * 1000;
        let key = format!("rvid:ratelimit:{}", identity);

        match self.store.record_attempt(&key, now_ms, window_ms).await {
            Ok(snapshot) => self.decide(snapshot, window_ms),
            Err(e) => {
                warn!(identity = %identity, error = %e, "Rate-limit store unreachable");
                self.decide_on_failure(now_ms)
            }
        }
    }

    fn decide(&self, snapshot: WindowSnapshot, window_ms: i64) -> RateLimitDecision {
        let quota = self.config.quota;
        RateLimitDecision {
            allowed: snapshot.count <= quota,
            limit: quota,
            remaining: quota.saturating_sub(snapshot.count),
            reset_at: ((snapshot.oldest_ms + window_ms) / 1000).max(0) as u64,
        }
    }

    fn decide_on_failure(&self, now_ms: i64) -> RateLimitDecision {
        let allowed = matches!(self.config.policy, FailurePolicy::Open);
        RateLimitDecision {
            allowed,
            limit: self.config.quota,
            remaining: if allowed { self.config.quota } else { 0 },
            reset_at: ((now_ms / 1000).max(0) as u64) + self.config.window_secs,
        }
    }
}

pub(crate) fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn limiter(quota: u64, window_secs: u64) -> RateLimiter {
        RateLimiter::new(
            Arc::new(MemoryStore::new()),
            RateLimitConfig {
                quota,
                window_secs,
                policy: FailurePolicy::Open,
            },
        )
    }

    #[tokio::test]
    async fn test_quota_two_third_attempt_denied() {
        let limiter = limiter(2, 60);

        let first = limiter.admit("203.0.113.9").await;
        assert!(first.allowed);
        assert_eq!(first.limit, 2);
        assert_eq!(first.remaining, 1);

        let second = limiter.admit("203.0.113.9").await;
        assert!(second.allowed);
        assert_eq!(second.remaining, 0);

        let third = limiter.admit("203.0.113.9").await;
        assert!(!third.allowed);
        assert_eq!(third.remaining, 0);
        assert!(third.reset_at > 0);
    }

    #[tokio::test]
    async fn test_identities_do_not_interact() {
        let limiter = limiter(1, 60);

        assert!(limiter.admit("alice").await.allowed);
        assert!(!limiter.admit("alice").await.allowed);
        assert!(limiter.admit("bob").await.allowed);
    }

    #[tokio::test]
    async fn test_denied_attempts_are_still_charged() {
        let limiter = limiter(1, 60);

        assert!(limiter.admit("carol").await.allowed);
        // Each rejected attempt keeps the window full.
        for _ in 0..3 {
            let decision = limiter.admit("carol").await;
            assert!(!decision.allowed);
            assert_eq!(decision.remaining, 0);
        }
    }

    #[tokio::test]
    async fn test_window_eviction_frees_quota() {
        let store = Arc::new(MemoryStore::new());
        let limiter = RateLimiter::new(
            Arc::clone(&store) as Arc<dyn WindowStore>,
            RateLimitConfig {
                quota: 1,
                window_secs: 60,
                policy: FailurePolicy::Open,
            },
        );

        assert!(limiter.admit("dave").await.allowed);
        assert!(!limiter.admit("dave").await.allowed);

        // Age every recorded attempt past the window boundary.
        store.shift_timestamps("rvid:ratelimit:dave", -61_000);
        assert!(limiter.admit("dave").await.allowed);
    }

    #[tokio::test]
    async fn test_reset_at_tracks_oldest_entry() {
        let store = Arc::new(MemoryStore::new());
        let now = unix_millis();
        let snapshot = store
            .record_attempt("rvid:ratelimit:erin", now, 60_000)
            .await
            .unwrap();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.oldest_ms, now);

        let later = store
            .record_attempt("rvid:ratelimit:erin", now + 5_000, 60_000)
            .await
            .unwrap();
        assert_eq!(later.count, 2);
        // oldest entry is still the first attempt
        assert_eq!(later.oldest_ms, now);
    }

    #[tokio::test]
    async fn test_fail_open_policy() {
        struct BrokenStore;

        #[async_trait]
        impl WindowStore for BrokenStore {
            async fn record_attempt(
                &self,
                _key: &str,
                _now_ms: i64,
                _window_ms: i64,
            ) -> StoreResult<WindowSnapshot> {
                Err(crate::error::StoreError::config("store down"))
            }
        }

        let open = RateLimiter::new(Arc::new(BrokenStore), RateLimitConfig::default());
        assert!(open.admit("frank").await.allowed);

        let closed = RateLimiter::new(
            Arc::new(BrokenStore),
            RateLimitConfig {
                policy: FailurePolicy::Closed,
                ..Default::default()
            },
        );
        let decision = closed.admit("frank").await;
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }
}
