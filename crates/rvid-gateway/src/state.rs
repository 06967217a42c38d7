//! Application state.

use std::sync::Arc;

use rvid_render_client::RenderClient;
use rvid_store::{
    CounterStore, GenerationCounter, HealthProbe, RateLimiter, RedisStore, WindowStore,
};

use crate::config::GatewayConfig;
use crate::crypto::TokenCipher;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: GatewayConfig,
    pub cipher: Arc<TokenCipher>,
    pub limiter: Arc<RateLimiter>,
    pub counter: Arc<GenerationCounter>,
    pub render: Arc<RenderClient>,
    pub store_probe: Arc<dyn HealthProbe>,
}

impl AppState {
    /// Create new application state, connecting to the shared store and
    /// failing fast if it is unreachable.
    pub async fn new(config: GatewayConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = Arc::new(RedisStore::from_env()?);
        store.connect().await?;

        let render = RenderClient::from_env()?;

        Ok(Self::assemble(
            config,
            render,
            Arc::clone(&store) as Arc<dyn WindowStore>,
            Arc::clone(&store) as Arc<dyn CounterStore>,
            store,
        )?)
    }

    /// Wire the state from explicit parts. Lets tests inject an
    /// in-memory store and a mocked rendering backend.
    pub fn assemble(
        config: GatewayConfig,
        render: RenderClient,
        window_store: Arc<dyn WindowStore>,
        counter_store: Arc<dyn CounterStore>,
        probe: Arc<dyn HealthProbe>,
    ) -> Result<Self, crate::config::ConfigError> {
        let cipher = TokenCipher::new(&config.secret_key)?;
        let limiter = RateLimiter::new(window_store, config.rate_limit.clone());
        let counter = GenerationCounter::new(counter_store);

        Ok(Self {
            config,
            cipher: Arc::new(cipher),
            limiter: Arc::new(limiter),
            counter: Arc::new(counter),
            render: Arc::new(render),
            store_probe: probe,
        })
    }
}
