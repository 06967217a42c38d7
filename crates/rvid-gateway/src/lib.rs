//! Axum HTTP gateway for the repovid coordination layer.
//!
//! This crate provides:
//! - Sliding-window admission control per client identity
//! - Credential encryption for transit to the rendering backend
//! - Request forwarding with normalized errors
//! - Video relay with range support
//! - Prometheus metrics

pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{ConfigError, GatewayConfig};
pub use crypto::TokenCipher;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
