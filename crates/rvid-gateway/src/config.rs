//! Gateway configuration.

use thiserror::Error;

use rvid_store::RateLimitConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The encryption secret is mandatory. Starting without it would
    /// eventually mean forwarding a credential in clear text, so the
    /// process refuses to boot instead.
    #[error("RVID_SECRET_KEY must be set")]
    MissingSecret,
}

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Secret used to derive the credential-encryption key
    pub secret_key: String,
    /// Admission control parameters
    pub rate_limit: RateLimitConfig,
    /// Environment (development/production)
    pub environment: String,
}

impl GatewayConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret_key = std::env::var("RVID_SECRET_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        Ok(Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(64 * 1024), // control-plane JSON only
            secret_key,
            rate_limit: RateLimitConfig::from_env(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}
