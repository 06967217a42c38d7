//! Gateway error types.
//!
//! Everything that can go wrong on a request is recovered here and
//! translated into a stable, typed response; nothing propagates as an
//! unhandled fault past the handler boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use rvid_render_client::RenderError;
use rvid_store::RateLimitDecision;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input, rejected before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Admission denied by the rate limiter.
    #[error("Rate limit exceeded")]
    RateLimited {
        limit: u64,
        remaining: u64,
        reset_at: u64,
    },

    /// Job id unknown or expired.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The rendering backend is unreachable or returned a server error.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn rate_limited(decision: &RateLimitDecision) -> Self {
        Self::RateLimited {
            limit: decision.limit,
            remaining: decision.remaining,
            reset_at: decision.reset_at,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::NotFound(id) => ApiError::NotFound(format!("Job not found: {}", id)),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reset_at: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose upstream/internal error details in production
        let detail = match &self {
            ApiError::Upstream(_) | ApiError::Internal(_) => {
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        if let ApiError::RateLimited {
            limit,
            remaining,
            reset_at,
        } = self
        {
            let body = ErrorResponse {
                detail,
                limit: Some(limit),
                remaining: Some(remaining),
                reset_at: Some(reset_at),
            };
            return (
                status,
                [
                    ("X-RateLimit-Limit", limit.to_string()),
                    ("X-RateLimit-Remaining", remaining.to_string()),
                    ("X-RateLimit-Reset", reset_at.to_string()),
                ],
                Json(body),
            )
                .into_response();
        }

        let body = ErrorResponse {
            detail,
            limit: None,
            remaining: None,
            reset_at: None,
        };
        (status, Json(body)).into_response()
    }
}
