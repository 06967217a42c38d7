//! Render client error types.

use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The backend does not know the job id (unknown or expired).
    /// Kept distinct from other failures so callers can show "expired"
    /// rather than "failed".
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Rendering backend returned {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl RenderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RenderError::NotFound(_))
    }
}
