//! Job lifecycle handlers: start, status, stop.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;
use validator::Validate;

use rvid_models::{JobId, JobStatusView, StartJobResponse, StopAck, VisualizationSettings};
use rvid_render_client::{RenderError, StartJobPayload};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::middleware::client_identity;
use crate::state::AppState;

/// Maximum repository URL length.
const MAX_REPO_URL_LENGTH: usize = 2048;

/// Body for POST /api/jobs/start.
///
/// `access_token` is the caller's plaintext credential; it exists only
/// in this inbound type and is encrypted before anything leaves the
/// process. Deliberately not `Debug`/`Serialize`.
#[derive(Deserialize, Validate)]
pub struct StartJobRequest {
    #[validate(length(min = 1, max = 2048))]
    pub repo_url: String,
    pub access_token: Option<String>,
    #[validate(nested)]
    pub settings: Option<VisualizationSettings>,
}

/// POST /api/jobs/start
///
/// Admission-checks the caller, encrypts the credential when present,
/// forwards to the rendering backend, and returns the backend-issued
/// job id verbatim.
pub async fn start_job(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<StartJobRequest>,
) -> ApiResult<Json<StartJobResponse>> {
    // Reject malformed input before any network call.
    request
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;
    validate_repo_url(&request.repo_url)?;
    let settings = request.settings.unwrap_or_default();

    // Admission control. The attempt is charged even when the start
    // later fails upstream.
    let identity = client_identity(&headers);
    let decision = state.limiter.admit(&identity).await;
    if !decision.allowed {
        warn!(identity = %identity, "Rate limit exceeded");
        metrics::record_rate_limit_hit("/api/jobs/start");
        return Err(ApiError::rate_limited(&decision));
    }

    let access_token = request
        .access_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(|t| state.cipher.encrypt(t));

    let payload = StartJobPayload {
        repo_url: request.repo_url.clone(),
        access_token,
        settings,
    };

    let response = state.render.start_job(&payload).await.map_err(|e| {
        metrics::record_upstream_failure("start");
        ApiError::from(e)
    })?;

    // Display-only counter; a store hiccup must not fail the start.
    if let Err(e) = state.counter.record_started().await {
        warn!("Failed to record generation count: {}", e);
    }
    metrics::record_job_started();

    info!(job_id = %response.job_id, repo_url = %request.repo_url, "Started visualization job");
    Ok(Json(response))
}

/// GET /api/jobs/:job_id/status
///
/// Passes the backend snapshot through unchanged. A backend 404 maps to
/// a distinct not-found error so the UI can show "expired" rather than
/// "failed".
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let job_id = parse_job_id(&job_id)?;

    let view: JobStatusView = state.render.job_status(&job_id).await.map_err(|e| {
        if !e.is_not_found() {
            metrics::record_upstream_failure("status");
        }
        ApiError::from(e)
    })?;

    // Pollers must always see the live snapshot.
    Ok(([(header::CACHE_CONTROL, "no-store")], Json(view)))
}

/// POST (or GET) /api/jobs/:job_id/stop
///
/// Idempotent: stopping an already-stopped, completed, or expired job
/// still acknowledges.
pub async fn stop_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<StopAck>> {
    let job_id = parse_job_id(&job_id)?;

    match state.render.stop_job(&job_id).await {
        Ok(ack) => {
            metrics::record_job_stopped();
            info!(job_id = %job_id, "Stop signal forwarded");
            Ok(Json(ack))
        }
        Err(RenderError::NotFound(_)) => {
            // The backend already forgot the job; nothing left to stop.
            Ok(Json(StopAck { acknowledged: true }))
        }
        Err(e) => {
            metrics::record_upstream_failure("stop");
            Err(ApiError::from(e))
        }
    }
}

/// Validate the job id path segment.
pub(crate) fn parse_job_id(id: &str) -> ApiResult<JobId> {
    if !JobId::is_well_formed(id) {
        return Err(ApiError::validation("Invalid job ID format"));
    }
    Ok(JobId::from_string(id))
}

/// Validate a repository URL: http(s), host present, bounded length.
fn validate_repo_url(repo_url: &str) -> ApiResult<()> {
    if repo_url.len() > MAX_REPO_URL_LENGTH {
        return Err(ApiError::validation("Repository URL too long"));
    }

    let parsed = Url::parse(repo_url.trim())
        .map_err(|_| ApiError::validation("Invalid repository URL"))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ApiError::validation(format!(
                "Invalid protocol '{}'. Only HTTP and HTTPS are allowed.",
                scheme
            )))
        }
    }

    if parsed.host_str().is_none() {
        return Err(ApiError::validation("Repository URL must have a host"));
    }

    Ok(())
}
