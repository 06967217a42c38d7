//! Video relay with range support.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Response, StatusCode};

use crate::error::ApiError;
use crate::handlers::jobs::parse_job_id;
use crate::metrics;
use crate::state::AppState;

/// GET /api/jobs/:job_id/video
///
/// Relays the backend's video stream. Range requests pass through with
/// the backend's partial-content framing intact; full responses are
/// marked immutable because the video for a given job id never changes
/// once produced.
pub async fn get_video(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response<Body>, ApiError> {
    let job_id = parse_job_id(&job_id)?;

    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let upstream = state
        .render
        .fetch_video(&job_id, range.as_deref())
        .await
        .map_err(|e| {
            if !e.is_not_found() {
                metrics::record_upstream_failure("video");
            }
            ApiError::from(e)
        })?;

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::OK);

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::ACCEPT_RANGES, "bytes");

    // Relay length and range framing from the backend.
    for name in ["content-length", "content-range"] {
        if let Some(value) = upstream.headers().get(name).and_then(|v| v.to_str().ok()) {
            builder = builder.header(name, value);
        }
    }

    if status != StatusCode::PARTIAL_CONTENT {
        builder = builder
            .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
            .header(
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"repovid_{}.mp4\"", job_id),
            );
    }

    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| ApiError::internal(format!("Failed to build response: {}", e)))
}
