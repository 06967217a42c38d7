//! Prometheus metrics for the gateway.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "rvid_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "rvid_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "rvid_http_requests_in_flight";

    // Job metrics
    pub const JOBS_STARTED_TOTAL: &str = "rvid_jobs_started_total";
    pub const JOBS_STOPPED_TOTAL: &str = "rvid_jobs_stopped_total";
    pub const UPSTREAM_FAILURES_TOTAL: &str = "rvid_upstream_failures_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "rvid_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record job started.
pub fn record_job_started() {
    counter!(names::JOBS_STARTED_TOTAL).increment(1);
}

/// Record stop request forwarded.
pub fn record_job_stopped() {
    counter!(names::JOBS_STOPPED_TOTAL).increment(1);
}

/// Record a rendering-backend failure.
pub fn record_upstream_failure(operation: &str) {
    let labels = [("operation", operation.to_string())];
    counter!(names::UPSTREAM_FAILURES_TOTAL, &labels).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels: job ids become a placeholder so
/// label cardinality stays bounded.
fn sanitize_path(path: &str) -> String {
    let mut out = Vec::new();
    let mut segments = path.split('/').peekable();
    while let Some(segment) = segments.next() {
        out.push(segment.to_string());
        if segment == "jobs" {
            // Fixed verbs like "start" fail the id shape check and pass
            // through unchanged.
            if let Some(next_segment) = segments.peek() {
                if rvid_models::JobId::is_well_formed(next_segment) {
                    out.push(":job_id".to_string());
                    segments.next();
                }
            }
        }
    }
    out.join("/")
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    // Increment in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    // Decrement in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}
