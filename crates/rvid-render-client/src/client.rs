//! Rendering backend HTTP client.

use std::time::Duration;

use reqwest::header::RANGE;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, warn};

use rvid_models::{JobId, JobStatusView, StartJobResponse, StopAck};

use crate::error::{RenderError, RenderResult};
use crate::types::StartJobPayload;

/// Configuration for the render client.
#[derive(Debug, Clone)]
pub struct RenderClientConfig {
    /// Base URL of the rendering backend.
    pub base_url: String,
    /// Request timeout for control-plane calls.
    pub timeout: Duration,
}

impl Default for RenderClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RenderClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("RENDER_BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            timeout: Duration::from_secs(
                std::env::var("RENDER_BACKEND_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

/// Client for the rendering backend.
///
/// None of the control-plane calls retry: re-invocation is the caller's
/// decision (safe for status/stop, not assumed safe for start).
pub struct RenderClient {
    http: Client,
    config: RenderClientConfig,
}

impl RenderClient {
    /// Create a new render client.
    pub fn new(config: RenderClientConfig) -> RenderResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RenderError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> RenderResult<Self> {
        Self::new(RenderClientConfig::from_env())
    }

    /// Submit a job. Returns the backend-issued id verbatim.
    pub async fn start_job(&self, payload: &StartJobPayload) -> RenderResult<StartJobResponse> {
        let url = format!("{}/jobs/start", self.config.base_url);
        debug!(repo_url = %payload.repo_url, "Forwarding start request to {}", url);

        let response = self.http.post(&url).json(payload).send().await?;
        let response = Self::check(response, None).await?;
        Ok(response.json().await?)
    }

    /// Fetch the current status snapshot for a job.
    pub async fn job_status(&self, job_id: &JobId) -> RenderResult<JobStatusView> {
        let url = format!("{}/jobs/{}/status", self.config.base_url, job_id);

        let response = self.http.get(&url).send().await?;
        let response = Self::check(response, Some(job_id)).await?;
        Ok(response.json().await?)
    }

    /// Signal cancellation. Best-effort; the backend may already have
    /// finished or expired the job.
    pub async fn stop_job(&self, job_id: &JobId) -> RenderResult<StopAck> {
        let url = format!("{}/jobs/{}/stop", self.config.base_url, job_id);

        let response = self.http.post(&url).send().await?;
        let response = Self::check(response, Some(job_id)).await?;
        Ok(response.json().await?)
    }

    /// Fetch the rendered video, forwarding an optional `Range` header.
    ///
    /// Returns the raw response so the caller can relay status, range
    /// framing, and body without buffering the payload.
    pub async fn fetch_video(
        &self,
        job_id: &JobId,
        range: Option<&str>,
    ) -> RenderResult<Response> {
        let url = format!("{}/jobs/{}/video", self.config.base_url, job_id);

        let mut request = self.http.get(&url);
        if let Some(range) = range {
            request = request.header(RANGE, range);
        }

        let response = request.send().await?;
        Self::check(response, Some(job_id)).await
    }

    /// Check if the backend is reachable and healthy.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!("Rendering backend health check failed: {}", response.status());
                false
            }
            Err(e) => {
                warn!("Rendering backend health check error: {}", e);
                false
            }
        }
    }

    /// Triage a backend response into the error taxonomy.
    async fn check(response: Response, job_id: Option<&JobId>) -> RenderResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            let id = job_id.map(|id| id.to_string()).unwrap_or_default();
            return Err(RenderError::NotFound(id));
        }

        let message = response.text().await.unwrap_or_default();
        Err(RenderError::RequestFailed {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvid_models::{ProgressStep, VisualizationSettings};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> RenderClient {
        RenderClient::new(RenderClientConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = RenderClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8081");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_start_job_returns_backend_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/jobs/start"))
            .and(body_partial_json(serde_json::json!({
                "repo_url": "https://github.com/acme/widgets"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "job_id": "954762ae-0e89-48c6-9e84-78fdbf9bd0ea"
                })),
            )
            .mount(&server)
            .await;

        let payload = StartJobPayload {
            repo_url: "https://github.com/acme/widgets".to_string(),
            access_token: None,
            settings: VisualizationSettings::default(),
        };
        let response = client_for(&server).start_job(&payload).await.unwrap();
        assert_eq!(response.job_id.as_str(), "954762ae-0e89-48c6-9e84-78fdbf9bd0ea");
    }

    #[tokio::test]
    async fn test_status_maps_404_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs/gone-12345678/status"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .job_status(&JobId::from_string("gone-12345678"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_status_passes_fields_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs/job-12345678/status"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "step": 3,
                    "video_url": "/videos/job-12345678.mp4",
                    "error": null,
                    "repo_url": "https://github.com/acme/widgets",
                    "settings": {"show_usernames": false, "dir_font_size": 14}
                })),
            )
            .mount(&server)
            .await;

        let view = client_for(&server)
            .job_status(&JobId::from_string("job-12345678"))
            .await
            .unwrap();
        assert_eq!(view.step, Some(ProgressStep::GeneratingVisualization));
        assert_eq!(view.video_url.as_deref(), Some("/videos/job-12345678.mp4"));
        assert!(!view.settings.show_usernames);
        assert_eq!(view.settings.dir_font_size, 14);
    }

    #[tokio::test]
    async fn test_server_error_is_request_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/jobs/start"))
            .respond_with(ResponseTemplate::new(500).set_body_string("encoder crashed"))
            .mount(&server)
            .await;

        let payload = StartJobPayload {
            repo_url: "https://github.com/acme/widgets".to_string(),
            access_token: None,
            settings: VisualizationSettings::default(),
        };
        let err = client_for(&server).start_job(&payload).await.unwrap_err();
        match err {
            RenderError::RequestFailed { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "encoder crashed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_video_forwards_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs/job-12345678/video"))
            .and(header("Range", "bytes=100-199"))
            .respond_with(
                ResponseTemplate::new(206)
                    .insert_header("Content-Range", "bytes 100-199/1000")
                    .set_body_bytes(vec![0u8; 100]),
            )
            .mount(&server)
            .await;

        let response = client_for(&server)
            .fetch_video(&JobId::from_string("job-12345678"), Some("bytes=100-199"))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 206);
        assert_eq!(
            response.headers().get("Content-Range").unwrap(),
            "bytes 100-199/1000"
        );
        assert_eq!(response.bytes().await.unwrap().len(), 100);
    }
}
