//! Job status as observed through the gateway.

use serde::{Deserialize, Serialize};

use crate::job::JobId;
use crate::progress::ProgressStep;
use crate::settings::VisualizationSettings;

/// Snapshot of a job as reported by the rendering backend.
///
/// Owned and mutated exclusively by the backend; the gateway passes it
/// through unchanged and the poller only reads it. Once `video_url` or
/// `error` is set the snapshot is stable on every further query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusView {
    /// Current step, absent while the job is still only submitted.
    #[serde(default)]
    pub step: Option<ProgressStep>,
    /// Reference to the finished video, if any.
    #[serde(default)]
    pub video_url: Option<String>,
    /// Error message, if the job failed.
    #[serde(default)]
    pub error: Option<String>,
    /// The repository this job renders.
    pub repo_url: String,
    /// The settings the job was started with.
    #[serde(default)]
    pub settings: VisualizationSettings,
}

impl JobStatusView {
    /// A terminal snapshot carries a video reference or an error; the
    /// backend guarantees no further progress after either appears.
    pub fn is_terminal(&self) -> bool {
        self.video_url.is_some() || self.error.is_some()
    }
}

/// Response to a successful start request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartJobResponse {
    pub job_id: JobId,
}

/// Acknowledgement of a stop request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopAck {
    pub acknowledged: bool,
}
