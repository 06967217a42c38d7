//! Status reconciliation state machine.

use rvid_models::{JobId, JobStatusView, ProgressStep, VisualizationSettings};
use tracing::{debug, warn};

use crate::settings::SettingsSync;
use crate::watcher::FeedError;

/// Final disposition of a watched job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Still in progress.
    Pending,
    /// Video is ready.
    Completed { video_url: String },
    /// The backend reported an error.
    Failed { error: String },
    /// Stopped on this client; no error, no video.
    Stopped,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }
}

/// What a UI layer reads: the reconciled, monotonic job state.
#[derive(Debug, Clone, PartialEq)]
pub struct JobView {
    pub job_id: JobId,
    /// Highest step observed so far.
    pub step: Option<ProgressStep>,
    pub outcome: Outcome,
    pub repo_url: Option<String>,
    pub settings: VisualizationSettings,
    /// Advisory transport failure; the rest of the view is the last
    /// known good state.
    pub last_error: Option<String>,
}

/// Per-job-id reconciler.
///
/// Responses may arrive out of order; anything that would move the step
/// backwards is discarded as a stale duplicate. Once terminal, every
/// further input is ignored.
pub struct Reconciler {
    view: JobView,
    settings: SettingsSync,
    seen_success: bool,
}

impl Reconciler {
    pub fn new(job_id: JobId, local_settings: VisualizationSettings) -> Self {
        let settings = SettingsSync::new(local_settings);
        Self {
            view: JobView {
                job_id,
                step: None,
                outcome: Outcome::Pending,
                repo_url: None,
                settings: settings.current().clone(),
                last_error: None,
            },
            settings,
            seen_success: false,
        }
    }

    pub fn view(&self) -> &JobView {
        &self.view
    }

    /// Fold one status response into the view.
    pub fn observe(&mut self, response: JobStatusView) -> &JobView {
        if self.view.outcome.is_terminal() {
            // Stable by contract; also swallows responses that race a stop.
            return &self.view;
        }

        if let (Some(seen), Some(reported)) = (self.view.step, response.step) {
            if reported < seen {
                debug!(
                    job_id = %self.view.job_id,
                    seen = %seen,
                    reported = %reported,
                    "Discarding stale status response"
                );
                return &self.view;
            }
        }

        self.seen_success = true;
        self.view.last_error = None;
        if response.step.is_some() {
            self.view.step = response.step;
        }
        self.view.repo_url = Some(response.repo_url);
        self.settings.adopt(response.settings);
        self.view.settings = self.settings.current().clone();

        // Error is authoritative when the backend reports both.
        if let Some(error) = response.error {
            self.view.outcome = Outcome::Failed { error };
        } else if let Some(video_url) = response.video_url {
            self.view.outcome = Outcome::Completed { video_url };
        }

        &self.view
    }

    /// Fold one transport failure into the view.
    ///
    /// Failures before any successful lookup are terminal: the job the
    /// caller just started cannot be confirmed to exist. Later failures
    /// are advisory; polling continues with the last known good state.
    pub fn observe_failure(&mut self, error: &FeedError) -> &JobView {
        if self.view.outcome.is_terminal() {
            return &self.view;
        }

        if !self.seen_success {
            self.view.outcome = Outcome::Failed {
                error: error.to_string(),
            };
            return &self.view;
        }

        warn!(job_id = %self.view.job_id, error = %error, "Status fetch failed; keeping last known state");
        self.view.last_error = Some(error.to_string());
        &self.view
    }

    /// Mark the job stopped on this client. Wins over any response that
    /// may still arrive.
    pub fn stop(&mut self) -> &JobView {
        if !self.view.outcome.is_terminal() {
            self.view.outcome = Outcome::Stopped;
        }
        &self.view
    }
}
