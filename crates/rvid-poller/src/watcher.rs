//! Cancellable polling loop.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use rvid_models::{JobId, JobStatusView, VisualizationSettings};
use rvid_render_client::{RenderClient, RenderError};

use crate::reconcile::{JobView, Reconciler};

/// Transport failure as seen by the poller.
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    #[error("job not found or expired")]
    NotFound,

    #[error("status fetch failed: {0}")]
    Upstream(String),
}

/// The network seam the watcher polls through.
#[async_trait]
pub trait StatusFeed: Send + Sync + 'static {
    async fn fetch_status(&self, job_id: &JobId) -> Result<JobStatusView, FeedError>;
}

#[async_trait]
impl StatusFeed for RenderClient {
    async fn fetch_status(&self, job_id: &JobId) -> Result<JobStatusView, FeedError> {
        self.job_status(job_id).await.map_err(|e| match e {
            RenderError::NotFound(_) => FeedError::NotFound,
            other => FeedError::Upstream(other.to_string()),
        })
    }
}

/// Poller configuration.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay between status fetches.
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

/// Timer-driven watcher for one job id.
///
/// One watcher owns one polling loop; spawning a second watcher for the
/// same job id is the caller's bug, not something this type multiplexes.
pub struct JobWatcher;

impl JobWatcher {
    /// Spawn the polling loop. The returned handle is the only way to
    /// observe or cancel it.
    pub fn spawn(
        feed: Arc<dyn StatusFeed>,
        job_id: JobId,
        local_settings: VisualizationSettings,
        config: PollerConfig,
    ) -> WatchHandle {
        let mut reconciler = Reconciler::new(job_id.clone(), local_settings);
        let (state_tx, state_rx) = watch::channel(reconciler.view().clone());
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        // A dropped handle counts as a stop.
                        if changed.is_err() || *shutdown_rx.borrow() {
                            let view = reconciler.stop().clone();
                            let _ = state_tx.send(view);
                            info!(job_id = %job_id, "Polling stopped by caller");
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        // A stop during the fetch aborts it; the
                        // response is never observed.
                        let result = tokio::select! {
                            changed = shutdown_rx.changed() => {
                                if changed.is_err() || *shutdown_rx.borrow() {
                                    let view = reconciler.stop().clone();
                                    let _ = state_tx.send(view);
                                    info!(job_id = %job_id, "Polling stopped mid-fetch");
                                    break;
                                }
                                continue;
                            }
                            result = feed.fetch_status(&job_id) => result,
                        };

                        let view = match result {
                            Ok(snapshot) => reconciler.observe(snapshot).clone(),
                            Err(e) => reconciler.observe_failure(&e).clone(),
                        };
                        let terminal = view.outcome.is_terminal();
                        let _ = state_tx.send(view);

                        if terminal {
                            debug!(job_id = %job_id, "Terminal state reached; polling halts");
                            break;
                        }
                    }
                }
            }
        });

        WatchHandle {
            shutdown: shutdown_tx,
            state: state_rx,
            task,
        }
    }
}

/// Handle to a running watcher.
pub struct WatchHandle {
    shutdown: watch::Sender<bool>,
    state: watch::Receiver<JobView>,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// Subscribe to view updates.
    pub fn subscribe(&self) -> watch::Receiver<JobView> {
        self.state.clone()
    }

    /// Snapshot of the current view.
    pub fn current(&self) -> JobView {
        self.state.borrow().clone()
    }

    /// Halt polling and mark the job stopped on this client. Idempotent;
    /// takes effect at the next suspension point, including mid-fetch.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Wait for the loop to exit.
    pub async fn join(self) {
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::Outcome;
    use rvid_models::ProgressStep;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Feed that replays a script, then panics if polled again.
    struct ScriptedFeed {
        script: Mutex<VecDeque<Result<JobStatusView, FeedError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedFeed {
        fn new(script: Vec<Result<JobStatusView, FeedError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusFeed for ScriptedFeed {
        async fn fetch_status(&self, _job_id: &JobId) -> Result<JobStatusView, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .expect("polled past end of script")
        }
    }

    /// Feed whose fetch never resolves.
    struct PendingFeed;

    #[async_trait]
    impl StatusFeed for PendingFeed {
        async fn fetch_status(&self, _job_id: &JobId) -> Result<JobStatusView, FeedError> {
            std::future::pending().await
        }
    }

    fn snapshot(step: u64) -> JobStatusView {
        JobStatusView {
            step: ProgressStep::from_number(step),
            video_url: None,
            error: None,
            repo_url: "https://github.com/acme/widgets".to_string(),
            settings: VisualizationSettings::default(),
        }
    }

    fn completed(step: u64) -> JobStatusView {
        let mut s = snapshot(step);
        s.video_url = Some("/videos/job-12345678.mp4".to_string());
        s
    }

    fn spawn(feed: Arc<dyn StatusFeed>) -> WatchHandle {
        JobWatcher::spawn(
            feed,
            JobId::from_string("job-12345678"),
            VisualizationSettings::default(),
            PollerConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_video_then_halts() {
        let feed = ScriptedFeed::new(vec![
            Ok(snapshot(1)),
            Ok(snapshot(2)),
            Ok(completed(3)),
        ]);
        let handle = spawn(feed.clone());

        handle.join().await;
        // The script would panic on a fourth call; reaching here means
        // polling stopped exactly at the terminal response.
        assert_eq!(feed.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_response_halts_polling() {
        let mut failed = snapshot(3);
        failed.error = Some("clone failed".to_string());
        let feed = ScriptedFeed::new(vec![Ok(snapshot(1)), Ok(failed)]);
        let handle = spawn(feed.clone());

        let mut rx = handle.subscribe();
        handle.join().await;
        assert_eq!(feed.calls(), 2);

        let view = rx.borrow_and_update().clone();
        assert_eq!(
            view.outcome,
            Outcome::Failed {
                error: "clone failed".to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_keeps_polling() {
        let feed = ScriptedFeed::new(vec![
            Ok(snapshot(1)),
            Err(FeedError::Upstream("connection reset".to_string())),
            Err(FeedError::NotFound),
            Ok(completed(3)),
        ]);
        let handle = spawn(feed.clone());
        let mut rx = handle.subscribe();

        handle.join().await;
        assert_eq!(feed.calls(), 4);

        let view = rx.borrow_and_update().clone();
        assert!(matches!(view.outcome, Outcome::Completed { .. }));
        assert!(view.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_poll_failure_is_terminal() {
        let feed = ScriptedFeed::new(vec![Err(FeedError::Upstream("refused".to_string()))]);
        let handle = spawn(feed.clone());

        let mut rx = handle.subscribe();
        handle.join().await;
        assert_eq!(feed.calls(), 1);
        assert!(matches!(
            rx.borrow_and_update().outcome,
            Outcome::Failed { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_in_flight_fetch() {
        let handle = spawn(Arc::new(PendingFeed));
        let mut rx = handle.subscribe();

        handle.stop();
        // The in-flight fetch never resolves; the stop must still land.
        loop {
            rx.changed().await.unwrap();
            if rx.borrow().outcome == Outcome::Stopped {
                break;
            }
        }
        handle.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let handle = spawn(Arc::new(PendingFeed));
        handle.stop();
        handle.stop();
        handle.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_views_are_monotonic_under_reordering() {
        let feed = ScriptedFeed::new(vec![
            Ok(snapshot(2)),
            Ok(snapshot(1)), // stale duplicate
            Ok(completed(3)),
        ]);
        let handle = spawn(feed.clone());
        let mut rx = handle.subscribe();

        let mut steps = Vec::new();
        loop {
            if rx.changed().await.is_err() {
                break;
            }
            let view = rx.borrow_and_update().clone();
            if let Some(step) = view.step {
                steps.push(step.as_number());
            }
            if view.outcome.is_terminal() {
                break;
            }
        }
        handle.join().await;

        // Never a regression, even though the transport reordered.
        assert!(steps.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(steps.last(), Some(&3));
    }
}
