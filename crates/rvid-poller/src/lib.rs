//! Client-side job tracking.
//!
//! Converts the noisy, intermittently-failing remote status feed into
//! monotonic state: steps never regress, terminal outcomes are sticky,
//! and cancellation wins over anything still in flight.

pub mod reconcile;
pub mod settings;
pub mod watcher;

pub use reconcile::{JobView, Outcome, Reconciler};
pub use settings::SettingsSync;
pub use watcher::{FeedError, JobWatcher, PollerConfig, StatusFeed, WatchHandle};
