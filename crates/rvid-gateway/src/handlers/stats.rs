//! Display statistics.

use axum::extract::State;
use tracing::warn;

use crate::state::AppState;

/// GET /api/stats/count
///
/// Plain-text count of jobs ever started. Display-only and eventually
/// consistent; a store outage degrades to "0" rather than an error.
pub async fn generation_count(State(state): State<AppState>) -> String {
    match state.counter.current().await {
        Ok(count) => count.to_string(),
        Err(e) => {
            warn!("Failed to read generation count: {}", e);
            "0".to_string()
        }
    }
}
