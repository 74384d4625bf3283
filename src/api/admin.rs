//! Admin endpoints, guarded by the PSK layer.

use axum::extract::State;

use super::{success, ApiResult};
use crate::forum::SESSION_TTL;
use crate::models::{ActivityEntry, SweepResult};
use crate::AppState;

/// GET /api/admin/activity - Live identities, most recent first.
pub async fn list_activity(State(state): State<AppState>) -> ApiResult<Vec<ActivityEntry>> {
    let entries = state
        .activity
        .snapshot()
        .into_iter()
        .map(|(user_id, last_seen)| ActivityEntry { user_id, last_seen })
        .collect();
    success(entries)
}

/// POST /api/admin/activity/sweep - Run an activity sweep right away.
pub async fn sweep_activity(State(state): State<AppState>) -> ApiResult<SweepResult> {
    let evicted = state.activity.sweep(state.clock.now(), SESSION_TTL);
    tracing::info!("Manual activity sweep evicted {} identities", evicted);

    success(SweepResult {
        evicted,
        remaining: state.activity.len(),
    })
}
