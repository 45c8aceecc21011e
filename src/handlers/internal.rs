use axum::{extract::State, http::StatusCode};

use crate::dispatch::CycleOutcome;
use crate::error::AppResult;
use crate::AppState;

/// Run one dispatch cycle. Polled at a fixed interval by an external driver.
///
/// Answers 204 whether or not anything was matched, and also when the
/// trigger was dropped because a cycle is already running.
pub async fn trigger_matching(State(state): State<AppState>) -> AppResult<StatusCode> {
    if let CycleOutcome::Skipped = state.dispatcher.trigger().await? {
        tracing::debug!("Matching trigger dropped, cycle in progress");
    }

    Ok(StatusCode::NO_CONTENT)
}
