use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::execlog::LogEntry;
use crate::models::RollbackRequest;
use crate::AppState;

/// Execution log, newest entry first
pub async fn list_logs(State(state): State<Arc<AppState>>) -> Json<Vec<LogEntry>> {
    Json(state.log.entries())
}

/// Append an operator-asserted rollback marker; no dispatch occurs
pub async fn mark_rollback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RollbackRequest>,
) -> Json<LogEntry> {
    let entry = state.log.mark_rollback(req.note.as_deref());
    Json(entry)
}

/// Clear the whole log. Individual entries can never be removed.
pub async fn clear_logs(State(state): State<Arc<AppState>>) -> StatusCode {
    state.log.clear();
    StatusCode::NO_CONTENT
}
