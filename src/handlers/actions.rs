use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::actions::{self, SequenceReport};
use crate::models::{ActionSummary, RunActionRequest};
use crate::AppState;

use super::ApiError;

/// List the available quick actions
pub async fn list_actions(State(state): State<Arc<AppState>>) -> Json<Vec<ActionSummary>> {
    let summaries = state
        .actions
        .list()
        .iter()
        .map(|a| ActionSummary {
            id: a.id.clone(),
            name: a.name.clone(),
            description: a.description.clone(),
            steps: a.step_count(),
        })
        .collect();
    Json(summaries)
}

/// Run a quick action against a device through the sequencer. Steps execute
/// strictly in order; a failed step is logged and the rest still run.
pub async fn run_action(
    State(state): State<Arc<AppState>>,
    Path(action_id): Path<String>,
    Json(req): Json<RunActionRequest>,
) -> Result<Json<SequenceReport>, ApiError> {
    let action = state
        .actions
        .get(&action_id)
        .ok_or_else(|| ApiError::not_found("action"))?;
    let device = state
        .registry
        .get_device(req.device_id)
        .await?
        .ok_or_else(|| ApiError::not_found("device"))?;

    let _deploy = state
        .begin_deploy()
        .ok_or_else(|| ApiError::conflict("a deployment is already in progress"))?;
    let dispatcher = &state.dispatcher;
    let device_ref = &device;
    let report = actions::execute(action, |template_id, params| async move {
        dispatcher.deploy(device_ref, &template_id, &params).await
    })
    .await;

    Ok(Json(report))
}
