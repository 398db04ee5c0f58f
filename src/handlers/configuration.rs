use axum::{extract::State, Json};
use std::sync::Arc;

use crate::dispatch::DispatchOutcome;
use crate::models::{DeployRequest, DeployResponse};
use crate::AppState;

use super::ApiError;

/// Deploy one template instantiation to a device.
///
/// Binder validation runs first: a missing required field is a 400 and never
/// reaches the execution log. While a deploy or action sequence is running,
/// a second submission gets a 409 instead of overlapping it.
pub async fn deploy_configuration(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeployRequest>,
) -> Result<Json<DeployResponse>, ApiError> {
    let device = state
        .registry
        .get_device(req.device_id)
        .await?
        .ok_or_else(|| ApiError::not_found("device"))?;

    let _deploy = state
        .begin_deploy()
        .ok_or_else(|| ApiError::conflict("a deployment is already in progress"))?;
    let result = state
        .dispatcher
        .submit(&device, &req.template_name, req.params)
        .await;

    let outcome = result.map_err(|e| ApiError::bad_request(e.to_string()))?;
    match outcome {
        DispatchOutcome::Success { message } => Ok(Json(DeployResponse {
            status: "Success".to_string(),
            message,
        })),
        DispatchOutcome::Failure { detail } => Err(ApiError::internal(format!(
            "Configuration failed: {}",
            detail
        ))),
    }
}
