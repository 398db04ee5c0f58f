use axum::{extract::State, Json};
use std::sync::Arc;

use crate::models::{ResourceStateResponse, SelectDeviceRequest};
use crate::AppState;

use super::{ApiError, MessageResponse};

/// Select (or clear) the active device. Selecting invalidates the resource
/// snapshot and kicks off the three inventory fetches.
pub async fn select_device(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectDeviceRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    match req.device_id {
        Some(id) => {
            if state.registry.get_device(id).await?.is_none() {
                return Err(ApiError::not_found("device"));
            }
            state.cache.select(id).await?;
            Ok(MessageResponse::new(format!("device {} selected", id)))
        }
        None => {
            state.cache.select_none();
            Ok(MessageResponse::new("selection cleared"))
        }
    }
}

/// Resource inventory for the active selection, with the aggregate loading
/// flag the frontend uses to disable source-bound selects
pub async fn get_session_resources(
    State(state): State<Arc<AppState>>,
) -> Json<ResourceStateResponse> {
    Json(ResourceStateResponse {
        loading: state.cache.is_loading(),
        snapshot: state.cache.snapshot(),
    })
}
