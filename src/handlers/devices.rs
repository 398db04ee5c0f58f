use axum::{extract::State, Json};
use std::sync::Arc;

use crate::models::Device;
use crate::AppState;

use super::ApiError;

/// List all registered devices
pub async fn list_devices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Device>>, ApiError> {
    let devices = state.registry.list_devices().await?;
    Ok(Json(devices))
}
