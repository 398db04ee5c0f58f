use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::models::{ResourceItem, ResourceKind};
use crate::AppState;

use super::ApiError;

/// Fetch one resource collection straight from a device, bypassing the
/// selection-scoped cache
pub async fn get_device_resources(
    State(state): State<Arc<AppState>>,
    Path((device_id, kind)): Path<(i64, String)>,
) -> Result<Json<Vec<ResourceItem>>, ApiError> {
    let kind = ResourceKind::parse(&kind)
        .ok_or_else(|| ApiError::bad_request("kind must be one of: interfaces, bridges, vlans"))?;

    let device = state
        .registry
        .get_device(device_id)
        .await?
        .ok_or_else(|| ApiError::not_found("device"))?;

    let items = state
        .api
        .fetch_resources(&device, kind)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(items))
}
