use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::catalog::TemplateDefinition;
use crate::AppState;

use super::ApiError;

#[derive(Serialize)]
pub struct TemplateListResponse {
    pub categories: Vec<String>,
    pub templates: Vec<TemplateDefinition>,
}

/// Full template catalog: categories in first-seen order plus every
/// definition
pub async fn list_templates(State(state): State<Arc<AppState>>) -> Json<TemplateListResponse> {
    Json(TemplateListResponse {
        categories: state.catalog.categories(),
        templates: state.catalog.all().to_vec(),
    })
}

/// Single template definition by id
pub async fn get_template(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TemplateDefinition>, ApiError> {
    let template = state
        .catalog
        .get(&id)
        .ok_or_else(|| ApiError::not_found("template"))?;
    Ok(Json(template.clone()))
}
