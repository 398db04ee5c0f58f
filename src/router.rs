use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>, frontend_dir: &str) -> Router {
    Router::new()
        // Device routes
        .route("/api/devices", get(handlers::devices::list_devices))
        // Session / resource inventory routes
        .route("/api/session/device", post(handlers::session::select_device))
        .route("/api/session/resources", get(handlers::session::get_session_resources))
        .route(
            "/api/resources/:device_id/:kind",
            get(handlers::resources::get_device_resources),
        )
        // Template catalog routes
        .route("/api/templates", get(handlers::templates::list_templates))
        .route("/api/templates/:id", get(handlers::templates::get_template))
        // Configuration deployment
        .route("/api/config/deploy", post(handlers::configuration::deploy_configuration))
        // Quick actions
        .route("/api/actions", get(handlers::actions::list_actions))
        .route("/api/actions/:id/run", post(handlers::actions::run_action))
        // Guided setup
        .route("/api/quick-setup", post(handlers::quick_setup::quick_setup))
        // Execution log
        .route("/api/logs", get(handlers::logs::list_logs))
        .route("/api/logs/rollback", post(handlers::logs::mark_rollback))
        .route("/api/logs", delete(handlers::logs::clear_logs))
        // Health
        .route("/api/health", get(handlers::healthcheck))
        // Static files (frontend)
        .fallback_service(ServeDir::new(frontend_dir).fallback(
            tower_http::services::ServeFile::new(format!("{}/index.html", frontend_dir)),
        ))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
