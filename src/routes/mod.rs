pub mod detailer_routes;
pub mod import_routes;
pub mod vehicle_routes;

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::json;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::dto::common_dto::ApiResponse;
use crate::middleware::cors::cors_layer_for;
use crate::services::change_feed::ReconDashboard;
use crate::state::AppState;

/// Router completo de la API
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer_for(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/analytics", get(analytics_dashboard))
        .nest("/api/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/api/detailers", detailer_routes::create_detailer_router())
        .nest("/api", import_routes::create_import_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "recon_tracker",
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /api/analytics - último dashboard calculado por el change feed
async fn analytics_dashboard(State(state): State<AppState>) -> Json<ApiResponse<ReconDashboard>> {
    let dashboard = state.latest_dashboard();
    Json(ApiResponse::success(dashboard.as_ref().clone()))
}
