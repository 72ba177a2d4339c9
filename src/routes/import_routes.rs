use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::controllers::import_controller::ImportController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::import_dto::{ImportStatusResponse, SheetSyncQuery};
use crate::services::import_service::ImportSummary;
use crate::services::sheet_sync_service::SheetSyncOutcome;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas de importación y exportación, montadas bajo /api
pub fn create_import_router() -> Router<AppState> {
    Router::new()
        .route("/import/status", get(import_status))
        .route("/import/csv", post(import_csv))
        .route("/import/sheet-sync", post(sync_sheet))
        .route("/export/csv", get(export_csv))
}

fn controller(state: &AppState) -> ImportController {
    ImportController::new(
        state.store.clone(),
        state.config.clone(),
        state.sheet_sync.clone(),
    )
}

async fn import_status(State(state): State<AppState>) -> Json<ApiResponse<ImportStatusResponse>> {
    Json(ApiResponse::success(controller(&state).status()))
}

async fn import_csv(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ApiResponse<ImportSummary>>, AppError> {
    let response = controller(&state).import_csv(&body).await?;
    Ok(Json(response))
}

async fn sync_sheet(
    State(state): State<AppState>,
    Query(query): Query<SheetSyncQuery>,
) -> Result<Json<ApiResponse<SheetSyncOutcome>>, AppError> {
    let response = controller(&state).sync_sheet(query.force).await?;
    Ok(Json(response))
}

async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let csv_text = controller(&state).export_csv().await?;
    let filename = format!(
        "attachment; filename=\"recon_export_{}.csv\"",
        chrono::Utc::now().format("%Y%m%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        csv_text,
    ))
}
