use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};

use crate::controllers::detailer_controller::DetailerController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::import_dto::{CreateDetailerRequest, DetailersResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_detailer_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_detailers).post(add_detailer))
        .route("/:name", delete(remove_detailer))
}

async fn list_detailers(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DetailersResponse>>, AppError> {
    let controller = DetailerController::new(state.store.clone());
    Ok(Json(ApiResponse::success(controller.list().await?)))
}

async fn add_detailer(
    State(state): State<AppState>,
    Json(request): Json<CreateDetailerRequest>,
) -> Result<Json<ApiResponse<DetailersResponse>>, AppError> {
    let controller = DetailerController::new(state.store.clone());
    Ok(Json(controller.add(request).await?))
}

async fn remove_detailer(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<DetailersResponse>>, AppError> {
    let controller = DetailerController::new(state.store.clone());
    Ok(Json(controller.remove(&name).await?))
}
