use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use validator::Validate;

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::common_dto::ApiResponse;
use crate::dto::vehicle_dto::{
    CompleteDetailingRequest, CompleteMechanicalRequest, ListVehiclesQuery, MarkSoldRequest,
    StartStageRequest, UpdatePhotoStatusRequest, UpdateTitleInHouseRequest, VehicleResponse,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles))
        .route("/:id", get(get_vehicle).delete(delete_vehicle))
        .route("/:id/stages/start", post(start_stage))
        .route("/:id/stages/mechanical/complete", post(complete_mechanical))
        .route("/:id/stages/detailing/complete", post(complete_detailing))
        .route("/:id/recon/start", post(initial_recon_start))
        .route("/:id/photo-status", put(update_photo_status))
        .route("/:id/title-in-house", put(update_title_in_house))
        .route("/:id/sold", post(mark_sold))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(query): Query<ListVehiclesQuery>,
) -> Result<Json<ApiResponse<Vec<VehicleResponse>>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let vehicles = controller.list(query.view, query.search.as_deref()).await?;
    Ok(Json(ApiResponse::success(vehicles)))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.get_by_id(&id).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    controller.delete(&id).await?;
    Ok(Json(ApiResponse::message_only(format!(
        "Vehicle {} deleted permanently",
        id
    ))))
}

async fn start_stage(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StartStageRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    request.validate()?;
    let controller = VehicleController::new(state.store.clone());
    let response = controller.start_stage(&id, request).await?;
    Ok(Json(response))
}

async fn complete_mechanical(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CompleteMechanicalRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    request.validate()?;
    let controller = VehicleController::new(state.store.clone());
    let response = controller.complete_mechanical(&id, request).await?;
    Ok(Json(response))
}

async fn complete_detailing(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CompleteDetailingRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    request.validate()?;
    let controller = VehicleController::new(state.store.clone());
    let response = controller.complete_detailing(&id, request).await?;
    Ok(Json(response))
}

// Solicitud de servicio: mueve un vehículo recién llegado a Mechanical
async fn initial_recon_start(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.initial_recon_start(&id).await?;
    Ok(Json(response))
}

async fn update_photo_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePhotoStatusRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.update_photo_status(&id, request).await?;
    Ok(Json(response))
}

async fn update_title_in_house(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTitleInHouseRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.store.clone());
    let response = controller.update_title_in_house(&id, request).await?;
    Ok(Json(response))
}

async fn mark_sold(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Option<Json<MarkSoldRequest>>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let request = request.map(|Json(body)| body).unwrap_or_default();
    request.validate()?;
    let controller = VehicleController::new(state.store.clone());
    let response = controller.mark_sold(&id, request).await?;
    Ok(Json(response))
}
