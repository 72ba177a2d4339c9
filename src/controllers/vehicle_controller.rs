use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::dto::common_dto::ApiResponse;
use crate::dto::vehicle_dto::{
    CompleteDetailingRequest, CompleteMechanicalRequest, InventoryView, MarkSoldRequest,
    StartStageRequest, UpdatePhotoStatusRequest, UpdateTitleInHouseRequest, VehicleResponse,
};
use crate::models::Vehicle;
use crate::repositories::VehicleStore;
use crate::services::ledger::{self, DetailingReview, LedgerError, LedgerUpdate};
use crate::utils::errors::{not_found_error, AppError};

pub struct VehicleController {
    store: Arc<dyn VehicleStore>,
}

impl VehicleController {
    pub fn new(store: Arc<dyn VehicleStore>) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        view: InventoryView,
        search: Option<&str>,
    ) -> Result<Vec<VehicleResponse>, AppError> {
        let now = Utc::now();
        let term = search.unwrap_or_default();
        let vehicles = self
            .store
            .list_vehicles()
            .await?
            .into_iter()
            .filter(|vehicle| view.matches(vehicle) && vehicle.matches_search(term))
            .map(|vehicle| VehicleResponse::from_vehicle(vehicle, now))
            .collect();
        Ok(vehicles)
    }

    async fn load(&self, id: &str) -> Result<Vehicle, AppError> {
        self.store
            .get_vehicle(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<VehicleResponse, AppError> {
        let vehicle = self.load(id).await?;
        Ok(VehicleResponse::from_vehicle(vehicle, Utc::now()))
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if !self.store.delete_vehicle(id).await? {
            return Err(not_found_error("Vehicle", id));
        }
        tracing::info!("🗑️ Vehículo {} eliminado", id);
        Ok(())
    }

    /// Construye el diff con la operación dada y lo aplica en el store
    async fn apply<F>(
        &self,
        id: &str,
        message: &str,
        operation: F,
    ) -> Result<ApiResponse<VehicleResponse>, AppError>
    where
        F: FnOnce(&Vehicle, DateTime<Utc>) -> Result<LedgerUpdate, LedgerError>,
    {
        let vehicle = self.load(id).await?;
        let now = Utc::now();
        let update = operation(&vehicle, now)?;
        let updated = self.store.apply_update(id, &update).await?;
        Ok(ApiResponse::success_with_message(
            VehicleResponse::from_vehicle(updated, now),
            message,
        ))
    }

    pub async fn start_stage(
        &self,
        id: &str,
        request: StartStageRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        let message = format!("{} started", request.stage);
        self.apply(id, &message, |vehicle, now| {
            ledger::start_stage(vehicle, request.stage, request.notes.as_deref(), now)
        })
        .await
    }

    pub async fn complete_mechanical(
        &self,
        id: &str,
        request: CompleteMechanicalRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        let raw_cost = request.raw_cost();
        self.apply(id, "Mechanical completed", |vehicle, now| {
            ledger::complete_mechanical(vehicle, raw_cost.as_deref(), request.notes.as_deref(), now)
        })
        .await
    }

    pub async fn complete_detailing(
        &self,
        id: &str,
        request: CompleteDetailingRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        let review: DetailingReview = request.into();
        self.apply(id, "Detailing completed", |vehicle, now| {
            ledger::complete_detailing(vehicle, &review, now)
        })
        .await
    }

    pub async fn initial_recon_start(&self, id: &str) -> Result<ApiResponse<VehicleResponse>, AppError> {
        self.apply(id, "Service request sent; vehicle moved to Mechanical", ledger::initial_recon_start)
            .await
    }

    pub async fn update_photo_status(
        &self,
        id: &str,
        request: UpdatePhotoStatusRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        self.apply(id, "Photo status updated", |vehicle, now| {
            ledger::update_photo_status(vehicle, request.photo_status, now)
        })
        .await
    }

    pub async fn update_title_in_house(
        &self,
        id: &str,
        request: UpdateTitleInHouseRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        self.apply(id, "Title status updated", |vehicle, now| {
            ledger::update_title_in_house(vehicle, request.title_in_house, now)
        })
        .await
    }

    pub async fn mark_sold(
        &self,
        id: &str,
        request: MarkSoldRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        self.apply(id, "Vehicle marked as sold", |vehicle, now| {
            ledger::mark_sold(vehicle, request.notes.as_deref(), now)
        })
        .await
    }
}
