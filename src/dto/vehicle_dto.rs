use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{PhotoStatus, ReconStage, Vehicle};
use crate::services::ledger::DetailingReview;
use crate::services::stage_engine::{self, WorkflowStatus};

// Vistas del listado de inventario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InventoryView {
    #[default]
    Active,
    NeedsAttention,
    LotReady,
    Sold,
    All,
}

impl InventoryView {
    pub fn matches(self, vehicle: &Vehicle) -> bool {
        let stage = vehicle.current_recon_status;
        match self {
            InventoryView::Active => !stage.is_terminal(),
            InventoryView::NeedsAttention => {
                !stage.is_terminal() && !stage_engine::pending_tasks(vehicle).is_empty()
            }
            InventoryView::LotReady => stage == ReconStage::LotReady,
            InventoryView::Sold => stage.is_sold(),
            InventoryView::All => true,
        }
    }
}

// Query del listado
#[derive(Debug, Deserialize, Default)]
pub struct ListVehiclesQuery {
    #[serde(default)]
    pub view: InventoryView,
    pub search: Option<String>,
}

// Request para iniciar/reanudar una etapa
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartStageRequest {
    pub stage: ReconStage,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

// Request para completar mecánica; el costo acepta número o texto
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteMechanicalRequest {
    #[serde(default)]
    pub mechanical_cost: Option<serde_json::Value>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl CompleteMechanicalRequest {
    /// Costo como texto crudo para el parser tolerante
    pub fn raw_cost(&self) -> Option<String> {
        match self.mechanical_cost.as_ref()? {
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }
}

// Request para completar detailing
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteDetailingRequest {
    #[validate(length(max = 100))]
    pub detailer: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub interior_quality: Option<u8>,
    #[validate(range(min = 1, max = 5))]
    pub exterior_quality: Option<u8>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<CompleteDetailingRequest> for DetailingReview {
    fn from(request: CompleteDetailingRequest) -> Self {
        DetailingReview {
            detailer: request.detailer,
            interior_quality: request.interior_quality,
            exterior_quality: request.exterior_quality,
            notes: request.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePhotoStatusRequest {
    pub photo_status: PhotoStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTitleInHouseRequest {
    pub title_in_house: bool,
}

#[derive(Debug, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct MarkSoldRequest {
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

// Response de vehículo con su estado de flujo derivado
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleResponse {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub workflow: WorkflowStatus,
}

impl VehicleResponse {
    pub fn from_vehicle(vehicle: Vehicle, now: DateTime<Utc>) -> Self {
        let workflow = stage_engine::workflow_status(&vehicle, now);
        Self { vehicle, workflow }
    }
}
