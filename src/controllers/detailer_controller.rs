use std::sync::Arc;
use validator::Validate;

use crate::dto::common_dto::ApiResponse;
use crate::dto::import_dto::{CreateDetailerRequest, DetailersResponse};
use crate::repositories::VehicleStore;
use crate::utils::errors::{conflict_error, not_found_error, AppError};

pub struct DetailerController {
    store: Arc<dyn VehicleStore>,
}

impl DetailerController {
    pub fn new(store: Arc<dyn VehicleStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<DetailersResponse, AppError> {
        Ok(DetailersResponse {
            detailers: self.store.load_detailers().await?,
        })
    }

    pub async fn add(&self, request: CreateDetailerRequest) -> Result<ApiResponse<DetailersResponse>, AppError> {
        request.validate()?;
        let name = request.name.trim();
        if !self.store.add_detailer(name).await? {
            return Err(conflict_error("Detailer", "name", name));
        }
        tracing::info!("👤 Detailer agregado: {}", name);
        Ok(ApiResponse::success_with_message(
            self.list().await?,
            format!("Detailer '{}' added", name),
        ))
    }

    pub async fn remove(&self, name: &str) -> Result<ApiResponse<DetailersResponse>, AppError> {
        if !self.store.remove_detailer(name).await? {
            return Err(not_found_error("Detailer", name));
        }
        Ok(ApiResponse::success_with_message(
            self.list().await?,
            format!("Detailer '{}' removed", name),
        ))
    }
}
