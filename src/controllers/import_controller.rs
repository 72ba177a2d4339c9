use chrono::Utc;
use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::dto::common_dto::ApiResponse;
use crate::dto::import_dto::ImportStatusResponse;
use crate::repositories::VehicleStore;
use crate::services::csv_service;
use crate::services::import_service::{ImportService, ImportSummary};
use crate::services::sheet_sync_service::{SheetSyncOutcome, SheetSyncService};
use crate::utils::errors::AppError;

pub const CSV_UPLOAD_SOURCE: &str = "CSV upload";

pub struct ImportController {
    store: Arc<dyn VehicleStore>,
    config: EnvironmentConfig,
    sheet_sync: Option<Arc<SheetSyncService>>,
}

impl ImportController {
    pub fn new(
        store: Arc<dyn VehicleStore>,
        config: EnvironmentConfig,
        sheet_sync: Option<Arc<SheetSyncService>>,
    ) -> Self {
        Self {
            store,
            config,
            sheet_sync,
        }
    }

    fn ensure_csv_enabled(&self) -> Result<(), AppError> {
        if !self.config.csv_features_enabled {
            return Err(AppError::ServiceUnavailable(
                "CSV import/export is disabled (CSV_FEATURES_ENABLED=false)".to_string(),
            ));
        }
        Ok(())
    }

    pub fn status(&self) -> ImportStatusResponse {
        let enabled = self.config.csv_features_enabled;
        let sheet_configured = self.sheet_sync.is_some();
        let diagnostic = match (enabled, sheet_configured) {
            (false, _) => Some("CSV features are disabled by configuration.".to_string()),
            (true, false) => Some("SHEET_CSV_URL is not configured; sheet sync unavailable.".to_string()),
            (true, true) => None,
        };

        ImportStatusResponse {
            csv_import_enabled: enabled,
            sheet_sync_enabled: enabled && sheet_configured,
            csv_export_enabled: enabled,
            diagnostic,
        }
    }

    pub async fn import_csv(&self, body: &str) -> Result<ApiResponse<ImportSummary>, AppError> {
        self.ensure_csv_enabled()?;
        let rows = csv_service::parse_rows(body)?;
        let summary = ImportService::new(self.store.clone())
            .process_rows(&rows, CSV_UPLOAD_SOURCE, Utc::now())
            .await?;
        let message = summary.message.clone();
        Ok(ApiResponse::success_with_message(summary, message))
    }

    pub async fn sync_sheet(&self, force: bool) -> Result<ApiResponse<SheetSyncOutcome>, AppError> {
        self.ensure_csv_enabled()?;
        let sheet_sync = self.sheet_sync.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("SHEET_CSV_URL is not configured".to_string())
        })?;

        let outcome = sheet_sync
            .sync(&ImportService::new(self.store.clone()), force)
            .await?;
        let message = match &outcome.summary {
            Some(summary) => summary.message.clone(),
            None => "Sheet unchanged since last sync.".to_string(),
        };
        Ok(ApiResponse::success_with_message(outcome, message))
    }

    pub async fn export_csv(&self) -> Result<String, AppError> {
        self.ensure_csv_enabled()?;
        let vehicles = self.store.list_vehicles().await?;
        let csv_text = csv_service::export_csv(&vehicles)?;
        tracing::info!("📤 Exportados {} vehículos a CSV", vehicles.len());
        Ok(csv_text)
    }
}
