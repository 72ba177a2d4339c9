//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use reqwest::Client;
use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::VehicleStore;
use crate::services::change_feed::{DashboardReceiver, ReconDashboard};
use crate::services::{ImportService, SheetSyncService};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VehicleStore>,
    pub config: EnvironmentConfig,
    pub http_client: Client,
    pub dashboard: DashboardReceiver,
    /// None cuando no hay SHEET_CSV_URL configurada
    pub sheet_sync: Option<Arc<SheetSyncService>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn VehicleStore>,
        config: EnvironmentConfig,
        http_client: Client,
        dashboard: DashboardReceiver,
    ) -> Self {
        let sheet_sync = config.sheet_csv_url.clone().map(|url| {
            Arc::new(SheetSyncService::new(
                http_client.clone(),
                url,
                config.request_timeout(),
            ))
        });

        Self {
            store,
            config,
            http_client,
            dashboard,
            sheet_sync,
        }
    }

    pub fn import_service(&self) -> ImportService {
        ImportService::new(self.store.clone())
    }

    /// Último dashboard publicado por el change feed
    pub fn latest_dashboard(&self) -> Arc<ReconDashboard> {
        self.dashboard.borrow().clone()
    }
}
