//! Pipeline de cambios
//!
//! Una sola tarea escucha los snapshots del store, recalcula el dashboard
//! completo (métricas + estado de flujo por vehículo) y lo publica en un
//! canal `watch`. No guarda otro estado: cada snapshot se procesa desde cero.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::models::analytics::ReconMetrics;
use crate::models::Vehicle;
use crate::repositories::VehicleStore;
use crate::services::analytics_service;
use crate::services::stage_engine::{self, WorkflowStatus};

/// Fila del tablero por vehículo
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleStatusRow {
    pub id: String,
    pub stock_number: String,
    pub vin: String,
    pub description: String,
    pub workflow: WorkflowStatus,
}

/// Dashboard recalculado en cada entrega del change feed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconDashboard {
    pub generated_at: DateTime<Utc>,
    pub metrics: ReconMetrics,
    pub vehicles: Vec<VehicleStatusRow>,
}

impl ReconDashboard {
    pub fn build(vehicles: &[Vehicle], now: DateTime<Utc>) -> Self {
        Self {
            generated_at: now,
            metrics: analytics_service::compute_metrics(vehicles, now),
            vehicles: vehicles
                .iter()
                .map(|vehicle| VehicleStatusRow {
                    id: vehicle.id.clone(),
                    stock_number: vehicle.stock_number.clone(),
                    vin: vehicle.vin.clone(),
                    description: vehicle.display_name(),
                    workflow: stage_engine::workflow_status(vehicle, now),
                })
                .collect(),
        }
    }
}

pub type DashboardReceiver = watch::Receiver<Arc<ReconDashboard>>;

/// Lanza la tarea del change feed
///
/// Devuelve el receptor del dashboard (inicialmente calculado sobre una
/// colección vacía) y el handle de la tarea.
pub fn spawn_change_feed(store: Arc<dyn VehicleStore>) -> (DashboardReceiver, JoinHandle<()>) {
    let (tx, rx) = watch::channel(Arc::new(ReconDashboard::build(&[], Utc::now())));
    // Suscribirse antes de la carga inicial para no perder cambios
    let snapshots = store.subscribe();
    let handle = tokio::spawn(run_change_feed(store, snapshots, tx));
    (rx, handle)
}

async fn run_change_feed(
    store: Arc<dyn VehicleStore>,
    mut snapshots: broadcast::Receiver<Arc<Vec<Vehicle>>>,
    tx: watch::Sender<Arc<ReconDashboard>>,
) {
    tracing::info!("📡 Change feed iniciado");
    reload_from_store(store.as_ref(), &tx).await;

    loop {
        match snapshots.recv().await {
            Ok(snapshot) => publish(&tx, &snapshot),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("⚠️ Change feed atrasado, {} snapshots omitidos", skipped);
                snapshots = snapshots.resubscribe();
                reload_from_store(store.as_ref(), &tx).await;
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!("🛑 Change feed cerrado");
                break;
            }
        }
    }
}

async fn reload_from_store(store: &dyn VehicleStore, tx: &watch::Sender<Arc<ReconDashboard>>) {
    match store.list_vehicles().await {
        Ok(vehicles) => publish(tx, &vehicles),
        // El último dashboard válido sigue visible
        Err(e) => tracing::error!("❌ Change feed no pudo leer el store: {}", e),
    }
}

fn publish(tx: &watch::Sender<Arc<ReconDashboard>>, vehicles: &[Vehicle]) {
    let dashboard = ReconDashboard::build(vehicles, Utc::now());
    tracing::debug!(
        "📊 Dashboard recalculado: {} vehículos",
        dashboard.metrics.total_vehicles
    );
    tx.send_replace(Arc::new(dashboard));
}
