//! Contrato del document store de vehículos
//!
//! Toda mutación publica la colección completa en el canal de snapshots; los
//! consumidores (change feed) recalculan sobre ese snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::models::Vehicle;
use crate::services::import_mapper;
use crate::services::ledger::LedgerUpdate;
use crate::utils::errors::AppResult;

/// Colección completa entregada tras cada cambio
pub type VehicleSnapshot = Arc<Vec<Vehicle>>;

/// Fila ya mapeada, pendiente de fusionar con el documento guardado
#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub id: String,
    pub vehicle: Vehicle,
    /// Texto original de la columna de estado, para la marca de re-sincronización
    pub original_status: Option<String>,
}

impl ImportRecord {
    /// Documento a escribir: el mapeado si es nuevo, o la fusión sobre el actual
    ///
    /// El store la llama con el documento releído bajo su lock, así que el
    /// historial y el estado de trabajo vienen siempre de la versión vigente.
    pub fn resolve(self, current: Option<&Vehicle>, source: &str, now: DateTime<Utc>) -> Vehicle {
        let mut vehicle = match current {
            Some(current) => import_mapper::merge_reimport(
                current,
                &self.vehicle,
                source,
                self.original_status.as_deref(),
                now,
            ),
            None => self.vehicle,
        };
        vehicle.id = self.id;
        vehicle
    }
}

/// Lote del importador con su origen
#[derive(Debug, Clone)]
pub struct ImportBatch {
    pub source: String,
    pub imported_at: DateTime<Utc>,
    pub records: Vec<ImportRecord>,
}

/// Conteo de una escritura de importación
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportWrite {
    pub created: usize,
    pub resynced: usize,
}

impl ImportWrite {
    pub fn record(&mut self, existed: bool) {
        if existed {
            self.resynced += 1;
        } else {
            self.created += 1;
        }
    }
}

/// Capacidad del canal de snapshots; los receptores lentos saltan al último
pub const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>>;

    async fn get_vehicle(&self, id: &str) -> AppResult<Option<Vehicle>>;

    /// Escritura en lote del importador
    ///
    /// Cada registro se fusiona con el documento vigente bajo el mismo lock que
    /// usa `apply_update`; una fila repetida en el lote se fusiona sobre la
    /// anterior.
    async fn import_batch(&self, batch: ImportBatch) -> AppResult<ImportWrite>;

    /// Agrega la entrada y aplica los campos de forma atómica
    async fn apply_update(&self, id: &str, update: &LedgerUpdate) -> AppResult<Vehicle>;

    /// Borrado irreversible; false si no existía
    async fn delete_vehicle(&self, id: &str) -> AppResult<bool>;

    async fn load_detailers(&self) -> AppResult<Vec<String>>;

    async fn add_detailer(&self, name: &str) -> AppResult<bool>;

    async fn remove_detailer(&self, name: &str) -> AppResult<bool>;

    fn subscribe(&self) -> broadcast::Receiver<VehicleSnapshot>;
}
