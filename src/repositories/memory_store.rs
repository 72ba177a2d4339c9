//! Store en memoria
//!
//! Se usa cuando no hay DATABASE_URL y en los tests de integración.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use super::vehicle_store::{
    ImportBatch, ImportWrite, VehicleSnapshot, VehicleStore, SNAPSHOT_CHANNEL_CAPACITY,
};
use crate::models::settings::ReconSettings;
use crate::models::Vehicle;
use crate::services::ledger::LedgerUpdate;
use crate::utils::errors::{not_found_error, AppResult};

pub struct MemoryVehicleStore {
    vehicles: RwLock<BTreeMap<String, Vehicle>>,
    settings: RwLock<ReconSettings>,
    snapshots: broadcast::Sender<VehicleSnapshot>,
}

impl Default for MemoryVehicleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryVehicleStore {
    pub fn new() -> Self {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            vehicles: RwLock::new(BTreeMap::new()),
            settings: RwLock::new(ReconSettings::default()),
            snapshots,
        }
    }

    fn publish(&self, vehicles: &BTreeMap<String, Vehicle>) {
        let snapshot: VehicleSnapshot = Arc::new(vehicles.values().cloned().collect());
        // Sin suscriptores el envío falla y no importa
        let _ = self.snapshots.send(snapshot);
    }
}

#[async_trait]
impl VehicleStore for MemoryVehicleStore {
    async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        Ok(self.vehicles.read().await.values().cloned().collect())
    }

    async fn get_vehicle(&self, id: &str) -> AppResult<Option<Vehicle>> {
        Ok(self.vehicles.read().await.get(id).cloned())
    }

    async fn import_batch(&self, batch: ImportBatch) -> AppResult<ImportWrite> {
        let mut guard = self.vehicles.write().await;
        let mut written = ImportWrite::default();
        for record in batch.records {
            let id = record.id.clone();
            let current = guard.get(&id);
            written.record(current.is_some());
            let vehicle = record.resolve(current, &batch.source, batch.imported_at);
            guard.insert(id, vehicle);
        }
        self.publish(&guard);
        Ok(written)
    }

    async fn apply_update(&self, id: &str, update: &LedgerUpdate) -> AppResult<Vehicle> {
        let mut guard = self.vehicles.write().await;
        let vehicle = guard
            .get_mut(id)
            .ok_or_else(|| not_found_error("Vehicle", id))?;
        update.apply_in_place(vehicle);
        let updated = vehicle.clone();
        self.publish(&guard);
        Ok(updated)
    }

    async fn delete_vehicle(&self, id: &str) -> AppResult<bool> {
        let mut guard = self.vehicles.write().await;
        let removed = guard.remove(id).is_some();
        if removed {
            self.publish(&guard);
        }
        Ok(removed)
    }

    async fn load_detailers(&self) -> AppResult<Vec<String>> {
        Ok(self.settings.read().await.detailers.clone())
    }

    async fn add_detailer(&self, name: &str) -> AppResult<bool> {
        Ok(self.settings.write().await.add_detailer(name))
    }

    async fn remove_detailer(&self, name: &str) -> AppResult<bool> {
        Ok(self.settings.write().await.remove_detailer(name))
    }

    fn subscribe(&self) -> broadcast::Receiver<VehicleSnapshot> {
        self.snapshots.subscribe()
    }
}
