//! Store de vehículos sobre PostgreSQL
//!
//! Cada vehículo es un documento JSONB en `recon_vehicles`; la configuración
//! (detailers) vive en `recon_settings`. Las actualizaciones por documento se
//! serializan con `SELECT ... FOR UPDATE` dentro de una transacción.

use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::broadcast;

use super::vehicle_store::{
    ImportBatch, ImportWrite, VehicleSnapshot, VehicleStore, SNAPSHOT_CHANNEL_CAPACITY,
};
use crate::models::settings::{ReconSettings, SETTINGS_DOC_ID};
use crate::models::Vehicle;
use crate::services::ledger::LedgerUpdate;
use crate::utils::errors::{not_found_error, AppResult};

pub struct PgVehicleStore {
    pool: PgPool,
    snapshots: broadcast::Sender<VehicleSnapshot>,
}

impl PgVehicleStore {
    pub fn new(pool: PgPool) -> Self {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self { pool, snapshots }
    }

    /// Crea las tablas si no existen
    pub async fn ensure_schema(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recon_vehicles (
                id TEXT PRIMARY KEY,
                document JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recon_settings (
                id TEXT PRIMARY KEY,
                detailers JSONB NOT NULL DEFAULT '[]'::jsonb
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("✅ Esquema de reacondicionamiento verificado");
        Ok(())
    }

    /// Relee la colección y la publica a los suscriptores
    async fn publish(&self) {
        match self.list_vehicles().await {
            Ok(vehicles) => {
                let _ = self.snapshots.send(Arc::new(vehicles));
            }
            Err(e) => tracing::warn!("⚠️ No se pudo publicar el snapshot: {}", e),
        }
    }

    /// Lee el documento bloqueando la fila hasta el commit
    async fn lock_document(
        tx: &mut Transaction<'_, Postgres>,
        id: &str,
    ) -> AppResult<Option<Vehicle>> {
        let row: Option<(Json<Vehicle>,)> =
            sqlx::query_as("SELECT document FROM recon_vehicles WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;
        Ok(row.map(|(document,)| document.0))
    }

    async fn write_document(
        tx: &mut Transaction<'_, Postgres>,
        id: &str,
        vehicle: &Vehicle,
    ) -> AppResult<()> {
        sqlx::query("UPDATE recon_vehicles SET document = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(Json(vehicle))
            .bind(Utc::now())
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn update_settings<F>(&self, mutate: F) -> AppResult<bool>
    where
        F: FnOnce(&mut ReconSettings) -> bool + Send,
    {
        let mut tx = self.pool.begin().await?;

        let current: Option<(Json<Vec<String>>,)> =
            sqlx::query_as("SELECT detailers FROM recon_settings WHERE id = $1 FOR UPDATE")
                .bind(SETTINGS_DOC_ID)
                .fetch_optional(&mut *tx)
                .await?;

        let mut settings = ReconSettings {
            detailers: current.map(|(detailers,)| detailers.0).unwrap_or_default(),
        };
        let changed = mutate(&mut settings);

        if changed {
            sqlx::query(
                r#"
                INSERT INTO recon_settings (id, detailers) VALUES ($1, $2)
                ON CONFLICT (id) DO UPDATE SET detailers = EXCLUDED.detailers
                "#,
            )
            .bind(SETTINGS_DOC_ID)
            .bind(Json(&settings.detailers))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(changed)
    }
}

#[async_trait]
impl VehicleStore for PgVehicleStore {
    async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        let vehicles: Vec<Vehicle> = sqlx::query_as::<_, (Json<Vehicle>,)>(
            "SELECT document FROM recon_vehicles ORDER BY id",
        )
        .fetch(&self.pool)
        .map_ok(|(document,)| document.0)
        .try_collect()
        .await?;
        Ok(vehicles)
    }

    async fn get_vehicle(&self, id: &str) -> AppResult<Option<Vehicle>> {
        let row = sqlx::query_as::<_, (Json<Vehicle>,)>(
            "SELECT document FROM recon_vehicles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(document,)| document.0))
    }

    async fn import_batch(&self, batch: ImportBatch) -> AppResult<ImportWrite> {
        let mut tx = self.pool.begin().await?;
        let mut written = ImportWrite::default();

        for record in batch.records {
            let id = record.id.clone();

            if let Some(current) = Self::lock_document(&mut tx, &id).await? {
                let merged = record.resolve(Some(&current), &batch.source, batch.imported_at);
                Self::write_document(&mut tx, &id, &merged).await?;
                written.record(true);
                continue;
            }

            // La fila no existe todavía: insertar sin pisar una importación concurrente
            let fresh = record.clone().resolve(None, &batch.source, batch.imported_at);
            let inserted = sqlx::query(
                r#"
                INSERT INTO recon_vehicles (id, document, updated_at) VALUES ($1, $2, $3)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(&id)
            .bind(Json(&fresh))
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if inserted > 0 {
                written.record(false);
                continue;
            }

            let current = Self::lock_document(&mut tx, &id)
                .await?
                .ok_or_else(|| not_found_error("Vehicle", &id))?;
            let merged = record.resolve(Some(&current), &batch.source, batch.imported_at);
            Self::write_document(&mut tx, &id, &merged).await?;
            written.record(true);
        }

        tx.commit().await?;
        tracing::info!(
            "💾 Lote importado: {} nuevos, {} re-sincronizados",
            written.created,
            written.resynced
        );
        self.publish().await;
        Ok(written)
    }

    async fn apply_update(&self, id: &str, update: &LedgerUpdate) -> AppResult<Vehicle> {
        let mut tx = self.pool.begin().await?;

        let mut vehicle = Self::lock_document(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))?;

        update.apply_in_place(&mut vehicle);
        Self::write_document(&mut tx, id, &vehicle).await?;

        tx.commit().await?;
        self.publish().await;
        Ok(vehicle)
    }

    async fn delete_vehicle(&self, id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM recon_vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let removed = result.rows_affected() > 0;
        if removed {
            self.publish().await;
        }
        Ok(removed)
    }

    async fn load_detailers(&self) -> AppResult<Vec<String>> {
        let row: Option<(Json<Vec<String>>,)> =
            sqlx::query_as("SELECT detailers FROM recon_settings WHERE id = $1")
                .bind(SETTINGS_DOC_ID)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(detailers,)| detailers.0).unwrap_or_default())
    }

    async fn add_detailer(&self, name: &str) -> AppResult<bool> {
        let name = name.to_string();
        self.update_settings(move |settings| settings.add_detailer(&name))
            .await
    }

    async fn remove_detailer(&self, name: &str) -> AppResult<bool> {
        let name = name.to_string();
        self.update_settings(move |settings| settings.remove_detailer(&name))
            .await
    }

    fn subscribe(&self) -> broadcast::Receiver<VehicleSnapshot> {
        self.snapshots.subscribe()
    }
}
