//! Servicio de importación de inventario
//!
//! Mapea cada fila, descarta las que no tienen identidad y entrega el lote al
//! store, que fusiona cada registro con el documento vigente (sin truncar el
//! historial) dentro de su propio lock.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::repositories::{ImportBatch, ImportRecord, VehicleStore};
use crate::services::import_mapper::{self, NormalizedRow};
use crate::utils::errors::AppResult;

/// Resultado de una importación
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub source: String,
    pub processed: usize,
    pub created: usize,
    pub resynced: usize,
    pub skipped: usize,
    pub message: String,
}

#[derive(Clone)]
pub struct ImportService {
    store: Arc<dyn VehicleStore>,
}

impl ImportService {
    pub fn new(store: Arc<dyn VehicleStore>) -> Self {
        Self { store }
    }

    pub async fn process_rows(
        &self,
        rows: &[HashMap<String, String>],
        source: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ImportSummary> {
        tracing::info!("📥 Importando {} filas desde {}", rows.len(), source);

        let mut records = Vec::with_capacity(rows.len());
        let mut skipped = 0;

        for raw in rows {
            let row = NormalizedRow::from_raw(raw);
            let vehicle = import_mapper::map_normalized_row(&row, now);
            let Some(id) = vehicle.document_id() else {
                skipped += 1;
                continue;
            };
            records.push(ImportRecord {
                id,
                vehicle,
                original_status: row.original_recon_status().map(str::to_string),
            });
        }

        if records.is_empty() {
            tracing::warn!("⚠️ Sin filas válidas en {}", source);
            return Ok(ImportSummary {
                source: source.to_string(),
                processed: 0,
                created: 0,
                resynced: 0,
                skipped,
                message: format!("No valid vehicle data found in {}.", source),
            });
        }

        let written = self
            .store
            .import_batch(ImportBatch {
                source: source.to_string(),
                imported_at: now,
                records,
            })
            .await?;
        let (created, resynced) = (written.created, written.resynced);
        let processed = created + resynced;

        tracing::info!(
            "✅ Importación {}: {} nuevos, {} re-sincronizados, {} omitidos",
            source,
            created,
            resynced,
            skipped
        );

        Ok(ImportSummary {
            source: source.to_string(),
            processed,
            created,
            resynced,
            skipped,
            message: format!(
                "Processed {} vehicles from {} ({} new, {} re-synced, {} skipped).",
                processed, source, created, resynced, skipped
            ),
        })
    }
}
