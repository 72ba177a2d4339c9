//! Operaciones del historial de estados
//!
//! Cada acción del usuario se traduce en una entrada nueva del historial
//! (opcional) más un conjunto de cambios de campos. Las funciones son puras:
//! reciben el vehículo actual y el instante `now`, y devuelven el diff que el
//! store aplica de forma atómica.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{EventKind, HistoryEntry, PhotoStatus, QualityReview, ReconStage, Vehicle};
use crate::services::stage_engine;
use crate::utils::validation::{parse_cost_lenient, validate_quality_score, QUALITY_SCORE_MAX, QUALITY_SCORE_MIN};

/// Errores de las operaciones del historial
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(String),

    #[error("Cannot move vehicle from {from} to {to}: {reason}")]
    InvalidTransition {
        from: ReconStage,
        to: ReconStage,
        reason: String,
    },

    #[error("Vehicle has been sold; workflow actions are closed")]
    VehicleSold,
}

/// Cambios de campos a aplicar sobre el documento del vehículo
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleFieldUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_recon_status: Option<ReconStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_status: Option<PhotoStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_in_house: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub total_recon_cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recon_complete_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retail_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_review: Option<QualityReview>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl VehicleFieldUpdates {
    fn apply(&self, vehicle: &mut Vehicle) {
        if let Some(status) = self.current_recon_status {
            vehicle.current_recon_status = status;
        }
        if let Some(photo_status) = self.photo_status {
            vehicle.photo_status = photo_status;
        }
        if let Some(photo_date) = self.photo_date {
            vehicle.photo_date = Some(photo_date);
        }
        if let Some(title) = self.title_in_house {
            vehicle.title_in_house = title;
        }
        if let Some(cost) = self.total_recon_cost {
            vehicle.total_recon_cost = cost;
        }
        if let Some(date) = self.recon_complete_date {
            vehicle.recon_complete_date = Some(date);
        }
        if let Some(date) = self.retail_date {
            vehicle.retail_date = Some(date);
        }
        if let Some(review) = &self.quality_review {
            vehicle.quality_review = review.clone();
        }
        if let Some(stamp) = self.last_updated {
            vehicle.last_updated = Some(stamp);
        }
    }
}

/// Diff producido por una operación: entrada nueva + cambios de campos
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_history_entry: Option<HistoryEntry>,
    #[serde(default)]
    pub field_updates: VehicleFieldUpdates,
}

impl LedgerUpdate {
    /// Vista fusionada del vehículo tras aplicar el diff
    pub fn apply_to(&self, vehicle: &Vehicle) -> Vehicle {
        let mut merged = vehicle.clone();
        self.apply_in_place(&mut merged);
        merged
    }

    /// Aplica el diff sobre un documento ya cargado (usado por los stores)
    pub fn apply_in_place(&self, vehicle: &mut Vehicle) {
        if let Some(entry) = &self.new_history_entry {
            vehicle.status_history.push(entry.clone());
        }
        self.field_updates.apply(vehicle);
    }
}

/// Datos de la revisión de calidad al completar detailing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailingReview {
    pub detailer: Option<String>,
    pub interior_quality: Option<u8>,
    pub exterior_quality: Option<u8>,
    pub notes: Option<String>,
}

fn compose_notes(prefix: &str, notes: Option<&str>) -> String {
    match notes.map(str::trim).filter(|n| !n.is_empty()) {
        Some(extra) => format!("{} {}", prefix, extra),
        None => prefix.to_string(),
    }
}

fn ensure_not_sold(vehicle: &Vehicle) -> Result<(), LedgerError> {
    if vehicle.current_recon_status.is_sold() {
        return Err(LedgerError::VehicleSold);
    }
    Ok(())
}

fn base_fields(now: DateTime<Utc>) -> VehicleFieldUpdates {
    VehicleFieldUpdates {
        last_updated: Some(now),
        ..Default::default()
    }
}

/// Recalcula la etapa canónica sobre la vista hipotética post-update
///
/// Estampa `reconCompleteDate` solo la primera vez que se llega a Lot Ready.
fn finish_with_recomputed_status(
    vehicle: &Vehicle,
    entry: Option<HistoryEntry>,
    mut fields: VehicleFieldUpdates,
    now: DateTime<Utc>,
) -> LedgerUpdate {
    let hypothetical = LedgerUpdate {
        new_history_entry: entry.clone(),
        field_updates: fields.clone(),
    }
    .apply_to(vehicle);

    let next = stage_engine::determine_next_canonical_stage(&hypothetical);
    fields.current_recon_status = Some(next);
    if next == ReconStage::LotReady && vehicle.recon_complete_date.is_none() {
        fields.recon_complete_date = Some(now);
    }

    if next != vehicle.current_recon_status {
        tracing::info!(
            "🔄 Vehículo {}: {} -> {}",
            vehicle.id,
            vehicle.current_recon_status,
            next
        );
    }

    LedgerUpdate {
        new_history_entry: entry,
        field_updates: fields,
    }
}

/// Iniciar o reanudar una etapa de trabajo
pub fn start_stage(
    vehicle: &Vehicle,
    stage: ReconStage,
    notes: Option<&str>,
    now: DateTime<Utc>,
) -> Result<LedgerUpdate, LedgerError> {
    ensure_not_sold(vehicle)?;
    if !stage.is_startable() {
        return Err(LedgerError::InvalidTransition {
            from: vehicle.current_recon_status,
            to: stage,
            reason: format!("{} cannot be started manually", stage),
        });
    }

    let entry = HistoryEntry::new(stage, now, compose_notes(&format!("{} Started.", stage), notes))
        .with_kind(EventKind::Started)
        .with_previous_status(vehicle.current_recon_status);

    let mut fields = base_fields(now);
    fields.current_recon_status = Some(stage);

    Ok(LedgerUpdate {
        new_history_entry: Some(entry),
        field_updates: fields,
    })
}

/// Completar mecánica registrando su costo
///
/// El costo es tolerante: vacío, ilegible o negativo cuenta como 0.
pub fn complete_mechanical(
    vehicle: &Vehicle,
    raw_cost: Option<&str>,
    notes: Option<&str>,
    now: DateTime<Utc>,
) -> Result<LedgerUpdate, LedgerError> {
    ensure_not_sold(vehicle)?;
    let cost = parse_cost_lenient(raw_cost);

    let entry = HistoryEntry::new(
        ReconStage::Mechanical,
        now,
        compose_notes("Mechanical Completed.", notes),
    )
    .with_kind(EventKind::Completed)
    .with_mechanical_cost(cost)
    .with_previous_status(vehicle.current_recon_status);

    let mut fields = base_fields(now);
    fields.total_recon_cost = Some(vehicle.total_recon_cost + cost);

    Ok(finish_with_recomputed_status(vehicle, Some(entry), fields, now))
}

fn require_score(label: &str, score: Option<u8>) -> Result<u8, LedgerError> {
    let score = score.ok_or_else(|| LedgerError::Validation(format!("{} quality score is required", label)))?;
    validate_quality_score(score).map_err(|_| {
        LedgerError::Validation(format!(
            "{} quality score must be between {} and {}",
            label, QUALITY_SCORE_MIN, QUALITY_SCORE_MAX
        ))
    })?;
    Ok(score)
}

/// Completar detailing con revisión de calidad
///
/// Falla con `Validation` antes de construir nada si falta el detailer o
/// alguna nota está fuera de 1-5.
pub fn complete_detailing(
    vehicle: &Vehicle,
    review: &DetailingReview,
    now: DateTime<Utc>,
) -> Result<LedgerUpdate, LedgerError> {
    ensure_not_sold(vehicle)?;

    let detailer = review
        .detailer
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| LedgerError::Validation("Detailer is required".to_string()))?;
    let interior = require_score("Interior", review.interior_quality)?;
    let exterior = require_score("Exterior", review.exterior_quality)?;

    let entry = HistoryEntry::new(
        ReconStage::Detailing,
        now,
        compose_notes("Detailing Completed.", review.notes.as_deref()),
    )
    .with_kind(EventKind::Completed)
    .with_quality_review(detailer, interior, exterior)
    .with_previous_status(vehicle.current_recon_status);

    let mut fields = base_fields(now);
    fields.quality_review = Some(QualityReview {
        detailer: detailer.to_string(),
        interior: Some(interior),
        exterior: Some(exterior),
        review_date: Some(now),
    });

    Ok(finish_with_recomputed_status(vehicle, Some(entry), fields, now))
}

/// Arranque inicial: solicitud de servicio y paso directo a Mechanical
pub fn initial_recon_start(vehicle: &Vehicle, now: DateTime<Utc>) -> Result<LedgerUpdate, LedgerError> {
    ensure_not_sold(vehicle)?;
    if !stage_engine::is_essentially_new(vehicle) {
        return Err(LedgerError::InvalidTransition {
            from: vehicle.current_recon_status,
            to: ReconStage::Mechanical,
            reason: "recon has already been started for this vehicle".to_string(),
        });
    }

    let entry = HistoryEntry::new(
        ReconStage::Mechanical,
        now,
        "Service request sent; vehicle moved to Mechanical.",
    )
    .with_kind(EventKind::ServiceRequested)
    .with_previous_status(vehicle.current_recon_status);

    let mut fields = base_fields(now);
    fields.current_recon_status = Some(ReconStage::Mechanical);

    Ok(LedgerUpdate {
        new_history_entry: Some(entry),
        field_updates: fields,
    })
}

/// Cambiar el estado de fotos (sin entrada de historial)
pub fn update_photo_status(
    vehicle: &Vehicle,
    status: PhotoStatus,
    now: DateTime<Utc>,
) -> Result<LedgerUpdate, LedgerError> {
    ensure_not_sold(vehicle)?;
    let mut fields = base_fields(now);
    fields.photo_status = Some(status);
    if status == PhotoStatus::Taken {
        fields.photo_date = Some(now);
    }
    Ok(finish_with_recomputed_status(vehicle, None, fields, now))
}

/// Cambiar el flag de título en casa (sin entrada de historial)
pub fn update_title_in_house(
    vehicle: &Vehicle,
    title_in_house: bool,
    now: DateTime<Utc>,
) -> Result<LedgerUpdate, LedgerError> {
    ensure_not_sold(vehicle)?;
    let mut fields = base_fields(now);
    fields.title_in_house = Some(title_in_house);
    Ok(finish_with_recomputed_status(vehicle, None, fields, now))
}

/// Marcar como vendido (solo desde Lot Ready)
pub fn mark_sold(vehicle: &Vehicle, notes: Option<&str>, now: DateTime<Utc>) -> Result<LedgerUpdate, LedgerError> {
    ensure_not_sold(vehicle)?;
    if vehicle.current_recon_status != ReconStage::LotReady {
        return Err(LedgerError::InvalidTransition {
            from: vehicle.current_recon_status,
            to: ReconStage::Sold,
            reason: "only Lot Ready vehicles can be sold".to_string(),
        });
    }

    let entry = HistoryEntry::new(ReconStage::Sold, now, notes.map(str::trim).unwrap_or_default())
        .with_kind(EventKind::Sold)
        .with_previous_status(vehicle.current_recon_status);

    let mut fields = base_fields(now);
    fields.current_recon_status = Some(ReconStage::Sold);
    if vehicle.retail_date.is_none() {
        fields.retail_date = Some(now);
    }

    Ok(LedgerUpdate {
        new_history_entry: Some(entry),
        field_updates: fields,
    })
}

/// Marca de re-sincronización agregada cuando una fila re-importada coincide
/// con un vehículo existente
pub fn resync_marker(
    vehicle: &Vehicle,
    source: &str,
    original_status: Option<&str>,
    now: DateTime<Utc>,
) -> HistoryEntry {
    let original = original_status
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("N/A");
    HistoryEntry::new(
        vehicle.current_recon_status,
        now,
        format!(
            "Re-synced from {}. Original Recon Status from sheet: {}",
            source, original
        ),
    )
    .with_kind(EventKind::Resynced)
    .with_previous_status(vehicle.current_recon_status)
}
