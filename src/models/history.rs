//! Modelo de History Entry
//!
//! Cada entrada representa un evento discreto del flujo de trabajo. El historial
//! es append-only: una entrada nunca se edita ni se borra después de creada.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::recon_stage::ReconStage;

/// Tipo estructurado del evento registrado
///
/// Las entradas antiguas (exportadas antes de existir este campo) no lo traen;
/// para ellas se sigue interpretando el texto de `notes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Imported,
    Started,
    Completed,
    ServiceRequested,
    Sold,
    Resynced,
}

/// Entrada del historial de estados
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub status: ReconStage,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_kind: Option<EventKind>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub mechanical_cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interior_quality: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exterior_quality: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<ReconStage>,
}

impl HistoryEntry {
    /// Entrada mínima: solo etapa, instante y notas
    pub fn new(status: ReconStage, timestamp: DateTime<Utc>, notes: impl Into<String>) -> Self {
        Self {
            status,
            timestamp,
            notes: notes.into(),
            event_kind: None,
            mechanical_cost: None,
            detailer: None,
            interior_quality: None,
            exterior_quality: None,
            previous_status: None,
        }
    }

    pub fn with_kind(mut self, kind: EventKind) -> Self {
        self.event_kind = Some(kind);
        self
    }

    pub fn with_previous_status(mut self, previous: ReconStage) -> Self {
        self.previous_status = Some(previous);
        self
    }

    pub fn with_mechanical_cost(mut self, cost: Decimal) -> Self {
        self.mechanical_cost = Some(cost);
        self
    }

    pub fn with_quality_review(mut self, detailer: impl Into<String>, interior: u8, exterior: u8) -> Self {
        self.detailer = Some(detailer.into());
        self.interior_quality = Some(interior);
        self.exterior_quality = Some(exterior);
        self
    }

    fn notes_contain(&self, marker: &str) -> bool {
        self.notes.to_lowercase().contains(marker)
    }

    /// Evento de inicio/reanudación de una etapa
    pub fn is_started_marker(&self) -> bool {
        match self.event_kind {
            Some(kind) => kind == EventKind::Started,
            None => !self.is_import_marker() && self.notes_contain("started"),
        }
    }

    /// Evento de finalización de una etapa
    pub fn is_completed_marker(&self) -> bool {
        match self.event_kind {
            Some(kind) => kind == EventKind::Completed,
            None => !self.is_import_marker() && self.notes_contain("completed"),
        }
    }

    /// Entrada escrita por el importador: semilla o marca de re-sincronización
    ///
    /// No cuenta como trabajo de ninguna etapa.
    pub fn is_import_marker(&self) -> bool {
        match self.event_kind {
            Some(kind) => matches!(kind, EventKind::Imported | EventKind::Resynced),
            None => self.notes_contain("imported") || self.is_resync_marker(),
        }
    }

    /// Marca agregada al re-importar un vehículo existente
    pub fn is_resync_marker(&self) -> bool {
        match self.event_kind {
            Some(kind) => kind == EventKind::Resynced,
            None => self.notes_contain("re-synced from"),
        }
    }

    /// Finalización de mecánica con costo registrado
    pub fn is_completed_mechanical(&self) -> bool {
        self.status == ReconStage::Mechanical
            && self.mechanical_cost.is_some()
            && self.is_completed_marker()
    }

    /// Finalización de detailing con detailer y ambas notas de calidad
    pub fn is_completed_detailing(&self) -> bool {
        self.status == ReconStage::Detailing
            && self.detailer.as_deref().map_or(false, |d| !d.trim().is_empty())
            && self.interior_quality.is_some()
            && self.exterior_quality.is_some()
            && self.is_completed_marker()
    }
}
