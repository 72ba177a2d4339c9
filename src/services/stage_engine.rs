//! Motor de predicados de etapa
//!
//! Funciones puras que responden "¿la etapa X empezó / terminó para el
//! vehículo V?" y "¿en qué etapa canónica debería estar V según sus datos?".
//! Todo se deriva de los campos actuales y del historial; nada se cachea.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{HistoryEntry, PhotoStatus, ReconStage, Vehicle};
use crate::utils::duration::format_duration;

/// Tarea pendiente para poder pasar a Lot Ready
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingTask {
    Mechanical,
    Detailing,
    Photos,
    Title,
}

impl PendingTask {
    pub fn label(self) -> &'static str {
        match self {
            PendingTask::Mechanical => "Mechanical Complete",
            PendingTask::Detailing => "Detailing Complete (with Review)",
            PendingTask::Photos => "Photos Taken",
            PendingTask::Title => "Title In-House",
        }
    }
}

/// true si alguna entrada de la etapa trae marca de inicio
pub fn has_started_stage(vehicle: &Vehicle, stage: ReconStage) -> bool {
    vehicle
        .status_history
        .iter()
        .any(|entry| entry.status == stage && entry.is_started_marker())
}

/// Predicado de finalización específico por etapa
pub fn is_stage_completed(vehicle: &Vehicle, stage: ReconStage) -> bool {
    match stage {
        ReconStage::Mechanical => vehicle
            .status_history
            .iter()
            .any(HistoryEntry::is_completed_mechanical),
        ReconStage::Detailing => vehicle
            .status_history
            .iter()
            .any(HistoryEntry::is_completed_detailing),
        ReconStage::Photos => vehicle.photo_status == PhotoStatus::Taken,
        ReconStage::NewArrival => {
            vehicle
                .status_history
                .iter()
                .any(|entry| entry.status == ReconStage::NewArrival && !entry.is_import_marker())
                || vehicle.current_recon_status > ReconStage::NewArrival
        }
        // Lot Ready / Sold no tienen sub-tareas propias
        ReconStage::LotReady | ReconStage::Sold => false,
    }
}

/// Regla central: mecánica + detailing + fotos + título en casa
pub fn is_lot_ready_eligible(vehicle: &Vehicle) -> bool {
    pending_tasks(vehicle).is_empty()
}

/// Tareas que aún bloquean el paso a Lot Ready, en orden de flujo
pub fn pending_tasks(vehicle: &Vehicle) -> Vec<PendingTask> {
    let mut pending = Vec::new();
    if !is_stage_completed(vehicle, ReconStage::Mechanical) {
        pending.push(PendingTask::Mechanical);
    }
    if !is_stage_completed(vehicle, ReconStage::Detailing) {
        pending.push(PendingTask::Detailing);
    }
    if !is_stage_completed(vehicle, ReconStage::Photos) {
        pending.push(PendingTask::Photos);
    }
    if !vehicle.title_in_house {
        pending.push(PendingTask::Title);
    }
    pending
}

/// Etapa canónica siguiente, evaluada sobre la vista hipotética post-update
///
/// Prioridad: Sold se queda en Sold; las cuatro condiciones dan Lot Ready; si
/// no, la primera de Mechanical/Detailing/Photos sin completar. Si solo falta
/// el título se conserva la etapa de trabajo actual; un Lot Ready que pierde el
/// título vuelve a Photos y cualquier otra cosa vuelve a New Arrival.
pub fn determine_next_canonical_stage(vehicle: &Vehicle) -> ReconStage {
    if vehicle.current_recon_status.is_sold() {
        return ReconStage::Sold;
    }

    if is_lot_ready_eligible(vehicle) {
        return ReconStage::LotReady;
    }

    if let Some(stage) = ReconStage::WORK_STAGES
        .iter()
        .copied()
        .find(|stage| !is_stage_completed(vehicle, *stage))
    {
        return stage;
    }

    match vehicle.current_recon_status {
        current if current.is_work_stage() => current,
        ReconStage::LotReady => ReconStage::Photos,
        _ => ReconStage::NewArrival,
    }
}

/// Sin historial, o solo con entradas del importador (semilla y re-syncs)
pub fn is_essentially_new(vehicle: &Vehicle) -> bool {
    vehicle
        .status_history
        .iter()
        .all(HistoryEntry::is_import_marker)
}

/// Historial ordenado por timestamp (orden estable para empates)
pub fn sorted_history(vehicle: &Vehicle) -> Vec<&HistoryEntry> {
    let mut entries: Vec<&HistoryEntry> = vehicle.status_history.iter().collect();
    entries.sort_by_key(|entry| entry.timestamp);
    entries
}

/// Historial ordenado sin marcas de re-sincronización
///
/// Una re-importación no cambia la etapa en la que está el vehículo, así que
/// no reinicia ningún reloj de etapa.
pub fn stage_timeline(vehicle: &Vehicle) -> Vec<&HistoryEntry> {
    let mut entries = sorted_history(vehicle);
    entries.retain(|entry| !entry.is_resync_marker());
    entries
}

/// Tiempo en el estado actual, si la última entrada corresponde a él
pub fn time_in_current_status(vehicle: &Vehicle, now: DateTime<Utc>) -> Option<Duration> {
    let last = stage_timeline(vehicle).last().copied()?;
    if last.status != vehicle.current_recon_status {
        return None;
    }
    let elapsed = now - last.timestamp;
    (elapsed >= Duration::zero()).then_some(elapsed)
}

/// Avance hacia Lot Ready en porcentaje (0-100)
pub fn progress_percent(vehicle: &Vehicle) -> u8 {
    let lot_ready = ReconStage::LotReady.index();
    let index = vehicle.current_recon_status.index().min(lot_ready);
    ((index * 100) / lot_ready) as u8
}

/// Estado de una etapa para un vehículo
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageState {
    pub stage: ReconStage,
    pub started: bool,
    pub completed: bool,
}

/// Vista derivada del flujo de un vehículo
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    pub current_stage: ReconStage,
    pub canonical_stage: ReconStage,
    pub lot_ready_eligible: bool,
    pub pending_tasks: Vec<PendingTask>,
    pub stages: Vec<StageState>,
    pub progress_percent: u8,
    pub time_in_current_status: Option<String>,
    pub essentially_new: bool,
}

pub fn workflow_status(vehicle: &Vehicle, now: DateTime<Utc>) -> WorkflowStatus {
    WorkflowStatus {
        current_stage: vehicle.current_recon_status,
        canonical_stage: determine_next_canonical_stage(vehicle),
        lot_ready_eligible: is_lot_ready_eligible(vehicle),
        pending_tasks: pending_tasks(vehicle),
        stages: ReconStage::ALL
            .iter()
            .map(|stage| StageState {
                stage: *stage,
                started: has_started_stage(vehicle, *stage),
                completed: is_stage_completed(vehicle, *stage),
            })
            .collect(),
        progress_percent: progress_percent(vehicle),
        time_in_current_status: time_in_current_status(vehicle, now).map(format_duration),
        essentially_new: is_essentially_new(vehicle),
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::models::EventKind;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn any_stage() -> impl Strategy<Value = ReconStage> {
        prop::sample::select(ReconStage::ALL.to_vec())
    }

    prop_compose! {
        fn any_vehicle()(
            current in any_stage(),
            mech in any::<bool>(),
            detail in any::<bool>(),
            photos in any::<bool>(),
            title in any::<bool>(),
            imported in any::<bool>(),
        ) -> Vehicle {
            let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let mut v = Vehicle::new(t0);
            v.current_recon_status = current;
            v.title_in_house = title;
            if photos {
                v.photo_status = PhotoStatus::Taken;
            }
            if imported {
                v.status_history.push(
                    HistoryEntry::new(ReconStage::NewArrival, t0, "Imported.")
                        .with_kind(EventKind::Imported),
                );
            }
            if mech {
                v.status_history.push(
                    HistoryEntry::new(ReconStage::Mechanical, t0, "Mechanical Completed.")
                        .with_kind(EventKind::Completed)
                        .with_mechanical_cost(Decimal::new(75, 0)),
                );
            }
            if detail {
                v.status_history.push(
                    HistoryEntry::new(ReconStage::Detailing, t0, "Detailing Completed.")
                        .with_kind(EventKind::Completed)
                        .with_quality_review("Ana", 3, 4),
                );
            }
            v
        }
    }

    proptest! {
        #[test]
        fn prop_next_stage_is_idempotent(vehicle in any_vehicle()) {
            let first = determine_next_canonical_stage(&vehicle);
            let mut settled = vehicle.clone();
            settled.current_recon_status = first;
            prop_assert_eq!(determine_next_canonical_stage(&settled), first);
        }

        #[test]
        fn prop_lot_ready_iff_all_four(vehicle in any_vehicle()) {
            prop_assume!(!vehicle.current_recon_status.is_sold());
            let lot_ready = determine_next_canonical_stage(&vehicle) == ReconStage::LotReady;
            let all_four = is_stage_completed(&vehicle, ReconStage::Mechanical)
                && is_stage_completed(&vehicle, ReconStage::Detailing)
                && vehicle.photo_status == PhotoStatus::Taken
                && vehicle.title_in_house;
            prop_assert_eq!(lot_ready, all_four);
        }
    }
}
