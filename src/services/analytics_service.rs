//! Motor de métricas de reacondicionamiento
//!
//! `compute_metrics` es una función pura sobre la colección completa: se
//! recalcula desde cero en cada snapshot del change feed, sin estado
//! incremental.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::models::analytics::{
    DetailerPerformance, DurationStat, Metric, PhotoStatusCounts, ReconMetrics, StageAverage,
    StageBottleneck, StageCount, VehicleSummary,
};
use crate::models::{PhotoStatus, ReconStage, Vehicle};
use crate::services::stage_engine;
use crate::utils::duration::{days_between, days_to_duration, format_duration};

/// Calcula todas las métricas sobre la colección dada
pub fn compute_metrics(vehicles: &[Vehicle], now: DateTime<Utc>) -> ReconMetrics {
    ReconMetrics {
        total_vehicles: vehicles.len(),
        average_total_recon_time: average_total_recon_time(vehicles),
        average_photo_cycle_time: average_photo_cycle_time(vehicles),
        detailer_performance: detailer_performance(vehicles),
        stage_bottlenecks: stage_bottlenecks(vehicles, now),
        average_time_per_stage: average_time_per_stage(vehicles, now),
        vehicles_needing_photos: vehicles_needing_photos(vehicles),
        workflow_status_distribution: workflow_status_distribution(vehicles),
        photo_status_distribution: photo_status_distribution(vehicles),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn duration_stat(spans: &[f64]) -> Metric<DurationStat> {
    mean(spans)
        .map(|days| DurationStat {
            days,
            display: format_duration(days_to_duration(days)),
            sample_size: spans.len(),
        })
        .into()
}

/// Promedio de entrada (primer New Arrival o entryDate) hasta reconCompleteDate
pub fn average_total_recon_time(vehicles: &[Vehicle]) -> Metric<DurationStat> {
    let spans: Vec<f64> = vehicles
        .iter()
        .filter_map(|vehicle| {
            let completed = vehicle.recon_complete_date?;
            let started = stage_engine::stage_timeline(vehicle)
                .into_iter()
                .find(|entry| entry.status == ReconStage::NewArrival)
                .map(|entry| entry.timestamp)
                .unwrap_or(vehicle.entry_date);
            let days = days_between(started, completed);
            (days >= 0.0).then_some(days)
        })
        .collect();
    duration_stat(&spans)
}

/// Promedio desde la primera entrada de Photos hasta photoDate
pub fn average_photo_cycle_time(vehicles: &[Vehicle]) -> Metric<DurationStat> {
    let spans: Vec<f64> = vehicles
        .iter()
        .filter_map(|vehicle| {
            let done = vehicle.photo_date?;
            let started = stage_engine::stage_timeline(vehicle)
                .into_iter()
                .find(|entry| entry.status == ReconStage::Photos)?
                .timestamp;
            (done >= started).then(|| days_between(started, done))
        })
        .collect();
    duration_stat(&spans)
}

/// Conteo y notas promedio por detailer, ordenado por nombre
pub fn detailer_performance(vehicles: &[Vehicle]) -> Metric<Vec<DetailerPerformance>> {
    // detailer -> (cantidad, suma interior, suma exterior)
    let mut totals: BTreeMap<String, (usize, u32, u32)> = BTreeMap::new();

    for entry in vehicles
        .iter()
        .flat_map(|vehicle| vehicle.status_history.iter())
        .filter(|entry| entry.is_completed_detailing())
    {
        let (Some(detailer), Some(interior), Some(exterior)) =
            (entry.detailer.as_deref(), entry.interior_quality, entry.exterior_quality)
        else {
            continue;
        };
        let slot = totals.entry(detailer.trim().to_string()).or_insert((0, 0, 0));
        slot.0 += 1;
        slot.1 += u32::from(interior);
        slot.2 += u32::from(exterior);
    }

    if totals.is_empty() {
        return Metric::NoData;
    }

    Metric::Available(
        totals
            .into_iter()
            .map(|(detailer, (count, interior, exterior))| DetailerPerformance {
                detailer,
                vehicles_detailed: count,
                average_interior: f64::from(interior) / count as f64,
                average_exterior: f64::from(exterior) / count as f64,
            })
            .collect(),
    )
}

/// Tiempo en la etapa actual de cada vehículo activo, agregado por etapa
pub fn stage_bottlenecks(vehicles: &[Vehicle], now: DateTime<Utc>) -> Metric<Vec<StageBottleneck>> {
    let mut per_stage: BTreeMap<ReconStage, Vec<(String, f64)>> = BTreeMap::new();

    for vehicle in vehicles.iter().filter(|v| v.current_recon_status.is_active()) {
        let stage = vehicle.current_recon_status;
        let Some(latest) = stage_engine::stage_timeline(vehicle)
            .into_iter()
            .rev()
            .find(|entry| entry.status == stage)
        else {
            continue;
        };
        let days = days_between(latest.timestamp, now);
        if days < 0.0 {
            continue;
        }
        per_stage
            .entry(stage)
            .or_default()
            .push((vehicle.id.clone(), days));
    }

    if per_stage.is_empty() {
        return Metric::NoData;
    }

    Metric::Available(
        per_stage
            .into_iter()
            .map(|(stage, rows)| {
                let days: Vec<f64> = rows.iter().map(|(_, d)| *d).collect();
                StageBottleneck {
                    stage,
                    vehicle_count: rows.len(),
                    average_days: mean(&days).unwrap_or(0.0),
                    max_days: days.iter().copied().fold(0.0, f64::max),
                    vehicle_ids: rows.into_iter().map(|(id, _)| id).collect(),
                }
            })
            .collect(),
    )
}

/// Duración histórica promedio de cada etapa
///
/// Cada par consecutivo de entradas (ordenadas) atribuye su lapso a la etapa
/// de la primera. El tramo abierto de la etapa actual cuenta hasta `now`
/// cuando la última entrada es de esa etapa y no es Lot Ready ni Sold.
pub fn average_time_per_stage(vehicles: &[Vehicle], now: DateTime<Utc>) -> Vec<StageAverage> {
    let mut spans: BTreeMap<ReconStage, Vec<f64>> = BTreeMap::new();

    for vehicle in vehicles {
        let history = stage_engine::stage_timeline(vehicle);

        for pair in history.windows(2) {
            let days = days_between(pair[0].timestamp, pair[1].timestamp);
            if days >= 0.0 {
                spans.entry(pair[0].status).or_default().push(days);
            }
        }

        if let Some(last) = history.last() {
            let stage = vehicle.current_recon_status;
            if last.status == stage && !stage.is_terminal() {
                let days = days_between(last.timestamp, now);
                if days >= 0.0 {
                    spans.entry(stage).or_default().push(days);
                }
            }
        }
    }

    ReconStage::ALL
        .iter()
        .map(|stage| {
            let samples = spans.get(stage).map(Vec::as_slice).unwrap_or_default();
            StageAverage {
                stage: *stage,
                average_days: mean(samples).into(),
                samples: samples.len(),
            }
        })
        .collect()
}

/// Vehículos con detailing completo que aún no tienen fotos
pub fn vehicles_needing_photos(vehicles: &[Vehicle]) -> Vec<VehicleSummary> {
    vehicles
        .iter()
        .filter(|v| {
            v.photo_status == PhotoStatus::NotTaken
                && v.current_recon_status.is_active()
                && stage_engine::is_stage_completed(v, ReconStage::Detailing)
        })
        .map(summarize)
        .collect()
}

/// Conteo por etapa; siempre lista las seis
pub fn workflow_status_distribution(vehicles: &[Vehicle]) -> Vec<StageCount> {
    ReconStage::ALL
        .iter()
        .map(|stage| StageCount {
            stage: *stage,
            count: vehicles
                .iter()
                .filter(|v| v.current_recon_status == *stage)
                .count(),
        })
        .collect()
}

pub fn photo_status_distribution(vehicles: &[Vehicle]) -> PhotoStatusCounts {
    vehicles
        .iter()
        .fold(PhotoStatusCounts::default(), |mut counts, vehicle| {
            match vehicle.photo_status {
                PhotoStatus::Taken => counts.taken += 1,
                PhotoStatus::NotTaken => counts.not_taken += 1,
            }
            counts
        })
}

fn summarize(vehicle: &Vehicle) -> VehicleSummary {
    VehicleSummary {
        id: vehicle.id.clone(),
        stock_number: vehicle.stock_number.clone(),
        vin: vehicle.vin.clone(),
        description: vehicle.display_name(),
        current_recon_status: vehicle.current_recon_status,
    }
}
