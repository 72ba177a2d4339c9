//! Modelos de Analytics
//!
//! Este módulo contiene los modelos para métricas de reacondicionamiento:
//! duraciones, cuellos de botella por etapa y calidad de detailers.

use serde::Serialize;

use super::recon_stage::ReconStage;

/// Valor de una métrica agregada
///
/// Un agregado sin datos es `NoData`, nunca NaN ni una división por cero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Metric<T> {
    NoData,
    Available(T),
}

impl<T> Metric<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Metric::Available(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Metric::Available(value) => Some(value),
            Metric::NoData => None,
        }
    }
}

impl<T> From<Option<T>> for Metric<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Metric::Available(v),
            None => Metric::NoData,
        }
    }
}

/// Duración promedio expresada en días y en texto legible
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationStat {
    pub days: f64,
    pub display: String,
    pub sample_size: usize,
}

/// Rendimiento de un detailer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailerPerformance {
    pub detailer: String,
    pub vehicles_detailed: usize,
    pub average_interior: f64,
    pub average_exterior: f64,
}

/// Fila de la tabla de cuellos de botella
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageBottleneck {
    pub stage: ReconStage,
    pub vehicle_count: usize,
    pub average_days: f64,
    pub max_days: f64,
    pub vehicle_ids: Vec<String>,
}

/// Tiempo promedio histórico de una etapa
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageAverage {
    pub stage: ReconStage,
    pub average_days: Metric<f64>,
    pub samples: usize,
}

/// Conteo de vehículos por etapa
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    pub stage: ReconStage,
    pub count: usize,
}

/// Conteo de vehículos por estado de fotos
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PhotoStatusCounts {
    pub taken: usize,
    pub not_taken: usize,
}

/// Resumen de un vehículo para listados de analytics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    pub id: String,
    pub stock_number: String,
    pub vin: String,
    pub description: String,
    pub current_recon_status: ReconStage,
}

/// Resultado completo del motor de métricas
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconMetrics {
    pub total_vehicles: usize,
    pub average_total_recon_time: Metric<DurationStat>,
    pub average_photo_cycle_time: Metric<DurationStat>,
    pub detailer_performance: Metric<Vec<DetailerPerformance>>,
    pub stage_bottlenecks: Metric<Vec<StageBottleneck>>,
    pub average_time_per_stage: Vec<StageAverage>,
    pub vehicles_needing_photos: Vec<VehicleSummary>,
    pub workflow_status_distribution: Vec<StageCount>,
    pub photo_status_distribution: PhotoStatusCounts,
}
