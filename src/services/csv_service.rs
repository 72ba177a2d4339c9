//! Codec CSV de inventario
//!
//! Lectura tolerante de hojas exportadas (filas irregulares, líneas vacías,
//! BOM) y exportación con un orden de columnas fijo. El historial y la
//! revisión de calidad viajan como JSON dentro de su celda.

use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;

use crate::models::{HistoryEntry, QualityReview, Vehicle};
use crate::utils::errors::{AppError, AppResult};

/// Columnas del export, en orden
pub const EXPORT_HEADERS: [&str; 29] = [
    "id",
    "stockNumber",
    "vin",
    "year",
    "make",
    "model",
    "bodyStyle",
    "trimLevel",
    "extColor",
    "intColor",
    "mileage",
    "vehicleType",
    "ageInInventory",
    "lotLocation",
    "currentReconStatus",
    "purchaseDate",
    "entryDate",
    "photoStatus",
    "photoDate",
    "notes",
    "totalReconCost",
    "reconCompleteDate",
    "daysInRecon",
    "retailDate",
    "lastUpdated",
    "qualityReview",
    "statusHistory",
    "acquisitionType",
    "titleInHouse",
];

/// Lee el texto CSV como filas cabecera -> valor
pub fn parse_rows(text: &str) -> AppResult<Vec<HashMap<String, String>>> {
    let text = text.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let row: HashMap<String, String> = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(i, header)| (header.clone(), record.get(i).unwrap_or_default().to_string()))
            .collect();
        rows.push(row);
    }

    tracing::debug!("📄 CSV leído: {} filas, {} columnas", rows.len(), headers.len());
    Ok(rows)
}

fn format_timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

fn export_record(vehicle: &Vehicle) -> AppResult<Vec<String>> {
    let quality_review = if vehicle.quality_review.is_empty() {
        String::new()
    } else {
        serde_json::to_string(&vehicle.quality_review)?
    };

    Ok(vec![
        vehicle.id.clone(),
        vehicle.stock_number.clone(),
        vehicle.vin.clone(),
        vehicle.year.map(|y| y.to_string()).unwrap_or_default(),
        vehicle.make.clone(),
        vehicle.model.clone(),
        vehicle.body_style.clone(),
        vehicle.trim_level.clone(),
        vehicle.ext_color.clone(),
        vehicle.int_color.clone(),
        vehicle.mileage.to_string(),
        vehicle.vehicle_type.clone(),
        vehicle.age_in_inventory.to_string(),
        vehicle.lot_location.clone(),
        vehicle.current_recon_status.to_string(),
        vehicle.purchase_date.clone().unwrap_or_default(),
        format_timestamp(Some(vehicle.entry_date)),
        vehicle.photo_status.to_string(),
        format_timestamp(vehicle.photo_date),
        vehicle.notes.clone(),
        vehicle.total_recon_cost.to_string(),
        format_timestamp(vehicle.recon_complete_date),
        vehicle.days_in_recon.to_string(),
        format_timestamp(vehicle.retail_date),
        format_timestamp(vehicle.last_updated),
        quality_review,
        serde_json::to_string(&vehicle.status_history)?,
        vehicle.acquisition_type.clone(),
        vehicle.title_in_house.to_string(),
    ])
}

/// Exporta la colección a CSV; una colección vacía es un error
pub fn export_csv(vehicles: &[Vehicle]) -> AppResult<String> {
    if vehicles.is_empty() {
        return Err(AppError::Csv("No data to export".to_string()));
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS)?;
    for vehicle in vehicles {
        writer.write_record(export_record(vehicle)?)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV output is not UTF-8: {}", e)))
}

/// Decodifica la celda `statusHistory` de un export
///
/// El importador no la usa: un vehículo importado siempre arranca con su
/// entrada semilla y uno existente conserva su propio historial. Queda para
/// quien consuma el export (backups, verificación de la ida y vuelta).
pub fn parse_serialized_history(cell: &str) -> Result<Vec<HistoryEntry>, serde_json::Error> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(cell)
}

/// Decodifica la celda `qualityReview` de un export
///
/// Igual que `parse_serialized_history`, solo para consumidores del export.
pub fn parse_serialized_quality_review(cell: &str) -> Result<QualityReview, serde_json::Error> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(QualityReview::default());
    }
    serde_json::from_str(cell)
}
