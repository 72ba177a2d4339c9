//! Mapeo de filas importadas a vehículos
//!
//! Las hojas de inventario llegan con cabeceras heterogéneas ("Stock #",
//! "Stock No", "Date In"...). Las claves se normalizan, se resuelven
//! sinónimos y cada campo se busca en una lista de alias. Ningún valor mal
//! formado aborta la fila: los números caen a 0 (o null para el año) y las
//! fechas a null.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use crate::models::{EventKind, HistoryEntry, PhotoStatus, QualityReview, ReconStage, Vehicle};
use crate::services::ledger;
use crate::utils::validation::{parse_cost_lenient, parse_int_lenient};

lazy_static! {
    static ref KEY_FORBIDDEN: Regex = Regex::new(r"[^a-z0-9\s_#]").unwrap();
    static ref KEY_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref SHORT_YEAR_DATE: Regex = Regex::new(r"^\d{1,2}/\d{1,2}/\d{2}$").unwrap();
}

/// Sinónimos de cabeceras -> clave canónica
const KEY_SYNONYMS: &[(&str, &str)] = &[
    ("stock_#", "stocknum"),
    ("stock_no", "stocknum"),
    ("stock#", "stocknum"),
    ("age_days", "age"),
    ("days_in_inventory", "age"),
    ("age_in_days", "age"),
    ("acq_type", "acquisitiontype"),
    ("acquisition", "acquisitiontype"),
    ("source", "acquisitiontype"),
    ("inventory_date", "entrydate"),
    ("date_in", "entrydate"),
    ("date_entered", "entrydate"),
];

/// Formatos de fecha aceptados (además de RFC 3339)
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Normaliza una cabecera: minúsculas, sin símbolos, espacios -> '_'
pub fn normalize_key(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped = KEY_FORBIDDEN.replace_all(&lowered, "");
    let key = KEY_WHITESPACE.replace_all(stripped.trim(), "_").into_owned();
    KEY_SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(key)
}

/// Fila con las claves ya normalizadas
#[derive(Debug, Clone, Default)]
pub struct NormalizedRow {
    values: HashMap<String, String>,
}

impl NormalizedRow {
    pub fn from_raw(raw: &HashMap<String, String>) -> Self {
        let mut values = HashMap::with_capacity(raw.len());
        for (key, value) in raw {
            let key = normalize_key(key);
            let value = value.trim();
            // Ante cabeceras duplicadas gana el primer valor no vacío
            let slot = values.entry(key).or_insert_with(String::new);
            if slot.is_empty() && !value.is_empty() {
                *slot = value.to_string();
            }
        }
        Self { values }
    }

    /// Primer valor no vacío entre los alias dados
    pub fn get(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|alias| self.values.get(*alias))
            .map(String::as_str)
            .find(|value| !value.is_empty())
    }

    fn text(&self, aliases: &[&str]) -> String {
        self.get(aliases).unwrap_or_default().to_string()
    }

    fn int_or_zero(&self, aliases: &[&str]) -> i64 {
        self.get(aliases).and_then(parse_int_lenient).unwrap_or(0)
    }

    fn date(&self, aliases: &[&str]) -> Option<DateTime<Utc>> {
        self.get(aliases).and_then(parse_date_lenient)
    }

    /// Valor crudo de la columna de estado de la hoja, si existe
    pub fn original_recon_status(&self) -> Option<&str> {
        self.get(&["recon_status", "currentreconstatus"])
    }
}

/// Fecha tolerante; None si ningún formato aplica
pub fn parse_date_lenient(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    let date_formats: &[&str] = if SHORT_YEAR_DATE.is_match(value) {
        &["%m/%d/%y"]
    } else {
        DATE_FORMATS
    };
    date_formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Entrada semilla de un vehículo recién importado
pub fn import_seed_entry(entry_date: DateTime<Utc>, original_status: Option<&str>) -> HistoryEntry {
    HistoryEntry::new(
        ReconStage::NewArrival,
        entry_date,
        format!(
            "Imported. Original Recon Status from sheet: {}",
            original_status.unwrap_or("N/A")
        ),
    )
    .with_kind(EventKind::Imported)
}

/// Convierte una fila cruda en un vehículo nuevo en New Arrival
pub fn map_row(raw_row: &HashMap<String, String>, now: DateTime<Utc>) -> Vehicle {
    map_normalized_row(&NormalizedRow::from_raw(raw_row), now)
}

pub fn map_normalized_row(row: &NormalizedRow, now: DateTime<Utc>) -> Vehicle {
    let entry_date = row.date(&["entrydate", "entry_date"]).unwrap_or(now);
    let mut vehicle = Vehicle::new(entry_date);

    vehicle.stock_number = row.text(&["stocknum", "stock_number", "stocknumber", "stock"]);
    vehicle.vin = row.text(&["vin"]);
    vehicle.year = row
        .get(&["year"])
        .and_then(parse_int_lenient)
        .and_then(|year| i32::try_from(year).ok());
    vehicle.make = row.text(&["make"]);
    vehicle.model = row.text(&["model"]);
    vehicle.body_style = row.text(&["body_style", "bodystyle"]);
    vehicle.trim_level = row.text(&["trim_level", "trimlevel", "trim"]);
    vehicle.ext_color = row.text(&["ext_color", "extcolor"]);
    vehicle.int_color = row.text(&["int_color", "intcolor"]);
    vehicle.mileage = row.int_or_zero(&["mileage"]);
    vehicle.vehicle_type = row.text(&["type", "vehicle_type", "vehicletype"]);
    vehicle.age_in_inventory = row.int_or_zero(&["age", "ageininventory"]);
    vehicle.lot_location = row.text(&["lot", "lot_location", "lotlocation"]);
    vehicle.purchase_date = row.get(&["purchase_date", "purchasedate"]).map(str::to_string);
    vehicle.photo_status = row
        .get(&["photo_status", "photostatus"])
        .map(PhotoStatus::parse_lenient)
        .unwrap_or_default();
    vehicle.photo_date = row.date(&["photo_date", "photodate"]);
    vehicle.notes = row.text(&["notes"]);
    vehicle.total_recon_cost = parse_cost_lenient(row.get(&["recon_cost", "reconcost", "totalreconcost"]));
    vehicle.recon_complete_date = row.date(&["recon_complete_date", "reconcompletedate"]);
    vehicle.days_in_recon = row.int_or_zero(&["days_in_recon", "daysinrecon"]);
    vehicle.retail_date = row.date(&["retail_date", "retaildate"]);
    vehicle.acquisition_type = row.text(&["acquisitiontype"]);

    vehicle.current_recon_status = ReconStage::NewArrival;
    vehicle.title_in_house = false;
    vehicle.quality_review = QualityReview::default();
    vehicle.status_history = vec![import_seed_entry(entry_date, row.original_recon_status())];
    vehicle.last_updated = Some(now);

    vehicle.id = vehicle.document_id().unwrap_or_default();
    vehicle
}

/// Fusiona una fila re-importada con el documento existente
///
/// Identidad y ciclo de vida vienen de la hoja; el estado del flujo, las
/// fechas de finalización y el historial se conservan, y se agrega una marca
/// de re-sincronización.
pub fn merge_reimport(
    existing: &Vehicle,
    incoming: &Vehicle,
    source: &str,
    original_status: Option<&str>,
    now: DateTime<Utc>,
) -> Vehicle {
    let mut merged = existing.clone();

    merged.stock_number = incoming.stock_number.clone();
    merged.vin = incoming.vin.clone();
    merged.year = incoming.year;
    merged.make = incoming.make.clone();
    merged.model = incoming.model.clone();
    merged.body_style = incoming.body_style.clone();
    merged.trim_level = incoming.trim_level.clone();
    merged.ext_color = incoming.ext_color.clone();
    merged.int_color = incoming.int_color.clone();
    merged.mileage = incoming.mileage;
    merged.vehicle_type = incoming.vehicle_type.clone();
    merged.lot_location = incoming.lot_location.clone();
    merged.age_in_inventory = incoming.age_in_inventory;
    merged.acquisition_type = incoming.acquisition_type.clone();
    merged.purchase_date = incoming.purchase_date.clone();
    merged.days_in_recon = incoming.days_in_recon;
    merged.notes = incoming.notes.clone();

    merged
        .status_history
        .push(ledger::resync_marker(existing, source, original_status, now));
    merged.last_updated = Some(now);
    merged
}
