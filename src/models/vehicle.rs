//! Modelo de Vehicle
//!
//! Este módulo contiene el registro de vehículo tal como se persiste en el
//! document store (un documento por vehículo, claves en camelCase) y sus
//! objetos de valor anidados.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::history::HistoryEntry;
use super::recon_stage::{PhotoStatus, ReconStage};

lazy_static! {
    // Caracteres no válidos en una clave de documento
    static ref DOC_ID_FORBIDDEN: Regex = Regex::new(r"[.#$\[\]/]").unwrap();
}

/// Revisión de calidad registrada al completar detailing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QualityReview {
    #[serde(default)]
    pub detailer: String,
    #[serde(default)]
    pub interior: Option<u8>,
    #[serde(default)]
    pub exterior: Option<u8>,
    #[serde(default)]
    pub review_date: Option<DateTime<Utc>>,
}

impl QualityReview {
    /// Sin detailer asignado todavía (esqueleto vacío)
    pub fn is_empty(&self) -> bool {
        self.detailer.is_empty() && self.interior.is_none() && self.exterior.is_none()
    }
}

/// Vehicle principal - un documento por vehículo físico
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(default)]
    pub id: String,

    // Identidad
    #[serde(default)]
    pub stock_number: String,
    #[serde(default)]
    pub vin: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub body_style: String,
    #[serde(default)]
    pub trim_level: String,
    #[serde(default)]
    pub ext_color: String,
    #[serde(default)]
    pub int_color: String,
    #[serde(default)]
    pub mileage: i64,
    #[serde(default)]
    pub vehicle_type: String,
    #[serde(default)]
    pub lot_location: String,

    // Ciclo de vida
    pub entry_date: DateTime<Utc>,
    #[serde(default)]
    pub age_in_inventory: i64,
    #[serde(default)]
    pub acquisition_type: String,
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub days_in_recon: i64,
    #[serde(default)]
    pub notes: String,

    // Flujo de trabajo
    pub current_recon_status: ReconStage,
    #[serde(default)]
    pub photo_status: PhotoStatus,
    #[serde(default)]
    pub title_in_house: bool,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub total_recon_cost: Decimal,

    // Fechas de finalización
    #[serde(default)]
    pub recon_complete_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub retail_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub photo_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,

    #[serde(default)]
    pub quality_review: QualityReview,
    #[serde(default)]
    pub status_history: Vec<HistoryEntry>,
}

impl Vehicle {
    /// Vehículo vacío en New Arrival; el importador rellena el resto
    pub fn new(entry_date: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            stock_number: String::new(),
            vin: String::new(),
            year: None,
            make: String::new(),
            model: String::new(),
            body_style: String::new(),
            trim_level: String::new(),
            ext_color: String::new(),
            int_color: String::new(),
            mileage: 0,
            vehicle_type: String::new(),
            lot_location: String::new(),
            entry_date,
            age_in_inventory: 0,
            acquisition_type: String::new(),
            purchase_date: None,
            days_in_recon: 0,
            notes: String::new(),
            current_recon_status: ReconStage::NewArrival,
            photo_status: PhotoStatus::NotTaken,
            title_in_house: false,
            total_recon_cost: Decimal::ZERO,
            recon_complete_date: None,
            retail_date: None,
            photo_date: None,
            last_updated: None,
            quality_review: QualityReview::default(),
            status_history: Vec::new(),
        }
    }

    /// Clave de documento derivada: VIN preferido, si no el stock number
    ///
    /// Devuelve None cuando el vehículo no tiene identidad utilizable.
    pub fn document_id(&self) -> Option<String> {
        let raw = [self.vin.trim(), self.stock_number.trim()]
            .into_iter()
            .find(|value| !value.is_empty())?;
        Some(sanitize_document_id(raw))
    }

    /// "2022 Ford F-150" para listados
    pub fn display_name(&self) -> String {
        let year = self.year.map(|y| y.to_string()).unwrap_or_default();
        [year.as_str(), self.make.as_str(), self.model.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Búsqueda libre por VIN, stock, marca o modelo (case-insensitive)
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [&self.vin, &self.stock_number, &self.make, &self.model]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Reemplaza los caracteres no válidos para una clave de documento por '_'
pub fn sanitize_document_id(raw: &str) -> String {
    DOC_ID_FORBIDDEN.replace_all(raw.trim(), "_").into_owned()
}
