use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::validate_not_empty;

// Estado de las funciones de importación/exportación
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportStatusResponse {
    pub csv_import_enabled: bool,
    pub sheet_sync_enabled: bool,
    pub csv_export_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

// Query de la sincronización con la hoja
#[derive(Debug, Deserialize, Default)]
pub struct SheetSyncQuery {
    #[serde(default)]
    pub force: bool,
}

// Request para agregar un detailer
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDetailerRequest {
    #[validate(custom = "validate_not_empty", length(max = 100))]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct DetailersResponse {
    pub detailers: Vec<String>,
}
