//! Modelo de configuración de reacondicionamiento
//!
//! Documento hermano de los vehículos con la lista de detailers disponibles.

use serde::{Deserialize, Serialize};

/// Id fijo del documento de configuración
pub const SETTINGS_DOC_ID: &str = "reconAppSettings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReconSettings {
    #[serde(default)]
    pub detailers: Vec<String>,
}

impl ReconSettings {
    /// Agrega un detailer si no existe. Devuelve false si ya estaba.
    pub fn add_detailer(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.detailers.iter().any(|d| d == name) {
            return false;
        }
        self.detailers.push(name.to_string());
        true
    }

    /// Elimina un detailer. Devuelve false si no existía.
    pub fn remove_detailer(&mut self, name: &str) -> bool {
        let before = self.detailers.len();
        self.detailers.retain(|d| d != name);
        self.detailers.len() != before
    }
}
