//! Etapas de reacondicionamiento
//!
//! Este módulo define la secuencia fija de etapas por las que pasa un vehículo
//! y el estado de fotos. El orden de las variantes ES el orden del flujo:
//! New Arrival < Mechanical < Detailing < Photos < Lot Ready < Sold.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Etapa canónica del vehículo dentro del flujo de reacondicionamiento
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReconStage {
    #[serde(rename = "New Arrival")]
    NewArrival,
    #[serde(rename = "Mechanical")]
    Mechanical,
    #[serde(rename = "Detailing")]
    Detailing,
    #[serde(rename = "Photos")]
    Photos,
    #[serde(rename = "Lot Ready")]
    LotReady,
    #[serde(rename = "Sold")]
    Sold,
}

impl ReconStage {
    /// Todas las etapas en orden de flujo
    pub const ALL: [ReconStage; 6] = [
        ReconStage::NewArrival,
        ReconStage::Mechanical,
        ReconStage::Detailing,
        ReconStage::Photos,
        ReconStage::LotReady,
        ReconStage::Sold,
    ];

    /// Etapas con trabajo propio que hay que completar antes de Lot Ready
    pub const WORK_STAGES: [ReconStage; 3] = [
        ReconStage::Mechanical,
        ReconStage::Detailing,
        ReconStage::Photos,
    ];

    /// Posición 0-based en la secuencia
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReconStage::NewArrival => "New Arrival",
            ReconStage::Mechanical => "Mechanical",
            ReconStage::Detailing => "Detailing",
            ReconStage::Photos => "Photos",
            ReconStage::LotReady => "Lot Ready",
            ReconStage::Sold => "Sold",
        }
    }

    /// Lot Ready y Sold son marcadores finales, no sub-tareas completables
    pub fn is_terminal(self) -> bool {
        matches!(self, ReconStage::LotReady | ReconStage::Sold)
    }

    pub fn is_sold(self) -> bool {
        self == ReconStage::Sold
    }

    /// Cualquier etapa que no sea Sold ocupa el inventario activo
    pub fn is_active(self) -> bool {
        !self.is_sold()
    }

    pub fn is_work_stage(self) -> bool {
        Self::WORK_STAGES.contains(&self)
    }

    /// Etapas que un usuario puede iniciar/reanudar manualmente
    pub fn is_startable(self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for ReconStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error al interpretar un nombre de etapa desconocido
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown recon stage: '{0}'")]
pub struct UnknownStage(pub String);

impl FromStr for ReconStage {
    type Err = UnknownStage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        ReconStage::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStage(value.to_string()))
    }
}

/// Estado de las fotos del vehículo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PhotoStatus {
    #[default]
    #[serde(rename = "Not Taken")]
    NotTaken,
    #[serde(rename = "Taken")]
    Taken,
}

impl PhotoStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PhotoStatus::NotTaken => "Not Taken",
            PhotoStatus::Taken => "Taken",
        }
    }

    /// Interpretación tolerante para datos importados: solo "taken" cuenta
    pub fn parse_lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("taken") {
            PhotoStatus::Taken
        } else {
            PhotoStatus::NotTaken
        }
    }
}

impl fmt::Display for PhotoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_is_total() {
        assert!(ReconStage::NewArrival < ReconStage::Mechanical);
        assert!(ReconStage::Mechanical < ReconStage::Detailing);
        assert!(ReconStage::Detailing < ReconStage::Photos);
        assert!(ReconStage::Photos < ReconStage::LotReady);
        assert!(ReconStage::LotReady < ReconStage::Sold);
        for (i, stage) in ReconStage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
        }
    }

    #[test]
    fn test_stage_round_trips_through_display_names() {
        for stage in ReconStage::ALL {
            assert_eq!(stage.to_string().parse::<ReconStage>(), Ok(stage));
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.as_str()));
        }
        assert_eq!("lot ready".parse::<ReconStage>(), Ok(ReconStage::LotReady));
        assert!("Painting".parse::<ReconStage>().is_err());
    }

    #[test]
    fn test_terminal_and_startable() {
        assert!(ReconStage::LotReady.is_terminal());
        assert!(ReconStage::Sold.is_terminal());
        assert!(!ReconStage::Photos.is_terminal());
        assert!(ReconStage::NewArrival.is_startable());
        assert!(!ReconStage::Sold.is_startable());
        assert!(ReconStage::LotReady.is_active());
        assert!(!ReconStage::Sold.is_active());
    }

    #[test]
    fn test_photo_status_parse_lenient() {
        assert_eq!(PhotoStatus::parse_lenient(" TAKEN "), PhotoStatus::Taken);
        assert_eq!(PhotoStatus::parse_lenient("pending"), PhotoStatus::NotTaken);
        assert_eq!(PhotoStatus::parse_lenient(""), PhotoStatus::NotTaken);
    }
}
