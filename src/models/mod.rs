//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean exactamente al
//! documento persistido de cada vehículo y a las métricas derivadas.

pub mod recon_stage;
pub mod history;
pub mod vehicle;
pub mod analytics;
pub mod settings;

pub use history::{EventKind, HistoryEntry};
pub use recon_stage::{PhotoStatus, ReconStage};
pub use vehicle::{QualityReview, Vehicle};
