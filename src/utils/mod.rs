//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación
//! y formato de duraciones.

pub mod errors;
pub mod validation;
pub mod duration;

pub use errors::{AppError, AppResult};
