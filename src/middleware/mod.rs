//! Middleware del sistema
//!
//! Este módulo contiene la configuración de CORS del router.

pub mod cors;

pub use cors::*;
