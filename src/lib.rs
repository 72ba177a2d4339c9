//! Recon Tracker: seguimiento del reacondicionamiento de vehículos usados
//!
//! Motor de etapas, ledger de historial, importación CSV y métricas,
//! expuestos por una API axum.

pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
