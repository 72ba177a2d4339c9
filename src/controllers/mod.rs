//! Controllers: orquestan store, servicios y DTOs para cada endpoint

pub mod detailer_controller;
pub mod import_controller;
pub mod vehicle_controller;
