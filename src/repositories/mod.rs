//! Repositorios
//!
//! Implementaciones del document store de vehículos.

pub mod memory_store;
pub mod pg_vehicle_store;
pub mod vehicle_store;

pub use memory_store::MemoryVehicleStore;
pub use pg_vehicle_store::PgVehicleStore;
pub use vehicle_store::{ImportBatch, ImportRecord, ImportWrite, VehicleSnapshot, VehicleStore};
