//! DTOs de la API HTTP

pub mod common_dto;
pub mod import_dto;
pub mod vehicle_dto;

pub use common_dto::ApiResponse;
