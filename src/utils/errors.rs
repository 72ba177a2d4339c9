//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::ledger::LedgerError;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Workflow validation failed: {0}")]
    WorkflowValidation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(String),
}

impl From<LedgerError> for AppError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::Validation(msg) => AppError::WorkflowValidation(msg),
            other => AppError::Conflict(other.to_string()),
        }
    }
}

impl From<csv::Error> for AppError {
    fn from(error: csv::Error) -> Self {
        AppError::Csv(error.to_string())
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str, message: String, details: Option<serde_json::Value>, code: &str) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            message,
            details,
            code: Some(code.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Database(e) => {
                tracing::error!("❌ Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Database Error",
                        "An error occurred while accessing the database".to_string(),
                        Some(json!({ "sql_error": e.to_string() })),
                        "DB_ERROR",
                    ),
                )
            }

            AppError::Validation(e) => {
                tracing::warn!("⚠️ Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(
                        "Validation Error",
                        "The provided data is invalid".to_string(),
                        Some(json!(e)),
                        "VALIDATION_ERROR",
                    ),
                )
            }

            AppError::WorkflowValidation(msg) => {
                tracing::warn!("⚠️ Workflow validation failed: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("Input Required", msg, None, "INPUT_REQUIRED"),
                )
            }

            AppError::NotFound(msg) => {
                tracing::warn!("🔍 Resource not found: {}", msg);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("Not Found", msg, None, "NOT_FOUND"),
                )
            }

            AppError::Conflict(msg) => {
                tracing::warn!("⚠️ Conflict: {}", msg);
                (
                    StatusCode::CONFLICT,
                    ErrorResponse::new("Conflict", msg, None, "CONFLICT"),
                )
            }

            AppError::BadRequest(msg) => {
                tracing::warn!("⚠️ Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("Bad Request", msg, None, "BAD_REQUEST"),
                )
            }

            AppError::Internal(msg) => {
                tracing::error!("❌ Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Internal Server Error",
                        "An unexpected error occurred".to_string(),
                        Some(json!({ "internal_error": msg })),
                        "INTERNAL_ERROR",
                    ),
                )
            }

            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("🚫 Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::new("Service Unavailable", msg, None, "SERVICE_UNAVAILABLE"),
                )
            }

            AppError::ExternalApi(msg) => {
                tracing::error!("❌ External API error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new(
                        "External API Error",
                        "An error occurred while communicating with external service".to_string(),
                        Some(json!({ "external_api_error": msg })),
                        "EXTERNAL_API_ERROR",
                    ),
                )
            }

            AppError::Serialization(e) => {
                tracing::error!("❌ Serialization error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Serialization Error",
                        "A stored document could not be decoded".to_string(),
                        Some(json!({ "serde_error": e.to_string() })),
                        "SERIALIZATION_ERROR",
                    ),
                )
            }

            AppError::Csv(msg) => {
                tracing::warn!("⚠️ CSV error: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("CSV Error", msg, None, "CSV_ERROR"),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} with {} '{}' already exists", resource, field, value))
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}

/// Función helper para crear errores internos
pub fn internal_error(message: &str) -> AppError {
    AppError::Internal(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_errors_map_to_http_semantics() {
        let validation: AppError = LedgerError::Validation("Detailer name is required".into()).into();
        assert_eq!(validation.into_response().status(), StatusCode::BAD_REQUEST);

        let sold: AppError = LedgerError::VehicleSold.into();
        assert_eq!(sold.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_helpers_build_expected_variants() {
        assert!(matches!(not_found_error("Vehicle", "VIN1"), AppError::NotFound(m) if m.contains("VIN1")));
        assert!(matches!(conflict_error("Detailer", "name", "Ana"), AppError::Conflict(_)));
        assert_eq!(
            bad_request_error("x").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            internal_error("boom").into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
