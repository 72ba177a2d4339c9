//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! Un valor mal formado es un error de arranque, nunca un panic.

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Error al leer la configuración del entorno
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected} (got '{value}')")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// URL publicada del export CSV de la hoja de inventario
    pub sheet_csv_url: Option<String>,
    pub csv_features_enabled: bool,
    pub request_timeout_secs: u64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            cors_origins: Vec::new(),
            database_url: None,
            database_max_connections: 10,
            sheet_csv_url: None,
            csv_features_enabled: true,
            request_timeout_secs: 30,
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed_var<T: FromStr>(name: &'static str, expected: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(name) {
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
            name,
            expected,
            value,
        }),
        None => Ok(default),
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            expected: "boolean",
            value: value.to_string(),
        }),
    }
}

/// Lista separada por comas, sin entradas vacías
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl EnvironmentConfig {
    /// Leer la configuración desde las variables de entorno
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let csv_features_enabled = match optional_var("CSV_FEATURES_ENABLED") {
            Some(value) => parse_bool("CSV_FEATURES_ENABLED", &value)?,
            None => defaults.csv_features_enabled,
        };

        Ok(Self {
            environment: optional_var("ENVIRONMENT").unwrap_or(defaults.environment),
            port: parsed_var("PORT", "port number", defaults.port)?,
            host: optional_var("HOST").unwrap_or(defaults.host),
            cors_origins: optional_var("CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
            database_url: optional_var("DATABASE_URL"),
            database_max_connections: parsed_var(
                "DATABASE_MAX_CONNECTIONS",
                "number",
                defaults.database_max_connections,
            )?,
            sheet_csv_url: optional_var("SHEET_CSV_URL"),
            csv_features_enabled,
            request_timeout_secs: parsed_var(
                "REQUEST_TIMEOUT_SECS",
                "number of seconds",
                defaults.request_timeout_secs,
            )?,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnvironmentConfig::default();
        assert_eq!(config.server_url(), "0.0.0.0:3000");
        assert!(config.is_development());
        assert!(config.csv_features_enabled);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("X", "TRUE"), Ok(true));
        assert_eq!(parse_bool("X", "off"), Ok(false));
        assert!(parse_bool("X", "maybe").is_err());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://a.test, ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }
}
