//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos de entrada
//! y conversión tolerante de valores importados.

use num_traits::Zero;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use validator::ValidationError;

/// Rango válido de las notas de calidad de detailing
pub const QUALITY_SCORE_MIN: u8 = 1;
pub const QUALITY_SCORE_MAX: u8 = 5;

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor esté en un rango específico
pub fn validate_range<T: PartialOrd + std::fmt::Display + Serialize>(
    value: T,
    min: T,
    max: T,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        let mut error = ValidationError::new("range");
        error.add_param("min".into(), &min);
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar una nota de calidad (1-5)
pub fn validate_quality_score(value: u8) -> Result<(), ValidationError> {
    validate_range(value, QUALITY_SCORE_MIN, QUALITY_SCORE_MAX)
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Limpia separadores de miles y símbolos de moneda de un valor numérico
fn clean_numeric(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | ' '))
        .collect()
}

/// Prefijo numérico inicial ("2022 " -> "2022", "45000mi" -> "45000")
fn leading_number(raw: &str, allow_fraction: bool) -> &str {
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in raw.char_indices() {
        let ok = c.is_ascii_digit()
            || (i == 0 && (c == '-' || c == '+'))
            || (allow_fraction && c == '.' && !seen_dot);
        if !ok {
            break;
        }
        if c == '.' {
            seen_dot = true;
        }
        end = i + c.len_utf8();
    }
    &raw[..end]
}

/// Entero tolerante: None si no hay ningún dígito utilizable
pub fn parse_int_lenient(raw: &str) -> Option<i64> {
    let cleaned = clean_numeric(raw);
    let prefix = leading_number(&cleaned, true);
    let integer_part = prefix.split('.').next().unwrap_or_default();
    integer_part.parse::<i64>().ok()
}

/// Decimal tolerante: None si no hay ningún número utilizable
pub fn parse_decimal_lenient(raw: &str) -> Option<Decimal> {
    let cleaned = clean_numeric(raw);
    let prefix = leading_number(&cleaned, true).trim_end_matches('.');
    Decimal::from_str(prefix).ok()
}

/// Costo tolerante: vacío, ilegible o negativo se convierte en 0
pub fn parse_cost_lenient(raw: Option<&str>) -> Decimal {
    match raw.and_then(parse_decimal_lenient) {
        Some(cost) if validate_non_negative(cost).is_ok() => cost,
        Some(cost) => {
            tracing::warn!("⚠️ Costo negativo ignorado: {}", cost);
            Decimal::ZERO
        }
        None => Decimal::ZERO,
    }
}
