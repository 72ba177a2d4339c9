//! Utilidades de tiempo
//!
//! Conversión de intervalos a días y formato legible ("2d 3h 15m").

use chrono::{DateTime, Duration, Utc};

const MILLIS_PER_DAY: f64 = 1000.0 * 60.0 * 60.0 * 24.0;

/// Días (fraccionarios) entre dos instantes; negativo si `to` es anterior
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Convierte días fraccionarios a una Duration de chrono
pub fn days_to_duration(days: f64) -> Duration {
    Duration::milliseconds((days * MILLIS_PER_DAY).round() as i64)
}

/// Formato legible de una duración
///
/// Días, horas y minutos; los segundos solo se muestran por debajo de una hora.
/// Una duración negativa se muestra como "N/A".
pub fn format_duration(duration: Duration) -> String {
    let total_millis = duration.num_milliseconds();
    if total_millis < 0 {
        return "N/A".to_string();
    }

    let total_seconds = total_millis / 1000;
    let days = total_seconds / 86_400;
    let hours = (total_seconds / 3_600) % 24;
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if days == 0 && hours == 0 {
        parts.push(format!("{}s", seconds));
    }

    let formatted = parts.join(" ");
    if formatted.is_empty() {
        "0s".to_string()
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_days_between() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap();
        assert!((days_between(a, b) - 2.5).abs() < 1e-9);
        assert!((days_between(b, a) + 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::seconds(0)), "0s");
        assert_eq!(format_duration(Duration::seconds(45)), "45s");
        assert_eq!(format_duration(Duration::seconds(125)), "2m 5s");
        assert_eq!(format_duration(Duration::hours(3) + Duration::minutes(4)), "3h 4m");
        assert_eq!(format_duration(Duration::days(2) + Duration::hours(1)), "2d 1h");
        assert_eq!(format_duration(Duration::days(1)), "1d");
        assert_eq!(format_duration(Duration::seconds(-5)), "N/A");
    }

    #[test]
    fn test_days_to_duration() {
        assert_eq!(days_to_duration(1.5), Duration::hours(36));
    }
}
