//! Utilidades de validación
//!
//! Funciones helper para validar datos de entrada antes de que lleguen
//! al scheduler o a los repositorios.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::ValidationError;

/// Validar y convertir string a UUID
pub fn validate_uuid(value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value).map_err(|_| {
        let mut error = ValidationError::new("uuid");
        error.add_param("value".into(), &value.to_string());
        error
    })
}

/// Validar y convertir string a datetime RFC3339
pub fn validate_datetime(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            let mut error = ValidationError::new("datetime");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"RFC3339".to_string());
            error
        })
}

/// Validar coordenadas GPS
///
/// El scheduler y la utilidad haversine asumen coordenadas ya validadas;
/// los rangos se rechazan aquí, en el borde de la API.
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&lat) {
        let mut error = ValidationError::new("latitude");
        error.add_param("value".into(), &lat);
        error.add_param("range".into(), &"-90.0 to 90.0".to_string());
        return Err(error);
    }

    if !(-180.0..=180.0).contains(&lng) {
        let mut error = ValidationError::new("longitude");
        error.add_param("value".into(), &lng);
        error.add_param("range".into(), &"-180.0 to 180.0".to_string());
        return Err(error);
    }

    Ok(())
}

/// Validar que un intervalo de tiempo sea coherente (start < end)
pub fn validate_time_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if start >= end {
        let mut error = ValidationError::new("time_window");
        error.add_param("start".into(), &start.to_rfc3339());
        error.add_param("end".into(), &end.to_rfc3339());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_uuid() {
        let valid_uuid = "550e8400-e29b-41d4-a716-446655440000";
        assert!(validate_uuid(valid_uuid).is_ok());

        let invalid_uuid = "invalid-uuid";
        assert!(validate_uuid(invalid_uuid).is_err());
    }

    #[test]
    fn test_validate_datetime() {
        assert!(validate_datetime("2025-08-18T14:00:00Z").is_ok());
        assert!(validate_datetime("2025-08-18 14:00").is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(30.39, -86.49).is_ok());
        assert!(validate_coordinates(91.0, -86.49).is_err());
        assert!(validate_coordinates(30.39, -181.0).is_err());
    }

    #[test]
    fn test_validate_time_window() {
        let start = Utc.with_ymd_and_hms(2025, 8, 18, 14, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 8, 18, 15, 0, 0).unwrap();
        assert!(validate_time_window(start, end).is_ok());
        assert!(validate_time_window(end, start).is_err());
        assert!(validate_time_window(start, start).is_err());
    }
}
