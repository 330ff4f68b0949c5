//! Resultados de la geolocalización del dispositivo
//!
//! La plataforma entrega una posición o uno de sus códigos de error; aquí se
//! tipan y se traducen a mensajes para el usuario.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum LocationError {
    #[error("Geolocation is not supported by your browser")]
    Unsupported,
    #[error("Unable to get your location. Please enable location permissions in your browser settings.")]
    PermissionDenied,
    #[error("Unable to get your location. Location information is unavailable.")]
    PositionUnavailable,
    #[error("Unable to get your location. Location request timed out.")]
    Timeout,
    #[error("Unable to get your location. An unknown error occurred.")]
    Unknown,
}

impl LocationError {
    pub fn code(&self) -> &'static str {
        match self {
            LocationError::Unsupported => "unsupported",
            LocationError::PermissionDenied => "permission_denied",
            LocationError::PositionUnavailable => "position_unavailable",
            LocationError::Timeout => "timeout",
            LocationError::Unknown => "unknown",
        }
    }
}

/// Lo que informa el cliente al terminar un intento de geolocalización
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LocationOutcome {
    Fix { latitude: f64, longitude: f64 },
    Failed { error: LocationError },
}

impl LocationOutcome {
    pub fn into_result(self) -> Result<Coordinates, LocationError> {
        match self {
            LocationOutcome::Fix { latitude, longitude } => Ok(Coordinates::new(latitude, longitude)),
            LocationOutcome::Failed { error } => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_error_has_a_distinct_message() {
        let errors = [
            LocationError::Unsupported,
            LocationError::PermissionDenied,
            LocationError::PositionUnavailable,
            LocationError::Timeout,
            LocationError::Unknown,
        ];
        let mut messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), errors.len());
    }

    #[test]
    fn test_outcome_wire_format() {
        let fix: LocationOutcome =
            serde_json::from_str(r#"{"outcome": "fix", "latitude": 12.9, "longitude": 77.5}"#).unwrap();
        assert_eq!(fix.into_result().unwrap(), Coordinates::new(12.9, 77.5));

        let denied: LocationOutcome =
            serde_json::from_str(r#"{"outcome": "failed", "error": "permission_denied"}"#).unwrap();
        assert_eq!(denied.into_result(), Err(LocationError::PermissionDenied));
    }
}
