//! Validación de zona de servicio
//!
//! Distancia de círculo máximo (haversine) desde un punto a cada centro de
//! zona. La primera zona, en orden declarado, cuyo radio contiene el punto
//! es la que atiende la dirección.

use serde::Serialize;

use crate::models::{Coordinates, ServiceZone, SERVICE_ZONES};
use crate::utils::validation::validate_coordinates;

/// Radio medio de la Tierra en km
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distancia en km entre dos puntos (fórmula de haversine)
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ZoneCheck {
    Served { zone: String, distance_km: f64 },
    NotServed,
}

impl ZoneCheck {
    pub fn zone_name(&self) -> Option<&str> {
        match self {
            ZoneCheck::Served { zone, .. } => Some(zone),
            ZoneCheck::NotServed => None,
        }
    }

    pub fn is_served(&self) -> bool {
        matches!(self, ZoneCheck::Served { .. })
    }
}

#[derive(Debug, Clone)]
pub struct GeofenceValidator {
    zones: Vec<ServiceZone>,
}

impl Default for GeofenceValidator {
    fn default() -> Self {
        Self::new(SERVICE_ZONES.to_vec())
    }
}

impl GeofenceValidator {
    pub fn new(zones: Vec<ServiceZone>) -> Self {
        Self { zones }
    }

    pub fn zones(&self) -> &[ServiceZone] {
        &self.zones
    }

    /// Primera zona cuyo centro está a una distancia ≤ su radio
    pub fn check(&self, point: Coordinates) -> ZoneCheck {
        for zone in &self.zones {
            let center = Coordinates::new(zone.latitude, zone.longitude);
            let distance_km = haversine_km(point, center);
            if distance_km <= zone.radius_km {
                tracing::debug!("📍 ({}, {}) dentro de {} a {:.1} km", point.latitude, point.longitude, zone.name, distance_km);
                return ZoneCheck::Served {
                    zone: zone.name.to_string(),
                    distance_km,
                };
            }
        }
        tracing::debug!("📍 ({}, {}) fuera de todas las zonas", point.latitude, point.longitude);
        ZoneCheck::NotServed
    }

    /// Igual que `check`, validando antes el rango de las coordenadas
    pub fn check_validated(
        &self,
        point: Coordinates,
    ) -> Result<ZoneCheck, validator::ValidationError> {
        validate_coordinates(point.latitude, point.longitude)?;
        Ok(self.check(point))
    }

    /// Nombres de las zonas atendidas, para mensajes al usuario
    pub fn served_names(&self) -> String {
        self.zones
            .iter()
            .map(|z| z.name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        let bangalore = Coordinates::new(12.9716, 77.5946);
        let chennai = Coordinates::new(13.0827, 80.2707);
        let d = haversine_km(bangalore, chennai);
        assert!((d - 290.0).abs() < 5.0, "got {}", d);
        assert_eq!(haversine_km(bangalore, bangalore), 0.0);
    }

    #[test]
    fn test_city_centers_are_served() {
        let validator = GeofenceValidator::default();
        for zone in SERVICE_ZONES {
            let check = validator.check(Coordinates::new(zone.latitude, zone.longitude));
            assert_eq!(check.zone_name(), Some(zone.name));
        }
    }

    #[test]
    fn test_bangalore_and_null_island() {
        let validator = GeofenceValidator::default();
        assert_eq!(
            validator.check(Coordinates::new(12.9716, 77.5946)).zone_name(),
            Some("Bangalore")
        );
        assert_eq!(validator.check(Coordinates::new(0.0, 0.0)), ZoneCheck::NotServed);
    }

    #[test]
    fn test_radius_boundary() {
        let validator = GeofenceValidator::default();
        // ~0.4° de latitud ≈ 44 km: dentro de Bangalore (50 km), fuera de Pune (40 km)
        assert!(validator.check(Coordinates::new(12.9716 + 0.4, 77.5946)).is_served());
        assert!(!validator.check(Coordinates::new(18.5204 + 0.4, 73.8567)).is_served());
        // ~0.5° ≈ 55.6 km: fuera de Bangalore
        assert!(!validator.check(Coordinates::new(12.9716 + 0.5, 77.5946)).is_served());
    }

    #[test]
    fn test_first_match_wins() {
        let zones = vec![
            ServiceZone { name: "A", latitude: 10.0, longitude: 10.0, radius_km: 100.0 },
            ServiceZone { name: "B", latitude: 10.1, longitude: 10.0, radius_km: 100.0 },
        ];
        let validator = GeofenceValidator::new(zones);
        assert_eq!(validator.check(Coordinates::new(10.1, 10.0)).zone_name(), Some("A"));
    }

    #[test]
    fn test_antipode_is_not_served() {
        let validator = GeofenceValidator::default();
        let antipode = Coordinates::new(-12.9716, 77.5946 - 180.0);
        assert!(!validator.check(antipode).is_served());
    }

    #[test]
    fn test_check_validated_rejects_out_of_range() {
        let validator = GeofenceValidator::default();
        assert!(validator.check_validated(Coordinates::new(95.0, 0.0)).is_err());
        assert!(validator.check_validated(Coordinates::new(12.9716, 77.5946)).unwrap().is_served());
    }
}
