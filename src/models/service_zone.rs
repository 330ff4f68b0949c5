use serde::Serialize;

/// Zona de servicio: círculo alrededor del centro de una ciudad
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceZone {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
}

impl ServiceZone {
    const fn new(name: &'static str, latitude: f64, longitude: f64, radius_km: f64) -> Self {
        Self {
            name,
            latitude,
            longitude,
            radius_km,
        }
    }
}

/// Zonas atendidas, en orden de comprobación
pub const SERVICE_ZONES: [ServiceZone; 8] = [
    ServiceZone::new("Bangalore", 12.9716, 77.5946, 50.0),
    ServiceZone::new("Hyderabad", 17.3850, 78.4867, 50.0),
    ServiceZone::new("Chennai", 13.0827, 80.2707, 50.0),
    ServiceZone::new("Mumbai", 19.0760, 72.8777, 50.0),
    ServiceZone::new("Delhi", 28.7041, 77.1025, 50.0),
    ServiceZone::new("Pune", 18.5204, 73.8567, 40.0),
    ServiceZone::new("Kolkata", 22.5726, 88.3639, 40.0),
    ServiceZone::new("Ahmedabad", 23.0225, 72.5714, 40.0),
];
