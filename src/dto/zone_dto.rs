use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ZoneCheckRequest {
    pub latitude: f64,
    pub longitude: f64,
}
