use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{AddressForm, Coordinates};

/// Geocodificación inversa: coordenadas → campos de dirección sugeridos
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, point: Coordinates) -> Result<AddressForm>;
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    road: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
}

impl From<NominatimAddress> for AddressForm {
    fn from(addr: NominatimAddress) -> Self {
        Self {
            street: addr.road.or(addr.suburb).unwrap_or_default(),
            city: addr.city.or(addr.town).or(addr.village).unwrap_or_default(),
            state: addr.state.unwrap_or_default(),
            postal_code: addr.postcode.unwrap_or_default(),
            landmark: None,
        }
    }
}

/// Cliente de un endpoint compatible con Nominatim (`/reverse?format=json`)
pub struct GeocodingService {
    base_url: String,
    client: reqwest::Client,
}

impl GeocodingService {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("ScrapPickup/1.0")
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { base_url, client })
    }
}

#[async_trait]
impl ReverseGeocoder for GeocodingService {
    async fn reverse(&self, point: Coordinates) -> Result<AddressForm> {
        log::info!("🗺️ Reverse geocoding ({}, {})", point.latitude, point.longitude);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", point.latitude.to_string()),
                ("lon", point.longitude.to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("⚠️ Reverse geocoding failed with status {}", status);
            return Err(anyhow!("Reverse geocoding failed: {}", status));
        }

        let body: NominatimResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse reverse geocoding response: {}", e))?;

        let address = body
            .address
            .ok_or_else(|| anyhow!("No address found for these coordinates"))?;

        log::info!("✅ Reverse geocoding successful");
        Ok(address.into())
    }
}

/// Geocodificador desactivado: siempre falla y el usuario rellena a mano
pub struct DisabledGeocoder;

#[async_trait]
impl ReverseGeocoder for DisabledGeocoder {
    async fn reverse(&self, _point: Coordinates) -> Result<AddressForm> {
        Err(anyhow!("reverse geocoding disabled"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_fallbacks() {
        let raw = r#"{"address": {"suburb": "Indiranagar", "town": "Bengaluru", "state": "Karnataka"}}"#;
        let parsed: NominatimResponse = serde_json::from_str(raw).unwrap();
        let form: AddressForm = parsed.address.unwrap().into();
        assert_eq!(form.street, "Indiranagar");
        assert_eq!(form.city, "Bengaluru");
        assert_eq!(form.state, "Karnataka");
        assert_eq!(form.postal_code, "");
    }

    #[test]
    fn test_road_takes_precedence() {
        let addr = NominatimAddress {
            road: Some("MG Road".to_string()),
            suburb: Some("Shivajinagar".to_string()),
            city: Some("Bengaluru".to_string()),
            village: Some("Ignored".to_string()),
            postcode: Some("560001".to_string()),
            ..Default::default()
        };
        let form = AddressForm::from(addr);
        assert_eq!(form.street, "MG Road");
        assert_eq!(form.city, "Bengaluru");
        assert_eq!(form.postal_code, "560001");
    }

    #[tokio::test]
    async fn test_disabled_geocoder_fails() {
        assert!(DisabledGeocoder
            .reverse(Coordinates::new(12.9716, 77.5946))
            .await
            .is_err());
    }
}
