use serde::{Deserialize, Serialize};
use validator::Validate;

/// Campos de dirección que el usuario completa tras verificar su zona
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AddressForm {
    #[validate(length(max = 200))]
    pub street: String,
    #[validate(length(max = 100))]
    pub city: String,
    #[validate(length(max = 100))]
    pub state: String,
    #[validate(length(max = 12))]
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub landmark: Option<String>,
}

impl AddressForm {
    /// Campos obligatorios vacíos, en orden de formulario
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Dirección completa tal como se guarda en la solicitud
    pub fn full_address(&self) -> String {
        let mut address = format!(
            "{}, {}, {} {}",
            self.street.trim(),
            self.city.trim(),
            self.state.trim(),
            self.postal_code.trim()
        );
        if let Some(landmark) = self.landmark.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            address.push_str(", Near ");
            address.push_str(landmark);
        }
        address
    }

    /// Rellena solo los campos vacíos con los valores sugeridos
    pub fn prefill(&mut self, suggestion: &AddressForm) {
        fn fill(target: &mut String, value: &str) {
            if target.trim().is_empty() && !value.trim().is_empty() {
                *target = value.trim().to_string();
            }
        }
        fill(&mut self.street, &suggestion.street);
        fill(&mut self.city, &suggestion.city);
        fill(&mut self.state, &suggestion.state);
        fill(&mut self.postal_code, &suggestion.postal_code);
    }
}

/// Coordenadas GPS del dispositivo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}
