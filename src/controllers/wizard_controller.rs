//! Asistente de solicitud de recogida
//!
//! Máquina de estados lineal de cinco pasos:
//! `weights → images → address → datetime → confirmation`.
//! Solo se avanza un paso cada vez y solo si el paso actual valida;
//! retroceder desde el primer paso cancela el asistente.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{
    AddressForm, Coordinates, ImageBlob, ImageBlobError, NewPickupRequest, ScrapItem, ScrapType,
};
use crate::services::geofence::{GeofenceValidator, ZoneCheck};
use crate::services::location_service::{LocationError, LocationOutcome};
use crate::utils::validation::{validate_date, validate_positive};

/// Atajos de peso en kg
pub const WEIGHT_PRESETS: [u32; 5] = [5, 10, 25, 50, 100];

/// Imágenes admitidas por tipo de material
pub const MAX_IMAGES_PER_ITEM: usize = 5;

/// Franjas horarias de recogida
pub const TIME_SLOTS: [&str; 10] = [
    "08:00", "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Weights,
    Images,
    Address,
    Datetime,
    Confirmation,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Weights,
        WizardStep::Images,
        WizardStep::Address,
        WizardStep::Datetime,
        WizardStep::Confirmation,
    ];

    pub fn index(&self) -> usize {
        match self {
            WizardStep::Weights => 0,
            WizardStep::Images => 1,
            WizardStep::Address => 2,
            WizardStep::Datetime => 3,
            WizardStep::Confirmation => 4,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Weights => "Enter Weights",
            WizardStep::Images => "Upload Images",
            WizardStep::Address => "Enter Address",
            WizardStep::Datetime => "Schedule Pickup",
            WizardStep::Confirmation => "Confirm Request",
        }
    }

    pub fn next(&self) -> Option<WizardStep> {
        WizardStep::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(&self) -> Option<WizardStep> {
        self.index().checked_sub(1).map(|i| WizardStep::ALL[i])
    }

    /// Progreso en porcentaje entero (20, 40, ..., 100)
    pub fn progress(&self) -> u8 {
        ((self.index() + 1) * 100 / WizardStep::ALL.len()) as u8
    }
}

/// Estado del último intento de geolocalización
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LocationState {
    NotAttempted,
    Pending,
    InZone { zone: String, coordinates: Coordinates },
    OutOfZone { coordinates: Coordinates },
    Failed { error: LocationError },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    #[error("Select at least one scrap type")]
    NoScrapTypes,

    #[error("Scrap type {0} was selected more than once")]
    DuplicateScrapType(ScrapType),

    #[error("Scrap type {0} is not part of this request")]
    UnknownItem(ScrapType),

    #[error("This action belongs to the {expected:?} step, the wizard is at {actual:?}")]
    WrongStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error("Enter a weight greater than zero for: {}", join_types(.types))]
    InvalidWeights { types: Vec<ScrapType> },

    #[error("{0} kg is not a quick-select weight")]
    UnknownPreset(u32),

    #[error("Please upload at least one image for each scrap type: {}", join_types(.types))]
    MissingImages { types: Vec<ScrapType> },

    #[error("Invalid image: {0}")]
    InvalidImage(#[from] ImageBlobError),

    #[error("At most {limit} images can be uploaded for {scrap_type}")]
    TooManyImages { scrap_type: ScrapType, limit: usize },

    #[error("No image #{index} for {scrap_type}")]
    ImageNotFound { scrap_type: ScrapType, index: usize },

    #[error("Please enable location to verify service availability")]
    LocationNotAttempted,

    #[error("A location request is already in progress")]
    LocationInFlight,

    #[error("No location request is in progress")]
    NoLocationInFlight,

    #[error("We are not available in this zone. We currently serve: {served}")]
    OutOfServiceZone { served: String },

    #[error("{0}")]
    LocationFailed(LocationError),

    #[error("Address fields can be edited once your location is verified inside a service zone")]
    AddressLocked,

    #[error("Please fill in: {}", .fields.join(", "))]
    IncompleteAddress { fields: Vec<&'static str> },

    #[error("Choose a pickup date")]
    MissingDate,

    #[error("'{0}' is not a valid date (YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Pickup date {date} is in the past (today is {today})")]
    DateInPast { date: NaiveDate, today: NaiveDate },

    #[error("Choose a pickup time")]
    MissingTime,

    #[error("'{0}' is not an available time slot")]
    InvalidTimeSlot(String),

    #[error("This is the last step, submit the request instead")]
    AtLastStep,

    #[error("The request can only be submitted from the confirmation step")]
    NotReadyToSubmit,
}

fn join_types(types: &[ScrapType]) -> String {
    types.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
}

impl WizardError {
    pub fn code(&self) -> &'static str {
        match self {
            WizardError::NoScrapTypes
            | WizardError::DuplicateScrapType(_)
            | WizardError::UnknownItem(_) => "INVALID_SCRAP_TYPES",
            WizardError::WrongStep { .. } | WizardError::AtLastStep | WizardError::NotReadyToSubmit => {
                "WRONG_STEP"
            }
            WizardError::InvalidWeights { .. } | WizardError::UnknownPreset(_) => "INVALID_WEIGHTS",
            WizardError::MissingImages { .. }
            | WizardError::InvalidImage(_)
            | WizardError::TooManyImages { .. }
            | WizardError::ImageNotFound { .. } => "INVALID_IMAGES",
            WizardError::LocationNotAttempted
            | WizardError::LocationInFlight
            | WizardError::NoLocationInFlight
            | WizardError::LocationFailed(_) => "LOCATION_REQUIRED",
            WizardError::OutOfServiceZone { .. } => "OUT_OF_SERVICE_ZONE",
            WizardError::AddressLocked | WizardError::IncompleteAddress { .. } => "INVALID_ADDRESS",
            WizardError::MissingDate
            | WizardError::InvalidDate(_)
            | WizardError::DateInPast { .. }
            | WizardError::MissingTime
            | WizardError::InvalidTimeSlot(_) => "INVALID_SCHEDULE",
        }
    }

    /// Detalle estructurado para la respuesta HTTP
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            WizardError::InvalidWeights { types } | WizardError::MissingImages { types } => {
                Some(json!({ "types": types }))
            }
            WizardError::IncompleteAddress { fields } => Some(json!({ "fields": fields })),
            WizardError::LocationFailed(error) => Some(json!({ "location_error": error.code() })),
            WizardError::WrongStep { expected, actual } => {
                Some(json!({ "expected": expected, "actual": actual }))
            }
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, WizardError::LocationInFlight)
    }
}

/// Resultado de retroceder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    Moved(WizardStep),
    Cancelled,
}

/// Borrador en curso de una solicitud de recogida
#[derive(Debug, Clone)]
pub struct PickupWizard {
    user_phone: String,
    step: WizardStep,
    items: Vec<ScrapItem>,
    // texto tal cual lo escribió el usuario, alineado con `items`
    raw_weights: Vec<String>,
    location: LocationState,
    address: AddressForm,
    date: Option<String>,
    time: Option<String>,
}

impl PickupWizard {
    pub fn start(user_phone: impl Into<String>, types: &[ScrapType]) -> Result<Self, WizardError> {
        if types.is_empty() {
            return Err(WizardError::NoScrapTypes);
        }
        let mut seen = HashSet::new();
        for t in types {
            if !seen.insert(*t) {
                return Err(WizardError::DuplicateScrapType(*t));
            }
        }

        Ok(Self {
            user_phone: user_phone.into(),
            step: WizardStep::Weights,
            items: types.iter().copied().map(ScrapItem::empty).collect(),
            raw_weights: vec![String::new(); types.len()],
            location: LocationState::NotAttempted,
            address: AddressForm::default(),
            date: None,
            time: None,
        })
    }

    pub fn user_phone(&self) -> &str {
        &self.user_phone
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn items(&self) -> &[ScrapItem] {
        &self.items
    }

    pub fn raw_weights(&self) -> &[String] {
        &self.raw_weights
    }

    pub fn location(&self) -> &LocationState {
        &self.location
    }

    pub fn address(&self) -> &AddressForm {
        &self.address
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    pub fn address_editable(&self) -> bool {
        matches!(self.location, LocationState::InZone { .. })
    }

    fn require_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        if self.step != expected {
            return Err(WizardError::WrongStep {
                expected,
                actual: self.step,
            });
        }
        Ok(())
    }

    fn item_index(&self, scrap_type: ScrapType) -> Result<usize, WizardError> {
        self.items
            .iter()
            .position(|i| i.scrap_type == scrap_type)
            .ok_or(WizardError::UnknownItem(scrap_type))
    }

    // ── paso 1: pesos ──────────────────────────────────────────────

    pub fn set_weight(&mut self, scrap_type: ScrapType, raw: &str) -> Result<(), WizardError> {
        self.require_step(WizardStep::Weights)?;
        let index = self.item_index(scrap_type)?;
        self.raw_weights[index] = raw.to_string();
        Ok(())
    }

    pub fn apply_preset(&mut self, scrap_type: ScrapType, preset: u32) -> Result<(), WizardError> {
        if !WEIGHT_PRESETS.contains(&preset) {
            return Err(WizardError::UnknownPreset(preset));
        }
        self.set_weight(scrap_type, &preset.to_string())
    }

    fn parse_weight(raw: &str) -> Option<Decimal> {
        let weight = raw.trim().parse::<Decimal>().ok()?;
        validate_positive(weight).ok()?;
        Some(weight)
    }

    fn validate_weights(&self) -> Result<Vec<Decimal>, WizardError> {
        let parsed: Vec<Option<Decimal>> = self.raw_weights.iter().map(|r| Self::parse_weight(r)).collect();
        let invalid: Vec<ScrapType> = self
            .items
            .iter()
            .zip(&parsed)
            .filter(|(_, w)| w.is_none())
            .map(|(item, _)| item.scrap_type)
            .collect();
        if !invalid.is_empty() {
            return Err(WizardError::InvalidWeights { types: invalid });
        }
        Ok(parsed.into_iter().flatten().collect())
    }

    // ── paso 2: imágenes ───────────────────────────────────────────

    pub fn attach_image(&mut self, scrap_type: ScrapType, image: ImageBlob) -> Result<usize, WizardError> {
        self.require_step(WizardStep::Images)?;
        let index = self.item_index(scrap_type)?;
        let images = &mut self.items[index].images;
        if images.len() >= MAX_IMAGES_PER_ITEM {
            return Err(WizardError::TooManyImages {
                scrap_type,
                limit: MAX_IMAGES_PER_ITEM,
            });
        }
        images.push(image);
        Ok(images.len())
    }

    pub fn remove_image(&mut self, scrap_type: ScrapType, position: usize) -> Result<(), WizardError> {
        self.require_step(WizardStep::Images)?;
        let index = self.item_index(scrap_type)?;
        let images = &mut self.items[index].images;
        if position >= images.len() {
            return Err(WizardError::ImageNotFound {
                scrap_type,
                index: position,
            });
        }
        images.remove(position);
        Ok(())
    }

    fn validate_images(&self) -> Result<(), WizardError> {
        let missing: Vec<ScrapType> = self
            .items
            .iter()
            .filter(|i| i.images.is_empty())
            .map(|i| i.scrap_type)
            .collect();
        if !missing.is_empty() {
            return Err(WizardError::MissingImages { types: missing });
        }
        Ok(())
    }

    // ── paso 3: dirección ──────────────────────────────────────────

    /// Marca un intento de geolocalización en curso; solo se admite uno a la vez
    pub fn begin_location_attempt(&mut self) -> Result<(), WizardError> {
        self.require_step(WizardStep::Address)?;
        if self.location == LocationState::Pending {
            return Err(WizardError::LocationInFlight);
        }
        self.location = LocationState::Pending;
        debug!("📡 Intento de geolocalización iniciado para {}", self.user_phone);
        Ok(())
    }

    /// Registra el resultado del intento en curso y comprueba la zona
    pub fn complete_location_attempt(
        &mut self,
        outcome: LocationOutcome,
        geofence: &GeofenceValidator,
    ) -> Result<&LocationState, WizardError> {
        self.require_step(WizardStep::Address)?;
        if self.location != LocationState::Pending {
            return Err(WizardError::NoLocationInFlight);
        }

        self.location = match outcome.into_result() {
            Ok(point) => match geofence.check_validated(point) {
                Ok(ZoneCheck::Served { zone, .. }) => {
                    info!("✅ {} dentro de la zona {}", self.user_phone, zone);
                    LocationState::InZone {
                        zone,
                        coordinates: point,
                    }
                }
                Ok(ZoneCheck::NotServed) => {
                    info!("🚫 {} fuera de las zonas de servicio", self.user_phone);
                    LocationState::OutOfZone { coordinates: point }
                }
                Err(e) => {
                    warn!("⚠️ Coordenadas fuera de rango descartadas: {}", e);
                    LocationState::Failed {
                        error: LocationError::PositionUnavailable,
                    }
                }
            },
            Err(error) => {
                info!("📵 Geolocalización fallida: {}", error.code());
                LocationState::Failed { error }
            }
        };
        Ok(&self.location)
    }

    /// Aplica la dirección sugerida por la geocodificación inversa.
    /// Sin sugerencia, la ciudad toma el nombre de la zona.
    pub fn apply_address_suggestion(&mut self, suggestion: Option<&AddressForm>) {
        let zone = match &self.location {
            LocationState::InZone { zone, .. } => zone.clone(),
            _ => return,
        };
        match suggestion {
            Some(form) => self.address.prefill(form),
            None => self.address.prefill(&AddressForm {
                city: zone,
                ..Default::default()
            }),
        }
    }

    pub fn update_address(&mut self, form: AddressForm) -> Result<(), WizardError> {
        self.require_step(WizardStep::Address)?;
        if !self.address_editable() {
            return Err(WizardError::AddressLocked);
        }
        self.address = form;
        Ok(())
    }

    fn validate_address(&self, geofence: &GeofenceValidator) -> Result<(), WizardError> {
        match &self.location {
            LocationState::NotAttempted => return Err(WizardError::LocationNotAttempted),
            LocationState::Pending => return Err(WizardError::LocationInFlight),
            LocationState::OutOfZone { .. } => {
                return Err(WizardError::OutOfServiceZone {
                    served: geofence.served_names(),
                })
            }
            LocationState::Failed { error } => return Err(WizardError::LocationFailed(*error)),
            LocationState::InZone { .. } => {}
        }
        let missing = self.address.missing_fields();
        if !missing.is_empty() {
            return Err(WizardError::IncompleteAddress { fields: missing });
        }
        Ok(())
    }

    // ── paso 4: fecha y hora ───────────────────────────────────────

    pub fn set_schedule(&mut self, date: Option<String>, time: Option<String>) -> Result<(), WizardError> {
        self.require_step(WizardStep::Datetime)?;
        self.date = date.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());
        self.time = time.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        Ok(())
    }

    fn validate_schedule(&self, today: NaiveDate) -> Result<(), WizardError> {
        let raw_date = self.date.as_deref().ok_or(WizardError::MissingDate)?;
        let date = validate_date(raw_date).map_err(|_| WizardError::InvalidDate(raw_date.to_string()))?;
        if date < today {
            return Err(WizardError::DateInPast { date, today });
        }
        let time = self.time.as_deref().ok_or(WizardError::MissingTime)?;
        if !TIME_SLOTS.contains(&time) {
            return Err(WizardError::InvalidTimeSlot(time.to_string()));
        }
        Ok(())
    }

    // ── navegación ────────────────────────────────────────────────

    /// Avanza un paso si el paso actual es válido
    pub fn next(&mut self, today: NaiveDate, geofence: &GeofenceValidator) -> Result<WizardStep, WizardError> {
        match self.step {
            WizardStep::Weights => {
                let weights = self.validate_weights()?;
                for (item, weight) in self.items.iter_mut().zip(weights) {
                    item.weight = weight;
                }
            }
            WizardStep::Images => self.validate_images()?,
            WizardStep::Address => self.validate_address(geofence)?,
            WizardStep::Datetime => self.validate_schedule(today)?,
            WizardStep::Confirmation => return Err(WizardError::AtLastStep),
        }

        // `next` existe para todos los pasos salvo confirmación, ya descartada arriba
        let next = self.step.next().ok_or(WizardError::AtLastStep)?;
        debug!("➡️ {:?} → {:?} ({})", self.step, next, self.user_phone);
        self.step = next;
        Ok(next)
    }

    pub fn back(&mut self) -> BackOutcome {
        match self.step.previous() {
            Some(previous) => {
                debug!("⬅️ {:?} → {:?} ({})", self.step, previous, self.user_phone);
                self.step = previous;
                BackOutcome::Moved(previous)
            }
            None => {
                info!("🗑️ Asistente cancelado por {}", self.user_phone);
                BackOutcome::Cancelled
            }
        }
    }

    pub fn ensure_submittable(&self) -> Result<(), WizardError> {
        if self.step != WizardStep::Confirmation {
            return Err(WizardError::NotReadyToSubmit);
        }
        Ok(())
    }

    /// Transición terminal: consume el asistente y devuelve la solicitud ensamblada.
    /// La fecha se vuelve a comprobar contra `today`.
    pub fn submit(self, today: NaiveDate) -> Result<NewPickupRequest, WizardError> {
        self.ensure_submittable()?;
        self.validate_schedule(today)?;
        let (date, time) = match (self.date, self.time) {
            (Some(date), Some(time)) => (date, time),
            (None, _) => return Err(WizardError::MissingDate),
            (_, None) => return Err(WizardError::MissingTime),
        };
        Ok(NewPickupRequest {
            user_phone: self.user_phone,
            scrap_items: self.items,
            address: self.address.full_address(),
            date,
            time,
        })
    }
}
