use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::controllers::wizard_controller::{
    LocationState, PickupWizard, WizardStep, TIME_SLOTS, WEIGHT_PRESETS,
};
use crate::models::{AddressForm, ScrapType};
use crate::utils::validation::validate_phone;

// Request para iniciar el asistente
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartWizardRequest {
    #[validate(custom = "validate_phone")]
    pub user_phone: String,
    pub scrap_types: Vec<ScrapType>,
}

#[derive(Debug, Deserialize)]
pub struct WeightEntry {
    #[serde(rename = "type")]
    pub scrap_type: ScrapType,
    /// Texto tal cual lo escribió el usuario
    pub weight: String,
}

#[derive(Debug, Deserialize)]
pub struct SetWeightsRequest {
    pub weights: Vec<WeightEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PresetRequest {
    #[serde(rename = "type")]
    pub scrap_type: ScrapType,
    pub preset: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachImageRequest {
    #[serde(rename = "type")]
    pub scrap_type: ScrapType,
    pub data_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    #[serde(rename = "type")]
    pub scrap_type: ScrapType,
    pub label: &'static str,
    pub raw_weight: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub weight: Decimal,
    pub image_count: usize,
}

/// Vista del asistente para el cliente; las imágenes se resumen en un contador
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub id: Uuid,
    pub user_phone: String,
    pub step: WizardStep,
    pub step_title: &'static str,
    pub progress: u8,
    pub items: Vec<ItemView>,
    pub location: LocationState,
    pub address: AddressForm,
    pub address_editable: bool,
    pub date: Option<String>,
    pub time: Option<String>,
    pub weight_presets: &'static [u32],
    pub time_slots: &'static [&'static str],
}

impl WizardSnapshot {
    pub fn from_wizard(id: Uuid, wizard: &PickupWizard) -> Self {
        let items = wizard
            .items()
            .iter()
            .zip(wizard.raw_weights())
            .map(|(item, raw)| ItemView {
                scrap_type: item.scrap_type,
                label: item.scrap_type.label(),
                raw_weight: raw.clone(),
                weight: item.weight,
                image_count: item.images.len(),
            })
            .collect();

        Self {
            id,
            user_phone: wizard.user_phone().to_string(),
            step: wizard.step(),
            step_title: wizard.step().title(),
            progress: wizard.step().progress(),
            items,
            location: wizard.location().clone(),
            address: wizard.address().clone(),
            address_editable: wizard.address_editable(),
            date: wizard.date().map(str::to_string),
            time: wizard.time().map(str::to_string),
            weight_presets: &WEIGHT_PRESETS,
            time_slots: &TIME_SLOTS,
        }
    }
}

/// Resultado de retroceder: sin snapshot cuando el asistente se canceló
#[derive(Debug, Serialize)]
pub struct BackResponse {
    pub cancelled: bool,
    pub wizard: Option<WizardSnapshot>,
}
