//! Sesiones del asistente
//!
//! Cada asistente en curso vive en memoria bajo un id; al enviarse se
//! persiste la solicitud, se activa el aviso de "nueva solicitud" y se
//! notifica al administrador. Los asistentes sin actividad durante
//! `wizard_idle_ttl` se descartan.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::controllers::wizard_controller::{BackOutcome, LocationState, PickupWizard, WizardError};
use crate::dto::wizard_dto::{
    AttachImageRequest, BackResponse, PresetRequest, ScheduleRequest, SetWeightsRequest,
    StartWizardRequest, WizardSnapshot,
};
use crate::models::{AddressForm, ImageBlob, PickupRequest, ScrapType};
use crate::repositories::record_store::NEW_PICKUP_REQUEST_FLAG;
use crate::services::location_service::LocationOutcome;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

/// Asistente en curso y el momento de su última actividad
#[derive(Debug, Clone)]
pub struct WizardSession {
    pub wizard: PickupWizard,
    pub touched_at: DateTime<Utc>,
}

impl WizardSession {
    pub fn new(wizard: PickupWizard, now: DateTime<Utc>) -> Self {
        Self {
            wizard,
            touched_at: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.touched_at = now;
    }

    pub fn is_idle(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match (now - self.touched_at).to_std() {
            Ok(idle) => idle > ttl,
            // reloj por detrás de la última actividad
            Err(_) => false,
        }
    }
}

pub struct WizardSessionController {
    state: AppState,
}

impl WizardSessionController {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn start(&self, request: StartWizardRequest) -> Result<WizardSnapshot, AppError> {
        request.validate()?;
        let wizard = PickupWizard::start(request.user_phone, &request.scrap_types)?;
        let id = Uuid::new_v4();
        let snapshot = WizardSnapshot::from_wizard(id, &wizard);

        self.state.evict_idle_wizards().await;
        let now = self.state.store.clock().now();
        self.state
            .wizards
            .write()
            .await
            .insert(id, WizardSession::new(wizard, now));
        info!("🧭 Asistente {} iniciado", id);
        Ok(snapshot)
    }

    pub async fn snapshot(&self, id: Uuid) -> Result<WizardSnapshot, AppError> {
        let wizards = self.state.wizards.read().await;
        let session = wizards
            .get(&id)
            .ok_or_else(|| not_found_error("Wizard", &id.to_string()))?;
        Ok(WizardSnapshot::from_wizard(id, &session.wizard))
    }

    pub async fn cancel(&self, id: Uuid) -> Result<(), AppError> {
        self.state
            .wizards
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| not_found_error("Wizard", &id.to_string()))?;
        info!("🗑️ Asistente {} descartado", id);
        Ok(())
    }

    /// Aplica un cambio al asistente y devuelve el snapshot resultante
    async fn update<F>(&self, id: Uuid, f: F) -> Result<WizardSnapshot, AppError>
    where
        F: FnOnce(&mut PickupWizard) -> Result<(), WizardError>,
    {
        let now = self.state.store.clock().now();
        let mut wizards = self.state.wizards.write().await;
        let session = wizards
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Wizard", &id.to_string()))?;
        session.touch(now);
        f(&mut session.wizard)?;
        Ok(WizardSnapshot::from_wizard(id, &session.wizard))
    }

    pub async fn set_weights(&self, id: Uuid, request: SetWeightsRequest) -> Result<WizardSnapshot, AppError> {
        self.update(id, |wizard| {
            for entry in &request.weights {
                wizard.set_weight(entry.scrap_type, &entry.weight)?;
            }
            Ok(())
        })
        .await
    }

    pub async fn apply_preset(&self, id: Uuid, request: PresetRequest) -> Result<WizardSnapshot, AppError> {
        self.update(id, |wizard| wizard.apply_preset(request.scrap_type, request.preset))
            .await
    }

    pub async fn attach_image(&self, id: Uuid, request: AttachImageRequest) -> Result<WizardSnapshot, AppError> {
        let image = ImageBlob::parse(&request.data_url, self.state.config.max_image_bytes)
            .map_err(WizardError::from)?;
        self.update(id, |wizard| {
            wizard.attach_image(request.scrap_type, image).map(|_| ())
        })
        .await
    }

    pub async fn remove_image(&self, id: Uuid, scrap_type: ScrapType, index: usize) -> Result<WizardSnapshot, AppError> {
        self.update(id, |wizard| wizard.remove_image(scrap_type, index)).await
    }

    pub async fn begin_location(&self, id: Uuid) -> Result<WizardSnapshot, AppError> {
        self.update(id, PickupWizard::begin_location_attempt).await
    }

    /// Registra el resultado de la geolocalización y, dentro de zona,
    /// intenta rellenar la dirección por geocodificación inversa.
    pub async fn complete_location(&self, id: Uuid, outcome: LocationOutcome) -> Result<WizardSnapshot, AppError> {
        let geofence = self.state.geofence.clone();
        let now = self.state.store.clock().now();
        let fix = {
            let mut wizards = self.state.wizards.write().await;
            let session = wizards
                .get_mut(&id)
                .ok_or_else(|| not_found_error("Wizard", &id.to_string()))?;
            session.touch(now);
            match session.wizard.complete_location_attempt(outcome, &geofence)? {
                LocationState::InZone { coordinates, .. } => Some(*coordinates),
                _ => None,
            }
        };

        let Some(point) = fix else {
            return self.snapshot(id).await;
        };

        // sin el lock: la llamada HTTP puede tardar
        let suggestion = match self.state.geocoder.reverse(point).await {
            Ok(form) => Some(form),
            Err(e) => {
                warn!("⚠️ Geocodificación inversa no disponible: {}", e);
                None
            }
        };

        self.update(id, |wizard| {
            // otro intento pudo cambiar la posición mientras tanto
            if matches!(wizard.location(), LocationState::InZone { coordinates, .. } if *coordinates == point) {
                wizard.apply_address_suggestion(suggestion.as_ref());
            }
            Ok(())
        })
        .await
    }

    pub async fn update_address(&self, id: Uuid, form: AddressForm) -> Result<WizardSnapshot, AppError> {
        form.validate()?;
        self.update(id, |wizard| wizard.update_address(form)).await
    }

    pub async fn set_schedule(&self, id: Uuid, request: ScheduleRequest) -> Result<WizardSnapshot, AppError> {
        self.update(id, |wizard| wizard.set_schedule(request.date, request.time))
            .await
    }

    pub async fn next(&self, id: Uuid) -> Result<WizardSnapshot, AppError> {
        let today = self.state.store.clock().today();
        let geofence = self.state.geofence.clone();
        self.update(id, |wizard| wizard.next(today, &geofence).map(|_| ()))
            .await
    }

    pub async fn back(&self, id: Uuid) -> Result<BackResponse, AppError> {
        let now = self.state.store.clock().now();
        let mut wizards = self.state.wizards.write().await;
        let session = wizards
            .get_mut(&id)
            .ok_or_else(|| not_found_error("Wizard", &id.to_string()))?;
        session.touch(now);

        match session.wizard.back() {
            BackOutcome::Moved(_) => Ok(BackResponse {
                cancelled: false,
                wizard: Some(WizardSnapshot::from_wizard(id, &session.wizard)),
            }),
            BackOutcome::Cancelled => {
                wizards.remove(&id);
                Ok(BackResponse {
                    cancelled: true,
                    wizard: None,
                })
            }
        }
    }

    /// Envía la solicitud: persiste, marca el aviso y notifica al administrador.
    /// El asistente solo se descarta si la solicitud quedó guardada.
    pub async fn submit(&self, id: Uuid) -> Result<PickupRequest, AppError> {
        let store = &self.state.store;
        let today = store.clock().today();
        let request = {
            let mut wizards = self.state.wizards.write().await;
            let session = wizards
                .get(&id)
                .ok_or_else(|| not_found_error("Wizard", &id.to_string()))?;
            let draft = session.wizard.clone().submit(today)?;
            let request = store.append_request(draft)?;
            wizards.remove(&id);
            request
        };

        store.set_flag(NEW_PICKUP_REQUEST_FLAG)?;

        let user_name = store
            .load_profile(&request.user_phone)
            .and_then(|profile| profile.name)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| request.user_phone.clone());
        self.state
            .notifier
            .notify_new_request(store, &user_name, &request.scrap_labels());

        info!("✅ Solicitud {} enviada desde el asistente {}", request.id, id);
        Ok(request)
    }
}
