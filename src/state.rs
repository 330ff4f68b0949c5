//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;
use crate::controllers::wizard_session_controller::WizardSession;
use crate::repositories::RecordStore;
use crate::services::geocoding_service::ReverseGeocoder;
use crate::services::geofence::GeofenceValidator;
use crate::services::notification_service::NotificationService;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub store: RecordStore,
    pub geofence: Arc<GeofenceValidator>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
    pub notifier: NotificationService,
    /// Asistentes en curso, por id de sesión
    pub wizards: Arc<RwLock<HashMap<Uuid, WizardSession>>>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        store: RecordStore,
        geocoder: Arc<dyn ReverseGeocoder>,
        notifier: NotificationService,
    ) -> Self {
        Self {
            config,
            store,
            geofence: Arc::new(GeofenceValidator::default()),
            geocoder,
            notifier,
            wizards: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Número de asistentes abiertos
    pub async fn open_wizards(&self) -> usize {
        self.wizards.read().await.len()
    }

    /// Descarta los asistentes inactivos más de `wizard_idle_ttl`
    pub async fn evict_idle_wizards(&self) -> usize {
        let now = self.store.clock().now();
        let ttl = self.config.wizard_idle_ttl;

        let mut wizards = self.wizards.write().await;
        let before = wizards.len();
        wizards.retain(|_, session| !session.is_idle(now, ttl));
        let evicted = before - wizards.len();

        if evicted > 0 {
            info!("🧹 {} asistentes inactivos descartados", evicted);
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};

    use crate::controllers::wizard_controller::PickupWizard;
    use crate::models::ScrapType;
    use crate::repositories::MemoryStorage;
    use crate::services::{DisabledGeocoder, FixedClock, MemoryNotifier};

    fn state() -> AppState {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap());
        let config = EnvironmentConfig {
            wizard_idle_ttl: Duration::from_secs(30 * 60),
            ..EnvironmentConfig::default()
        };
        AppState::new(
            config,
            RecordStore::new(Arc::new(MemoryStorage::new()), Arc::new(clock)),
            Arc::new(DisabledGeocoder),
            NotificationService::new(Arc::new(MemoryNotifier::default())),
        )
    }

    fn session_touched_at(hour: u32, minute: u32) -> WizardSession {
        let wizard = PickupWizard::start("9876543210", &[ScrapType::Metal]).unwrap();
        WizardSession::new(wizard, Utc.with_ymd_and_hms(2026, 10, 19, hour, minute, 0).unwrap())
    }

    #[tokio::test]
    async fn test_idle_wizards_are_evicted() {
        let state = state();
        let stale = Uuid::new_v4();
        let recent = Uuid::new_v4();
        let at_limit = Uuid::new_v4();
        {
            let mut wizards = state.wizards.write().await;
            wizards.insert(stale, session_touched_at(11, 0));
            wizards.insert(recent, session_touched_at(11, 55));
            wizards.insert(at_limit, session_touched_at(11, 30));
        }

        assert_eq!(state.evict_idle_wizards().await, 1);
        let wizards = state.wizards.read().await;
        assert!(!wizards.contains_key(&stale));
        assert!(wizards.contains_key(&recent));
        assert!(wizards.contains_key(&at_limit));
    }

    #[tokio::test]
    async fn test_future_activity_is_not_idle() {
        let state = state();
        state
            .wizards
            .write()
            .await
            .insert(Uuid::new_v4(), session_touched_at(13, 0));
        assert_eq!(state.evict_idle_wizards().await, 0);
        assert_eq!(state.open_wizards().await, 1);
    }
}
