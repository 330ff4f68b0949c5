//! Almacén local de registros
//!
//! Colecciones tipadas (solicitudes, mensajes, perfiles) serializadas como
//! JSON bajo claves fijas, más los indicadores booleanos de "nuevo elemento".
//! Toda lectura pasa por un paso de validación/migración: los registros
//! malformados se descartan y nunca llegan al llamador.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::storage::{KeyValueStorage, StoreError};
use crate::models::{
    MessageStatus, NewPickupRequest, PickupRequest, RequestStatus, SupportMessage, UserProfile,
};
use crate::services::clock::Clock;

pub const PICKUP_REQUESTS_KEY: &str = "pickupRequests";
pub const SUPPORT_MESSAGES_KEY: &str = "supportMessages";
pub const USER_PROFILES_KEY: &str = "userProfiles";
pub const NEW_PICKUP_REQUEST_FLAG: &str = "hasNewPickupRequest";
pub const NEW_SUPPORT_MESSAGE_FLAG: &str = "hasNewSupportMessage";
pub const ADMIN_NOTIFICATIONS_KEY: &str = "adminNotificationsEnabled";

/// Registro persistible en una colección
pub trait Record: Serialize + DeserializeOwned {
    const KEY: &'static str;

    /// Corrige formatos heredados antes de deserializar
    fn migrate(_value: &mut Value) {}

    /// Invariantes que serde no puede expresar
    fn check_integrity(&self) -> Result<(), String> {
        Ok(())
    }
}

impl Record for PickupRequest {
    const KEY: &'static str = PICKUP_REQUESTS_KEY;

    fn migrate(value: &mut Value) {
        stringify_id(value);
        lowercase_field(value, "status");
        if let Some(items) = value.get_mut("scrapItems").and_then(Value::as_array_mut) {
            for item in items {
                lowercase_field(item, "type");
                if let Some(obj) = item.as_object_mut() {
                    obj.entry("images").or_insert_with(|| Value::Array(Vec::new()));
                }
            }
        }
    }

    fn check_integrity(&self) -> Result<(), String> {
        PickupRequest::check_integrity(self)
    }
}

impl Record for SupportMessage {
    const KEY: &'static str = SUPPORT_MESSAGES_KEY;

    fn migrate(value: &mut Value) {
        stringify_id(value);
        lowercase_field(value, "status");
        if let Some(obj) = value.as_object_mut() {
            obj.entry("userName")
                .or_insert_with(|| Value::String(crate::models::user::DEFAULT_USER_NAME.to_string()));
        }
    }

    fn check_integrity(&self) -> Result<(), String> {
        SupportMessage::check_integrity(self)
    }
}

// Los ids antiguos eran marcas de tiempo numéricas
fn stringify_id(value: &mut Value) {
    if let Some(id) = value.get_mut("id") {
        let numeric = match id {
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
        if let Some(text) = numeric {
            *id = Value::String(text);
        }
    }
}

fn lowercase_field(value: &mut Value, field: &str) {
    if let Some(Value::String(s)) = value.get_mut(field) {
        *s = s.trim().to_lowercase();
    }
}

/// Colección leída junto con su token de revisión
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub records: Vec<T>,
    pub revision: Option<String>,
}

/// Repositorio de registros sobre un almacenamiento clave-valor inyectado
#[derive(Clone)]
pub struct RecordStore {
    storage: Arc<dyn KeyValueStorage>,
    clock: Arc<dyn Clock>,
    commit_lock: Arc<Mutex<()>>,
}

fn revision_of(raw: &str) -> String {
    format!("{:x}", md5::compute(raw.as_bytes()))
}

impl RecordStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            commit_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("⚠️ No se pudo leer '{}', se trata como vacío: {}", key, e);
                None
            }
        }
    }

    fn parse_collection<T: Record>(raw: &str) -> Vec<T> {
        let values = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(values)) => values,
            Ok(_) => {
                warn!("⚠️ '{}' no contiene una lista, se trata como vacía", T::KEY);
                return Vec::new();
            }
            Err(e) => {
                warn!("⚠️ '{}' corrupto, se trata como vacío: {}", T::KEY, e);
                return Vec::new();
            }
        };

        let total = values.len();
        let records: Vec<T> = values
            .into_iter()
            .enumerate()
            .filter_map(|(index, mut value)| {
                T::migrate(&mut value);
                let record = match serde_json::from_value::<T>(value) {
                    Ok(record) => record,
                    Err(e) => {
                        warn!("⚠️ Registro {} de '{}' descartado: {}", index, T::KEY, e);
                        return None;
                    }
                };
                match record.check_integrity() {
                    Ok(()) => Some(record),
                    Err(reason) => {
                        warn!("⚠️ Registro {} de '{}' descartado: {}", index, T::KEY, reason);
                        None
                    }
                }
            })
            .collect();

        if records.len() != total {
            info!("🧹 '{}': {} de {} registros válidos", T::KEY, records.len(), total);
        }
        records
    }

    /// Lee la colección completa. Nunca falla: clave ausente o corrupta ⇒ lista vacía.
    pub fn load_all<T: Record>(&self) -> Vec<T> {
        self.load_versioned().records
    }

    pub fn load_versioned<T: Record>(&self) -> Versioned<T> {
        match self.read_raw(T::KEY) {
            Some(raw) => Versioned {
                revision: Some(revision_of(&raw)),
                records: Self::parse_collection(&raw),
            },
            None => Versioned {
                records: Vec::new(),
                revision: None,
            },
        }
    }

    /// Sobrescribe la colección completa
    pub fn save_all<T: Record>(&self, records: &[T]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(records)?;
        self.storage.set(T::KEY, &raw)?;
        debug!("💾 '{}' guardado con {} registros", T::KEY, records.len());
        Ok(())
    }

    /// Guarda solo si nadie escribió la colección desde que se leyó
    pub fn save_if_unchanged<T: Record>(
        &self,
        records: &[T],
        expected_revision: Option<&str>,
    ) -> Result<(), StoreError> {
        let _guard = self.commit_lock.lock().map_err(|_| StoreError::Poisoned)?;
        self.check_revision(T::KEY, expected_revision)?;
        self.save_all(records)
    }

    fn check_revision(&self, key: &str, expected: Option<&str>) -> Result<(), StoreError> {
        let current = self.storage.get(key)?.map(|raw| revision_of(&raw));
        if current.as_deref() != expected {
            return Err(StoreError::StaleRevision {
                key: key.to_string(),
            });
        }
        Ok(())
    }

    /// Lectura-modificación-escritura de una colección.
    ///
    /// El cierre devuelve el resultado y si hubo cambios; sin cambios no se escribe.
    pub fn modify<T, R, E, F>(&self, f: F) -> Result<R, E>
    where
        T: Record,
        E: From<StoreError>,
        F: FnOnce(&mut Vec<T>) -> Result<(R, bool), E>,
    {
        let _guard = self.commit_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let Versioned {
            mut records,
            revision,
        } = self.load_versioned::<T>();
        let (result, changed) = f(&mut records)?;
        if changed {
            self.check_revision(T::KEY, revision.as_deref())?;
            self.save_all(&records)?;
        }
        Ok(result)
    }

    /// Añade una solicitud nueva asignando id, fecha de creación y estado inicial
    pub fn append_request(&self, draft: NewPickupRequest) -> Result<PickupRequest, StoreError> {
        let request = PickupRequest {
            id: Uuid::new_v4().to_string(),
            user_phone: draft.user_phone,
            scrap_items: draft.scrap_items,
            address: draft.address,
            date: draft.date,
            time: draft.time,
            status: RequestStatus::Pending,
            created_at: self.clock.now(),
        };

        self.modify(|requests: &mut Vec<PickupRequest>| {
            requests.push(request.clone());
            Ok::<_, StoreError>(((), true))
        })?;

        info!("📦 Solicitud {} guardada para {}", request.id, request.user_phone);
        Ok(request)
    }

    /// Inserta un mensaje de soporte al principio de la lista (más reciente primero)
    pub fn prepend_message(
        &self,
        user_phone: &str,
        user_name: &str,
        subject: &str,
        message: &str,
    ) -> Result<SupportMessage, StoreError> {
        let record = SupportMessage {
            id: Uuid::new_v4().to_string(),
            user_phone: user_phone.to_string(),
            user_name: user_name.to_string(),
            subject: subject.trim().to_string(),
            message: message.trim().to_string(),
            created_at: self.clock.now(),
            status: MessageStatus::Open,
        };

        self.modify(|messages: &mut Vec<SupportMessage>| {
            messages.insert(0, record.clone());
            Ok::<_, StoreError>(((), true))
        })?;

        info!("💬 Mensaje de soporte {} guardado", record.id);
        Ok(record)
    }

    /// Perfil por teléfono; cualquier problema de lectura equivale a "sin perfil"
    pub fn load_profile(&self, phone: &str) -> Option<UserProfile> {
        let raw = self.read_raw(USER_PROFILES_KEY)?;
        match serde_json::from_str::<HashMap<String, Value>>(&raw) {
            Ok(mut profiles) => profiles
                .remove(phone)
                .and_then(|value| serde_json::from_value(value).ok()),
            Err(e) => {
                warn!("⚠️ '{}' corrupto: {}", USER_PROFILES_KEY, e);
                None
            }
        }
    }

    pub fn set_flag(&self, name: &str) -> Result<(), StoreError> {
        self.storage.set(name, "true")
    }

    pub fn clear_flag(&self, name: &str) -> Result<(), StoreError> {
        self.storage.remove(name)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.read_raw(name).as_deref().map(str::trim) == Some("true")
    }

    /// Preferencia de notificaciones del administrador (activada por defecto)
    pub fn notifications_enabled(&self) -> bool {
        self.read_raw(ADMIN_NOTIFICATIONS_KEY).as_deref().map(str::trim) != Some("false")
    }

    pub fn set_notifications_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.storage
            .set(ADMIN_NOTIFICATIONS_KEY, if enabled { "true" } else { "false" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageBlob, ScrapItem, ScrapType};
    use crate::repositories::storage::MemoryStorage;
    use crate::services::clock::FixedClock;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn store() -> (RecordStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap());
        (RecordStore::new(storage.clone(), Arc::new(clock)), storage)
    }

    fn draft() -> NewPickupRequest {
        NewPickupRequest {
            user_phone: "9876543210".to_string(),
            scrap_items: vec![
                ScrapItem {
                    scrap_type: ScrapType::Metal,
                    weight: Decimal::new(105, 1),
                    images: vec![ImageBlob::parse("data:image/png;base64,iVBORw0KGgo=", 64).unwrap()],
                },
                ScrapItem {
                    scrap_type: ScrapType::Paper,
                    weight: Decimal::new(5, 0),
                    images: vec![],
                },
            ],
            address: "12 MG Road, Bangalore, Karnataka 560001".to_string(),
            date: "2026-10-21".to_string(),
            time: "10:00".to_string(),
        }
    }

    #[test]
    fn test_missing_and_corrupted_collections_load_empty() {
        let (store, storage) = store();
        assert!(store.load_all::<PickupRequest>().is_empty());

        storage.set(PICKUP_REQUESTS_KEY, "{not json").unwrap();
        assert!(store.load_all::<PickupRequest>().is_empty());

        storage.set(SUPPORT_MESSAGES_KEY, "{\"id\": 1}").unwrap();
        assert!(store.load_all::<SupportMessage>().is_empty());
    }

    #[test]
    fn test_append_then_reload_preserves_fields() {
        let (store, _) = store();
        let original = draft();
        let saved = store.append_request(original.clone()).unwrap();

        let reloaded = store.load_all::<PickupRequest>();
        assert_eq!(reloaded.len(), 1);
        let request = &reloaded[0];
        assert_eq!(request, &saved);
        assert_eq!(request.user_phone, original.user_phone);
        assert_eq!(request.scrap_items, original.scrap_items);
        assert_eq!(request.address, original.address);
        assert_eq!(request.date, original.date);
        assert_eq!(request.time, original.time);
        assert_eq!(request.status, RequestStatus::Pending);
        assert!(Uuid::parse_str(&request.id).is_ok());
        assert_eq!(request.created_at, store.clock().now());
    }

    #[test]
    fn test_malformed_records_are_dropped_individually() {
        let (store, storage) = store();
        let raw = r#"[
            {"id": 1700000000000, "userPhone": "111", "scrapItems": [{"type": "METAL", "weight": 4}],
             "address": "a", "date": "2026-10-21", "time": "09:00", "status": "Pending",
             "createdAt": "2026-10-19T08:00:00Z"},
            {"id": "broken", "userPhone": "222"},
            {"id": "dup", "userPhone": "333", "scrapItems": [{"type": "glass", "weight": 1, "images": []},
             {"type": "glass", "weight": 2, "images": []}], "address": "b", "date": "2026-10-21",
             "time": "09:00", "status": "pending", "createdAt": "2026-10-19T08:00:00Z"}
        ]"#;
        storage.set(PICKUP_REQUESTS_KEY, raw).unwrap();

        let requests = store.load_all::<PickupRequest>();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, "1700000000000");
        assert_eq!(requests[0].status, RequestStatus::Pending);
        assert_eq!(requests[0].scrap_items[0].scrap_type, ScrapType::Metal);
        assert!(requests[0].scrap_items[0].images.is_empty());
    }

    #[test]
    fn test_stale_revision_is_rejected() {
        let (store, storage) = store();
        store.append_request(draft()).unwrap();

        let snapshot = store.load_versioned::<PickupRequest>();
        // otra pestaña escribe entre medias
        store.append_request(draft()).unwrap();

        let result = store.save_if_unchanged(&snapshot.records, snapshot.revision.as_deref());
        assert!(matches!(result, Err(StoreError::StaleRevision { .. })));
        assert_eq!(store.load_all::<PickupRequest>().len(), 2);

        let fresh = store.load_versioned::<PickupRequest>();
        assert!(store
            .save_if_unchanged(&fresh.records, fresh.revision.as_deref())
            .is_ok());
        assert!(storage.exists(PICKUP_REQUESTS_KEY).unwrap());
    }

    #[test]
    fn test_messages_are_prepended() {
        let (store, _) = store();
        store.prepend_message("111", "Asha", "First", "hello").unwrap();
        store.prepend_message("111", "Asha", "Second", "again").unwrap();
        let messages = store.load_all::<SupportMessage>();
        assert_eq!(messages[0].subject, "Second");
        assert_eq!(messages[1].subject, "First");
        assert_eq!(messages[0].status, MessageStatus::Open);
    }

    #[test]
    fn test_flags_and_preferences() {
        let (store, _) = store();
        assert!(!store.flag(NEW_PICKUP_REQUEST_FLAG));
        store.set_flag(NEW_PICKUP_REQUEST_FLAG).unwrap();
        assert!(store.flag(NEW_PICKUP_REQUEST_FLAG));
        store.clear_flag(NEW_PICKUP_REQUEST_FLAG).unwrap();
        assert!(!store.flag(NEW_PICKUP_REQUEST_FLAG));

        assert!(store.notifications_enabled());
        store.set_notifications_enabled(false).unwrap();
        assert!(!store.notifications_enabled());
    }

    #[test]
    fn test_load_profile() {
        let (store, storage) = store();
        assert!(store.load_profile("111").is_none());
        storage
            .set(USER_PROFILES_KEY, r#"{"111": {"name": "Asha"}}"#)
            .unwrap();
        assert_eq!(store.load_profile("111").unwrap().display_name(), "Asha");
        assert!(store.load_profile("222").is_none());
    }
}
