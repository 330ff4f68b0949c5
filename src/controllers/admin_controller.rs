//! Panel de administración
//!
//! Filtrado y búsqueda de solicitudes, transiciones de estado, resolución de
//! mensajes de soporte, estadísticas y avisos de elementos nuevos.

use std::collections::HashSet;
use std::str::FromStr;

use tracing::info;

use crate::dto::admin_dto::{AdminAlerts, AdminStats, RequestFilterQuery};
use crate::models::{MessageStatus, PickupRequest, RequestStatus, StatusAction, SupportMessage, Transition};
use crate::repositories::record_store::{NEW_PICKUP_REQUEST_FLAG, NEW_SUPPORT_MESSAGE_FLAG};
use crate::repositories::RecordStore;
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Filtro del listado: estado (`None` = todos) y texto libre
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub query: Option<String>,
}

impl TryFrom<RequestFilterQuery> for RequestFilter {
    type Error = AppError;

    fn try_from(query: RequestFilterQuery) -> Result<Self, Self::Error> {
        let status = match query.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(RequestStatus::from_str(raw).map_err(AppError::BadRequest)?),
        };
        let query = query.q.map(|q| q.trim().to_string()).filter(|q| !q.is_empty());
        Ok(Self { status, query })
    }
}

impl RequestFilter {
    pub fn matches(&self, request: &PickupRequest) -> bool {
        if let Some(status) = self.status {
            if request.status != status {
                return false;
            }
        }
        match &self.query {
            Some(q) => request.matches_query(q),
            None => true,
        }
    }
}

pub struct AdminController {
    store: RecordStore,
}

impl AdminController {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub fn list_requests(&self, filter: &RequestFilter) -> Vec<PickupRequest> {
        self.store
            .load_all::<PickupRequest>()
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect()
    }

    /// Aplica una transición a una solicitud; repetirla es un no-op
    pub fn transition(&self, id: &str, action: StatusAction) -> AppResult<PickupRequest> {
        let updated = self.store.modify(|requests: &mut Vec<PickupRequest>| -> AppResult<_> {
            let request = requests
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| not_found_error("Pickup request", id))?;

            match request.status.apply(action).map_err(AppError::Conflict)? {
                Transition::Moved(target) => {
                    request.status = target;
                    Ok((request.clone(), true))
                }
                Transition::Unchanged => Ok((request.clone(), false)),
            }
        })?;

        info!("🛠️ Solicitud {} → {}", updated.id, updated.status);
        Ok(updated)
    }

    pub fn accept(&self, id: &str) -> AppResult<PickupRequest> {
        self.transition(id, StatusAction::Accept)
    }

    pub fn reject(&self, id: &str) -> AppResult<PickupRequest> {
        self.transition(id, StatusAction::Reject)
    }

    pub fn complete(&self, id: &str) -> AppResult<PickupRequest> {
        self.transition(id, StatusAction::Complete)
    }

    pub fn list_messages(&self) -> Vec<SupportMessage> {
        self.store.load_all()
    }

    pub fn resolve_message(&self, id: &str) -> AppResult<SupportMessage> {
        self.store.modify(|messages: &mut Vec<SupportMessage>| -> AppResult<_> {
            let message = messages
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| not_found_error("Support message", id))?;
            let changed = message.resolve();
            Ok((message.clone(), changed))
        })
    }

    pub fn stats(&self) -> AdminStats {
        let requests: Vec<PickupRequest> = self.store.load_all();
        let messages: Vec<SupportMessage> = self.store.load_all();

        let count = |status: RequestStatus| requests.iter().filter(|r| r.status == status).count();
        let users: HashSet<&str> = requests
            .iter()
            .map(|r| r.user_phone.as_str())
            .chain(messages.iter().map(|m| m.user_phone.as_str()))
            .collect();

        AdminStats {
            total_requests: requests.len(),
            pending: count(RequestStatus::Pending),
            scheduled: count(RequestStatus::Scheduled),
            completed: count(RequestStatus::Completed),
            rejected: count(RequestStatus::Rejected),
            open_messages: messages.iter().filter(|m| m.status == MessageStatus::Open).count(),
            total_users: users.len(),
        }
    }

    /// Lee y limpia los indicadores de elementos nuevos
    pub fn take_alerts(&self) -> AppResult<AdminAlerts> {
        let mut alerts = AdminAlerts::default();

        if self.store.flag(NEW_PICKUP_REQUEST_FLAG) {
            self.store.clear_flag(NEW_PICKUP_REQUEST_FLAG)?;
            let pending = self
                .store
                .load_all::<PickupRequest>()
                .iter()
                .filter(|r| r.status == RequestStatus::Pending)
                .count();
            info!("🔔 {} solicitudes pendientes", pending);
            alerts.new_requests = Some(pending);
        }

        if self.store.flag(NEW_SUPPORT_MESSAGE_FLAG) {
            self.store.clear_flag(NEW_SUPPORT_MESSAGE_FLAG)?;
            let open = self
                .store
                .load_all::<SupportMessage>()
                .iter()
                .filter(|m| m.status == MessageStatus::Open)
                .count();
            info!("🔔 {} mensajes abiertos", open);
            alerts.new_messages = Some(open);
        }

        Ok(alerts)
    }

    pub fn set_notifications_enabled(&self, enabled: bool) -> AppResult<bool> {
        self.store.set_notifications_enabled(enabled)?;
        info!("🔔 Notificaciones de administrador: {}", if enabled { "activadas" } else { "desactivadas" });
        Ok(enabled)
    }

    pub fn notifications_enabled(&self) -> bool {
        self.store.notifications_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::models::{NewPickupRequest, ScrapItem, ScrapType};
    use crate::repositories::MemoryStorage;
    use crate::services::clock::FixedClock;

    fn store() -> RecordStore {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap());
        RecordStore::new(Arc::new(MemoryStorage::new()), Arc::new(clock))
    }

    fn draft(phone: &str, address: &str) -> NewPickupRequest {
        NewPickupRequest {
            user_phone: phone.to_string(),
            scrap_items: vec![ScrapItem {
                weight: Decimal::new(10, 0),
                ..ScrapItem::empty(ScrapType::Metal)
            }],
            address: address.to_string(),
            date: "2026-10-20".to_string(),
            time: "09:00".to_string(),
        }
    }

    #[test]
    fn test_transitions_persist() {
        let store = store();
        let admin = AdminController::new(store.clone());
        let request = store.append_request(draft("9876543210", "MG Road, Bangalore")).unwrap();

        assert_eq!(admin.accept(&request.id).unwrap().status, RequestStatus::Scheduled);
        let reloaded: Vec<PickupRequest> = store.load_all();
        assert_eq!(reloaded[0].status, RequestStatus::Scheduled);

        // repetir es un no-op
        assert_eq!(admin.accept(&request.id).unwrap().status, RequestStatus::Scheduled);

        assert!(matches!(admin.reject(&request.id), Err(AppError::Conflict(_))));
        assert_eq!(store.load_all::<PickupRequest>()[0].status, RequestStatus::Scheduled);

        assert_eq!(admin.complete(&request.id).unwrap().status, RequestStatus::Completed);
        assert!(matches!(admin.accept("missing"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_filter_and_search() {
        let store = store();
        let admin = AdminController::new(store.clone());
        let a = store.append_request(draft("9876543210", "12 MG Road, Bangalore")).unwrap();
        store.append_request(draft("9123456789", "Park Street, Kolkata")).unwrap();
        admin.reject(&a.id).unwrap();

        let by_status = RequestFilter {
            status: Some(RequestStatus::Pending),
            query: None,
        };
        assert_eq!(admin.list_requests(&by_status).len(), 1);

        let by_address = RequestFilter {
            status: None,
            query: Some("kolkata".to_string()),
        };
        assert_eq!(admin.list_requests(&by_address)[0].user_phone, "9123456789");

        let by_phone = RequestFilter {
            status: None,
            query: Some("98765".to_string()),
        };
        assert_eq!(admin.list_requests(&by_phone)[0].id, a.id);

        let by_id = RequestFilter {
            status: Some(RequestStatus::Rejected),
            query: Some(a.id[..8].to_string()),
        };
        assert_eq!(admin.list_requests(&by_id).len(), 1);
    }

    #[test]
    fn test_filter_from_query() {
        let all = RequestFilter::try_from(RequestFilterQuery {
            status: Some("all".to_string()),
            q: Some("  ".to_string()),
        })
        .unwrap();
        assert_eq!(all, RequestFilter::default());

        let scheduled = RequestFilter::try_from(RequestFilterQuery {
            status: Some("Scheduled".to_string()),
            q: None,
        })
        .unwrap();
        assert_eq!(scheduled.status, Some(RequestStatus::Scheduled));

        assert!(matches!(
            RequestFilter::try_from(RequestFilterQuery {
                status: Some("archived".to_string()),
                q: None,
            }),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_resolve_message_is_idempotent() {
        let store = store();
        let admin = AdminController::new(store.clone());
        let message = store
            .prepend_message("9876543210", "Asha", "Late pickup", "Nobody came")
            .unwrap();

        assert_eq!(admin.resolve_message(&message.id).unwrap().status, MessageStatus::Resolved);
        assert_eq!(admin.resolve_message(&message.id).unwrap().status, MessageStatus::Resolved);
        assert_eq!(admin.stats().open_messages, 0);
        assert!(matches!(admin.resolve_message("nope"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_stats_and_alerts() {
        let store = store();
        let admin = AdminController::new(store.clone());
        store.append_request(draft("9876543210", "A")).unwrap();
        let b = store.append_request(draft("9123456789", "B")).unwrap();
        admin.accept(&b.id).unwrap();
        store.prepend_message("9000000000", "User", "Hi", "Hello").unwrap();

        let stats = admin.stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.scheduled, 1);
        assert_eq!(stats.open_messages, 1);
        assert_eq!(stats.total_users, 3);

        assert_eq!(admin.take_alerts().unwrap(), AdminAlerts::default());
        store.set_flag(NEW_PICKUP_REQUEST_FLAG).unwrap();
        let alerts = admin.take_alerts().unwrap();
        assert_eq!(alerts.new_requests, Some(1));
        assert_eq!(alerts.new_messages, None);
        assert!(!store.flag(NEW_PICKUP_REQUEST_FLAG));
    }

    #[test]
    fn test_notification_preference() {
        let admin = AdminController::new(store());
        assert!(admin.notifications_enabled());
        assert!(!admin.set_notifications_enabled(false).unwrap());
        assert!(!admin.notifications_enabled());
    }
}
