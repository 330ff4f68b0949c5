//! Avisos al administrador
//!
//! Cuando llega una solicitud nueva se emite una notificación por el canal
//! configurado, siempre que el administrador no las haya desactivado.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::info;

use crate::repositories::RecordStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminNotification {
    pub title: String,
    pub body: String,
    pub tag: String,
}

impl AdminNotification {
    pub fn new_pickup_request(user_name: &str, scrap_labels: &[&str]) -> Self {
        Self {
            title: "🔔 New Pickup Request - Scrap Square".to_string(),
            body: format!(
                "{} has requested pickup for: {}",
                user_name,
                scrap_labels.join(", ")
            ),
            tag: "new-pickup-request".to_string(),
        }
    }
}

/// Canal de entrega de notificaciones
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: &AdminNotification);
}

/// Canal por defecto: deja la notificación en el log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn deliver(&self, notification: &AdminNotification) {
        info!(tag = %notification.tag, "{} | {}", notification.title, notification.body);
    }
}

/// Canal que acumula las notificaciones en memoria
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    delivered: Mutex<Vec<AdminNotification>>,
}

impl MemoryNotifier {
    pub fn delivered(&self) -> Vec<AdminNotification> {
        self.delivered
            .lock()
            .map(|list| list.clone())
            .unwrap_or_default()
    }
}

impl NotificationSink for MemoryNotifier {
    fn deliver(&self, notification: &AdminNotification) {
        if let Ok(mut list) = self.delivered.lock() {
            list.push(notification.clone());
        }
    }
}

#[derive(Clone)]
pub struct NotificationService {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationService {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Devuelve `true` si la notificación se entregó
    pub fn notify_new_request(&self, store: &RecordStore, user_name: &str, scrap_labels: &[&str]) -> bool {
        if !store.notifications_enabled() {
            info!("🔕 Notificaciones de administrador desactivadas");
            return false;
        }
        self.sink
            .deliver(&AdminNotification::new_pickup_request(user_name, scrap_labels));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryStorage;
    use crate::services::clock::SystemClock;

    #[test]
    fn test_notification_body() {
        let n = AdminNotification::new_pickup_request("9876543210", &["Metal", "Plastic"]);
        assert_eq!(n.body, "9876543210 has requested pickup for: Metal, Plastic");
        assert_eq!(n.tag, "new-pickup-request");
    }

    #[test]
    fn test_respects_admin_preference() {
        let store = RecordStore::new(Arc::new(MemoryStorage::new()), Arc::new(SystemClock));
        let sink = Arc::new(MemoryNotifier::default());
        let service = NotificationService::new(sink.clone());

        assert!(service.notify_new_request(&store, "Asha", &["Glass"]));
        store.set_notifications_enabled(false).unwrap();
        assert!(!service.notify_new_request(&store, "Asha", &["Glass"]));
        assert_eq!(sink.delivered().len(), 1);
    }
}
