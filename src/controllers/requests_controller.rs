//! Historial de solicitudes de un usuario

use crate::dto::support_dto::{UserRequestStats, UserRequestsResponse};
use crate::models::{PickupRequest, RequestStatus};
use crate::repositories::RecordStore;

pub struct RequestsController {
    store: RecordStore,
}

impl RequestsController {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Solicitudes del teléfono indicado, la más reciente primero
    pub fn for_user(&self, phone: &str) -> UserRequestsResponse {
        let mut requests: Vec<PickupRequest> = self
            .store
            .load_all::<PickupRequest>()
            .into_iter()
            .filter(|r| r.user_phone == phone)
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let stats = UserRequestStats {
            total: requests.len(),
            pending: requests.iter().filter(|r| r.status == RequestStatus::Pending).count(),
            completed: requests.iter().filter(|r| r.status == RequestStatus::Completed).count(),
        };

        UserRequestsResponse { requests, stats }
    }
}
