use serde::{Deserialize, Serialize};

// Query del listado de solicitudes: `status=all|pending|...` y `q` libre
#[derive(Debug, Default, Deserialize)]
pub struct RequestFilterQuery {
    pub status: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_requests: usize,
    pub pending: usize,
    pub scheduled: usize,
    pub completed: usize,
    pub rejected: usize,
    pub open_messages: usize,
    pub total_users: usize,
}

/// Avisos de elementos nuevos; `None` cuando el indicador no estaba activo
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAlerts {
    pub new_requests: Option<usize>,
    pub new_messages: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NotificationPreference {
    pub enabled: bool,
}
