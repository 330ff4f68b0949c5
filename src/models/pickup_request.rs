use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::scrap::ScrapItem;
use crate::utils::validation::{validate_date, validate_hour_minute};

/// Estado de una solicitud de recogida
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Scheduled,
    Completed,
    Rejected,
}

/// Acción del administrador sobre una solicitud
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusAction {
    Accept,
    Reject,
    Complete,
}

impl StatusAction {
    pub fn target(&self) -> RequestStatus {
        match self {
            StatusAction::Accept => RequestStatus::Scheduled,
            StatusAction::Reject => RequestStatus::Rejected,
            StatusAction::Complete => RequestStatus::Completed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusAction::Accept => "accept",
            StatusAction::Reject => "reject",
            StatusAction::Complete => "complete",
        }
    }
}

/// Resultado de aplicar una acción sobre un estado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved(RequestStatus),
    Unchanged,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::Pending,
        RequestStatus::Scheduled,
        RequestStatus::Completed,
        RequestStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Scheduled => "scheduled",
            RequestStatus::Completed => "completed",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Rejected)
    }

    /// pending→scheduled, pending→rejected, scheduled→completed.
    /// Repetir la acción cuyo destino ya es el estado actual no cambia nada.
    pub fn apply(&self, action: StatusAction) -> Result<Transition, String> {
        let target = action.target();
        if *self == target {
            return Ok(Transition::Unchanged);
        }
        match (self, action) {
            (RequestStatus::Pending, StatusAction::Accept)
            | (RequestStatus::Pending, StatusAction::Reject)
            | (RequestStatus::Scheduled, StatusAction::Complete) => Ok(Transition::Moved(target)),
            (from, action) => Err(format!(
                "cannot {} a request that is {}",
                action.as_str(),
                from.as_str()
            )),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown request status '{}'", s))
    }
}

/// Solicitud ya persistida
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupRequest {
    pub id: String,
    pub user_phone: String,
    pub scrap_items: Vec<ScrapItem>,
    pub address: String,
    pub date: String,
    pub time: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// Solicitud ensamblada por el asistente, antes de que el almacén
/// le asigne id, fecha de creación y estado.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPickupRequest {
    pub user_phone: String,
    pub scrap_items: Vec<ScrapItem>,
    pub address: String,
    pub date: String,
    pub time: String,
}

impl PickupRequest {
    /// Comprueba los invariantes que no expresa el esquema serde
    pub fn check_integrity(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("empty id".to_string());
        }
        if self.scrap_items.is_empty() {
            return Err("no scrap items".to_string());
        }
        let mut seen = HashSet::new();
        for item in &self.scrap_items {
            if !seen.insert(item.scrap_type) {
                return Err(format!("duplicate scrap type {}", item.scrap_type));
            }
            if item.weight < Decimal::ZERO {
                return Err(format!("negative weight for {}", item.scrap_type));
            }
        }
        validate_date(&self.date).map_err(|_| format!("invalid date '{}'", self.date))?;
        validate_hour_minute(&self.time).map_err(|_| format!("invalid time '{}'", self.time))?;
        Ok(())
    }

    pub fn scrap_labels(&self) -> Vec<&'static str> {
        self.scrap_items.iter().map(|i| i.scrap_type.label()).collect()
    }

    pub fn total_weight(&self) -> Decimal {
        self.scrap_items.iter().map(|i| i.weight).sum()
    }

    /// Búsqueda libre: teléfono, dirección (sin mayúsculas) o id
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }
        self.user_phone.contains(query)
            || self.address.to_lowercase().contains(&query.to_lowercase())
            || self.id.contains(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scrap::{ScrapItem, ScrapType};

    fn sample() -> PickupRequest {
        PickupRequest {
            id: "req-1".to_string(),
            user_phone: "9876543210".to_string(),
            scrap_items: vec![ScrapItem::empty(ScrapType::Metal)],
            address: "12 MG Road, Bangalore, Karnataka 560001".to_string(),
            date: "2026-10-20".to_string(),
            time: "09:00".to_string(),
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_transitions() {
        use RequestStatus::*;
        use StatusAction::*;

        assert_eq!(Pending.apply(Accept), Ok(Transition::Moved(Scheduled)));
        assert_eq!(Pending.apply(Reject), Ok(Transition::Moved(Rejected)));
        assert_eq!(Scheduled.apply(Complete), Ok(Transition::Moved(Completed)));

        assert_eq!(Completed.apply(Complete), Ok(Transition::Unchanged));
        assert_eq!(Scheduled.apply(Accept), Ok(Transition::Unchanged));

        assert!(Pending.apply(Complete).is_err());
        assert!(Completed.apply(Reject).is_err());
        assert!(Rejected.apply(Accept).is_err());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["userPhone"], "9876543210");
        assert_eq!(value["status"], "pending");
        assert!(value["scrapItems"].is_array());
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn test_integrity_rejects_duplicate_types() {
        let mut request = sample();
        assert!(request.check_integrity().is_ok());
        request.scrap_items.push(ScrapItem::empty(ScrapType::Metal));
        assert!(request.check_integrity().is_err());
        request.scrap_items.clear();
        assert!(request.check_integrity().is_err());
    }

    #[test]
    fn test_integrity_rejects_malformed_schedule() {
        let mut request = sample();
        request.time = "9am".to_string();
        assert!(request.check_integrity().is_err());

        let mut request = sample();
        request.date = "20/10/2026".to_string();
        assert!(request.check_integrity().is_err());
    }

    #[test]
    fn test_matches_query() {
        let request = sample();
        assert!(request.matches_query(""));
        assert!(request.matches_query("98765"));
        assert!(request.matches_query("mg road"));
        assert!(request.matches_query("req-"));
        assert!(!request.matches_query("Chennai"));
    }
}
