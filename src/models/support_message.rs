use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Open,
    Resolved,
}

/// Mensaje enviado desde el formulario de soporte
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportMessage {
    pub id: String,
    pub user_phone: String,
    pub user_name: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub status: MessageStatus,
}

impl SupportMessage {
    pub fn check_integrity(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("empty id".to_string());
        }
        if self.subject.trim().is_empty() || self.message.trim().is_empty() {
            return Err("empty subject or message".to_string());
        }
        Ok(())
    }

    /// Resolver es idempotente: devuelve `false` si ya estaba resuelto
    pub fn resolve(&mut self) -> bool {
        if self.status == MessageStatus::Resolved {
            return false;
        }
        self.status = MessageStatus::Resolved;
        true
    }
}
