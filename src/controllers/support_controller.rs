//! Formulario de contacto con soporte

use tracing::info;
use validator::Validate;

use crate::dto::support_dto::SupportMessageRequest;
use crate::models::{user::DEFAULT_USER_NAME, SupportMessage};
use crate::repositories::record_store::NEW_SUPPORT_MESSAGE_FLAG;
use crate::repositories::RecordStore;
use crate::utils::errors::AppResult;

pub struct SupportController {
    store: RecordStore,
}

impl SupportController {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Guarda el mensaje (el más reciente primero) y avisa al administrador
    pub fn send(&self, request: SupportMessageRequest) -> AppResult<SupportMessage> {
        request.validate()?;

        let user_name = self
            .store
            .load_profile(&request.user_phone)
            .map(|profile| profile.display_name().to_string())
            .unwrap_or_else(|| DEFAULT_USER_NAME.to_string());

        let message = self.store.prepend_message(
            &request.user_phone,
            &user_name,
            &request.subject,
            &request.message,
        )?;
        self.store.set_flag(NEW_SUPPORT_MESSAGE_FLAG)?;

        info!("📨 Mensaje de soporte de {} ({})", user_name, message.user_phone);
        Ok(message)
    }
}
