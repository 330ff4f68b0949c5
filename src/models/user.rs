//! Perfil de usuario
//!
//! La gestión de perfiles vive fuera de este servicio; aquí solo se lee
//! el nombre para firmar los mensajes de soporte.

use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_NAME: &str = "User";

/// Perfil guardado bajo `userProfiles`, indexado por teléfono
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_USER_NAME)
    }
}
