//! Controladores
//!
//! Lógica de cada pantalla: el asistente de solicitud, el historial del
//! usuario, el soporte y el panel de administración.

pub mod admin_controller;
pub mod requests_controller;
pub mod support_controller;
pub mod wizard_controller;
pub mod wizard_session_controller;
