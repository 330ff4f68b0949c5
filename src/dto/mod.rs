//! DTOs de la API HTTP

pub mod admin_dto;
pub mod api_response;
pub mod support_dto;
pub mod wizard_dto;
pub mod zone_dto;

pub use api_response::ApiResponse;
