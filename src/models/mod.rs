//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos tal como se serializan
//! en el almacén local de registros.

pub mod address;
pub mod pickup_request;
pub mod scrap;
pub mod service_zone;
pub mod support_message;
pub mod user;

pub use address::{AddressForm, Coordinates};
pub use pickup_request::{NewPickupRequest, PickupRequest, RequestStatus, StatusAction, Transition};
pub use scrap::{ImageBlob, ImageBlobError, ScrapItem, ScrapType};
pub use service_zone::{ServiceZone, SERVICE_ZONES};
pub use support_message::{MessageStatus, SupportMessage};
pub use user::UserProfile;
