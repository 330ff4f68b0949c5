//! Services module
//!
//! Este módulo contiene la lógica de negocio que no pertenece a un único
//! controlador: zonas de servicio, geolocalización, geocodificación inversa,
//! notificaciones y la fuente de tiempo.

pub mod clock;
pub mod geocoding_service;
pub mod geofence;
pub mod location_service;
pub mod notification_service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use geocoding_service::{DisabledGeocoder, GeocodingService, ReverseGeocoder};
pub use geofence::{GeofenceValidator, ZoneCheck};
pub use location_service::{LocationError, LocationOutcome};
pub use notification_service::{AdminNotification, LogNotifier, MemoryNotifier, NotificationService, NotificationSink};
