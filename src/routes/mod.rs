//! Rutas HTTP
//!
//! Cada módulo expone un `Router<AppState>` que se anida bajo `/api`.

pub mod admin_routes;
pub mod user_routes;
pub mod wizard_routes;
pub mod zone_routes;

use axum::Router;

use crate::state::AppState;

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/wizard", wizard_routes::create_wizard_router())
        .nest("/admin", admin_routes::create_admin_router())
        .nest("/zones", zone_routes::create_zone_router())
        .merge(user_routes::create_user_router())
}
