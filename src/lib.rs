//! Scrap pickup scheduling service
//!
//! Asistente de solicitud de recogida en cinco pasos, validación de zona de
//! servicio, almacén local de registros y panel de administración, expuestos
//! como API JSON sobre axum.

pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{
    extract::{DefaultBodyLimit, State},
    response::Json,
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use middleware::cors::cors_layer;
use state::AppState;

/// Router completo de la aplicación
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    // las imágenes viajan en base64 dentro del JSON
    let body_limit = DefaultBodyLimit::max(state.config.request_body_limit());

    Router::new()
        .route("/health", get(health))
        .nest("/api", routes::create_api_router())
        .layer(body_limit)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Endpoint de salud
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "environment": state.config.environment,
        "open_wizards": state.open_wizards().await,
        "timestamp": state.store.clock().now().to_rfc3339(),
    }))
}
