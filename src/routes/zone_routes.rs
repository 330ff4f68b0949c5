use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::dto::zone_dto::ZoneCheckRequest;
use crate::dto::ApiResponse;
use crate::models::{Coordinates, ServiceZone};
use crate::services::geofence::ZoneCheck;
use crate::state::AppState;
use crate::utils::errors::{validation_error, AppError};

pub fn create_zone_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_zones))
        .route("/check", post(check_zone))
}

async fn list_zones(State(state): State<AppState>) -> Json<ApiResponse<Vec<ServiceZone>>> {
    Json(ApiResponse::success(state.geofence.zones().to_vec()))
}

async fn check_zone(
    State(state): State<AppState>,
    Json(request): Json<ZoneCheckRequest>,
) -> Result<Json<ApiResponse<ZoneCheck>>, AppError> {
    let point = Coordinates::new(request.latitude, request.longitude);
    let check = state
        .geofence
        .check_validated(point)
        .map_err(|_| validation_error("coordinates", "latitude must be within [-90, 90] and longitude within [-180, 180]"))?;
    Ok(Json(ApiResponse::success(check)))
}
