use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::controllers::admin_controller::{AdminController, RequestFilter};
use crate::dto::admin_dto::{AdminAlerts, AdminStats, NotificationPreference, RequestFilterQuery};
use crate::dto::ApiResponse;
use crate::models::{PickupRequest, SupportMessage};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/requests", get(list_requests))
        .route("/requests/:id/accept", post(accept_request))
        .route("/requests/:id/reject", post(reject_request))
        .route("/requests/:id/complete", post(complete_request))
        .route("/messages", get(list_messages))
        .route("/messages/:id/resolve", post(resolve_message))
        .route("/stats", get(stats))
        .route("/alerts", post(take_alerts))
        .route("/notifications", get(notification_preference).put(set_notifications))
}

async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestFilterQuery>,
) -> Result<Json<ApiResponse<Vec<PickupRequest>>>, AppError> {
    let filter = RequestFilter::try_from(query)?;
    let controller = AdminController::new(state.store.clone());
    Ok(Json(ApiResponse::success(controller.list_requests(&filter))))
}

async fn accept_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PickupRequest>>, AppError> {
    let controller = AdminController::new(state.store.clone());
    Ok(Json(ApiResponse::success_with_message(
        controller.accept(&id)?,
        "Request accepted and scheduled",
    )))
}

async fn reject_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PickupRequest>>, AppError> {
    let controller = AdminController::new(state.store.clone());
    Ok(Json(ApiResponse::success_with_message(
        controller.reject(&id)?,
        "Request rejected",
    )))
}

async fn complete_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PickupRequest>>, AppError> {
    let controller = AdminController::new(state.store.clone());
    Ok(Json(ApiResponse::success_with_message(
        controller.complete(&id)?,
        "Request marked as completed",
    )))
}

async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SupportMessage>>>, AppError> {
    let controller = AdminController::new(state.store.clone());
    Ok(Json(ApiResponse::success(controller.list_messages())))
}

async fn resolve_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SupportMessage>>, AppError> {
    let controller = AdminController::new(state.store.clone());
    Ok(Json(ApiResponse::success_with_message(
        controller.resolve_message(&id)?,
        "Message marked as resolved",
    )))
}

async fn stats(State(state): State<AppState>) -> Result<Json<ApiResponse<AdminStats>>, AppError> {
    let controller = AdminController::new(state.store.clone());
    Ok(Json(ApiResponse::success(controller.stats())))
}

async fn take_alerts(State(state): State<AppState>) -> Result<Json<ApiResponse<AdminAlerts>>, AppError> {
    let controller = AdminController::new(state.store.clone());
    Ok(Json(ApiResponse::success(controller.take_alerts()?)))
}

async fn notification_preference(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<NotificationPreference>>, AppError> {
    let controller = AdminController::new(state.store.clone());
    Ok(Json(ApiResponse::success(NotificationPreference {
        enabled: controller.notifications_enabled(),
    })))
}

async fn set_notifications(
    State(state): State<AppState>,
    Json(request): Json<NotificationPreference>,
) -> Result<Json<ApiResponse<NotificationPreference>>, AppError> {
    let controller = AdminController::new(state.store.clone());
    let enabled = controller.set_notifications_enabled(request.enabled)?;
    Ok(Json(ApiResponse::success(NotificationPreference { enabled })))
}
