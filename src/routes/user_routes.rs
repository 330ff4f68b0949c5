use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::controllers::requests_controller::RequestsController;
use crate::controllers::support_controller::SupportController;
use crate::dto::support_dto::{SupportMessageRequest, UserRequestsResponse};
use crate::dto::ApiResponse;
use crate::models::SupportMessage;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_user_router() -> Router<AppState> {
    Router::new()
        .route("/users/:phone/requests", get(my_requests))
        .route("/support", post(send_support_message))
}

async fn my_requests(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<ApiResponse<UserRequestsResponse>>, AppError> {
    let controller = RequestsController::new(state.store.clone());
    Ok(Json(ApiResponse::success(controller.for_user(&phone))))
}

async fn send_support_message(
    State(state): State<AppState>,
    Json(request): Json<SupportMessageRequest>,
) -> Result<Json<ApiResponse<SupportMessage>>, AppError> {
    let controller = SupportController::new(state.store.clone());
    let message = controller.send(request)?;
    Ok(Json(ApiResponse::success_with_message(
        message,
        "Message sent successfully! We'll get back to you soon.",
    )))
}
