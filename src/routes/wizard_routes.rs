use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::wizard_session_controller::WizardSessionController;
use crate::dto::wizard_dto::{
    AttachImageRequest, BackResponse, PresetRequest, ScheduleRequest, SetWeightsRequest,
    StartWizardRequest, WizardSnapshot,
};
use crate::dto::ApiResponse;
use crate::models::{AddressForm, PickupRequest, ScrapType};
use crate::services::location_service::LocationOutcome;
use crate::state::AppState;
use crate::utils::errors::AppError;

type SnapshotResponse = Result<Json<ApiResponse<WizardSnapshot>>, AppError>;

pub fn create_wizard_router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_wizard))
        .route("/:id", get(get_wizard).delete(cancel_wizard))
        .route("/:id/weights", put(set_weights))
        .route("/:id/weights/preset", post(apply_preset))
        .route("/:id/images", post(attach_image))
        .route("/:id/images/:scrap_type/:index", delete(remove_image))
        .route("/:id/location/start", post(begin_location))
        .route("/:id/location", post(complete_location))
        .route("/:id/address", put(update_address))
        .route("/:id/schedule", put(set_schedule))
        .route("/:id/next", post(next_step))
        .route("/:id/back", post(previous_step))
        .route("/:id/submit", post(submit))
}

async fn start_wizard(
    State(state): State<AppState>,
    Json(request): Json<StartWizardRequest>,
) -> SnapshotResponse {
    let controller = WizardSessionController::new(state);
    let snapshot = controller.start(request).await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

async fn get_wizard(State(state): State<AppState>, Path(id): Path<Uuid>) -> SnapshotResponse {
    let controller = WizardSessionController::new(state);
    Ok(Json(ApiResponse::success(controller.snapshot(id).await?)))
}

async fn cancel_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = WizardSessionController::new(state);
    controller.cancel(id).await?;
    Ok(Json(ApiResponse::message_only("Request cancelled")))
}

async fn set_weights(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetWeightsRequest>,
) -> SnapshotResponse {
    let controller = WizardSessionController::new(state);
    Ok(Json(ApiResponse::success(controller.set_weights(id, request).await?)))
}

async fn apply_preset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PresetRequest>,
) -> SnapshotResponse {
    let controller = WizardSessionController::new(state);
    Ok(Json(ApiResponse::success(controller.apply_preset(id, request).await?)))
}

async fn attach_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AttachImageRequest>,
) -> SnapshotResponse {
    let controller = WizardSessionController::new(state);
    Ok(Json(ApiResponse::success(controller.attach_image(id, request).await?)))
}

async fn remove_image(
    State(state): State<AppState>,
    Path((id, scrap_type, index)): Path<(Uuid, String, usize)>,
) -> SnapshotResponse {
    let scrap_type: ScrapType = scrap_type.parse().map_err(AppError::BadRequest)?;
    let controller = WizardSessionController::new(state);
    Ok(Json(ApiResponse::success(
        controller.remove_image(id, scrap_type, index).await?,
    )))
}

async fn begin_location(State(state): State<AppState>, Path(id): Path<Uuid>) -> SnapshotResponse {
    let controller = WizardSessionController::new(state);
    Ok(Json(ApiResponse::success(controller.begin_location(id).await?)))
}

async fn complete_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(outcome): Json<LocationOutcome>,
) -> SnapshotResponse {
    let controller = WizardSessionController::new(state);
    Ok(Json(ApiResponse::success(
        controller.complete_location(id, outcome).await?,
    )))
}

async fn update_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<AddressForm>,
) -> SnapshotResponse {
    let controller = WizardSessionController::new(state);
    Ok(Json(ApiResponse::success(controller.update_address(id, form).await?)))
}

async fn set_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ScheduleRequest>,
) -> SnapshotResponse {
    let controller = WizardSessionController::new(state);
    Ok(Json(ApiResponse::success(controller.set_schedule(id, request).await?)))
}

async fn next_step(State(state): State<AppState>, Path(id): Path<Uuid>) -> SnapshotResponse {
    let controller = WizardSessionController::new(state);
    Ok(Json(ApiResponse::success(controller.next(id).await?)))
}

async fn previous_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BackResponse>>, AppError> {
    let controller = WizardSessionController::new(state);
    Ok(Json(ApiResponse::success(controller.back(id).await?)))
}

async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PickupRequest>>, AppError> {
    let controller = WizardSessionController::new(state);
    let request = controller.submit(id).await?;
    Ok(Json(ApiResponse::success_with_message(
        request,
        "Pickup request submitted successfully!",
    )))
}
