//! Treatment plan HTTP handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::Diagnosis;
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

/// List all treatment plans in creation order
pub async fn list_plans(State(state): State<AppState>) -> impl IntoResponse {
    let service = state.treatment_service();
    let plans = service.list_plans().await;

    (StatusCode::OK, Json(serde_json::json!({ "plans": plans })))
}

/// Create a treatment plan for a diagnosis
pub async fn create_plan(
    State(state): State<AppState>,
    payload: Result<Json<Diagnosis>, JsonRejection>,
) -> impl IntoResponse {
    let Json(diagnosis) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };
    let service = state.treatment_service();

    match service.create_plan(&diagnosis).await {
        Ok(plan) => (StatusCode::CREATED, Json(plan)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Most recently created plan
pub async fn get_latest_plan(State(state): State<AppState>) -> impl IntoResponse {
    let service = state.treatment_service();

    match service.latest_plan().await {
        Some(plan) => (StatusCode::OK, Json(plan)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Get a treatment plan with its progress
pub async fn get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = state.treatment_service();

    match service.get_plan(plan_id).await {
        Ok(plan) => {
            let progress = plan.progress();
            (
                StatusCode::OK,
                Json(serde_json::json!({ "plan": plan, "progress": progress })),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Mark one step of a plan completed
pub async fn complete_step(
    State(state): State<AppState>,
    Path((plan_id, step_id)): Path<(Uuid, String)>,
) -> impl IntoResponse {
    let service = state.treatment_service();

    match service.complete_step(plan_id, &step_id).await {
        Ok(plan) => (StatusCode::OK, Json(plan)).into_response(),
        Err(e) => e.into_response(),
    }
}
