//! Yield prediction HTTP handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::error::AppError;
use crate::services::yield_prediction::{PredictYieldInput, YieldService};
use crate::AppState;

/// List registered scoring models
pub async fn list_models(State(state): State<AppState>) -> impl IntoResponse {
    let service = YieldService::new(state.reference.clone());

    (
        StatusCode::OK,
        Json(serde_json::json!({ "models": service.models() })),
    )
}

/// List known crop profiles
pub async fn list_crops(State(state): State<AppState>) -> impl IntoResponse {
    let service = YieldService::new(state.reference.clone());

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "crops": service.crops(),
            "default": state.reference.default_crop(),
        })),
    )
}

/// Predict yield from a weather summary or a field location
pub async fn predict_yield(
    State(state): State<AppState>,
    payload: Result<Json<PredictYieldInput>, JsonRejection>,
) -> impl IntoResponse {
    let Json(input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return AppError::from(rejection).into_response(),
    };
    let service = state.yield_service();
    let as_of = state.clock.now().date_naive();

    match service.predict(input, as_of).await {
        Ok(prediction) => (StatusCode::OK, Json(prediction)).into_response(),
        Err(e) => e.into_response(),
    }
}
