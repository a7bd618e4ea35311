//! Route definitions for the AgroIntel decision engine

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/yield", yield_routes())
        .nest("/weather", weather_routes())
        .nest("/treatments", treatment_routes())
}

/// Yield prediction routes
fn yield_routes() -> Router<AppState> {
    Router::new()
        .route("/models", get(handlers::list_models))
        .route("/crops", get(handlers::list_crops))
        .route("/predict", post(handlers::predict_yield))
}

/// Historical weather routes
fn weather_routes() -> Router<AppState> {
    Router::new().route("/summary", get(handlers::get_weather_summary))
}

/// Treatment plan routes
fn treatment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_plans).post(handlers::create_plan))
        .route("/latest", get(handlers::get_latest_plan))
        .route("/:plan_id", get(handlers::get_plan))
        .route(
            "/:plan_id/steps/:step_id/complete",
            post(handlers::complete_step),
        )
}
