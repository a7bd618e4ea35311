//! HTTP handlers for historical weather summaries

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use shared::{GeoLocation, WeatherSummary};

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Query parameters for a weather summary
#[derive(Debug, Deserialize)]
pub struct WeatherSummaryQuery {
    pub lat: f64,
    pub lon: f64,
    pub days: Option<u32>,
}

/// Summarize recent weather for a location
pub async fn get_weather_summary(
    State(state): State<AppState>,
    Query(query): Query<WeatherSummaryQuery>,
) -> AppResult<Json<WeatherSummary>> {
    let location = GeoLocation::new(query.lat, query.lon);
    if !location.is_valid() {
        return Err(AppError::validation(
            "location",
            "Latitude must be within ±90 and longitude within ±180",
        ));
    }

    let provider = state
        .weather
        .as_ref()
        .ok_or(AppError::WeatherServiceUnavailable)?;

    let days = query
        .days
        .unwrap_or(state.config.weather.period_days)
        .clamp(1, 366);
    let as_of = state.clock.now().date_naive();

    let summary = provider.weather_summary(location, days, as_of).await?;
    Ok(Json(summary))
}
