//! Yield prediction service
//!
//! Wraps the pure estimator with weather resolution: a caller may send a
//! weather summary, or only a location, in which case the summary is fetched
//! from the historical weather provider and replaced by estimated conditions
//! if the provider fails.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{
    CropProfile, GeoLocation, ReferenceData, ScoringModel, WeatherSummary, YieldEstimator,
    YieldPrediction, YieldQuery,
};

use crate::error::{AppError, AppResult};
use crate::external::WeatherSummaryProvider;

/// Input for a yield prediction.
///
/// Every field may be absent or null; missing values degrade to the
/// generic crop, average health and the crop's optimal weather.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictYieldInput {
    #[serde(default)]
    pub crop_type: Option<String>,
    #[serde(default)]
    pub health_status: Option<String>,
    #[serde(default)]
    pub weather_summary: Option<WeatherSummary>,
    #[serde(default)]
    pub location: Option<GeoLocation>,
    #[serde(default)]
    pub model_id: Option<String>,
}

/// Where the weather summary behind a prediction came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSource {
    /// Supplied by the caller
    Provided,
    /// Fetched from the historical weather API
    Historical,
    /// Provider unavailable; estimated conditions used
    Fallback,
    /// No weather at all; crop optimum assumed
    None,
}

/// Prediction plus the weather it was computed from
#[derive(Debug, Clone, Serialize)]
pub struct YieldPredictionResponse {
    #[serde(flatten)]
    pub prediction: YieldPrediction,
    pub weather_summary: Option<WeatherSummary>,
    pub weather_source: WeatherSource,
}

/// Yield service for crop yield predictions
#[derive(Clone)]
pub struct YieldService {
    estimator: YieldEstimator,
    weather: Option<Arc<dyn WeatherSummaryProvider>>,
    period_days: u32,
}

impl YieldService {
    /// Create a new YieldService without a weather provider
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self {
            estimator: YieldEstimator::new(reference),
            weather: None,
            period_days: 90,
        }
    }

    /// Create a new YieldService with a historical weather provider
    pub fn with_weather(
        reference: Arc<ReferenceData>,
        weather: Arc<dyn WeatherSummaryProvider>,
        period_days: u32,
    ) -> Self {
        Self {
            estimator: YieldEstimator::new(reference),
            weather: Some(weather),
            period_days,
        }
    }

    /// Registered scoring models
    pub fn models(&self) -> &[ScoringModel] {
        self.estimator.reference().models()
    }

    /// Known crop profiles
    pub fn crops(&self) -> &[CropProfile] {
        self.estimator.reference().crops()
    }

    /// Predict yield as of `as_of`
    pub async fn predict(
        &self,
        input: PredictYieldInput,
        as_of: NaiveDate,
    ) -> AppResult<YieldPredictionResponse> {
        if let Some(location) = &input.location {
            if !location.is_valid() {
                return Err(AppError::validation(
                    "location",
                    "Latitude must be within ±90 and longitude within ±180",
                ));
            }
        }

        let (weather_summary, weather_source) = self.resolve_weather(&input, as_of).await;

        let prediction = self.estimator.predict(
            &YieldQuery {
                crop_type: input.crop_type.as_deref().unwrap_or_default(),
                health_status: input.health_status.as_deref().unwrap_or_default(),
                weather: weather_summary.as_ref(),
                model_id: input.model_id.as_deref(),
            },
            as_of,
        );

        for model in &prediction.per_model_yield {
            tracing::debug!(
                "Model {} predicts {} t/ha for {}",
                model.model_id,
                model.yield_t_ha,
                prediction.crop_type
            );
        }
        if !prediction.flags.is_empty() {
            tracing::warn!(
                "Yield prediction for '{}' flagged: {:?}",
                prediction.crop_type,
                prediction.flags
            );
        }

        Ok(YieldPredictionResponse {
            prediction,
            weather_summary,
            weather_source,
        })
    }

    async fn resolve_weather(
        &self,
        input: &PredictYieldInput,
        as_of: NaiveDate,
    ) -> (Option<WeatherSummary>, WeatherSource) {
        if let Some(summary) = &input.weather_summary {
            return (Some(summary.clone()), WeatherSource::Provided);
        }

        match (&self.weather, input.location) {
            (Some(provider), Some(location)) => {
                match provider
                    .weather_summary(location, self.period_days, as_of)
                    .await
                {
                    Ok(summary) => (Some(summary), WeatherSource::Historical),
                    Err(e) => {
                        tracing::warn!("Using estimated weather data: {}", e);
                        (Some(WeatherSummary::fallback()), WeatherSource::Fallback)
                    }
                }
            }
            (None, Some(_)) => {
                tracing::warn!("Weather provider disabled; using estimated weather data");
                (Some(WeatherSummary::fallback()), WeatherSource::Fallback)
            }
            (_, None) => (None, WeatherSource::None),
        }
    }
}
