//! Yield estimation
//!
//! Scores a crop against every registered model from its deviation from
//! optimal growing conditions and its health. The estimator never fails:
//! unknown crops, health statuses, models and missing weather readings all
//! degrade to defaults so a prediction is always available.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use crate::models::{
    CropProfile, HarvestWindow, HealthStatus, ModelYield, PredictionFlag, ScoringModel,
    WeatherSummary, YieldAdjustments, YieldPrediction,
};
use crate::reference::{ReferenceData, GENERIC_STORAGE_RECOMMENDATION};
use crate::types::{normalize_key, round_dp};

/// Penalty per unit of relative temperature deviation
pub const TEMPERATURE_PENALTY: f64 = 0.8;

/// Penalty per unit of relative precipitation deviation
pub const PRECIPITATION_PENALTY: f64 = 0.7;

/// Inputs to a yield prediction
#[derive(Debug, Clone, Default)]
pub struct YieldQuery<'a> {
    pub crop_type: &'a str,
    pub health_status: &'a str,
    pub weather: Option<&'a WeatherSummary>,
    pub model_id: Option<&'a str>,
}

/// Deterministic yield estimator over shared reference data
#[derive(Debug, Clone)]
pub struct YieldEstimator {
    reference: Arc<ReferenceData>,
}

impl YieldEstimator {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Predict yield for every registered model.
    ///
    /// `as_of` anchors the harvest window; the result depends on nothing else
    /// outside the arguments.
    pub fn predict(&self, query: &YieldQuery<'_>, as_of: NaiveDate) -> YieldPrediction {
        let mut flags = Vec::new();

        let (profile, known_crop) = self.reference.crop_profile(query.crop_type);
        if !known_crop {
            flags.push(PredictionFlag::UnknownCropType);
        }

        let health = match HealthStatus::recognize(query.health_status) {
            Some(status) => status,
            None => {
                flags.push(PredictionFlag::UnknownHealthStatus);
                HealthStatus::default()
            }
        };

        let adjustments = compute_adjustments(profile, health, query.weather);
        if adjustments.temp_adjustment < 0.0 {
            flags.push(PredictionFlag::NegativeTemperatureAdjustment);
        }
        if adjustments.precip_adjustment < 0.0 {
            flags.push(PredictionFlag::NegativePrecipitationAdjustment);
        }

        let per_model_yield: Vec<ModelYield> = self
            .reference
            .models()
            .iter()
            .map(|model| ModelYield {
                model_id: model.id.clone(),
                display_name: model.display_name.clone(),
                yield_t_ha: model_yield(model, profile, &adjustments),
            })
            .collect();
        if per_model_yield.iter().any(|m| m.yield_t_ha < 0.0) {
            flags.push(PredictionFlag::NegativeYield);
        }

        let (primary, known_model) = self.reference.scoring_model(query.model_id);
        if !known_model {
            flags.push(PredictionFlag::UnknownModel);
        }
        let primary_yield = per_model_yield
            .iter()
            .find(|m| m.model_id == primary.id)
            .map(|m| m.yield_t_ha)
            .unwrap_or_else(|| model_yield(primary, profile, &adjustments));

        let rule = self.reference.harvest_rule(query.crop_type);
        let optimal_harvest_window = rule.map(|rule| {
            let start_date = as_of + Duration::days(i64::from(rule.days_to_harvest_start));
            HarvestWindow {
                start_date,
                end_date: start_date + Duration::days(i64::from(rule.window_days)),
            }
        });
        let storage_recommendation = rule
            .map(|r| r.storage_recommendation.clone())
            .unwrap_or_else(|| GENERIC_STORAGE_RECOMMENDATION.to_string());

        YieldPrediction {
            crop_type: normalize_key(query.crop_type),
            health_status: health,
            per_model_yield,
            primary_model_id: primary.id.clone(),
            primary_yield,
            adjustments,
            optimal_harvest_window,
            storage_recommendation,
            flags,
        }
    }
}

/// Relative deviation of `actual` from `optimal`; 0 when the optimum is 0.
///
/// Measured against the optimum's magnitude so it is never negative, which
/// matters for crops with a sub-zero optimal temperature.
pub fn relative_deviation(actual: f64, optimal: f64) -> f64 {
    if optimal == 0.0 {
        return 0.0;
    }
    (actual - optimal).abs() / optimal.abs()
}

/// Adjustment factors shared by every model.
///
/// Missing readings fall back to the crop's optimum, i.e. no deviation.
/// Adjustments are not clamped and go negative for extreme deviations.
pub fn compute_adjustments(
    profile: &CropProfile,
    health: HealthStatus,
    weather: Option<&WeatherSummary>,
) -> YieldAdjustments {
    let actual_temp = weather
        .and_then(|w| w.avg_max_temp_c)
        .filter(|t| t.is_finite())
        .unwrap_or(profile.optimal_temp_c);
    let actual_precip = weather
        .and_then(|w| w.total_precipitation_mm)
        .filter(|p| p.is_finite())
        .unwrap_or(profile.optimal_precipitation_mm);

    let temp_deviation = relative_deviation(actual_temp, profile.optimal_temp_c);
    let precip_deviation = relative_deviation(actual_precip, profile.optimal_precipitation_mm);

    YieldAdjustments {
        temp_deviation,
        precip_deviation,
        temp_adjustment: 1.0 - temp_deviation * TEMPERATURE_PENALTY,
        precip_adjustment: 1.0 - precip_deviation * PRECIPITATION_PENALTY,
        health_factor: health.factor(),
    }
}

/// Yield of one model in tons/hectare, rounded to 2 decimals
pub fn model_yield(model: &ScoringModel, profile: &CropProfile, adj: &YieldAdjustments) -> f64 {
    let w = &model.weights;
    let score = w.temperature * adj.temp_adjustment
        + w.precipitation * adj.precip_adjustment
        + w.health * adj.health_factor
        + w.baseline;
    round_dp(profile.baseline_yield_t_ha * score, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelWeights;
    use proptest::prelude::*;

    fn estimator() -> YieldEstimator {
        YieldEstimator::new(Arc::new(ReferenceData::builtin()))
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    fn weather(temp: f64, precip: f64) -> WeatherSummary {
        WeatherSummary {
            period_days: 90,
            avg_max_temp_c: Some(temp),
            total_precipitation_mm: Some(precip),
            data_points: 90,
        }
    }

    #[test]
    fn test_corn_at_optimum_with_good_health() {
        let summary = weather(24.0, 180.0);
        let prediction = estimator().predict(
            &YieldQuery {
                crop_type: "corn",
                health_status: "good",
                weather: Some(&summary),
                model_id: Some("neural_net"),
            },
            as_of(),
        );

        assert_eq!(prediction.adjustments.temp_adjustment, 1.0);
        assert_eq!(prediction.adjustments.precip_adjustment, 1.0);
        assert_eq!(prediction.adjustments.health_factor, 1.0);
        assert_eq!(prediction.primary_yield, 11.0);
        assert_eq!(prediction.yield_for("neural_net"), Some(11.0));
        assert_eq!(prediction.yield_for("random_forest"), Some(11.0));
        assert_eq!(prediction.yield_for("gradient_boost"), Some(11.0));
        assert!(prediction.flags.is_empty());
    }

    #[test]
    fn test_deviation_penalizes_yield() {
        // wheat optimum 18 °C / 120 mm; 27 °C is a 50% deviation, 60 mm is 50%
        let summary = weather(27.0, 60.0);
        let prediction = estimator().predict(
            &YieldQuery {
                crop_type: "wheat",
                health_status: "average",
                weather: Some(&summary),
                model_id: None,
            },
            as_of(),
        );

        assert!((prediction.adjustments.temp_adjustment - 0.6).abs() < 1e-9);
        assert!((prediction.adjustments.precip_adjustment - 0.65).abs() < 1e-9);
        // 4.5 * (0.35*0.6 + 0.3*0.65 + 0.25*0.8 + 0.1) = 4.5 * 0.705 = 3.1725
        assert_eq!(prediction.yield_for("neural_net"), Some(3.17));
    }

    #[test]
    fn test_missing_weather_means_no_deviation() {
        let prediction = estimator().predict(
            &YieldQuery {
                crop_type: "rice",
                health_status: "good",
                weather: None,
                model_id: None,
            },
            as_of(),
        );
        assert_eq!(prediction.adjustments.temp_deviation, 0.0);
        assert_eq!(prediction.adjustments.precip_deviation, 0.0);
        assert_eq!(prediction.primary_yield, 6.0);
    }

    #[test]
    fn test_partial_weather_uses_optimum_for_missing_field() {
        let summary = WeatherSummary {
            period_days: 30,
            avg_max_temp_c: None,
            total_precipitation_mm: Some(280.0),
            data_points: 30,
        };
        let prediction = estimator().predict(
            &YieldQuery {
                crop_type: "potato",
                health_status: "good",
                weather: Some(&summary),
                model_id: None,
            },
            as_of(),
        );
        assert_eq!(prediction.adjustments.temp_deviation, 0.0);
        assert_eq!(prediction.adjustments.precip_deviation, 1.0);
    }

    #[test]
    fn test_unknown_inputs_degrade_to_defaults() {
        let prediction = estimator().predict(
            &YieldQuery {
                crop_type: "quinoa",
                health_status: "wilting",
                weather: None,
                model_id: Some("svm"),
            },
            as_of(),
        );

        assert_eq!(prediction.health_status, HealthStatus::Average);
        assert_eq!(prediction.primary_model_id, "neural_net");
        // 5.0 * (0.35 + 0.3 + 0.25*0.8 + 0.1) = 5.0 * 0.95
        assert_eq!(prediction.primary_yield, 4.75);
        assert!(prediction.optimal_harvest_window.is_none());
        assert_eq!(prediction.storage_recommendation, GENERIC_STORAGE_RECOMMENDATION);
        assert!(prediction.has_flag(PredictionFlag::UnknownCropType));
        assert!(prediction.has_flag(PredictionFlag::UnknownHealthStatus));
        assert!(prediction.has_flag(PredictionFlag::UnknownModel));
    }

    #[test]
    fn test_extreme_deviation_is_not_clamped() {
        // 60 °C against an 18 °C optimum: deviation 2.333, adjustment -0.867
        let summary = weather(60.0, 1200.0);
        let prediction = estimator().predict(
            &YieldQuery {
                crop_type: "wheat",
                health_status: "poor",
                weather: Some(&summary),
                model_id: None,
            },
            as_of(),
        );

        assert!(prediction.adjustments.temp_adjustment < 0.0);
        assert!(prediction.adjustments.precip_adjustment < 0.0);
        assert!(prediction.primary_yield < 0.0);
        assert!(prediction.has_flag(PredictionFlag::NegativeTemperatureAdjustment));
        assert!(prediction.has_flag(PredictionFlag::NegativePrecipitationAdjustment));
        assert!(prediction.has_flag(PredictionFlag::NegativeYield));
    }

    #[test]
    fn test_harvest_window_offsets_from_as_of() {
        let prediction = estimator().predict(
            &YieldQuery {
                crop_type: "Tomato",
                health_status: "good",
                weather: None,
                model_id: None,
            },
            as_of(),
        );
        let window = prediction.optimal_harvest_window.unwrap();
        assert_eq!(window.start_date, as_of() + Duration::days(60));
        assert_eq!(window.end_date, window.start_date + Duration::days(30));
    }

    #[test]
    fn test_zero_optimum_guards_division() {
        assert_eq!(relative_deviation(12.0, 0.0), 0.0);
        assert_eq!(relative_deviation(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_negative_optimum_penalizes_deviation() {
        let profile = CropProfile::new("winter_rye", -5.0, 300.0, 4.0);
        let summary = weather(0.0, 300.0);
        let adj = compute_adjustments(&profile, HealthStatus::Good, Some(&summary));

        assert_eq!(adj.temp_deviation, 1.0);
        assert!(adj.temp_adjustment < 1.0);
        assert_eq!(adj.precip_adjustment, 1.0);
        assert_eq!(relative_deviation(-10.0, -5.0), 1.0);
    }

    #[test]
    fn test_weights_need_not_sum_to_one() {
        let boosted = ScoringModel::new("boosted", "Boosted", ModelWeights::new(0.5, 0.5, 0.5, 0.5));
        let profile = CropProfile::new("corn", 24.0, 180.0, 11.0);
        let adj = compute_adjustments(&profile, HealthStatus::Good, None);
        assert_eq!(model_yield(&boosted, &profile, &adj), 22.0);
    }

    #[test]
    fn test_primary_yield_matches_selected_model() {
        let summary = weather(30.0, 120.0);
        let prediction = estimator().predict(
            &YieldQuery {
                crop_type: "corn",
                health_status: "poor",
                weather: Some(&summary),
                model_id: Some("Gradient_Boost"),
            },
            as_of(),
        );
        assert_eq!(prediction.primary_model_id, "gradient_boost");
        assert_eq!(
            Some(prediction.primary_yield),
            prediction.yield_for("gradient_boost")
        );
        assert_eq!(prediction.per_model_yield.len(), 3);
    }

    // ========================================================================
    // Property Tests
    // ========================================================================

    proptest! {
        /// Deviation is a magnitude whatever the sign of the optimum
        #[test]
        fn test_deviation_is_never_negative(
            actual in -100.0f64..100.0,
            optimal in -100.0f64..100.0,
        ) {
            let deviation = relative_deviation(actual, optimal);
            prop_assert!(deviation >= 0.0);
            prop_assert!(deviation.is_finite());
        }

        /// A profile's own optimum never penalizes the yield
        #[test]
        fn test_optimum_gives_unit_adjustments(
            optimal_temp in -20.0f64..45.0,
            optimal_precip in 0.0f64..1500.0,
        ) {
            let profile = CropProfile::new("trial", optimal_temp, optimal_precip, 5.0);
            let summary = weather(optimal_temp, optimal_precip);
            let adj = compute_adjustments(&profile, HealthStatus::Average, Some(&summary));

            prop_assert_eq!(adj.temp_adjustment, 1.0);
            prop_assert_eq!(adj.precip_adjustment, 1.0);
        }

        /// Model yields are finite and already rounded to 2 decimals
        #[test]
        fn test_model_yield_is_rounded(
            temp in -30.0f64..55.0,
            precip in 0.0f64..2000.0,
            weights in (0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0),
        ) {
            let model = ScoringModel::new(
                "trial",
                "Trial",
                ModelWeights::new(weights.0, weights.1, weights.2, weights.3),
            );
            let profile = CropProfile::new("corn", 24.0, 180.0, 11.0);
            let summary = weather(temp, precip);
            let adj = compute_adjustments(&profile, HealthStatus::Poor, Some(&summary));

            let value = model_yield(&model, &profile, &adj);
            prop_assert!(value.is_finite());
            prop_assert_eq!(round_dp(value, 2), value);
        }
    }
}
