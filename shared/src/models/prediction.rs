//! Yield prediction results

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::HealthStatus;

/// Yield computed by one scoring model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelYield {
    pub model_id: String,
    pub display_name: String,
    /// Tons per hectare, rounded to 2 decimals
    pub yield_t_ha: f64,
}

/// Intermediate factors shared by every model for one prediction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct YieldAdjustments {
    pub temp_deviation: f64,
    pub precip_deviation: f64,
    pub temp_adjustment: f64,
    pub precip_adjustment: f64,
    pub health_factor: f64,
}

/// Recommended harvest window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HarvestWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Conditions worth surfacing to the caller. None of them change the numbers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PredictionFlag {
    /// Temperature deviation large enough to push its adjustment below zero
    NegativeTemperatureAdjustment,
    /// Precipitation deviation large enough to push its adjustment below zero
    NegativePrecipitationAdjustment,
    /// At least one model produced a negative yield
    NegativeYield,
    /// Crop type not in the table; the generic profile was used
    UnknownCropType,
    /// Health status not recognized; average was used
    UnknownHealthStatus,
    /// Requested model not registered; the first model was used
    UnknownModel,
}

/// Result of a yield prediction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YieldPrediction {
    pub crop_type: String,
    pub health_status: HealthStatus,
    /// One entry per registered model, in registry order
    pub per_model_yield: Vec<ModelYield>,
    pub primary_model_id: String,
    pub primary_yield: f64,
    pub adjustments: YieldAdjustments,
    pub optimal_harvest_window: Option<HarvestWindow>,
    pub storage_recommendation: String,
    pub flags: Vec<PredictionFlag>,
}

impl YieldPrediction {
    /// Yield for one model id
    pub fn yield_for(&self, model_id: &str) -> Option<f64> {
        self.per_model_yield
            .iter()
            .find(|m| m.model_id == model_id)
            .map(|m| m.yield_t_ha)
    }

    pub fn has_flag(&self, flag: PredictionFlag) -> bool {
        self.flags.contains(&flag)
    }
}
