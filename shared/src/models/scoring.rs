//! Yield scoring models

use serde::{Deserialize, Serialize};

/// Relative weight of each adjustment in a scoring model.
///
/// Weights are non-negative but are not required to sum to 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ModelWeights {
    pub temperature: f64,
    pub precipitation: f64,
    pub health: f64,
    pub baseline: f64,
}

impl ModelWeights {
    pub fn new(temperature: f64, precipitation: f64, health: f64, baseline: f64) -> Self {
        Self {
            temperature,
            precipitation,
            health,
            baseline,
        }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.temperature, self.precipitation, self.health, self.baseline]
    }
}

/// A named set of weights in the model registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringModel {
    pub id: String,
    pub display_name: String,
    pub weights: ModelWeights,
}

impl ScoringModel {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, weights: ModelWeights) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            weights,
        }
    }
}
