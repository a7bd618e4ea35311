//! Immutable reference tables for the decision engine
//!
//! Crop profiles, the scoring model registry, the disease treatment catalog
//! and harvest rules are loaded once at start-up, validated, and then shared
//! read-only (usually behind an `Arc`) by every component.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CropProfile, DiseaseTreatment, ModelWeights, ScoringModel, StepTemplate};
use crate::types::normalize_key;
use crate::validation::{
    validate_crop_profile, validate_model_weights, validate_step_templates, validate_unique,
};

/// Storage advice given when a crop has no harvest rule
pub const GENERIC_STORAGE_RECOMMENDATION: &str =
    "Store in a cool, dry, well-ventilated place and inspect regularly for moisture and pests.";

/// Reference data errors
#[derive(Error, Debug, PartialEq)]
pub enum ReferenceDataError {
    #[error("Scoring model registry is empty")]
    EmptyModelRegistry,

    #[error("Invalid scoring model '{id}': {reason}")]
    InvalidModel { id: String, reason: &'static str },

    #[error("Invalid crop profile '{crop_type}': {reason}")]
    InvalidCrop {
        crop_type: String,
        reason: &'static str,
    },

    #[error("Invalid treatment for '{disease_type}': {reason}")]
    InvalidTreatment {
        disease_type: String,
        reason: &'static str,
    },

    #[error("Duplicate {table} entry")]
    Duplicate { table: &'static str },

    #[error("Failed to parse reference data: {0}")]
    Parse(String),
}

/// Harvest timing and storage advice for one crop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarvestRule {
    pub crop_type: String,
    /// Days from the prediction date until the window opens
    pub days_to_harvest_start: u32,
    /// Length of the window in days
    pub window_days: u32,
    pub storage_recommendation: String,
}

impl HarvestRule {
    fn new(crop_type: &str, days_to_harvest_start: u32, window_days: u32, storage: &str) -> Self {
        Self {
            crop_type: crop_type.to_string(),
            days_to_harvest_start,
            window_days,
            storage_recommendation: storage.to_string(),
        }
    }
}

/// Unvalidated shape of the reference tables, as read from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReferenceData {
    pub crops: Vec<CropProfile>,
    #[serde(default = "CropProfile::generic")]
    pub default_crop: CropProfile,
    pub models: Vec<ScoringModel>,
    #[serde(default)]
    pub treatments: Vec<DiseaseTreatment>,
    #[serde(default)]
    pub harvest_rules: Vec<HarvestRule>,
}

/// Validated, read-only reference tables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawReferenceData")]
pub struct ReferenceData {
    crops: Vec<CropProfile>,
    default_crop: CropProfile,
    models: Vec<ScoringModel>,
    treatments: Vec<DiseaseTreatment>,
    harvest_rules: Vec<HarvestRule>,
}

impl TryFrom<RawReferenceData> for ReferenceData {
    type Error = ReferenceDataError;

    fn try_from(raw: RawReferenceData) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl ReferenceData {
    /// Validate raw tables and normalize their lookup keys
    pub fn new(raw: RawReferenceData) -> Result<Self, ReferenceDataError> {
        let RawReferenceData {
            mut crops,
            default_crop,
            mut models,
            mut treatments,
            mut harvest_rules,
        } = raw;

        if models.is_empty() {
            return Err(ReferenceDataError::EmptyModelRegistry);
        }

        for model in &mut models {
            validate_model_weights(model).map_err(|reason| ReferenceDataError::InvalidModel {
                id: model.id.clone(),
                reason,
            })?;
            model.id = normalize_key(&model.id);
        }
        validate_unique(models.iter().map(|m| m.id.as_str()))
            .map_err(|_| ReferenceDataError::Duplicate { table: "model" })?;

        validate_crop_profile(&default_crop).map_err(|reason| ReferenceDataError::InvalidCrop {
            crop_type: default_crop.crop_type.clone(),
            reason,
        })?;
        for crop in &mut crops {
            validate_crop_profile(crop).map_err(|reason| ReferenceDataError::InvalidCrop {
                crop_type: crop.crop_type.clone(),
                reason,
            })?;
            crop.crop_type = normalize_key(&crop.crop_type);
        }
        validate_unique(crops.iter().map(|c| c.crop_type.as_str()))
            .map_err(|_| ReferenceDataError::Duplicate { table: "crop" })?;

        for treatment in &mut treatments {
            validate_step_templates(&treatment.steps).map_err(|reason| {
                ReferenceDataError::InvalidTreatment {
                    disease_type: treatment.disease_type.clone(),
                    reason,
                }
            })?;
            treatment.disease_type = normalize_key(&treatment.disease_type);
        }
        validate_unique(treatments.iter().map(|t| t.disease_type.as_str()))
            .map_err(|_| ReferenceDataError::Duplicate { table: "treatment" })?;

        for rule in &mut harvest_rules {
            rule.crop_type = normalize_key(&rule.crop_type);
        }
        validate_unique(harvest_rules.iter().map(|r| r.crop_type.as_str()))
            .map_err(|_| ReferenceDataError::Duplicate {
                table: "harvest rule",
            })?;

        Ok(Self {
            crops,
            default_crop,
            models,
            treatments,
            harvest_rules,
        })
    }

    /// Parse and validate reference data from JSON
    pub fn from_json(json: &str) -> Result<Self, ReferenceDataError> {
        let raw: RawReferenceData =
            serde_json::from_str(json).map_err(|e| ReferenceDataError::Parse(e.to_string()))?;
        Self::new(raw)
    }

    /// Built-in tables
    pub fn builtin() -> Self {
        Self {
            crops: vec![
                CropProfile::new("wheat", 18.0, 120.0, 4.5),
                CropProfile::new("corn", 24.0, 180.0, 11.0),
                CropProfile::new("rice", 26.0, 300.0, 6.0),
                CropProfile::new("soybean", 22.0, 160.0, 3.0),
                CropProfile::new("potato", 20.0, 140.0, 25.0),
                CropProfile::new("tomato", 25.0, 150.0, 45.0),
            ],
            default_crop: CropProfile::generic(),
            models: vec![
                ScoringModel::new(
                    "neural_net",
                    "Neural Network",
                    ModelWeights::new(0.35, 0.3, 0.25, 0.1),
                ),
                ScoringModel::new(
                    "random_forest",
                    "Random Forest",
                    ModelWeights::new(0.3, 0.35, 0.25, 0.1),
                ),
                ScoringModel::new(
                    "gradient_boost",
                    "Gradient Boosting",
                    ModelWeights::new(0.25, 0.3, 0.35, 0.1),
                ),
            ],
            treatments: vec![
                DiseaseTreatment {
                    disease_type: "early_blight".to_string(),
                    steps: vec![
                        StepTemplate::new("Apply fungicide", 1),
                        StepTemplate::new("Remove infected leaves", 2),
                        StepTemplate::new("Improve air circulation", 3),
                    ],
                },
                DiseaseTreatment {
                    disease_type: "late_blight".to_string(),
                    steps: vec![
                        StepTemplate::new("Apply copper-based fungicide", 1),
                        StepTemplate::new("Remove infected plants", 2),
                        StepTemplate::new("Adjust watering schedule", 3),
                    ],
                },
            ],
            harvest_rules: vec![
                HarvestRule::new(
                    "wheat",
                    110,
                    14,
                    "Dry grain to 13-14% moisture and store in sealed bins below 15 °C.",
                ),
                HarvestRule::new(
                    "corn",
                    100,
                    21,
                    "Dry kernels to 15% moisture and keep in aerated bins; check for mold every two weeks.",
                ),
                HarvestRule::new(
                    "rice",
                    120,
                    14,
                    "Dry paddy to 14% moisture and store in hermetic bags off the floor.",
                ),
                HarvestRule::new(
                    "soybean",
                    100,
                    14,
                    "Store beans at 13% moisture or lower in a cool, ventilated bin.",
                ),
                HarvestRule::new(
                    "potato",
                    90,
                    21,
                    "Cure for 10-14 days at 10-15 °C, then store in the dark at 4-7 °C with high humidity.",
                ),
                HarvestRule::new(
                    "tomato",
                    60,
                    30,
                    "Store at 12-15 °C away from direct sunlight; do not refrigerate unripe fruit.",
                ),
            ],
        }
    }

    /// Profile for a crop, falling back to the generic profile.
    ///
    /// The flag is `false` when the fallback was used.
    pub fn crop_profile(&self, crop_type: &str) -> (&CropProfile, bool) {
        let key = normalize_key(crop_type);
        match self.crops.iter().find(|c| c.crop_type == key) {
            Some(profile) => (profile, true),
            None => (&self.default_crop, false),
        }
    }

    /// Scoring model by id, falling back to the first registered model.
    ///
    /// The flag is `false` when a requested id was not registered.
    pub fn scoring_model(&self, model_id: Option<&str>) -> (&ScoringModel, bool) {
        let first = &self.models[0];
        match model_id.map(normalize_key) {
            None => (first, true),
            Some(key) if key.is_empty() => (first, true),
            Some(key) => match self.models.iter().find(|m| m.id == key) {
                Some(model) => (model, true),
                None => (first, false),
            },
        }
    }

    /// Steps for a disease; empty when the disease is not catalogued
    pub fn treatment_steps(&self, disease_type: &str) -> &[StepTemplate] {
        let key = normalize_key(disease_type);
        self.treatments
            .iter()
            .find(|t| t.disease_type == key)
            .map(|t| t.steps.as_slice())
            .unwrap_or(&[])
    }

    pub fn harvest_rule(&self, crop_type: &str) -> Option<&HarvestRule> {
        let key = normalize_key(crop_type);
        self.harvest_rules.iter().find(|r| r.crop_type == key)
    }

    pub fn crops(&self) -> &[CropProfile] {
        &self.crops
    }

    pub fn default_crop(&self) -> &CropProfile {
        &self.default_crop
    }

    /// Registered scoring models, in registry order
    pub fn models(&self) -> &[ScoringModel] {
        &self.models
    }

    pub fn treatments(&self) -> &[DiseaseTreatment] {
        &self.treatments
    }
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self::builtin()
    }
}
