//! Validation utilities for reference tables and treatment plans

use std::collections::HashSet;

use crate::models::{CropProfile, ScoringModel, StepStatus, StepTemplate, TreatmentPlan};

// ============================================================================
// Reference Data Validations
// ============================================================================

/// Validate scoring model weights are finite and non-negative
pub fn validate_model_weights(model: &ScoringModel) -> Result<(), &'static str> {
    if model.id.trim().is_empty() {
        return Err("Scoring model id cannot be empty");
    }
    let weights = model.weights.as_array();
    if weights.iter().any(|w| !w.is_finite()) {
        return Err("Scoring model weights must be finite");
    }
    if weights.iter().any(|w| *w < 0.0) {
        return Err("Scoring model weights cannot be negative");
    }
    Ok(())
}

/// Validate crop reference values.
///
/// Optimal values of zero are accepted; the estimator treats them as
/// "no deviation possible".
pub fn validate_crop_profile(profile: &CropProfile) -> Result<(), &'static str> {
    if profile.crop_type.trim().is_empty() {
        return Err("Crop type cannot be empty");
    }
    let values = [
        profile.optimal_temp_c,
        profile.optimal_precipitation_mm,
        profile.baseline_yield_t_ha,
    ];
    if values.iter().any(|v| !v.is_finite()) {
        return Err("Crop profile values must be finite");
    }
    if profile.optimal_precipitation_mm < 0.0 {
        return Err("Optimal precipitation cannot be negative");
    }
    if profile.baseline_yield_t_ha < 0.0 {
        return Err("Baseline yield cannot be negative");
    }
    Ok(())
}

/// Validate a disease's step templates
pub fn validate_step_templates(steps: &[StepTemplate]) -> Result<(), &'static str> {
    if steps.iter().any(|s| s.title.trim().is_empty()) {
        return Err("Treatment step title cannot be empty");
    }
    Ok(())
}

/// Check that identifiers are unique
pub fn validate_unique<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<(), &'static str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err("Duplicate identifier");
        }
    }
    Ok(())
}

// ============================================================================
// Treatment Plan Validations
// ============================================================================

/// Validate the invariants every stored treatment plan must hold
pub fn validate_plan(plan: &TreatmentPlan) -> Result<(), &'static str> {
    validate_unique(plan.steps.iter().map(|s| s.id.as_str()))
        .map_err(|_| "Treatment step ids must be unique within a plan")?;

    for step in &plan.steps {
        if step.end_date < step.start_date {
            return Err("Treatment step cannot end before it starts");
        }
        match (step.status, step.completed_at) {
            (StepStatus::Completed, None) => {
                return Err("Completed treatment step must have a completion time")
            }
            (StepStatus::Pending, Some(_)) => {
                return Err("Pending treatment step cannot have a completion time")
            }
            _ => {}
        }
    }

    if plan
        .steps
        .windows(2)
        .any(|pair| pair[1].start_date < pair[0].start_date)
    {
        return Err("Treatment steps must be in start date order");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{lay_out_steps, ModelWeights};
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn sample_plan() -> TreatmentPlan {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        TreatmentPlan {
            id: Uuid::new_v4(),
            disease_type: "late_blight".to_string(),
            created_at: start,
            steps: lay_out_steps(
                &[StepTemplate::new("Spray", 1), StepTemplate::new("Prune", 2)],
                start,
            ),
        }
    }

    #[test]
    fn test_valid_model_weights() {
        let model = ScoringModel::new("m", "M", ModelWeights::new(0.3, 0.3, 0.3, 0.1));
        assert!(validate_model_weights(&model).is_ok());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let model = ScoringModel::new("m", "M", ModelWeights::new(-0.1, 0.3, 0.3, 0.1));
        assert!(validate_model_weights(&model).is_err());
    }

    #[test]
    fn test_nan_weight_rejected() {
        let model = ScoringModel::new("m", "M", ModelWeights::new(f64::NAN, 0.3, 0.3, 0.1));
        assert!(validate_model_weights(&model).is_err());
    }

    #[test]
    fn test_crop_profile_with_zero_optimum_accepted() {
        let profile = CropProfile::new("moss", 0.0, 0.0, 1.0);
        assert!(validate_crop_profile(&profile).is_ok());
    }

    #[test]
    fn test_crop_profile_with_sub_zero_temperature_accepted() {
        let profile = CropProfile::new("winter_rye", -5.0, 300.0, 4.0);
        assert!(validate_crop_profile(&profile).is_ok());
    }

    #[test]
    fn test_crop_profile_negative_baseline_rejected() {
        let profile = CropProfile::new("corn", 24.0, 180.0, -1.0);
        assert!(validate_crop_profile(&profile).is_err());
    }

    #[test]
    fn test_duplicate_ids() {
        assert!(validate_unique(["a", "b"]).is_ok());
        assert!(validate_unique(["a", "b", "a"]).is_err());
    }

    #[test]
    fn test_generated_plan_is_valid() {
        assert!(validate_plan(&sample_plan()).is_ok());
    }

    #[test]
    fn test_completed_without_timestamp_rejected() {
        let mut plan = sample_plan();
        plan.steps[0].status = StepStatus::Completed;
        assert!(validate_plan(&plan).is_err());
    }

    #[test]
    fn test_pending_with_timestamp_rejected() {
        let mut plan = sample_plan();
        plan.steps[1].completed_at = Some(Utc::now());
        assert!(validate_plan(&plan).is_err());
    }

    #[test]
    fn test_step_ending_before_start_rejected() {
        let mut plan = sample_plan();
        plan.steps[0].end_date = plan.steps[0].start_date - Duration::days(1);
        assert!(validate_plan(&plan).is_err());
    }

    #[test]
    fn test_out_of_order_steps_rejected() {
        let mut plan = sample_plan();
        plan.steps.swap(0, 1);
        assert!(validate_plan(&plan).is_err());
    }
}
