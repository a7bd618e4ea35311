//! WebAssembly module for the AgroIntel decision engine
//!
//! Provides client-side computation for:
//! - Yield predictions from a weather summary
//! - Scoring model and health factor lookups
//! - Treatment plan previews before a plan is saved

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{ReferenceData, YieldEstimator, YieldQuery};

fn reference() -> &'static Arc<ReferenceData> {
    static REFERENCE: OnceLock<Arc<ReferenceData>> = OnceLock::new();
    REFERENCE.get_or_init(|| Arc::new(ReferenceData::builtin()))
}

/// Yield request as sent from the browser
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YieldRequest {
    crop_type: Option<String>,
    health_status: Option<String>,
    weather_summary: Option<WeatherSummary>,
    model_id: Option<String>,
}

fn predict_yield_inner(request_json: &str, as_of: &str) -> Result<String, String> {
    let request: YieldRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid request JSON: {}", e))?;
    let as_of = NaiveDate::parse_from_str(as_of, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {}", as_of, e))?;

    let estimator = YieldEstimator::new(reference().clone());
    let prediction = estimator.predict(
        &YieldQuery {
            crop_type: request.crop_type.as_deref().unwrap_or_default(),
            health_status: request.health_status.as_deref().unwrap_or_default(),
            weather: request.weather_summary.as_ref(),
            model_id: request.model_id.as_deref(),
        },
        as_of,
    );

    serde_json::to_string(&prediction).map_err(|e| e.to_string())
}

fn preview_plan_inner(disease_type: &str, start: &str) -> Result<String, String> {
    let start: DateTime<Utc> = DateTime::parse_from_rfc3339(start)
        .map_err(|e| format!("Invalid start time '{}': {}", start, e))?
        .with_timezone(&Utc);

    let steps = lay_out_steps(reference().treatment_steps(disease_type), start);
    serde_json::to_string(&steps).map_err(|e| e.to_string())
}

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("agrointel-wasm loaded"));
}

/// Known crop types, for populating selectors
#[wasm_bindgen]
pub fn crop_types() -> js_sys::Array {
    reference()
        .crops()
        .iter()
        .map(|c| JsValue::from_str(&c.crop_type))
        .collect()
}

/// Predict yield for a JSON request, as of an ISO date (`YYYY-MM-DD`)
#[wasm_bindgen]
pub fn predict_yield(request_json: &str, as_of: &str) -> Result<String, JsValue> {
    predict_yield_inner(request_json, as_of).map_err(|e| JsValue::from_str(&e))
}

/// Registered scoring models as JSON
#[wasm_bindgen]
pub fn list_scoring_models() -> String {
    serde_json::to_string(reference().models()).unwrap_or_else(|_| "[]".to_string())
}

/// Health factor for a free-form health assessment
#[wasm_bindgen]
pub fn health_factor(health_status: &str) -> f64 {
    HealthStatus::parse_lenient(health_status).factor()
}

/// Lay out a disease's treatment steps from an RFC 3339 start time
#[wasm_bindgen]
pub fn preview_treatment_plan(disease_type: &str, start: &str) -> Result<String, JsValue> {
    preview_plan_inner(disease_type, start).map_err(|e| JsValue::from_str(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_factor() {
        assert_eq!(health_factor("Good"), 1.0);
        assert_eq!(health_factor("average"), 0.8);
        assert_eq!(health_factor(" POOR "), 0.6);
        assert_eq!(health_factor("unknown"), 0.8);
    }

    #[test]
    fn test_list_scoring_models() {
        let models: Vec<ScoringModel> = serde_json::from_str(&list_scoring_models()).unwrap();
        assert_eq!(models.len(), 3);
        assert_eq!(models[0].id, "neural_net");
    }

    #[test]
    fn test_predict_yield_at_optimum() {
        let request = r#"{"crop_type":"corn","health_status":"good","weather_summary":{"period_days":90,"avg_max_temp_c":24.0,"total_precipitation_mm":180.0,"data_points":90}}"#;
        let json = predict_yield_inner(request, "2024-04-01").unwrap();
        let prediction: YieldPrediction = serde_json::from_str(&json).unwrap();

        assert_eq!(prediction.primary_yield, 11.0);
        assert_eq!(prediction.per_model_yield.len(), 3);
    }

    #[test]
    fn test_predict_yield_with_missing_inputs() {
        let json = predict_yield_inner(r#"{"health_status":null}"#, "2024-04-01").unwrap();
        let prediction: YieldPrediction = serde_json::from_str(&json).unwrap();

        assert!(prediction.has_flag(PredictionFlag::UnknownCropType));
        assert!(prediction.has_flag(PredictionFlag::UnknownHealthStatus));
        assert_eq!(prediction.per_model_yield.len(), 3);
    }

    #[test]
    fn test_predict_yield_rejects_bad_date() {
        let request = r#"{"crop_type":"corn","health_status":"good"}"#;
        assert!(predict_yield_inner(request, "April 1st").is_err());
    }

    #[test]
    fn test_preview_treatment_plan() {
        let json = preview_plan_inner("early_blight", "2024-06-01T08:00:00Z").unwrap();
        let steps: Vec<TreatmentStep> = serde_json::from_str(&json).unwrap();

        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].id, "step-1");
        assert!(steps.iter().all(|s| s.status == StepStatus::Pending));
    }

    #[test]
    fn test_preview_unknown_disease_is_empty() {
        let json = preview_plan_inner("rust", "2024-06-01T08:00:00Z").unwrap();
        assert_eq!(json, "[]");
    }
}
