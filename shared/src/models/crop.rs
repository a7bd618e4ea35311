//! Crop profile and crop health models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Reference growing conditions and expected yield for one crop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropProfile {
    pub crop_type: String,
    /// Optimal average daily maximum temperature over the season (°C)
    pub optimal_temp_c: f64,
    /// Optimal cumulative precipitation over the season (mm)
    pub optimal_precipitation_mm: f64,
    /// Expected yield under optimal conditions (tons/hectare)
    pub baseline_yield_t_ha: f64,
}

impl CropProfile {
    pub fn new(
        crop_type: impl Into<String>,
        optimal_temp_c: f64,
        optimal_precipitation_mm: f64,
        baseline_yield_t_ha: f64,
    ) -> Self {
        Self {
            crop_type: crop_type.into(),
            optimal_temp_c,
            optimal_precipitation_mm,
            baseline_yield_t_ha,
        }
    }

    /// Profile used for crops missing from the table
    pub fn generic() -> Self {
        Self::new("generic", 22.0, 150.0, 5.0)
    }
}

/// Qualitative crop health assessment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Good,
    #[default]
    Average,
    Poor,
}

impl HealthStatus {
    /// Multiplicative yield factor for this status
    pub fn factor(&self) -> f64 {
        match self {
            HealthStatus::Good => 1.0,
            HealthStatus::Average => 0.8,
            HealthStatus::Poor => 0.6,
        }
    }

    /// Parse case-insensitively, returning `None` for anything unrecognized.
    pub fn recognize(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "good" => Some(HealthStatus::Good),
            "average" => Some(HealthStatus::Average),
            "poor" => Some(HealthStatus::Poor),
            _ => None,
        }
    }

    /// Parse case-insensitively; unrecognized values are treated as average.
    pub fn parse_lenient(raw: &str) -> Self {
        Self::recognize(raw).unwrap_or_default()
    }
}

impl FromStr for HealthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::recognize(s).ok_or_else(|| format!("Unknown health status: {}", s))
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Good => write!(f, "good"),
            HealthStatus::Average => write!(f, "average"),
            HealthStatus::Poor => write!(f, "poor"),
        }
    }
}
