//! Weather data models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::round_dp;

/// Aggregated weather over a recent period, as used by yield prediction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSummary {
    #[serde(default, alias = "periodDays")]
    pub period_days: u32,
    #[serde(default, alias = "avgMaxTempC")]
    pub avg_max_temp_c: Option<f64>,
    #[serde(default, alias = "totalPrecipitationMm")]
    pub total_precipitation_mm: Option<f64>,
    #[serde(default, alias = "dataPoints")]
    pub data_points: u32,
}

impl WeatherSummary {
    /// Estimated conditions used when the weather provider is unreachable
    pub fn fallback() -> Self {
        Self {
            period_days: 90,
            avg_max_temp_c: Some(26.5),
            total_precipitation_mm: Some(175.2),
            data_points: 90,
        }
    }

    /// Summarize daily records over a `period_days` window.
    ///
    /// Average maximum temperature and total precipitation are rounded to
    /// one decimal. An empty series reports an average of 0.
    pub fn from_daily(period_days: u32, days: &[DailyWeather]) -> Self {
        let temps: Vec<f64> = days.iter().filter_map(|d| d.temp_max_c).collect();
        let avg_max = if temps.is_empty() {
            0.0
        } else {
            temps.iter().sum::<f64>() / temps.len() as f64
        };
        let total_precip: f64 = days.iter().filter_map(|d| d.precipitation_mm).sum();

        Self {
            period_days,
            avg_max_temp_c: Some(round_dp(avg_max, 1)),
            total_precipitation_mm: Some(round_dp(total_precip, 1)),
            data_points: days.len() as u32,
        }
    }
}

/// One day of observed weather
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyWeather {
    pub date: NaiveDate,
    pub temp_max_c: Option<f64>,
    pub temp_min_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32, max: f64, precip: f64) -> DailyWeather {
        DailyWeather {
            date: NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
            temp_max_c: Some(max),
            temp_min_c: Some(max - 8.0),
            precipitation_mm: Some(precip),
        }
    }

    #[test]
    fn test_summary_from_daily() {
        let days = vec![day(1, 24.0, 0.0), day(2, 25.0, 12.3), day(3, 27.1, 4.44)];
        let summary = WeatherSummary::from_daily(3, &days);

        assert_eq!(summary.period_days, 3);
        assert_eq!(summary.data_points, 3);
        assert_eq!(summary.avg_max_temp_c, Some(25.4));
        assert_eq!(summary.total_precipitation_mm, Some(16.7));
    }

    #[test]
    fn test_summary_without_period_deserializes() {
        let summary: WeatherSummary =
            serde_json::from_str(r#"{"avgMaxTempC": 24.0, "totalPrecipitationMm": 180.0}"#)
                .unwrap();
        assert_eq!(summary.period_days, 0);
        assert_eq!(summary.avg_max_temp_c, Some(24.0));
        assert_eq!(summary.data_points, 0);
    }

    #[test]
    fn test_summary_from_empty_series() {
        let summary = WeatherSummary::from_daily(90, &[]);
        assert_eq!(summary.avg_max_temp_c, Some(0.0));
        assert_eq!(summary.total_precipitation_mm, Some(0.0));
        assert_eq!(summary.data_points, 0);
    }

    #[test]
    fn test_summary_accepts_both_field_styles() {
        let snake: WeatherSummary = serde_json::from_str(
            r#"{"period_days":90,"avg_max_temp_c":24.0,"total_precipitation_mm":180.0,"data_points":90}"#,
        )
        .unwrap();
        let camel: WeatherSummary = serde_json::from_str(
            r#"{"periodDays":90,"avgMaxTempC":24.0,"totalPrecipitationMm":180.0,"dataPoints":90}"#,
        )
        .unwrap();
        assert_eq!(snake, camel);
    }

    #[test]
    fn test_summary_missing_measurements() {
        let summary: WeatherSummary =
            serde_json::from_str(r#"{"period_days":90,"avg_max_temp_c":null}"#).unwrap();
        assert_eq!(summary.avg_max_temp_c, None);
        assert_eq!(summary.total_precipitation_mm, None);
    }
}
