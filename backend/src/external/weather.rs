//! Historical weather API client
//!
//! Integrates with the Open-Meteo archive API to summarize recent daily
//! maximum temperature and precipitation for a location.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use shared::{DailyWeather, DateRange, GeoLocation, WeatherSummary};

use crate::error::{AppError, AppResult};

/// Source of weather summaries for a location
#[async_trait]
pub trait WeatherSummaryProvider: Send + Sync {
    /// Summarize the `days` days ending the day before `as_of`
    async fn weather_summary(
        &self,
        location: GeoLocation,
        days: u32,
        as_of: NaiveDate,
    ) -> AppResult<WeatherSummary>;
}

/// Open-Meteo archive client
#[derive(Clone)]
pub struct HistoricalWeatherClient {
    client: Client,
    base_url: String,
}

/// Open-Meteo archive API response
#[derive(Debug, Deserialize)]
pub struct ArchiveResponse {
    pub daily: ArchiveDaily,
}

#[derive(Debug, Deserialize)]
pub struct ArchiveDaily {
    pub time: Vec<NaiveDate>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
}

impl HistoricalWeatherClient {
    /// Create a client with a request timeout
    pub fn new(base_url: impl Into<String>, timeout: StdDuration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Weather HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn range_for(days: u32, as_of: NaiveDate) -> DateRange {
        let end = as_of - Duration::days(1);
        let start = end - Duration::days(i64::from(days.max(1)) - 1);
        DateRange { start, end }
    }
}

/// Turn the archive's parallel daily arrays into records.
///
/// Days with neither a temperature nor a precipitation reading are dropped.
pub fn daily_records(daily: &ArchiveDaily) -> Vec<DailyWeather> {
    daily
        .time
        .iter()
        .enumerate()
        .map(|(i, date)| DailyWeather {
            date: *date,
            temp_max_c: daily.temperature_2m_max.get(i).copied().flatten(),
            temp_min_c: daily.temperature_2m_min.get(i).copied().flatten(),
            precipitation_mm: daily.precipitation_sum.get(i).copied().flatten(),
        })
        .filter(|d| d.temp_max_c.is_some() || d.precipitation_mm.is_some())
        .collect()
}

/// Summarize a raw archive response body
pub fn summarize_archive(body: &str, period_days: u32) -> AppResult<WeatherSummary> {
    let data: ArchiveResponse = serde_json::from_str(body).map_err(|e| {
        AppError::ExternalService(format!("Failed to parse weather response: {}", e))
    })?;
    Ok(WeatherSummary::from_daily(period_days, &daily_records(&data.daily)))
}

#[async_trait]
impl WeatherSummaryProvider for HistoricalWeatherClient {
    async fn weather_summary(
        &self,
        location: GeoLocation,
        days: u32,
        as_of: NaiveDate,
    ) -> AppResult<WeatherSummary> {
        let range = Self::range_for(days, as_of);
        let url = format!(
            "{}/archive?latitude={}&longitude={}&start_date={}&end_date={}\
             &daily=temperature_2m_max,temperature_2m_min,precipitation_sum&timezone=UTC",
            self.base_url, location.latitude, location.longitude, range.start, range.end
        );

        tracing::debug!("Fetching historical weather: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("Weather API request failed: {}", e);
            AppError::WeatherServiceUnavailable
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Weather API error: {} - {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|_| AppError::WeatherServiceUnavailable)?;

        summarize_archive(&body, days)
    }
}
