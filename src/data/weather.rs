//! Open-Meteo forecast API integration.
//!
//! One blocking GET per zone returns hourly temperatures already localized to
//! the zone's own timezone. The caller decides how many days back/forward to
//! request; the response is validated for the expected `hourly` shape and
//! returned as a plain sorted series.

use chrono::NaiveDateTime;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::ZoneLocation;
use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Environment variable overriding the forecast endpoint (useful for fixture
/// servers in tests and replays).
pub const BASE_URL_ENV: &str = "LOADCAST_WEATHER_URL";

/// Hourly temperature series for one zone, timestamps zone-local.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSeries {
    pub times: Vec<NaiveDateTime>,
    pub temps: Vec<f64>,
}

impl WeatherSeries {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl WeatherClient {
    /// Build a client, honoring the base-URL override from `.env`/environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch hourly temperatures around now for one zone.
    ///
    /// `past_days` hours of history and `forecast_days` of forward horizon,
    /// localized to the zone's timezone so weekday features line up with the
    /// training data. Any transport error, non-success status, or missing
    /// hourly structure is an error; the orchestrator maps it to the per-zone
    /// failure path.
    pub fn fetch_hourly(
        &self,
        zone: &str,
        location: &ZoneLocation,
        past_days: u32,
        forecast_days: u32,
    ) -> Result<WeatherSeries, AppError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("hourly", "temperature_2m".to_string()),
                ("past_days", past_days.to_string()),
                ("forecast_days", forecast_days.to_string()),
                ("timezone", location.timezone.to_string()),
            ])
            .send()
            .map_err(|e| AppError::new(4, format!("Weather request failed for {zone}: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Weather request for {zone} failed with status {}.", resp.status()),
            ));
        }

        let body: ForecastResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse weather response for {zone}: {e}")))?;

        parse_hourly(zone, body)
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
}

fn parse_hourly(zone: &str, body: ForecastResponse) -> Result<WeatherSeries, AppError> {
    let hourly = body.hourly.ok_or_else(|| {
        AppError::new(4, format!("Weather information absent (no hourly data) for zone {zone}."))
    })?;

    if hourly.time.is_empty() {
        return Err(AppError::new(4, format!("Empty hourly series for zone {zone}.")));
    }
    if hourly.time.len() != hourly.temperature_2m.len() {
        return Err(AppError::new(
            4,
            format!("Hourly time/temperature length mismatch for zone {zone}."),
        ));
    }

    let mut rows = Vec::with_capacity(hourly.time.len());
    for (raw, temp) in hourly.time.iter().zip(&hourly.temperature_2m) {
        let ts = parse_hour(raw)
            .ok_or_else(|| AppError::new(4, format!("Invalid weather timestamp '{raw}' for zone {zone}.")))?;
        // Open-Meteo reports hours with no reading yet as null; those rows
        // carry no usable regressor, so they are dropped here.
        let Some(temp) = temp else { continue };
        if !temp.is_finite() {
            continue;
        }
        rows.push((ts, *temp));
    }

    if rows.is_empty() {
        return Err(AppError::new(4, format!("No usable hourly readings for zone {zone}.")));
    }

    rows.sort_by_key(|&(ts, _)| ts);
    let (times, temps) = rows.into_iter().unzip();
    Ok(WeatherSeries { times, temps })
}

/// Open-Meteo hourly timestamps come as `YYYY-MM-DDTHH:MM` (no seconds).
fn parse_hour(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(times: &[&str], temps: &[Option<f64>]) -> ForecastResponse {
        ForecastResponse {
            hourly: Some(HourlyBlock {
                time: times.iter().map(|s| s.to_string()).collect(),
                temperature_2m: temps.to_vec(),
            }),
        }
    }

    #[test]
    fn parses_and_sorts_hourly_block() {
        let body = response(
            &["2025-06-02T01:00", "2025-06-02T00:00"],
            &[Some(19.5), Some(18.0)],
        );
        let series = parse_hourly("PS", body).unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.times[0] < series.times[1]);
        assert_eq!(series.temps, vec![18.0, 19.5]);
    }

    #[test]
    fn missing_hourly_block_is_an_error() {
        let body = ForecastResponse { hourly: None };
        assert!(parse_hourly("PS", body).is_err());
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let body = response(&["2025-06-02T00:00"], &[Some(1.0), Some(2.0)]);
        assert!(parse_hourly("PS", body).is_err());
    }

    #[test]
    fn null_readings_are_dropped() {
        let body = response(
            &["2025-06-02T00:00", "2025-06-02T01:00", "2025-06-02T02:00"],
            &[Some(18.0), None, Some(20.0)],
        );
        let series = parse_hourly("PS", body).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.temps, vec![18.0, 20.0]);
    }

    #[test]
    fn all_null_readings_are_an_error() {
        let body = response(&["2025-06-02T00:00"], &[None]);
        assert!(parse_hourly("PS", body).is_err());
    }

    #[test]
    fn accepts_timestamps_with_seconds() {
        assert!(parse_hour("2025-06-02T07:00:00").is_some());
        assert!(parse_hour("2025-06-02T07:00").is_some());
        assert!(parse_hour("garbage").is_none());
    }
}
