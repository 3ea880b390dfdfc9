//! Open-Meteo forecast client.
//!
//! Three request shapes: the current-conditions card, the combined
//! current+hourly detail view, and the precipitation series used per route
//! checkpoint. See: https://open-meteo.com/en/docs

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, Timelike};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::types::{CurrentConditions, HourSlot, RouteSample, WeatherError};

const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";
const REQUEST_TIMEOUT_SECS: u64 = 10;

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m,is_day";

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: f64,
    relative_humidity_2m: u8,
    weather_code: i32,
    wind_speed_10m: f64,
    is_day: u8,
}

impl From<CurrentBlock> for CurrentConditions {
    fn from(block: CurrentBlock) -> Self {
        Self {
            temperature: block.temperature_2m,
            humidity: block.relative_humidity_2m,
            wind_speed: block.wind_speed_10m,
            weather_code: block.weather_code,
            is_day: block.is_day == 1,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<f64>,
    #[serde(default)]
    weather_code: Vec<i32>,
    #[serde(default)]
    is_day: Vec<u8>,
    #[serde(default)]
    precipitation: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: CurrentBlock,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    current: CurrentBlock,
    hourly: HourlyBlock,
}

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    hourly: HourlyBlock,
}

/// Current conditions plus the hourly strip for the detail view
#[derive(Debug, Clone)]
pub struct DetailForecast {
    pub current: CurrentConditions,
    pub hourly: Vec<HourSlot>,
}

/// Open-Meteo client
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Arc<Client>,
    base_url: Url,
}

impl ForecastClient {
    /// Client against the public Open-Meteo endpoint
    pub fn new() -> Result<Self, WeatherError> {
        Self::configured(OPEN_METEO_URL, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    /// Client against a specific endpoint (tests, proxies)
    pub fn configured(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| WeatherError::Parse(format!("forecast base URL: {e}")))?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
        })
    }

    /// Current conditions at one point
    pub async fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions, WeatherError> {
        tracing::debug!(latitude, longitude, "fetching current conditions");

        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("temperature_unit", "celsius".to_string()),
                ("wind_speed_unit", "ms".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;
        let response = check_response(response).await?;

        let body: CurrentResponse = response.json().await?;
        Ok(body.current.into())
    }

    /// Current conditions plus two days of hourly slots for the detail view
    pub async fn detail(&self, latitude: f64, longitude: f64) -> Result<DetailForecast, WeatherError> {
        tracing::debug!(latitude, longitude, "fetching detail forecast");

        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("hourly", "temperature_2m,weather_code,is_day".to_string()),
                ("temperature_unit", "celsius".to_string()),
                ("wind_speed_unit", "ms".to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", "2".to_string()),
            ])
            .send()
            .await?;
        let response = check_response(response).await?;

        let body: DetailResponse = response.json().await?;
        let hourly = body
            .hourly
            .time
            .iter()
            .zip(&body.hourly.temperature_2m)
            .zip(body.hourly.weather_code.iter().zip(&body.hourly.is_day))
            .map(|((time, temperature), (weather_code, is_day))| HourSlot {
                time: time.clone(),
                temperature: *temperature,
                weather_code: *weather_code,
                is_day: *is_day == 1,
            })
            .collect();

        Ok(DetailForecast {
            current: body.current.into(),
            hourly,
        })
    }

    /// One day of hourly samples (with precipitation) for a route checkpoint
    pub async fn route_point(&self, latitude: f64, longitude: f64) -> Result<Vec<RouteSample>, WeatherError> {
        tracing::debug!(latitude, longitude, "fetching route checkpoint forecast");

        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                (
                    "hourly",
                    "weather_code,temperature_2m,precipitation,is_day".to_string(),
                ),
                ("temperature_unit", "celsius".to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", "1".to_string()),
            ])
            .send()
            .await?;
        let response = check_response(response).await?;

        let body: HourlyResponse = response.json().await?;
        let hourly = body.hourly;

        let samples = hourly
            .time
            .iter()
            .enumerate()
            .map(|(i, time)| RouteSample {
                time: time.clone(),
                weather_code: hourly.weather_code.get(i).copied().unwrap_or_default(),
                temperature: hourly.temperature_2m.get(i).copied().unwrap_or_default(),
                precipitation: hourly.precipitation.get(i).copied().unwrap_or_default(),
                is_day: hourly.is_day.get(i).copied().unwrap_or_default() == 1,
            })
            .collect();

        Ok(samples)
    }
}

async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, WeatherError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(WeatherError::Upstream {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}

/// Hour-of-day of a provider timestamp ("2026-08-06T07:00")
pub fn hour_of(time: &str) -> Option<u32> {
    NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|t| t.hour())
}

/// First sample whose local hour matches `hour`
pub fn sample_at_hour(samples: &[RouteSample], hour: u32) -> Option<&RouteSample> {
    samples.iter().find(|s| hour_of(&s.time) == Some(hour))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_of_iso_minutes() {
        assert_eq!(hour_of("2026-08-06T07:00"), Some(7));
        assert_eq!(hour_of("2026-08-06T23:00"), Some(23));
    }

    #[test]
    fn test_hour_of_with_seconds() {
        assert_eq!(hour_of("2026-08-06T07:00:00"), Some(7));
    }

    #[test]
    fn test_hour_of_garbage_is_none() {
        assert_eq!(hour_of("not-a-time"), None);
        assert_eq!(hour_of(""), None);
    }

    fn sample(time: &str, code: i32) -> RouteSample {
        RouteSample {
            time: time.to_string(),
            weather_code: code,
            temperature: 25.0,
            precipitation: 0.0,
            is_day: true,
        }
    }

    #[test]
    fn test_sample_at_hour_finds_match() {
        let samples = vec![
            sample("2026-08-06T06:00", 0),
            sample("2026-08-06T07:00", 61),
            sample("2026-08-06T08:00", 3),
        ];
        let hit = sample_at_hour(&samples, 7).unwrap();
        assert_eq!(hit.weather_code, 61);
    }

    #[test]
    fn test_sample_at_hour_missing_hour() {
        let samples = vec![sample("2026-08-06T06:00", 0)];
        assert!(sample_at_hour(&samples, 13).is_none());
    }

    #[test]
    fn test_detail_response_parsing() {
        let json = r#"{
            "current": {
                "temperature_2m": 24.5,
                "relative_humidity_2m": 78,
                "weather_code": 3,
                "wind_speed_10m": 2.1,
                "is_day": 1
            },
            "hourly": {
                "time": ["2026-08-06T00:00", "2026-08-06T01:00"],
                "temperature_2m": [22.0, 21.4],
                "weather_code": [2, 3],
                "is_day": [0, 0]
            }
        }"#;
        let parsed: DetailResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.current.weather_code, 3);
        assert_eq!(parsed.hourly.time.len(), 2);
        // precipitation not requested for the detail view
        assert!(parsed.hourly.precipitation.is_empty());
    }

    #[test]
    fn test_current_block_day_flag() {
        let block = CurrentBlock {
            temperature_2m: 30.0,
            relative_humidity_2m: 40,
            weather_code: 0,
            wind_speed_10m: 1.0,
            is_day: 0,
        };
        let current: CurrentConditions = block.into();
        assert!(!current.is_day);
        assert_eq!(current.humidity, 40);
    }
}
