//! Geocoding: resolve place names to coordinates and back.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::types::{GeoPlace, WeatherError};

const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "skycast/0.1 (weather dashboard backend)";

#[derive(Debug, Deserialize)]
struct SearchResult {
    // Nominatim serializes coordinates as strings
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<ReverseAddress>,
}

#[derive(Debug, Deserialize)]
struct ReverseAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    #[serde(rename = "state_district")]
    state_district: Option<String>,
    state: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

/// Nominatim client for forward and reverse geocoding
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Arc<Client>,
    base_url: Url,
}

impl GeocodeClient {
    /// Client against the public Nominatim instance
    pub fn new() -> Result<Self, WeatherError> {
        Self::configured(
            NOMINATIM_BASE_URL,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        )
    }

    /// Client against a specific base URL (tests, self-hosted instances)
    pub fn configured(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| WeatherError::Parse(format!("geocode base URL: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, WeatherError> {
        self.base_url
            .join(path)
            .map_err(|e| WeatherError::Parse(format!("geocode endpoint {path}: {e}")))
    }

    /// Resolve a free-form place name to coordinates and a short name.
    ///
    /// The short name is the first comma-segment of Nominatim's display name
    /// (e.g. "Bandung" out of "Bandung, West Java, Indonesia").
    pub async fn search(&self, query: &str) -> Result<GeoPlace, WeatherError> {
        tracing::debug!(query, "forward geocoding");

        let response = self
            .client
            .get(self.endpoint("search")?)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let results: Vec<SearchResult> = response.json().await?;
        let Some(hit) = results.into_iter().next() else {
            return Err(WeatherError::LocationNotFound(query.to_string()));
        };

        let latitude: f64 = hit
            .lat
            .parse()
            .map_err(|_| WeatherError::Parse(format!("latitude '{}'", hit.lat)))?;
        let longitude: f64 = hit
            .lon
            .parse()
            .map_err(|_| WeatherError::Parse(format!("longitude '{}'", hit.lon)))?;
        let name = hit
            .display_name
            .split(',')
            .next()
            .unwrap_or(&hit.display_name)
            .trim()
            .to_string();

        tracing::info!(query, %name, latitude, longitude, "geocoded");
        Ok(GeoPlace {
            latitude,
            longitude,
            name,
        })
    }

    /// Reverse geocode coordinates to a human-readable place name
    /// (e.g. "Seattle, Washington").
    /// Returns `None` on failure or timeout; the caller can fall back to a
    /// generic label.
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Option<String> {
        let url = match self.endpoint("reverse") {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!("Failed to build reverse geocode URL: {}", e);
                return None;
            }
        };

        let response = match self
            .client
            .get(url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("layer", "address".to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return None;
        }

        let body: ReverseResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        let result = compose_place_label(body.address?)?;
        tracing::info!("Reverse geocoded to: {}", result);
        Some(result)
    }
}

/// Pick the most specific place name, disambiguated with state or country
fn compose_place_label(addr: ReverseAddress) -> Option<String> {
    // Capture state/country before the place chain consumes them
    let state = addr.state.clone();
    let country = addr.country.clone();

    // Prefer city > town > village > municipality for the primary place name
    let place = addr
        .city
        .or(addr.town)
        .or(addr.village)
        .or(addr.municipality)
        .or(addr.state_district)
        .or(addr.county)
        .or(addr.state)
        .or(addr.country)?;

    // Add state/country for disambiguation when different from place
    let suffix = state
        .as_ref()
        .filter(|s| !s.is_empty() && s.as_str() != place)
        .map(String::as_str)
        .or_else(|| {
            country
                .as_ref()
                .filter(|c| !c.is_empty() && c.as_str() != place)
                .map(String::as_str)
        });

    Some(match suffix {
        Some(s) => format!("{}, {}", place, s),
        None => place,
    })
}
