use serde::{Deserialize, Serialize};

/// Display-level sky condition mapped from WMO codes.
///
/// This is the fine-grained mapping used for cards and hourly strips; the
/// stability model uses its own coarser four-state classification.
/// See: https://open-meteo.com/en/docs#weathervariables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SkyCondition {
    ClearSky,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    SlightRain,
    ModerateRain,
    HeavyRain,
    RainShowers,
    Thunderstorm,
    /// Codes without a dedicated card treatment (sleet, snow, rare codes)
    #[default]
    Variable,
}

impl SkyCondition {
    /// Convert a WMO weather code to a display condition
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::ClearSky,
            1 | 2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            61 => Self::SlightRain,
            63 => Self::ModerateRain,
            65 => Self::HeavyRain,
            80 | 81 | 82 => Self::RainShowers,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Variable,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::ClearSky => "Clear Sky",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Overcast => "Overcast",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::SlightRain => "Slight Rain",
            Self::ModerateRain => "Moderate Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::RainShowers => "Rain Showers",
            Self::Thunderstorm => "Thunderstorm",
            Self::Variable => "Variable",
        }
    }

    /// Frontend icon class; clear and partly-cloudy swap for night variants
    pub fn icon_class(&self, is_day: bool) -> &'static str {
        match self {
            Self::ClearSky => {
                if is_day {
                    "fas fa-sun"
                } else {
                    "fas fa-moon"
                }
            }
            Self::PartlyCloudy => {
                if is_day {
                    "fas fa-cloud-sun"
                } else {
                    "fas fa-cloud-moon"
                }
            }
            Self::Overcast => "fas fa-cloud",
            Self::Fog => "fas fa-smog",
            Self::Drizzle | Self::SlightRain => "fas fa-cloud-rain",
            Self::ModerateRain | Self::HeavyRain | Self::RainShowers => {
                "fas fa-cloud-showers-heavy"
            }
            Self::Thunderstorm => "fas fa-bolt",
            Self::Variable => "fas fa-question-circle",
        }
    }
}

/// A geocoded place
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPlace {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    pub name: String,
}

/// Current conditions at one point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub weather_code: i32,
    pub is_day: bool,
}

/// One hourly forecast slot (time is the provider's ISO-8601 local string)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourSlot {
    pub time: String,
    pub temperature: f64,
    pub weather_code: i32,
    pub is_day: bool,
}

/// Hourly sample used by the route assembler (includes precipitation)
#[derive(Debug, Clone)]
pub struct RouteSample {
    pub time: String,
    pub weather_code: i32,
    pub temperature: f64,
    pub precipitation: f64,
    pub is_day: bool,
}

/// Weather at one route checkpoint, shaped for the map overlay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePointWeather {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    pub time: String,
    pub condition: String,
    pub precipitation: f64,
    #[serde(rename = "temp")]
    pub temperature: f64,
    #[serde(rename = "wmoCode")]
    pub weather_code: i32,
}

/// Merged rule-based and Markov-based route advice
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAdvice {
    pub needs_umbrella: bool,
    pub needs_rain_coat: bool,
    pub highest_precipitation: f64,
    /// Stability message from the Markov analysis
    pub major_condition: String,
    pub markov_risk_score: f64,
}

/// Full route assessment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteWeather {
    pub start: GeoPlace,
    pub end: GeoPlace,
    pub rain_points: Vec<RoutePointWeather>,
    pub advice: RouteAdvice,
}

/// Weather aggregation errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Location not found: {0}")]
    LocationNotFound(String),
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Forecast data missing: {0}")]
    MissingData(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmo_code_clear_sky() {
        assert_eq!(SkyCondition::from_wmo_code(0), SkyCondition::ClearSky);
    }

    #[test]
    fn test_wmo_code_partly_cloudy() {
        assert_eq!(SkyCondition::from_wmo_code(1), SkyCondition::PartlyCloudy);
        assert_eq!(SkyCondition::from_wmo_code(2), SkyCondition::PartlyCloudy);
    }

    #[test]
    fn test_wmo_code_overcast() {
        assert_eq!(SkyCondition::from_wmo_code(3), SkyCondition::Overcast);
    }

    #[test]
    fn test_wmo_code_fog() {
        assert_eq!(SkyCondition::from_wmo_code(45), SkyCondition::Fog);
        assert_eq!(SkyCondition::from_wmo_code(48), SkyCondition::Fog);
    }

    #[test]
    fn test_wmo_code_rain_tiers() {
        assert_eq!(SkyCondition::from_wmo_code(51), SkyCondition::Drizzle);
        assert_eq!(SkyCondition::from_wmo_code(61), SkyCondition::SlightRain);
        assert_eq!(SkyCondition::from_wmo_code(63), SkyCondition::ModerateRain);
        assert_eq!(SkyCondition::from_wmo_code(65), SkyCondition::HeavyRain);
        assert_eq!(SkyCondition::from_wmo_code(80), SkyCondition::RainShowers);
        assert_eq!(SkyCondition::from_wmo_code(82), SkyCondition::RainShowers);
    }

    #[test]
    fn test_wmo_code_thunderstorm() {
        assert_eq!(SkyCondition::from_wmo_code(95), SkyCondition::Thunderstorm);
        assert_eq!(SkyCondition::from_wmo_code(96), SkyCondition::Thunderstorm);
        assert_eq!(SkyCondition::from_wmo_code(99), SkyCondition::Thunderstorm);
    }

    #[test]
    fn test_wmo_code_unmapped_is_variable() {
        assert_eq!(SkyCondition::from_wmo_code(71), SkyCondition::Variable);
        assert_eq!(SkyCondition::from_wmo_code(-1), SkyCondition::Variable);
        assert_eq!(SkyCondition::from_wmo_code(100), SkyCondition::Variable);
    }

    #[test]
    fn test_icon_day_night_variants() {
        assert_eq!(SkyCondition::ClearSky.icon_class(true), "fas fa-sun");
        assert_eq!(SkyCondition::ClearSky.icon_class(false), "fas fa-moon");
        assert_eq!(
            SkyCondition::PartlyCloudy.icon_class(false),
            "fas fa-cloud-moon"
        );
        // Non-clear icons ignore day/night
        assert_eq!(
            SkyCondition::Thunderstorm.icon_class(true),
            SkyCondition::Thunderstorm.icon_class(false)
        );
    }

    #[test]
    fn test_route_advice_serializes_camel_case() {
        let advice = RouteAdvice {
            needs_umbrella: true,
            needs_rain_coat: false,
            highest_precipitation: 1.2,
            major_condition: "steady".to_string(),
            markov_risk_score: 12.0,
        };
        let json = serde_json::to_value(&advice).unwrap();
        assert_eq!(json["needsUmbrella"], true);
        assert_eq!(json["needsRainCoat"], false);
        assert_eq!(json["highestPrecipitation"], 1.2);
        assert_eq!(json["markovRiskScore"], 12.0);
    }

    #[test]
    fn test_route_point_field_names() {
        let point = RoutePointWeather {
            latitude: -6.9,
            longitude: 107.6,
            time: "2026-08-06T07:00".to_string(),
            condition: "Overcast".to_string(),
            precipitation: 0.4,
            temperature: 24.5,
            weather_code: 3,
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["lat"], -6.9);
        assert_eq!(json["temp"], 24.5);
        assert_eq!(json["wmoCode"], 3);
    }
}
