//! Route advice: rule-based precipitation thresholds merged with the
//! Markov stability analysis.
//!
//! A route is sampled at three checkpoints (origin, geographic midpoint,
//! destination) at the requested departure hour. The rule layer drives the
//! umbrella/rain-coat flags; the Markov layer qualifies the origin forecast
//! with a degradation-risk score.

use crate::forecast::{sample_at_hour, ForecastClient};
use crate::geocode::GeocodeClient;
use crate::stability::StabilityPredictor;
use crate::types::{
    GeoPlace, RouteAdvice, RoutePointWeather, RouteSample, RouteWeather, SkyCondition,
    WeatherError,
};

/// Precipitation (mm) above which an umbrella is advised
const UMBRELLA_PRECIP_MM: f64 = 0.5;
/// Precipitation (mm) at which a rain coat is advised
const RAIN_COAT_PRECIP_MM: f64 = 2.0;
/// WMO codes from drizzle upward count as wet regardless of measured rain
const WET_CODES: std::ops::RangeInclusive<i32> = 51..=99;

#[derive(Debug, Clone)]
pub struct RouteAdvisor {
    geocode: GeocodeClient,
    forecast: ForecastClient,
    predictor: StabilityPredictor,
}

impl RouteAdvisor {
    pub fn new(
        geocode: GeocodeClient,
        forecast: ForecastClient,
        predictor: StabilityPredictor,
    ) -> Self {
        Self {
            geocode,
            forecast,
            predictor,
        }
    }

    /// Assess the weather along a route departing at `start_hour` (0-23).
    pub async fn assess(
        &self,
        origin: &str,
        destination: &str,
        start_hour: u32,
    ) -> Result<RouteWeather, WeatherError> {
        let start = self.geocode.search(origin).await?;
        let end = self.geocode.search(destination).await?;
        let (mid_latitude, mid_longitude) = midpoint(&start, &end);

        let checkpoints = [
            (start.latitude, start.longitude),
            (mid_latitude, mid_longitude),
            (end.latitude, end.longitude),
        ];

        let mut rain_points = Vec::new();
        let mut needs_umbrella = false;
        let mut highest_precipitation = 0.0f64;
        // Markov seed; stays 0 (Clear) when the origin hour has no sample
        let mut start_code = 0;

        for (i, (latitude, longitude)) in checkpoints.into_iter().enumerate() {
            let series = self.forecast.route_point(latitude, longitude).await?;
            let Some(sample) = sample_at_hour(&series, start_hour) else {
                tracing::debug!(latitude, longitude, start_hour, "no slot for requested hour");
                continue;
            };

            if i == 0 {
                start_code = sample.weather_code;
            }

            if is_wet(sample) {
                needs_umbrella = true;
                if sample.precipitation > highest_precipitation {
                    highest_precipitation = sample.precipitation;
                }
            }

            rain_points.push(RoutePointWeather {
                latitude,
                longitude,
                time: sample.time.clone(),
                condition: SkyCondition::from_wmo_code(sample.weather_code)
                    .description()
                    .to_string(),
                precipitation: round_tenth(sample.precipitation),
                temperature: round_tenth(sample.temperature),
                weather_code: sample.weather_code,
            });
        }

        let assessment = self.predictor.predict_default_horizon(start_code);
        tracing::info!(
            origin = %start.name,
            destination = %end.name,
            risk = assessment.risk_score,
            needs_umbrella,
            "route assessed"
        );

        Ok(RouteWeather {
            start,
            end,
            rain_points,
            advice: RouteAdvice {
                needs_umbrella,
                needs_rain_coat: highest_precipitation >= RAIN_COAT_PRECIP_MM,
                highest_precipitation,
                major_condition: assessment.stability_message,
                markov_risk_score: assessment.risk_score,
            },
        })
    }
}

fn is_wet(sample: &RouteSample) -> bool {
    sample.precipitation > UMBRELLA_PRECIP_MM || WET_CODES.contains(&sample.weather_code)
}

fn midpoint(a: &GeoPlace, b: &GeoPlace) -> (f64, f64) {
    (
        (a.latitude + b.latitude) / 2.0,
        (a.longitude + b.longitude) / 2.0,
    )
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(code: i32, precipitation: f64) -> RouteSample {
        RouteSample {
            time: "2026-08-06T07:00".to_string(),
            weather_code: code,
            temperature: 24.0,
            precipitation,
            is_day: true,
        }
    }

    #[test]
    fn test_wet_by_precipitation() {
        assert!(is_wet(&sample(0, 0.6)));
        // Threshold is strictly greater-than
        assert!(!is_wet(&sample(0, 0.5)));
    }

    #[test]
    fn test_wet_by_code_band() {
        assert!(is_wet(&sample(51, 0.0)));
        assert!(is_wet(&sample(99, 0.0)));
        assert!(!is_wet(&sample(50, 0.0)));
        assert!(!is_wet(&sample(100, 0.0)));
    }

    #[test]
    fn test_midpoint_is_arithmetic_mean() {
        let a = GeoPlace {
            latitude: -6.2,
            longitude: 106.8,
            name: "Jakarta".to_string(),
        };
        let b = GeoPlace {
            latitude: -6.9,
            longitude: 107.6,
            name: "Bandung".to_string(),
        };
        let (lat, lon) = midpoint(&a, &b);
        assert!((lat - -6.55).abs() < 1e-9);
        assert!((lon - 107.2).abs() < 1e-9);
    }

    #[test]
    fn test_round_tenth() {
        assert_eq!(round_tenth(1.24), 1.2);
        assert_eq!(round_tenth(1.25), 1.3);
        assert_eq!(round_tenth(0.0), 0.0);
    }
}
