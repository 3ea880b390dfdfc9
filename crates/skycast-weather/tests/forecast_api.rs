//! Integration tests for ForecastClient against a mocked Open-Meteo.

use std::time::Duration;

use skycast_weather::{ForecastClient, WeatherError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ForecastClient {
    ForecastClient::configured(&server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_current_conditions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("timezone", "auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current": {
                "temperature_2m": 27.3,
                "relative_humidity_2m": 64,
                "weather_code": 2,
                "wind_speed_10m": 3.4,
                "is_day": 1
            }
        })))
        .mount(&server)
        .await;

    let current = client(&server).current(-6.9, 107.6).await.unwrap();
    assert_eq!(current.temperature, 27.3);
    assert_eq!(current.humidity, 64);
    assert_eq!(current.weather_code, 2);
    assert!(current.is_day);
}

#[tokio::test]
async fn test_detail_zips_hourly_slots() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("forecast_days", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current": {
                "temperature_2m": 22.0,
                "relative_humidity_2m": 81,
                "weather_code": 61,
                "wind_speed_10m": 1.8,
                "is_day": 0
            },
            "hourly": {
                "time": ["2026-08-06T00:00", "2026-08-06T01:00", "2026-08-06T02:00"],
                "temperature_2m": [21.0, 20.6, 20.1],
                "weather_code": [3, 61, 61],
                "is_day": [0, 0, 0]
            }
        })))
        .mount(&server)
        .await;

    let detail = client(&server).detail(-6.9, 107.6).await.unwrap();
    assert_eq!(detail.current.weather_code, 61);
    assert_eq!(detail.hourly.len(), 3);
    assert_eq!(detail.hourly[1].weather_code, 61);
    assert!(!detail.hourly[1].is_day);
}

#[tokio::test]
async fn test_route_point_includes_precipitation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("forecast_days", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "hourly": {
                "time": ["2026-08-06T06:00", "2026-08-06T07:00"],
                "weather_code": [0, 80],
                "temperature_2m": [23.0, 22.4],
                "precipitation": [0.0, 1.7],
                "is_day": [1, 1]
            }
        })))
        .mount(&server)
        .await;

    let samples = client(&server).route_point(-6.9, 107.6).await.unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[1].weather_code, 80);
    assert_eq!(samples[1].precipitation, 1.7);
}

#[tokio::test]
async fn test_upstream_error_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = client(&server).current(0.0, 0.0).await.unwrap_err();
    match err {
        WeatherError::Upstream { status, .. } => assert_eq!(status, 429),
        other => panic!("expected upstream error, got {other:?}"),
    }
}
