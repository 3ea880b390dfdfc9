//! HTTP API filters and handlers.
//!
//! Every handler replies with JSON: missing parameters are a 400, upstream
//! failures become a 500 carrying a user-facing message, and the news route
//! degrades to an empty list rather than dropping the dashboard panel.

use std::collections::HashMap;
use std::convert::Infallible;
use std::path::PathBuf;

use chrono::{Local, Timelike};
use serde::Serialize;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use skycast_weather::forecast::hour_of;
use skycast_weather::{ForecastClient, GeocodeClient, RouteAdvisor, SkyCondition, WeatherError};

use crate::error_mapping::{news_app_error, weather_app_error};
use crate::news::{NewsClient, NewsItem};

/// Shared handles for route handlers
#[derive(Clone)]
pub struct AppState {
    pub geocode: GeocodeClient,
    pub forecast: ForecastClient,
    pub advisor: RouteAdvisor,
    pub news: NewsClient,
}

/// Current-conditions card payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WeatherCard {
    temp: f64,
    city: String,
    condition: &'static str,
    icon: &'static str,
    humidity: u8,
    wind_speed: f64,
    is_night: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailCurrent {
    temp: f64,
    humidity: u8,
    wind_speed: f64,
    condition: &'static str,
    icon: &'static str,
}

/// One slot of the 24-hour strip
#[derive(Debug, Serialize)]
struct HourlyEntry {
    time: String,
    temp: i64,
    icon: &'static str,
    condition: &'static str,
}

#[derive(Debug, Serialize)]
struct WeatherDetail {
    city: String,
    current: DetailCurrent,
    hourly: Vec<HourlyEntry>,
}

#[derive(Debug, Serialize)]
struct ErrorReply {
    error: String,
}

#[derive(Debug, Serialize)]
struct NewsReply {
    news: Vec<NewsItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Assemble the full filter tree: API routes, static assets, CORS
pub fn routes(
    state: AppState,
    static_dir: PathBuf,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let api = weather(state.clone())
        .or(weather_detail(state.clone()))
        .or(route_weather(state.clone()))
        .or(weather_news(state));

    let home = warp::get()
        .and(warp::path::end())
        .and(warp::fs::file(static_dir.join("home.html")));

    api.or(home)
        .or(warp::fs::dir(static_dir))
        .with(warp::cors().allow_any_origin())
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Query parameters as a loose map; a request with no query string at all
/// yields an empty map instead of a rejection.
fn query_map() -> impl Filter<Extract = (HashMap<String, String>,), Error = Infallible> + Clone {
    warp::query::<HashMap<String, String>>()
        .or(warp::any().map(HashMap::new))
        .unify()
}

fn weather(state: AppState) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::get()
        .and(warp::path!("api" / "weather"))
        .and(query_map())
        .and(with_state(state))
        .and_then(handle_weather)
}

fn weather_detail(state: AppState) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::get()
        .and(warp::path!("api" / "weather-detail"))
        .and(query_map())
        .and(with_state(state))
        .and_then(handle_weather_detail)
}

fn route_weather(state: AppState) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::get()
        .and(warp::path!("api" / "route-weather"))
        .and(query_map())
        .and(with_state(state))
        .and_then(handle_route_weather)
}

fn weather_news(state: AppState) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::get()
        .and(warp::path!("api" / "weather-news"))
        .and(with_state(state))
        .and_then(handle_weather_news)
}

async fn handle_weather(
    params: HashMap<String, String>,
    state: AppState,
) -> Result<impl Reply, Infallible> {
    let (city, latitude, longitude) = if let Some(location) = params.get("location") {
        match state.geocode.search(location).await {
            Ok(place) => (place.name, place.latitude, place.longitude),
            Err(e) => return Ok(error_reply(e)),
        }
    } else if let Some((lat, lon)) = params.get("lat").zip(params.get("lon")) {
        let (Ok(latitude), Ok(longitude)) = (lat.parse::<f64>(), lon.parse::<f64>()) else {
            return Ok(bad_request("Invalid lat/lon"));
        };
        // Label bare coordinates via reverse geocoding; fall back gracefully
        let city = state
            .geocode
            .reverse(latitude, longitude)
            .await
            .unwrap_or_else(|| "Your Location".to_string());
        (city, latitude, longitude)
    } else {
        return Ok(bad_request("Location required"));
    };

    let current = match state.forecast.current(latitude, longitude).await {
        Ok(c) => c,
        Err(e) => return Ok(error_reply(e)),
    };

    let condition = SkyCondition::from_wmo_code(current.weather_code);
    Ok(json_reply(
        StatusCode::OK,
        &WeatherCard {
            temp: current.temperature,
            city,
            condition: condition.description(),
            icon: condition.icon_class(current.is_day),
            humidity: current.humidity,
            wind_speed: current.wind_speed,
            is_night: !current.is_day,
        },
    ))
}

async fn handle_weather_detail(
    params: HashMap<String, String>,
    state: AppState,
) -> Result<impl Reply, Infallible> {
    let Some(location) = params.get("location") else {
        return Ok(bad_request("Location required"));
    };

    let place = match state.geocode.search(location).await {
        Ok(p) => p,
        Err(e) => return Ok(error_reply(e)),
    };
    let detail = match state.forecast.detail(place.latitude, place.longitude).await {
        Ok(d) => d,
        Err(e) => return Ok(error_reply(e)),
    };

    // Align the strip to the current local hour; fall back to the series head
    let now_hour = Local::now().hour();
    let start_index = detail
        .hourly
        .iter()
        .position(|slot| hour_of(&slot.time) == Some(now_hour))
        .unwrap_or(0);

    let hourly: Vec<HourlyEntry> = detail
        .hourly
        .iter()
        .skip(start_index)
        .take(24)
        .map(|slot| {
            let condition = SkyCondition::from_wmo_code(slot.weather_code);
            HourlyEntry {
                time: hour_of(&slot.time)
                    .map(|h| format!("{h}:00"))
                    .unwrap_or_else(|| slot.time.clone()),
                temp: slot.temperature.round() as i64,
                icon: condition.icon_class(slot.is_day),
                condition: condition.description(),
            }
        })
        .collect();

    let current_condition = SkyCondition::from_wmo_code(detail.current.weather_code);
    Ok(json_reply(
        StatusCode::OK,
        &WeatherDetail {
            city: place.name,
            current: DetailCurrent {
                temp: detail.current.temperature,
                humidity: detail.current.humidity,
                wind_speed: detail.current.wind_speed,
                condition: current_condition.description(),
                icon: current_condition.icon_class(detail.current.is_day),
            },
            hourly,
        },
    ))
}

async fn handle_route_weather(
    params: HashMap<String, String>,
    state: AppState,
) -> Result<impl Reply, Infallible> {
    let (Some(start), Some(end)) = (params.get("start"), params.get("end")) else {
        return Ok(bad_request("Start/End required."));
    };

    let start_hour = params
        .get("startTime")
        .and_then(|t| t.parse::<u32>().ok())
        .unwrap_or_else(|| Local::now().hour());

    match state.advisor.assess(start, end, start_hour).await {
        Ok(route) => Ok(json_reply(StatusCode::OK, &route)),
        Err(e) => Ok(error_reply(e)),
    }
}

async fn handle_weather_news(state: AppState) -> Result<impl Reply, Infallible> {
    match state.news.headlines().await {
        Ok(news) => Ok(json_reply(StatusCode::OK, &NewsReply { news, error: None })),
        Err(e) => {
            let app = news_app_error(e);
            tracing::error!("News fetch failed: {app}");
            // The dashboard panel degrades; the reply still carries the shape
            Ok(json_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                &NewsReply {
                    news: Vec::new(),
                    error: Some(app.user_message().to_string()),
                },
            ))
        }
    }
}

fn json_reply<T: Serialize>(
    status: StatusCode,
    body: &T,
) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(body), status)
}

fn bad_request(message: &str) -> warp::reply::WithStatus<warp::reply::Json> {
    json_reply(
        StatusCode::BAD_REQUEST,
        &ErrorReply {
            error: message.to_string(),
        },
    )
}

fn error_reply(e: WeatherError) -> warp::reply::WithStatus<warp::reply::Json> {
    let app = weather_app_error(e);
    tracing::error!("API error: {app}");
    json_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        &ErrorReply {
            error: app.user_message().to_string(),
        },
    )
}
