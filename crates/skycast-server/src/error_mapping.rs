//! Maps service errors to skycast_core::AppError so API replies carry
//! consistent user-facing messages while handlers log the technical detail.

use skycast_core::error::ReqwestErrorExt;
use skycast_core::{AppError, NetworkError, NewsError, WeatherError};

use crate::news::NewsError as NewsServiceError;
use skycast_weather::WeatherError as WeatherServiceError;

pub fn weather_app_error(e: WeatherServiceError) -> AppError {
    match e {
        WeatherServiceError::Network(err) => AppError::Network(err.into_network_error()),
        WeatherServiceError::LocationNotFound(query) => {
            AppError::Weather(WeatherError::LocationNotFound(query))
        }
        WeatherServiceError::Upstream { status, message } => {
            AppError::Network(NetworkError::ServerError { status, message })
        }
        WeatherServiceError::Parse(message) => AppError::Weather(WeatherError::ApiError(message)),
        WeatherServiceError::MissingData(message) => {
            AppError::Weather(WeatherError::IncompleteData(message))
        }
    }
}

pub fn news_app_error(e: NewsServiceError) -> AppError {
    match e {
        NewsServiceError::Network(err) => AppError::Network(err.into_network_error()),
        NewsServiceError::Status(code) => {
            AppError::News(NewsError::FeedUnavailable(format!("status {code}")))
        }
        NewsServiceError::Pattern(err) => AppError::News(NewsError::Malformed(err.to_string())),
        NewsServiceError::InvalidUrl(message) => {
            AppError::News(NewsError::FeedUnavailable(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_not_found_keeps_query() {
        let app = weather_app_error(WeatherServiceError::LocationNotFound("Atlantis".into()));
        assert!(matches!(
            app,
            AppError::Weather(WeatherError::LocationNotFound(ref q)) if q == "Atlantis"
        ));
        assert_eq!(app.user_message(), "Location not found. Check and try again.");
    }

    #[test]
    fn test_upstream_becomes_network_error() {
        let app = weather_app_error(WeatherServiceError::Upstream {
            status: 502,
            message: "bad gateway".into(),
        });
        assert!(matches!(app, AppError::Network(_)));
        assert!(app.user_message().contains("experiencing issues"));
    }

    #[test]
    fn test_news_status_maps_to_feed_unavailable() {
        let app = news_app_error(NewsServiceError::Status(503));
        assert!(matches!(app, AppError::News(NewsError::FeedUnavailable(_))));
    }
}
