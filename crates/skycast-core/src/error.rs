//! Centralized error types for the Skycast backend.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for API responses
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// All errors in the Skycast backend should be convertible to this type.
/// Use `user_message()` to get a response-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("News feed error: {0}")]
    News(#[from] NewsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for an API error reply.
    ///
    /// These messages are designed to be actionable and non-technical.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::News(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to reach the weather provider. Check connectivity."
            }
            NetworkError::Timeout => "The upstream request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The weather provider is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The upstream request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response from the weather provider."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Weather aggregation errors (geocoding + forecast).
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Weather API error: {0}")]
    ApiError(String),

    #[error("Forecast data incomplete: {0}")]
    IncompleteData(String),

    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::LocationNotFound(_) => "Location not found. Check and try again.",
            WeatherError::ApiError(_) => "Weather service error. Please try again.",
            WeatherError::IncompleteData(_) => {
                "The forecast for that place is incomplete. Try again later."
            }
            WeatherError::ServiceUnavailable => {
                "Weather service unavailable. Please try again later."
            }
        }
    }
}

/// News feed errors.
#[derive(Debug, Error)]
pub enum NewsError {
    #[error("News feed unavailable: {0}")]
    FeedUnavailable(String),

    #[error("Malformed feed: {0}")]
    Malformed(String),
}

impl NewsError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NewsError::FeedUnavailable(_) => "Weather news is unavailable right now.",
            NewsError::Malformed(_) => "The news feed could not be read.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_conversion() {
        let weather_err = WeatherError::ServiceUnavailable;
        let app_err: AppError = weather_err.into();
        assert!(matches!(
            app_err,
            AppError::Weather(WeatherError::ServiceUnavailable)
        ));
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Weather(WeatherError::LocationNotFound("Atlantis".into()));
        assert_eq!(
            app_err.user_message(),
            "Location not found. Check and try again."
        );
    }

    #[test]
    fn test_server_error_message_by_status() {
        let gateway = NetworkError::ServerError {
            status: 502,
            message: "bad gateway".into(),
        };
        assert!(gateway.user_message().contains("experiencing issues"));

        let client = NetworkError::ServerError {
            status: 404,
            message: "not found".into(),
        };
        assert!(client.user_message().contains("request failed"));
    }

    #[test]
    fn test_news_errors_have_messages() {
        assert!(!NewsError::FeedUnavailable("dns".into())
            .user_message()
            .is_empty());
        assert!(!NewsError::Malformed("no items".into())
            .user_message()
            .is_empty());
    }
}
