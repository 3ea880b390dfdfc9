pub mod config;
pub mod error;

pub use config::{Config, NewsConfig, ServerConfig, StabilitySettings, WeatherConfig};
pub use error::{AppError, ConfigError, NetworkError, NewsError, WeatherError};

use anyhow::Result;

/// Initialize the backend core (logging).
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Skycast core initialized");
    Ok(())
}
