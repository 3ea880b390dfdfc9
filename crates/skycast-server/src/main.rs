use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use skycast_core::Config;
use skycast_server::{AppState, NewsClient};
use skycast_weather::stability::{StabilityConfig, StabilityPredictor};
use skycast_weather::{ForecastClient, GeocodeClient, RouteAdvisor};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core (logging)
    skycast_core::init()?;

    let (config, _warnings) = Config::load_validated()?;
    tracing::info!("Config directory: {}", config.config_dir.display());

    let timeout = Duration::from_secs(config.weather.request_timeout_secs);
    let geocode = GeocodeClient::configured(&config.weather.geocode_base_url, timeout)
        .context("Failed to create geocoding client")?;
    let forecast = ForecastClient::configured(&config.weather.forecast_base_url, timeout)
        .context("Failed to create forecast client")?;
    let predictor = StabilityPredictor::new(StabilityConfig {
        trials: config.stability.trials,
        horizon_hours: config.stability.horizon_hours,
    });
    let advisor = RouteAdvisor::new(geocode.clone(), forecast.clone(), predictor);
    let news = NewsClient::new(&config.news.feed_url, config.news.max_items, timeout)
        .context("Failed to create news client")?;

    let state = AppState {
        geocode,
        forecast,
        advisor,
        news,
    };
    let port = config.server.port;
    let static_dir = PathBuf::from(&config.server.static_dir);

    tracing::info!("Skycast listening at http://0.0.0.0:{port}");
    warp::serve(skycast_server::routes(state, static_dir))
        .run(([0, 0, 0, 0], port))
        .await;

    Ok(())
}
