//! Weather aggregation for Skycast
//!
//! Provides Nominatim geocoding, Open-Meteo forecast access, and the
//! Markov-chain stability model used to score route-level weather risk.

pub mod advice;
pub mod forecast;
pub mod geocode;
pub mod stability;
pub mod types;

pub use advice::RouteAdvisor;
pub use forecast::ForecastClient;
pub use geocode::GeocodeClient;
pub use stability::{
    RiskAssessment, StabilityConfig, StabilityPredictor, TransitionTable, WeatherState,
};
pub use types::*;
