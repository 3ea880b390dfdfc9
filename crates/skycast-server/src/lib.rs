//! Skycast HTTP backend
//!
//! Thin warp service over the weather aggregation crate: JSON API routes,
//! static frontend assets, and the weather-news feed.

pub mod error_mapping;
pub mod news;
pub mod routes;

pub use news::{NewsClient, NewsItem};
pub use routes::{routes, AppState};
