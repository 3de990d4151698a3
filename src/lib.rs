//! Weather aggregation engine.
//!
//! Turns raw feeds from two independent providers — FMI gridded-model
//! forecasts and ground observations (XML/WFS), Open-Meteo categorical
//! weather codes and UV index (JSON) — into one normalized, time-bucketed
//! [`models::LocalWeather`] summary for a location and a configurable
//! "display day" boundary.
//!
//! Data flow: provider clients parse payloads into typed data points;
//! the day-boundary calculator turns the switch hour + timezone into
//! absolute UTC bucket edges; the aggregators merge the series
//! (observations take precedence over forecasts), bucket them and
//! resolve weather symbols across the two providers' vocabularies.
//!
//! The engine computes each request fresh: no caching, no persistence,
//! no retries. Entry points should call [`symbols::verify_symbol_tables`]
//! once at startup; the symbol tables are the only process-wide state
//! and are immutable.

pub mod config;
pub mod dates;
pub mod errors;
mod helpers;
pub mod models;
pub mod services;
pub mod symbols;

pub use config::{AppConfig, WeatherOptions};
pub use errors::WeatherError;
pub use models::LocalWeather;
pub use services::fmi::FmiClient;
pub use services::meteo::MeteoClient;
pub use services::simulate::generate_random_local_weather;
pub use services::weather::get_local_weather;
