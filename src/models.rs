//! Engine output data model.
//!
//! Every type here is created fresh per request, immutable after
//! construction and serializable for the downstream rendering/debug
//! layers. All timestamps are absolute UTC instants.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Geographic query point, passed through to provider requests unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Hour with the highest forecast UV index within the active day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxUvIndex {
    pub value: f64,
    pub time: DateTime<Utc>,
}

/// One aggregated short-term bucket.
///
/// `Forecast` buckets are backed by at least one model data point;
/// `Observation` buckets contain ground-station data only and carry a
/// weather symbol borrowed from Open-Meteo's hourly forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShortTermWeatherDataPoint {
    #[serde(rename_all = "camelCase")]
    Forecast {
        time: DateTime<Utc>,
        temperature: f64,
        wind_speed_ms: f64,
        wind_gust_ms: f64,
        pressure: f64,
        dew_point: f64,
        /// Hourly precipitation of the bucket-start data point.
        precipitation_1h: f64,
        /// Precipitation summed across the bucket; `None` when any
        /// contributing reading was non-finite.
        precipitation_amount_from_now_to_next: Option<f64>,
        /// FMI symbol code, guaranteed to resolve to a description.
        symbol: u8,
    },
    #[serde(rename_all = "camelCase")]
    Observation {
        time: DateTime<Utc>,
        temperature: f64,
        wind_speed_ms: f64,
        precipitation_1h: f64,
        precipitation_amount_from_now_to_next: Option<f64>,
        symbol: u8,
    },
}

impl ShortTermWeatherDataPoint {
    pub fn time(&self) -> DateTime<Utc> {
        match self {
            ShortTermWeatherDataPoint::Forecast { time, .. }
            | ShortTermWeatherDataPoint::Observation { time, .. } => *time,
        }
    }

    pub fn symbol(&self) -> u8 {
        match self {
            ShortTermWeatherDataPoint::Forecast { symbol, .. }
            | ShortTermWeatherDataPoint::Observation { symbol, .. } => *symbol,
        }
    }
}

/// One aggregated day of the long-term forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LongTermWeatherDataPoint {
    /// Start of the forecast day (UTC instant of the day bucket's edge).
    pub time: DateTime<Utc>,
    pub avg_temperature: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub avg_wind_speed_ms: f64,
    pub min_wind_speed_ms: f64,
    pub max_wind_speed_ms: f64,
    pub precipitation_amount_from_now_to_next: Option<f64>,
    pub symbol: u8,
}

/// Temperature extremes across forecasts and observations combined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureRange {
    pub min_temperature: f64,
    pub max_temperature: f64,
}

/// Forecast-only aggregates for the active day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayForecastSummary {
    pub avg_temperature: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub avg_wind_speed_ms: f64,
    pub min_wind_speed_ms: f64,
    pub max_wind_speed_ms: f64,
    pub max_wind_gust_ms: f64,
    /// Most frequent symbol among the day's forecast points.
    pub symbol: u8,
    pub description: &'static str,
    pub max_uv_index: MaxUvIndex,
    pub precipitation_amount: Option<f64>,
}

/// Headline summary for the active day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherTodaySummary {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub day_duration_in_seconds: i64,
    /// Extremes over observations and forecasts together.
    pub all: TemperatureRange,
    pub forecast: TodayForecastSummary,
}

/// Root aggregate handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalWeather {
    pub today_summary: WeatherTodaySummary,
    pub forecast_short_term: Vec<ShortTermWeatherDataPoint>,
    /// Hour-by-hour variant of the short-term forecast, for renderers
    /// that draw a continuous graph.
    pub hourly_data_points: Vec<ShortTermWeatherDataPoint>,
    pub forecast_long_term: Vec<LongTermWeatherDataPoint>,
}
