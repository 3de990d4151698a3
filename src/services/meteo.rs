//! Open-Meteo client and response parser.
//!
//! Fetches categorical weather codes (daily and hourly) from the
//! forecast endpoint and the hourly UV index from the air-quality
//! endpoint. See: https://open-meteo.com/en/docs
//!
//! Responses hold parallel time-indexed arrays; the parser zips each
//! index position into one typed record and anchors every timestamp to
//! an absolute UTC instant by interpreting the provider's wall-clock
//! values in the configured timezone. This lines hour N of the response
//! up with hour N of the local display day.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::config::WeatherOptions;
use crate::dates::{local_datetime_in_utc, today_dates};
use crate::errors::WeatherError;

const FORECAST_API_URL: &str = "https://api.open-meteo.com/v1/forecast";
const AIR_QUALITY_API_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";

/// Daily weather code, anchored at local midnight of its day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyWeatherCode {
    pub time: DateTime<Utc>,
    pub weather_code: u8,
}

/// Hourly weather code, anchored at its local hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyWeatherCode {
    pub time: DateTime<Utc>,
    pub weather_code: u8,
}

/// Hourly UV index, anchored at its local hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyUvIndex {
    pub time: DateTime<Utc>,
    pub uv_index: f64,
}

// --- Open-Meteo JSON response types ---

#[derive(Debug, Deserialize)]
struct LongTermForecastResponse {
    daily: DailySeries,
}

#[derive(Debug, Deserialize)]
struct DailySeries {
    time: Vec<String>,
    weathercode: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct ShortTermForecastResponse {
    hourly: HourlyWeatherSeries,
}

#[derive(Debug, Deserialize)]
struct HourlyWeatherSeries {
    time: Vec<String>,
    weathercode: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    hourly: HourlyUvSeries,
}

#[derive(Debug, Deserialize)]
struct HourlyUvSeries {
    time: Vec<String>,
    uv_index: Vec<f64>,
}

/// Client for the Open-Meteo forecast and air-quality APIs.
#[derive(Debug, Clone)]
pub struct MeteoClient {
    client: reqwest::Client,
    forecast_url: String,
    air_quality_url: String,
}

impl Default for MeteoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MeteoClient {
    pub fn new() -> Self {
        Self::with_base_urls(FORECAST_API_URL, AIR_QUALITY_API_URL)
    }

    /// Client against non-default endpoints (tests point these at a mock
    /// server).
    pub fn with_base_urls(
        forecast_url: impl Into<String>,
        air_quality_url: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            forecast_url: forecast_url.into(),
            air_quality_url: air_quality_url.into(),
        }
    }

    /// Fetch daily weather codes for the five days following the active
    /// day (plus one for the trailing bucket bound).
    pub async fn fetch_long_term_forecast(
        &self,
        opts: &WeatherOptions,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailyWeatherCode>, WeatherError> {
        let first_day = active_local_date(opts, now) + Duration::days(1);
        let last_day = first_day + Duration::days(5);

        let response: LongTermForecastResponse = self
            .get_json(
                &self.forecast_url,
                &[
                    ("latitude", opts.location.lat.to_string()),
                    ("longitude", opts.location.lon.to_string()),
                    ("daily", "weathercode".to_string()),
                    ("timezone", "UTC".to_string()),
                    ("start_date", first_day.format("%Y-%m-%d").to_string()),
                    ("end_date", last_day.format("%Y-%m-%d").to_string()),
                ],
            )
            .await?;

        zip_series(
            &response.daily.time,
            &response.daily.weathercode,
            "daily.weathercode",
            |time, &code| {
                Ok(DailyWeatherCode {
                    time: parse_daily_time(time, opts.timezone)?,
                    weather_code: code,
                })
            },
        )
    }

    /// Fetch hourly weather codes for the active local day. Used to
    /// backfill symbols for observation-only buckets.
    pub async fn fetch_short_term_forecast(
        &self,
        opts: &WeatherOptions,
        now: DateTime<Utc>,
    ) -> Result<Vec<HourlyWeatherCode>, WeatherError> {
        let day = active_local_date(opts, now);

        let response: ShortTermForecastResponse = self
            .get_json(
                &self.forecast_url,
                &[
                    ("latitude", opts.location.lat.to_string()),
                    ("longitude", opts.location.lon.to_string()),
                    ("hourly", "weathercode".to_string()),
                    ("timezone", "UTC".to_string()),
                    ("start_date", day.format("%Y-%m-%d").to_string()),
                    ("end_date", day.format("%Y-%m-%d").to_string()),
                ],
            )
            .await?;

        zip_series(
            &response.hourly.time,
            &response.hourly.weathercode,
            "hourly.weathercode",
            |time, &code| {
                Ok(HourlyWeatherCode {
                    time: parse_hourly_time(time, opts.timezone)?,
                    weather_code: code,
                })
            },
        )
    }

    /// Fetch the hourly UV index from the active local day up to two
    /// days ahead.
    pub async fn fetch_uv_forecast(
        &self,
        opts: &WeatherOptions,
        now: DateTime<Utc>,
    ) -> Result<Vec<HourlyUvIndex>, WeatherError> {
        let start_day = active_local_date(opts, now);
        let end_day = start_day + Duration::days(2);

        let response: AirQualityResponse = self
            .get_json(
                &self.air_quality_url,
                &[
                    ("latitude", opts.location.lat.to_string()),
                    ("longitude", opts.location.lon.to_string()),
                    ("hourly", "uv_index".to_string()),
                    ("timezone", "UTC".to_string()),
                    ("start_date", start_day.format("%Y-%m-%d").to_string()),
                    ("end_date", end_day.format("%Y-%m-%d").to_string()),
                ],
            )
            .await?;

        zip_series(
            &response.hourly.time,
            &response.hourly.uv_index,
            "hourly.uv_index",
            |time, &uv| {
                Ok(HourlyUvIndex {
                    time: parse_hourly_time(time, opts.timezone)?,
                    uv_index: uv,
                })
            },
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                WeatherError::ExternalServiceError(format!("Open-Meteo request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(WeatherError::ExternalServiceError(format!(
                "Open-Meteo returned HTTP {}",
                response.status()
            )));
        }

        response.json().await.map_err(|e| {
            WeatherError::MalformedResponse(format!("Open-Meteo response structure error: {}", e))
        })
    }
}

/// Local calendar date of the active display day.
fn active_local_date(opts: &WeatherOptions, now: DateTime<Utc>) -> NaiveDate {
    let dates = today_dates(opts.switch_day_at_hour, opts.timezone, now);
    dates
        .start_of_local_day
        .with_timezone(&opts.timezone)
        .date_naive()
}

/// Zip two parallel arrays positionally, rejecting length mismatches.
fn zip_series<V, T>(
    times: &[String],
    values: &[V],
    what: &str,
    mut make: impl FnMut(&str, &V) -> Result<T, WeatherError>,
) -> Result<Vec<T>, WeatherError> {
    if times.len() != values.len() {
        return Err(WeatherError::MalformedResponse(format!(
            "parallel arrays time/{} have mismatched lengths ({} vs {})",
            what,
            times.len(),
            values.len()
        )));
    }
    times
        .iter()
        .zip(values)
        .map(|(time, value)| make(time, value))
        .collect()
}

/// `YYYY-MM-DD` daily timestamp → local midnight of that date in UTC.
fn parse_daily_time(text: &str, timezone: Tz) -> Result<DateTime<Utc>, WeatherError> {
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| {
        WeatherError::MalformedResponse(format!("invalid daily timestamp '{}': {}", text, e))
    })?;
    Ok(local_datetime_in_utc(
        timezone,
        date.and_hms_opt(0, 0, 0).unwrap_or_default(),
    ))
}

/// `YYYY-MM-DDTHH:MM` hourly timestamp → that local wall-clock hour in UTC.
fn parse_hourly_time(text: &str, timezone: Tz) -> Result<DateTime<Utc>, WeatherError> {
    let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M").map_err(|e| {
        WeatherError::MalformedResponse(format!("invalid hourly timestamp '{}': {}", text, e))
    })?;
    Ok(local_datetime_in_utc(timezone, naive))
}
