//! Weather aggregation service.
//!
//! Combines FMI model forecasts, FMI ground observations and Open-Meteo
//! weather codes into one `LocalWeather` aggregate: a today summary,
//! time-bucketed short-term forecasts and daily long-term forecasts.
//!
//! All calculation functions are pure and synchronous; only
//! [`get_local_weather`] performs I/O (the six upstream queries, issued
//! concurrently).

use chrono::{DateTime, Duration, Utc};

use crate::config::WeatherOptions;
use crate::dates::{today_dates, TodayDates};
use crate::errors::WeatherError;
use crate::helpers::{is_between_inclusive, max_by, mean_by, min_by, sum_by_or_null};
use crate::models::{
    LocalWeather, LongTermWeatherDataPoint, MaxUvIndex, ShortTermWeatherDataPoint,
    TemperatureRange, TodayForecastSummary, WeatherTodaySummary,
};
use crate::services::fmi::{EcmwfForecastPoint, FmiClient, HarmonieForecastPoint, ObservationPoint};
use crate::services::meteo::{DailyWeatherCode, HourlyWeatherCode, HourlyUvIndex, MeteoClient};
use crate::symbols;

/// Default short-term bucket edges, as hour offsets from the start of
/// the active local day: today's remaining representative hours plus a
/// coarser set for tomorrow. The final hour only bounds the last bucket.
pub const SHORT_TERM_FORECAST_HOURS: [i64; 9] = [9, 12, 15, 18, 21, 24, 33, 42, 51];

/// Hour edges for the hour-by-hour data points. HARMONIE serves up to a
/// 50 h forecast and the earliest query time is the morning switch hour,
/// so 55 hours from the start of the local day stays within range.
const HOURLY_DATA_POINT_EDGES: i64 = 55;

/// Default long-term bucket edges, as day offsets from the start of the
/// active local day. Day 6 only bounds the last bucket.
pub const LONG_TERM_FORECAST_DAYS: [i64; 6] = [1, 2, 3, 4, 5, 6];

/// Provider-B daily entries may drift from the UTC day arithmetic by a
/// DST shift; entries within this many hours still match a day bucket.
const DAY_MATCH_TOLERANCE_HOURS: i64 = 1;

/// A long-term day bucket before symbol assignment.
///
/// The symbol comes from a different provider, so
/// [`calculate_long_term_forecast`] leaves it to the caller (see
/// [`find_weather_symbol_for_day`]).
#[derive(Debug, Clone, PartialEq)]
pub struct LongTermForecastBucket {
    pub time: DateTime<Utc>,
    pub avg_temperature: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub avg_wind_speed_ms: f64,
    pub min_wind_speed_ms: f64,
    pub max_wind_speed_ms: f64,
    pub precipitation_amount_from_now_to_next: Option<f64>,
}

impl LongTermForecastBucket {
    fn with_symbol(self, symbol: u8) -> LongTermWeatherDataPoint {
        LongTermWeatherDataPoint {
            time: self.time,
            avg_temperature: self.avg_temperature,
            min_temperature: self.min_temperature,
            max_temperature: self.max_temperature,
            avg_wind_speed_ms: self.avg_wind_speed_ms,
            min_wind_speed_ms: self.min_wind_speed_ms,
            max_wind_speed_ms: self.max_wind_speed_ms,
            precipitation_amount_from_now_to_next: self.precipitation_amount_from_now_to_next,
            symbol,
        }
    }
}

/// A forecast or observation record in the merged short-term series.
#[derive(Debug, Clone, Copy)]
enum MergedDataPoint<'a> {
    Forecast(&'a HarmonieForecastPoint),
    Observation(&'a ObservationPoint),
}

impl MergedDataPoint<'_> {
    fn time(&self) -> DateTime<Utc> {
        match self {
            MergedDataPoint::Forecast(p) => p.time,
            MergedDataPoint::Observation(p) => p.time,
        }
    }

    fn temperature(&self) -> f64 {
        match self {
            MergedDataPoint::Forecast(p) => p.temperature,
            MergedDataPoint::Observation(p) => p.temperature,
        }
    }

    fn wind_speed_ms(&self) -> f64 {
        match self {
            MergedDataPoint::Forecast(p) => p.wind_speed_ms,
            MergedDataPoint::Observation(p) => p.wind_speed_ms,
        }
    }

    fn precipitation_1h(&self) -> f64 {
        match self {
            MergedDataPoint::Forecast(p) => p.precipitation_1h,
            MergedDataPoint::Observation(p) => p.precipitation_1h,
        }
    }
}

/// Fetch everything and assemble the full `LocalWeather` aggregate.
///
/// The six upstream queries are independent and issued concurrently;
/// the first failure aborts the whole request.
pub async fn get_local_weather(
    fmi: &FmiClient,
    meteo: &MeteoClient,
    opts: &WeatherOptions,
    now: DateTime<Utc>,
) -> Result<LocalWeather, WeatherError> {
    let dates = today_dates(opts.switch_day_at_hour, opts.timezone, now);
    tracing::debug!(
        "active day boundaries: {} .. {}",
        dates.start_of_local_day,
        dates.end_of_local_day
    );

    let (harmonie, ecmwf, observations, meteo_daily, meteo_hourly, uv_hours) = futures::try_join!(
        fmi.fetch_harmonie_forecast(opts, now),
        fmi.fetch_ecmwf_forecast(opts, now),
        fmi.fetch_observations(opts),
        meteo.fetch_long_term_forecast(opts, now),
        meteo.fetch_short_term_forecast(opts, now),
        meteo.fetch_uv_forecast(opts, now),
    )?;

    let max_uv = find_highest_uv_index(&uv_hours, &dates)?;
    let today_summary = calculate_today_summary(&harmonie, &observations, &dates, opts, max_uv)?;

    let forecast_short_term = calculate_short_term_forecast(
        &harmonie,
        &observations,
        &meteo_hourly,
        &dates,
        None,
        true,
    )?;

    let hourly_times: Vec<DateTime<Utc>> = (0..HOURLY_DATA_POINT_EDGES)
        .map(|h| dates.start_of_local_day + Duration::hours(h))
        .collect();
    let hourly_data_points = calculate_short_term_forecast(
        &harmonie,
        &observations,
        &meteo_hourly,
        &dates,
        Some(&hourly_times),
        true,
    )?;

    let forecast_long_term = calculate_long_term_forecast(&ecmwf, &dates, None)?
        .into_iter()
        .map(|bucket| {
            let symbol = find_weather_symbol_for_day(&meteo_daily, bucket.time)?;
            Ok(bucket.with_symbol(symbol))
        })
        .collect::<Result<Vec<_>, WeatherError>>()?;

    Ok(LocalWeather {
        today_summary,
        forecast_short_term,
        hourly_data_points,
        forecast_long_term,
    })
}

/// Calculate the short-term forecast over half-open time buckets.
///
/// With edges (1) --- (2) --- (3) the result has two data points: one
/// for [1, 2) and one for [2, 3); the last edge only bounds the last
/// bucket. When `forecast_times` is `None` the default edges
/// ([`SHORT_TERM_FORECAST_HOURS`]) are used.
///
/// Observations are ground truth: where an observation and a forecast
/// share an instant, the forecast record is dropped. Every hour 0..24 of
/// the active day must be covered by some record; with
/// `enforce_hourly_coverage` false (test/simulation contexts) a gap only
/// logs a warning.
pub fn calculate_short_term_forecast(
    forecast_points: &[HarmonieForecastPoint],
    observation_points: &[ObservationPoint],
    meteo_hourly: &[HourlyWeatherCode],
    dates: &TodayDates,
    forecast_times: Option<&[DateTime<Utc>]>,
    enforce_hourly_coverage: bool,
) -> Result<Vec<ShortTermWeatherDataPoint>, WeatherError> {
    let merged = merge_preferring_observations(forecast_points, observation_points);

    for hour in 0..24 {
        let time = dates.start_of_local_day + Duration::hours(hour);
        if !merged.iter().any(|p| p.time() == time) {
            if enforce_hourly_coverage {
                return Err(WeatherError::MissingDataPoint(format!(
                    "no observation or forecast data for hour {} of the active day",
                    hour
                )));
            }
            tracing::warn!(
                "no observation or forecast data for hour {} of the active day",
                hour
            );
        }
    }

    let default_times: Vec<DateTime<Utc>>;
    let times: &[DateTime<Utc>] = match forecast_times {
        Some(times) => times,
        None => {
            default_times = SHORT_TERM_FORECAST_HOURS
                .iter()
                .map(|&h| dates.start_of_local_day + Duration::hours(h))
                .collect();
            &default_times
        }
    };
    tracing::debug!("short-term bucket edges: {:?}", times);

    times
        .windows(2)
        .map(|window| {
            let (time, next_time) = (window[0], window[1]);
            let in_bucket: Vec<MergedDataPoint> = merged
                .iter()
                .filter(|p| p.time() >= time && p.time() < next_time)
                .copied()
                .collect();
            calculate_short_term_data_point(time, &in_bucket, meteo_hourly)
        })
        .collect()
}

/// Merge the two series, dropping forecast records at instants where an
/// observation exists.
fn merge_preferring_observations<'a>(
    forecast_points: &'a [HarmonieForecastPoint],
    observation_points: &'a [ObservationPoint],
) -> Vec<MergedDataPoint<'a>> {
    forecast_points
        .iter()
        .filter(|f| !observation_points.iter().any(|o| o.time == f.time))
        .map(MergedDataPoint::Forecast)
        .chain(observation_points.iter().map(MergedDataPoint::Observation))
        .collect()
}

fn calculate_short_term_data_point(
    time: DateTime<Utc>,
    in_bucket: &[MergedDataPoint],
    meteo_hourly: &[HourlyWeatherCode],
) -> Result<ShortTermWeatherDataPoint, WeatherError> {
    let exact = in_bucket
        .iter()
        .find(|p| p.time() == time)
        .ok_or_else(|| {
            WeatherError::MissingDataPoint(format!(
                "no observation or forecast data point at bucket start {}",
                time
            ))
        })?;

    // Temperature and wind are the exact-edge values rather than bucket
    // averages: averaging smooths away the hour-to-hour variation the
    // display is supposed to show.
    let temperature = exact.temperature();
    let wind_speed_ms = exact.wind_speed_ms();
    let precipitation_1h = exact.precipitation_1h();
    // Assumes 60 min timesteps within the merged data
    let precipitation_to_next = sum_by_or_null(in_bucket, |p| p.precipitation_1h());

    let forecasts: Vec<&HarmonieForecastPoint> = in_bucket
        .iter()
        .filter_map(|p| match p {
            MergedDataPoint::Forecast(f) => Some(*f),
            MergedDataPoint::Observation(_) => None,
        })
        .collect();

    if forecasts.is_empty() {
        // Observation-only bucket: borrow the weather code from
        // Open-Meteo's hourly forecast at this instant.
        let code = meteo_hourly
            .iter()
            .find(|h| h.time == time)
            .ok_or_else(|| {
                WeatherError::MissingDataPoint(format!(
                    "no hourly weather code for observation data point at {}",
                    time
                ))
            })?
            .weather_code;

        return Ok(ShortTermWeatherDataPoint::Observation {
            time,
            temperature,
            wind_speed_ms,
            precipitation_1h,
            precipitation_amount_from_now_to_next: precipitation_to_next,
            symbol: symbols::resolve_meteo_code(code)?,
        });
    }

    // A mixed bucket still counts as forecast, so it gets a native
    // weather symbol.
    let symbol = forecasts[0].weather_symbol;
    symbols::resolve_description(symbol)?;

    Ok(ShortTermWeatherDataPoint::Forecast {
        time,
        temperature,
        wind_speed_ms,
        wind_gust_ms: mean_by(&forecasts, "wind gust", |f| f.wind_gust_ms)?,
        pressure: mean_by(&forecasts, "pressure", |f| f.pressure)?,
        dew_point: mean_by(&forecasts, "dew point", |f| f.dew_point)?,
        precipitation_1h,
        precipitation_amount_from_now_to_next: precipitation_to_next,
        symbol,
    })
}

/// Calculate the long-term forecast over day buckets.
///
/// Same bucket semantics as [`calculate_short_term_forecast`]; default
/// edges are [`LONG_TERM_FORECAST_DAYS`] after the active day's start.
/// A record must exist exactly at each bucket start — the anchor that
/// asserts the provider actually returned data for that day.
pub fn calculate_long_term_forecast(
    forecast_points: &[EcmwfForecastPoint],
    dates: &TodayDates,
    forecast_times: Option<&[DateTime<Utc>]>,
) -> Result<Vec<LongTermForecastBucket>, WeatherError> {
    let default_times: Vec<DateTime<Utc>>;
    let times: &[DateTime<Utc>] = match forecast_times {
        Some(times) => times,
        None => {
            default_times = LONG_TERM_FORECAST_DAYS
                .iter()
                .map(|&d| dates.start_of_local_day + Duration::days(d))
                .collect();
            &default_times
        }
    };
    tracing::debug!("long-term bucket edges: {:?}", times);

    times
        .windows(2)
        .map(|window| {
            let (time, next_time) = (window[0], window[1]);
            if !forecast_points.iter().any(|p| p.time == time) {
                return Err(WeatherError::MissingDataPoint(format!(
                    "no long-range forecast data point at bucket start {}",
                    time
                )));
            }

            let in_bucket: Vec<&EcmwfForecastPoint> = forecast_points
                .iter()
                .filter(|p| p.time >= time && p.time < next_time)
                .collect();

            Ok(LongTermForecastBucket {
                time,
                avg_temperature: mean_by(&in_bucket, "temperature", |p| p.temperature)?,
                min_temperature: min_by(&in_bucket, "temperature", |p| p.temperature)?,
                max_temperature: max_by(&in_bucket, "temperature", |p| p.temperature)?,
                avg_wind_speed_ms: mean_by(&in_bucket, "wind speed", |p| p.wind_speed_ms)?,
                min_wind_speed_ms: min_by(&in_bucket, "wind speed", |p| p.wind_speed_ms)?,
                max_wind_speed_ms: max_by(&in_bucket, "wind speed", |p| p.wind_speed_ms)?,
                // Assumes 60 min timesteps within forecast data
                precipitation_amount_from_now_to_next: sum_by_or_null(&in_bucket, |p| {
                    p.precipitation_1h
                }),
            })
        })
        .collect()
}

/// Resolve the weather symbol for a long-term day bucket from the
/// Open-Meteo daily series.
///
/// The day buckets advance in fixed 24 h steps while the daily series is
/// anchored at local midnights, so a DST transition makes them drift
/// apart by an hour; entries within the tolerance still match.
pub fn find_weather_symbol_for_day(
    daily: &[DailyWeatherCode],
    time: DateTime<Utc>,
) -> Result<u8, WeatherError> {
    let found = daily
        .iter()
        .find(|d| (d.time - time).abs() <= Duration::hours(DAY_MATCH_TOLERANCE_HOURS))
        .ok_or_else(|| {
            WeatherError::MissingDataPoint(format!(
                "no daily weather code matching forecast day {}",
                time
            ))
        })?;
    symbols::resolve_meteo_code(found.weather_code)
}

/// Find the hour with the highest UV index within the active day.
pub fn find_highest_uv_index(
    uv_hours: &[HourlyUvIndex],
    dates: &TodayDates,
) -> Result<MaxUvIndex, WeatherError> {
    let mut max: Option<&HourlyUvIndex> = None;
    for hour in uv_hours.iter().filter(|h| {
        is_between_inclusive(h.time, dates.start_of_local_day, dates.end_of_local_day)
    }) {
        // Strictly-greater keeps the first of equally high hours
        if max.is_none_or(|m| hour.uv_index > m.uv_index) {
            max = Some(hour);
        }
    }

    let found = max.ok_or_else(|| {
        WeatherError::InvalidAggregateInput(
            "no UV index entries within the active day".to_string(),
        )
    })?;
    Ok(MaxUvIndex {
        value: found.uv_index,
        time: found.time,
    })
}

/// Calculate the headline summary for the active day.
///
/// Forecast aggregates cover the in-range forecast points; the `all`
/// temperature range additionally includes in-range observations. The
/// boundary comparison is inclusive on both ends.
pub fn calculate_today_summary(
    forecast_points: &[HarmonieForecastPoint],
    observation_points: &[ObservationPoint],
    dates: &TodayDates,
    opts: &WeatherOptions,
    max_uv: MaxUvIndex,
) -> Result<WeatherTodaySummary, WeatherError> {
    let in_range = |time: DateTime<Utc>| {
        is_between_inclusive(time, dates.start_of_local_day, dates.end_of_local_day)
    };
    let forecast_today: Vec<&HarmonieForecastPoint> =
        forecast_points.iter().filter(|p| in_range(p.time)).collect();
    let observations_today: Vec<&ObservationPoint> = observation_points
        .iter()
        .filter(|p| in_range(p.time))
        .collect();

    let symbol = dominant_symbol(&forecast_today)?;
    let description = symbols::resolve_description(symbol)?;

    let all_temperatures: Vec<f64> = forecast_today
        .iter()
        .map(|p| p.temperature)
        .chain(observations_today.iter().map(|p| p.temperature))
        .collect();

    let (sunrise, sunset) = solar_events(opts, dates)?;

    Ok(WeatherTodaySummary {
        sunrise,
        sunset,
        day_duration_in_seconds: (sunset - sunrise).num_seconds(),
        all: TemperatureRange {
            min_temperature: min_by(&all_temperatures, "temperature", |t| *t)?,
            max_temperature: max_by(&all_temperatures, "temperature", |t| *t)?,
        },
        forecast: TodayForecastSummary {
            avg_temperature: mean_by(&forecast_today, "temperature", |p| p.temperature)?,
            min_temperature: min_by(&forecast_today, "temperature", |p| p.temperature)?,
            max_temperature: max_by(&forecast_today, "temperature", |p| p.temperature)?,
            avg_wind_speed_ms: mean_by(&forecast_today, "wind speed", |p| p.wind_speed_ms)?,
            min_wind_speed_ms: min_by(&forecast_today, "wind speed", |p| p.wind_speed_ms)?,
            max_wind_speed_ms: max_by(&forecast_today, "wind speed", |p| p.wind_speed_ms)?,
            max_wind_gust_ms: max_by(&forecast_today, "wind gust", |p| p.wind_gust_ms)?,
            symbol,
            description,
            max_uv_index: max_uv,
            // Assumes 60 min timesteps within forecast data
            precipitation_amount: sum_by_or_null(&forecast_today, |p| p.precipitation_1h),
        },
    })
}

/// Most frequent symbol among the day's forecast points; ties go to the
/// symbol encountered first.
fn dominant_symbol(forecast_today: &[&HarmonieForecastPoint]) -> Result<u8, WeatherError> {
    let mut counts: Vec<(u8, usize)> = Vec::new();
    for point in forecast_today {
        match counts.iter_mut().find(|(s, _)| *s == point.weather_symbol) {
            Some((_, count)) => *count += 1,
            None => counts.push((point.weather_symbol, 1)),
        }
    }

    let mut top: Option<(u8, usize)> = None;
    for &(symbol, count) in &counts {
        if top.is_none_or(|(_, best)| count > best) {
            top = Some((symbol, count));
        }
    }
    top.map(|(symbol, _)| symbol).ok_or_else(|| {
        WeatherError::InvalidAggregateInput(
            "no forecast points within the active day".to_string(),
        )
    })
}

/// Sunrise and sunset for the active day at the queried coordinate.
fn solar_events(
    opts: &WeatherOptions,
    dates: &TodayDates,
) -> Result<(DateTime<Utc>, DateTime<Utc>), WeatherError> {
    let coord = sunrise::Coordinates::new(opts.location.lat, opts.location.lon).ok_or_else(|| {
        WeatherError::InternalError(format!(
            "invalid coordinates for solar calculation: {}, {}",
            opts.location.lat, opts.location.lon
        ))
    })?;
    let date = dates
        .start_of_local_day
        .with_timezone(&opts.timezone)
        .date_naive();
    let event_time = |event| sunrise::SolarDay::new(coord, date).event_time(event);
    Ok((
        event_time(sunrise::SolarEvent::Sunrise),
        event_time(sunrise::SolarEvent::Sunset),
    ))
}
