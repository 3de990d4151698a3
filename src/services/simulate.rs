//! Random weather generation.
//!
//! Produces a fully populated `LocalWeather` with plausible values so
//! rendering and layout can be exercised without calling the providers.
//! This is the simulation context in which the aggregators' hourly
//! coverage check is relaxed.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{
    LocalWeather, LongTermWeatherDataPoint, MaxUvIndex, ShortTermWeatherDataPoint,
    TemperatureRange, TodayForecastSummary, WeatherTodaySummary,
};
use crate::symbols;

const MAX_SENSIBLE_TEMPERATURE: f64 = 50.0;
const MAX_SENSIBLE_WIND_SPEED: f64 = 35.0;
const MAX_SENSIBLE_GUST_SPEED: f64 = 55.0;
const MAX_SENSIBLE_PRECIPITATION_1H: f64 = 100.0;

const SHORT_TERM_POINTS: usize = 8;
const HOURLY_POINTS: usize = 60;
const LONG_TERM_POINTS: usize = 6;

/// Generate a random but structurally complete `LocalWeather`.
pub fn generate_random_local_weather(now: DateTime<Utc>) -> LocalWeather {
    let mut rng = rand::thread_rng();

    let symbol = random_symbol(&mut rng);
    let (avg_temperature, min_temperature, max_temperature) = random_temperature_stats(&mut rng);
    let (avg_wind, min_wind, max_wind) = random_wind_stats(&mut rng);
    let sunrise = random_date(&mut rng, now, 365);

    LocalWeather {
        today_summary: WeatherTodaySummary {
            sunrise,
            sunset: random_date(&mut rng, now, 365),
            day_duration_in_seconds: (rng.gen_range(0.0..24.0) * 3600.0) as i64,
            all: TemperatureRange {
                min_temperature,
                max_temperature,
            },
            forecast: TodayForecastSummary {
                avg_temperature,
                min_temperature,
                max_temperature,
                avg_wind_speed_ms: avg_wind,
                min_wind_speed_ms: min_wind,
                max_wind_speed_ms: max_wind,
                max_wind_gust_ms: rng.gen_range(max_wind..=MAX_SENSIBLE_GUST_SPEED),
                symbol,
                description: symbols::description(symbol).unwrap_or("Clear"),
                max_uv_index: MaxUvIndex {
                    time: random_date(&mut rng, now, 365),
                    value: rng.gen_range(0.0..12.0),
                },
                precipitation_amount: Some(
                    rng.gen_range(0.0..MAX_SENSIBLE_PRECIPITATION_1H) * 24.0,
                ),
            },
        },
        forecast_short_term: (0..SHORT_TERM_POINTS)
            .map(|_| random_short_term_point(&mut rng, now))
            .collect(),
        hourly_data_points: (0..HOURLY_POINTS)
            .map(|_| random_short_term_point(&mut rng, now))
            .collect(),
        forecast_long_term: (0..LONG_TERM_POINTS)
            .map(|_| random_long_term_point(&mut rng, now))
            .collect(),
    }
}

fn random_short_term_point(rng: &mut ThreadRng, now: DateTime<Utc>) -> ShortTermWeatherDataPoint {
    ShortTermWeatherDataPoint::Forecast {
        time: random_date(rng, now, 365 * 2),
        temperature: random_temperature(rng),
        wind_speed_ms: rng.gen_range(0.0..MAX_SENSIBLE_WIND_SPEED),
        wind_gust_ms: rng.gen_range(0.0..MAX_SENSIBLE_GUST_SPEED),
        pressure: rng.gen_range(900.0..1100.0),
        dew_point: random_temperature(rng),
        precipitation_1h: rng.gen_range(0.0..MAX_SENSIBLE_PRECIPITATION_1H),
        precipitation_amount_from_now_to_next: Some(
            rng.gen_range(0.0..MAX_SENSIBLE_PRECIPITATION_1H),
        ),
        symbol: random_symbol(rng),
    }
}

fn random_long_term_point(rng: &mut ThreadRng, now: DateTime<Utc>) -> LongTermWeatherDataPoint {
    let (avg_temperature, min_temperature, max_temperature) = random_temperature_stats(rng);
    let (avg_wind, min_wind, max_wind) = random_wind_stats(rng);
    LongTermWeatherDataPoint {
        time: random_date(rng, now, 365 * 2),
        avg_temperature,
        min_temperature,
        max_temperature,
        avg_wind_speed_ms: avg_wind,
        min_wind_speed_ms: min_wind,
        max_wind_speed_ms: max_wind,
        precipitation_amount_from_now_to_next: Some(
            rng.gen_range(0.0..MAX_SENSIBLE_PRECIPITATION_1H) * 24.0,
        ),
        symbol: random_symbol(rng),
    }
}

fn random_date(rng: &mut ThreadRng, now: DateTime<Utc>, day_variance: i64) -> DateTime<Utc> {
    let second_variance = day_variance * 24 * 60 * 60;
    now + Duration::seconds(rng.gen_range(-second_variance..=second_variance))
}

fn random_temperature(rng: &mut ThreadRng) -> f64 {
    rng.gen_range(-MAX_SENSIBLE_TEMPERATURE..=MAX_SENSIBLE_TEMPERATURE)
}

/// (avg, min, max) with min <= avg <= max.
fn random_temperature_stats(rng: &mut ThreadRng) -> (f64, f64, f64) {
    let min = random_temperature(rng);
    let max = rng.gen_range(min..=MAX_SENSIBLE_TEMPERATURE);
    ((min + max) / 2.0, min, max)
}

fn random_wind_stats(rng: &mut ThreadRng) -> (f64, f64, f64) {
    let min = rng.gen_range(0.0..MAX_SENSIBLE_WIND_SPEED);
    let max = rng.gen_range(min..=MAX_SENSIBLE_WIND_SPEED);
    ((min + max) / 2.0, min, max)
}

fn random_symbol(rng: &mut ThreadRng) -> u8 {
    symbols::ALL_SYMBOLS.choose(rng).copied().unwrap_or(1)
}
