use chrono_tz::Tz;

use crate::models::Coordinate;

/// Hour of the local day at which the display switches to showing
/// tomorrow's weather.
const DEFAULT_SWITCH_DAY_AT_HOUR: u8 = 18;

/// Options for one weather aggregation request.
///
/// Entry points (CLI, HTTP handler) are expected to build this from
/// their own argument parsing; [`AppConfig::from_env`] is a convenience
/// for environment-driven embeddings.
#[derive(Debug, Clone, Copy)]
pub struct WeatherOptions {
    pub location: Coordinate,
    pub timezone: Tz,
    /// Local hour (0–23) after which "today" means tomorrow.
    pub switch_day_at_hour: u8,
}

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub options: WeatherOptions,
    /// When set, the engine returns generated weather instead of calling
    /// the providers (see `services::simulate`).
    pub random: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let lat = std::env::var("LAT")
            .expect("LAT must be set")
            .parse()
            .expect("LAT must be a valid number");
        let lon = std::env::var("LON")
            .expect("LON must be set")
            .parse()
            .expect("LON must be a valid number");
        let timezone = std::env::var("TIMEZONE")
            .expect("TIMEZONE must be set")
            .parse()
            .expect("TIMEZONE must be a valid IANA timezone name");
        let switch_day_at_hour = std::env::var("SWITCH_DAY_AT_HOUR")
            .map(|v| {
                v.parse()
                    .expect("SWITCH_DAY_AT_HOUR must be an hour between 0 and 23")
            })
            .unwrap_or(DEFAULT_SWITCH_DAY_AT_HOUR);
        assert!(
            switch_day_at_hour < 24,
            "SWITCH_DAY_AT_HOUR must be an hour between 0 and 23"
        );

        Self {
            options: WeatherOptions {
                location: Coordinate { lat, lon },
                timezone,
                switch_day_at_hour,
            },
            random: std::env::var("RANDOM_WEATHER")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        // NOTE: set_var/remove_var in tests is unsafe in multi-threaded
        // contexts (Rust may run tests in parallel). This test only
        // exercises the default-value logic and accepts the risk.
        unsafe {
            std::env::set_var("LAT", "60.222");
            std::env::set_var("LON", "24.83");
            std::env::set_var("TIMEZONE", "Europe/Helsinki");
            std::env::remove_var("SWITCH_DAY_AT_HOUR");
            std::env::remove_var("RANDOM_WEATHER");
        }

        let config = AppConfig::from_env();

        assert_eq!(config.options.switch_day_at_hour, DEFAULT_SWITCH_DAY_AT_HOUR);
        assert_eq!(config.options.timezone, chrono_tz::Europe::Helsinki);
        assert!(!config.random);
        assert!((config.options.location.lat - 60.222).abs() < 1e-9);
    }
}
