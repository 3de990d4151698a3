//! Static weather-symbol tables.
//!
//! Two incompatible vocabularies meet here: FMI's `WeatherSymbol3` codes
//! (the engine's canonical symbol vocabulary) and Open-Meteo's WMO-style
//! categorical weather codes, which are translated to the nearest FMI
//! code (many-to-one). The tables are immutable process-wide data;
//! [`verify_symbol_tables`] is a boot-time completeness check, not a
//! per-request one.

use crate::errors::WeatherError;

/// Icon lighting theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

/// Every registered FMI symbol code. Kept in sync with the match tables
/// below; [`verify_symbol_tables`] asserts the sync.
pub const ALL_SYMBOLS: [u8; 27] = [
    1, 2, 3, 21, 22, 23, 31, 32, 33, 41, 42, 43, 51, 52, 53, 61, 62, 63, 64, 71, 72, 73, 81, 82,
    83, 91, 92,
];

/// Every Open-Meteo weather code the translation table covers.
pub const ALL_METEO_CODES: [u8; 28] = [
    0, 1, 2, 3, 45, 48, 51, 53, 55, 56, 57, 61, 63, 65, 66, 67, 71, 73, 75, 77, 80, 81, 82, 85,
    86, 95, 96, 99,
];

/// Human-readable description for an FMI symbol code.
pub fn description(symbol: u8) -> Option<&'static str> {
    let text = match symbol {
        1 => "Clear",
        2 => "Partly cloudy",
        3 => "Cloudy",
        21 => "Scattered showers",
        22 => "Showers",
        23 => "Heavy showers",
        31 => "Light showers",
        32 => "Moderate rain",
        33 => "Heavy rain",
        41 => "Light snow showers",
        42 => "Snow showers",
        43 => "Heavy snow showers",
        51 => "Light snowfall",
        52 => "Moderate snowfall",
        53 => "Heavy snowfall",
        61 => "Thundershowers",
        62 => "Heavy thundershowers",
        63 => "Thunder",
        64 => "Heavy thunder",
        71 => "Light sleet showers",
        72 => "Moderate sleet showers",
        73 => "Heavy sleet showers",
        81 => "Light sleet",
        82 => "Moderate sleet",
        83 => "Heavy sleet",
        91 => "Mist",
        92 => "Fog",
        _ => return None,
    };
    Some(text)
}

/// Icon identifier for an FMI symbol code under the given theme.
pub fn icon(symbol: u8, theme: Theme) -> Option<&'static str> {
    match theme {
        Theme::Light => light_icon(symbol),
        Theme::Dark => dark_icon(symbol),
    }
}

fn light_icon(symbol: u8) -> Option<&'static str> {
    let name = match symbol {
        1 => "wi-day-sunny",
        2 => "wi-day-cloudy",
        3 => "wi-cloudy",
        21 => "wi-showers",
        22 => "wi-showers",
        23 => "wi-rain-mix",
        31 => "wi-sprinkle",
        32 => "wi-rain",
        33 => "wi-rain",
        41 => "wi-snow",
        42 => "wi-snow-wind",
        43 => "wi-snow-wind",
        51 => "wi-snow",
        52 => "wi-snow",
        53 => "wi-snow-wind",
        61 => "wi-day-storm-showers",
        62 => "wi-day-storm-showers",
        63 => "wi-day-lightning",
        64 => "wi-day-thunderstorm",
        71 => "wi-sleet",
        72 => "wi-sleet",
        73 => "wi-rain-mix",
        81 => "wi-sleet",
        82 => "wi-sleet",
        83 => "wi-sleet",
        91 => "wi-day-haze",
        92 => "wi-fog",
        _ => return None,
    };
    Some(name)
}

fn dark_icon(symbol: u8) -> Option<&'static str> {
    let name = match symbol {
        1 => "wi-night-clear",
        2 => "wi-night-alt-cloudy",
        3 => "wi-cloudy",
        21 => "wi-night-alt-showers",
        22 => "wi-showers",
        23 => "wi-rain-mix",
        31 => "wi-night-alt-showers",
        32 => "wi-night-alt-rain",
        33 => "wi-rain",
        41 => "wi-night-alt-snow",
        42 => "wi-night-alt-snow",
        43 => "wi-night-alt-snow-wind",
        51 => "wi-night-alt-snow",
        52 => "wi-night-alt-snow",
        53 => "wi-night-alt-snow",
        61 => "wi-night-alt-storm-showers",
        62 => "wi-night-alt-storm-showers",
        63 => "wi-night-alt-lightning",
        64 => "wi-night-alt-thunderstorm",
        71 => "wi-night-alt-sleet",
        72 => "wi-night-alt-sleet",
        73 => "wi-night-alt-rain-mix",
        81 => "wi-night-alt-sleet",
        82 => "wi-night-alt-sleet",
        83 => "wi-sleet",
        91 => "wi-dust",
        92 => "wi-fog",
        _ => return None,
    };
    Some(name)
}

/// Nearest FMI symbol code for an Open-Meteo weather code.
///
/// Several intensities collapse into one FMI code family, so the mapping
/// is many-to-one.
pub fn from_meteo_code(code: u8) -> Option<u8> {
    let symbol = match code {
        0 => 1,        // Clear sky
        1..=3 => 2,    // Mainly clear, partly cloudy, overcast
        45 | 48 => 92, // Fog, depositing rime fog
        51 => 31,      // Drizzle: light
        53 => 22,      // Drizzle: moderate
        55 => 23,      // Drizzle: dense
        56 => 71,      // Freezing drizzle: light
        57 => 73,      // Freezing drizzle: dense
        61 => 31,      // Rain: slight
        63 => 32,      // Rain: moderate
        65 => 33,      // Rain: heavy
        66 => 31,      // Freezing rain: light
        67 => 23,      // Freezing rain: heavy
        71 => 51,      // Snowfall: slight
        73 => 52,      // Snowfall: moderate
        75 => 53,      // Snowfall: heavy
        77 => 42,      // Snow grains
        80 => 31,      // Rain showers: slight
        81 => 22,      // Rain showers: moderate
        82 => 23,      // Rain showers: violent
        85 => 42,      // Snow showers: slight
        86 => 43,      // Snow showers: heavy
        95 => 61,      // Thunderstorm: slight or moderate
        96 | 99 => 63, // Thunderstorm with hail
        _ => return None,
    };
    Some(symbol)
}

/// Description lookup that fails with `UnknownSymbol` for unregistered codes.
pub fn resolve_description(symbol: u8) -> Result<&'static str, WeatherError> {
    description(symbol).ok_or_else(|| {
        WeatherError::UnknownSymbol(format!("no description registered for symbol {}", symbol))
    })
}

/// Icon lookup that fails with `UnknownSymbol` for unregistered codes.
pub fn resolve_icon(symbol: u8, theme: Theme) -> Result<&'static str, WeatherError> {
    icon(symbol, theme).ok_or_else(|| {
        WeatherError::UnknownSymbol(format!(
            "no {:?} icon registered for symbol {}",
            theme, symbol
        ))
    })
}

/// Translation lookup that fails with `UnknownSymbol` for uncovered codes.
pub fn resolve_meteo_code(code: u8) -> Result<u8, WeatherError> {
    from_meteo_code(code).ok_or_else(|| {
        WeatherError::UnknownSymbol(format!("no translation for Open-Meteo weather code {}", code))
    })
}

/// Boot-time self-check: every described symbol must resolve in both icon
/// themes, and every translated Open-Meteo code must land on a described
/// symbol. Run once at startup (and in the test suite), never per request.
pub fn verify_symbol_tables() -> Result<(), WeatherError> {
    for symbol in ALL_SYMBOLS {
        resolve_description(symbol)?;
        for theme in [Theme::Light, Theme::Dark] {
            let name = resolve_icon(symbol, theme)?;
            if name.is_empty() {
                return Err(WeatherError::InternalError(format!(
                    "empty {:?} icon identifier for symbol {}",
                    theme, symbol
                )));
            }
        }
    }
    for code in ALL_METEO_CODES {
        let symbol = resolve_meteo_code(code)?;
        resolve_description(symbol)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_complete() {
        verify_symbol_tables().unwrap();
    }

    #[test]
    fn test_all_symbols_matches_tables_exactly() {
        // No code outside ALL_SYMBOLS may resolve
        for symbol in 0..=u8::MAX {
            let registered = ALL_SYMBOLS.contains(&symbol);
            assert_eq!(description(symbol).is_some(), registered, "symbol {}", symbol);
            assert_eq!(icon(symbol, Theme::Light).is_some(), registered);
            assert_eq!(icon(symbol, Theme::Dark).is_some(), registered);
        }
    }

    #[test]
    fn test_meteo_translation_examples() {
        assert_eq!(from_meteo_code(0), Some(1));
        assert_eq!(from_meteo_code(3), Some(2));
        assert_eq!(from_meteo_code(99), Some(63));
        assert_eq!(from_meteo_code(42), None);
    }

    #[test]
    fn test_resolve_unknown_symbol_fails() {
        assert!(matches!(
            resolve_description(99),
            Err(WeatherError::UnknownSymbol(_))
        ));
        assert!(matches!(
            resolve_icon(0, Theme::Light),
            Err(WeatherError::UnknownSymbol(_))
        ));
        assert!(matches!(
            resolve_meteo_code(100),
            Err(WeatherError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn test_day_and_night_variants_differ_for_clear() {
        assert_eq!(icon(1, Theme::Light), Some("wi-day-sunny"));
        assert_eq!(icon(1, Theme::Dark), Some("wi-night-clear"));
    }
}
