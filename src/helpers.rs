//! Shared numeric aggregation helpers.
//!
//! Two failure strategies exist because precipitation sums and the other
//! aggregates have different degradation requirements:
//!
//! - `sum_by_or_null`: a non-finite reading degrades the sum to `None`
//!   ("unknown"), never to NaN or a silently-wrong number.
//! - `mean_by` / `min_by` / `max_by`: an empty window is a hard
//!   `InvalidAggregateInput` error, never ±infinity.

use chrono::{DateTime, Utc};

use crate::errors::WeatherError;

/// Sum `f(item)` over all items, or `None` if the sum ends up non-finite
/// (at least one input was NaN or infinite). An empty slice sums to 0.
pub(crate) fn sum_by_or_null<T>(items: &[T], f: impl Fn(&T) -> f64) -> Option<f64> {
    let sum: f64 = items.iter().map(&f).sum();
    if !sum.is_finite() {
        tracing::warn!("non-finite values in summed range, degrading sum to unknown");
        return None;
    }
    Some(sum)
}

/// Arithmetic mean of `f(item)`, failing on an empty slice.
pub(crate) fn mean_by<T>(
    items: &[T],
    what: &str,
    f: impl Fn(&T) -> f64,
) -> Result<f64, WeatherError> {
    if items.is_empty() {
        return Err(WeatherError::InvalidAggregateInput(format!(
            "cannot average {} over zero records",
            what
        )));
    }
    Ok(items.iter().map(&f).sum::<f64>() / items.len() as f64)
}

/// Minimum of `f(item)`, failing on an empty slice.
pub(crate) fn min_by<T>(
    items: &[T],
    what: &str,
    f: impl Fn(&T) -> f64,
) -> Result<f64, WeatherError> {
    items
        .iter()
        .map(&f)
        .reduce(f64::min)
        .ok_or_else(|| {
            WeatherError::InvalidAggregateInput(format!(
                "cannot take minimum of {} over zero records",
                what
            ))
        })
}

/// Maximum of `f(item)`, failing on an empty slice.
pub(crate) fn max_by<T>(
    items: &[T],
    what: &str,
    f: impl Fn(&T) -> f64,
) -> Result<f64, WeatherError> {
    items
        .iter()
        .map(&f)
        .reduce(f64::max)
        .ok_or_else(|| {
            WeatherError::InvalidAggregateInput(format!(
                "cannot take maximum of {} over zero records",
                what
            ))
        })
}

/// Whether `time` lies in `[start, end]`, inclusive on both ends.
pub(crate) fn is_between_inclusive(
    time: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> bool {
    time >= start && time <= end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_by_or_null_normal() {
        assert_eq!(sum_by_or_null(&[7.0, 9.0], |v| *v), Some(16.0));
    }

    #[test]
    fn test_sum_by_or_null_empty_is_zero() {
        let empty: [f64; 0] = [];
        assert_eq!(sum_by_or_null(&empty, |v| *v), Some(0.0));
    }

    #[test]
    fn test_sum_by_or_null_nan_degrades() {
        assert_eq!(sum_by_or_null(&[1.0, f64::NAN, 2.0], |v| *v), None);
    }

    #[test]
    fn test_sum_by_or_null_infinity_degrades() {
        assert_eq!(sum_by_or_null(&[1.0, f64::INFINITY], |v| *v), None);
    }

    #[test]
    fn test_mean_by_normal() {
        assert_eq!(mean_by(&[9.0, 10.0, 11.0], "temperature", |v| *v).unwrap(), 10.0);
    }

    #[test]
    fn test_mean_by_empty_fails() {
        let empty: [f64; 0] = [];
        let err = mean_by(&empty, "temperature", |v| *v).unwrap_err();
        assert!(matches!(err, WeatherError::InvalidAggregateInput(_)));
    }

    #[test]
    fn test_min_max_by_normal() {
        let values = [4.0, 6.0, 5.0];
        assert_eq!(min_by(&values, "wind", |v| *v).unwrap(), 4.0);
        assert_eq!(max_by(&values, "wind", |v| *v).unwrap(), 6.0);
    }

    #[test]
    fn test_min_max_by_single() {
        let values = [3.5];
        assert_eq!(min_by(&values, "wind", |v| *v).unwrap(), 3.5);
        assert_eq!(max_by(&values, "wind", |v| *v).unwrap(), 3.5);
    }

    #[test]
    fn test_min_by_empty_fails() {
        let empty: [f64; 0] = [];
        assert!(matches!(
            min_by(&empty, "wind", |v| *v),
            Err(WeatherError::InvalidAggregateInput(_))
        ));
        assert!(matches!(
            max_by(&empty, "wind", |v| *v),
            Err(WeatherError::InvalidAggregateInput(_))
        ));
    }

    #[test]
    fn test_is_between_inclusive_bounds() {
        let start: DateTime<Utc> = "2022-11-01T22:00:00Z".parse().unwrap();
        let end: DateTime<Utc> = "2022-11-02T21:59:59.999Z".parse().unwrap();
        assert!(is_between_inclusive(start, start, end));
        assert!(is_between_inclusive(end, start, end));
        assert!(!is_between_inclusive(
            start - chrono::Duration::milliseconds(1),
            start,
            end
        ));
        assert!(!is_between_inclusive(
            end + chrono::Duration::milliseconds(1),
            start,
            end
        ));
    }
}
