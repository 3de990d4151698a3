//! Display-day boundary calculation.
//!
//! The "active day" is the local calendar day the display currently
//! shows. Before the configured switch hour it is today; from the switch
//! hour onwards it is tomorrow. All boundaries are returned as absolute
//! UTC instants, so the UTC span of one local day is 23–25 hours around
//! DST transitions.
//!
//! Both functions are pure: they depend only on their arguments,
//! including the explicit `now`.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Boundaries of the active local day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodayDates {
    /// Local midnight of the active day, in UTC.
    pub start_of_local_day: DateTime<Utc>,
    /// Last millisecond of the active day, in UTC.
    pub end_of_local_day: DateTime<Utc>,
}

/// Boundaries of the active local day plus a reference instant at a
/// given local hour. The active day rolls over exactly at that hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextHourDates {
    /// The next upcoming `hour` o'clock of the active day, in UTC.
    pub hour_in_utc: DateTime<Utc>,
    pub start_of_local_day: DateTime<Utc>,
    pub end_of_local_day: DateTime<Utc>,
}

/// Boundaries of the active day for a given switch hour.
///
/// If `now` is strictly before `start of local today + switch_day_at_hour`
/// hours, the active day is today; otherwise it is tomorrow.
pub fn today_dates(switch_day_at_hour: u8, timezone: Tz, now: DateTime<Utc>) -> TodayDates {
    let today = now.with_timezone(&timezone).date_naive();
    let start_of_today = local_midnight_in_utc(timezone, today);

    let switch_instant = start_of_today + Duration::hours(i64::from(switch_day_at_hour));
    let active_day = if now < switch_instant {
        today
    } else {
        next_day(today)
    };

    let start = local_midnight_in_utc(timezone, active_day);
    TodayDates {
        start_of_local_day: start,
        end_of_local_day: end_of_local_day(timezone, active_day),
    }
}

/// Like [`today_dates`], but also returns the reference instant itself.
///
/// Used when a request must target a specific upcoming hour: one minute
/// before `hour` o'clock local time the reference is still today's, at
/// exactly `hour` o'clock it rolls to tomorrow's.
pub fn next_hour_dates(hour: u8, timezone: Tz, now: DateTime<Utc>) -> NextHourDates {
    let today = now.with_timezone(&timezone).date_naive();
    let start_of_today = local_midnight_in_utc(timezone, today);

    let hour_today = start_of_today + Duration::hours(i64::from(hour));
    if now < hour_today {
        return NextHourDates {
            hour_in_utc: hour_today,
            start_of_local_day: start_of_today,
            end_of_local_day: end_of_local_day(timezone, today),
        };
    }

    let tomorrow = next_day(today);
    let start_of_tomorrow = local_midnight_in_utc(timezone, tomorrow);
    NextHourDates {
        hour_in_utc: start_of_tomorrow + Duration::hours(i64::from(hour)),
        start_of_local_day: start_of_tomorrow,
        end_of_local_day: end_of_local_day(timezone, tomorrow),
    }
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().expect("date overflow")
}

/// Local midnight of `date`, as a UTC instant.
fn local_midnight_in_utc(timezone: Tz, date: NaiveDate) -> DateTime<Utc> {
    local_datetime_in_utc(timezone, date.and_time(NaiveTime::MIN))
}

/// Interpret a wall-clock datetime in `timezone` and convert to UTC.
///
/// Around DST transitions an ambiguous wall-clock time resolves to its
/// first occurrence, and a skipped one to the instant the clock resumes.
pub(crate) fn local_datetime_in_utc(timezone: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(t) => t.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => match timezone.from_local_datetime(&(naive + Duration::hours(1))) {
            LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t.with_timezone(&Utc),
            LocalResult::None => Utc.from_utc_datetime(&naive),
        },
    }
}

/// Last millisecond of the local `date`, as a UTC instant.
fn end_of_local_day(timezone: Tz, date: NaiveDate) -> DateTime<Utc> {
    local_midnight_in_utc(timezone, next_day(date)) - Duration::milliseconds(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_today_dates_before_switch_hour_winter() {
        // 8:59 AM Europe/Helsinki (winter time, UTC+2), switch at 9
        let dates = today_dates(9, chrono_tz::Europe::Helsinki, utc("2022-11-02T06:59:00Z"));
        assert_eq!(dates.start_of_local_day, utc("2022-11-01T22:00:00Z"));
        assert_eq!(dates.end_of_local_day, utc("2022-11-02T21:59:59.999Z"));
    }

    #[test]
    fn test_today_dates_exactly_at_switch_hour_rolls_over() {
        // Exactly 9 AM Europe/Helsinki: the active day becomes tomorrow
        let dates = today_dates(9, chrono_tz::Europe::Helsinki, utc("2022-11-02T07:00:00Z"));
        assert_eq!(dates.start_of_local_day, utc("2022-11-02T22:00:00Z"));
        assert_eq!(dates.end_of_local_day, utc("2022-11-03T21:59:59.999Z"));
    }

    #[test]
    fn test_today_dates_summer_time() {
        // 8:59 AM Europe/Helsinki (summer time, UTC+3)
        let dates = today_dates(9, chrono_tz::Europe::Helsinki, utc("2022-10-02T05:59:00Z"));
        assert_eq!(dates.start_of_local_day, utc("2022-10-01T21:00:00Z"));
        assert_eq!(dates.end_of_local_day, utc("2022-10-02T20:59:59.999Z"));
    }

    #[test]
    fn test_today_dates_stockholm_winter() {
        // 8:59 AM Europe/Stockholm (winter time, UTC+1)
        let dates = today_dates(9, chrono_tz::Europe::Stockholm, utc("2022-11-02T07:59:00Z"));
        assert_eq!(dates.start_of_local_day, utc("2022-11-01T23:00:00Z"));
        assert_eq!(dates.end_of_local_day, utc("2022-11-02T22:59:59.999Z"));
    }

    #[test]
    fn test_today_dates_dst_transition_day_is_25_hours() {
        // 2022-10-30: Europe/Helsinki falls back from UTC+3 to UTC+2,
        // so the local day spans 25 hours of UTC time.
        let dates = today_dates(18, chrono_tz::Europe::Helsinki, utc("2022-10-30T08:00:00Z"));
        assert_eq!(dates.start_of_local_day, utc("2022-10-29T21:00:00Z"));
        assert_eq!(dates.end_of_local_day, utc("2022-10-30T21:59:59.999Z"));
        assert_eq!(
            dates.end_of_local_day - dates.start_of_local_day,
            Duration::hours(25) - Duration::milliseconds(1)
        );
    }

    #[test]
    fn test_today_dates_spring_transition_day_is_23_hours() {
        // 2023-03-26: Europe/Helsinki springs forward, a 23-hour local day.
        let dates = today_dates(18, chrono_tz::Europe::Helsinki, utc("2023-03-26T08:00:00Z"));
        assert_eq!(dates.start_of_local_day, utc("2023-03-25T22:00:00Z"));
        assert_eq!(dates.end_of_local_day, utc("2023-03-26T20:59:59.999Z"));
        assert_eq!(
            dates.end_of_local_day - dates.start_of_local_day,
            Duration::hours(23) - Duration::milliseconds(1)
        );
    }

    #[test]
    fn test_next_hour_dates_before_hour_winter() {
        let dates = next_hour_dates(9, chrono_tz::Europe::Helsinki, utc("2022-11-02T06:59:00Z"));
        assert_eq!(dates.hour_in_utc, utc("2022-11-02T07:00:00Z"));
        assert_eq!(dates.start_of_local_day, utc("2022-11-01T22:00:00Z"));
        assert_eq!(dates.end_of_local_day, utc("2022-11-02T21:59:59.999Z"));
    }

    #[test]
    fn test_next_hour_dates_exactly_at_hour_rolls_over() {
        // Exactly at the reference hour the next occurrence is tomorrow's
        let dates = next_hour_dates(9, chrono_tz::Europe::Helsinki, utc("2022-11-02T07:00:00Z"));
        assert_eq!(dates.hour_in_utc, utc("2022-11-03T07:00:00Z"));
        assert_eq!(dates.start_of_local_day, utc("2022-11-02T22:00:00Z"));
        assert_eq!(dates.end_of_local_day, utc("2022-11-03T21:59:59.999Z"));
    }

    #[test]
    fn test_next_hour_dates_summer_time() {
        let dates = next_hour_dates(9, chrono_tz::Europe::Helsinki, utc("2022-10-02T05:59:00Z"));
        assert_eq!(dates.hour_in_utc, utc("2022-10-02T06:00:00Z"));
        assert_eq!(dates.start_of_local_day, utc("2022-10-01T21:00:00Z"));
        assert_eq!(dates.end_of_local_day, utc("2022-10-02T20:59:59.999Z"));
    }

    #[test]
    fn test_next_hour_dates_stockholm() {
        let dates = next_hour_dates(9, chrono_tz::Europe::Stockholm, utc("2022-11-02T07:59:00Z"));
        assert_eq!(dates.hour_in_utc, utc("2022-11-02T08:00:00Z"));
        assert_eq!(dates.start_of_local_day, utc("2022-11-01T23:00:00Z"));
        assert_eq!(dates.end_of_local_day, utc("2022-11-02T22:59:59.999Z"));
    }
}
