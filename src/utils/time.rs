use std::fmt::Display;

use chrono::{DateTime, NaiveDate, TimeZone};

const MILLIS_IN_HOUR: f64 = 60. * 60. * 1000.;

/// Hours between `start` and `end` with millisecond precision. The value is negative when `end`
/// is before `start`; callers decide what to do about that.
pub fn duration_hours<A: TimeZone, B: TimeZone>(start: &DateTime<A>, end: &DateTime<B>) -> f64 {
    (end.timestamp_millis() - start.timestamp_millis()) as f64 / MILLIS_IN_HOUR
}

/// Renders hours as `1h 30m`, `30m` or `2h`.
///
/// Minutes are rounded before splitting into parts, so 1.999 hours becomes `2h` and not `1h 60m`.
/// Negative values are rendered as `0m`.
pub fn format_hours(hours: f64) -> String {
    let total_minutes = (hours.max(0.) * 60.).round() as i64;
    match (total_minutes / 60, total_minutes % 60) {
        (0, minutes) => format!("{minutes}m"),
        (hours, 0) => format!("{hours}h"),
        (hours, minutes) => format!("{hours}h {minutes}m"),
    }
}

/// Numeric rendering used for the today/month/remaining fields.
pub fn format_fixed_hours(hours: f64) -> String {
    format!("{hours:.2}")
}

/// Short date like `Jan 10, 2024`, in the timezone of the timestamp.
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    date.format("%b %-d, %Y").to_string()
}

/// Hour and minute like `09:05 AM`, in the timezone of the timestamp.
pub fn format_time<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    date.format("%I:%M %p").to_string()
}

/// This is the standard way of converting a date to a string in file names.
pub fn date_to_file_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    use super::*;

    fn test_start_date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap())
    }

    #[test]
    fn test_duration_hours_whole_and_fractional() {
        let start = Utc.from_utc_datetime(&test_start_date());
        for k in [0.25, 1., 8., 30.5] {
            let end = start + Duration::milliseconds((k * MILLIS_IN_HOUR) as i64);
            assert!((duration_hours(&start, &end) - k).abs() < 1e-9, "{k}");
        }
    }

    #[test]
    fn test_duration_hours_negative_is_passed_through() {
        let start = Utc.from_utc_datetime(&test_start_date());
        let end = start - Duration::minutes(30);
        assert_eq!(duration_hours(&start, &end), -0.5);
    }

    #[test]
    fn test_duration_hours_across_timezones() {
        let start = Utc.from_utc_datetime(&test_start_date());
        let end = FixedOffset::east_opt(3600)
            .unwrap()
            .from_utc_datetime(&(test_start_date() + Duration::hours(2)));
        assert_eq!(duration_hours(&start, &end), 2.);
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(1.5), "1h 30m");
        assert_eq!(format_hours(0.5), "30m");
        assert_eq!(format_hours(2.0), "2h");
        assert_eq!(format_hours(0.), "0m");
        assert_eq!(format_hours(12.25), "12h 15m");
    }

    #[test]
    fn test_format_hours_carries_rounded_minutes() {
        assert_eq!(format_hours(1.999), "2h");
        assert_eq!(format_hours(0.9999), "1h");
    }

    #[test]
    fn test_format_hours_negative() {
        assert_eq!(format_hours(-3.), "0m");
    }

    #[test]
    fn test_format_fixed_hours() {
        assert_eq!(format_fixed_hours(8.), "8.00");
        assert_eq!(format_fixed_hours(1. / 3.), "0.33");
    }

    #[test]
    fn test_format_date_and_time() {
        let date = Utc.from_utc_datetime(&(test_start_date() + Duration::minutes(5)));
        assert_eq!(format_date(&date), "Jan 10, 2024");
        assert_eq!(format_time(&date), "09:05 AM");
        assert_eq!(format_time(&(date + Duration::hours(8))), "05:05 PM");
        assert_eq!(date_to_file_name(date.date_naive()), "2024-01-10");
    }
}
