//! Date helpers for backend-compatible date handling.
//!
//! The backend stores calendar dates as `YYYY-MM-DD` strings and keys
//! chores by weekday name ("Monday" .. "Sunday"). Everything here is a
//! pure function over `chrono::NaiveDate`.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

use crate::error::ValidationError;

/// Weekday names in backend order (week starts on Monday).
pub const DAYS_OF_WEEK: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Today's date in the local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Format a date into the backend's `YYYY-MM-DD` form.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` string.
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// The backend weekday name for a date.
pub fn day_of_week(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Add (or with a negative count, subtract) days.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// The Monday-to-Sunday week containing `date`.
pub fn week_of(date: NaiveDate) -> [NaiveDate; 7] {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    std::array::from_fn(|i| monday + Duration::days(i as i64))
}

/// Human-friendly form, e.g. "January 5, 2026".
pub fn readable_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Relative label for a date measured against `today`:
/// "Today", "Tomorrow", "This Week", "Next Week", "Last Week",
/// otherwise the readable form.
pub fn relative_label(date: NaiveDate, today: NaiveDate) -> String {
    let diff_days = (date - today).num_days();
    match diff_days {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        2..=7 => "This Week".to_string(),
        d if d > 7 => "Next Week".to_string(),
        -7..=-1 => "Last Week".to_string(),
        _ => readable_date(date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn format_and_parse_roundtrip() {
        let d = date(2026, 8, 7);
        assert_eq!(format_date(d), "2026-08-07");
        assert_eq!(parse_date("2026-08-07").unwrap(), d);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_date("07/08/2026").is_err());
        assert!(parse_date("not-a-date").is_err());
    }

    #[test]
    fn weekday_names_match_backend() {
        // 2026-08-03 is a Monday.
        let monday = date(2026, 8, 3);
        for (i, name) in DAYS_OF_WEEK.iter().enumerate() {
            assert_eq!(day_of_week(add_days(monday, i as i64)), *name);
        }
    }

    #[test]
    fn week_of_starts_on_monday() {
        let week = week_of(date(2026, 8, 7)); // a Friday
        assert_eq!(week[0], date(2026, 8, 3));
        assert_eq!(week[6], date(2026, 8, 9));
        assert_eq!(day_of_week(week[0]), "Monday");
    }

    #[test]
    fn week_of_is_stable_across_the_week() {
        let from_monday = week_of(date(2026, 8, 3));
        let from_sunday = week_of(date(2026, 8, 9));
        assert_eq!(from_monday, from_sunday);
    }

    #[test]
    fn readable_date_is_unpadded() {
        assert_eq!(readable_date(date(2026, 1, 5)), "January 5, 2026");
    }

    #[test]
    fn relative_labels() {
        let today = date(2026, 8, 7);
        assert_eq!(relative_label(today, today), "Today");
        assert_eq!(relative_label(add_days(today, 1), today), "Tomorrow");
        assert_eq!(relative_label(add_days(today, 5), today), "This Week");
        assert_eq!(relative_label(add_days(today, 12), today), "Next Week");
        assert_eq!(relative_label(add_days(today, -3), today), "Last Week");
        assert_eq!(relative_label(add_days(today, -30), today), "July 8, 2026");
    }
}
