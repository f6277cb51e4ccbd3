//! Relative date normalization
//!
//! Turns user-facing date expressions into calendar dates. Accepted forms:
//! - `YYYY-MM-DD`
//! - RFC3339 timestamps (converted to the UTC date)
//! - `today`, `yesterday`, `tomorrow`
//! - weekday names (the most recent such day, today included)
//! - `<N> day(s) ago`, `<N> week(s) ago`
//!
//! All relative forms are evaluated against the UTC date of `now`.

use crate::error::RefError;
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

static RELATIVE_AGO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+)\s+(day|days|week|weeks)\s+ago$").expect("relative date pattern is valid")
});

/// Normalized inclusive date range; either end may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    /// First day included
    pub since: Option<NaiveDate>,
    /// Last day included
    pub until: Option<NaiveDate>,
}

/// Normalize one date expression
///
/// Blank input yields `Ok(None)`.
pub fn normalize_date_value(value: &str, now: DateTime<Utc>) -> Result<Option<NaiveDate>, RefError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(ts.with_timezone(&Utc).date_naive()));
    }

    let today = now.date_naive();
    let invalid = || RefError::InvalidDate {
        value: value.to_string(),
    };
    let lower = value.to_lowercase();
    match lower.as_str() {
        "today" => return Ok(Some(today)),
        "yesterday" => return today.checked_sub_days(Days::new(1)).map(Some).ok_or_else(invalid),
        "tomorrow" => return today.checked_add_days(Days::new(1)).map(Some).ok_or_else(invalid),
        _ => {}
    }
    if let Ok(weekday) = lower.parse::<Weekday>() {
        return most_recent_weekday(today, weekday).map(Some).ok_or_else(invalid);
    }
    if let Some(caps) = RELATIVE_AGO.captures(&lower) {
        let n: u64 = caps[1].parse().map_err(|_| invalid())?;
        let days = if caps[2].starts_with("week") {
            n.checked_mul(7).ok_or_else(invalid)?
        } else {
            n
        };
        return today.checked_sub_days(Days::new(days)).map(Some).ok_or_else(invalid);
    }
    Err(invalid())
}

/// Normalize a `since`/`until` pair
///
/// A given `since` with a blank `until` closes the range at today.
pub fn normalize_date_range(now: DateTime<Utc>, since: &str, until: &str) -> Result<DateRange, RefError> {
    let since = normalize_date_value(since, now)?;
    let until = match (since, until.trim()) {
        (Some(_), "") => Some(now.date_naive()),
        (_, raw) => normalize_date_value(raw, now)?,
    };
    if let (Some(s), Some(u)) = (since, until) {
        if s > u {
            return Err(RefError::InvertedRange {
                since: s.to_string(),
                until: u.to_string(),
            });
        }
    }
    tracing::debug!(?since, ?until, "normalized date range");
    Ok(DateRange { since, until })
}

fn most_recent_weekday(today: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let current = today.weekday().num_days_from_sunday();
    let target = weekday.num_days_from_sunday();
    let diff = (current + 7 - target) % 7;
    today.checked_sub_days(Days::new(u64::from(diff)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        // Sunday
        Utc.with_ymd_and_hms(2026, 2, 22, 15, 30, 0).unwrap()
    }

    fn day(s: &str) -> Option<NaiveDate> {
        Some(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
    }

    #[test]
    fn absolute_forms() {
        assert_eq!(normalize_date_value("2025-12-31", now()).unwrap(), day("2025-12-31"));
        assert_eq!(
            normalize_date_value("2026-02-21T23:30:00-02:00", now()).unwrap(),
            day("2026-02-22")
        );
        assert_eq!(normalize_date_value("  ", now()).unwrap(), None);
    }

    #[test]
    fn relative_keywords() {
        assert_eq!(normalize_date_value("Today", now()).unwrap(), day("2026-02-22"));
        assert_eq!(normalize_date_value("yesterday", now()).unwrap(), day("2026-02-21"));
        assert_eq!(normalize_date_value("tomorrow", now()).unwrap(), day("2026-02-23"));
    }

    #[test]
    fn weekday_is_most_recent_including_today() {
        assert_eq!(normalize_date_value("monday", now()).unwrap(), day("2026-02-16"));
        assert_eq!(normalize_date_value("Saturday", now()).unwrap(), day("2026-02-21"));
        assert_eq!(normalize_date_value("sunday", now()).unwrap(), day("2026-02-22"));
    }

    #[test]
    fn days_and_weeks_ago() {
        assert_eq!(normalize_date_value("30 days ago", now()).unwrap(), day("2026-01-23"));
        assert_eq!(normalize_date_value("1 day ago", now()).unwrap(), day("2026-02-21"));
        assert_eq!(normalize_date_value("2 Weeks  ago", now()).unwrap(), day("2026-02-08"));
    }

    #[test]
    fn garbage_is_rejected() {
        let err = normalize_date_value("next blue moon", now()).unwrap_err();
        assert!(matches!(err, RefError::InvalidDate { ref value } if value == "next blue moon"));
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn range_defaults_until_to_today() {
        let range = normalize_date_range(now(), "30 days ago", "").unwrap();
        assert_eq!(range.since, day("2026-01-23"));
        assert_eq!(range.until, day("2026-02-22"));
    }

    #[test]
    fn range_with_only_until_stays_open() {
        let range = normalize_date_range(now(), "", "yesterday").unwrap();
        assert_eq!(range, DateRange { since: None, until: day("2026-02-21") });
        assert_eq!(normalize_date_range(now(), "", "").unwrap(), DateRange::default());
    }

    #[test]
    fn inverted_range_fails() {
        let err = normalize_date_range(now(), "today", "yesterday").unwrap_err();
        assert_eq!(
            err,
            RefError::InvertedRange {
                since: "2026-02-22".into(),
                until: "2026-02-21".into(),
            }
        );
    }
}
