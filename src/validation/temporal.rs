use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Regex;

use super::ValidationError;

pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";
pub const CALENDAR_DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

fn time_of_day_re() -> &'static Regex {
    static TIME_OF_DAY_RE: OnceLock<Regex> = OnceLock::new();
    TIME_OF_DAY_RE.get_or_init(|| {
        Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("invalid time of day regex")
    })
}

fn calendar_date_re() -> &'static Regex {
    static CALENDAR_DATE_RE: OnceLock<Regex> = OnceLock::new();
    CALENDAR_DATE_RE.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("invalid calendar date regex")
    })
}

pub fn is_valid_time_of_day(value: &str) -> bool {
    time_of_day_re().is_match(value)
}

/// Shape check plus a real-calendar check, so `2021-02-30` is rejected.
pub fn is_valid_calendar_date(value: &str) -> bool {
    calendar_date_re().is_match(value)
        && NaiveDate::parse_from_str(value, CALENDAR_DATE_FORMAT).is_ok()
}

/// An absent or empty end date means the recurrence never ends.
pub fn is_valid_end_date(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(s) if s.is_empty() => true,
        Some(s) => is_valid_calendar_date(s),
    }
}

pub fn is_chronologically_ordered<T: PartialOrd>(start: &T, end: &T) -> bool {
    start < end
}

pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    if !is_valid_time_of_day(value) {
        return None;
    }
    NaiveTime::parse_from_str(value, TIME_OF_DAY_FORMAT).ok()
}

pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    if !is_valid_calendar_date(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, CALENDAR_DATE_FORMAT).ok()
}

/// Accepts the date-like shapes clients send for events. Offsets are
/// normalized to UTC; a bare date means midnight.
pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    parse_calendar_date(value).and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub fn compose(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

pub fn ensure_event_order(
    date_start: &NaiveDateTime,
    date_end: &NaiveDateTime,
) -> Result<(), ValidationError> {
    if is_chronologically_ordered(date_start, date_end) {
        Ok(())
    } else {
        Err(ValidationError::OutOfOrder {
            start_label: "date_start",
            start: date_start.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            end_label: "date_end",
            end: date_end.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        })
    }
}

/// Without an end date the window is unbounded and trivially ordered.
pub fn ensure_recurrence_order(
    start_recur: NaiveDate,
    start_time: NaiveTime,
    end_recur: Option<NaiveDate>,
    end_time: NaiveTime,
) -> Result<(), ValidationError> {
    let Some(end_recur) = end_recur else {
        return Ok(());
    };

    let start = compose(start_recur, start_time);
    let end = compose(end_recur, end_time);

    if is_chronologically_ordered(&start, &end) {
        Ok(())
    } else {
        Err(ValidationError::OutOfOrder {
            start_label: "start_recur",
            start: start.format("%Y-%m-%dT%H:%M").to_string(),
            end_label: "end_recur",
            end: end.format("%Y-%m-%dT%H:%M").to_string(),
        })
    }
}
