//! Validation functions for user-entered class data.
//
// Imported events are accepted as-is; these helpers guard the edit commands.

use crate::calendar::{CalendarError, Weekday};
use chrono::{Datelike, NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").expect("valid time regex"));
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// Validate date string has format YYYY-MM-DD
pub fn validate_date_format(date: &str) -> bool {
    if !DATE_RE.is_match(date) {
        return false;
    }
    if let Ok(naive_date) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        let year = naive_date.year();
        return (2000..=2100).contains(&year);
    }
    false
}

/// Check an exclusion date entered by hand.
pub fn validate_exclusion_date(date: &str) -> Result<String, CalendarError> {
    let date = date.trim();
    if validate_date_format(date) {
        Ok(date.to_string())
    } else {
        Err(CalendarError::InvalidDate(date.to_string()))
    }
}

/// Validate time string has format HH:MM or HH:MM:SS
pub fn validate_time_format(time: &str) -> bool {
    parse_clock_time(time).is_some()
}

/// Normalise a user-entered time to the stored `HH:MM:SS` form.
pub fn normalize_time(time: &str) -> Result<String, CalendarError> {
    parse_clock_time(time)
        .map(|t| t.format("%H:%M:%S").to_string())
        .ok_or_else(|| CalendarError::InvalidTime(time.to_string()))
}

fn parse_clock_time(time: &str) -> Option<NaiveTime> {
    let caps = TIME_RE.captures(time.trim())?;
    let hours: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: u32 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: u32 = match caps.get(3) {
        Some(s) => s.as_str().parse().ok()?,
        None => 0,
    };
    NaiveTime::from_hms_opt(hours, minutes, seconds)
}

/// Parse a comma-separated weekday list such as `mon,wed,fri`.
///
/// Duplicates are removed; the first occurrence keeps its position.
pub fn parse_days(list: &str) -> Result<Vec<Weekday>, CalendarError> {
    let mut days = Vec::new();
    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let day: Weekday = part.parse().map_err(CalendarError::InvalidDays)?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    if days.is_empty() {
        return Err(CalendarError::InvalidDays("at least one weekday is required".to_string()));
    }
    Ok(days)
}

/// Check a class entered by hand and return its normalised start and end times.
pub fn validate_class_times(
    title: &str,
    start_time: &str,
    end_time: &str,
) -> Result<(String, String), CalendarError> {
    if title.trim().is_empty() {
        return Err(CalendarError::EmptyTitle);
    }
    let start = normalize_time(start_time)?;
    let end = normalize_time(end_time)?;
    // Fixed-width HH:MM:SS strings order the same way as the times they encode
    if end <= start {
        return Err(CalendarError::TimeOrder { start, end });
    }
    Ok((start, end))
}
