//! Date keys and calendar arithmetic.
//!
//! Upstream rows carry dates in several shapes (plain ISO dates, RFC 3339
//! timestamps, Postgres `timestamptz` text, Unix epochs). Everything the
//! engine compares is first reduced to a [`NaiveDate`] with [`parse_date_key`].

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

const DATETIME_OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

/// Parse any supported date representation into a calendar date.
///
/// Timestamps with an offset keep the calendar date as written in that
/// offset. Integer values are Unix epochs: seconds up to 10 digits,
/// milliseconds at 13 digits.
///
/// Returns `None` for malformed input.
pub fn parse_date_key(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(date) = parse_epoch(value) {
        return Some(date);
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }

    for format in DATETIME_OFFSET_FORMATS {
        if let Ok(datetime) = DateTime::parse_from_str(value, format) {
            return Some(datetime.date_naive());
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }

    None
}

fn parse_epoch(value: &str) -> Option<NaiveDate> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let number: i64 = value.parse().ok()?;
    let datetime = match digits.len() {
        1..=10 => DateTime::from_timestamp(number, 0)?,
        13 => DateTime::from_timestamp_millis(number)?,
        _ => return None,
    };
    Some(datetime.date_naive())
}

/// Canonical `YYYY-MM-DD` key for a date.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Number of days in `month` (1-12) of `year`.
///
/// Returns 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let (next_year, next_month) = next_month(year, month);
    match NaiveDate::from_ymd_opt(next_year, next_month, 1) {
        Some(next_first) => (next_first - first).num_days() as u32,
        None => 31,
    }
}

/// Year and month following `month` of `year`.
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// The date `day` of `month`, clamped to the last day of that month.
///
/// `clamp_to_month(2024, 2, 31)` is 2024-02-29.
pub fn clamp_to_month(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = days_in_month(year, month);
    if last == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, last))
}

/// First and last day of the calendar month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date.with_day(1).unwrap_or(date);
    let end = clamp_to_month(date.year(), date.month(), 31).unwrap_or(date);
    (start, end)
}
