//! Tolerant timestamp parsing.
//!
//! Spreadsheet timelines arrive in many shapes: native date cells, ISO-ish text, dotted
//! European dates, serial day counts, or raw Unix milliseconds. [`parse_instant`] accepts all of
//! them and returns `None` (never an error) for anything it cannot read, so a single bad cell
//! only degrades its own offset.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use swimmer_table::Value;

pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Unix milliseconds of 1899-12-30T00:00:00, day zero of the 1900 date system.
const EXCEL_1900_EPOCH_MS: i64 = -2_209_161_600_000;
/// Unix milliseconds of 1904-01-01T00:00:00.
const EXCEL_1904_EPOCH_MS: i64 = -2_082_844_800_000;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y"];

/// Date system used to interpret serial day counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateSystem {
    /// Day zero is 1899-12-30 (spreadsheet default).
    #[serde(rename = "excel1900")]
    Excel1900,
    /// Day zero is 1904-01-01.
    #[serde(rename = "excel1904")]
    Excel1904,
}

impl Default for DateSystem {
    fn default() -> Self {
        Self::Excel1900
    }
}

impl DateSystem {
    const fn epoch_ms(self) -> i64 {
        match self {
            DateSystem::Excel1900 => EXCEL_1900_EPOCH_MS,
            DateSystem::Excel1904 => EXCEL_1904_EPOCH_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DateParseOptions {
    pub date_system: DateSystem,
    /// Numbers at or above this are serial day counts; smaller numbers are Unix milliseconds.
    pub serial_threshold: f64,
}

impl Default for DateParseOptions {
    fn default() -> Self {
        Self {
            date_system: DateSystem::default(),
            serial_threshold: 1000.0,
        }
    }
}

/// Convert a serial day count into a date-time.
pub fn serial_to_datetime(serial: f64, system: DateSystem) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let offset = (serial * MS_PER_DAY).round();
    if offset.abs() > i64::MAX as f64 {
        return None;
    }
    let ms = system.epoch_ms().checked_add(offset as i64)?;
    from_unix_ms(ms)
}

fn from_unix_ms(ms: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

fn parse_number(n: f64, options: &DateParseOptions) -> Option<NaiveDateTime> {
    if !n.is_finite() {
        return None;
    }
    if n >= options.serial_threshold {
        serial_to_datetime(n, options.date_system)
    } else {
        from_unix_ms(n.trunc() as i64)
    }
}

/// Split a trailing zone designator (`Z`, `±HH:MM`, `±HHMM` or `±HH`) off a date-time.
///
/// Returns the local part and the zone's offset east of UTC in seconds. Strings without a time
/// part never carry a zone, so date hyphens are not mistaken for offsets.
fn split_zone(s: &str) -> (&str, Option<i32>) {
    let Some(time_start) = s.find([' ', 'T']).map(|idx| idx + 1) else {
        return (s, None);
    };
    if let Some(local) = s.strip_suffix(['Z', 'z']) {
        return (local.trim_end(), Some(0));
    }

    let time = &s[time_start..];
    let Some(sign_at) = time.rfind(['+', '-']) else {
        return (s, None);
    };
    let digits: String = time[sign_at + 1..].chars().filter(|c| *c != ':').collect();
    if !matches!(digits.len(), 2 | 4) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return (s, None);
    }
    let hours: i32 = digits[..2].parse().unwrap_or(i32::MAX);
    let minutes: i32 = if digits.len() == 4 {
        digits[2..].parse().unwrap_or(i32::MAX)
    } else {
        0
    };
    if hours > 23 || minutes > 59 {
        return (s, None);
    }
    let sign = if time[sign_at..].starts_with('-') { -1 } else { 1 };
    let local = s[..time_start + sign_at].trim_end();
    (local, Some(sign * (hours * 3600 + minutes * 60)))
}

/// Rewrite `.` date separators to `-`, leaving any time part (and its fractional seconds) alone.
/// A bare hour (`T08`) gets `:00` minutes.
fn normalize_local(s: &str) -> String {
    let split = s.find([' ', 'T']).unwrap_or(s.len());
    let (date, time) = s.split_at(split);
    let mut out = date.replace('.', "-");
    out.push_str(time);
    if time.len() == 3 && time[1..].bytes().all(|b| b.is_ascii_digit()) {
        out.push_str(":00");
    }
    out
}

fn parse_local(s: &str) -> Option<NaiveDateTime> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn parse_text(text: &str, options: &DateParseOptions) -> Option<NaiveDateTime> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(n) = s.parse::<f64>() {
        if n.is_finite() {
            return parse_number(n, options);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    let (local, zone) = split_zone(s);
    let naive = parse_local(&normalize_local(local))?;
    match zone {
        None => Some(naive),
        Some(seconds) => naive
            .and_local_timezone(FixedOffset::east_opt(seconds)?)
            .single()
            .map(|dt| dt.naive_utc()),
    }
}

/// Parse a cell into an absolute instant.
///
/// Returns `None` for empty, boolean and unparseable cells.
pub fn parse_instant(value: &Value, options: &DateParseOptions) -> Option<NaiveDateTime> {
    match value {
        Value::DateTime(dt) => Some(*dt),
        Value::Number(n) => parse_number(*n, options),
        Value::String(s) => parse_text(s, options),
        Value::Null | Value::Boolean(_) => None,
    }
}

/// Signed offset of `cell` from `reference`, in days divided by `divisor`.
///
/// `NaN` when either instant is missing.
pub fn day_offset(
    cell: Option<NaiveDateTime>,
    reference: Option<NaiveDateTime>,
    divisor: f64,
) -> f64 {
    match (cell, reference) {
        (Some(cell), Some(reference)) => {
            (cell - reference).num_milliseconds() as f64 / MS_PER_DAY / divisor
        }
        _ => f64::NAN,
    }
}
