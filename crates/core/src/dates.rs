//! Date serials and date-or-year parsing.

use crate::value::{DecodedValue, Number};
use baremes_sheet::DateMode;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[12]\d{3}$").expect("valid regex"))
}

fn french_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<day>0?[1-9]|[12]\d|3[01])/(?P<month>0?[1-9]|1[0-2])/(?P<year>[12]\d{3})$")
            .expect("valid regex")
    })
}

/// Largest day count a serial may carry.
const MAX_SERIAL_DAYS: f64 = 2_958_465.0;

/// Format a raw date serial the way a DATE cell decodes.
///
/// Returns `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` when a time of day is present,
/// or `HH:MM:SS` when the serial has no day part. Negative serials, the
/// ambiguous first 60 days of the 1900 epoch and a zero serial give `None`.
pub fn format_date_serial(serial: f64, mode: DateMode) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 || serial >= MAX_SERIAL_DAYS {
        return None;
    }
    let mut days = serial.trunc() as i64;
    let mut seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    if seconds == 86_400 {
        seconds = 0;
        days += 1;
    }
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds as u32, 0)?;
    let has_time = seconds != 0;

    if days == 0 {
        return has_time.then(|| time.format("%H:%M:%S").to_string());
    }

    let epoch = match mode {
        // Day 60 is the non-existent 1900-02-29.
        DateMode::Windows1900 if days < 61 => return None,
        DateMode::Windows1900 => NaiveDate::from_ymd_opt(1899, 12, 30)?,
        DateMode::Mac1904 => NaiveDate::from_ymd_opt(1904, 1, 1)?,
    };
    let date = epoch.checked_add_signed(Duration::days(days))?;
    Some(if has_time {
        NaiveDateTime::new(date, time)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string()
    } else {
        date.format("%Y-%m-%d").to_string()
    })
}

/// Outcome of reading a first-column cell as an entry date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCell {
    /// The cell is null
    Blank,
    Date(NaiveDate),
    NotADate,
}

/// Read a cell as a date or a bare year.
///
/// Integers within `years` and four-digit strings map to 1 January of that
/// year; other strings are tried as French `D/M/YYYY` then ISO 8601 dates.
pub fn parse_date_or_year(value: &DecodedValue, years: &RangeInclusive<i32>) -> DateCell {
    match value {
        DecodedValue::Null => DateCell::Blank,
        DecodedValue::Number(Number::Int(year)) => i32::try_from(*year)
            .ok()
            .filter(|year| years.contains(year))
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
            .map_or(DateCell::NotADate, DateCell::Date),
        DecodedValue::Text(s) | DecodedValue::Date(s) => {
            let s = s.trim();
            if year_regex().is_match(s) {
                return s
                    .parse()
                    .ok()
                    .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
                    .map_or(DateCell::NotADate, DateCell::Date);
            }
            parse_text_date(s).map_or(DateCell::NotADate, DateCell::Date)
        }
        _ => DateCell::NotADate,
    }
}

/// ISO 8601 date-time layouts accepted after a date
const ISO_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a French `D/M/YYYY` or an ISO 8601 date.
///
/// An ISO date may carry a valid time of day, which is dropped; any other
/// trailing text rejects the input.
pub fn parse_text_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Some(caps) = french_date_regex().captures(s) {
        return NaiveDate::from_ymd_opt(
            caps["year"].parse().ok()?,
            caps["month"].parse().ok()?,
            caps["day"].parse().ok()?,
        );
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    ISO_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|datetime| datetime.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_date_serial_1900() {
        let mode = DateMode::Windows1900;
        assert_eq!(format_date_serial(61.0, mode).as_deref(), Some("1900-03-01"));
        assert_eq!(format_date_serial(41640.0, mode).as_deref(), Some("2014-01-01"));
        assert_eq!(
            format_date_serial(41640.5, mode).as_deref(),
            Some("2014-01-01T12:00:00")
        );
        assert_eq!(format_date_serial(0.75, mode).as_deref(), Some("18:00:00"));
    }

    #[test]
    fn test_format_date_serial_edge_cases() {
        let mode = DateMode::Windows1900;
        assert_eq!(format_date_serial(0.0, mode), None);
        assert_eq!(format_date_serial(-1.0, mode), None);
        assert_eq!(format_date_serial(60.0, mode), None);
        // Rounds up to midnight of the next day.
        assert_eq!(
            format_date_serial(41640.999_999_9, mode).as_deref(),
            Some("2014-01-02")
        );
    }

    #[test]
    fn test_format_date_serial_1904() {
        assert_eq!(
            format_date_serial(1.0, DateMode::Mac1904).as_deref(),
            Some("1904-01-02")
        );
    }

    #[test]
    fn test_parse_year_and_dates() {
        let years = 1914..=2020;
        assert_eq!(
            parse_date_or_year(&DecodedValue::Number(Number::Int(1991)), &years),
            DateCell::Date(ymd(1991, 1, 1))
        );
        assert_eq!(
            parse_date_or_year(&DecodedValue::Number(Number::Int(2021)), &years),
            DateCell::NotADate
        );
        assert_eq!(
            parse_date_or_year(&DecodedValue::Text("2020".to_string()), &years),
            DateCell::Date(ymd(2020, 1, 1))
        );
        assert_eq!(
            parse_date_or_year(&DecodedValue::Text("1/7/1991".to_string()), &years),
            DateCell::Date(ymd(1991, 7, 1))
        );
        assert_eq!(
            parse_date_or_year(&DecodedValue::Date("2014-01-01".to_string()), &years),
            DateCell::Date(ymd(2014, 1, 1))
        );
        assert_eq!(parse_date_or_year(&DecodedValue::Null, &years), DateCell::Blank);
    }

    #[test]
    fn test_parse_rejects_non_dates() {
        let years = 1914..=2020;
        for value in [
            DecodedValue::Text("Taux".to_string()),
            DecodedValue::Text("31/02/2000".to_string()),
            DecodedValue::Number(Number::Float(1991.5)),
            DecodedValue::Boolean(true),
        ] {
            assert_eq!(parse_date_or_year(&value, &years), DateCell::NotADate);
        }
    }

    #[test]
    fn test_parse_text_date_with_time() {
        assert_eq!(parse_text_date("2014-01-01T00:00:00"), Some(ymd(2014, 1, 1)));
        assert_eq!(parse_text_date("01/04/2014"), Some(ymd(2014, 4, 1)));
        assert_eq!(parse_text_date("JO du 1er avril"), None);
        assert_eq!(parse_text_date("1990-12-30 08:15:00"), Some(ymd(1990, 12, 30)));
        assert_eq!(parse_text_date("1990-12-30T08:15"), Some(ymd(1990, 12, 30)));
    }

    #[test]
    fn test_parse_text_date_rejects_trailing_text() {
        assert_eq!(parse_text_date("30/12/1990 junk"), None);
        assert_eq!(parse_text_date("1990-12-30 junk"), None);
        assert_eq!(parse_text_date("1990-12-30T25:00:00"), None);
        assert_eq!(parse_text_date("1990-12-30T"), None);
    }
}
