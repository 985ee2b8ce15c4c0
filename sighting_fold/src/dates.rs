use chrono::{Datelike, NaiveDate};
use log::debug;

use crate::config::DateFormatError;

/// Two-digit years are read in the 2000s. Any year past this one was
/// meant to be in the 1900s and is moved back a century.
pub const YEAR_CORRECTION_THRESHOLD: i32 = 2025;

const CENTURY: i32 = 100;

/// Parses a `dd/mm/yy` survey date.
///
/// The fields must have exactly two digits each. Nothing else is accepted, whitespace
/// included.
pub fn parse_date(raw: &str) -> Result<NaiveDate, DateFormatError> {
    let pattern_error = || DateFormatError::Pattern(raw.to_string());
    let bytes = raw.as_bytes();
    // Both separators are ASCII, so the slices below fall on char boundaries.
    if bytes.len() != 8 || bytes[2] != b'/' || bytes[5] != b'/' {
        return Err(pattern_error());
    }
    let day = two_digits(&raw[0..2]).ok_or_else(pattern_error)?;
    let month = two_digits(&raw[3..5]).ok_or_else(pattern_error)?;
    let year = two_digits(&raw[6..8]).ok_or_else(pattern_error)? as i32 + 2000;

    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DateFormatError::InvalidCalendarDate(raw.to_string()))?;
    correct_century(date).ok_or_else(|| DateFormatError::InvalidCalendarDate(raw.to_string()))
}

fn two_digits(s: &str) -> Option<u32> {
    if s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse::<u32>().ok()
    } else {
        None
    }
}

fn correct_century(date: NaiveDate) -> Option<NaiveDate> {
    if date.year() > YEAR_CORRECTION_THRESHOLD {
        debug!(
            "correct_century: {} is past {}, moving it back one century",
            date, YEAR_CORRECTION_THRESHOLD
        );
        date.with_year(date.year() - CENTURY)
    } else {
        Some(date)
    }
}
