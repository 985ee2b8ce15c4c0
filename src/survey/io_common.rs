use chrono::NaiveDate;
use std::path::Path;

/// The name of a file without its directory and extension.
pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| path.to_string())
}

/// The file name of the result table of a sheet.
pub fn output_file_name(sheet: &str, extension: &str) -> String {
    let safe_name: String = sheet
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    format!("{}_result.{}", safe_name, extension)
}

/// Reads a palette index written in a cell.
pub fn parse_colour_code(s: &str) -> Option<u16> {
    let t = s.trim();
    t.parse::<u16>()
        .ok()
        .or_else(|| match t.parse::<f64>() {
            Ok(x) if x.fract() == 0.0 && (0.0..=u16::MAX as f64).contains(&x) => Some(x as u16),
            _ => None,
        })
}

/// Converts spreadsheet column letters to a 0-based index: A -> 0, Z -> 25, AA -> 26.
pub fn column_letters_to_index(s: &str) -> Option<usize> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let mut idx: usize = 0;
    for c in s.to_ascii_uppercase().bytes() {
        idx = idx.checked_mul(26)?.checked_add((c - b'A') as usize + 1)?;
    }
    Some(idx - 1)
}

// Serial numbers count days from 1899-12-30 in the 1900 date system.
const MAX_SERIAL: f64 = 2_958_465.0;

/// Writes a date cell the way surveyors type dates, so that it goes through
/// the same parsing as text dates.
pub fn serial_to_survey_date(serial: f64) -> Option<String> {
    if !serial.is_finite() || !(0.0..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(chrono::Duration::days(serial.trunc() as i64))?;
    Some(date.format("%d/%m/%y").to_string())
}
