use log::debug;

/// The value returned when a cell carries no usable age class.
pub const NO_AGE_CLASS: i32 = -1;

/// Reads the age class out of a free-text cell.
///
/// Surveyors write things like `"2B"` or `"C3"`: the first decimal digit of the text
/// is the age class. Returns `NO_AGE_CLASS` when the text has no digit at all.
/// Digits above 5 are returned as-is and rejected by the aggregator.
///
/// Only ASCII digits count: other decimal digits, such as the full-width `３`,
/// are read as text.
pub fn sanitize_age_class(raw: &str) -> i32 {
    match raw.chars().find_map(|c| c.to_digit(10)) {
        Some(d) => d as i32,
        None => {
            debug!("sanitize_age_class: no digit in {:?}", raw);
            NO_AGE_CLASS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_digit_wins() {
        assert_eq!(sanitize_age_class("2B"), 2);
        assert_eq!(sanitize_age_class("C3"), 3);
        assert_eq!(sanitize_age_class("class 4 or 5"), 4);
        assert_eq!(sanitize_age_class("0"), 0);
    }

    #[test]
    fn no_digit() {
        assert_eq!(sanitize_age_class("B"), NO_AGE_CLASS);
        assert_eq!(sanitize_age_class(""), NO_AGE_CLASS);
        assert_eq!(sanitize_age_class("-"), NO_AGE_CLASS);
    }

    #[test]
    fn only_ascii_digits() {
        assert_eq!(sanitize_age_class("\u{FF13}"), NO_AGE_CLASS);
        assert_eq!(sanitize_age_class("\u{FF13}2"), 2);
        assert_eq!(sanitize_age_class("\u{0663}"), NO_AGE_CLASS);
    }

    #[test]
    fn out_of_range_digits_are_kept() {
        assert_eq!(sanitize_age_class("6"), 6);
        assert_eq!(sanitize_age_class("x9"), 9);
    }
}
