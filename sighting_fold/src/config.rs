// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use chrono::NaiveDate;

/// The number of age classes tracked for every subject (classes 0 to 5).
pub const AGE_CLASS_COUNT: usize = 6;

/// The colour code of a cell without any background fill.
pub const NO_FILL_COLOUR: &str = "192";

/// One survey row, as delivered by a row source.
///
/// A field is `None` when the row is structurally missing the corresponding
/// cell. Blank cells are reported as missing by the readers of this crate's
/// companion binary.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Row {
    pub beach: Option<String>,
    pub subject_id: Option<String>,
    /// The background colour of the identifier cell, as a palette index.
    pub colour_code: Option<String>,
    pub age_class: Option<String>,
    pub date: Option<String>,
    pub julian: Option<String>,
}

impl Row {
    /// A row where every cell is present.
    pub fn new(beach: &str, subject_id: &str, age_class: &str, date: &str, julian: &str) -> Row {
        Row {
            beach: Some(beach.to_string()),
            subject_id: Some(subject_id.to_string()),
            colour_code: None,
            age_class: Some(age_class.to_string()),
            date: Some(date.to_string()),
            julian: Some(julian.to_string()),
        }
    }

    pub fn with_colour(self, colour_code: &str) -> Row {
        Row {
            colour_code: Some(colour_code.to_string()),
            ..self
        }
    }
}

/// The cells a row cannot do without.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum RowField {
    Beach,
    SubjectId,
    AgeClass,
    Date,
}

impl Display for RowField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowField::Beach => write!(f, "beach"),
            RowField::SubjectId => write!(f, "subject id"),
            RowField::AgeClass => write!(f, "age class"),
            RowField::Date => write!(f, "date"),
        }
    }
}

// ******** Aggregated data structures *********

/// A dated sighting. The date and the julian value always come from the same row.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Sighting {
    pub date: NaiveDate,
    /// Passed through as written in the source.
    pub julian: String,
}

/// Everything known about one subject after folding the rows of a sheet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SubjectSummary {
    /// The beach of the last row seen for this subject.
    pub beach: String,
    /// The colour code of the last row seen for this subject.
    pub colour_code: String,
    /// The earliest sighting for each age class.
    pub age_slots: [Option<Sighting>; AGE_CLASS_COUNT],
}

impl SubjectSummary {
    pub fn new(beach: String, colour_code: String) -> SubjectSummary {
        SubjectSummary {
            beach,
            colour_code,
            age_slots: Default::default(),
        }
    }

    pub fn slot(&self, age_class: usize) -> Option<&Sighting> {
        self.age_slots.get(age_class).and_then(|s| s.as_ref())
    }
}

/// Counters collected while folding the rows of one sheet.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct FoldStats {
    pub rows_folded: u64,
    pub rows_skipped: u64,
    pub slots_filled: u64,
    pub slots_replaced: u64,
}

// ********* Errors **********

/// A date cell that could not be read as `dd/mm/yy`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum DateFormatError {
    /// The text does not follow the `dd/mm/yy` pattern.
    Pattern(String),
    /// The text follows the pattern but names a day that does not exist.
    InvalidCalendarDate(String),
}

impl Error for DateFormatError {}

impl Display for DateFormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateFormatError::Pattern(raw) => {
                write!(f, "Failed to convert text to date: {:?} (expected dd/mm/yy)", raw)
            }
            DateFormatError::InvalidCalendarDate(raw) => {
                write!(f, "Failed to convert text to date: {:?} is not a calendar date", raw)
            }
        }
    }
}

/// Errors that abort the aggregation of a whole sheet.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FatalRowError {
    AgeClassOutOfRange {
        sheet: String,
        /// 1-based, as displayed by spreadsheet programs.
        row_number: usize,
        age_class: u32,
        raw: String,
    },
    DateFormat {
        sheet: String,
        row_number: usize,
        error: DateFormatError,
    },
}

impl FatalRowError {
    pub fn sheet(&self) -> &str {
        match self {
            FatalRowError::AgeClassOutOfRange { sheet, .. } => sheet,
            FatalRowError::DateFormat { sheet, .. } => sheet,
        }
    }

    pub fn row_number(&self) -> usize {
        match self {
            FatalRowError::AgeClassOutOfRange { row_number, .. } => *row_number,
            FatalRowError::DateFormat { row_number, .. } => *row_number,
        }
    }
}

impl Error for FatalRowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FatalRowError::AgeClassOutOfRange { .. } => None,
            FatalRowError::DateFormat { error, .. } => Some(error),
        }
    }
}

impl Display for FatalRowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FatalRowError::AgeClassOutOfRange {
                sheet,
                row_number,
                age_class,
                raw,
            } => write!(
                f,
                "FATAL ERROR in sheet {:?} at row {}\nPlease fix error in age class column!\nAge class {} is out of range 0..5 (cell text: {:?})",
                sheet, row_number, age_class, raw
            ),
            FatalRowError::DateFormat {
                sheet,
                row_number,
                error,
            } => write!(
                f,
                "FATAL ERROR in sheet {:?} at row {}\nPlease fix error in date column!\n{}",
                sheet, row_number, error
            ),
        }
    }
}

// ********* Configuration **********

/// How far a fatal row error reaches.
///
/// - PerSheet abandons the sheet being processed and hands control back
/// to the caller, which may go on with the next sheet.
///
/// - ProcessWide stops the whole run at the first fatal row error.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum AbortScope {
    #[default]
    PerSheet,
    ProcessWide,
}
