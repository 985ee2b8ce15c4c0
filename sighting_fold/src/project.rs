// ******** Output data structures *********

use log::debug;

use crate::config::{SubjectSummary, AGE_CLASS_COUNT};
use crate::palette::{fill_for_code, Fill};
use crate::SummaryMap;

/// The header row of every projected table.
pub const HEADER: [&str; 14] = [
    "Beach", "Pup ID", "C0", "C1", "C2", "C3", "C4", "C5", "C0", "C1", "C2", "C3", "C4", "C5",
];

/// The column carrying the subject id, formatted with a border and the subject's fill.
pub const ID_COLUMN: usize = 1;

#[derive(PartialEq, Debug, Clone)]
pub enum CellContent {
    Text(String),
    Number(f64),
    Blank,
}

impl CellContent {
    /// Numeric when the text reads as a finite number, text otherwise.
    fn numeric_or_text(s: &str) -> CellContent {
        match s.trim().parse::<f64>() {
            Ok(x) if x.is_finite() => CellContent::Number(x),
            _ if s.is_empty() => CellContent::Blank,
            _ => CellContent::Text(s.to_string()),
        }
    }

    /// The text of the cell. Integral numbers are written without decimals.
    pub fn render(&self) -> String {
        match self {
            CellContent::Text(s) => s.clone(),
            CellContent::Number(x) => format_number(*x),
            CellContent::Blank => "".to_string(),
        }
    }
}

pub fn format_number(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{}", x)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct OutputRow {
    pub subject_id: String,
    /// One cell per header column.
    pub cells: Vec<CellContent>,
    /// The background of the id cell.
    pub id_fill: Fill,
}

#[derive(PartialEq, Debug, Clone)]
pub struct OrderedTable {
    pub header: Vec<String>,
    pub rows: Vec<OutputRow>,
}

// Numeric ids sort before the others, in numeric order.
#[derive(Eq, PartialEq, Debug, Clone, PartialOrd, Ord)]
enum SubjectOrder<'a> {
    Numeric(u64, &'a str),
    Text(&'a str),
}

fn subject_order(id: &str) -> SubjectOrder {
    match id.trim().parse::<u64>() {
        Ok(n) => SubjectOrder::Numeric(n, id),
        Err(_) => SubjectOrder::Text(id),
    }
}

/// Renders the summaries as a table, one row per subject.
///
/// Columns: beach, subject id, the dates of classes 0 to 5 (ISO format), then
/// the julian values of classes 0 to 5. Unset slots are blank.
pub fn project(summaries: &SummaryMap) -> OrderedTable {
    let mut entries: Vec<(&String, &SubjectSummary)> = summaries.iter().collect();
    entries.sort_by(|a, b| subject_order(a.0).cmp(&subject_order(b.0)));

    let rows: Vec<OutputRow> = entries
        .into_iter()
        .map(|(subject_id, summary)| project_row(subject_id, summary))
        .collect();
    debug!("project: {} rows", rows.len());

    OrderedTable {
        header: HEADER.iter().map(|s| s.to_string()).collect(),
        rows,
    }
}

fn project_row(subject_id: &str, summary: &SubjectSummary) -> OutputRow {
    let mut cells: Vec<CellContent> = Vec::with_capacity(HEADER.len());
    cells.push(CellContent::Text(summary.beach.clone()));
    cells.push(CellContent::numeric_or_text(subject_id));
    for slot in summary.age_slots.iter() {
        cells.push(match slot {
            Some(s) => CellContent::Text(s.date.format("%Y-%m-%d").to_string()),
            None => CellContent::Blank,
        });
    }
    for slot in summary.age_slots.iter() {
        cells.push(match slot {
            Some(s) => CellContent::numeric_or_text(&s.julian),
            None => CellContent::Blank,
        });
    }
    debug_assert_eq!(cells.len(), 2 + 2 * AGE_CLASS_COUNT);
    OutputRow {
        subject_id: subject_id.to_string(),
        cells,
        id_fill: fill_for_code(&summary.colour_code),
    }
}
