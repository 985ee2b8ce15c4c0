mod age_class;
mod config;
mod dates;
pub mod manual;
pub mod palette;
pub mod project;

use log::debug;

use std::collections::BTreeMap;

pub use crate::age_class::*;
pub use crate::config::*;
pub use crate::dates::*;
pub use crate::project::*;

/// The summaries of a sheet, keyed by subject id.
pub type SummaryMap = BTreeMap<String, SubjectSummary>;

/// What happened to one row.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RowOutcome {
    /// The row was folded into the summaries.
    Continue,
    /// The row misses a cell and was left out. Processing goes on.
    Skip(RowField),
    /// The run is over: nothing should be produced from it.
    Abort(FatalRowError),
}

#[derive(Eq, PartialEq, Debug, Clone)]
enum RunState {
    Running,
    Aborted(FatalRowError),
}

/// The outcome of a run that went through all its rows.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Aggregation {
    pub sheet: String,
    pub summaries: SummaryMap,
    pub stats: FoldStats,
}

enum Rejection {
    Missing(RowField),
    Fatal(FatalRowError),
}

// A row with all the cells the merge needs.
struct CheckedRow<'a> {
    subject_id: &'a str,
    beach: &'a str,
    colour_code: &'a str,
    sighting: Option<(usize, Sighting)>,
}

/// Folds the rows of one sheet, in order, into one summary per subject.
///
/// The aggregator owns the summaries for the duration of the run. Once a fatal
/// row has been seen, it stops folding and can only report the error.
///
/// ```
/// use sighting_fold::{Aggregator, Row, RowOutcome};
///
/// let mut agg = Aggregator::new("2014");
/// assert_eq!(agg.fold_row(2, &Row::new("North", "A1", "0", "05/06/10", "156")), RowOutcome::Continue);
/// assert_eq!(agg.fold_row(3, &Row::new("South", "A1", "0", "01/06/10", "152")), RowOutcome::Continue);
///
/// let result = agg.finish()?;
/// let a1 = &result.summaries["A1"];
/// assert_eq!(a1.beach, "South");
/// assert_eq!(a1.slot(0).map(|s| s.julian.as_str()), Some("152"));
/// # Ok::<(), sighting_fold::FatalRowError>(())
/// ```
pub struct Aggregator {
    sheet: String,
    summaries: SummaryMap,
    state: RunState,
    stats: FoldStats,
}

impl Aggregator {
    pub fn new(sheet: &str) -> Aggregator {
        Aggregator {
            sheet: sheet.to_string(),
            summaries: SummaryMap::new(),
            state: RunState::Running,
            stats: FoldStats::default(),
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.state, RunState::Aborted(_))
    }

    /// Folds one row.
    ///
    /// Arguments:
    /// * `row_number` the 1-based position of the row in the sheet, used in error messages
    /// * `row` the cells of the row
    pub fn fold_row(&mut self, row_number: usize, row: &Row) -> RowOutcome {
        if let RunState::Aborted(err) = &self.state {
            return RowOutcome::Abort(err.clone());
        }
        match check_row(&self.sheet, row_number, row) {
            Ok(checked) => {
                self.merge(&checked);
                self.stats.rows_folded += 1;
                RowOutcome::Continue
            }
            Err(Rejection::Missing(field)) => {
                debug!(
                    "fold_row: sheet {:?} row {}: missing {} cell, row skipped",
                    self.sheet, row_number, field
                );
                self.stats.rows_skipped += 1;
                RowOutcome::Skip(field)
            }
            Err(Rejection::Fatal(err)) => {
                debug!("fold_row: aborting: {}", err);
                self.state = RunState::Aborted(err.clone());
                RowOutcome::Abort(err)
            }
        }
    }

    fn merge(&mut self, row: &CheckedRow) {
        let summary = self
            .summaries
            .entry(row.subject_id.to_string())
            .or_insert_with(|| {
                debug!("merge: new subject {:?}", row.subject_id);
                SubjectSummary::new(row.beach.to_string(), row.colour_code.to_string())
            });
        summary.beach = row.beach.to_string();
        summary.colour_code = row.colour_code.to_string();

        if let Some((age_class, sighting)) = &row.sighting {
            let slot = &mut summary.age_slots[*age_class];
            let replace = match slot.as_ref() {
                None => {
                    self.stats.slots_filled += 1;
                    true
                }
                // Only a strictly earlier date replaces the stored one.
                Some(current) if current.date > sighting.date => {
                    debug!(
                        "merge: subject {:?} class {}: {} replaces {}",
                        row.subject_id, age_class, sighting.date, current.date
                    );
                    self.stats.slots_replaced += 1;
                    true
                }
                Some(_) => false,
            };
            if replace {
                *slot = Some(sighting.clone());
            }
        }
    }

    /// Ends the run. Returns the summaries, or the error that aborted the run.
    pub fn finish(self) -> Result<Aggregation, FatalRowError> {
        match self.state {
            RunState::Aborted(err) => Err(err),
            RunState::Running => {
                debug!(
                    "finish: sheet {:?}: {} subjects, {:?}",
                    self.sheet,
                    self.summaries.len(),
                    self.stats
                );
                Ok(Aggregation {
                    sheet: self.sheet,
                    summaries: self.summaries,
                    stats: self.stats,
                })
            }
        }
    }
}

fn check_row<'a>(
    sheet: &str,
    row_number: usize,
    row: &'a Row,
) -> Result<CheckedRow<'a>, Rejection> {
    // A blank id names no subject. The other blank cells are values.
    let subject_id = row
        .subject_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or(Rejection::Missing(RowField::SubjectId))?;
    let beach = row
        .beach
        .as_deref()
        .ok_or(Rejection::Missing(RowField::Beach))?;
    let age_class_raw = row
        .age_class
        .as_deref()
        .ok_or(Rejection::Missing(RowField::AgeClass))?;
    let colour_code = row.colour_code.as_deref().unwrap_or(NO_FILL_COLOUR);

    let age_class = sanitize_age_class(age_class_raw);
    if age_class >= AGE_CLASS_COUNT as i32 {
        return Err(Rejection::Fatal(FatalRowError::AgeClassOutOfRange {
            sheet: sheet.to_string(),
            row_number,
            age_class: age_class as u32,
            raw: age_class_raw.to_string(),
        }));
    }

    // The date is only needed when the row fills a slot.
    let sighting = if age_class == NO_AGE_CLASS {
        None
    } else {
        let date_raw = row
            .date
            .as_deref()
            .ok_or(Rejection::Missing(RowField::Date))?;
        let date = parse_date(date_raw).map_err(|error| {
            Rejection::Fatal(FatalRowError::DateFormat {
                sheet: sheet.to_string(),
                row_number,
                error,
            })
        })?;
        let julian = row.julian.clone().unwrap_or_default();
        Some((age_class as usize, Sighting { date, julian }))
    };

    Ok(CheckedRow {
        subject_id,
        beach,
        colour_code,
        sighting,
    })
}

/// Folds a whole sequence of rows.
///
/// Arguments:
/// * `sheet` the name of the sheet the rows come from
/// * `rows` the rows with their 1-based row number, in sheet order
pub fn aggregate_rows<I>(sheet: &str, rows: I) -> Result<Aggregation, FatalRowError>
where
    I: IntoIterator<Item = (usize, Row)>,
{
    let mut agg = Aggregator::new(sheet);
    for (row_number, row) in rows {
        if let RowOutcome::Abort(err) = agg.fold_row(row_number, &row) {
            return Err(err);
        }
    }
    agg.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn numbered(rows: Vec<Row>) -> Vec<(usize, Row)> {
        // The header is on row 1.
        rows.into_iter()
            .enumerate()
            .map(|(idx, r)| (idx + 2, r))
            .collect()
    }

    fn run(rows: Vec<Row>) -> Result<Aggregation, FatalRowError> {
        aggregate_rows("Sheet1", numbered(rows))
    }

    #[test]
    fn earliest_date_per_class() {
        init();
        let res = run(vec![
            Row::new("North", "A1", "0", "05/06/10", "156"),
            Row::new("North", "A1", "0", "01/06/10", "152"),
            Row::new("North", "A1", "1", "10/06/10", "161"),
        ])
        .unwrap();
        assert_eq!(res.summaries.len(), 1);
        let a1 = &res.summaries["A1"];
        assert_eq!(
            a1.slot(0),
            Some(&Sighting {
                date: ymd(2010, 6, 1),
                julian: "152".to_string()
            })
        );
        assert_eq!(a1.slot(1).map(|s| s.date), Some(ymd(2010, 6, 10)));
        for c in 2..AGE_CLASS_COUNT {
            assert_eq!(a1.slot(c), None);
        }
        assert_eq!(res.stats.rows_folded, 3);
        assert_eq!(res.stats.slots_filled, 2);
        assert_eq!(res.stats.slots_replaced, 1);
    }

    #[test]
    fn ties_keep_first_row() {
        init();
        let res = run(vec![
            Row::new("North", "A1", "2", "05/06/10", "first"),
            Row::new("North", "A1", "2", "05/06/10", "second"),
            Row::new("North", "A1", "2", "07/06/10", "third"),
        ])
        .unwrap();
        assert_eq!(
            res.summaries["A1"].slot(2).map(|s| s.julian.as_str()),
            Some("first")
        );
        assert_eq!(res.stats.slots_replaced, 0);
    }

    #[test]
    fn last_row_sets_beach_and_colour() {
        init();
        let res = run(vec![
            Row::new("North", "A1", "0", "01/06/10", "152").with_colour("10"),
            // Later date: the slot stays, the beach and colour still move.
            Row::new("South", "A1", "0", "09/06/10", "160").with_colour("12"),
            Row::new("East", "B2", "3", "02/06/10", "153"),
        ])
        .unwrap();
        let a1 = &res.summaries["A1"];
        assert_eq!(a1.beach, "South");
        assert_eq!(a1.colour_code, "12");
        assert_eq!(a1.slot(0).map(|s| s.date), Some(ymd(2010, 6, 1)));
        assert_eq!(res.summaries["B2"].colour_code, NO_FILL_COLOUR);
    }

    #[test]
    fn rows_without_age_class_only_move_beach() {
        init();
        let res = run(vec![
            Row::new("North", "A1", "1", "01/06/10", "152"),
            // No date needed: an unusable age class never touches a slot.
            Row::new("West", "A1", "unknown", "not a date", ""),
        ])
        .unwrap();
        let a1 = &res.summaries["A1"];
        assert_eq!(a1.beach, "West");
        assert_eq!(a1.slot(1).map(|s| s.date), Some(ymd(2010, 6, 1)));

        let res = run(vec![Row::new("West", "C3", "", "", "")]).unwrap();
        let c3 = &res.summaries["C3"];
        assert_eq!(c3.beach, "West");
        assert!(c3.age_slots.iter().all(|s| s.is_none()));
    }

    #[test]
    fn absent_cells_skip_the_row() {
        init();
        let mut no_id = Row::new("North", "", "0", "01/06/10", "152");
        no_id.subject_id = None;
        let mut no_age = Row::new("South", "A1", "", "01/06/10", "152");
        no_age.age_class = None;
        let mut no_date = Row::new("South", "A1", "1", "", "152");
        no_date.date = None;
        let mut no_julian = Row::new("East", "A1", "2", "03/06/10", "");
        no_julian.julian = None;

        let mut agg = Aggregator::new("Sheet1");
        assert_eq!(
            agg.fold_row(2, &Row::new("North", "A1", "0", "02/06/10", "153")),
            RowOutcome::Continue
        );
        assert_eq!(agg.fold_row(3, &no_id), RowOutcome::Skip(RowField::SubjectId));
        assert_eq!(agg.fold_row(4, &no_age), RowOutcome::Skip(RowField::AgeClass));
        assert_eq!(agg.fold_row(5, &no_date), RowOutcome::Skip(RowField::Date));
        assert_eq!(agg.fold_row(6, &no_julian), RowOutcome::Continue);
        assert!(!agg.is_aborted());

        let res = agg.finish().unwrap();
        let a1 = &res.summaries["A1"];
        assert_eq!(a1.beach, "East");
        assert_eq!(a1.slot(1), None);
        assert_eq!(a1.slot(2).map(|s| s.julian.as_str()), Some(""));
        assert_eq!(res.stats.rows_skipped, 3);
        assert_eq!(res.stats.rows_folded, 2);
    }

    #[test]
    fn blank_cells_are_values() {
        init();
        let res = run(vec![
            Row::new("North", "7", "0", "01/06/12", "153"),
            // Blank age class: no slot, but the beach moves.
            Row::new("South", "7", "", "05/06/12", "157"),
            // Blank beach: the subject is kept.
            Row::new("", "9", "0", "01/06/12", "153"),
            // Blank id: nothing to attach the row to.
            Row::new("East", " ", "0", "01/06/12", "153"),
        ])
        .unwrap();
        let ids: Vec<&String> = res.summaries.keys().collect();
        assert_eq!(ids, vec!["7", "9"]);
        let s7 = &res.summaries["7"];
        assert_eq!(s7.beach, "South");
        assert_eq!(s7.slot(0).map(|s| s.date), Some(ymd(2012, 6, 1)));
        assert_eq!(res.summaries["9"].beach, "");
        assert_eq!(res.stats.rows_skipped, 1);
    }

    #[test]
    fn blank_date_with_age_class_aborts() {
        init();
        let err = run(vec![
            Row::new("North", "7", "0", "01/06/12", "153"),
            Row::new("North", "7", "0", "", "153"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            FatalRowError::DateFormat {
                sheet: "Sheet1".to_string(),
                row_number: 3,
                error: DateFormatError::Pattern("".to_string()),
            }
        );
    }

    #[test]
    fn age_class_above_five_aborts() {
        init();
        let mut agg = Aggregator::new("Sheet1");
        agg.fold_row(2, &Row::new("North", "A1", "0", "01/06/10", "152"));
        let outcome = agg.fold_row(3, &Row::new("North", "A2", "6", "01/06/10", "152"));
        let expected = FatalRowError::AgeClassOutOfRange {
            sheet: "Sheet1".to_string(),
            row_number: 3,
            age_class: 6,
            raw: "6".to_string(),
        };
        assert_eq!(outcome, RowOutcome::Abort(expected.clone()));
        assert!(agg.is_aborted());

        // Nothing is folded any more.
        assert_eq!(
            agg.fold_row(4, &Row::new("North", "A3", "1", "01/06/10", "152")),
            RowOutcome::Abort(expected.clone())
        );
        assert_eq!(agg.finish(), Err(expected));
    }

    #[test]
    fn age_class_is_checked_before_date() {
        init();
        let err = run(vec![Row::new("North", "A1", "7B", "garbage", "")]).unwrap_err();
        assert!(matches!(
            err,
            FatalRowError::AgeClassOutOfRange { age_class: 7, .. }
        ));
        let msg = err.to_string();
        assert!(msg.contains("\"Sheet1\""), "{}", msg);
        assert!(msg.contains("row 2"), "{}", msg);
        assert!(msg.contains("age class column"), "{}", msg);
    }

    #[test]
    fn malformed_date_aborts() {
        init();
        let err = run(vec![
            Row::new("North", "A1", "0", "01/06/10", "152"),
            Row::new("North", "A1", "1", "2010-06-01", "152"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            FatalRowError::DateFormat {
                sheet: "Sheet1".to_string(),
                row_number: 3,
                error: DateFormatError::Pattern("2010-06-01".to_string()),
            }
        );
        assert_eq!(err.sheet(), "Sheet1");
        assert_eq!(err.row_number(), 3);
        assert!(err.to_string().contains("date column"));
    }

    #[test]
    fn century_is_corrected_before_comparing() {
        init();
        let res = run(vec![
            Row::new("North", "A1", "0", "01/01/20", "1"),
            // 1998 once corrected: earlier than 2020.
            Row::new("North", "A1", "0", "01/01/98", "1"),
        ])
        .unwrap();
        assert_eq!(
            res.summaries["A1"].slot(0).map(|s| s.date),
            Some(ymd(1998, 1, 1))
        );
    }

    #[test]
    fn rerun_gives_same_summaries() {
        init();
        let rows = vec![
            Row::new("North", "A1", "0", "05/06/10", "156"),
            Row::new("South", "B1", "4", "01/06/11", "152"),
            Row::new("North", "A1", "0", "01/06/10", "152"),
            Row::new("East", "B1", "4", "01/05/11", "121"),
            Row::new("East", "C1", "x", "", ""),
        ];
        let first = run(rows.clone()).unwrap();
        let second = run(rows).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn slot_holds_minimum_of_all_dates() {
        init();
        let days = [17u32, 3, 25, 9, 3, 30, 12];
        let rows: Vec<Row> = days
            .iter()
            .map(|d| Row::new("North", "A1", "5", &format!("{:02}/07/12", d), &d.to_string()))
            .collect();
        let res = run(rows).unwrap();
        let slot = res.summaries["A1"].slot(5).unwrap();
        assert_eq!(slot.date, ymd(2012, 7, 3));
        // The first of the two rows with the minimum date.
        assert_eq!(slot.julian, "3");
    }
}
