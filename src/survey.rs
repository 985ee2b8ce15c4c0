use log::{debug, error, info, warn};

use sighting_fold::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use crate::args::Args;
use crate::survey::config_reader::*;
pub use crate::survey::report::{Reporter, StderrReporter};

mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod io_json;
mod report;

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("Error reading sheet {sheet:?}"))]
    ReadingSheet {
        source: calamine::Error,
        sheet: String,
    },
    #[snafu(display("Sheet {sheet:?} not found in {path}"))]
    MissingSheet { sheet: String, path: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error writing table to {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Field {field} should be a column index, found {value}"))]
    ParsingJsonNumber { field: String, value: String },
    #[snafu(display("Error writing to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid {option}: {value:?}"))]
    InvalidOption { option: String, value: String },
    #[snafu(display("No input file: pass one on the command line or in the configuration"))]
    MissingInput {},
    #[snafu(display("Processing stopped in sheet {sheet:?}"))]
    Aborted {
        sheet: String,
        source: FatalRowError,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;

/// The content of one cell, as read from the input.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct CellValue {
    /// None for empty or blank cells.
    pub text: Option<String>,
    /// The background colour, as a palette index, when the reader knows it.
    pub fill: Option<u16>,
}

/// Where the survey rows come from.
pub trait RowSource {
    fn sheet_names(&self) -> Vec<String>;

    /// All the cells of one column of a sheet, from the first row.
    fn column(&mut self, sheet: &str, column_index: usize) -> SurveyResult<Vec<CellValue>>;
}

/// Where the result tables go.
pub trait TableSink {
    fn write_table(&mut self, sheet: &str, table: &OrderedTable) -> SurveyResult<()>;
}

#[derive(PartialEq, Debug, Clone)]
pub enum SheetOutcome {
    Projected { table: OrderedTable, stats: FoldStats },
    Aborted(FatalRowError),
}

/// The sheets that produced a table, and the ones abandoned after a fatal row error.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RunSummary {
    pub written: Vec<String>,
    pub aborted: Vec<String>,
}

fn read_rows(
    source: &mut dyn RowSource,
    sheet: &str,
    layout: &SheetLayout,
) -> SurveyResult<Vec<(usize, Row)>> {
    let beaches = source.column(sheet, layout.beach_column)?;
    let ids = source.column(sheet, layout.id_column)?;
    let dates = source.column(sheet, layout.date_column)?;
    let julians = source.column(sheet, layout.julian_column)?;
    let age_classes = source.column(sheet, layout.age_class_column)?;
    let colours = match layout.colour_column {
        Some(idx) => source.column(sheet, idx)?,
        None => Vec::new(),
    };

    let num_rows = [&beaches, &ids, &dates, &julians, &age_classes]
        .iter()
        .map(|c| c.len())
        .max()
        .unwrap_or(0);
    let text = |col: &[CellValue], idx: usize| col.get(idx).and_then(|c| c.text.clone());

    let mut rows: Vec<(usize, Row)> = Vec::new();
    for idx in layout.first_data_row..num_rows {
        let id_fill = ids.get(idx).and_then(|c| c.fill);
        let colour_code = id_fill
            .or_else(|| {
                colours
                    .get(idx)
                    .and_then(|c| c.text.as_deref())
                    .and_then(io_common::parse_colour_code)
            })
            .map(|code| code.to_string());
        let row = Row {
            beach: text(&beaches, idx),
            subject_id: text(&ids, idx),
            colour_code,
            age_class: text(&age_classes, idx),
            date: text(&dates, idx),
            julian: text(&julians, idx),
        };
        // Row numbers start at 1, as displayed by spreadsheet programs.
        rows.push((idx + 1, row));
    }
    debug!("read_rows: sheet {:?}: {} rows", sheet, rows.len());
    Ok(rows)
}

/// Aggregates and projects one sheet. A fatal row error is reported and ends the sheet.
pub fn process_sheet(
    source: &mut dyn RowSource,
    sheet: &str,
    layout: &SheetLayout,
    reporter: &dyn Reporter,
) -> SurveyResult<SheetOutcome> {
    info!("Processing sheet {:?}", sheet);
    let rows = read_rows(source, sheet, layout)?;
    match aggregate_rows(sheet, rows) {
        Ok(aggregation) => {
            debug!(
                "process_sheet: sheet {:?}: {} subjects",
                sheet,
                aggregation.summaries.len()
            );
            let table = project(&aggregation.summaries);
            Ok(SheetOutcome::Projected {
                table,
                stats: aggregation.stats,
            })
        }
        Err(err) => {
            error!("Sheet {:?} abandoned: {}", sheet, err);
            reporter.report(&err.to_string());
            Ok(SheetOutcome::Aborted(err))
        }
    }
}

fn selected_sheets(source: &dyn RowSource, settings: &SurveySettings) -> SurveyResult<Vec<String>> {
    let available = source.sheet_names();
    if settings.sheets.is_empty() {
        return Ok(available);
    }
    for sheet in settings.sheets.iter() {
        ensure!(
            available.contains(sheet),
            MissingSheetSnafu {
                sheet,
                path: &settings.input
            }
        );
    }
    Ok(settings.sheets.clone())
}

/// Runs all the selected sheets of a source into a sink.
pub fn run_with_source(
    source: &mut dyn RowSource,
    settings: &SurveySettings,
    sink: &mut dyn TableSink,
    reporter: &dyn Reporter,
) -> SurveyResult<RunSummary> {
    let sheets = selected_sheets(source, settings)?;
    debug!("run_with_source: sheets: {:?}", sheets);
    let mut summary = RunSummary::default();
    let mut tables = Vec::new();
    for sheet in sheets {
        match process_sheet(source, &sheet, &settings.layout, reporter)? {
            SheetOutcome::Projected { table, stats } => {
                info!(
                    "Sheet {:?}: {} rows folded, {} rows skipped, {} slots filled, {} slots replaced",
                    sheet,
                    stats.rows_folded,
                    stats.rows_skipped,
                    stats.slots_filled,
                    stats.slots_replaced
                );
                sink.write_table(&sheet, &table)?;
                tables.push(io_json::table_to_json(&sheet, &table));
                summary.written.push(sheet);
            }
            SheetOutcome::Aborted(err) => match settings.abort_scope {
                AbortScope::ProcessWide => {
                    return Err(err).context(AbortedSnafu { sheet });
                }
                AbortScope::PerSheet => {
                    warn!("Skipping sheet {:?}, going on with the next sheet", sheet);
                    summary.aborted.push(sheet);
                }
            },
        }
    }
    if let Some(reference_path) = &settings.reference {
        io_json::check_reference(reference_path, &tables)?;
    }
    Ok(summary)
}

fn open_source(settings: &SurveySettings) -> SurveyResult<Box<dyn RowSource>> {
    let source: Box<dyn RowSource> = match settings.input_type {
        InputType::Excel => Box::new(io_excel::ExcelSource::open(&settings.input)?),
        InputType::Csv => Box::new(io_csv::CsvSource::open(&settings.input)?),
    };
    Ok(source)
}

fn open_sink(settings: &SurveySettings) -> SurveyResult<Box<dyn TableSink>> {
    if let OutputTarget::Directory(dir) = &settings.output {
        fs::create_dir_all(dir).context(WritingOutputSnafu {
            path: dir.display().to_string(),
        })?;
    }
    let target = settings.output.clone();
    let sink: Box<dyn TableSink> = match settings.output_format {
        OutputFormat::Csv => Box::new(io_csv::CsvSink { target }),
        OutputFormat::Json => Box::new(io_json::JsonSink { target }),
    };
    Ok(sink)
}

pub fn run_survey(settings: &SurveySettings, reporter: &dyn Reporter) -> SurveyResult<RunSummary> {
    info!("Running survey {:?}", settings.input);
    let mut source = match open_source(settings).and_then(|source| {
        selected_sheets(source.as_ref(), settings)?;
        Ok(source)
    }) {
        Ok(source) => source,
        Err(err) => {
            reporter.report(&format!("Cannot read the survey: {}", err));
            return Err(err);
        }
    };
    let mut sink = open_sink(settings)?;
    run_with_source(source.as_mut(), settings, sink.as_mut(), reporter)
}

pub fn list_sheets(settings: &SurveySettings) -> SurveyResult<Vec<String>> {
    let source = open_source(settings)?;
    Ok(source.sheet_names())
}

pub fn run_from_args(args: &Args, reporter: &dyn Reporter) -> SurveyResult<RunSummary> {
    let settings = build_settings(args)?;
    debug!("run_from_args: settings: {:?}", settings);
    if args.list_sheets {
        for name in list_sheets(&settings)? {
            println!("{}", name);
        }
        return Ok(RunSummary::default());
    }
    run_survey(&settings, reporter)
}
