// Reading survey workbooks.

use std::collections::HashMap;

use calamine::{open_workbook_auto, DataType, Range, Reader, Sheets};
use sighting_fold::format_number;

use crate::survey::{io_common::serial_to_survey_date, *};

/// A workbook. Sheets are read the first time one of their columns is requested.
pub struct ExcelSource {
    path: String,
    workbook: Sheets,
    names: Vec<String>,
    ranges: HashMap<String, Range<DataType>>,
}

impl ExcelSource {
    pub fn open(path: &str) -> SurveyResult<ExcelSource> {
        info!("Attempting to read workbook {:?}", path);
        let workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;
        let names: Vec<String> = workbook.sheet_names().to_vec();
        debug!("ExcelSource::open: sheets: {:?}", names);
        Ok(ExcelSource {
            path: path.to_string(),
            workbook,
            names,
            ranges: HashMap::new(),
        })
    }

    fn range(&mut self, sheet: &str) -> SurveyResult<&Range<DataType>> {
        if !self.ranges.contains_key(sheet) {
            let wrange = self
                .workbook
                .worksheet_range(sheet)
                .context(MissingSheetSnafu {
                    sheet,
                    path: &self.path,
                })?
                .context(ReadingSheetSnafu { sheet })?;
            debug!("ExcelSource::range: sheet {:?}: {:?}", sheet, wrange.end());
            self.ranges.insert(sheet.to_string(), wrange);
        }
        self.ranges.get(sheet).context(MissingSheetSnafu {
            sheet,
            path: &self.path,
        })
    }
}

impl RowSource for ExcelSource {
    fn sheet_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn column(&mut self, sheet: &str, column_index: usize) -> SurveyResult<Vec<CellValue>> {
        let wrange = self.range(sheet)?;
        // Positions are absolute: the range may not start at the first row.
        let num_rows = match wrange.end() {
            Some((last_row, _)) => last_row as usize + 1,
            None => 0,
        };
        let col = column_index as u32;
        // Cells inside the range are present, even when empty.
        let cells: Vec<CellValue> = (0..num_rows as u32)
            .map(|row| CellValue {
                text: wrange.get_value((row, col)).map(cell_text),
                // Cell formats are not exposed by the reader.
                fill: None,
            })
            .collect();
        debug!(
            "ExcelSource::column: sheet {:?} column {}: {} cells",
            sheet,
            column_index,
            cells.len()
        );
        Ok(cells)
    }
}

fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) => format_number(*f),
        DataType::Bool(b) => b.to_string(),
        // An out of range serial is kept as a number and fails as a date.
        DataType::DateTime(serial) => {
            serial_to_survey_date(*serial).unwrap_or_else(|| format_number(*serial))
        }
        DataType::Empty => "".to_string(),
        _ => {
            debug!("cell_text: unreadable cell {:?}", cell);
            "".to_string()
        }
    }
}
