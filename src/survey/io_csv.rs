// Primitives for reading and writing CSV files.

use std::io::Write;

use csv::StringRecord;

use crate::survey::{
    io_common::{output_file_name, simplify_file_name},
    *,
};

/// A CSV file, seen as a workbook with a single sheet named after the file.
pub struct CsvSource {
    path: String,
    sheet: String,
    records: Vec<StringRecord>,
}

impl CsvSource {
    pub fn open(path: &str) -> SurveyResult<CsvSource> {
        info!("Attempting to read CSV file {:?}", path);
        let rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .context(CsvOpenSnafu { path })?;
        let mut records: Vec<StringRecord> = Vec::new();
        for (idx, line_r) in rdr.into_records().enumerate() {
            // Line numbers start at 1 to respect most conventions in the spreadsheet world.
            let lineno = idx + 1;
            let line = line_r.context(CsvLineParseSnafu { lineno })?;
            records.push(line);
        }
        debug!("CsvSource::open: {} records", records.len());
        Ok(CsvSource {
            path: path.to_string(),
            sheet: simplify_file_name(path),
            records,
        })
    }
}

impl RowSource for CsvSource {
    fn sheet_names(&self) -> Vec<String> {
        vec![self.sheet.clone()]
    }

    fn column(&mut self, sheet: &str, column_index: usize) -> SurveyResult<Vec<CellValue>> {
        ensure!(
            sheet == self.sheet,
            MissingSheetSnafu {
                sheet,
                path: self.path.clone()
            }
        );
        Ok(self
            .records
            .iter()
            // Short records have no cell past their last field.
            .map(|record| CellValue {
                text: record.get(column_index).map(|s| s.to_string()),
                fill: None,
            })
            .collect())
    }
}

/// Writes each table as `<sheet>_result.csv`. Cell formats are dropped.
pub struct CsvSink {
    pub target: OutputTarget,
}

impl TableSink for CsvSink {
    fn write_table(&mut self, sheet: &str, table: &OrderedTable) -> SurveyResult<()> {
        match &self.target {
            OutputTarget::Stdout => {
                let path = "stdout".to_string();
                let wtr = csv::Writer::from_writer(std::io::stdout());
                write_csv_table(wtr, table, &path)
            }
            OutputTarget::Directory(dir) => {
                let p = dir.join(output_file_name(sheet, "csv"));
                let path = p.display().to_string();
                info!("Writing sheet {:?} to {:?}", sheet, path);
                let wtr = csv::Writer::from_path(&p).context(CsvWriteSnafu { path: &path })?;
                write_csv_table(wtr, table, &path)
            }
        }
    }
}

fn write_csv_table<W: Write>(
    mut wtr: csv::Writer<W>,
    table: &OrderedTable,
    path: &str,
) -> SurveyResult<()> {
    wtr.write_record(&table.header)
        .context(CsvWriteSnafu { path })?;
    for row in table.rows.iter() {
        let cells: Vec<String> = row.cells.iter().map(|c| c.render()).collect();
        wtr.write_record(&cells).context(CsvWriteSnafu { path })?;
    }
    wtr.flush().context(WritingOutputSnafu { path })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_columns_of_uneven_rows() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("season.csv");
        fs::write(
            &p,
            "Beach,Id,Date,Julian,Class\nNorth,1,01/06/10,152,0\nSouth,2\n,3,02/06/10,153,1\n",
        )
        .unwrap();
        let path = p.display().to_string();
        let mut src = CsvSource::open(&path).unwrap();
        assert_eq!(src.sheet_names(), vec!["season".to_string()]);

        let ids = src.column("season", 1).unwrap();
        assert_eq!(ids.len(), 4);
        assert_eq!(ids[1].text.as_deref(), Some("1"));

        // Blank but present.
        let beaches = src.column("season", 0).unwrap();
        assert_eq!(beaches[3].text.as_deref(), Some(""));

        // Past the end of a short record.
        let dates = src.column("season", 2).unwrap();
        assert_eq!(dates[2].text, None);

        assert!(matches!(
            src.column("other", 0),
            Err(SurveyError::MissingSheet { .. })
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            CsvSource::open("/nonexistent/season.csv"),
            Err(SurveyError::CsvOpen { .. })
        ));
    }
}
