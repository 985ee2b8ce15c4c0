// Result tables in JSON, for people and for checking against reference results.

use serde_json::json;
use serde_json::Value as JSValue;
use sighting_fold::palette::Fill;
use text_diff::print_diff;

use crate::survey::{io_common::output_file_name, *};

fn cell_to_json(cell: &CellContent) -> JSValue {
    match cell {
        CellContent::Text(s) => json!(s),
        CellContent::Number(x) if x.fract() == 0.0 && x.abs() < 1e15 => json!(*x as i64),
        CellContent::Number(x) => json!(x),
        CellContent::Blank => json!(""),
    }
}

fn fill_to_json(fill: &Fill) -> JSValue {
    match fill {
        Fill::NoFill => JSValue::Null,
        Fill::Solid(c) => json!({"index": c.index, "name": c.name, "rgb": c.hex()}),
    }
}

pub fn table_to_json(sheet: &str, table: &OrderedTable) -> JSValue {
    let rows: Vec<JSValue> = table
        .rows
        .iter()
        .map(|row| {
            let cells: Vec<JSValue> = row.cells.iter().map(cell_to_json).collect();
            json!({
                "cells": cells,
                "idFill": fill_to_json(&row.id_fill),
                "idBorder": {"style": "thin", "colour": "grey 25%"}
            })
        })
        .collect();
    json!({"sheet": sheet, "header": table.header, "rows": rows})
}

/// Writes each table as `<sheet>_result.json`.
pub struct JsonSink {
    pub target: OutputTarget,
}

impl TableSink for JsonSink {
    fn write_table(&mut self, sheet: &str, table: &OrderedTable) -> SurveyResult<()> {
        let js = table_to_json(sheet, table);
        let pretty_js = serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})?;
        match &self.target {
            OutputTarget::Stdout => {
                println!("{}", pretty_js);
            }
            OutputTarget::Directory(dir) => {
                let p = dir.join(output_file_name(sheet, "json"));
                let path = p.display().to_string();
                info!("Writing sheet {:?} to {:?}", sheet, path);
                fs::write(&p, pretty_js).context(WritingOutputSnafu { path })?;
            }
        }
        Ok(())
    }
}

/// Reads the expected tables. The file holds either one table or a list of tables.
pub fn read_reference(path: &str) -> SurveyResult<Vec<JSValue>> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    match js {
        JSValue::Array(tables) => Ok(tables),
        table @ JSValue::Object(_) => Ok(vec![table]),
        x => whatever!("Reference file {} should hold a table or a list of tables, found {}", path, x),
    }
}

/// Checks the computed tables against a reference file. The differences are printed.
pub fn check_reference(path: &str, tables: &[JSValue]) -> SurveyResult<()> {
    let reference = read_reference(path)?;
    let pretty_js_reference =
        serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
    let pretty_js_tables = serde_json::to_string_pretty(tables).context(ParsingJsonSnafu {})?;
    if pretty_js_reference != pretty_js_tables {
        warn!("Found differences with the reference tables");
        print_diff(
            pretty_js_reference.as_str(),
            pretty_js_tables.as_str(),
            "\n",
        );
        whatever!("Difference detected between calculated tables and reference tables")
    }
    info!("Tables match the reference {:?}", path);
    Ok(())
}
