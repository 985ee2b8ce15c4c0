use crate::args::Args;
use crate::survey::{io_common::column_letters_to_index, *};

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

/// The layout of a survey, as written in a JSON configuration file.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(rename = "inputFile")]
    pub input_file: Option<String>,
    #[serde(rename = "inputType")]
    pub input_type: Option<String>,
    pub sheets: Option<Vec<String>>,
    #[serde(rename = "firstDataRowIndex")]
    pub first_data_row_index: Option<JSValue>,
    #[serde(rename = "beachColumnIndex")]
    pub beach_column_index: Option<JSValue>,
    #[serde(rename = "idColumnIndex")]
    pub id_column_index: Option<JSValue>,
    #[serde(rename = "dateColumnIndex")]
    pub date_column_index: Option<JSValue>,
    #[serde(rename = "julianColumnIndex")]
    pub julian_column_index: Option<JSValue>,
    #[serde(rename = "ageClassColumnIndex")]
    pub age_class_column_index: Option<JSValue>,
    #[serde(rename = "colourColumnIndex")]
    pub colour_column_index: Option<JSValue>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "outputFormat")]
    pub output_format: Option<String>,
    #[serde(rename = "abortScope")]
    pub abort_scope: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Excel,
    Csv,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum OutputFormat {
    Csv,
    Json,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum OutputTarget {
    Stdout,
    Directory(PathBuf),
}

/// Where each field of a row is found. Indexes are 0-based.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SheetLayout {
    pub first_data_row: usize,
    pub beach_column: usize,
    pub id_column: usize,
    pub date_column: usize,
    pub julian_column: usize,
    pub age_class_column: usize,
    pub colour_column: Option<usize>,
}

impl Default for SheetLayout {
    fn default() -> Self {
        SheetLayout {
            first_data_row: 1,
            beach_column: 0,
            id_column: 1,
            date_column: 2,
            julian_column: 3,
            age_class_column: 4,
            colour_column: None,
        }
    }
}

/// Everything needed to run the program, once the command line and the configuration file
/// have been merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SurveySettings {
    pub input: String,
    pub input_type: InputType,
    /// Empty means all the sheets.
    pub sheets: Vec<String>,
    pub layout: SheetLayout,
    pub output: OutputTarget,
    pub output_format: OutputFormat,
    pub abort_scope: AbortScope,
    pub reference: Option<String>,
}

pub fn read_config(path: &str) -> SurveyResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_config: {:?}", contents);
    let config: SurveyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

/// Merges the command line with the configuration file, if any. The command line wins.
pub fn build_settings(args: &Args) -> SurveyResult<SurveySettings> {
    let (config, root_p) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            info!("config: {:?}", config);
            let root_p = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root_p)
        }
        None => (SurveyConfig::default(), PathBuf::new()),
    };

    let input = match (&args.input, &config.input_file) {
        (Some(input), _) => input.clone(),
        (None, Some(input_file)) => root_p.join(input_file).display().to_string(),
        (None, None) => return MissingInputSnafu {}.fail(),
    };

    let input_type = match args.input_type.as_ref().or(config.input_type.as_ref()) {
        Some(s) => parse_input_type(s)?,
        None => guess_input_type(&input),
    };

    let sheets = if args.sheets.is_empty() {
        config.sheets.clone().unwrap_or_default()
    } else {
        args.sheets.clone()
    };

    let defaults = SheetLayout::default();
    let layout = SheetLayout {
        first_data_row: match args.first_row_index {
            Some(x) => x,
            None => read_js_int_or(
                &config.first_data_row_index,
                "firstDataRowIndex",
                defaults.first_data_row,
            )?,
        },
        beach_column: read_js_int_or(
            &config.beach_column_index,
            "beachColumnIndex",
            defaults.beach_column,
        )?,
        id_column: read_js_int_or(&config.id_column_index, "idColumnIndex", defaults.id_column)?,
        date_column: read_js_int_or(
            &config.date_column_index,
            "dateColumnIndex",
            defaults.date_column,
        )?,
        julian_column: read_js_int_or(
            &config.julian_column_index,
            "julianColumnIndex",
            defaults.julian_column,
        )?,
        age_class_column: read_js_int_or(
            &config.age_class_column_index,
            "ageClassColumnIndex",
            defaults.age_class_column,
        )?,
        colour_column: match &config.colour_column_index {
            Some(_) => Some(read_js_int(&config.colour_column_index, "colourColumnIndex")?),
            None => None,
        },
    };

    let output = match (&args.out, &config.output_directory) {
        (Some(out), _) => parse_output_target(out, &PathBuf::new()),
        (None, Some(out)) => parse_output_target(out, &root_p),
        (None, None) => OutputTarget::Directory(PathBuf::from(".")),
    };

    let output_format = match args.output_format.as_ref().or(config.output_format.as_ref()) {
        Some(s) => parse_output_format(s)?,
        None => OutputFormat::Csv,
    };

    let abort_scope = match args.abort_scope.as_ref().or(config.abort_scope.as_ref()) {
        Some(s) => parse_abort_scope(s)?,
        None => AbortScope::default(),
    };

    Ok(SurveySettings {
        input,
        input_type,
        sheets,
        layout,
        output,
        output_format,
        abort_scope,
        reference: args.reference.clone(),
    })
}

fn guess_input_type(path: &str) -> InputType {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => InputType::Csv,
        _ => InputType::Excel,
    }
}

fn parse_input_type(s: &str) -> SurveyResult<InputType> {
    match s {
        "excel" => Ok(InputType::Excel),
        "csv" => Ok(InputType::Csv),
        _ => InvalidOptionSnafu {
            option: "input type",
            value: s,
        }
        .fail(),
    }
}

fn parse_output_format(s: &str) -> SurveyResult<OutputFormat> {
    match s {
        "csv" => Ok(OutputFormat::Csv),
        "json" => Ok(OutputFormat::Json),
        _ => InvalidOptionSnafu {
            option: "output format",
            value: s,
        }
        .fail(),
    }
}

fn parse_abort_scope(s: &str) -> SurveyResult<AbortScope> {
    match s {
        "sheet" | "per-sheet" => Ok(AbortScope::PerSheet),
        "process" | "process-wide" => Ok(AbortScope::ProcessWide),
        _ => InvalidOptionSnafu {
            option: "abort scope",
            value: s,
        }
        .fail(),
    }
}

fn parse_output_target(s: &str, root_p: &Path) -> OutputTarget {
    if s == "stdout" {
        OutputTarget::Stdout
    } else {
        OutputTarget::Directory(root_p.join(s))
    }
}

fn read_js_int_or(x: &Option<JSValue>, field: &str, default: usize) -> SurveyResult<usize> {
    match x {
        None | Some(JSValue::Null) => Ok(default),
        Some(_) => read_js_int(x, field),
    }
}

fn read_js_int(x: &Option<JSValue>, field: &str) -> SurveyResult<usize> {
    let parsed = match x {
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize),
        // Parsing the Excel-style columns
        Some(JSValue::String(s)) if s.chars().all(|c| c.is_ascii_alphabetic()) => {
            column_letters_to_index(s)
        }
        Some(JSValue::String(s)) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    parsed.context(ParsingJsonNumberSnafu {
        field,
        value: format!("{:?}", x),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;

    #[test]
    fn js_ints() {
        assert_eq!(read_js_int(&Some(json!(3)), "f").unwrap(), 3);
        assert_eq!(read_js_int(&Some(json!("4")), "f").unwrap(), 4);
        assert_eq!(read_js_int(&Some(json!("E")), "f").unwrap(), 4);
        assert_eq!(read_js_int(&Some(json!("AA")), "f").unwrap(), 26);
        assert!(read_js_int(&Some(json!(-1)), "f").is_err());
        assert!(read_js_int(&Some(json!("A1")), "f").is_err());
        assert!(read_js_int(&None, "f").is_err());
        assert_eq!(read_js_int_or(&None, "f", 7).unwrap(), 7);
    }

    #[test]
    fn defaults_from_command_line() {
        let args = Args::parse_from(["survey_processor", "survey.xls", "2013", "2014"]);
        let settings = build_settings(&args).unwrap();
        assert_eq!(settings.input, "survey.xls");
        assert_eq!(settings.input_type, InputType::Excel);
        assert_eq!(settings.sheets, vec!["2013".to_string(), "2014".to_string()]);
        assert_eq!(settings.layout, SheetLayout::default());
        assert_eq!(settings.output, OutputTarget::Directory(PathBuf::from(".")));
        assert_eq!(settings.output_format, OutputFormat::Csv);
        assert_eq!(settings.abort_scope, AbortScope::PerSheet);
    }

    #[test]
    fn command_line_options() {
        let args = Args::parse_from([
            "survey_processor",
            "season.CSV",
            "--abort-scope",
            "process",
            "--output-format",
            "json",
            "--out",
            "stdout",
            "--first-row-index",
            "3",
        ]);
        let settings = build_settings(&args).unwrap();
        assert_eq!(settings.input_type, InputType::Csv);
        assert_eq!(settings.abort_scope, AbortScope::ProcessWide);
        assert_eq!(settings.output_format, OutputFormat::Json);
        assert_eq!(settings.output, OutputTarget::Stdout);
        assert_eq!(settings.layout.first_data_row, 3);
        assert!(settings.sheets.is_empty());

        let args = Args::parse_from(["survey_processor", "a.xls", "--abort-scope", "sometimes"]);
        assert!(matches!(
            build_settings(&args),
            Err(SurveyError::InvalidOption { .. })
        ));
    }

    #[test]
    fn missing_input() {
        let args = Args::parse_from(["survey_processor"]);
        assert!(matches!(
            build_settings(&args),
            Err(SurveyError::MissingInput {})
        ));
    }

    #[test]
    fn config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_p = dir.path().join("survey.json");
        fs::write(
            &config_p,
            r#"{
                "inputFile": "survey.xlsx",
                "sheets": ["2014"],
                "firstDataRowIndex": 2,
                "beachColumnIndex": "B",
                "idColumnIndex": 0,
                "dateColumnIndex": "3",
                "colourColumnIndex": "F",
                "outputDirectory": "results",
                "outputFormat": "json",
                "abortScope": "process"
            }"#,
        )
        .unwrap();
        let config_path = config_p.display().to_string();

        let args = Args::parse_from(["survey_processor", "--config", config_path.as_str()]);
        let settings = build_settings(&args).unwrap();
        assert_eq!(
            settings.input,
            dir.path().join("survey.xlsx").display().to_string()
        );
        assert_eq!(settings.sheets, vec!["2014".to_string()]);
        assert_eq!(
            settings.layout,
            SheetLayout {
                first_data_row: 2,
                beach_column: 1,
                id_column: 0,
                date_column: 3,
                julian_column: 3,
                age_class_column: 4,
                colour_column: Some(5),
            }
        );
        assert_eq!(
            settings.output,
            OutputTarget::Directory(dir.path().join("results"))
        );
        assert_eq!(settings.output_format, OutputFormat::Json);
        assert_eq!(settings.abort_scope, AbortScope::ProcessWide);

        // The command line takes precedence.
        let args = Args::parse_from([
            "survey_processor",
            "other.csv",
            "2015",
            "--config",
            config_path.as_str(),
            "--abort-scope",
            "sheet",
        ]);
        let settings = build_settings(&args).unwrap();
        assert_eq!(settings.input, "other.csv");
        assert_eq!(settings.sheets, vec!["2015".to_string()]);
        assert_eq!(settings.abort_scope, AbortScope::PerSheet);
    }
}
