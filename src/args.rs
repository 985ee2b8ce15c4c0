use clap::Parser;

/// Summarises beach survey spreadsheets: for every pup, the earliest sighting in each age class.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The survey workbook. Overrides the input file of the --config option.
    #[clap(value_parser)]
    pub input: Option<String>,

    /// (sheet names, optional) The sheets to process. All the sheets of the workbook are processed
    /// if none is given.
    #[clap(value_parser)]
    pub sheets: Vec<String>,

    /// (file path, optional) A JSON file describing the layout of the survey.
    /// For more information about the file format, read the manual of the sighting_fold crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (directory path or 'stdout') Where to write the result tables. Defaults to the current
    /// directory, or the output directory of the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (default csv) The format of the result tables: csv or json.
    #[clap(long, value_parser)]
    pub output_format: Option<String>,

    /// (default excel) The type of the input: excel or csv.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default 1) The 0-based index of the first row holding data. The rows above are headers.
    #[clap(long, value_parser)]
    pub first_row_index: Option<usize>,

    /// (default sheet) What an invalid age class or date stops: 'sheet' abandons the sheet
    /// and goes on with the next one, 'process' stops the program.
    #[clap(long, value_parser)]
    pub abort_scope: Option<String>,

    /// (file path) A reference file containing the expected result tables in JSON format. If provided,
    /// the computed tables are checked against it.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, prints the names of the sheets of the input and exits.
    #[clap(long, takes_value = false)]
    pub list_sheets: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard error.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
