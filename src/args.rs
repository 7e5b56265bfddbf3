use clap::Parser;

/// This is a tabulation program for survey exports: it produces the frequency table of each question.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the survey source and the questions to tabulate.
    /// For more information about the file format, read the documentation of the survey_aggregation crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference summary in JSON format. If provided, surveytab fails when the
    /// tabulated summary differs from it, and prints the differences.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the survey will be written in JSON format to the given
    /// location. Setting this option overrides the output directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, the survey export to read. Setting this option overrides the file that may
    /// be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx, default csv) The type of the input. It is never guessed from the file name.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (repeatable) A single-choice question to tabulate, as written in the header of the input.
    #[clap(long, value_parser)]
    pub single: Option<Vec<String>>,

    /// (repeatable) A multi-choice question to tabulate, with the options separated by ';'.
    #[clap(long, value_parser)]
    pub multi: Option<Vec<String>>,

    /// (default: the first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// Turns on the debug logging (on the standard error). Otherwise RUST_LOG is used.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
