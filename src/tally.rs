use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_aggregation::builder::SurveyBuilder;
use survey_aggregation::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::tally::config_reader::*;
use crate::tally::io_common::simplify_file_name;
use crate::tally::palette::ColorMapping;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod palette;

#[derive(Debug, Snafu)]
pub enum TallyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Worksheet {name:?} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("The file {path} has no header row"))]
    EmptyFile { path: String },
    #[snafu(display("Unsupported cell at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Unknown encoding {label:?}"))]
    UnknownEncoding { label: String },
    #[snafu(display("Error parsing the CSV file {path}"))]
    CsvParse { source: csv::Error, path: String },
    #[snafu(display("Error opening the JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Could not find the directory of {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("Provider not implemented: {provider:?}"))]
    UnknownProvider { provider: String },
    #[snafu(display("Question {question:?}: unknown kind {kind:?}"))]
    UnknownQuestionKind { question: String, kind: String },
    #[snafu(display("Question {question:?}: {message}"))]
    InvalidQuestion { question: String, message: String },
    #[snafu(display("Question {question:?}: invalid color {color:?} for label {label:?}"))]
    InvalidColor {
        question: String,
        label: String,
        color: String,
    },
    #[snafu(display("Question {question:?}: no color for label {label:?}"))]
    UnmappedLabel { question: String, label: String },
    #[snafu(display("Error in the survey data"))]
    SurveyData { source: SurveyErrors },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TallyResult<T> = Result<T, TallyError>;

/// The input type when neither the configuration nor --input-type declare one.
const DEFAULT_PROVIDER: &str = "csv";

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
struct OutputConfig {
    survey: String,
    respondents: u64,
    source: String,
}

fn tally_to_json(settings: &QuestionSettings, tally: &QuestionTally) -> TallyResult<JSValue> {
    let palette = match &settings.colors {
        Some(colors) => Some(ColorMapping::from_settings(
            &settings.text,
            colors,
            settings.kind == "combination",
        )?),
        None => None,
    };

    let mut entries: Vec<JSValue> = Vec::new();
    for (label, count) in tally.table.iter() {
        let mut entry = json!({"label": label, "count": count});
        if let Some(width) = settings.wrap_width {
            entry["display"] = json!(wrap_label(label, width).join("<br>"));
        }
        if let Some(p) = &palette {
            entry["color"] = json!(p.color_for(label)?);
        }
        entries.push(entry);
    }

    let mut js = json!({
        "question": tally.question,
        "title": settings.title(),
        "kind": settings.kind,
        "respondents": tally.respondents,
        "answered": tally.answered,
        "tally": entries,
    });
    if !tally.other_responses.is_empty() {
        js["otherResponses"] = json!(tally.other_responses);
    }
    Ok(js)
}

fn build_summary_js(
    config: &SurveyConfig,
    survey: &Survey,
    tallies: &[QuestionTally],
) -> TallyResult<JSValue> {
    let c = OutputConfig {
        survey: config.output_settings.survey_name.clone(),
        respondents: survey.num_respondents() as u64,
        source: simplify_file_name(&config.survey_source.file_path),
    };
    let mut results: Vec<JSValue> = Vec::new();
    for (settings, tally) in config.questions.iter().zip(tallies.iter()) {
        results.push(tally_to_json(settings, tally)?);
    }
    Ok(json!({
        "config": c,
        "results": results }))
}

fn read_survey(source: &SurveySource) -> TallyResult<Survey> {
    let path = source.file_path.as_str();
    info!("Attempting to read survey file {:?}", path);
    let survey = match source.provider.as_str() {
        "csv" => io_csv::read_csv_survey(path, source),
        "xlsx" | "excel" => io_excel::read_excel_survey(path, source),
        x => UnknownProviderSnafu { provider: x }.fail(),
    }?;
    info!(
        "read_survey: {} questions, {} respondents",
        survey.questions().len(),
        survey.num_respondents()
    );
    debug!("read_survey: questions: {:?}", survey.questions());
    Ok(survey)
}

fn write_summary(pretty_js: &str, config: &SurveyConfig, out: Option<&str>) -> TallyResult<()> {
    let out_path: Option<PathBuf> = match out {
        Some("stdout") => None,
        Some(p) => Some(PathBuf::from(p)),
        None => config
            .output_settings
            .output_directory
            .as_ref()
            .map(|d| {
                Path::new(d).join(format!(
                    "{}_summary.json",
                    config.output_settings.survey_name
                ))
            }),
    };
    match out_path {
        None => {
            println!("{}", pretty_js);
        }
        Some(p) => {
            let path = p.display().to_string();
            if let Some(dir) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir).context(WritingSummarySnafu { path: &path })?;
            }
            fs::write(&p, pretty_js).context(WritingSummarySnafu { path: &path })?;
            info!("Summary written to {:?}", path);
        }
    }
    Ok(())
}

fn check_reference(pretty_js_stats: &str, reference_path: &str) -> TallyResult<()> {
    let summary_ref = read_summary(reference_path)?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref = serde_json::to_string_pretty(&summary_ref)
        .context(ParsingJsonSnafu {
            path: reference_path,
        })?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    info!("The summary matches the reference {:?}", reference_path);
    Ok(())
}

/// Tabulates all the questions of a configuration.
pub fn run_survey(
    config: &SurveyConfig,
    reference_path: Option<&str>,
    out: Option<&str>,
) -> TallyResult<()> {
    ensure_whatever!(
        !config.questions.is_empty(),
        "No questions declared for survey {:?}",
        config.output_settings.survey_name
    );
    let questions: Vec<Question> = config
        .questions
        .iter()
        .map(|q| q.question())
        .collect::<TallyResult<Vec<Question>>>()?;

    let survey = read_survey(&config.survey_source)?;
    let tallies = tabulate_survey(&survey, &questions).context(SurveyDataSnafu {})?;

    let result_js = build_summary_js(config, &survey, &tallies)?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {
        path: config.output_settings.survey_name.as_str(),
    })?;

    write_summary(&pretty_js_stats, config, out)?;

    if let Some(summary_p) = reference_path {
        check_reference(&pretty_js_stats, summary_p)?;
    }
    Ok(())
}

/// Builds the configuration from the command line, with or without a
/// configuration file.
fn config_from_args(args: &Args) -> TallyResult<SurveyConfig> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => {
            let input = match &args.input {
                Some(x) => x.clone(),
                None => whatever!("Either --config or --input must be provided"),
            };
            SurveyConfig {
                output_settings: OutputSettings {
                    survey_name: simplify_file_name(&input),
                    output_directory: None,
                },
                survey_source: SurveySource {
                    provider: DEFAULT_PROVIDER.to_string(),
                    file_path: input,
                    encoding: None,
                    csv_delimiter: None,
                    excel_worksheet_name: None,
                },
                questions: vec![],
            }
        }
    };

    if let Some(input) = &args.input {
        config.survey_source.file_path = input.clone();
    }
    if let Some(input_type) = &args.input_type {
        config.survey_source.provider = input_type.clone();
    }
    if let Some(name) = &args.excel_worksheet_name {
        config.survey_source.excel_worksheet_name = Some(name.clone());
    }
    for q in args.single.iter().flatten() {
        config
            .questions
            .push(QuestionSettings::simple(q, "singleChoice"));
    }
    for q in args.multi.iter().flatten() {
        config
            .questions
            .push(QuestionSettings::simple(q, "multiChoice"));
    }
    debug!("config_from_args: {:?}", config);
    Ok(config)
}

pub fn run_cli(args: &Args) -> TallyResult<()> {
    let config = config_from_args(args)?;
    run_survey(&config, args.reference.as_deref(), args.out.as_deref())
}

#[cfg(test)]
fn run_survey_test(test_name: &str, config_lpath: &str, summary_lpath: &str) -> TallyResult<()> {
    let test_dir = option_env!("SURVEY_TEST_DIR")
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("{}/testdata", env!("CARGO_MANIFEST_DIR")));
    info!("Running test {}", test_name);
    let config = read_config(&format!("{}/{}/{}", test_dir, test_name, config_lpath))?;
    let summary_path = format!("{}/{}/{}", test_dir, test_name, summary_lpath);
    run_survey(&config, Some(summary_path.as_str()), Some("stdout"))
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) -> TallyResult<()> {
    run_survey_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    )
}

#[cfg(test)]
mod tests {

    use super::*;
    use tempfile::TempDir;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn usv_survey() {
        init();
        let res = test_wrapper("usv_survey");
        assert!(res.is_ok(), "{:?}", res);
    }

    #[test]
    fn sensor_combinations() {
        init();
        let res = test_wrapper("sensor_combinations");
        assert!(res.is_ok(), "{:?}", res);
    }

    #[test]
    fn msforms_export() {
        init();
        let res = test_wrapper("msforms_export");
        assert!(res.is_ok(), "{:?}", res);
    }

    fn fixture_file(test_name: &str, suffix: &str) -> String {
        format!(
            "{}/testdata/{}/{}_{}",
            env!("CARGO_MANIFEST_DIR"),
            test_name,
            test_name,
            suffix
        )
    }

    #[test]
    fn altered_reference_is_reported() -> TallyResult<()> {
        init();
        let dir = TempDir::new().unwrap();
        let config = read_config(&fixture_file("usv_survey", "config.json"))?;
        let mut reference = read_summary(&fixture_file("usv_survey", "expected_summary.json"))?;
        reference["results"][0]["tally"][2]["count"] = json!(4);
        let reference_path = dir.path().join("altered_summary.json");
        fs::write(
            &reference_path,
            serde_json::to_string_pretty(&reference).unwrap(),
        )
        .unwrap();

        let res = run_survey(&config, reference_path.to_str(), Some("stdout"));
        assert!(matches!(res, Err(TallyError::ReferenceMismatch {})), "{:?}", res);
        Ok(())
    }

    #[test]
    fn summary_is_written_to_files() -> TallyResult<()> {
        init();
        let dir = TempDir::new().unwrap();
        let expected = read_summary(&fixture_file("usv_survey", "expected_summary.json"))?;
        let mut config = read_config(&fixture_file("usv_survey", "config.json"))?;

        // The output directory of the configuration is created when missing.
        let out_dir = dir.path().join("summaries");
        config.output_settings.output_directory = Some(out_dir.display().to_string());
        run_survey(&config, None, None)?;
        let written = read_summary(&out_dir.join("usv_survey_summary.json").display().to_string())?;
        assert_eq!(written, expected);

        // --out takes precedence over the output directory.
        let out_path = dir.path().join("explicit.json");
        run_survey(&config, None, out_path.to_str())?;
        assert_eq!(read_summary(&out_path.display().to_string())?, expected);
        Ok(())
    }

    #[test]
    fn missing_fixture() {
        let res = test_wrapper("no_such_survey");
        assert!(matches!(res, Err(TallyError::OpeningJson { .. })));
    }

    fn settings(kind: &str) -> QuestionSettings {
        QuestionSettings::simple("Which sensors?", kind)
    }

    fn tally(entries: &[(&str, u64)]) -> QuestionTally {
        QuestionTally {
            question: "Which sensors?".to_string(),
            respondents: 4,
            answered: 3,
            table: entries.iter().map(|(l, c)| (l.to_string(), *c)).collect(),
            other_responses: vec![],
        }
    }

    #[test]
    fn summary_keeps_the_table_order() -> TallyResult<()> {
        let mut s = settings("multiChoice");
        s.wrap_width = Some(5);
        let js = tally_to_json(&s, &tally(&[("Sonar", 3), ("AIS", 2), ("Lidar sensor", 1)]))?;
        assert_eq!(
            js["tally"],
            json!([
                {"label": "Sonar", "count": 3, "display": "Sonar"},
                {"label": "AIS", "count": 2, "display": "AIS"},
                {"label": "Lidar sensor", "count": 1, "display": "Lidar<br> sens<br>or"},
            ])
        );
        assert_eq!(js["title"], json!("Which sensors?"));
        assert!(js.get("otherResponses").is_none());
        Ok(())
    }

    #[test]
    fn summary_rejects_unmapped_labels() {
        let mut s = settings("singleChoice");
        s.colors = Some(
            [("AIS".to_string(), "#636EFA".to_string())]
                .into_iter()
                .collect(),
        );
        let res = tally_to_json(&s, &tally(&[("AIS", 2), ("Sonar", 1)]));
        assert!(matches!(res, Err(TallyError::UnmappedLabel { label, .. }) if label == "Sonar"));
    }

    fn ad_hoc_args(input: Option<&str>) -> Args {
        Args {
            config: None,
            reference: None,
            out: None,
            input: input.map(|s| s.to_string()),
            input_type: None,
            single: None,
            multi: None,
            excel_worksheet_name: None,
            verbose: false,
        }
    }

    #[test]
    fn ad_hoc_configuration() -> TallyResult<()> {
        let mut args = ad_hoc_args(Some("/tmp/survey.xlsx"));
        args.input_type = Some("xlsx".to_string());
        args.single = Some(vec!["Q1".to_string()]);
        args.multi = Some(vec!["Q2".to_string(), "Q3".to_string()]);
        args.excel_worksheet_name = Some("Form1".to_string());
        let config = config_from_args(&args)?;
        assert_eq!(config.output_settings.survey_name, "survey.xlsx");
        assert_eq!(config.survey_source.provider, "xlsx");
        assert_eq!(
            config.survey_source.excel_worksheet_name.as_deref(),
            Some("Form1")
        );
        let kinds: Vec<&str> = config.questions.iter().map(|q| q.kind.as_str()).collect();
        assert_eq!(kinds, vec!["singleChoice", "multiChoice", "multiChoice"]);
        Ok(())
    }

    #[test]
    fn input_type_is_not_guessed() -> TallyResult<()> {
        let config = config_from_args(&ad_hoc_args(Some("/tmp/survey.xlsx")))?;
        assert_eq!(config.survey_source.provider, "csv");

        // Overriding the input of a configuration keeps its declared type.
        let mut args = ad_hoc_args(Some("/tmp/other.csv"));
        args.config = Some(fixture_file("msforms_export", "config.json"));
        let config = config_from_args(&args)?;
        assert_eq!(config.survey_source.provider, "xlsx");
        assert_eq!(config.survey_source.file_path, "/tmp/other.csv");
        Ok(())
    }

    #[test]
    fn missing_input() {
        assert!(matches!(
            config_from_args(&ad_hoc_args(None)),
            Err(TallyError::Whatever { .. })
        ));
    }
}
