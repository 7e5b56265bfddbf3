use crate::tally::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::collections::BTreeMap;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "surveyName")]
    pub survey_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveySource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    pub encoding: Option<String>,
    #[serde(rename = "csvDelimiter")]
    pub csv_delimiter: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl SurveySource {
    pub fn csv_delimiter_byte(&self) -> TallyResult<u8> {
        match self.csv_delimiter.as_deref() {
            None => Ok(b','),
            Some(d) if d.len() == 1 && d.is_ascii() => Ok(d.as_bytes()[0]),
            Some(d) => whatever!("csvDelimiter must be a single ASCII character, got {:?}", d),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct LongTailSettings {
    #[serde(rename = "maxLength")]
    pub max_length: usize,
    #[serde(rename = "maxCount")]
    pub max_count: Option<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSettings {
    pub text: String,
    pub title: Option<String>,
    pub kind: String,
    pub order: Option<Vec<String>>,
    #[serde(rename = "zeroFill")]
    pub zero_fill: Option<bool>,
    pub delimiter: Option<String>,
    #[serde(rename = "longTail")]
    pub long_tail: Option<LongTailSettings>,
    #[serde(rename = "wrapWidth")]
    pub wrap_width: Option<usize>,
    pub colors: Option<BTreeMap<String, String>>,
}

impl QuestionSettings {
    pub fn simple(text: &str, kind: &str) -> QuestionSettings {
        QuestionSettings {
            text: text.to_string(),
            title: None,
            kind: kind.to_string(),
            order: None,
            zero_fill: None,
            delimiter: None,
            long_tail: None,
            wrap_width: None,
            colors: None,
        }
    }

    /// Checks the settings and turns them into the question to tabulate.
    pub fn question(&self) -> TallyResult<Question> {
        let question = self.text.clone();
        let delimiter = match self.delimiter.clone() {
            Some(d) if d.is_empty() => {
                return InvalidQuestionSnafu {
                    question,
                    message: "the delimiter cannot be empty",
                }
                .fail();
            }
            Some(d) => d,
            None => DEFAULT_DELIMITER.to_string(),
        };
        let kind = match self.kind.as_str() {
            "singleChoice" => {
                ensure!(
                    self.delimiter.is_none(),
                    InvalidQuestionSnafu {
                        question,
                        message: "a delimiter is only allowed for multiChoice and combination",
                    }
                );
                QuestionKind::SingleChoice {
                    order: self.order.clone(),
                    order_policy: match self.zero_fill {
                        Some(true) => OrderPolicy::ZeroFill,
                        _ => OrderPolicy::DropMissing,
                    },
                }
            }
            k @ ("multiChoice" | "combination") => {
                ensure!(
                    self.order.is_none() && self.zero_fill.is_none(),
                    InvalidQuestionSnafu {
                        question,
                        message: "order and zeroFill are only allowed for singleChoice",
                    }
                );
                QuestionKind::MultiChoice {
                    delimiter,
                    unit: if k == "combination" {
                        SelectionUnit::Combination
                    } else {
                        SelectionUnit::Option
                    },
                }
            }
            k => {
                return UnknownQuestionKindSnafu {
                    question,
                    kind: k.to_string(),
                }
                .fail();
            }
        };
        Ok(Question {
            text: self.text.clone(),
            kind,
            long_tail: self.long_tail.as_ref().map(|lt| LongTailRule {
                max_len: lt.max_length,
                max_count: lt.max_count.unwrap_or(1),
            }),
        })
    }

    pub fn title(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.text.clone())
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "surveySource")]
    pub survey_source: SurveySource,
    pub questions: Vec<QuestionSettings>,
}

/// Reads a configuration file.
///
/// The paths of the configuration are relative to the directory of the
/// file; they are returned resolved.
pub fn read_config(path: &str) -> TallyResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let mut config: SurveyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    let root = Path::new(path).parent().context(MissingParentDirSnafu { path })?;
    config.survey_source.file_path = resolve(root, &config.survey_source.file_path);
    config.output_settings.output_directory = config
        .output_settings
        .output_directory
        .map(|d| resolve(root, &d));
    debug!("read_config: {:?}", config);
    Ok(config)
}

fn resolve(root: &Path, p: &str) -> String {
    root.join(p).display().to_string()
}

pub fn read_summary(path: &str) -> TallyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_question_kinds() -> TallyResult<()> {
        let js = r#"{
            "text": "5. Which sensors?",
            "kind": "combination",
            "delimiter": "|",
            "longTail": { "maxLength": 40 }
        }"#;
        let settings: QuestionSettings = serde_json::from_str(js).context(ParsingJsonSnafu {
            path: "inline",
        })?;
        let q = settings.question()?;
        assert_eq!(
            q.kind,
            QuestionKind::MultiChoice {
                delimiter: "|".to_string(),
                unit: SelectionUnit::Combination
            }
        );
        assert_eq!(q.long_tail, Some(LongTailRule::new(40)));
        assert_eq!(settings.title(), "5. Which sensors?");

        let mut single = QuestionSettings::simple("Safety?", "singleChoice");
        single.zero_fill = Some(true);
        assert_eq!(
            single.question()?.kind,
            QuestionKind::SingleChoice {
                order: None,
                order_policy: OrderPolicy::ZeroFill
            }
        );
        Ok(())
    }

    #[test]
    fn reject_invalid_questions() {
        let unknown = QuestionSettings::simple("Safety?", "likert");
        assert!(matches!(
            unknown.question(),
            Err(TallyError::UnknownQuestionKind { .. })
        ));

        let mut single_with_delimiter = QuestionSettings::simple("Safety?", "singleChoice");
        single_with_delimiter.delimiter = Some(";".to_string());
        assert!(matches!(
            single_with_delimiter.question(),
            Err(TallyError::InvalidQuestion { .. })
        ));

        let mut multi_with_order = QuestionSettings::simple("Sensors?", "multiChoice");
        multi_with_order.order = Some(vec!["AIS".to_string()]);
        assert!(matches!(
            multi_with_order.question(),
            Err(TallyError::InvalidQuestion { .. })
        ));

        let mut empty_delimiter = QuestionSettings::simple("Sensors?", "multiChoice");
        empty_delimiter.delimiter = Some("".to_string());
        assert!(matches!(
            empty_delimiter.question(),
            Err(TallyError::InvalidQuestion { .. })
        ));
    }

    #[test]
    fn csv_delimiters() -> TallyResult<()> {
        let mut source = SurveySource {
            provider: "csv".to_string(),
            file_path: "survey.csv".to_string(),
            encoding: None,
            csv_delimiter: None,
            excel_worksheet_name: None,
        };
        assert_eq!(source.csv_delimiter_byte()?, b',');
        source.csv_delimiter = Some(";".to_string());
        assert_eq!(source.csv_delimiter_byte()?, b';');
        source.csv_delimiter = Some("||".to_string());
        assert!(source.csv_delimiter_byte().is_err());
        Ok(())
    }

    #[test]
    fn read_config_resolves_paths() -> TallyResult<()> {
        let path = format!(
            "{}/testdata/usv_survey/usv_survey_config.json",
            env!("CARGO_MANIFEST_DIR")
        );
        let config = read_config(&path)?;
        assert!(config
            .survey_source
            .file_path
            .ends_with("testdata/usv_survey/usv_survey_data.csv"));
        assert_eq!(config.questions.len(), 4);
        Ok(())
    }
}
