// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The label of the bucket that collects rare, long free-text answers.
pub const OTHER_OPEN_TEXT: &str = "Other (open-text)";

/// The delimiter used by the survey exports for multi-select answers.
pub const DEFAULT_DELIMITER: &str = ";";

/// The separator used to join the selections of a composite label.
pub const COMBINATION_SEPARATOR: &str = "; ";

/// What to do with the declared categories of a single-choice question
/// that received no answer.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum OrderPolicy {
    /// Categories without any answer are left out of the table.
    #[default]
    DropMissing,
    /// Every declared category is kept, with a count of zero if needed.
    ZeroFill,
}

/// For multi-select questions, what counts as one answer.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum SelectionUnit {
    /// Each selected option is counted on its own.
    #[default]
    Option,
    /// The full set of options picked by a respondent is one answer.
    Combination,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum QuestionKind {
    /// One answer per respondent, optionally restricted to a known ordered list of categories.
    SingleChoice {
        order: Option<Vec<String>>,
        order_policy: OrderPolicy,
    },
    /// Zero or more answers packed into one cell.
    MultiChoice {
        delimiter: String,
        unit: SelectionUnit,
    },
}

impl QuestionKind {
    pub const SINGLE_CHOICE: QuestionKind = QuestionKind::SingleChoice {
        order: None,
        order_policy: OrderPolicy::DropMissing,
    };

    pub fn multi_choice() -> QuestionKind {
        QuestionKind::MultiChoice {
            delimiter: DEFAULT_DELIMITER.to_string(),
            unit: SelectionUnit::Option,
        }
    }
}

/// Thresholds for merging the rare free-text answers into one bucket.
///
/// An entry is rare if its count is at most `max_count` and its label
/// is longer than `max_len` characters.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct LongTailRule {
    pub max_len: usize,
    pub max_count: u64,
}

impl LongTailRule {
    pub fn new(max_len: usize) -> LongTailRule {
        LongTailRule {
            max_len,
            max_count: 1,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Question {
    /// The text of the question, as found in the header of the export.
    pub text: String,
    pub kind: QuestionKind,
    pub long_tail: Option<LongTailRule>,
}

impl Question {
    pub fn single_choice(text: &str) -> Question {
        Question {
            text: text.to_string(),
            kind: QuestionKind::SINGLE_CHOICE,
            long_tail: None,
        }
    }

    pub fn multi_choice(text: &str) -> Question {
        Question {
            text: text.to_string(),
            kind: QuestionKind::multi_choice(),
            long_tail: None,
        }
    }
}

// ******** Output data structures *********

/// An ordered mapping from a cleaned label to a number of responses.
///
/// Labels are unique.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct FrequencyTable {
    pub(crate) entries: Vec<(String, u64)>,
}

impl FrequencyTable {
    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(l, _)| l.as_str()).collect()
    }

    pub fn get(&self, label: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| *c)
    }

    /// The sum of all the counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| *c).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(l, c)| (l.as_str(), *c))
    }
}

/// A frequency table after the long-tail grouping.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct GroupedTable {
    pub table: FrequencyTable,
    /// The labels that were merged into the open-text bucket, in table order.
    pub other_responses: Vec<String>,
}

/// The outcome of tabulating one question.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuestionTally {
    pub question: String,
    pub respondents: u64,
    /// Respondents that did not skip this question.
    pub answered: u64,
    pub table: FrequencyTable,
    pub other_responses: Vec<String>,
}

/// Errors from building a survey or looking up its questions.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SurveyErrors {
    /// Rows were added before the questions were declared.
    MissingQuestions,
    /// Two headers are the same once normalized.
    DuplicateQuestion(String),
    /// The question is not one of the columns of the survey.
    UnknownQuestion(String),
    RowLengthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    EmptyDelimiter(String),
}

impl Error for SurveyErrors {}

impl Display for SurveyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurveyErrors::MissingQuestions => write!(f, "no questions declared before the rows"),
            SurveyErrors::DuplicateQuestion(q) => write!(f, "duplicate question: {:?}", q),
            SurveyErrors::UnknownQuestion(q) => write!(f, "unknown question: {:?}", q),
            SurveyErrors::RowLengthMismatch {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {} has {} cells but the survey has {} questions",
                row, found, expected
            ),
            SurveyErrors::EmptyDelimiter(q) => {
                write!(f, "empty delimiter for multi-choice question {:?}", q)
            }
        }
    }
}
