/*!

Frequency tables for survey exports.

The entry points are [`tabulate_question`] and [`tabulate_survey`], which take a
[`Survey`] (built with the [`builder::SurveyBuilder`]) and the description of
each question. The individual steps are also exposed:

* [`normalize_label`] cleans the typography of a label,
* [`count_single_choice`] counts the answers to a one-answer question,
  optionally in a fixed category order,
* [`count_multi_choice`] counts every option of a multi-select question,
* [`group_equivalent_sets`] counts the combinations of options of a
  multi-select question, labelled with [`combination_label`],
* [`group_long_tail`] merges the rare, long free-text answers into one bucket.

See the [manual] for the conventions followed with the survey exports.
*/

pub mod builder;
mod config;
mod labels;
pub mod manual;
mod survey;

use log::{debug, info, warn};

use std::collections::HashMap;

pub use crate::config::*;
pub use crate::labels::{normalize_header, normalize_label, wrap_label};
pub use crate::survey::Survey;

// **** Private structures ****

// Counts labels, remembering the order in which they were first seen.
#[derive(Debug, Default)]
struct LabelCounter {
    positions: HashMap<String, usize>,
    entries: Vec<(String, u64)>,
}

impl LabelCounter {
    fn add(&mut self, label: String, count: u64) {
        if let Some(&idx) = self.positions.get(&label) {
            self.entries[idx].1 += count;
        } else {
            self.positions.insert(label.clone(), self.entries.len());
            self.entries.push((label, count));
        }
    }

    fn get(&self, label: &str) -> u64 {
        self.positions
            .get(label)
            .map(|&idx| self.entries[idx].1)
            .unwrap_or(0)
    }

    /// Descending counts. The sort is stable: ties stay in first-seen order.
    fn into_table_by_count(self) -> FrequencyTable {
        let mut entries = self.entries;
        entries.sort_by(|(_, c1), (_, c2)| c2.cmp(c1));
        FrequencyTable { entries }
    }
}

/// Builds a table from label/count pairs, in the given order.
///
/// Repeated labels are merged at the position of their first occurrence.
impl FromIterator<(String, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut counter = LabelCounter::default();
        for (label, count) in iter {
            counter.add(label, count);
        }
        FrequencyTable {
            entries: counter.entries,
        }
    }
}

// The cleaned answer of a single-choice cell, or None if it was skipped.
fn single_answer(cell: &Option<String>) -> Option<String> {
    cell.as_deref()
        .map(normalize_label)
        .filter(|label| !label.is_empty())
}

// The cleaned selections of a multi-select cell, in the order of the cell.
// An empty delimiter disables the splitting.
fn split_selections(cell: &Option<String>, delimiter: &str) -> Vec<String> {
    match cell.as_deref() {
        Some(text) => split_text(text, delimiter),
        None => vec![],
    }
}

fn split_text(text: &str, delimiter: &str) -> Vec<String> {
    let parts: Vec<&str> = if delimiter.is_empty() {
        vec![text]
    } else {
        text.split(delimiter).collect()
    };
    parts
        .into_iter()
        .map(normalize_label)
        .filter(|label| !label.is_empty())
        .collect()
}

/// The composite label of the options selected in one multi-select cell.
///
/// The cleaned options are sorted and joined with [`COMBINATION_SEPARATOR`].
/// Returns an empty string when the cell has no option.
///
/// ```
/// use survey_aggregation::combination_label;
///
/// assert_eq!(combination_label("Sonar; AIS;", ";"), "AIS; Sonar");
/// assert_eq!(combination_label(" ; ", ";"), "");
/// ```
pub fn combination_label(text: &str, delimiter: &str) -> String {
    let mut selections = split_text(text, delimiter);
    selections.sort();
    selections.join(COMBINATION_SEPARATOR)
}

/// Counts the answers to a question with one answer per respondent.
///
/// Skipped and blank answers are ignored. Without an `order`, the labels are
/// sorted by decreasing count, and ties are kept in the order in which the
/// labels first appear.
///
/// With an `order`, the table follows the declared categories and only them:
/// answers outside of the declared categories are dropped, and so are the
/// categories without any answer. Use [`count_single_choice_with_policy`] to
/// keep those with a zero count.
pub fn count_single_choice(column: &[Option<String>], order: Option<&[String]>) -> FrequencyTable {
    count_single_choice_with_policy(column, order, OrderPolicy::DropMissing)
}

/// Same as [`count_single_choice`], with the policy for the declared
/// categories that received no answer.
pub fn count_single_choice_with_policy(
    column: &[Option<String>],
    order: Option<&[String]>,
    policy: OrderPolicy,
) -> FrequencyTable {
    let mut counter = LabelCounter::default();
    for cell in column.iter() {
        if let Some(label) = single_answer(cell) {
            counter.add(label, 1);
        }
    }

    let order = match order {
        Some(o) => o,
        None => return counter.into_table_by_count(),
    };

    let mut entries: Vec<(String, u64)> = Vec::new();
    for declared in order.iter() {
        let label = normalize_label(declared);
        if entries.iter().any(|(l, _)| *l == label) {
            continue;
        }
        let count = counter.get(&label);
        if count > 0 || policy == OrderPolicy::ZeroFill {
            entries.push((label, count));
        }
    }
    for (label, count) in counter.entries.iter() {
        if !entries.iter().any(|(l, _)| l == label) {
            debug!(
                "count_single_choice: dropping {} answers outside of the declared order: {:?}",
                count, label
            );
        }
    }
    FrequencyTable { entries }
}

/// Counts every option selected in a multi-select question.
///
/// Each cell is split on the `delimiter`, and each part is cleaned. Empty
/// parts (trailing or doubled delimiters) are discarded, and every remaining
/// part is counted, including an option repeated in the same cell. The labels
/// are sorted by decreasing count, ties in first-seen order.
pub fn count_multi_choice(column: &[Option<String>], delimiter: &str) -> FrequencyTable {
    let mut counter = LabelCounter::default();
    for cell in column.iter() {
        for label in split_selections(cell, delimiter) {
            counter.add(label, 1);
        }
    }
    counter.into_table_by_count()
}

/// Counts the combinations of options selected in a multi-select question.
///
/// The selections of each respondent are sorted and joined into one composite
/// label, so that the order in which the options were picked does not matter:
/// `"B;A"` and `"A;B"` are both counted as `"A; B"`.
pub fn group_equivalent_sets(column: &[Option<String>], delimiter: &str) -> FrequencyTable {
    let mut counter = LabelCounter::default();
    for cell in column.iter().flatten() {
        let label = combination_label(cell, delimiter);
        if !label.is_empty() {
            counter.add(label, 1);
        }
    }
    counter.into_table_by_count()
}

/// Merges the rare and long labels into the [`OTHER_OPEN_TEXT`] bucket.
///
/// These are typically the free-text answers to an "Other" option. An entry is
/// merged when its count is at most `max_count` and its label has more than
/// `max_len` characters. The merged labels are returned on the side, and the
/// total count does not change.
pub fn group_long_tail(table: &FrequencyTable, max_len: usize, max_count: u64) -> GroupedTable {
    let mut entries: Vec<(String, u64)> = Vec::new();
    let mut other_responses: Vec<String> = Vec::new();
    let mut other_count: u64 = 0;
    for (label, count) in table.entries.iter() {
        let is_rare = *count <= max_count && label.chars().count() > max_len;
        if is_rare && label != OTHER_OPEN_TEXT {
            other_responses.push(label.clone());
            other_count += count;
        } else {
            entries.push((label.clone(), *count));
        }
    }
    if !other_responses.is_empty() {
        debug!(
            "group_long_tail: merging {} labels ({} responses) into {:?}",
            other_responses.len(),
            other_count,
            OTHER_OPEN_TEXT
        );
        if let Some(existing) = entries.iter_mut().find(|(l, _)| l == OTHER_OPEN_TEXT) {
            existing.1 += other_count;
        } else {
            entries.push((OTHER_OPEN_TEXT.to_string(), other_count));
        }
    }
    GroupedTable {
        table: FrequencyTable { entries },
        other_responses,
    }
}

fn count_answered(column: &[Option<String>], kind: &QuestionKind) -> u64 {
    column
        .iter()
        .filter(|cell| match kind {
            QuestionKind::SingleChoice { .. } => single_answer(cell).is_some(),
            QuestionKind::MultiChoice { delimiter, .. } => {
                !split_selections(cell, delimiter).is_empty()
            }
        })
        .count() as u64
}

/// Tabulates one question of the survey.
pub fn tabulate_question(survey: &Survey, question: &Question) -> Result<QuestionTally, SurveyErrors> {
    let column = survey.column(&question.text)?;
    let table = match &question.kind {
        QuestionKind::SingleChoice {
            order,
            order_policy,
        } => count_single_choice_with_policy(&column, order.as_deref(), *order_policy),
        QuestionKind::MultiChoice { delimiter, .. } if delimiter.is_empty() => {
            return Err(SurveyErrors::EmptyDelimiter(question.text.clone()));
        }
        QuestionKind::MultiChoice {
            delimiter,
            unit: SelectionUnit::Option,
        } => count_multi_choice(&column, delimiter),
        QuestionKind::MultiChoice {
            delimiter,
            unit: SelectionUnit::Combination,
        } => group_equivalent_sets(&column, delimiter),
    };

    let grouped = match question.long_tail {
        Some(rule) => group_long_tail(&table, rule.max_len, rule.max_count),
        None => GroupedTable {
            table,
            other_responses: vec![],
        },
    };

    let answered = count_answered(&column, &question.kind);
    info!(
        "tabulate_question: {:?}: {} answered out of {}, {} labels",
        question.text,
        answered,
        column.len(),
        grouped.table.len()
    );
    if grouped.table.is_empty() {
        warn!("tabulate_question: no data for question {:?}", question.text);
    }

    Ok(QuestionTally {
        question: question.text.clone(),
        respondents: column.len() as u64,
        answered,
        table: grouped.table,
        other_responses: grouped.other_responses,
    })
}

/// Tabulates all the given questions, in order.
pub fn tabulate_survey(
    survey: &Survey,
    questions: &[Question],
) -> Result<Vec<QuestionTally>, SurveyErrors> {
    info!(
        "tabulate_survey: {} questions, {} respondents",
        questions.len(),
        survey.num_respondents()
    );
    questions
        .iter()
        .map(|q| tabulate_question(survey, q))
        .collect()
}
