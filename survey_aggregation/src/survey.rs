use log::debug;

use crate::config::SurveyErrors;
use crate::labels::normalize_header;

/// The responses to a survey: one row per respondent, one column per question.
///
/// A survey is loaded once and then passed to the tabulation functions.
/// Use the [`crate::builder::SurveyBuilder`] to create one.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Survey {
    // Normalized headers, in the order of the export.
    pub(crate) questions: Vec<String>,
    // Invariant: every row has exactly one cell per question.
    pub(crate) rows: Vec<Vec<Option<String>>>,
}

impl Survey {
    /// The normalized texts of the questions.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn num_respondents(&self) -> usize {
        self.rows.len()
    }

    /// The answers to one question, in respondent order.
    ///
    /// The question is matched after header normalization, so that
    /// `"5. Which sensors?"` finds the column `"Which sensors?"`.
    pub fn column(&self, question: &str) -> Result<Vec<Option<String>>, SurveyErrors> {
        let idx = self.question_index(question)?;
        Ok(self.rows.iter().map(|row| row[idx].clone()).collect())
    }

    fn question_index(&self, question: &str) -> Result<usize, SurveyErrors> {
        let key = normalize_header(question);
        let idx = self
            .questions
            .iter()
            .position(|q| *q == key)
            .ok_or_else(|| SurveyErrors::UnknownQuestion(question.to_string()))?;
        debug!("question_index: {:?} -> column {}", key, idx);
        Ok(idx)
    }
}
