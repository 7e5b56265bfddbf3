pub use crate::config::*;
use crate::labels::normalize_header;
pub use crate::survey::Survey;

/// A builder for assembling the responses of a survey in memory.
///
/// The readers for files use it too, after turning each cell into text.
///
/// ```
/// pub use survey_aggregation::builder::SurveyBuilder;
/// # use survey_aggregation::SurveyErrors;
///
/// let mut builder = SurveyBuilder::new()
///     .questions(&["1. Which sensors do you use?".to_string()])?;
///
/// builder.add_row(&["AIS;Sonar".to_string()])?;
/// builder.add_row(&["".to_string()])?;
///
/// let survey = builder.build();
/// assert_eq!(survey.questions(), &["Which sensors do you use?".to_string()]);
/// assert_eq!(survey.num_respondents(), 2);
///
/// # Ok::<(), SurveyErrors>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SurveyBuilder {
    pub(crate) _questions: Option<Vec<String>>,
    pub(crate) _rows: Vec<Vec<Option<String>>>,
}

impl SurveyBuilder {
    pub fn new() -> SurveyBuilder {
        SurveyBuilder::default()
    }

    /// Declares the questions from the raw header cells.
    ///
    /// The headers are normalized: two headers that only differ by their
    /// whitespace or their question number are rejected as duplicates.
    /// Empty headers are named after their position (`Unnamed: 3`).
    pub fn questions(self, headers: &[String]) -> Result<SurveyBuilder, SurveyErrors> {
        let mut questions: Vec<String> = Vec::new();
        for (idx, h) in headers.iter().enumerate() {
            let q = match normalize_header(h) {
                q if q.is_empty() => format!("Unnamed: {}", idx),
                q => q,
            };
            if questions.contains(&q) {
                return Err(SurveyErrors::DuplicateQuestion(q));
            }
            questions.push(q);
        }
        Ok(SurveyBuilder {
            _questions: Some(questions),
            _rows: Vec::new(),
        })
    }

    /// Adds the answers of one respondent, where an empty cell is a skipped question.
    pub fn add_row(&mut self, cells: &[String]) -> Result<(), SurveyErrors> {
        let answers: Vec<Option<String>> = cells
            .iter()
            .map(|s| if s.is_empty() { None } else { Some(s.clone()) })
            .collect();
        self.add_response_row(&answers)
    }

    /// Adds the answers of one respondent.
    ///
    /// A row shorter than the header is padded with skipped answers, as
    /// happens with exports that drop the trailing empty cells.
    pub fn add_response_row(&mut self, answers: &[Option<String>]) -> Result<(), SurveyErrors> {
        let expected = self
            ._questions
            .as_ref()
            .map(|qs| qs.len())
            .ok_or(SurveyErrors::MissingQuestions)?;
        if answers.len() > expected {
            return Err(SurveyErrors::RowLengthMismatch {
                row: self._rows.len() + 1,
                expected,
                found: answers.len(),
            });
        }
        let mut row = answers.to_vec();
        row.resize(expected, None);
        self._rows.push(row);
        Ok(())
    }

    pub fn build(self) -> Survey {
        Survey {
            questions: self._questions.unwrap_or_default(),
            rows: self._rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(x: &str) -> String {
        x.to_string()
    }

    #[test]
    fn builder_pads_short_rows() -> Result<(), SurveyErrors> {
        let mut builder = SurveyBuilder::new().questions(&[s("A?"), s("B?")])?;
        builder.add_row(&[s("yes")])?;
        let survey = builder.build();
        assert_eq!(survey.column("B?")?, vec![None]);
        assert_eq!(survey.column("A?")?, vec![Some(s("yes"))]);
        Ok(())
    }

    #[test]
    fn builder_rejects_long_rows() -> Result<(), SurveyErrors> {
        let mut builder = SurveyBuilder::new().questions(&[s("A?")])?;
        let res = builder.add_row(&[s("yes"), s("no")]);
        assert_eq!(
            res,
            Err(SurveyErrors::RowLengthMismatch {
                row: 1,
                expected: 1,
                found: 2
            })
        );
        Ok(())
    }

    #[test]
    fn builder_rejects_rows_without_questions() {
        let mut builder = SurveyBuilder::new();
        assert_eq!(
            builder.add_row(&[s("yes")]),
            Err(SurveyErrors::MissingQuestions)
        );
    }

    #[test]
    fn builder_rejects_duplicate_headers() {
        let res = SurveyBuilder::new().questions(&[s("5. Safety?"), s("Safety?\u{a0}")]);
        assert_eq!(
            res.map(|_| ()),
            Err(SurveyErrors::DuplicateQuestion(s("Safety?")))
        );
    }

    #[test]
    fn builder_names_empty_headers() -> Result<(), SurveyErrors> {
        let builder = SurveyBuilder::new().questions(&[s("A?"), s(""), s("\u{a0}")])?;
        let survey = builder.build();
        assert_eq!(survey.questions(), &[s("A?"), s("Unnamed: 1"), s("Unnamed: 2")]);
        Ok(())
    }

    #[test]
    fn column_lookup_normalizes_the_question() -> Result<(), SurveyErrors> {
        let mut builder =
            SurveyBuilder::new().questions(&[s("Q7 How do maintenance\u{a0}costs compare?")])?;
        builder.add_row(&[s("Much lower")])?;
        let survey = builder.build();
        assert_eq!(
            survey.column("How do maintenance costs compare?")?,
            vec![Some(s("Much lower"))]
        );
        assert_eq!(
            survey.column("Unknown?"),
            Err(SurveyErrors::UnknownQuestion(s("Unknown?")))
        );
        Ok(())
    }
}
