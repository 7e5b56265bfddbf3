use std::collections::BTreeMap;

use crate::tally::*;

/// The colors of the labels of one question.
///
/// The labels are compared once cleaned, so a mapping written with curly
/// quotes or en dashes still applies to the cleaned labels of the table.
/// For combinations, the options of a label may be written in any order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColorMapping {
    question: String,
    combination: bool,
    colors: BTreeMap<String, String>,
}

impl ColorMapping {
    pub fn from_settings(
        question: &str,
        settings: &BTreeMap<String, String>,
        combination: bool,
    ) -> TallyResult<ColorMapping> {
        let mut colors: BTreeMap<String, String> = BTreeMap::new();
        for (label, color) in settings.iter() {
            ensure!(
                is_hex_color(color),
                InvalidColorSnafu {
                    question,
                    label: label.as_str(),
                    color: color.as_str(),
                }
            );
            let key = canonical_key(label, combination);
            if let Some(previous) = colors.insert(key.clone(), color.clone()) {
                if &previous != color {
                    warn!(
                        "ColorMapping: question {:?}: two colors for label {:?}, using {:?}",
                        question, key, color
                    );
                }
            }
        }
        Ok(ColorMapping {
            question: question.to_string(),
            combination,
            colors,
        })
    }

    pub fn color_for(&self, label: &str) -> TallyResult<&str> {
        let color = self
            .colors
            .get(&canonical_key(label, self.combination))
            .context(UnmappedLabelSnafu {
                question: self.question.as_str(),
                label,
            })?;
        Ok(color.as_str())
    }
}

fn canonical_key(label: &str, combination: bool) -> String {
    if combination {
        let key = combination_label(label, COMBINATION_SEPARATOR.trim());
        if !key.is_empty() {
            return key;
        }
    }
    normalize_label(label)
}

fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(digits) => {
            (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(l, c)| (l.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn colors_by_clean_label() -> TallyResult<()> {
        let m = ColorMapping::from_settings(
            "Savings?",
            &mapping(&[("10\u{2013}25% savings", "#636EFA"), ("Other (open-text)", "#ccc")]),
            false,
        )?;
        assert_eq!(m.color_for("10-25% savings")?, "#636EFA");
        assert_eq!(m.color_for("Other (open-text)")?, "#ccc");
        Ok(())
    }

    #[test]
    fn combination_keys_in_any_order() -> TallyResult<()> {
        let m = ColorMapping::from_settings(
            "Sensors?",
            &mapping(&[
                ("Sonar; AIS", "#636EFA"),
                ("Lidar;Sonar;AIS", "#EF476F"),
                ("Other (open-text)", "#AAA"),
            ]),
            true,
        )?;
        assert_eq!(m.color_for("AIS; Sonar")?, "#636EFA");
        assert_eq!(m.color_for("AIS; Lidar; Sonar")?, "#EF476F");
        assert_eq!(m.color_for("Other (open-text)")?, "#AAA");
        assert!(m.color_for("AIS").is_err());

        // Single and multi choice labels keep their text.
        let m = ColorMapping::from_settings("Sensors?", &mapping(&[("Sonar; AIS", "#636EFA")]), false)?;
        assert!(m.color_for("AIS; Sonar").is_err());
        Ok(())
    }

    #[test]
    fn unmapped_labels() -> TallyResult<()> {
        let m = ColorMapping::from_settings("Savings?", &mapping(&[("Yes", "#00B6AD")]), false)?;
        let res = m.color_for("No");
        assert!(
            matches!(res, Err(TallyError::UnmappedLabel { question, label }) if question == "Savings?" && label == "No")
        );
        Ok(())
    }

    #[test]
    fn invalid_colors() {
        for color in ["red", "#12", "#GGGGGG", "636EFA", "#1234567"] {
            let res = ColorMapping::from_settings("Q?", &mapping(&[("Yes", color)]), false);
            assert!(
                matches!(res, Err(TallyError::InvalidColor { .. })),
                "{}",
                color
            );
        }
    }
}
