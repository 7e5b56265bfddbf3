// Cleaning of the labels and the headers found in survey exports.

use unicode_normalization::UnicodeNormalization;

fn canonical_char(c: char) -> char {
    match c {
        // Curly and low single quotes
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
        // Curly and low double quotes
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
        // Hyphen, non-breaking hyphen, figure dash, en dash, em dash, horizontal bar, minus sign
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}'
        | '\u{2212}' => '-',
        // Non-breaking spaces
        '\u{00A0}' | '\u{202F}' => ' ',
        c => c,
    }
}

/// Cleans a label so that answers typed or exported with different
/// typography compare equal.
///
/// The text is put in the composed Unicode form (NFC), the curly quotes are
/// replaced by the ASCII quotes, the dash variants by `-`, the non-breaking
/// spaces by plain spaces, and the surrounding whitespace is removed.
///
/// ```
/// use survey_aggregation::normalize_label;
///
/// assert_eq!(normalize_label("\u{a0}10\u{2013}25% savings "), "10-25% savings");
/// assert_eq!(normalize_label("It\u{2019}s \u{201C}safe\u{201D}"), "It's \"safe\"");
/// ```
pub fn normalize_label(text: &str) -> String {
    let composed: String = text.nfc().map(canonical_char).collect();
    composed.trim().to_string()
}

/// Normalizes a header cell and removes its question number, if any.
///
/// Exports often prefix the questions with their number (`5. What ...`,
/// `Q5 What ...`). The prefix is only removed when it is followed by some
/// text, so that a header made of a number alone is kept.
pub fn normalize_header(text: &str) -> String {
    let label = normalize_label(text);
    match strip_question_number(&label) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => label,
    }
}

fn strip_question_number(label: &str) -> Option<&str> {
    let rest = label
        .strip_prefix('Q')
        .or_else(|| label.strip_prefix('q'))
        .unwrap_or(label);
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    // Digits are ASCII: the byte offset is the number of characters.
    let after_digits = &rest[digits..];
    let after_sep = after_digits
        .strip_prefix(|c: char| matches!(c, '.' | ')' | ':' | '-'))
        .unwrap_or(after_digits);
    // A space must separate the number from the text: "5G coverage" and "5.5 rating" are not numbered.
    if !after_sep.starts_with(char::is_whitespace) {
        return None;
    }
    Some(after_sep.trim_start())
}

/// Cuts a label into chunks of at most `width` characters.
///
/// The chart collaborator joins the chunks with line breaks. A width of 0
/// disables the wrapping.
pub fn wrap_label(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.is_empty() {
        return vec![text.to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
