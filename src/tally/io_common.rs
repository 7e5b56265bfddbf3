use encoding_rs::Encoding;
use std::path::Path;

use crate::tally::*;

/// The encoding assumed for the exports that are not valid UTF-8.
pub const DEFAULT_LEGACY_ENCODING: &str = "windows-1252";

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Decodes the content of an export.
///
/// UTF-8 is tried first (with or without a byte order mark). Otherwise, the
/// content is decoded with the given legacy encoding, which defaults to
/// Windows-1252 (the superset of ISO-8859-1 used by the spreadsheet tools).
pub fn decode_text(bytes: &[u8], encoding_label: Option<&str>) -> TallyResult<String> {
    let label = encoding_label.unwrap_or(DEFAULT_LEGACY_ENCODING);
    let legacy = Encoding::for_label(label.as_bytes()).context(UnknownEncodingSnafu { label })?;

    if let Ok(s) = std::str::from_utf8(bytes) {
        debug!("decode_text: content is valid UTF-8");
        return Ok(s.strip_prefix('\u{feff}').unwrap_or(s).to_string());
    }

    let (text, used, had_errors) = legacy.decode(bytes);
    debug!("decode_text: decoded with {}", used.name());
    if had_errors {
        warn!(
            "decode_text: some characters could not be decoded with {} and were replaced",
            used.name()
        );
    }
    Ok(text.into_owned())
}
