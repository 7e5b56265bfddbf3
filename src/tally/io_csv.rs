// Primitives for reading CSV exports.

use crate::tally::{io_common::decode_text, *};

pub fn read_csv_survey(path: &str, source: &SurveySource) -> TallyResult<Survey> {
    let bytes = fs::read(path).context(OpeningFileSnafu { path })?;
    let text = decode_text(&bytes, source.encoding.as_deref())?;
    parse_csv_survey(path, &text, source.csv_delimiter_byte()?)
}

fn parse_csv_survey(path: &str, text: &str, delimiter: u8) -> TallyResult<Survey> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());
    let mut records = rdr.into_records();

    let header = records
        .next()
        .context(EmptyFileSnafu { path })?
        .context(CsvParseSnafu { path })?;
    let headers: Vec<String> = header.iter().map(|s| s.to_string()).collect();
    debug!("read_csv_survey: header: {:?}", headers);
    let mut builder = SurveyBuilder::new()
        .questions(&headers)
        .context(SurveyDataSnafu {})?;

    for (idx, line_r) in records.enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvParseSnafu { path })?;
        let cells: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        debug!("read_csv_survey: lineno: {:?} row: {:?}", lineno, &cells);
        builder.add_row(&cells).context(SurveyDataSnafu {})?;
    }
    Ok(builder.build())
}
