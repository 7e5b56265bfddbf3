use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::tally::*;

pub fn read_excel_survey(path: &str, source: &SurveySource) -> TallyResult<Survey> {
    let wrange = get_range(path, source)?;
    let mut rows = wrange.rows();

    let header = rows.next().context(EmptyFileSnafu { path })?;
    debug!("read_excel_survey: header: {:?}", header);
    let headers: Vec<String> = header
        .iter()
        .map(|cell| read_cell(cell, 1).map(|c| c.unwrap_or_default()))
        .collect::<TallyResult<Vec<String>>>()?;
    let mut builder = SurveyBuilder::new()
        .questions(&headers)
        .context(SurveyDataSnafu {})?;

    for (idx, row) in rows.enumerate() {
        let lineno = (idx + 2) as u64;
        let answers = row
            .iter()
            .map(|cell| read_cell(cell, lineno))
            .collect::<TallyResult<Vec<Option<String>>>>()?;
        debug!("read_excel_survey: lineno: {:?} row: {:?}", lineno, &answers);
        builder
            .add_response_row(&answers)
            .context(SurveyDataSnafu {})?;
    }
    Ok(builder.build())
}

fn read_cell(cell: &DataType, lineno: u64) -> TallyResult<Option<String>> {
    match cell {
        DataType::String(s) if s.trim().is_empty() => Ok(None),
        DataType::String(s) => Ok(Some(s.clone())),
        DataType::Int(i) => Ok(Some(i.to_string())),
        // Integral floats are written without the decimal part, as the spreadsheets show them.
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
            Ok(Some(format!("{}", *f as i64)))
        }
        DataType::Float(f) => Ok(Some(f.to_string())),
        DataType::Bool(b) => Ok(Some(b.to_string())),
        DataType::Empty => Ok(None),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn get_range(path: &str, source: &SurveySource) -> TallyResult<calamine::Range<DataType>> {
    let worksheet_name_o = source.excel_worksheet_name.clone();
    debug!(
        "read_excel_survey: path: {:?} worksheet: {:?}",
        path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name.as_str(),
                path,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyFileSnafu { path }.fail(),
            [(worksheet_name, wrange)] => {
                debug!(
                    "read_excel_survey: path: {:?} worksheet: {:?}",
                    path, worksheet_name
                );
                Ok(wrange.clone())
            }
            [(worksheet_name, wrange), ..] => {
                warn!(
                    "read_excel_survey: {} worksheets in {:?}, using the first one: {:?}",
                    all_worksheets.len(),
                    path,
                    worksheet_name
                );
                Ok(wrange.clone())
            }
        }
    }
}
