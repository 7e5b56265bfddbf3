/*!

This is the long-form manual for `survey_aggregation` and `surveytab`.

## Survey exports

The survey tools (LinkedIn polls, Microsoft Forms, Google Forms) export one row
per respondent and one column per question. The first row contains the text of
the questions:

```text
Respondent,5. How do you rate the initial investment cost?,15. What technologies will most influence USV adoption next?
r1,Much lower,AIS;Sonar
r2,,Sonar
r3,Much higher,"AIS; Lidar;"
```

The headers are normalized before being matched against the questions of the
configuration: the non-breaking spaces become spaces, the typography is cleaned
(see below), and the question number (`5. `, `Q5 `, `5) `) is removed.

An empty cell means that the respondent skipped the question.

## Labels

The answers are compared after cleaning:
- the text is put in the composed Unicode form (NFC),
- the curly quotes become `'` and `"`,
- the dashes (en dash `–`, em dash `—`, minus sign `−`, ...) become `-`,
- the non-breaking spaces become spaces,
- the surrounding whitespace is removed.

So `10–25% savings` and `10-25% savings` are the same answer. The declared
orders and the color mappings are cleaned the same way.

## Question kinds

### `singleChoice`

One answer per respondent. Without a declared `order`, the answers are sorted by
decreasing count, ties in the order in which the answers first appear.

With an `order`, the table contains only the declared categories, in the
declared order. Answers outside of the declared categories are not counted.
The categories that received no answer are left out, unless `zeroFill` is set,
in which case they appear with a count of 0.

### `multiChoice`

Several answers in one cell, joined by the `delimiter` (`;` by default). Every
selected option is counted, even when it is repeated in the cell. Empty parts (`"AIS;"`,
`"AIS;;Sonar"`) are ignored, and a cell with no option is a skipped question.

### `combination`

Same input as `multiChoice`, but the full set of options picked by a
respondent is counted as one answer. The options are sorted and joined with
`"; "`: `"Sonar;AIS"` and `"AIS;Sonar"` are both counted as `"AIS; Sonar"`.

## Long tail

Questions with an "Other" option collect free-text answers that are typically
long and unique. With `longTail`, an answer is merged into the
`"Other (open-text)"` bucket when its count is at most `maxCount` (default 1)
and it has more than `maxLength` characters. The merged answers are listed in
`otherResponses` in the summary. The total count is unchanged.

## Configuration

```text
{
  "outputSettings": { "surveyName": "usv_survey", "outputDirectory": "out" },
  "surveySource": {
    "provider": "csv",
    "filePath": "usv_survey_data.csv",
    "encoding": "windows-1252"
  },
  "questions": [
    {
      "text": "How do maintenance costs compare between USVs and conventional vessels?",
      "title": "Q7. Maintenance costs",
      "kind": "singleChoice",
      "order": ["Much lower", "About the same", "Much higher"],
      "colors": { "Much lower": "#636EFA", "About the same": "#EF476F", "Much higher": "#00B6AD" }
    },
    {
      "text": "What technologies will most influence USV adoption next?",
      "kind": "multiChoice",
      "wrapWidth": 25,
      "longTail": { "maxLength": 50 }
    }
  ]
}
```

`surveySource`:
 - `provider`: `csv` or `xlsx`.
 - `filePath`: relative to the directory of the configuration file.
 - `encoding` (optional): the encoding used when the file is not valid UTF-8.
   Defaults to `windows-1252`, which also covers ISO-8859-1 exports.
 - `csvDelimiter` (optional): the field delimiter of the CSV file (default `,`).
 - `excelWorksheetName` (optional): for workbooks with more than one worksheet.

Questions:
 - `text`: the text of the question, as in the header.
 - `title` (optional): the title displayed in the summary.
 - `kind`: `singleChoice`, `multiChoice` or `combination`.
 - `order`, `zeroFill` (optional, `singleChoice` only).
 - `delimiter` (optional, `multiChoice` and `combination` only).
 - `longTail` (optional): `maxLength` and `maxCount`.
 - `wrapWidth` (optional): adds a `display` label cut every `wrapWidth`
   characters with `<br>`.
 - `colors` (optional): a color (`#RGB` or `#RRGGBB`) for each label. When
   present, every label of the table must have a color, including
   `Other (open-text)`: an unmapped label is an error. For `combination`
   questions, the options of a key may be written in any order: `"Sonar; AIS"`
   colors the label `"AIS; Sonar"`.

 */
