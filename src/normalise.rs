//! Normalises a completed drill's tabular payload.
//!
//! The server hands back csv with full timestamps in whatever order the
//! underlying rasters were read. Downstream tooling wants one tidy file
//! per site: rows ascending by date, dates plain `YYYY-MM-DD`.

use std::path::Path;

use chrono::{DateTime, NaiveDate};
use csv::{ReaderBuilder, StringRecord, Writer};

use crate::error::{Result, SmipsError};
use crate::wps::ProcessOutput;

/// Identifier of the output channel carrying the table.
pub const CSV_OUTPUT: &str = "csv";

/// Name of the date column in server payloads.
const COL_DATE: &str = "date";

/// Format of timestamps in server payloads.
const SERVER_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Format dates are written out in.
const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A normalised table: one header plus rows sorted ascending by date.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl TimeSeries {
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    /// Writes the table as csv, replacing any existing file.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        Ok(())
    }
}

/// Selects the `csv` channel among a completed job's outputs and
/// normalises it.
pub fn normalise(process: &str, outputs: &[ProcessOutput]) -> Result<TimeSeries> {
    let output = outputs
        .iter()
        .find(|output| output.identifier == CSV_OUTPUT)
        .ok_or_else(|| SmipsError::MissingOutput {
            process: process.to_string(),
            channel: CSV_OUTPUT.to_string(),
        })?;

    normalise_text(&output.text())
}

fn normalise_text(text: &str) -> Result<TimeSeries> {
    let mut reader = ReaderBuilder::new().from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let date_col = headers
        .iter()
        .position(|header| header == COL_DATE)
        .ok_or_else(|| SmipsError::MalformedPayload {
            reason: format!("no `{}` column", COL_DATE),
        })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?);
    }

    // Raw server timestamps share one format per feed, so they sort
    // correctly as strings; the sort is stable, ties keep server order.
    rows.sort_by(|a, b| a[date_col].cmp(&b[date_col]));

    for row in rows.iter_mut() {
        let canonical = canonical_date(&row[date_col])?;
        *row = replace_field(row, date_col, &canonical);
    }

    Ok(TimeSeries { headers, rows })
}

/// Rewrites a server timestamp as `YYYY-MM-DD`. Values already in that
/// form pass through, so normalising a second time changes nothing.
fn canonical_date(raw: &str) -> Result<String> {
    if let Ok(timestamp) = DateTime::parse_from_str(raw, SERVER_DATE_FORMAT) {
        return Ok(timestamp.format(OUTPUT_DATE_FORMAT).to_string());
    }

    if NaiveDate::parse_from_str(raw, OUTPUT_DATE_FORMAT).is_ok() {
        return Ok(raw.to_string());
    }

    Err(SmipsError::DateFormat {
        value: raw.to_string(),
    })
}

fn replace_field(row: &StringRecord, index: usize, value: &str) -> StringRecord {
    row.iter()
        .enumerate()
        .map(|(i, field)| if i == index { value } else { field })
        .collect()
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn channel(identifier: &str, data: &str) -> ProcessOutput {
        ProcessOutput {
            identifier: identifier.to_string(),
            chunks: vec![data.to_string()],
        }
    }

    #[test]
    fn should_select_csv_channel_sort_rows_and_rewrite_dates() {
        let outputs = vec![
            channel("stats", "irrelevant"),
            channel(
                "csv",
                "date,value\n2021-03-02T00:00:00+0000,5\n2021-03-01T00:00:00+0000,3\n",
            ),
        ];

        let table = normalise("temporalDrill", &outputs).unwrap();

        assert_eq!(
            table.headers().iter().collect::<Vec<_>>(),
            vec!["date", "value"]
        );
        assert_eq!(table.rows().len(), 2);
        assert_eq!(&table.rows()[0][0], "2021-03-01");
        assert_eq!(&table.rows()[0][1], "3");
        assert_eq!(&table.rows()[1][0], "2021-03-02");
        assert_eq!(&table.rows()[1][1], "5");
    }

    #[test]
    fn should_fail_when_csv_channel_is_missing() {
        let outputs = vec![channel("stats", "irrelevant")];

        match normalise("temporalDrill", &outputs) {
            Err(SmipsError::MissingOutput { process, channel }) => {
                assert_eq!(process, "temporalDrill");
                assert_eq!(channel, "csv");
            }
            other => panic!("expected missing output, got {:?}", other),
        }
    }

    #[test]
    fn should_concatenate_chunks_before_parsing() {
        let outputs = vec![ProcessOutput {
            identifier: "csv".to_string(),
            chunks: vec![
                "date,value\n".to_string(),
                "2021-03-01T00:00:00+0000,3\n".to_string(),
                "2021-03-02T00:00:00+0000,5\n".to_string(),
            ],
        }];

        let table = normalise("temporalDrill", &outputs).unwrap();

        assert_eq!(table.rows().len(), 2);
        assert_eq!(&table.rows()[0][0], "2021-03-01");
    }

    #[test]
    fn should_leave_already_normalised_tables_unchanged() {
        let outputs = vec![channel("csv", "date,value\n2021-03-01,3\n2021-03-02,5\n")];

        let table = normalise("temporalDrill", &outputs).unwrap();

        assert_eq!(table.rows().len(), 2);
        assert_eq!(&table.rows()[0][0], "2021-03-01");
        assert_eq!(&table.rows()[0][1], "3");
        assert_eq!(&table.rows()[1][0], "2021-03-02");
        assert_eq!(&table.rows()[1][1], "5");
    }

    #[test]
    fn should_order_rows_non_decreasing_with_stable_ties() {
        let outputs = vec![channel(
            "csv",
            "date,value\n\
             2021-03-03T00:00:00+0000,9\n\
             2021-03-01T00:00:00+0000,1\n\
             2021-03-01T00:00:00+0000,2\n\
             2021-03-02T00:00:00+0000,4\n",
        )];

        let table = normalise("temporalDrill", &outputs).unwrap();

        for pair in table.rows().windows(2) {
            let earlier = &pair[0][0];
            let later = &pair[1][0];
            assert!(earlier <= later);
        }
        // The two 2021-03-01 rows keep their server order.
        assert_eq!(&table.rows()[0][1], "1");
        assert_eq!(&table.rows()[1][1], "2");
    }

    #[test]
    fn should_keep_other_columns_untouched() {
        let outputs = vec![channel(
            "csv",
            "date,sm,et\n2021-03-02T00:00:00+0000,0.5,1.2\n2021-03-01T00:00:00+0000,0.4,1.1\n",
        )];

        let table = normalise("temporalDrill", &outputs).unwrap();

        assert_eq!(&table.rows()[0][1], "0.4");
        assert_eq!(&table.rows()[0][2], "1.1");
        assert_eq!(&table.rows()[1][1], "0.5");
        assert_eq!(&table.rows()[1][2], "1.2");
    }

    #[test]
    fn should_accept_header_only_payload() {
        let outputs = vec![channel("csv", "date,value\n")];

        let table = normalise("temporalDrill", &outputs).unwrap();

        assert!(table.rows().is_empty());
    }

    #[test]
    fn should_fail_without_date_column() {
        let outputs = vec![channel("csv", "time,value\n2021-03-01,3\n")];

        assert!(matches!(
            normalise("temporalDrill", &outputs),
            Err(SmipsError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn should_fail_on_empty_payload() {
        let outputs = vec![channel("csv", "")];

        assert!(matches!(
            normalise("temporalDrill", &outputs),
            Err(SmipsError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn should_fail_on_ragged_rows() {
        let outputs = vec![channel("csv", "date,value\n2021-03-01T00:00:00+0000\n")];

        assert!(matches!(
            normalise("temporalDrill", &outputs),
            Err(SmipsError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn should_fail_on_unrecognised_date() {
        let outputs = vec![channel("csv", "date,value\n01 March 2021,3\n")];

        match normalise("temporalDrill", &outputs) {
            Err(SmipsError::DateFormat { value }) => assert_eq!(value, "01 March 2021"),
            other => panic!("expected date format error, got {:?}", other),
        }
    }

    #[test]
    fn should_write_csv_file() {
        let outputs = vec![channel(
            "csv",
            "date,value\n2021-03-02T00:00:00+0000,5\n2021-03-01T00:00:00+0000,3\n",
        )];
        let table = normalise("temporalDrill", &outputs).unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.csv");
        table.write_csv(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "date,value\n2021-03-01,3\n2021-03-02,5\n");
    }

    #[test]
    fn should_replace_existing_file_on_rewrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.csv");

        let first = normalise(
            "temporalDrill",
            &[channel("csv", "date,value\n2021-03-01T00:00:00+0000,3\n")],
        )
        .unwrap();
        first.write_csv(&path).unwrap();

        let second = normalise(
            "temporalDrill",
            &[channel("csv", "date,value\n2021-03-02T00:00:00+0000,5\n")],
        )
        .unwrap();
        second.write_csv(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "date,value\n2021-03-02,5\n");
    }
}
