//! CSV Data Loader Module
//! Reads the activity table with Polars and converts each row into a `Record`.

use super::record::Record;
use super::source::{SourceError, SourceLocation};
use polars::prelude::*;
use std::io::Cursor;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Failed to parse CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Required column '{0}' not found")]
    MissingColumn(String),
}

/// Header names of the six required columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub status: String,
    pub region_code: String,
    pub region_name: String,
    pub category: String,
    pub period: String,
    pub value: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            status: "STATUS".to_string(),
            region_code: "GEOGRAPHY_CODE".to_string(),
            region_name: "GEOGRAPHY_NAME".to_string(),
            category: "AGE_BAND".to_string(),
            period: "YEAR_MONTH".to_string(),
            value: "VALUE".to_string(),
        }
    }
}

/// Records parsed from one table, plus row accounting for the status line.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub records: Vec<Record>,
    pub row_count: usize,
}

impl LoadedTable {
    pub fn dropped_rows(&self) -> usize {
        self.row_count - self.records.len()
    }
}

/// Handles CSV loading with Polars.
pub struct DataLoader {
    columns: ColumnNames,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(ColumnNames::default())
    }
}

impl DataLoader {
    pub fn new(columns: ColumnNames) -> Self {
        Self { columns }
    }

    /// Fetch and parse the table at `location`.
    pub fn load(&self, location: &SourceLocation) -> Result<LoadedTable, LoaderError> {
        info!(source = %location, "Loading activity table");
        let bytes = location.fetch()?;
        let table = self.parse_csv(bytes)?;
        info!(
            rows = table.row_count,
            records = table.records.len(),
            dropped = table.dropped_rows(),
            "Activity table loaded"
        );
        Ok(table)
    }

    /// Parse raw CSV bytes. Every column is read as text so that malformed
    /// numeric cells become per-field fallbacks instead of whole-load errors.
    /// Lines the tokenizer rejects are dropped and counted, not fatal.
    pub fn parse_csv(&self, bytes: Vec<u8>) -> Result<LoadedTable, LoaderError> {
        let (df, rejected) = match read_frame(&bytes) {
            Ok(df) => (df, 0),
            Err(e) => {
                warn!(error = %e, "CSV did not parse cleanly, retrying line by line");
                read_frame_tolerant(&bytes)?
            }
        };

        let status = self.required_column(&df, &self.columns.status)?;
        let region_code = self.required_column(&df, &self.columns.region_code)?;
        let region_name = self.required_column(&df, &self.columns.region_name)?;
        let category = self.required_column(&df, &self.columns.category)?;
        let period = self.required_column(&df, &self.columns.period)?;
        let value = self.required_column(&df, &self.columns.value)?;

        let row_count = df.height() + rejected;
        let records: Vec<Record> = (0..df.height())
            .filter_map(|i| {
                let record = Record::from_cells(
                    cell_text(status, i).as_deref(),
                    cell_text(region_code, i).as_deref(),
                    cell_text(region_name, i).as_deref(),
                    cell_text(category, i).as_deref(),
                    cell_text(period, i).as_deref(),
                    cell_text(value, i).as_deref(),
                );
                if record.is_none() {
                    debug!(row = i, "Dropping empty row");
                }
                record
            })
            .collect();

        Ok(LoadedTable { records, row_count })
    }

    fn required_column<'a>(
        &self,
        df: &'a DataFrame,
        name: &str,
    ) -> Result<&'a Column, LoaderError> {
        df.column(name)
            .map_err(|_| LoaderError::MissingColumn(name.to_string()))
    }
}

fn read_frame(bytes: &[u8]) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_ignore_errors(true)
        .map_parse_options(|opts| opts.with_truncate_ragged_lines(true))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
}

/// Re-read keeping only the data lines that tokenize on their own. Quoted
/// fields may not span lines here, so an odd quote count rejects a line.
fn read_frame_tolerant(bytes: &[u8]) -> PolarsResult<(DataFrame, usize)> {
    let text = String::from_utf8_lossy(bytes);
    let mut lines = text.lines();
    let header = lines.next().unwrap_or_default();

    let mut kept = format!("{}\n", header);
    let mut rejected = 0;
    for (i, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let balanced = line.matches('"').count() % 2 == 0;
        if balanced && read_frame(format!("{}\n{}\n", header, line).as_bytes()).is_ok() {
            kept.push_str(line);
            kept.push('\n');
        } else {
            debug!(line = i + 2, "Dropping malformed line");
            rejected += 1;
        }
    }

    let df = read_frame(kept.as_bytes())?;
    Ok((df, rejected))
}

/// Text of one cell; `None` for nulls.
fn cell_text(column: &Column, row: usize) -> Option<String> {
    match column.get(row).ok()? {
        AnyValue::Null => None,
        AnyValue::String(s) => Some(s.to_string()),
        other => Some(other.to_string().trim_matches('"').to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::{Category, StatusFlag};

    const HEADER: &str = "STATUS,GEOGRAPHY_CODE,GEOGRAPHY_NAME,AGE_BAND,YEAR_MONTH,VALUE\n";

    fn parse(body: &str) -> Result<LoadedTable, LoaderError> {
        DataLoader::default().parse_csv(format!("{}{}", HEADER, body).into_bytes())
    }

    #[test]
    fn test_parse_rows_into_records() {
        let table = parse(
            "Final,A,Alpha,Adult,202401,100\n\
             Provisional,B,Beta,Child,202402,7.5\n",
        )
        .unwrap();

        assert_eq!(table.row_count, 2);
        assert_eq!(table.records.len(), 2);

        let first = &table.records[0];
        assert_eq!(first.status, StatusFlag::Final);
        assert_eq!(first.region_code.as_deref(), Some("A"));
        assert_eq!(first.region_name.as_deref(), Some("Alpha"));
        assert_eq!(first.category, Some(Category::Adult));
        assert_eq!(first.period, Some(202401));
        assert_eq!(first.value, 100.0);

        let second = &table.records[1];
        assert!(!second.is_final());
        assert_eq!(second.value, 7.5);
    }

    #[test]
    fn test_malformed_cells_fall_back() {
        let table = parse("Final,A,Alpha,Adult,not-a-month,*\n").unwrap();
        let record = &table.records[0];
        assert_eq!(record.period, None);
        assert_eq!(record.value, 0.0);
    }

    #[test]
    fn test_empty_rows_dropped() {
        let table = parse("Final,A,Alpha,Adult,202401,1\n,,,,,\n").unwrap();
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.dropped_rows(), table.row_count - 1);
    }

    #[test]
    fn test_stray_quote_drops_only_that_line() {
        let table = parse(
            "Final,A,Alpha,Adult,202401,5\n\
             Final,B,\"Beta,Adult,202401,6\n\
             Final,C,Gamma,Adult,202401,7\n",
        )
        .unwrap();

        let codes: Vec<_> = table
            .records
            .iter()
            .map(|r| r.region_code.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(codes, vec!["A", "C"]);
        assert_eq!(table.row_count, 3);
        assert_eq!(table.dropped_rows(), 1);
        assert_eq!(table.records[1].value, 7.0);
    }

    #[test]
    fn test_custom_column_names() {
        let columns = ColumnNames {
            status: "s".to_string(),
            region_code: "geo".to_string(),
            region_name: "name".to_string(),
            category: "age".to_string(),
            period: "period".to_string(),
            value: "value".to_string(),
        };
        let csv = "s,geo,name,age,period,value\nFinal,A,Alpha,Child,202401,3\n";
        let table = DataLoader::new(columns)
            .parse_csv(csv.as_bytes().to_vec())
            .unwrap();
        assert_eq!(table.records[0].category, Some(Category::Child));
    }

    #[test]
    fn test_missing_column_fails_load() {
        let csv = "STATUS,GEOGRAPHY_CODE\nFinal,A\n";
        let err = DataLoader::default()
            .parse_csv(csv.as_bytes().to_vec())
            .unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn(ref c) if c == "GEOGRAPHY_NAME"));
    }
}
