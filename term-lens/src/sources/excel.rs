//! Spreadsheet decoding (`.xlsx` and `.xls`) via calamine.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveTime;
use tracing::{debug, instrument};

use crate::dataset::{CellValue, Dataset, Row};
use crate::error::{LensError, Result};

/// Decodes the first worksheet of a workbook.
///
/// The first row of the sheet's used range is the header. Header cells that
/// are empty are named `column_N` after their 1-based position.
#[instrument(skip_all, fields(bytes = bytes.len()))]
pub fn decode_excel(bytes: &[u8]) -> Result<Dataset> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let sheet_name = workbook.sheet_names().first().cloned().unwrap_or_default();
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LensError::NoData)??;

    let mut sheet_rows = range.rows();
    let Some(header) = sheet_rows.next() else {
        return Err(LensError::NoData);
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, value)| match sheet_cell(value) {
            CellValue::Null => format!("column_{}", i + 1),
            other => other.to_string(),
        })
        .collect();

    let rows: Vec<Row> = sheet_rows
        .map(|record| {
            columns
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let value = record.get(i).map(sheet_cell).unwrap_or_default();
                    (column.clone(), value)
                })
                .collect()
        })
        .collect();

    debug!(sheet = %sheet_name, columns = columns.len(), rows = rows.len(), "Decoded worksheet");

    Dataset::new(columns, rows)
}

fn sheet_cell(value: &Data) -> CellValue {
    match value {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(dt) if dt.time() == NaiveTime::MIN => {
                CellValue::Text(dt.format("%Y-%m-%d").to_string())
            }
            Some(dt) => CellValue::Text(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_conversion() {
        assert_eq!(sheet_cell(&Data::Empty), CellValue::Null);
        assert_eq!(sheet_cell(&Data::Int(7)), CellValue::from(7.0));
        assert_eq!(sheet_cell(&Data::Float(2.5)), CellValue::from(2.5));
        assert_eq!(sheet_cell(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(
            sheet_cell(&Data::String("north".to_string())),
            CellValue::from("north")
        );
        assert_eq!(
            sheet_cell(&Data::DateTimeIso("2024-01-02".to_string())),
            CellValue::from("2024-01-02")
        );
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(decode_excel(b"definitely not a workbook").is_err());
    }
}
