//! In-memory tabular data model.
//!
//! A [`Dataset`] is an ordered list of column names plus the rows read from one
//! source. Datasets are never mutated in place: a new upload replaces the old
//! dataset wholesale, and everything derived from it (column types, health,
//! filtered and grouped rows) is recomputed.

mod value;

pub use value::CellValue;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{LensError, Result};

/// One record, keyed by column name.
pub type Row = BTreeMap<String, CellValue>;

/// Looks up a cell, reading absent keys as `Null`.
pub fn cell<'a>(row: &'a Row, column: &str) -> &'a CellValue {
    row.get(column).unwrap_or(&value::NULL)
}

/// An ordered set of columns and the rows that share them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Creates a dataset from decoded rows.
    ///
    /// Fails with [`LensError::NoData`] when there are no columns. Row keys
    /// outside `columns` are dropped.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        if columns.is_empty() {
            return Err(LensError::NoData);
        }

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.retain(|key, _| columns.contains(key));
                row
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Creates a dataset from positional records, pairing each value with the
    /// header at the same index. Short records are padded with `Null`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use term_lens::dataset::{CellValue, Dataset};
    ///
    /// let dataset = Dataset::from_records(
    ///     ["region", "sales"],
    ///     vec![
    ///         vec![CellValue::from("north"), CellValue::from(120.0)],
    ///         vec![CellValue::from("south"), CellValue::from("95")],
    ///     ],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(dataset.row_count(), 2);
    /// assert_eq!(dataset.columns(), ["region", "sales"]);
    /// ```
    pub fn from_records<I, S>(columns: I, records: Vec<Vec<CellValue>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let rows = records
            .into_iter()
            .map(|record| {
                let mut values = record.into_iter();
                columns
                    .iter()
                    .map(|column| (column.clone(), values.next().unwrap_or_default()))
                    .collect::<Row>()
            })
            .collect();
        Self::new(columns, rows)
    }

    /// Column names in header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in source order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates the cells of one column in row order.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a CellValue> {
        self.rows.iter().map(move |row| cell(row, column))
    }

    /// Consumes the dataset, returning its columns and rows.
    pub fn into_parts(self) -> (Vec<String>, Vec<Row>) {
        (self.columns, self.rows)
    }
}
