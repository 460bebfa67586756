//! Data health profiling: missing values, distinct values, outliers and
//! duplicate rows.
//!
//! Outliers use one fixed heuristic. For a numeric column with at least four
//! parseable values, the sorted values give positional quartiles
//! `q1 = sorted[floor(n / 4)]` and `q3 = sorted[ceil(3n / 4)]` (no
//! interpolation), and any row whose value falls strictly outside
//! `[q1 - 1.5 * iqr, q3 + 1.5 * iqr]` is flagged by its index in the dataset.
//!
//! # Example
//!
//! ```rust
//! use term_lens::analyzers::{compute_health, infer_types};
//! use term_lens::dataset::{CellValue, Dataset};
//!
//! let dataset = Dataset::from_records(
//!     ["score"],
//!     [1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0, 250.0]
//!         .into_iter()
//!         .map(|v| vec![CellValue::from(v)])
//!         .collect(),
//! )
//! .unwrap();
//!
//! let health = compute_health(&dataset, &infer_types(&dataset));
//! let score = health.column("score").unwrap();
//! assert_eq!(score.outlier_row_indices, vec![7]);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::analyzers::inference::ColumnTypes;
use crate::dataset::{cell, CellValue, Dataset, Row};

/// Minimum number of numeric values before outliers are looked for.
pub const MIN_OUTLIER_SAMPLES: usize = 4;

/// Multiplier applied to the interquartile range.
pub const IQR_MULTIPLIER: f64 = 1.5;

/// Quartiles and fences for one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    /// Computes positional quartile fences, or `None` below
    /// [`MIN_OUTLIER_SAMPLES`] values.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n < MIN_OUTLIER_SAMPLES {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = sorted[n / 4];
        // ceil(3n / 4) stays below n whenever n >= 4
        let q3 = sorted[(3 * n + 3) / 4];
        let iqr = q3 - q1;

        Some(Self {
            q1,
            q3,
            iqr,
            lower: q1 - IQR_MULTIPLIER * iqr,
            upper: q3 + IQR_MULTIPLIER * iqr,
        })
    }

    /// Whether a value lies strictly outside the fences.
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Health counters for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnHealth {
    pub column: String,
    /// Null or empty-string cells
    pub missing_count: usize,
    /// Distinct stringified non-missing values
    pub unique_count: usize,
    /// Dataset row indices holding outliers, ascending
    pub outlier_row_indices: Vec<usize>,
    /// Fences used for outlier detection, when it ran
    pub outlier_bounds: Option<OutlierBounds>,
}

impl ColumnHealth {
    pub fn outlier_count(&self) -> usize {
        self.outlier_row_indices.len()
    }
}

/// Health of a whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetHealth {
    /// Per-column health, in column order
    pub columns: Vec<ColumnHealth>,
    /// Rows identical to an earlier row (first occurrences excluded)
    pub duplicate_row_count: usize,
}

impl DatasetHealth {
    /// Looks up the health of a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnHealth> {
        self.columns.iter().find(|c| c.column == name)
    }

    /// Sum of missing cells across all columns.
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing_count).sum()
    }

    /// Sum of flagged outliers across all columns.
    pub fn total_outliers(&self) -> usize {
        self.columns.iter().map(ColumnHealth::outlier_count).sum()
    }
}

/// Computes the health of every column plus the duplicate row count.
#[instrument(skip_all, fields(columns = dataset.column_count(), rows = dataset.row_count()))]
pub fn compute_health(dataset: &Dataset, types: &ColumnTypes) -> DatasetHealth {
    let duplicate_row_count = count_duplicate_rows(dataset);

    let columns: Vec<ColumnHealth> = dataset
        .columns()
        .iter()
        .map(|column| profile_column(dataset, column, types.is_numeric(column)))
        .collect();

    let health = DatasetHealth {
        columns,
        duplicate_row_count,
    };

    info!(
        duplicate_rows = health.duplicate_row_count,
        missing_cells = health.total_missing(),
        outliers = health.total_outliers(),
        "Computed data health"
    );

    health
}

/// Profiles one column. Outlier detection only runs when `numeric` is set.
pub fn profile_column(dataset: &Dataset, column: &str, numeric: bool) -> ColumnHealth {
    let mut missing_count = 0;
    let mut unique = HashSet::new();
    let mut values = Vec::new();

    for value in dataset.column_values(column) {
        if value.is_missing() {
            missing_count += 1;
            continue;
        }
        unique.insert(value.to_string());
        if numeric {
            if let Some(n) = value.parse_number() {
                values.push(n);
            }
        }
    }

    let outlier_bounds = OutlierBounds::from_values(&values);
    let outlier_row_indices: Vec<usize> = outlier_bounds
        .map(|bounds| {
            dataset
                .column_values(column)
                .enumerate()
                .filter_map(|(idx, value)| {
                    let n = value.parse_number()?;
                    bounds.is_outlier(n).then_some(idx)
                })
                .collect()
        })
        .unwrap_or_default();

    debug!(
        column,
        missing = missing_count,
        unique = unique.len(),
        outliers = ?outlier_row_indices,
        "Profiled column"
    );

    ColumnHealth {
        column: column.to_string(),
        missing_count,
        unique_count: unique.len(),
        outlier_row_indices,
        outlier_bounds,
    }
}

/// Counts rows that repeat an earlier row exactly.
pub fn count_duplicate_rows(dataset: &Dataset) -> usize {
    let mut seen = HashSet::with_capacity(dataset.row_count());
    dataset
        .rows()
        .iter()
        .filter(|row| !seen.insert(canonical_row_key(row, dataset.columns())))
        .count()
}

/// Encodes a row as a JSON array of `[column, value]` pairs in column order.
///
/// Absent keys encode as `null`, the same as an explicit `Null` cell.
pub fn canonical_row_key(row: &Row, columns: &[String]) -> String {
    let pairs: Vec<(&str, &CellValue)> = columns
        .iter()
        .map(|column| (column.as_str(), cell(row, column)))
        .collect();
    // Serializing strings, numbers and booleans cannot fail.
    serde_json::to_string(&pairs).unwrap_or_default()
}
