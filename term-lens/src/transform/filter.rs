//! Row filtering by per-column predicates.
//!
//! A [`FilterSpec`] holds at most one [`ColumnFilter`] per column. Numeric
//! columns take a [`ColumnFilter::Range`]; every other column takes a
//! [`ColumnFilter::Categorical`] selection. A filter whose kind does not match
//! the column's inferred type imposes no constraint, and a row must pass every
//! active filter to be kept.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzers::inference::ColumnTypes;
use crate::dataset::{cell, Row};

/// Predicate for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnFilter {
    // Must precede `Range` for untagged decoding.
    /// Allowed stringified values. An empty set allows everything.
    Categorical { selected: BTreeSet<String> },
    /// Inclusive bounds for numeric columns. Unset bounds are open.
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
}

impl ColumnFilter {
    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self::Range { min, max }
    }

    pub fn selected<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Categorical {
            selected: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Tests one cell against the filter, given whether its column is numeric.
    fn accepts(&self, row: &Row, column: &str, numeric: bool) -> bool {
        match self {
            ColumnFilter::Range { min, max } if numeric => {
                // Unparseable cells compare as NaN, which fails every bound.
                let value = cell(row, column).parse_number().unwrap_or(f64::NAN);
                min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
            }
            ColumnFilter::Categorical { selected } if !numeric && !selected.is_empty() => {
                selected.contains(&cell(row, column).to_string())
            }
            _ => true,
        }
    }
}

/// Filters to apply, keyed by column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec {
    filters: BTreeMap<String, ColumnFilter>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a range filter.
    pub fn with_range(
        mut self,
        column: impl Into<String>,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Self {
        self.set(column, ColumnFilter::range(min, max));
        self
    }

    /// Adds or replaces a categorical selection.
    pub fn with_selection<I, S>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(column, ColumnFilter::selected(values));
        self
    }

    pub fn set(&mut self, column: impl Into<String>, filter: ColumnFilter) {
        self.filters.insert(column.into(), filter);
    }

    /// Removes the filter on a column, returning it.
    pub fn remove(&mut self, column: &str) -> Option<ColumnFilter> {
        self.filters.remove(column)
    }

    pub fn get(&self, column: &str) -> Option<&ColumnFilter> {
        self.filters.get(column)
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnFilter)> {
        self.filters.iter().map(|(c, f)| (c.as_str(), f))
    }

    /// Whether a row passes every filter.
    pub fn matches(&self, row: &Row, types: &ColumnTypes) -> bool {
        self.filters
            .iter()
            .all(|(column, filter)| filter.accepts(row, column, types.is_numeric(column)))
    }
}

/// Keeps the rows that pass every filter, in their original order.
///
/// An empty spec returns the input as is, without copying.
pub fn apply_filters<'a>(
    rows: &'a [Row],
    spec: &FilterSpec,
    types: &ColumnTypes,
) -> Cow<'a, [Row]> {
    if spec.is_empty() {
        return Cow::Borrowed(rows);
    }

    let kept: Vec<Row> = rows
        .iter()
        .filter(|row| spec.matches(row, types))
        .cloned()
        .collect();

    debug!(
        filters = spec.len(),
        input_rows = rows.len(),
        kept_rows = kept.len(),
        "Applied filters"
    );

    Cow::Owned(kept)
}
