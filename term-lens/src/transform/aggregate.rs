//! Group-by aggregation.
//!
//! Rows are partitioned by the stringified value of the group column and each
//! measure column is reduced per group with [`AggregateFn`]. Groups come out in
//! the order their key was first seen. Cells that do not parse as numbers
//! contribute 0 to sums and averages.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::{cell, CellValue, Row};
use crate::error::LensError;

/// Reduction applied to a measure column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFn {
    #[default]
    Sum,
    Avg,
    Count,
}

impl AggregateFn {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFn::Sum => "sum",
            AggregateFn::Avg => "avg",
            AggregateFn::Count => "count",
        }
    }

    fn reduce(&self, rows: &[&Row], column: &str) -> f64 {
        let sum = || -> f64 {
            rows.iter()
                .map(|row| cell(row, column).parse_number().unwrap_or(0.0))
                .sum()
        };
        match self {
            AggregateFn::Sum => sum(),
            AggregateFn::Avg if rows.is_empty() => 0.0,
            AggregateFn::Avg => sum() / rows.len() as f64,
            AggregateFn::Count => rows.len() as f64,
        }
    }
}

impl fmt::Display for AggregateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregateFn {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(AggregateFn::Sum),
            "avg" | "average" | "mean" => Ok(AggregateFn::Avg),
            "count" => Ok(AggregateFn::Count),
            other => Err(LensError::Configuration(format!(
                "Unknown aggregate function '{other}' (expected sum, avg or count)"
            ))),
        }
    }
}

/// Group column, measures, and the reduction per measure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    /// Column to group by. `None` or an empty name disables grouping.
    pub group_by: Option<String>,
    /// Reduction per measure column. Measures not listed use `sum`.
    #[serde(default)]
    pub functions: HashMap<String, AggregateFn>,
    /// Measure columns, in output order.
    #[serde(default)]
    pub measures: Vec<String>,
}

impl AggregationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups by the given column.
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by = Some(column.into());
        self
    }

    /// Adds a measure column using the default reduction.
    pub fn measure(mut self, column: impl Into<String>) -> Self {
        self.measures.push(column.into());
        self
    }

    /// Adds a measure column with an explicit reduction.
    pub fn measure_with(mut self, column: impl Into<String>, function: AggregateFn) -> Self {
        let column = column.into();
        self.functions.insert(column.clone(), function);
        self.measures.push(column);
        self
    }

    /// The grouping column, if grouping is active.
    pub fn active_group(&self) -> Option<&str> {
        self.group_by.as_deref().filter(|c| !c.is_empty())
    }

    pub fn function_for(&self, column: &str) -> AggregateFn {
        self.functions.get(column).copied().unwrap_or_default()
    }

    /// Runs [`group_and_aggregate`] with this spec.
    pub fn apply<'a>(&self, rows: &'a [Row]) -> Cow<'a, [Row]> {
        group_and_aggregate(rows, self.active_group(), &self.functions, &self.measures)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Missing,
    Value(String),
}

impl GroupKey {
    fn of(value: &CellValue) -> Self {
        if value.is_missing() {
            GroupKey::Missing
        } else {
            GroupKey::Value(value.to_string())
        }
    }

    fn into_cell(self) -> CellValue {
        match self {
            GroupKey::Missing => CellValue::Null,
            GroupKey::Value(key) => CellValue::Text(key),
        }
    }
}

/// Groups rows and reduces each measure column per group.
///
/// Without a group column (`None` or `""`) the input is returned as is. Every
/// missing group value (null or empty) falls into one group whose key is
/// emitted as `Null`.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
/// use term_lens::dataset::{cell, CellValue, Dataset};
/// use term_lens::transform::{group_and_aggregate, AggregateFn};
///
/// let data = Dataset::from_records(
///     ["g", "v"],
///     vec![
///         vec![CellValue::from("a"), CellValue::from("10")],
///         vec![CellValue::from("a"), CellValue::from("20")],
///         vec![CellValue::from("b"), CellValue::from("x")],
///     ],
/// )
/// .unwrap();
///
/// let functions = HashMap::from([("v".to_string(), AggregateFn::Avg)]);
/// let grouped = group_and_aggregate(data.rows(), Some("g"), &functions, &["v".to_string()]);
///
/// assert_eq!(cell(&grouped[0], "v"), &CellValue::from(15.0));
/// assert_eq!(cell(&grouped[1], "v"), &CellValue::from(0.0));
/// ```
pub fn group_and_aggregate<'a>(
    rows: &'a [Row],
    group_by: Option<&str>,
    functions: &HashMap<String, AggregateFn>,
    measures: &[String],
) -> Cow<'a, [Row]> {
    let Some(group_column) = group_by.filter(|c| !c.is_empty()) else {
        return Cow::Borrowed(rows);
    };

    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<(GroupKey, Vec<&Row>)> = Vec::new();
    for row in rows {
        let key = GroupKey::of(cell(row, group_column));
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(row),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![row]));
            }
        }
    }

    debug!(
        group_by = group_column,
        groups = groups.len(),
        measures = measures.len(),
        "Grouped rows"
    );

    let output = groups
        .into_iter()
        .map(|(key, members)| {
            let mut out = Row::new();
            out.insert(group_column.to_string(), key.into_cell());
            // A measure named like the group column replaces the key.
            for measure in measures {
                let function = functions.get(measure).copied().unwrap_or_default();
                out.insert(
                    measure.clone(),
                    CellValue::Number(function.reduce(&members, measure)),
                );
            }
            out
        })
        .collect();

    Cow::Owned(output)
}
