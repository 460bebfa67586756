//! Chart-ready projections of the pipeline output.
//!
//! Nothing here renders. A [`ChartSelection`] names the X column, one or more
//! Y series, and the chart kind; the functions below reshape rows into what a
//! line, bar or pie renderer consumes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::{cell, Row};
use crate::error::LensError;

/// Rows shown by [`preview`] unless configured otherwise.
pub const PREVIEW_ROWS: usize = 10;

/// Series palette, cycled by series index.
pub const COLORS: [&str; 6] = [
    "#0d6efd", "#198754", "#dc3545", "#ffc107", "#6610f2", "#20c997",
];

/// Color for the series at `index`.
pub fn series_color(index: usize) -> &'static str {
    COLORS[index % COLORS.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Pie,
}

impl ChartKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartKind {
    type Err = LensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(ChartKind::Line),
            "bar" => Ok(ChartKind::Bar),
            "pie" => Ok(ChartKind::Pie),
            other => Err(LensError::Configuration(format!(
                "Unknown chart type '{other}' (expected line, bar or pie)"
            ))),
        }
    }
}

/// Axis and series choice for one chart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChartSelection {
    pub x: String,
    pub y: Vec<String>,
    #[serde(default)]
    pub kind: ChartKind,
}

impl ChartSelection {
    /// Default selection for a header list: the first column on X, the second
    /// (if any) as the only series, drawn as a line chart.
    pub fn for_columns(columns: &[String]) -> Self {
        Self {
            x: columns.first().cloned().unwrap_or_default(),
            y: columns.get(1).cloned().into_iter().collect(),
            kind: ChartKind::Line,
        }
    }

    pub fn with_x(mut self, column: impl Into<String>) -> Self {
        self.x = column.into();
        self
    }

    pub fn with_y<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.y = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_kind(mut self, kind: ChartKind) -> Self {
        self.kind = kind;
        self
    }

    /// True when there is nothing to plot.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty()
    }
}

/// Reduces each row to the X column and the selected series.
pub fn project_rows(rows: &[Row], selection: &ChartSelection) -> Vec<Row> {
    rows.iter()
        .map(|row| {
            let mut out = Row::new();
            out.insert(selection.x.clone(), cell(row, &selection.x).clone());
            for series in &selection.y {
                out.insert(series.clone(), cell(row, series).clone());
            }
            out
        })
        .collect()
}

/// One pie wedge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
    pub color: String,
}

/// Totals each selected series over all rows. Unparseable cells count as 0.
pub fn pie_totals(rows: &[Row], selection: &ChartSelection) -> Vec<PieSlice> {
    selection
        .y
        .iter()
        .enumerate()
        .map(|(i, series)| PieSlice {
            name: series.clone(),
            value: rows
                .iter()
                .map(|row| cell(row, series).parse_number().unwrap_or(0.0))
                .sum(),
            color: series_color(i).to_string(),
        })
        .collect()
}

/// The head of a table plus its full length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPreview {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub total_rows: usize,
}

impl DataPreview {
    pub fn is_truncated(&self) -> bool {
        self.total_rows > self.rows.len()
    }

    /// "Showing first N of M rows", when rows were cut.
    pub fn footer(&self) -> Option<String> {
        self.is_truncated()
            .then(|| format!("Showing first {} of {} rows", self.rows.len(), self.total_rows))
    }
}

/// Takes the first `limit` rows.
pub fn preview(columns: &[String], rows: &[Row], limit: usize) -> DataPreview {
    DataPreview {
        columns: columns.to_vec(),
        rows: rows.iter().take(limit).cloned().collect(),
        total_rows: rows.len(),
    }
}
