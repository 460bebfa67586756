//! Rendering data health summaries.
//!
//! A [`HealthReport`] joins a dataset's column types with its health counters.
//! [`HumanFormatter`] renders it for terminals, [`JsonFormatter`] for tools and
//! [`MarkdownFormatter`] for documents.
//!
//! # Examples
//!
//! ```rust
//! use term_lens::analyzers::{compute_health, infer_types};
//! use term_lens::dataset::{CellValue, Dataset};
//! use term_lens::formatters::{HealthFormatter, HealthReport, MarkdownFormatter};
//!
//! let dataset = Dataset::from_records(
//!     ["city"],
//!     vec![vec![CellValue::from("Oslo")], vec![CellValue::Null]],
//! )
//! .unwrap();
//! let types = infer_types(&dataset);
//! let health = compute_health(&dataset, &types);
//!
//! let report = HealthReport::new("cities.csv", &dataset, &types, &health);
//! let markdown = MarkdownFormatter::new().format(&report).unwrap();
//! assert!(markdown.contains("| city | categorical | 1 | 1 | 0 |"));
//! ```

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::{ColumnType, ColumnTypes, DatasetHealth};
use crate::dataset::Dataset;
use crate::error::{LensError, Result};
use crate::pipeline::PipelineSnapshot;

/// Configuration options for formatting health reports.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include the per-column breakdown
    pub include_columns: bool,
    /// List the row indices of outliers, not just their count
    pub include_outlier_rows: bool,
    /// Maximum number of columns to display (None for all)
    pub max_columns: Option<usize>,
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
    /// Whether to include the report timestamp
    pub include_timestamps: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_columns: true,
            include_outlier_rows: false,
            max_columns: None,
            use_colors: true,
            include_timestamps: true,
        }
    }
}

impl FormatterConfig {
    /// Dataset totals only.
    pub fn minimal() -> Self {
        Self {
            include_columns: false,
            include_outlier_rows: false,
            max_columns: Some(0),
            use_colors: true,
            include_timestamps: false,
        }
    }

    /// Everything, including outlier row indices.
    pub fn detailed() -> Self {
        Self {
            include_outlier_rows: true,
            ..Self::default()
        }
    }

    /// Plain output with stable content for CI logs and snapshots.
    pub fn ci() -> Self {
        Self {
            use_colors: false,
            include_timestamps: false,
            ..Self::default()
        }
    }

    pub fn with_columns(mut self, include: bool) -> Self {
        self.include_columns = include;
        self
    }

    pub fn with_outlier_rows(mut self, include: bool) -> Self {
        self.include_outlier_rows = include;
        self
    }

    pub fn with_max_columns(mut self, max: usize) -> Self {
        self.max_columns = Some(max);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
}

/// Type and health of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnReport {
    pub column: String,
    pub column_type: ColumnType,
    pub missing_count: usize,
    pub unique_count: usize,
    pub outlier_count: usize,
    pub outlier_row_indices: Vec<usize>,
}

/// Everything a health summary shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub row_count: usize,
    pub column_count: usize,
    pub duplicate_row_count: usize,
    pub total_missing: usize,
    pub total_outliers: usize,
    pub columns: Vec<ColumnReport>,
}

impl HealthReport {
    /// Builds a report, listing columns in type order.
    pub fn new(
        source: impl Into<String>,
        dataset: &Dataset,
        types: &ColumnTypes,
        health: &DatasetHealth,
    ) -> Self {
        let columns = types
            .iter()
            .map(|(column, column_type)| {
                let (missing_count, unique_count, outlier_row_indices) = health
                    .column(column)
                    .map(|h| (h.missing_count, h.unique_count, h.outlier_row_indices.clone()))
                    .unwrap_or_default();
                ColumnReport {
                    column: column.to_string(),
                    column_type,
                    missing_count,
                    unique_count,
                    outlier_count: outlier_row_indices.len(),
                    outlier_row_indices,
                }
            })
            .collect();

        Self {
            source: source.into(),
            generated_at: Utc::now(),
            row_count: dataset.row_count(),
            column_count: dataset.column_count(),
            duplicate_row_count: health.duplicate_row_count,
            total_missing: health.total_missing(),
            total_outliers: health.total_outliers(),
            columns,
        }
    }

    /// Builds a report from a pipeline run over `dataset`.
    pub fn from_snapshot(
        source: impl Into<String>,
        dataset: &Dataset,
        snapshot: &PipelineSnapshot,
    ) -> Self {
        Self::new(source, dataset, &snapshot.types, &snapshot.health)
    }

    fn shown_columns(&self, config: &FormatterConfig) -> &[ColumnReport] {
        if !config.include_columns {
            return &[];
        }
        let max = config.max_columns.unwrap_or(usize::MAX);
        &self.columns[..self.columns.len().min(max)]
    }
}

/// Renders a [`HealthReport`] as text.
pub trait HealthFormatter {
    fn format(&self, report: &HealthReport) -> Result<String>;

    /// Formats with explicit options instead of the formatter's own.
    fn format_with_config(&self, report: &HealthReport, _config: &FormatterConfig) -> Result<String> {
        self.format(report)
    }
}

fn render_error(err: std::fmt::Error) -> LensError {
    LensError::Internal(format!("Failed to render report: {err}"))
}

fn join_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Formats health reports as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: true,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthFormatter for JsonFormatter {
    fn format(&self, report: &HealthReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(&self, report: &HealthReport, config: &FormatterConfig) -> Result<String> {
        let mut value = serde_json::to_value(report)?;
        if let Some(object) = value.as_object_mut() {
            if !config.include_timestamps {
                object.remove("generated_at");
            }
            object.insert(
                "columns".to_string(),
                serde_json::to_value(report.shown_columns(config))?,
            );
            if !config.include_outlier_rows {
                if let Some(columns) = object.get_mut("columns").and_then(|c| c.as_array_mut()) {
                    for column in columns.iter_mut().filter_map(|c| c.as_object_mut()) {
                        column.remove("outlier_row_indices");
                    }
                }
            }
        }

        let json = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(json)
    }
}

/// Formats health reports for a terminal.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn render(
        &self,
        report: &HealthReport,
        config: &FormatterConfig,
        out: &mut String,
    ) -> std::fmt::Result {
        let paint = |text: String, code: &str| {
            if config.use_colors {
                format!("\x1b[{code}m{text}\x1b[0m")
            } else {
                text
            }
        };

        writeln!(out)?;
        writeln!(out, "📋 Data Health Summary: {}", report.source)?;
        if config.include_timestamps {
            writeln!(out, "Generated: {}", report.generated_at.to_rfc3339())?;
        }

        writeln!(out)?;
        writeln!(out, "   Rows: {}", report.row_count)?;
        writeln!(out, "   Columns: {}", report.column_count)?;
        let duplicates = report.duplicate_row_count.to_string();
        if report.duplicate_row_count > 0 {
            writeln!(out, "   Duplicate rows: {}", paint(duplicates, "33"))?;
        } else {
            writeln!(out, "   Duplicate rows: {}", paint(duplicates, "32"))?;
        }
        writeln!(out, "   Missing cells: {}", report.total_missing)?;
        writeln!(out, "   Outliers: {}", report.total_outliers)?;

        let shown = report.shown_columns(config);
        if !shown.is_empty() {
            writeln!(out)?;
            writeln!(out, "🔍 Columns:")?;
            for column in shown {
                writeln!(
                    out,
                    "   {} ({})",
                    paint(column.column.clone(), "1"),
                    column.column_type
                )?;
                writeln!(
                    out,
                    "      Missing: {} • Unique: {} • Outliers: {}",
                    column.missing_count, column.unique_count, column.outlier_count
                )?;
                if config.include_outlier_rows && column.outlier_count > 0 {
                    writeln!(
                        out,
                        "      Outlier rows: {}",
                        join_indices(&column.outlier_row_indices)
                    )?;
                }
            }
        }

        let hidden = if config.include_columns {
            report.columns.len() - shown.len()
        } else {
            0
        };
        if hidden > 0 {
            writeln!(out)?;
            writeln!(out, "   ... and {hidden} more columns")?;
        }

        writeln!(out)
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthFormatter for HumanFormatter {
    fn format(&self, report: &HealthReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(&self, report: &HealthReport, config: &FormatterConfig) -> Result<String> {
        let mut output = String::new();
        self.render(report, config, &mut output)
            .map_err(render_error)?;
        Ok(output)
    }
}

/// Formats health reports as Markdown.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            heading_level: 2,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    /// Sets the base heading level for the output.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 5);
        self
    }

    fn render(
        &self,
        report: &HealthReport,
        config: &FormatterConfig,
        out: &mut String,
    ) -> std::fmt::Result {
        let h = "#".repeat(self.heading_level as usize);

        writeln!(out, "{h} Data Health Summary")?;
        writeln!(out)?;
        writeln!(out, "**Source:** {}", report.source)?;
        if config.include_timestamps {
            writeln!(out, "**Generated:** {}", report.generated_at.to_rfc3339())?;
        }

        writeln!(out)?;
        writeln!(out, "| Metric | Value |")?;
        writeln!(out, "|--------|-------|")?;
        writeln!(out, "| Rows | {} |", report.row_count)?;
        writeln!(out, "| Columns | {} |", report.column_count)?;
        writeln!(out, "| Duplicate rows | {} |", report.duplicate_row_count)?;
        writeln!(out, "| Missing cells | {} |", report.total_missing)?;
        writeln!(out, "| Outliers | {} |", report.total_outliers)?;

        let shown = report.shown_columns(config);
        if !shown.is_empty() {
            writeln!(out)?;
            writeln!(out, "{h}# Columns")?;
            writeln!(out)?;
            writeln!(out, "| Column | Type | Missing | Unique | Outliers |")?;
            writeln!(out, "|--------|------|---------|--------|----------|")?;
            for column in shown {
                writeln!(
                    out,
                    "| {} | {} | {} | {} | {} |",
                    column.column.replace('|', "\\|"),
                    column.column_type,
                    column.missing_count,
                    column.unique_count,
                    column.outlier_count
                )?;
            }

            if config.include_outlier_rows {
                let flagged: Vec<_> = shown.iter().filter(|c| c.outlier_count > 0).collect();
                if !flagged.is_empty() {
                    writeln!(out)?;
                    writeln!(out, "{h}# Outlier Rows")?;
                    writeln!(out)?;
                    for column in flagged {
                        writeln!(
                            out,
                            "- **{}**: {}",
                            column.column,
                            join_indices(&column.outlier_row_indices)
                        )?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthFormatter for MarkdownFormatter {
    fn format(&self, report: &HealthReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(&self, report: &HealthReport, config: &FormatterConfig) -> Result<String> {
        let mut output = String::new();
        self.render(report, config, &mut output)
            .map_err(render_error)?;
        Ok(output)
    }
}
