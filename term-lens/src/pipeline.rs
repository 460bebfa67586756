//! Change-driven recomputation of everything derived from a dataset.
//!
//! A [`Pipeline`] holds the current dataset and the user's filter and
//! aggregation choices. Every setter bumps a version counter; [`Pipeline::run`]
//! recomputes types, health, filtered rows and aggregated rows only when the
//! version moved since the last run.
//!
//! # Example
//!
//! ```rust
//! use term_lens::dataset::{CellValue, Dataset};
//! use term_lens::pipeline::Pipeline;
//! use term_lens::transform::{AggregateFn, AggregationSpec};
//!
//! let dataset = Dataset::from_records(
//!     ["team", "points"],
//!     vec![
//!         vec![CellValue::from("red"), CellValue::from(3.0)],
//!         vec![CellValue::from("blue"), CellValue::from(1.0)],
//!         vec![CellValue::from("red"), CellValue::from(5.0)],
//!     ],
//! )
//! .unwrap();
//!
//! let mut pipeline = Pipeline::new();
//! pipeline.set_dataset(dataset);
//! pipeline.set_aggregation(
//!     AggregationSpec::new()
//!         .group_by("team")
//!         .measure_with("points", AggregateFn::Sum),
//! );
//!
//! let snapshot = pipeline.run().unwrap();
//! assert_eq!(snapshot.rows.len(), 2);
//! ```

use std::sync::Arc;

use tracing::instrument;

use crate::analyzers::{
    compute_health, ColumnTypes, DatasetHealth, InferenceConfig, TypeInferenceEngine,
};
use crate::chart::{self, ChartSelection, DataPreview, PieSlice, PREVIEW_ROWS};
use crate::dataset::{Dataset, Row};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::logging::{truncate_field, LogConfig};
use crate::transform::{apply_filters, AggregationSpec, FilterSpec};

/// Settings shared by a pipeline and the tools around it.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub inference: InferenceConfig,
    pub log: LogConfig,
    /// Rows returned by [`PipelineSnapshot::preview`] (default: 10)
    pub preview_rows: usize,
    /// Entries kept by a file history built from this config (default: 10)
    pub history_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inference: InferenceConfig::default(),
            log: LogConfig::default(),
            preview_rows: PREVIEW_ROWS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl PipelineConfig {
    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineSnapshot {
    /// Pipeline version this snapshot was computed at
    pub version: u64,
    pub columns: Vec<String>,
    /// Types of the unfiltered dataset
    pub types: ColumnTypes,
    /// Health of the unfiltered dataset
    pub health: DatasetHealth,
    /// Rows after filtering and aggregation
    pub rows: Vec<Row>,
    preview_rows: usize,
}

impl PipelineSnapshot {
    /// Head of the transformed rows.
    pub fn preview(&self) -> DataPreview {
        chart::preview(&self.columns, &self.rows, self.preview_rows)
    }

    /// Transformed rows reduced to the selected X and Y columns.
    pub fn chart_rows(&self, selection: &ChartSelection) -> Vec<Row> {
        chart::project_rows(&self.rows, selection)
    }

    /// Per-series totals of the transformed rows.
    pub fn pie_totals(&self, selection: &ChartSelection) -> Vec<PieSlice> {
        chart::pie_totals(&self.rows, selection)
    }
}

/// Owns the current dataset and the transformations applied to it.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    engine: TypeInferenceEngine,
    dataset: Option<Arc<Dataset>>,
    filters: FilterSpec,
    aggregation: AggregationSpec,
    selection: ChartSelection,
    version: u64,
    last: Option<Arc<PipelineSnapshot>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            engine: TypeInferenceEngine::with_config(config.inference.clone()),
            config,
            dataset: None,
            filters: FilterSpec::new(),
            aggregation: AggregationSpec::new(),
            selection: ChartSelection::default(),
            version: 0,
            last: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Replaces the dataset.
    ///
    /// Filters and aggregation refer to the old columns, so both are cleared,
    /// and the chart selection falls back to the defaults for the new header.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        crate::log_data_op!(
            self.config.log,
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "Loaded dataset into pipeline"
        );
        self.selection = ChartSelection::for_columns(dataset.columns());
        self.dataset = Some(Arc::new(dataset));
        self.filters.clear();
        self.aggregation = AggregationSpec::new();
        self.bump();
    }

    pub fn set_filters(&mut self, filters: FilterSpec) {
        crate::perf_debug!(self.config.log, filters = filters.len(), "Updated filters");
        self.filters = filters;
        self.bump();
    }

    pub fn set_aggregation(&mut self, aggregation: AggregationSpec) {
        crate::perf_debug!(
            self.config.log,
            group_by = aggregation.active_group().unwrap_or(""),
            measures = aggregation.measures.len(),
            "Updated aggregation"
        );
        self.aggregation = aggregation;
        self.bump();
    }

    /// Changes the chart selection. Rows do not depend on it, so the version
    /// stays put.
    pub fn set_selection(&mut self, selection: ChartSelection) {
        self.selection = selection;
    }

    /// Drops the dataset and every choice made for it.
    pub fn reset(&mut self) {
        crate::log_data_op!(self.config.log, "Reset pipeline");
        self.dataset = None;
        self.filters.clear();
        self.aggregation = AggregationSpec::new();
        self.selection = ChartSelection::default();
        self.last = None;
        self.bump();
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.dataset.as_ref()
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn aggregation(&self) -> &AggregationSpec {
        &self.aggregation
    }

    pub fn selection(&self) -> &ChartSelection {
        &self.selection
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Recomputes derived state, or returns the last snapshot if nothing
    /// changed. Returns `None` when no dataset is loaded.
    #[instrument(skip(self), fields(version = self.version))]
    pub fn run(&mut self) -> Option<Arc<PipelineSnapshot>> {
        let dataset = self.dataset.clone()?;

        if let Some(last) = &self.last {
            if last.version == self.version {
                crate::perf_debug!(self.config.log, "Reusing pipeline snapshot");
                return Some(Arc::clone(last));
            }
        }

        let types = self.engine.infer_types(&dataset);
        let health = compute_health(&dataset, &types);
        for column in &health.columns {
            crate::log_column!(
                self.config.log,
                column = %truncate_field(&column.column, self.config.log.max_field_length),
                column_type = ?types.get(&column.column),
                missing = column.missing_count,
                unique = column.unique_count,
                outliers = column.outlier_count(),
                "Column profile"
            );
        }
        let filtered = apply_filters(dataset.rows(), &self.filters, &types);
        let rows = self.aggregation.apply(&filtered).into_owned();

        crate::log_data_op!(
            self.config.log,
            input_rows = dataset.row_count(),
            output_rows = rows.len(),
            duplicates = health.duplicate_row_count,
            "Pipeline run complete"
        );

        let columns = match self.aggregation.active_group() {
            Some(group) => std::iter::once(group.to_string())
                .chain(
                    self.aggregation
                        .measures
                        .iter()
                        .filter(|m| m.as_str() != group)
                        .cloned(),
                )
                .collect(),
            None => dataset.columns().to_vec(),
        };

        let snapshot = Arc::new(PipelineSnapshot {
            version: self.version,
            columns,
            types,
            health,
            rows,
            preview_rows: self.config.preview_rows,
        });
        self.last = Some(Arc::clone(&snapshot));
        Some(snapshot)
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}
