//! Column type inference.
//!
//! Each column is classified as [`ColumnType::Numeric`], [`ColumnType::Datetime`]
//! or [`ColumnType::Categorical`] from the share of its non-missing cells that
//! parse as numbers or as dates:
//!
//! - more than 80% numeric: numeric
//! - otherwise more than 80% date-like: datetime
//! - otherwise, or when every cell is missing: categorical
//!
//! Numeric is tested first, so a column of plain years (`2021`, `2022`) which
//! is also fully date-parseable is numeric.
//!
//! # Example
//!
//! ```rust
//! use term_lens::analyzers::inference::{ColumnType, TypeInferenceEngine};
//! use term_lens::dataset::{CellValue, Dataset};
//!
//! let dataset = Dataset::from_records(
//!     ["day", "visits"],
//!     vec![
//!         vec![CellValue::from("2024-01-01"), CellValue::from("10")],
//!         vec![CellValue::from("2024-01-02"), CellValue::from("12")],
//!     ],
//! )
//! .unwrap();
//!
//! let types = TypeInferenceEngine::new().infer_types(&dataset);
//! assert_eq!(types.get("day"), Some(ColumnType::Datetime));
//! assert_eq!(types.get("visits"), Some(ColumnType::Numeric));
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info, instrument};

use crate::dataset::{CellValue, Dataset};

/// Share of non-missing cells that must parse for a type to win.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Configuration for the type inference engine
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Ratio a type must strictly exceed (default: 0.8)
    pub confidence_threshold: f64,
    /// Only look at the first N rows of each column (default: all rows)
    pub sample_size: Option<usize>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            sample_size: None,
        }
    }
}

/// Semantic kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Datetime,
    Categorical,
}

impl ColumnType {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Datetime => "datetime",
            ColumnType::Categorical => "categorical",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Numeric)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Inferred types for every column of a dataset, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTypes {
    order: Vec<String>,
    types: HashMap<String, ColumnType>,
}

impl ColumnTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the type of a column, appending it to the order if it is new.
    pub fn insert(&mut self, column: impl Into<String>, column_type: ColumnType) {
        let column = column.into();
        if self.types.insert(column.clone(), column_type).is_none() {
            self.order.push(column);
        }
    }

    pub fn get(&self, column: &str) -> Option<ColumnType> {
        self.types.get(column).copied()
    }

    /// Whether the column was inferred as numeric. Unknown columns are not.
    pub fn is_numeric(&self, column: &str) -> bool {
        self.get(column).is_some_and(|t| t.is_numeric())
    }

    /// Iterates `(column, type)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnType)> {
        self.order
            .iter()
            .map(move |column| (column.as_str(), self.types[column]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, ColumnType)> for ColumnTypes {
    fn from_iter<T: IntoIterator<Item = (S, ColumnType)>>(iter: T) -> Self {
        let mut types = ColumnTypes::new();
        for (column, column_type) in iter {
            types.insert(column, column_type);
        }
        types
    }
}

impl Serialize for ColumnTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, column_type) in self.iter() {
            map.serialize_entry(column, &column_type)?;
        }
        map.end()
    }
}

/// Type inference result for one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeInferenceResult {
    pub column: String,
    /// The inferred type
    pub inferred_type: ColumnType,
    /// Share of non-missing cells supporting the inferred type (0.0 for categorical)
    pub confidence: f64,
    /// Non-missing cells examined
    pub samples_analyzed: usize,
    /// Missing cells skipped
    pub missing_count: usize,
    pub numeric_matches: usize,
    pub date_matches: usize,
}

/// Counters gathered while scanning a column
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TypeStats {
    pub total: usize,
    pub missing: usize,
    pub numeric_matches: usize,
    pub date_matches: usize,
}

impl TypeStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one cell. Numeric and date-like are tested independently.
    pub fn observe(&mut self, value: &CellValue) {
        if value.is_missing() {
            self.missing += 1;
            return;
        }
        self.total += 1;
        if value.parse_number().is_some() {
            self.numeric_matches += 1;
        }
        if value.parse_date().is_some() {
            self.date_matches += 1;
        }
    }
}

/// Builder for TypeInferenceEngine
pub struct TypeInferenceEngineBuilder {
    config: InferenceConfig,
}

impl TypeInferenceEngineBuilder {
    /// Set the ratio a type must exceed to be chosen
    pub fn confidence_threshold(mut self, threshold: f64) -> Self {
        self.config.confidence_threshold = threshold;
        self
    }

    /// Limit inference to the first `size` rows
    pub fn sample_size(mut self, size: usize) -> Self {
        self.config.sample_size = Some(size);
        self
    }

    /// Build the TypeInferenceEngine
    pub fn build(self) -> TypeInferenceEngine {
        TypeInferenceEngine {
            config: self.config,
        }
    }
}

/// Classifies dataset columns.
#[derive(Debug, Clone)]
pub struct TypeInferenceEngine {
    config: InferenceConfig,
}

impl TypeInferenceEngine {
    /// Create a new builder for TypeInferenceEngine
    pub fn builder() -> TypeInferenceEngineBuilder {
        TypeInferenceEngineBuilder {
            config: InferenceConfig::default(),
        }
    }

    /// Create a TypeInferenceEngine with default configuration
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn with_config(config: InferenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Infers the type of every column.
    #[instrument(skip_all, fields(columns = dataset.column_count(), rows = dataset.row_count()))]
    pub fn infer_types(&self, dataset: &Dataset) -> ColumnTypes {
        let types: ColumnTypes = dataset
            .columns()
            .iter()
            .map(|column| {
                let result = self.infer_column_type(dataset, column);
                (column.clone(), result.inferred_type)
            })
            .collect();

        info!(
            numeric = types.iter().filter(|(_, t)| *t == ColumnType::Numeric).count(),
            datetime = types.iter().filter(|(_, t)| *t == ColumnType::Datetime).count(),
            categorical = types
                .iter()
                .filter(|(_, t)| *t == ColumnType::Categorical)
                .count(),
            "Completed type inference"
        );

        types
    }

    /// Infers the type of one column, keeping the evidence.
    pub fn infer_column_type(&self, dataset: &Dataset, column: &str) -> TypeInferenceResult {
        let limit = self.config.sample_size.unwrap_or(usize::MAX);
        let stats = self.analyze_values(dataset.column_values(column).take(limit));
        let (inferred_type, confidence) = self.determine_type(&stats);

        debug!(
            column,
            inferred_type = inferred_type.type_name(),
            confidence,
            samples = stats.total,
            "Inferred column type"
        );

        TypeInferenceResult {
            column: column.to_string(),
            inferred_type,
            confidence,
            samples_analyzed: stats.total,
            missing_count: stats.missing,
            numeric_matches: stats.numeric_matches,
            date_matches: stats.date_matches,
        }
    }

    /// Gathers counters over a sequence of cells.
    pub fn analyze_values<'a>(&self, values: impl IntoIterator<Item = &'a CellValue>) -> TypeStats {
        let mut stats = TypeStats::new();
        for value in values {
            stats.observe(value);
        }
        stats
    }

    /// Picks the column type from counters, with its supporting ratio.
    pub fn determine_type(&self, stats: &TypeStats) -> (ColumnType, f64) {
        if stats.total == 0 {
            return (ColumnType::Categorical, 0.0);
        }

        let total = stats.total as f64;
        let numeric_ratio = stats.numeric_matches as f64 / total;
        let date_ratio = stats.date_matches as f64 / total;

        if numeric_ratio > self.config.confidence_threshold {
            (ColumnType::Numeric, numeric_ratio)
        } else if date_ratio > self.config.confidence_threshold {
            (ColumnType::Datetime, date_ratio)
        } else {
            (ColumnType::Categorical, 0.0)
        }
    }
}

impl Default for TypeInferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Infers column types with the default engine.
pub fn infer_types(dataset: &Dataset) -> ColumnTypes {
    TypeInferenceEngine::new().infer_types(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_column(values: Vec<CellValue>) -> Dataset {
        Dataset::from_records(["c"], values.into_iter().map(|v| vec![v]).collect()).unwrap()
    }

    fn texts(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::from(*v)).collect()
    }

    #[test]
    fn test_engine_builder() {
        let engine = TypeInferenceEngine::builder()
            .confidence_threshold(0.9)
            .sample_size(50)
            .build();

        assert_eq!(engine.config().confidence_threshold, 0.9);
        assert_eq!(engine.config().sample_size, Some(50));

        let default = TypeInferenceEngine::default();
        assert_eq!(default.config().confidence_threshold, 0.8);
        assert_eq!(default.config().sample_size, None);
    }

    #[test]
    fn test_stats_skip_missing_cells() {
        let engine = TypeInferenceEngine::new();
        let values = vec![
            CellValue::from("123"),
            CellValue::Null,
            CellValue::from(""),
            CellValue::from("2024-02-01"),
            CellValue::from("n/a"),
        ];

        let stats = engine.analyze_values(&values);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.missing, 2);
        assert_eq!(stats.numeric_matches, 1);
        assert_eq!(stats.date_matches, 1);
    }

    #[test]
    fn test_threshold_is_strict() {
        let engine = TypeInferenceEngine::new();

        // 8 of 10 is exactly 0.8 and does not qualify.
        let stats = TypeStats {
            total: 10,
            missing: 0,
            numeric_matches: 8,
            date_matches: 0,
        };
        assert_eq!(engine.determine_type(&stats).0, ColumnType::Categorical);

        let stats = TypeStats {
            numeric_matches: 9,
            ..stats
        };
        assert_eq!(engine.determine_type(&stats), (ColumnType::Numeric, 0.9));
    }

    #[test]
    fn test_numeric_wins_over_date() {
        let dataset = single_column(texts(&["2019", "2020", "2021", "2022", "2023"]));
        let result = TypeInferenceEngine::new().infer_column_type(&dataset, "c");

        assert_eq!(result.date_matches, 5);
        assert_eq!(result.numeric_matches, 5);
        assert_eq!(result.inferred_type, ColumnType::Numeric);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_datetime_detection() {
        let dataset = single_column(texts(&[
            "2024-01-01",
            "2024-01-02",
            "01/03/2024",
            "Jan 4, 2024",
            "2024-01-05T08:00:00",
        ]));
        let types = infer_types(&dataset);
        assert_eq!(types.get("c"), Some(ColumnType::Datetime));
    }

    #[test]
    fn test_all_missing_is_categorical() {
        let dataset = single_column(vec![CellValue::Null, CellValue::from(""), CellValue::Null]);
        let result = TypeInferenceEngine::new().infer_column_type(&dataset, "c");

        assert_eq!(result.inferred_type, ColumnType::Categorical);
        assert_eq!(result.samples_analyzed, 0);
        assert_eq!(result.missing_count, 3);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_mixed_column_is_categorical() {
        let dataset = single_column(texts(&["1", "2", "three", "four", "5"]));
        assert_eq!(infer_types(&dataset).get("c"), Some(ColumnType::Categorical));
    }

    #[test]
    fn test_sample_size_limits_scan() {
        let mut values = texts(&["1", "2", "3", "4", "5"]);
        values.extend(texts(&["a", "b", "c", "d", "e", "f"]));
        let dataset = single_column(values);

        let sampled = TypeInferenceEngine::builder().sample_size(5).build();
        assert_eq!(sampled.infer_types(&dataset).get("c"), Some(ColumnType::Numeric));
        assert_eq!(infer_types(&dataset).get("c"), Some(ColumnType::Categorical));
    }

    #[test]
    fn test_column_types_keep_order_and_serialize() {
        let types: ColumnTypes = [
            ("b", ColumnType::Numeric),
            ("a", ColumnType::Categorical),
            ("c", ColumnType::Datetime),
        ]
        .into_iter()
        .collect();

        let order: Vec<_> = types.iter().map(|(c, _)| c).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        assert!(types.is_numeric("b"));
        assert!(!types.is_numeric("missing"));

        let json = serde_json::to_string(&types).unwrap();
        assert_eq!(json, r#"{"b":"numeric","a":"categorical","c":"datetime"}"#);
    }
}
