//! Prelude for commonly used types and traits in term-lens.

pub use crate::analyzers::{ColumnType, ColumnTypes, DatasetHealth, InferenceConfig};
pub use crate::chart::{ChartKind, ChartSelection};
pub use crate::dataset::{CellValue, Dataset, Row};
pub use crate::error::{ErrorContext, LensError, Result};
pub use crate::formatters::{FormatterConfig, HealthFormatter, HealthReport};
pub use crate::history::FileHistory;
pub use crate::logging::LogConfig;
pub use crate::pipeline::{Pipeline, PipelineConfig, PipelineSnapshot};
pub use crate::sources::{CsvOptions, DataSource, SourceFormat};
pub use crate::transform::{AggregateFn, AggregationSpec, ColumnFilter, FilterSpec};
