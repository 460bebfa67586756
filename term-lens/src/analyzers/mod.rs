//! Dataset analysis: column type inference and data health profiling.
//!
//! ## Available Analyzers
//!
//! - **Type Inference Engine** (`inference`): classifies each column as numeric,
//!   datetime or categorical from the share of cells that parse as numbers or
//!   dates.
//! - **Health Profiler** (`health`): missing and distinct value counts per
//!   column, IQR outliers for numeric columns, and duplicate rows.
//!
//! Both are pure functions of the dataset. They keep no state between calls
//! and are re-run whenever the dataset changes.
//!
//! ## Example Usage
//!
//! ```rust
//! use term_lens::analyzers::{compute_health, infer_types, ColumnType};
//! use term_lens::dataset::{CellValue, Dataset};
//!
//! let dataset = Dataset::from_records(
//!     ["city", "temp"],
//!     vec![
//!         vec![CellValue::from("Oslo"), CellValue::from("4.5")],
//!         vec![CellValue::from("Rome"), CellValue::from("18")],
//!         vec![CellValue::from("Oslo"), CellValue::from("4.5")],
//!     ],
//! )
//! .unwrap();
//!
//! let types = infer_types(&dataset);
//! assert_eq!(types.get("temp"), Some(ColumnType::Numeric));
//!
//! let health = compute_health(&dataset, &types);
//! assert_eq!(health.duplicate_row_count, 1);
//! assert_eq!(health.column("city").unwrap().unique_count, 2);
//! ```

pub mod health;
pub mod inference;

pub use health::{
    canonical_row_key, compute_health, count_duplicate_rows, profile_column, ColumnHealth,
    DatasetHealth, OutlierBounds,
};
pub use inference::{
    infer_types, ColumnType, ColumnTypes, InferenceConfig, TypeInferenceEngine,
    TypeInferenceEngineBuilder, TypeInferenceResult, TypeStats,
};
