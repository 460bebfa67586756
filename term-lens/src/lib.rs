//! # term-lens - profile and chart small tabular datasets
//!
//! term-lens loads a CSV, Excel or JSON table into memory, works out what kind
//! of data each column holds, reports on its quality, and reshapes it for a
//! line, bar or pie chart.
//!
//! ## Quick Start
//!
//! ```rust
//! use term_lens::prelude::*;
//!
//! let dataset = Dataset::from_records(
//!     ["region", "sales"],
//!     vec![
//!         vec![CellValue::from("north"), CellValue::from("120")],
//!         vec![CellValue::from("south"), CellValue::from("80")],
//!         vec![CellValue::from("north"), CellValue::from("40")],
//!     ],
//! )?;
//!
//! let mut pipeline = Pipeline::new();
//! pipeline.set_dataset(dataset);
//! pipeline.set_filters(FilterSpec::new().with_range("sales", Some(50.0), None));
//! pipeline.set_aggregation(
//!     AggregationSpec::new()
//!         .group_by("region")
//!         .measure_with("sales", AggregateFn::Sum),
//! );
//!
//! let snapshot = pipeline.run().expect("dataset is loaded");
//! assert_eq!(snapshot.types.get("sales"), Some(ColumnType::Numeric));
//! assert_eq!(snapshot.rows.len(), 2);
//! # Ok::<(), term_lens::error::LensError>(())
//! ```
//!
//! ## Architecture
//!
//! - **`dataset`**: cells, rows and datasets, plus the number, date and
//!   missing-value rules every other module shares
//! - **`analyzers`**: column type inference and data health (missing, unique,
//!   outliers, duplicate rows)
//! - **`transform`**: row filters and group-by aggregation
//! - **`pipeline`**: recomputes all of the above when the dataset or the
//!   user's choices change
//! - **`chart`**: axis defaults, chart projections and table previews
//! - **`sources`**: CSV, JSON and Excel decoding from files, bytes and
//!   (with the `remote` feature) URLs
//! - **`history`**: the recently loaded files list
//! - **`formatters`**: human, JSON and Markdown health summaries
//!
//! Profiling and transformation never fail. Only loading, persistence and
//! rendering return [`error::Result`].

pub mod analyzers;
pub mod chart;
pub mod dataset;
pub mod error;
pub mod formatters;
pub mod history;
pub mod logging;
pub mod pipeline;
pub mod prelude;
pub mod sources;
pub mod transform;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
