//! Row transformations applied between loading and charting.
//!
//! Filtering runs first and aggregation runs on the filtered rows. Both return
//! `Cow` so the common no-op case borrows the input.

pub mod aggregate;
pub mod filter;

pub use aggregate::{group_and_aggregate, AggregateFn, AggregationSpec};
pub use filter::{apply_filters, ColumnFilter, FilterSpec};
