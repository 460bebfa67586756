//! Deterministic datasets for tests and benchmarks.
//!
//! Every generator is a pure function of its row count, so benchmark runs and
//! test assertions see the same data each time.

use crate::dataset::{CellValue, Dataset};
use crate::error::Result;

const REGIONS: [&str; 4] = ["north", "south", "east", "west"];
const PRODUCTS: [&str; 3] = ["widget", "gadget", "gizmo"];

/// A sales table with one column of each inferred type.
///
/// Columns: `date` (datetime), `region` and `product` (categorical), `units`
/// and `revenue` (numeric). Every 10th row has no region, every 25th row
/// repeats the one before it, and every 50th revenue is a far outlier.
pub fn sales_dataset(rows: usize) -> Result<Dataset> {
    let mut records: Vec<Vec<CellValue>> = Vec::with_capacity(rows);
    for i in 0..rows {
        if i > 0 && i % 25 == 0 {
            let previous = records[i - 1].clone();
            records.push(previous);
            continue;
        }

        let day = i % 28 + 1;
        let month = i / 28 % 12 + 1;
        let region = if i % 10 == 9 {
            CellValue::Null
        } else {
            CellValue::from(REGIONS[i % REGIONS.len()])
        };
        let units = (i * 7 % 40 + 1) as f64;
        let revenue = if i % 50 == 49 {
            units * 1_000.0
        } else {
            units * 12.5
        };

        records.push(vec![
            CellValue::from(format!("2024-{month:02}-{day:02}")),
            region,
            CellValue::from(PRODUCTS[i % PRODUCTS.len()]),
            CellValue::from(units.to_string()),
            CellValue::from(revenue),
        ]);
    }

    Dataset::from_records(["date", "region", "product", "units", "revenue"], records)
}

/// A column-heavy table of text cells that look numeric, for inference load.
pub fn wide_text_dataset(rows: usize, columns: usize) -> Result<Dataset> {
    let headers: Vec<String> = (0..columns.max(1)).map(|c| format!("c{c}")).collect();
    let records = (0..rows)
        .map(|r| {
            (0..headers.len())
                .map(|c| {
                    if (r + c) % 13 == 0 {
                        CellValue::from("")
                    } else {
                        CellValue::from(format!("{}.{}", r * c, c))
                    }
                })
                .collect()
        })
        .collect();

    Dataset::from_records(headers, records)
}
