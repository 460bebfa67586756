//! JSON decoding: an array of flat objects.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::dataset::{CellValue, Dataset, Row};
use crate::error::{LensError, Result};

const NOT_AN_ARRAY_OF_OBJECTS: &str = "JSON file must be an array of objects.";

/// Decodes a JSON array of objects.
///
/// Columns are the keys of the first object, in document order. Later objects
/// are read through those keys only: missing keys become `Null` and extra keys
/// are ignored. Nested arrays and objects are kept as their JSON text.
#[instrument(skip_all, fields(bytes = bytes.len()))]
pub fn decode_json(bytes: &[u8]) -> Result<Dataset> {
    let document: Value = serde_json::from_slice(bytes)?;

    let records = match document {
        Value::Array(records) => records,
        _ => return Err(LensError::data_source("JSON", NOT_AN_ARRAY_OF_OBJECTS)),
    };
    let columns: Vec<String> = match records.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => return Err(LensError::data_source("JSON", NOT_AN_ARRAY_OF_OBJECTS)),
    };

    debug!(columns = columns.len(), records = records.len(), "Decoded JSON records");

    let rows = records
        .into_iter()
        .map(|record| {
            let mut object = match record {
                Value::Object(object) => object,
                _ => serde_json::Map::new(),
            };
            columns
                .iter()
                .map(|column| {
                    let value = object.remove(column).map(json_cell).unwrap_or_default();
                    (column.clone(), value)
                })
                .collect::<Row>()
        })
        .collect();

    Dataset::new(columns, rows)
}

fn json_cell(value: Value) -> CellValue {
    match value {
        Value::Null => CellValue::Null,
        Value::Bool(b) => CellValue::Bool(b),
        Value::Number(n) => n.as_f64().map_or(CellValue::Null, CellValue::Number),
        Value::String(s) => CellValue::Text(s),
        nested @ (Value::Array(_) | Value::Object(_)) => CellValue::Text(nested.to_string()),
    }
}
