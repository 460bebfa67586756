//! CSV decoding through Arrow's CSV reader.

use std::io::Cursor;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use tracing::{debug, instrument};

use crate::dataset::{CellValue, Dataset, Row};
use crate::error::{LensError, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Options for configuring CSV decoding.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the first record holds column names (default: true)
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Records read for column type detection (default: all)
    pub schema_infer_max_records: Option<usize>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            schema_infer_max_records: None,
        }
    }
}

impl CsvOptions {
    /// Tab-separated values.
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            ..Self::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_schema_infer_max_records(mut self, records: usize) -> Self {
        self.schema_infer_max_records = Some(records);
        self
    }
}

/// Decodes CSV bytes into a dataset.
///
/// Integer and float columns become numbers, boolean columns booleans, empty
/// fields `Null`, and everything else text. Without a header row, columns are
/// named `column_1`, `column_2`, ...
#[instrument(skip_all, fields(bytes = bytes.len()))]
pub fn decode_csv(bytes: &[u8], options: &CsvOptions) -> Result<Dataset> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(LensError::NoData);
    }

    let format = Format::default()
        .with_header(options.has_header)
        .with_delimiter(options.delimiter)
        .with_quote(options.quote);
    let (schema, records_read) =
        format.infer_schema(Cursor::new(bytes), options.schema_infer_max_records)?;

    let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    if columns.is_empty() {
        return Err(LensError::NoData);
    }
    debug!(columns = columns.len(), records_read, "Inferred CSV schema");

    let reader = ReaderBuilder::new(Arc::new(schema))
        .with_header(options.has_header)
        .with_delimiter(options.delimiter)
        .with_quote(options.quote)
        .build(Cursor::new(bytes))?;

    let mut rows = Vec::new();
    for batch in reader {
        append_batch(&batch?, &columns, &mut rows)?;
    }

    Dataset::new(columns, rows)
}

fn append_batch(batch: &RecordBatch, columns: &[String], rows: &mut Vec<Row>) -> Result<()> {
    let start = rows.len();
    rows.extend((0..batch.num_rows()).map(|_| Row::new()));

    for (name, array) in columns.iter().zip(batch.columns()) {
        let values = column_cells(array)?;
        for (row, value) in rows[start..].iter_mut().zip(values) {
            row.insert(name.clone(), value);
        }
    }
    Ok(())
}

fn column_cells(array: &ArrayRef) -> Result<Vec<CellValue>> {
    let len = array.len();
    let cells = match array.data_type() {
        DataType::Int64 => {
            let ints = array.as_primitive::<Int64Type>();
            (0..len)
                .map(|i| present(array, i, || CellValue::Number(ints.value(i) as f64)))
                .collect()
        }
        DataType::Float64 => {
            let floats = array.as_primitive::<Float64Type>();
            (0..len)
                .map(|i| present(array, i, || CellValue::Number(floats.value(i))))
                .collect()
        }
        DataType::Boolean => {
            let bools = array.as_boolean();
            (0..len)
                .map(|i| present(array, i, || CellValue::Bool(bools.value(i))))
                .collect()
        }
        DataType::Utf8 => {
            let strings = array.as_string::<i32>();
            (0..len)
                .map(|i| present(array, i, || CellValue::Text(strings.value(i).to_string())))
                .collect()
        }
        // Dates, timestamps and anything else keep Arrow's textual form.
        _ => {
            let formatter = ArrayFormatter::try_new(array.as_ref(), &FormatOptions::default())?;
            (0..len)
                .map(|i| present(array, i, || CellValue::Text(formatter.value(i).to_string())))
                .collect()
        }
    };
    Ok(cells)
}

fn present(array: &ArrayRef, index: usize, value: impl FnOnce() -> CellValue) -> CellValue {
    if array.is_null(index) {
        CellValue::Null
    } else {
        value()
    }
}
