use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use csv::ByteRecord;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Table, Value};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Character encoding a CSV source is declared to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum TextEncoding {
    /// Strict UTF-8; invalid bytes are a load error.
    #[default]
    #[value(name = "utf-8", alias = "utf8")]
    Utf8,
    /// ISO-8859-1; every byte is the code point of the same value.
    #[value(name = "latin1", alias = "iso-8859-1")]
    Latin1,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => write!(f, "UTF-8"),
            TextEncoding::Latin1 => write!(f, "ISO-8859-1"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadOptions {
    pub encoding: TextEncoding,
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::Utf8,
            delimiter: b',',
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` / `.txt` – header row plus one record per line
/// * `.json`    – `[{ "column": value, ... }, ...]`
/// * `.parquet` – flat columns of strings, integers, floats or booleans
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Table, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" | "txt" => load_csv(path, options)?,
        "tsv" => load_csv(
            path,
            &LoadOptions {
                delimiter: b'\t',
                ..*options
            },
        )?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.width(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, options: &LoadOptions) -> Result<Table, LoadError> {
    let csv_error = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut record = ByteRecord::new();
    if !reader.read_byte_record(&mut record).map_err(csv_error)? {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    let headers = decode_record(path, &record, 1, options.encoding)?;

    let mut records = Vec::new();
    let mut row: u64 = 1;
    // Short rows are padded with missing values; long ones would lose data.
    while reader.read_byte_record(&mut record).map_err(csv_error)? {
        row += 1;
        if record.len() > headers.len() {
            return Err(LoadError::ExtraFields {
                path: path.to_path_buf(),
                row,
                expected: headers.len(),
                found: record.len(),
            });
        }
        records.push(decode_record(path, &record, row, options.encoding)?);
    }

    Ok(Table::from_text_records(headers, records))
}

fn decode_record(
    path: &Path,
    record: &ByteRecord,
    row: u64,
    encoding: TextEncoding,
) -> Result<Vec<String>, LoadError> {
    record
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let column = idx as u64 + 1;
            decode_field(field, row, column, encoding)
                .map(Cow::into_owned)
                .ok_or_else(|| LoadError::Encoding {
                    path: path.to_path_buf(),
                    row,
                    column,
                    encoding,
                })
        })
        .collect()
}

fn decode_field(
    field: &[u8],
    row: u64,
    column: u64,
    encoding: TextEncoding,
) -> Option<Cow<'_, str>> {
    // Excel likes to start UTF-8 exports with a BOM.
    let field = if row == 1 && column == 1 && field.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &field[3..]
    } else {
        field
    };

    match encoding {
        TextEncoding::Utf8 => std::str::from_utf8(field).ok().map(Cow::Borrowed),
        TextEncoding::Latin1 => Some(encoding_rs::mem::decode_latin1(field)),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "gender": "female", "math score": 72 },
///   ...
/// ]
/// ```
///
/// Columns are ordered by first appearance.
fn load_json(path: &Path) -> Result<Table, LoadError> {
    let json_error = |reason: String| LoadError::Json {
        path: path.to_path_buf(),
        reason,
    };

    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|e| json_error(e.to_string()))?;
    let records = root
        .as_array()
        .ok_or_else(|| json_error("expected a top-level JSON array".into()))?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| json_error(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows: Vec<Vec<Value>> = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map_or(Value::Missing, json_to_value))
                .collect()
        })
        .collect();

    Ok(Table::from_values(headers, rows))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::Null => Value::Missing,
        JsonValue::Number(n) => n.as_f64().map_or(Value::Missing, Value::Number),
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Bool(b) => Value::Text(b.to_string()),
        other => Value::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns. Works with files written by
/// both **Pandas** (`df.to_parquet()`) and **Polars**
/// (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table, LoadError> {
    let parquet_error = |reason: String| LoadError::Parquet {
        path: path.to_path_buf(),
        reason,
    };

    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| parquet_error(e.to_string()))?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().map_err(|e| parquet_error(e.to_string()))?;

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| parquet_error(e.to_string()))?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_value(col, row))
                    .collect(),
            );
        }
    }

    Ok(Table::from_values(headers, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Missing;
    }
    let number = |v: f64| {
        if v.is_finite() {
            Value::Number(v)
        } else {
            Value::Missing
        }
    };
    match col.data_type() {
        DataType::Utf8 => Value::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Boolean => Value::Text(col.as_boolean().value(row).to_string()),
        DataType::Int8 => number(col.as_primitive::<Int8Type>().value(row) as f64),
        DataType::Int16 => number(col.as_primitive::<Int16Type>().value(row) as f64),
        DataType::Int32 => number(col.as_primitive::<Int32Type>().value(row) as f64),
        DataType::Int64 => number(col.as_primitive::<Int64Type>().value(row) as f64),
        DataType::UInt8 => number(col.as_primitive::<UInt8Type>().value(row) as f64),
        DataType::UInt16 => number(col.as_primitive::<UInt16Type>().value(row) as f64),
        DataType::UInt32 => number(col.as_primitive::<UInt32Type>().value(row) as f64),
        DataType::UInt64 => number(col.as_primitive::<UInt64Type>().value(row) as f64),
        DataType::Float32 => number(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => number(col.as_primitive::<Float64Type>().value(row)),
        other => Value::Text(format!("{other:?}")),
    }
}
