//! CSV reading with per-column type inference.

use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Read a CSV file into a typed in-memory [`DataSet`].
///
/// Rules:
///
/// - The CSV must have a header row; header names become column names.
/// - Column types are inferred from the data, narrowest first: Int64, then
///   Float64, then Bool, then Utf8.
/// - Empty cells are ignored during inference and become [`Value::Null`].
pub fn read_csv_from_path(path: impl AsRef<Path>) -> PipelineResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    read_csv_from_reader(&mut rdr)
}

/// Read CSV data from an existing CSV reader.
pub fn read_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> PipelineResult<DataSet> {
    let headers = rdr.headers()?.clone();

    let mut records: Vec<csv::StringRecord> = Vec::new();
    for result in rdr.records() {
        records.push(result?);
    }

    let fields = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| Field::new(name, infer_column_type(&records, idx)))
        .collect();
    let schema = Schema::new(fields);

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(records.len());
    for (row_idx0, record) in records.iter().enumerate() {
        // Report 1-based row numbers for users; +1 again because the header is row 1.
        let user_row = row_idx0 + 2;

        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (col_idx, field) in schema.fields.iter().enumerate() {
            let raw = record.get(col_idx).unwrap_or("");
            row.push(parse_typed_value(user_row, &field.name, &field.data_type, raw)?);
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema, rows))
}

fn infer_column_type(records: &[csv::StringRecord], col_idx: usize) -> DataType {
    let mut seen_any = false;
    let mut all_int = true;
    let mut all_float = true;
    let mut all_bool = true;

    for record in records {
        let trimmed = record.get(col_idx).unwrap_or("").trim();
        if trimmed.is_empty() {
            continue;
        }
        seen_any = true;
        if all_int && trimmed.parse::<i64>().is_err() {
            all_int = false;
        }
        if all_float && trimmed.parse::<f64>().is_err() {
            all_float = false;
        }
        if all_bool && parse_bool(trimmed).is_err() {
            all_bool = false;
        }
    }

    if !seen_any {
        // All-null column; Utf8 is the least constraining choice.
        return DataType::Utf8;
    }
    if all_int {
        DataType::Int64
    } else if all_float {
        DataType::Float64
    } else if all_bool {
        DataType::Bool
    } else {
        DataType::Utf8
    }
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: &DataType,
    raw: &str,
) -> PipelineResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_err(row, column, raw, &e.to_string())),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_err(row, column, raw, &e.to_string())),
        DataType::Bool => parse_bool(trimmed)
            .map(Value::Bool)
            .map_err(|message| parse_err(row, column, raw, &message)),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err("expected bool (true/false)".to_string()),
    }
}

fn parse_err(row: usize, column: &str, raw: &str, message: &str) -> PipelineError {
    PipelineError::Malformed {
        message: format!("row {row} column '{column}': {message} (raw='{raw}')"),
    }
}
