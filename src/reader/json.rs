//! JSON reading with schema inference.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Column order is the order keys first appear across rows. A column's type
//! is the narrowest of {Int64, Float64, Bool, Utf8} that fits every non-null
//! value; mixed integer/float columns widen to Float64, any other mix falls
//! back to Utf8.

use std::fs;
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Read a JSON file into a typed in-memory [`DataSet`].
pub fn read_json_from_path(path: impl AsRef<Path>) -> PipelineResult<DataSet> {
    let text = fs::read_to_string(path)?;
    read_json_from_str(&text)
}

/// Read JSON from an in-memory string into a [`DataSet`].
pub fn read_json_from_str(input: &str) -> PipelineResult<DataSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::Malformed {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match v {
            serde_json::Value::Array(items) => build_dataset(&items),
            serde_json::Value::Object(_) => build_dataset(std::slice::from_ref(&v)),
            _ => Err(PipelineError::Malformed {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            }),
        }
    } else {
        // Fall back to NDJSON.
        let mut values = Vec::new();
        for (i, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
                PipelineError::Malformed {
                    message: format!("invalid ndjson at line {}: {e}", i + 1),
                }
            })?;
            values.push(v);
        }
        build_dataset(&values)
    }
}

fn build_dataset(values: &[serde_json::Value]) -> PipelineResult<DataSet> {
    let mut names: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(values.len());
    for (idx0, v) in values.iter().enumerate() {
        let row_num = idx0 + 1;
        let obj = v.as_object().ok_or_else(|| PipelineError::Malformed {
            message: format!("row {row_num} is not a json object"),
        })?;
        for key in obj.keys() {
            if !names.iter().any(|n| n == key) {
                names.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let mut fields = Vec::with_capacity(names.len());
    for name in &names {
        let mut inferred: Option<DataType> = None;
        for obj in &objects {
            let Some(jv) = obj.get(name) else { continue };
            if jv.is_null() {
                continue;
            }
            let value_type = json_value_type(name, jv)?;
            inferred = Some(match inferred {
                None => value_type,
                Some(prev) => join_types(prev, value_type),
            });
        }
        fields.push(Field::new(name.clone(), inferred.unwrap_or(DataType::Utf8)));
    }
    let schema = Schema::new(fields);

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(objects.len());
    for (idx0, obj) in objects.iter().enumerate() {
        let row_num = idx0 + 1;
        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for field in &schema.fields {
            match obj.get(&field.name) {
                // A key absent from this row maps to null, like an empty CSV cell.
                None => row.push(Value::Null),
                Some(jv) => row.push(convert_json_value(row_num, &field.name, &field.data_type, jv)?),
            }
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema, rows))
}

fn json_value_type(name: &str, v: &serde_json::Value) -> PipelineResult<DataType> {
    match v {
        serde_json::Value::Bool(_) => Ok(DataType::Bool),
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => Ok(DataType::Int64),
        serde_json::Value::Number(_) => Ok(DataType::Float64),
        serde_json::Value::String(_) => Ok(DataType::Utf8),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Err(PipelineError::Malformed {
                message: format!("field '{name}': nested json values are not supported"),
            })
        }
        serde_json::Value::Null => Ok(DataType::Utf8),
    }
}

fn join_types(a: DataType, b: DataType) -> DataType {
    match (a, b) {
        (a, b) if a == b => a,
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }
        _ => DataType::Utf8,
    }
}

fn convert_json_value(
    row: usize,
    column: &str,
    data_type: &DataType,
    v: &serde_json::Value,
) -> PipelineResult<Value> {
    if v.is_null() {
        return Ok(Value::Null);
    }

    match data_type {
        DataType::Utf8 => match v.as_str() {
            Some(s) => Ok(Value::Utf8(s.to_string())),
            // Mixed columns widen to Utf8; render scalars as their json text.
            None => Ok(Value::Utf8(v.to_string())),
        },
        DataType::Bool => v
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| convert_err(row, column, v, "expected bool")),
        DataType::Int64 => {
            if let Some(n) = v.as_i64() {
                Ok(Value::Int64(n))
            } else if let Some(n) = v.as_u64() {
                i64::try_from(n)
                    .map(Value::Int64)
                    .map_err(|_| convert_err(row, column, v, "u64 out of range for i64"))
            } else {
                Err(convert_err(row, column, v, "expected integer number"))
            }
        }
        DataType::Float64 => v
            .as_f64()
            .map(Value::Float64)
            .ok_or_else(|| convert_err(row, column, v, "expected number")),
    }
}

fn convert_err(row: usize, column: &str, v: &serde_json::Value, message: &str) -> PipelineError {
    PipelineError::Malformed {
        message: format!("row {row} column '{column}': {message} (raw='{v}')"),
    }
}
