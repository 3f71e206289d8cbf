//! Parquet reading with schema taken from the file metadata.

use std::collections::HashMap;
use std::path::Path;

use parquet::basic::Type as PhysicalType;
use parquet::file::reader::FileReader;
use parquet::file::serialized_reader::SerializedFileReader;
use parquet::record::Field as ParquetField;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Read a Parquet file into a typed in-memory [`DataSet`].
///
/// Notes:
/// - Column names and types come from the file's leaf columns.
/// - Uses the Parquet record API (`RowIter`); fine for landing-file sizes.
/// - Physical types without a direct mapping (INT96, fixed-len byte arrays)
///   are read as Utf8 via their text rendering.
pub fn read_parquet_from_path(path: impl AsRef<Path>) -> PipelineResult<DataSet> {
    let reader = SerializedFileReader::try_from(path.as_ref())?;

    let mut fields = Vec::new();
    for col in reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .columns()
    {
        let data_type = match col.physical_type() {
            PhysicalType::BOOLEAN => DataType::Bool,
            PhysicalType::INT32 | PhysicalType::INT64 => DataType::Int64,
            PhysicalType::FLOAT | PhysicalType::DOUBLE => DataType::Float64,
            _ => DataType::Utf8,
        };
        fields.push(Field::new(col.path().string(), data_type));
    }
    let schema = Schema::new(fields);

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (idx0, row_res) in reader.into_iter().enumerate() {
        let row_num = idx0 + 1;
        let row = row_res?;

        // Build a name -> Field map for lookup.
        let mut map: HashMap<&str, &ParquetField> = HashMap::new();
        for (name, field) in row.get_column_iter() {
            map.insert(name.as_str(), field);
        }

        let mut out_row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for f in &schema.fields {
            let v = map.get(f.name.as_str()).ok_or_else(|| PipelineError::Malformed {
                message: format!("row {row_num} missing column '{}'", f.name),
            })?;
            out_row.push(convert_parquet_field(row_num, &f.name, &f.data_type, v)?);
        }
        rows.push(out_row);
    }

    Ok(DataSet::new(schema, rows))
}

fn convert_parquet_field(
    row: usize,
    column: &str,
    data_type: &DataType,
    f: &ParquetField,
) -> PipelineResult<Value> {
    if matches!(f, ParquetField::Null) {
        return Ok(Value::Null);
    }

    match data_type {
        DataType::Utf8 => match f {
            ParquetField::Str(s) => Ok(Value::Utf8(s.clone())),
            other => Ok(Value::Utf8(other.to_string())),
        },
        DataType::Bool => match f {
            ParquetField::Bool(b) => Ok(Value::Bool(*b)),
            _ => Err(convert_err(row, column, f, "expected bool")),
        },
        DataType::Int64 => match f {
            ParquetField::Byte(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::Short(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::Int(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::Long(v) => Ok(Value::Int64(*v)),
            ParquetField::UByte(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::UShort(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::UInt(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::ULong(v) => i64::try_from(*v)
                .map(Value::Int64)
                .map_err(|_| convert_err(row, column, f, "u64 out of range for i64")),
            _ => Err(convert_err(row, column, f, "expected integer")),
        },
        DataType::Float64 => match f {
            ParquetField::Float(v) => Ok(Value::Float64(f64::from(*v))),
            ParquetField::Double(v) => Ok(Value::Float64(*v)),
            _ => Err(convert_err(row, column, f, "expected number")),
        },
    }
}

fn convert_err(row: usize, column: &str, f: &ParquetField, message: &str) -> PipelineError {
    PipelineError::Malformed {
        message: format!("row {row} column '{column}': {message} (raw='{f}')"),
    }
}
