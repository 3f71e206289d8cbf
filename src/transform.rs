//! The derived-column computation applied between read and sink write.

use crate::error::{PipelineError, PipelineResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Column holding the per-row quantity.
pub const QUANTITY_COLUMN: &str = "quantity";
/// Column holding the per-row unit price.
pub const UNIT_PRICE_COLUMN: &str = "unit_price";
/// Derived column appended by [`with_total_sales`].
pub const TOTAL_SALES_COLUMN: &str = "total_sales";

/// Append `total_sales = quantity * unit_price` as a new `Float64` column.
///
/// Rules:
///
/// - The input must expose `quantity` and `unit_price` columns of numeric
///   type (`Int64` or `Float64`).
/// - Original columns are preserved unchanged and in their original order.
/// - A null in either operand yields a null product.
/// - Either the whole batch is transformed or an error is returned; there is
///   never a half-transformed batch.
pub fn with_total_sales(batch: &DataSet) -> PipelineResult<DataSet> {
    let quantity_idx = numeric_column_index(batch, QUANTITY_COLUMN)?;
    let unit_price_idx = numeric_column_index(batch, UNIT_PRICE_COLUMN)?;

    let mut fields = batch.schema.fields.clone();
    fields.push(Field::new(TOTAL_SALES_COLUMN, DataType::Float64));
    let schema = Schema::new(fields);

    let mut rows = Vec::with_capacity(batch.row_count());
    for row in &batch.rows {
        let total = match (as_f64(&row[quantity_idx]), as_f64(&row[unit_price_idx])) {
            (Some(q), Some(p)) => Value::Float64(q * p),
            _ => Value::Null,
        };
        let mut out = row.clone();
        out.push(total);
        rows.push(out);
    }

    Ok(DataSet::new(schema, rows))
}

fn numeric_column_index(batch: &DataSet, name: &str) -> PipelineResult<usize> {
    let idx = batch
        .schema
        .index_of(name)
        .ok_or_else(|| PipelineError::Schema {
            message: format!("missing required column '{name}'"),
        })?;
    match batch.schema.fields[idx].data_type {
        DataType::Int64 | DataType::Float64 => Ok(idx),
        ref other => Err(PipelineError::Schema {
            message: format!("column '{name}' must be numeric, found {other:?}"),
        }),
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int64(n) => Some(*n as f64),
        Value::Float64(n) => Some(*n),
        _ => None,
    }
}
