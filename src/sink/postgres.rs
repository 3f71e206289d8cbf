#![cfg(feature = "postgres-sink")]

//! PostgreSQL sink writer (feature-gated behind `postgres-sink`).
//!
//! Uses the synchronous `postgres` client, matching the pipeline's blocking
//! control flow. The destination table is created with mapped column types
//! on first write; subsequent appends rely on the store to reject
//! incompatible rows.

use postgres::types::ToSql;
use postgres::{Client, NoTls};

use crate::config::PgConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{DataSet, DataType, Value};

use super::SinkWriter;

/// Sink writer backed by a PostgreSQL connection.
pub struct PostgresSink {
    client: Client,
}

impl PostgresSink {
    /// Connect using the given configuration.
    pub fn connect(config: &PgConfig) -> PipelineResult<Self> {
        let client =
            Client::connect(&config.connection_string(), NoTls).map_err(|e| sink_err("connect", e))?;
        Ok(Self { client })
    }

    fn ensure_table(&mut self, batch: &DataSet, table: &str) -> PipelineResult<()> {
        let columns = batch
            .schema
            .fields
            .iter()
            .map(|f| format!("{} {}", quote_ident(&f.name), sql_type(&f.data_type)))
            .collect::<Vec<_>>()
            .join(", ");
        let ddl = format!("CREATE TABLE IF NOT EXISTS {} ({columns})", quote_ident(table));
        self.client
            .batch_execute(&ddl)
            .map_err(|e| sink_err("create table", e))?;
        Ok(())
    }
}

impl SinkWriter for PostgresSink {
    fn append(&mut self, batch: &DataSet, table: &str) -> PipelineResult<usize> {
        if batch.schema.fields.is_empty() {
            return Ok(0);
        }
        self.ensure_table(batch, table)?;

        let column_list = batch
            .schema
            .fields
            .iter()
            .map(|f| quote_ident(&f.name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=batch.schema.fields.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let insert = format!(
            "INSERT INTO {} ({column_list}) VALUES ({placeholders})",
            quote_ident(table)
        );
        let stmt = self
            .client
            .prepare(&insert)
            .map_err(|e| sink_err("prepare insert", e))?;

        for row in &batch.rows {
            let params: Vec<Box<dyn ToSql + Sync>> = row
                .iter()
                .zip(batch.schema.fields.iter())
                .map(|(value, field)| sql_param(value, &field.data_type))
                .collect();
            let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| p.as_ref()).collect();
            self.client
                .execute(&stmt, &refs)
                .map_err(|e| sink_err("insert row", e))?;
        }
        Ok(batch.row_count())
    }
}

fn sql_type(data_type: &DataType) -> &'static str {
    match data_type {
        DataType::Int64 => "BIGINT",
        DataType::Float64 => "DOUBLE PRECISION",
        DataType::Bool => "BOOLEAN",
        DataType::Utf8 => "TEXT",
    }
}

fn sql_param(value: &Value, data_type: &DataType) -> Box<dyn ToSql + Sync> {
    match value {
        Value::Int64(v) => Box::new(*v),
        Value::Float64(v) => Box::new(*v),
        Value::Bool(v) => Box::new(*v),
        Value::Utf8(s) => Box::new(s.clone()),
        Value::Null => match data_type {
            DataType::Int64 => Box::new(None::<i64>),
            DataType::Float64 => Box::new(None::<f64>),
            DataType::Bool => Box::new(None::<bool>),
            DataType::Utf8 => Box::new(None::<String>),
        },
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn sink_err(action: &str, err: postgres::Error) -> PipelineError {
    PipelineError::SinkWrite {
        message: format!("{action}: {err}"),
    }
}
