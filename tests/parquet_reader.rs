use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parquet::column::writer::ColumnWriter;
use parquet::data_type::ByteArray;
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;

use sales_ingest::reader::parquet::read_parquet_from_path;
use sales_ingest::types::{DataType, Value};

fn tmp_file(ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("sales-ingest-parquet-{nanos}.{ext}"))
}

fn write_sales_parquet(path: &PathBuf) {
    let schema_str = r#"
    message schema {
      REQUIRED INT64 quantity;
      REQUIRED DOUBLE unit_price;
      REQUIRED BINARY product (UTF8);
      REQUIRED BOOLEAN shipped;
    }
    "#;

    let schema = Arc::new(parse_message_type(schema_str).unwrap());
    let props = Arc::new(WriterProperties::builder().build());
    let file = File::create(path).unwrap();
    let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();

    let mut rg = writer.next_row_group().unwrap();
    while let Some(mut col) = rg.next_column().unwrap() {
        match col.untyped() {
            ColumnWriter::Int64ColumnWriter(w) => {
                w.write_batch(&[3_i64, 0_i64], None, None).unwrap();
            }
            ColumnWriter::DoubleColumnWriter(w) => {
                w.write_batch(&[10.0_f64, 5.0_f64], None, None).unwrap();
            }
            ColumnWriter::ByteArrayColumnWriter(w) => {
                let v1 = ByteArray::from("notebook");
                let v2 = ByteArray::from("mouse");
                w.write_batch(&[v1, v2], None, None).unwrap();
            }
            ColumnWriter::BoolColumnWriter(w) => {
                w.write_batch(&[true, false], None, None).unwrap();
            }
            _ => panic!("unexpected column writer in test"),
        }
        col.close().unwrap();
    }
    rg.close().unwrap();
    writer.close().unwrap();
}

#[test]
fn read_parquet_takes_schema_from_file_metadata() {
    let path = tmp_file("parquet");
    write_sales_parquet(&path);

    let ds = read_parquet_from_path(&path).unwrap();

    assert_eq!(
        ds.schema.field_names().collect::<Vec<_>>(),
        vec!["quantity", "unit_price", "product", "shipped"]
    );
    assert_eq!(ds.schema.fields[0].data_type, DataType::Int64);
    assert_eq!(ds.schema.fields[1].data_type, DataType::Float64);
    assert_eq!(ds.schema.fields[2].data_type, DataType::Utf8);
    assert_eq!(ds.schema.fields[3].data_type, DataType::Bool);

    assert_eq!(ds.row_count(), 2);
    assert_eq!(
        ds.rows[0],
        vec![
            Value::Int64(3),
            Value::Float64(10.0),
            Value::Utf8("notebook".to_string()),
            Value::Bool(true),
        ]
    );
    assert_eq!(ds.rows[1][2], Value::Utf8("mouse".to_string()));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn garbage_bytes_are_a_parquet_error() {
    let path = tmp_file("parquet");
    std::fs::write(&path, b"definitely not a parquet file").unwrap();

    let err = read_parquet_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("parquet error"));

    let _ = std::fs::remove_file(&path);
}
