use sales_ingest::reader::csv::{read_csv_from_path, read_csv_from_reader};
use sales_ingest::types::{DataType, Value};

#[test]
fn read_csv_infers_schema_from_fixture() {
    let ds = read_csv_from_path("tests/fixtures/sales.csv").unwrap();

    assert_eq!(
        ds.schema.field_names().collect::<Vec<_>>(),
        vec!["order_id", "product", "quantity", "unit_price"]
    );
    assert_eq!(ds.schema.fields[0].data_type, DataType::Int64);
    assert_eq!(ds.schema.fields[1].data_type, DataType::Utf8);
    assert_eq!(ds.schema.fields[2].data_type, DataType::Int64);
    assert_eq!(ds.schema.fields[3].data_type, DataType::Float64);

    assert_eq!(ds.row_count(), 2);
    assert_eq!(
        ds.rows[0],
        vec![
            Value::Int64(1),
            Value::Utf8("notebook".to_string()),
            Value::Int64(3),
            Value::Float64(10.0),
        ]
    );
}

#[test]
fn inference_covers_float_bool_and_mixed_columns() {
    let ds = read_csv_from_path("tests/fixtures/mixed_types.csv").unwrap();

    assert_eq!(ds.schema.fields[0].data_type, DataType::Int64); // id: empties skipped
    assert_eq!(ds.schema.fields[1].data_type, DataType::Float64); // score: 9.5 forces float
    assert_eq!(ds.schema.fields[2].data_type, DataType::Bool);
    assert_eq!(ds.schema.fields[3].data_type, DataType::Utf8); // label: alpha/beta/7 mixed
    assert_eq!(ds.schema.fields[4].data_type, DataType::Utf8);

    // Empty cells become nulls.
    assert_eq!(ds.rows[2][0], Value::Null);
    assert_eq!(ds.rows[0][4], Value::Null);

    // A numeric-looking value in a Utf8 column stays text.
    assert_eq!(ds.rows[2][3], Value::Utf8("7".to_string()));
    assert_eq!(ds.rows[1][1], Value::Float64(7.0));
    assert_eq!(ds.rows[0][2], Value::Bool(true));
}

#[test]
fn integer_column_with_floats_widens_to_float() {
    let input = "amount\n1\n2.5\n3\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let ds = read_csv_from_reader(&mut rdr).unwrap();
    assert_eq!(ds.schema.fields[0].data_type, DataType::Float64);
    assert_eq!(ds.rows[0][0], Value::Float64(1.0));
    assert_eq!(ds.rows[1][0], Value::Float64(2.5));
}

#[test]
fn all_empty_column_is_utf8_nulls() {
    let input = "a,b\n1,\n2,\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let ds = read_csv_from_reader(&mut rdr).unwrap();
    assert_eq!(ds.schema.fields[1].data_type, DataType::Utf8);
    assert_eq!(ds.rows[0][1], Value::Null);
    assert_eq!(ds.rows[1][1], Value::Null);
}

#[test]
fn ragged_row_is_a_csv_error() {
    let input = "order_id,quantity,unit_price\n1,2\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let err = read_csv_from_reader(&mut rdr).unwrap_err();
    assert!(err.to_string().contains("csv error"));
}

#[test]
fn missing_file_is_an_io_flavored_error() {
    let err = read_csv_from_path("tests/fixtures/does_not_exist.csv").unwrap_err();
    assert!(err.to_string().contains("csv error"));
}
