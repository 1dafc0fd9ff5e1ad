use columnar_interchange::{
    build_table, materialize, BuildOptions, ColumnarError, DataType, Frame, MaterializeOptions,
    RowBatch, Series, Value, ValueKind,
};

#[test]
fn declared_type_mismatch() {
    let frame = Frame::new().with_column("n", [Value::from(1i64), Value::from("two")]);
    let options = BuildOptions::new().with_type("n", DataType::Int64);
    let err = build_table(&frame, &options).unwrap_err();
    match err {
        ColumnarError::TypeMismatch {
            column,
            row,
            expected,
            found,
        } => {
            assert_eq!(column, "n");
            assert_eq!(row, 1);
            assert_eq!(expected, DataType::Int64);
            assert_eq!(found, ValueKind::Str);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn out_of_range_integer() {
    let frame = Frame::new().with_column("n", [100i64, 200]);
    let options = BuildOptions::new().with_type("n", DataType::Int8);
    let err = build_table(&frame, &options).unwrap_err();
    assert!(matches!(err, ColumnarError::TypeMismatch { row: 1, .. }), "{}", err);

    let options = BuildOptions::new().with_type("n", DataType::UInt8);
    let table = build_table(&frame, &options).unwrap();
    assert_eq!(table.column(0).unwrap().get(1), Value::UInt(200));
}

#[test]
fn heterogeneous_column() {
    let frame = Frame::new().with_column("m", [Value::from(true), Value::from("yes")]);
    let err = build_table(&frame, &BuildOptions::default()).unwrap_err();
    assert!(
        matches!(err, ColumnarError::SchemaInference { ref column, .. } if column == "m"),
        "{}",
        err
    );
}

#[test]
fn int_to_float_promotion() {
    let frame = Frame::new().with_column("x", [Value::from(1i64), Value::from(2.5)]);
    assert!(matches!(
        build_table(&frame, &BuildOptions::default()),
        Err(ColumnarError::SchemaInference { .. })
    ));
    let table = build_table(&frame, &BuildOptions::new().promote_int_to_float(true)).unwrap();
    assert_eq!(table.schema(), vec![("x", DataType::Float64)]);
    assert_eq!(table.column(0).unwrap().get(0), Value::Float(1.0));
}

#[test]
fn declared_column_missing() {
    let frame = Frame::new().with_column("a", [1i64]);
    let options = BuildOptions::new().with_type("b", DataType::Int64);
    assert!(matches!(
        build_table(&frame, &options),
        Err(ColumnarError::SchemaInference { ref column, .. }) if column == "b"
    ));
}

#[test]
fn ragged_frame() {
    let mut frame = Frame::new().with_column("a", [1i64, 2]);
    frame.push(Series::new("b", vec![Value::from(1i64)]));
    let err = build_table(&frame, &BuildOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        ColumnarError::LengthMismatch {
            expected: 2,
            found: 1,
            ..
        }
    ));
}

#[test]
fn row_batch_source() {
    let names = vec!["id".to_string(), "tag".to_string()];
    let rows = vec![
        vec![Value::from(1i64), Value::from("a")],
        vec![Value::from(2i64), Value::Null],
        vec![Value::from(3i64), Value::from("a")],
    ];
    let batch = RowBatch::try_new(names, rows.clone()).unwrap();
    let table = build_table(&batch, &BuildOptions::default()).unwrap();
    assert_eq!(
        table.schema(),
        vec![("id", DataType::Int64), ("tag", DataType::Utf8)]
    );
    let frame = materialize(&table, &MaterializeOptions::default());
    assert_eq!(frame.to_rows(), rows);
    assert_eq!(Frame::from(batch), frame);
}

#[test]
fn row_batch_width_checked() {
    let err = RowBatch::try_new(
        vec!["a".to_string()],
        vec![vec![Value::Null], vec![Value::Null, Value::Null]],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ColumnarError::RowWidthMismatch {
            row: 1,
            expected: 1,
            found: 2
        }
    ));
}

#[test]
fn frame_exports_as_json() {
    let frame = Frame::new()
        .with_column("a", [Some(1i64), None])
        .with_column("b", [Value::from("x"), Value::from(1.5)]);
    insta::assert_snapshot!(
        serde_json::to_string(&frame).unwrap(),
        @r###"{"series":[{"name":"a","values":[1,null]},{"name":"b","values":["x",1.5]}]}"###
    );
}

#[test]
fn error_messages() {
    let frame = Frame::new().with_column("n", [Value::from(true)]);
    let err = build_table(&frame, &BuildOptions::new().with_type("n", DataType::Float64))
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"column `n` row 0: cannot coerce bool value to double");
}
