use columnar_interchange::{
    build_table, deserialize, deserialize_components, materialize, serialize, BuildOptions,
    DataType, Frame, MaterializeOptions, Object, Value,
};

use crate::sample_frame;

fn through_buffer(frame: &Frame, options: &MaterializeOptions) -> Frame {
    let table = build_table(frame, &BuildOptions::default()).unwrap();
    let object = Object::from(table);
    let buffer = serialize(&object).unwrap().to_buffer();
    let restored = deserialize(&buffer).unwrap().into_table().unwrap();
    materialize(&restored, options)
}

fn through_components(frame: &Frame, options: &MaterializeOptions) -> Frame {
    let table = build_table(frame, &BuildOptions::default()).unwrap();
    let object = Object::from(table);
    let form = serialize(&object).unwrap();
    let components = form.to_components();
    let restored = deserialize_components(components.header, &components.data)
        .unwrap()
        .into_table()
        .unwrap();
    materialize(&restored, options)
}

#[test]
fn roundtrip_with_and_without_dedup() {
    let frame = sample_frame();
    for dedup in [true, false] {
        let options = MaterializeOptions::new().deduplicate(dedup);
        assert_eq!(through_buffer(&frame, &options), frame);
        assert_eq!(through_components(&frame, &options), frame);
    }
}

#[test]
fn inferred_schema() {
    let table = build_table(&sample_frame(), &BuildOptions::default()).unwrap();
    assert_eq!(
        table.schema(),
        vec![
            ("id", DataType::Int64),
            ("score", DataType::Float64),
            ("flag", DataType::Boolean),
            ("name", DataType::Utf8),
            ("nothing", DataType::Null),
        ]
    );
}

#[test]
fn nulls_survive_at_their_positions() {
    let null_rows = [2, 5, 9];
    let values = (0..10)
        .map(|i| {
            if null_rows.contains(&i) {
                Value::Null
            } else {
                Value::Float(i as f64)
            }
        })
        .collect::<Vec<_>>();
    let frame = Frame::new().with_column("x", values.clone());
    let table = build_table(&frame, &BuildOptions::default()).unwrap();
    let object = Object::from(table);
    let buffer = serialize(&object).unwrap().to_buffer();
    let restored = deserialize(&buffer).unwrap();
    let column = restored.as_table().unwrap().column(0).unwrap();
    assert_eq!(column.null_count(), 3);
    for i in 0..10 {
        assert_eq!(column.is_null(i), null_rows.contains(&i), "row {}", i);
    }
    let back = materialize(restored.as_table().unwrap(), &MaterializeOptions::default());
    assert_eq!(back.column("x").unwrap().values, values);
}

#[test]
fn nan_keeps_its_bits() {
    let weird_nan = f64::from_bits(0x7ff8_0000_dead_beef);
    let frame = Frame::new().with_column("x", [1.0, weird_nan, f64::NEG_INFINITY, -0.0]);
    let back = through_buffer(&frame, &MaterializeOptions::default());
    let bits = back.column("x").unwrap().values.iter().map(|v| v.as_f64().unwrap().to_bits());
    assert_eq!(
        bits.collect::<Vec<_>>(),
        vec![
            1.0f64.to_bits(),
            weird_nan.to_bits(),
            f64::NEG_INFINITY.to_bits(),
            (-0.0f64).to_bits()
        ]
    );
}

#[test]
fn nan_as_null_is_opt_in() {
    let frame = Frame::new().with_column("x", [1.0, f64::NAN]);
    let kept = build_table(&frame, &BuildOptions::default()).unwrap();
    assert_eq!(kept.column(0).unwrap().null_count(), 0);

    let nulled = build_table(&frame, &BuildOptions::new().nan_as_null(true)).unwrap();
    let column = nulled.column(0).unwrap();
    assert_eq!(column.null_count(), 1);
    assert_eq!(column.get(1), Value::Null);
}

#[test]
fn empty_and_unicode_strings() {
    let frame = Frame::new().with_column("s", ["", "héllo", "日本語", "", "🦀"]);
    for dedup in [true, false] {
        let options = MaterializeOptions::new().deduplicate(dedup);
        assert_eq!(through_components(&frame, &options), frame);
    }
}

#[test]
fn declared_narrow_types() {
    let frame = Frame::new()
        .with_column("a", [1i64, -2, 3])
        .with_column("b", [0.5, 1.5, 2.5]);
    let options = BuildOptions::new()
        .with_type("a", DataType::Int8)
        .with_type("b", DataType::Float32);
    let table = build_table(&frame, &options).unwrap();
    assert_eq!(table.column(0).unwrap().values().len(), 3);
    assert_eq!(table.column(1).unwrap().values().len(), 12);
    let object = Object::from(table);
    let buffer = serialize(&object).unwrap().to_buffer();
    let restored = deserialize(&buffer).unwrap().into_table().unwrap();
    assert_eq!(materialize(&restored, &MaterializeOptions::default()), frame);
}

#[test]
fn zero_row_table() {
    let frame = Frame::new()
        .with_column("a", Vec::<i64>::new())
        .with_column("b", Vec::<&str>::new());
    let back = through_components(&frame, &MaterializeOptions::default());
    assert_eq!(back.num_columns(), 2);
    assert_eq!(back.num_rows(), 0);
}

#[test]
fn nested_objects_roundtrip() {
    let table = build_table(&sample_frame(), &BuildOptions::default()).unwrap();
    let object = Object::Map(vec![
        ("table".to_string(), Object::from(table)),
        (
            "extras".to_string(),
            Object::List(vec![
                Object::Null,
                Object::from(true),
                Object::from(-7i64),
                Object::from(2.5),
                Object::from("label"),
                Object::List(vec![]),
                Object::Map(vec![]),
            ]),
        ),
        (
            "column".to_string(),
            Object::from(columnar_interchange::Column::from_i64s([Some(1), None])),
        ),
    ]);
    let form = serialize(&object).unwrap();
    let buffer = form.to_buffer();
    assert_eq!(buffer.len(), form.buffer_len());
    assert_eq!(deserialize(&buffer).unwrap(), object);
    let components = form.to_components();
    assert_eq!(
        deserialize_components(components.header, &components.data).unwrap(),
        object
    );
}
