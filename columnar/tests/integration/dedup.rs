use std::sync::Arc;

use columnar_interchange::{
    build_table, deserialize, materialize, serialize, BuildOptions, Frame, MaterializeOptions,
    Object, Value,
};

use crate::distinct_instances;

#[test]
fn repeated_strings_share_one_instance() {
    let frame = Frame::new().with_column("f0", ["a", "a", "b"]);
    let table = build_table(&frame, &BuildOptions::default()).unwrap();

    let deduped = materialize(&table, &MaterializeOptions::new().deduplicate(true));
    assert_eq!(distinct_instances(&deduped.columns()[0]), 2);

    let plain = materialize(&table, &MaterializeOptions::new().deduplicate(false));
    assert!(distinct_instances(&plain.columns()[0]) <= 3);
    assert_eq!(deduped, plain);
}

#[test]
fn dedup_does_not_change_values() {
    let words = ["x", "yy", "x", "", "zzz", "yy", ""];
    let frame = Frame::new()
        .with_column("w", words.iter().map(|w| Some(*w)).chain([None]))
        .with_column("n", (0..8).map(|i| i as i64));
    let table = build_table(&frame, &BuildOptions::default()).unwrap();
    let object = Object::from(table);
    let buffer = serialize(&object).unwrap().to_buffer();
    let restored = deserialize(&buffer).unwrap().into_table().unwrap();

    let deduped = materialize(&restored, &MaterializeOptions::new().deduplicate(true));
    let plain = materialize(&restored, &MaterializeOptions::new().deduplicate(false));
    assert_eq!(deduped, plain);
    assert_eq!(deduped.to_rows(), plain.to_rows());
    assert_eq!(distinct_instances(&deduped.columns()[0]), 4);
    assert_eq!(deduped.columns()[0].values[7], Value::Null);
}

#[test]
fn interner_spans_string_columns() {
    let frame = Frame::new()
        .with_column("left", ["same", "other"])
        .with_column("right", ["same", "same"]);
    let table = build_table(&frame, &BuildOptions::default()).unwrap();
    let out = materialize(&table, &MaterializeOptions::default());
    let left = out.column("left").unwrap().values[0].clone();
    let right = out.column("right").unwrap().values[1].clone();
    match (left, right) {
        (Value::Str(l), Value::Str(r)) => assert!(Arc::ptr_eq(&l, &r)),
        other => panic!("expected strings, got {:?}", other),
    }
}

#[test]
fn single_column_values() {
    let frame = Frame::new().with_column("c", ["q", "q", "q"]);
    let table = build_table(&frame, &BuildOptions::default()).unwrap();
    let column = table.column(0).unwrap();
    let shared = Frame::new().with_column("c", column.to_values(true));
    assert_eq!(distinct_instances(&shared.columns()[0]), 1);
    let separate = Frame::new().with_column("c", column.to_values(false));
    assert_eq!(distinct_instances(&separate.columns()[0]), 3);
}
