use std::{collections::HashSet, sync::Arc};

use columnar_interchange::{Frame, Series, Value};

mod convert;
mod dedup;
mod roundtrip;

/// Number of distinct string instances among the values of `series`.
pub fn distinct_instances(series: &Series) -> usize {
    series
        .values
        .iter()
        .filter_map(|v| match v {
            Value::Str(s) => Some(Arc::as_ptr(s) as *const u8),
            _ => None,
        })
        .collect::<HashSet<_>>()
        .len()
}

pub fn sample_frame() -> Frame {
    Frame::new()
        .with_column("id", [1i64, 2, 3, 4])
        .with_column("score", [Some(0.5), None, Some(-1.25), Some(f64::INFINITY)])
        .with_column("flag", [Some(true), Some(false), None, Some(true)])
        .with_column("name", [Some("ada"), Some("bob"), Some("ada"), None])
        .with_column("nothing", [Value::Null, Value::Null, Value::Null, Value::Null])
}
