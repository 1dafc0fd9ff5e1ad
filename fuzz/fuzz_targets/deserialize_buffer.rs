#![no_main]
use columnar_interchange::{deserialize, materialize, MaterializeOptions, Object};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(Object::Table(table)) = deserialize(data) {
        let _frame = materialize(&table, &MaterializeOptions::default());
    }
});
