#![no_main]
use columnar_fuzz::RawComponents;
use columnar_interchange::{deserialize_components, materialize, MaterializeOptions, Object};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|raw: RawComponents| {
    let components = raw.components();
    match deserialize_components(&raw.header, &components) {
        Ok(Object::Table(table)) => {
            let _frame = materialize(&table, &MaterializeOptions::default());
        }
        Ok(Object::Column(column)) => {
            let _values = column.to_values(true);
        }
        _ => {}
    }
});
