use tracing::debug;

use crate::{Column, DataType, Frame, Interner, Series, Table, Value};

/// Controls how [materialize] produces object-form values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeOptions {
    deduplicate: bool,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self { deduplicate: true }
    }
}

impl MaterializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share one string instance among equal values, on by default.
    ///
    /// Saves memory when strings repeat a lot, but hashes every row, which
    /// dominates when most strings are unique.
    pub fn deduplicate(mut self, enable: bool) -> Self {
        self.deduplicate = enable;
        self
    }

    pub fn is_deduplicating(&self) -> bool {
        self.deduplicate
    }
}

/// Turns `table` back into object form, one [Series] per column in order.
///
/// With deduplication on, a single [Interner] lives for the whole call and
/// is shared by every string column.
pub fn materialize(table: &Table, options: &MaterializeOptions) -> Frame {
    let mut interner = options.deduplicate.then(Interner::new);
    let mut frame = Frame::new();
    for (name, column) in table.iter() {
        frame.push(Series::new(name, column_values(column, interner.as_mut())));
    }
    debug!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        interned = interner.as_ref().map_or(0, Interner::len),
        "materialized table"
    );
    frame
}

impl Column<'_> {
    /// Materializes this column alone, with a fresh interner when
    /// `deduplicate` is set.
    pub fn to_values(&self, deduplicate: bool) -> Vec<Value> {
        let mut interner = deduplicate.then(Interner::new);
        column_values(self, interner.as_mut())
    }
}

fn column_values<'c>(column: &'c Column, interner: Option<&mut Interner<'c>>) -> Vec<Value> {
    match (column.data_type(), interner) {
        (DataType::Utf8, Some(interner)) => (0..column.len())
            .map(|i| match column.str_value(i) {
                Some(s) => Value::Str(interner.intern(s)),
                None => Value::Null,
            })
            .collect(),
        _ => column.iter().collect(),
    }
}
