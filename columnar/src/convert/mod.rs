mod build;
pub use build::{build_table, BuildOptions};
mod intern;
pub use intern::Interner;
mod materialize;
pub use materialize::{materialize, MaterializeOptions};

use crate::Value;

/// Anything a [crate::Table] can be built from.
///
/// The engine only needs to enumerate columns and look values up by
/// position; the type of each value is introspected through [Value::kind].
pub trait ColumnSource {
    fn num_columns(&self) -> usize;
    fn column_name(&self, column: usize) -> &str;
    fn column_len(&self, column: usize) -> usize;
    fn value(&self, column: usize, row: usize) -> &Value;
}
