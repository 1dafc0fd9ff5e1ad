//! ## Columnar interchange
//!
//! Moves tabular data between row-oriented [Frame]s and columnar [Table]s,
//! and ships columnar objects across process boundaries without copying
//! their payload.
//!
//! - [build_table] converts any [ColumnSource] into a [Table], inferring
//!   column types or using the ones declared in [BuildOptions]
//! - [materialize] converts a [Table] back into a [Frame]; string columns are
//!   deduplicated through an [Interner] unless [MaterializeOptions] turns it off
//! - [serialize] splits an [Object] into a small header plus the raw column
//!   buffers. [SerializedForm::to_buffer] concatenates them, while
//!   [SerializedForm::to_components] hands them out as-is
//! - [deserialize] and [deserialize_components] rebuild the object; column
//!   buffers borrow from the input instead of being copied
//!
//! ## Buffers
//!
//! Every [Column] owns up to three [Buffer]s: an optional validity [Bitmap]
//! (bit set = valid, least significant bit first), offsets for `Utf8` columns
//! (`len + 1` little-endian `u32`s) and the values themselves. Fixed-width
//! values are little-endian, booleans are bit-packed like the bitmap, and
//! `Null` columns carry no value bytes at all, so outside a table with a
//! payload column their row count is capped at [MAX_NULL_ROWS].

mod err;
pub use err::ColumnarError;
mod data_type;
pub use data_type::DataType;
mod buffer;
pub use buffer::{Bitmap, Buffer};
mod value;
pub use value::{Value, ValueKind};
mod frame;
pub use frame::{Frame, RowBatch, Series};
mod column;
pub use column::{Column, ColumnBuilder};
mod table;
pub use table::Table;
mod convert;
pub use convert::{
    build_table, materialize, BuildOptions, ColumnSource, Interner, MaterializeOptions,
};
mod serialize;
pub use serialize::{
    deserialize, deserialize_components, serialize, ColumnMeta, Components, Header, Node, Object,
    SerializedForm, ALIGNMENT, MAGIC, MAX_NESTING_DEPTH, MAX_NULL_ROWS,
};

pub use postcard::Error as PostcardError;

#[cfg(feature = "bench")]
extern crate lazy_static;
