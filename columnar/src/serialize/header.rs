use serde::{Deserialize, Serialize};

use crate::{Column, DataType};

pub(crate) const FORMAT_VERSION: u8 = 1;

/// Shape of a serialized object: everything except the payload bytes.
///
/// `nodes` lists the object graph in pre-order, so containers are followed
/// by their children and no node nests another. `component_sizes` gives the
/// byte length of every component in the order nodes consume them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub version: u8,
    pub component_sizes: Vec<u64>,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List { len: u64 },
    Map { keys: Vec<String> },
    Column(ColumnMeta),
    Table {
        num_rows: u64,
        columns: Vec<(String, ColumnMeta)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub data_type: DataType,
    pub len: u64,
    pub null_count: u64,
    pub has_validity: bool,
}

impl ColumnMeta {
    pub(crate) fn of(column: &Column) -> Self {
        Self {
            data_type: column.data_type(),
            len: column.len() as u64,
            null_count: column.null_count() as u64,
            has_validity: column.validity().is_some(),
        }
    }

    /// Components this column consumes: validity, offsets, values.
    pub fn num_components(&self) -> usize {
        self.has_validity as usize + self.data_type.has_offsets() as usize + 1
    }
}
