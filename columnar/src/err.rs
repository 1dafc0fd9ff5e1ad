use postcard::Error as PostcardError;
use thiserror::Error;

use crate::{DataType, ValueKind};

#[derive(Error, Debug)]
pub enum ColumnarError {
    #[error("serialize or deserialize error")]
    SerializeError(#[from] PostcardError),
    #[error("column `{column}` row {row}: cannot coerce {found} value to {expected}")]
    TypeMismatch {
        column: String,
        row: usize,
        expected: DataType,
        found: ValueKind,
    },
    #[error("column `{column}`: {reason}")]
    SchemaInference { column: String, reason: String },
    #[error("column `{column}` has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("row {row} has {found} values, expected {expected}")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("`{0}` during column construction")]
    InvalidColumn(String),
    #[error("object nesting exceeds {max} levels")]
    NestingTooDeep { max: usize },
    #[error(
        "corrupt serialized form at {}: {reason}",
        .component.map_or_else(|| "header".to_string(), |i| format!("component {}", i))
    )]
    CorruptSerializedForm {
        component: Option<usize>,
        reason: String,
    },
}

impl ColumnarError {
    pub(crate) fn corrupt_header(reason: impl Into<String>) -> Self {
        ColumnarError::CorruptSerializedForm {
            component: None,
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt_component(component: usize, reason: impl Into<String>) -> Self {
        ColumnarError::CorruptSerializedForm {
            component: Some(component),
            reason: reason.into(),
        }
    }
}
