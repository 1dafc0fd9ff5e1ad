//! Splits an object graph into a header plus raw memory components and puts
//! it back together, either from one contiguous buffer or straight from the
//! components.
//!
//! Buffer layout: `MAGIC`, the postcard-encoded [Header], zero padding to
//! [ALIGNMENT], then every component followed by padding to [ALIGNMENT].

mod codec;
mod de;
mod header;
mod ser;

pub use header::{ColumnMeta, Header, Node};

use tracing::debug;

use crate::{Column, ColumnarError, Table};

pub const MAGIC: &[u8; 4] = b"CLMN";
pub const ALIGNMENT: usize = 8;
/// Deepest container nesting accepted in either direction.
pub const MAX_NESTING_DEPTH: usize = 100;
/// Most rows a null-typed column may hold when no column with a payload
/// fixes the row count, i.e. standalone or in a table of only null columns.
pub const MAX_NULL_ROWS: usize = 1 << 24;

/// A serializable object graph. Columns and tables keep their buffers, which
/// may borrow from `'a`.
#[derive(Debug, Clone, PartialEq)]
pub enum Object<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Object<'a>>),
    Map(Vec<(String, Object<'a>)>),
    Column(Column<'a>),
    Table(Table<'a>),
}

impl<'a> Object<'a> {
    pub fn as_table(&self) -> Option<&Table<'a>> {
        match self {
            Object::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn into_table(self) -> Option<Table<'a>> {
        match self {
            Object::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_column(&self) -> Option<&Column<'a>> {
        match self {
            Object::Column(column) => Some(column),
            _ => None,
        }
    }

    /// Copies every borrowed buffer. Depth is bounded by
    /// [MAX_NESTING_DEPTH] for anything that went through [deserialize].
    pub fn into_owned(self) -> Object<'static> {
        match self {
            Object::Null => Object::Null,
            Object::Bool(v) => Object::Bool(v),
            Object::Int(v) => Object::Int(v),
            Object::Float(v) => Object::Float(v),
            Object::Str(v) => Object::Str(v),
            Object::List(items) => Object::List(items.into_iter().map(Object::into_owned).collect()),
            Object::Map(entries) => Object::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, v.into_owned()))
                    .collect(),
            ),
            Object::Column(column) => Object::Column(column.into_owned()),
            Object::Table(table) => Object::Table(table.into_owned()),
        }
    }
}

impl<'a> From<Table<'a>> for Object<'a> {
    fn from(table: Table<'a>) -> Self {
        Object::Table(table)
    }
}

impl<'a> From<Column<'a>> for Object<'a> {
    fn from(column: Column<'a>) -> Self {
        Object::Column(column)
    }
}

impl From<bool> for Object<'_> {
    fn from(v: bool) -> Self {
        Object::Bool(v)
    }
}

impl From<i64> for Object<'_> {
    fn from(v: i64) -> Self {
        Object::Int(v)
    }
}

impl From<f64> for Object<'_> {
    fn from(v: f64) -> Self {
        Object::Float(v)
    }
}

impl From<&str> for Object<'_> {
    fn from(v: &str) -> Self {
        Object::Str(v.to_string())
    }
}

impl From<String> for Object<'_> {
    fn from(v: String) -> Self {
        Object::Str(v)
    }
}

impl<'a> From<Vec<Object<'a>>> for Object<'a> {
    fn from(v: Vec<Object<'a>>) -> Self {
        Object::List(v)
    }
}

/// Result of [serialize]: an encoded header plus components that alias the
/// source object's buffers. Immutable; every projection is pure.
#[derive(Debug, Clone)]
pub struct SerializedForm<'s> {
    header: Header,
    header_bytes: Vec<u8>,
    components: Vec<&'s [u8]>,
}

/// Header bytes and component slices, as handed out by
/// [SerializedForm::to_components].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Components<'s> {
    pub header: &'s [u8],
    pub data: Vec<&'s [u8]>,
}

impl Components<'_> {
    pub fn sizes(&self) -> Vec<usize> {
        self.data.iter().map(|c| c.len()).collect()
    }
}

impl<'s> SerializedForm<'s> {
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_bytes(&self) -> &[u8] {
        &self.header_bytes
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    /// Length of the buffer [SerializedForm::to_buffer] produces.
    pub fn buffer_len(&self) -> usize {
        let mut len = align_up(MAGIC.len() + self.header_bytes.len());
        for component in self.components.iter() {
            len = align_up(len + component.len());
        }
        len
    }

    /// Concatenates header and components into one buffer. This copies.
    pub fn to_buffer(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.buffer_len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&self.header_bytes);
        pad(&mut out);
        for component in self.components.iter() {
            out.extend_from_slice(component);
            pad(&mut out);
        }
        out
    }

    /// The header bytes plus the components themselves, without copying.
    pub fn to_components(&self) -> Components<'_> {
        Components {
            header: &self.header_bytes,
            data: self.components.clone(),
        }
    }
}

/// Walks `object` and records its shape; payload components borrow from it.
pub fn serialize<'s>(object: &'s Object<'_>) -> Result<SerializedForm<'s>, ColumnarError> {
    let (nodes, components) = ser::walk(object)?;
    let header = Header {
        version: header::FORMAT_VERSION,
        component_sizes: components.iter().map(|c| c.len() as u64).collect(),
        nodes,
    };
    let mut encoder = codec::HeaderEncoder::new();
    encoder.encode(&header)?;
    let header_bytes = encoder.into_bytes()?;
    debug!(
        nodes = header.nodes.len(),
        components = components.len(),
        header_bytes = header_bytes.len(),
        "serialized object"
    );
    Ok(SerializedForm {
        header,
        header_bytes,
        components,
    })
}

/// Reads an object back from a [SerializedForm::to_buffer] buffer. Column
/// buffers borrow from `buffer`.
pub fn deserialize(buffer: &[u8]) -> Result<Object<'_>, ColumnarError> {
    let body = buffer
        .strip_prefix(MAGIC.as_slice())
        .ok_or_else(|| ColumnarError::corrupt_header("missing magic bytes"))?;
    let mut decoder = codec::HeaderDecoder::new(body);
    let header: Header = decoder
        .decode()
        .map_err(|e| ColumnarError::corrupt_header(format!("undecodable header: {}", e)))?;
    let rest = decoder
        .finalize()
        .map_err(|e| ColumnarError::corrupt_header(e.to_string()))?;

    let mut pos = align_up(buffer.len() - rest.len());
    let mut components = Vec::with_capacity(header.component_sizes.len());
    for (i, size) in header.component_sizes.iter().enumerate() {
        let end = usize::try_from(*size)
            .ok()
            .and_then(|size| pos.checked_add(size))
            .filter(|end| *end <= buffer.len())
            .ok_or_else(|| {
                ColumnarError::corrupt_component(i, "extends past the end of the buffer")
            })?;
        components.push(&buffer[pos..end]);
        pos = align_up(end);
    }
    if pos < buffer.len() {
        return Err(ColumnarError::corrupt_header(format!(
            "{} trailing bytes after the last component",
            buffer.len() - pos
        )));
    }
    debug!(components = components.len(), "deserializing from buffer");
    de::reconstruct(&header, &components)
}

/// Reads an object back from header bytes and components. Payloads are
/// wrapped, never copied, so the result borrows from `data`.
pub fn deserialize_components<'a>(
    header: &[u8],
    data: &[&'a [u8]],
) -> Result<Object<'a>, ColumnarError> {
    let mut decoder = codec::HeaderDecoder::new(header);
    let header: Header = decoder
        .decode()
        .map_err(|e| ColumnarError::corrupt_header(format!("undecodable header: {}", e)))?;
    let rest = decoder
        .finalize()
        .map_err(|e| ColumnarError::corrupt_header(e.to_string()))?;
    if !rest.is_empty() {
        return Err(ColumnarError::corrupt_header(format!(
            "{} trailing bytes after the header",
            rest.len()
        )));
    }
    if header.component_sizes.len() != data.len() {
        return Err(ColumnarError::corrupt_header(format!(
            "header declares {} components, got {}",
            header.component_sizes.len(),
            data.len()
        )));
    }
    for (i, (size, component)) in header.component_sizes.iter().zip(data).enumerate() {
        if *size != component.len() as u64 {
            return Err(ColumnarError::corrupt_component(
                i,
                format!("declared {} bytes, got {}", size, component.len()),
            ));
        }
    }
    debug!(components = data.len(), "deserializing from components");
    de::reconstruct(&header, data)
}

#[inline]
fn align_up(n: usize) -> usize {
    n.div_ceil(ALIGNMENT) * ALIGNMENT
}

fn pad(out: &mut Vec<u8>) {
    out.resize(align_up(out.len()), 0);
}
