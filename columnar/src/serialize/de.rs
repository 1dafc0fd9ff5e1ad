use super::{
    header::{ColumnMeta, Header, Node, FORMAT_VERSION},
    Object, MAX_NESTING_DEPTH, MAX_NULL_ROWS,
};
use crate::{column::ColumnPart, Buffer, Column, ColumnarError, DataType, Table};

/// Component slices handed out in header order.
struct Parts<'p, 'a> {
    data: &'p [&'a [u8]],
    next: usize,
}

impl<'a> Parts<'_, 'a> {
    fn take(&mut self) -> Result<&'a [u8], ColumnarError> {
        let part = self.data.get(self.next).copied().ok_or_else(|| {
            ColumnarError::corrupt_component(self.next, "missing component")
        })?;
        self.next += 1;
        Ok(part)
    }
}

/// A container still waiting for children.
enum Partial<'h, 'a> {
    List {
        items: Vec<Object<'a>>,
        len: usize,
    },
    Map {
        keys: &'h [String],
        entries: Vec<(String, Object<'a>)>,
    },
}

impl<'a> Partial<'_, 'a> {
    fn push(&mut self, child: Object<'a>) {
        match self {
            Partial::List { items, .. } => items.push(child),
            Partial::Map { keys, entries } => {
                let key = keys[entries.len()].clone();
                entries.push((key, child));
            }
        }
    }

    fn is_full(&self) -> bool {
        match self {
            Partial::List { items, len } => items.len() == *len,
            Partial::Map { keys, entries } => entries.len() == keys.len(),
        }
    }

    fn finish(self) -> Object<'a> {
        match self {
            Partial::List { items, .. } => Object::List(items),
            Partial::Map { entries, .. } => Object::Map(entries),
        }
    }
}

/// Rebuilds the object described by `header`, wrapping `data` as borrowed
/// buffers. Iterative, and all-or-nothing.
pub(crate) fn reconstruct<'a>(
    header: &Header,
    data: &[&'a [u8]],
) -> Result<Object<'a>, ColumnarError> {
    if header.version != FORMAT_VERSION {
        return Err(ColumnarError::corrupt_header(format!(
            "unsupported format version {}",
            header.version
        )));
    }

    let mut parts = Parts { data, next: 0 };
    let mut stack: Vec<Partial<'_, 'a>> = Vec::new();
    let mut root = None;
    let total = header.nodes.len();
    for (index, node) in header.nodes.iter().enumerate() {
        if root.is_some() {
            return Err(ColumnarError::corrupt_header(format!(
                "{} nodes after the root object",
                total - index
            )));
        }
        let remaining = total - index - 1;
        let object = match node {
            Node::Null => Object::Null,
            Node::Bool(v) => Object::Bool(*v),
            Node::Int(v) => Object::Int(*v),
            Node::Float(v) => Object::Float(*v),
            Node::Str(v) => Object::Str(v.clone()),
            Node::List { len } => {
                let len = usize::try_from(*len).unwrap_or(usize::MAX);
                if len > remaining {
                    return Err(ColumnarError::corrupt_header(format!(
                        "list of {} items with {} nodes left",
                        len, remaining
                    )));
                }
                if len == 0 {
                    Object::List(Vec::new())
                } else {
                    open(&mut stack)?;
                    stack.push(Partial::List {
                        items: Vec::with_capacity(len),
                        len,
                    });
                    continue;
                }
            }
            Node::Map { keys } => {
                if keys.len() > remaining {
                    return Err(ColumnarError::corrupt_header(format!(
                        "map of {} entries with {} nodes left",
                        keys.len(),
                        remaining
                    )));
                }
                if keys.is_empty() {
                    Object::Map(Vec::new())
                } else {
                    open(&mut stack)?;
                    stack.push(Partial::Map {
                        keys,
                        entries: Vec::with_capacity(keys.len()),
                    });
                    continue;
                }
            }
            Node::Column(meta) => Object::Column(read_column(meta, None, &mut parts)?),
            Node::Table { num_rows, columns } => {
                Object::Table(read_table(*num_rows, columns, &mut parts)?)
            }
        };

        let mut done = Some(object);
        while let Some(object) = done.take() {
            match stack.last_mut() {
                None => root = Some(object),
                Some(partial) => {
                    partial.push(object);
                    if partial.is_full() {
                        done = stack.pop().map(Partial::finish);
                    }
                }
            }
        }
    }

    if !stack.is_empty() {
        return Err(ColumnarError::corrupt_header(
            "node list ends inside a container",
        ));
    }
    if parts.next != data.len() {
        return Err(ColumnarError::corrupt_component(
            parts.next,
            "component not referenced by any node",
        ));
    }
    root.ok_or_else(|| ColumnarError::corrupt_header("empty node list"))
}

fn open(stack: &mut Vec<Partial>) -> Result<(), ColumnarError> {
    if stack.len() >= MAX_NESTING_DEPTH {
        return Err(ColumnarError::corrupt_header(format!(
            "nesting deeper than {} levels",
            MAX_NESTING_DEPTH
        )));
    }
    Ok(())
}

/// `null_rows` is the row count a Null column must match when it sits in a
/// table next to columns that carry data.
fn read_column<'a>(
    meta: &ColumnMeta,
    null_rows: Option<u64>,
    parts: &mut Parts<'_, 'a>,
) -> Result<Column<'a>, ColumnarError> {
    let first = parts.next;
    let validity = if meta.has_validity {
        Some((parts.next, parts.take()?))
    } else {
        None
    };
    let offsets = if meta.data_type.has_offsets() {
        Some((parts.next, parts.take()?))
    } else {
        None
    };
    let values_at = parts.next;
    let values = parts.take()?;

    if meta.data_type == DataType::Null {
        match null_rows {
            Some(rows) if meta.len != rows => {
                return Err(ColumnarError::corrupt_component(
                    values_at,
                    format!("null column declares {} rows, table holds {}", meta.len, rows),
                ))
            }
            None if meta.len > MAX_NULL_ROWS as u64 => {
                return Err(ColumnarError::corrupt_component(
                    values_at,
                    format!(
                        "null column declares {} rows, at most {} allowed",
                        meta.len, MAX_NULL_ROWS
                    ),
                ))
            }
            _ => {}
        }
    }
    let len = usize::try_from(meta.len)
        .map_err(|_| ColumnarError::corrupt_component(first, "column length overflows usize"))?;

    let column = Column::check_parts(
        meta.data_type,
        len,
        validity.map(|(_, bits)| Buffer::borrowed(bits)),
        offsets.map(|(_, offsets)| Buffer::borrowed(offsets)),
        Buffer::borrowed(values),
    )
    .map_err(|(part, e)| {
        let index = match part {
            ColumnPart::Validity => validity.map(|(i, _)| i),
            ColumnPart::Offsets => offsets.map(|(i, _)| i),
            ColumnPart::Values => None,
        };
        ColumnarError::corrupt_component(index.unwrap_or(values_at), e.to_string())
    })?;
    if column.null_count() as u64 != meta.null_count {
        return Err(ColumnarError::corrupt_component(
            validity.map_or(values_at, |(i, _)| i),
            format!(
                "header declares {} nulls, validity holds {}",
                meta.null_count,
                column.null_count()
            ),
        ));
    }
    Ok(column)
}

fn read_table<'a>(
    num_rows: u64,
    columns: &[(String, ColumnMeta)],
    parts: &mut Parts<'_, 'a>,
) -> Result<Table<'a>, ColumnarError> {
    let payload_rows = columns
        .iter()
        .find(|(_, meta)| meta.data_type != DataType::Null)
        .map(|(_, meta)| meta.len);
    let columns = columns
        .iter()
        .map(|(name, meta)| {
            let first = parts.next;
            if meta.data_type != DataType::Null && Some(meta.len) != payload_rows {
                return Err(ColumnarError::corrupt_component(
                    first,
                    format!(
                        "column `{}` declares {} rows, table holds {}",
                        name,
                        meta.len,
                        payload_rows.unwrap_or_default()
                    ),
                ));
            }
            Ok((name.clone(), read_column(meta, payload_rows, parts)?))
        })
        .collect::<Result<Vec<_>, ColumnarError>>()?;
    let table = Table::try_new(columns).map_err(|e| ColumnarError::corrupt_header(e.to_string()))?;
    if table.num_rows() as u64 != num_rows {
        return Err(ColumnarError::corrupt_header(format!(
            "header declares {} rows, columns hold {}",
            num_rows,
            table.num_rows()
        )));
    }
    Ok(table)
}
