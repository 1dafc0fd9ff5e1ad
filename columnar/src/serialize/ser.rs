use super::{
    header::{ColumnMeta, Node},
    Object, MAX_NESTING_DEPTH, MAX_NULL_ROWS,
};
use crate::{Column, ColumnarError, DataType};

/// Pre-order walk over `root` with an explicit stack. Returns the header
/// nodes and the components in the order the nodes consume them.
pub(crate) fn walk<'s>(
    root: &'s Object<'_>,
) -> Result<(Vec<Node>, Vec<&'s [u8]>), ColumnarError> {
    let mut nodes = Vec::new();
    let mut components = Vec::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((object, depth)) = stack.pop() {
        let node = match object {
            Object::Null => Node::Null,
            Object::Bool(v) => Node::Bool(*v),
            Object::Int(v) => Node::Int(*v),
            Object::Float(v) => Node::Float(*v),
            Object::Str(v) => Node::Str(v.clone()),
            Object::List(items) => {
                check_depth(depth, items.is_empty())?;
                stack.extend(items.iter().rev().map(|item| (item, depth + 1)));
                Node::List {
                    len: items.len() as u64,
                }
            }
            Object::Map(entries) => {
                check_depth(depth, entries.is_empty())?;
                stack.extend(entries.iter().rev().map(|(_, v)| (v, depth + 1)));
                Node::Map {
                    keys: entries.iter().map(|(k, _)| k.clone()).collect(),
                }
            }
            Object::Column(column) => {
                if column.data_type() == DataType::Null {
                    check_null_rows(column.len())?;
                }
                push_components(column, &mut components);
                Node::Column(ColumnMeta::of(column))
            }
            Object::Table(table) => {
                if table.columns().iter().all(|c| c.data_type() == DataType::Null) {
                    check_null_rows(table.num_rows())?;
                }
                let mut columns = Vec::with_capacity(table.num_columns());
                for (name, column) in table.iter() {
                    push_components(column, &mut components);
                    columns.push((name.to_string(), ColumnMeta::of(column)));
                }
                Node::Table {
                    num_rows: table.num_rows() as u64,
                    columns,
                }
            }
        };
        nodes.push(node);
    }
    Ok((nodes, components))
}

fn check_depth(depth: usize, empty: bool) -> Result<(), ColumnarError> {
    if !empty && depth >= MAX_NESTING_DEPTH {
        return Err(ColumnarError::NestingTooDeep {
            max: MAX_NESTING_DEPTH,
        });
    }
    Ok(())
}

/// Null columns carry no bytes, so nothing else bounds their row count.
fn check_null_rows(rows: usize) -> Result<(), ColumnarError> {
    if rows > MAX_NULL_ROWS {
        return Err(ColumnarError::InvalidColumn(format!(
            "{} rows of nulls with no payload column, at most {} allowed",
            rows, MAX_NULL_ROWS
        )));
    }
    Ok(())
}

fn push_components<'s>(column: &'s Column<'_>, components: &mut Vec<&'s [u8]>) {
    components.extend(column.buffers().into_iter().map(|b| b.as_slice()));
}
