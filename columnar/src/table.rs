use itertools::{izip, Itertools};

use crate::{Column, ColumnarError, DataType};

/// Ordered, named columns of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<'a> {
    names: Vec<String>,
    columns: Vec<Column<'a>>,
    num_rows: usize,
}

impl<'a> Table<'a> {
    pub fn try_new(
        columns: impl IntoIterator<Item = (String, Column<'a>)>,
    ) -> Result<Self, ColumnarError> {
        let (names, columns): (Vec<_>, Vec<_>) = columns.into_iter().unzip();
        let num_rows = columns.first().map_or(0, Column::len);
        for (name, column) in izip!(&names, &columns) {
            if column.len() != num_rows {
                return Err(ColumnarError::LengthMismatch {
                    column: name.clone(),
                    expected: num_rows,
                    found: column.len(),
                });
            }
        }
        Ok(Self {
            names,
            columns,
            num_rows,
        })
    }

    pub fn empty() -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            num_rows: 0,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> &[Column<'a>] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&Column<'a>> {
        self.columns.get(index)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column<'a>> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    pub fn schema(&self) -> Vec<(&str, DataType)> {
        izip!(&self.names, &self.columns)
            .map(|(name, column)| (name.as_str(), column.data_type()))
            .collect_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column<'a>)> {
        izip!(&self.names, &self.columns).map(|(name, column)| (name.as_str(), column))
    }

    /// Copies any borrowed buffer so the table outlives its source.
    pub fn into_owned(self) -> Table<'static> {
        Table {
            names: self.names,
            columns: self.columns.into_iter().map(Column::into_owned).collect(),
            num_rows: self.num_rows,
        }
    }
}
