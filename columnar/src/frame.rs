use itertools::Itertools;
use serde::Serialize;

use crate::{ColumnSource, ColumnarError, Value};

/// A named sequence of values, one column of a [Frame].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<Value>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Column-major object form: what tables are built from and materialized into.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    series: Vec<Series>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column<V: Into<Value>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.push(Series::new(
            name,
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn push(&mut self, series: Series) {
        self.series.push(series);
    }

    pub fn columns(&self) -> &[Series] {
        &self.series
    }

    pub fn column(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn num_columns(&self) -> usize {
        self.series.len()
    }

    pub fn num_rows(&self) -> usize {
        self.series.first().map_or(0, Series::len)
    }

    pub fn into_columns(self) -> Vec<Series> {
        self.series
    }

    /// Transposes into row-major order.
    pub fn to_rows(&self) -> Vec<Vec<Value>> {
        (0..self.num_rows())
            .map(|row| {
                self.series
                    .iter()
                    .map(|s| s.values.get(row).cloned().unwrap_or(Value::Null))
                    .collect_vec()
            })
            .collect()
    }
}

impl From<RowBatch> for Frame {
    fn from(batch: RowBatch) -> Self {
        let mut columns = batch
            .names
            .into_iter()
            .map(|name| Series::new(name, Vec::with_capacity(batch.rows.len())))
            .collect_vec();
        for row in batch.rows {
            for (series, value) in columns.iter_mut().zip(row) {
                series.values.push(value);
            }
        }
        Frame { series: columns }
    }
}

impl ColumnSource for Frame {
    fn num_columns(&self) -> usize {
        self.series.len()
    }

    fn column_name(&self, column: usize) -> &str {
        &self.series[column].name
    }

    fn column_len(&self, column: usize) -> usize {
        self.series[column].len()
    }

    fn value(&self, column: usize, row: usize) -> &Value {
        &self.series[column].values[row]
    }
}

/// Row-major object form. Every row holds one value per column name.
#[derive(Debug, Clone, PartialEq)]
pub struct RowBatch {
    names: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RowBatch {
    pub fn try_new(names: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, ColumnarError> {
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != names.len())
        {
            return Err(ColumnarError::RowWidthMismatch {
                row,
                expected: names.len(),
                found: values.len(),
            });
        }
        Ok(Self { names, rows })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

impl ColumnSource for RowBatch {
    fn num_columns(&self) -> usize {
        self.names.len()
    }

    fn column_name(&self, column: usize) -> &str {
        &self.names[column]
    }

    fn column_len(&self, _column: usize) -> usize {
        self.rows.len()
    }

    fn value(&self, column: usize, row: usize) -> &Value {
        &self.rows[row][column]
    }
}
