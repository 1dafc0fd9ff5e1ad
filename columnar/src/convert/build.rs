use itertools::Itertools;
use tracing::debug;

use crate::{column::ColumnBuilder, ColumnSource, ColumnarError, DataType, Table, Value};

/// Controls how [build_table] types the source columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOptions {
    declared: Vec<(String, DataType)>,
    promote_int_to_float: bool,
    nan_as_null: bool,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the type of column `name` instead of inferring it.
    pub fn with_type(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        let name = name.into();
        self.declared.retain(|(n, _)| *n != name);
        self.declared.push((name, data_type));
        self
    }

    /// Allows integer values in floating-point columns.
    pub fn promote_int_to_float(mut self, enable: bool) -> Self {
        self.promote_int_to_float = enable;
        self
    }

    /// Stores NaN as null instead of as a valid value.
    pub fn nan_as_null(mut self, enable: bool) -> Self {
        self.nan_as_null = enable;
        self
    }

    pub fn declared_type(&self, name: &str) -> Option<DataType> {
        self.declared
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data_type)| *data_type)
    }
}

/// Builds a columnar table from `source`, keeping its column order.
///
/// Columns without a declared type are inferred from their values. Either
/// the whole table is built or an error is returned.
pub fn build_table<S: ColumnSource + ?Sized>(
    source: &S,
    options: &BuildOptions,
) -> Result<Table<'static>, ColumnarError> {
    let num_columns = source.num_columns();
    for (name, _) in options.declared.iter() {
        if !(0..num_columns).any(|c| source.column_name(c) == name) {
            return Err(ColumnarError::SchemaInference {
                column: name.clone(),
                reason: "declared column not found in source".to_string(),
            });
        }
    }

    let num_rows = if num_columns > 0 {
        source.column_len(0)
    } else {
        0
    };
    let columns = (0..num_columns)
        .map(|c| {
            let name = source.column_name(c);
            let len = source.column_len(c);
            if len != num_rows {
                return Err(ColumnarError::LengthMismatch {
                    column: name.to_string(),
                    expected: num_rows,
                    found: len,
                });
            }
            let data_type = match options.declared_type(name) {
                Some(data_type) => data_type,
                None => infer_type(source, c, options)?,
            };
            let mut builder = ColumnBuilder::with_capacity(name, data_type, len);
            for row in 0..len {
                append_value(&mut builder, source.value(c, row), options)?;
            }
            Ok((name.to_string(), builder.finish()))
        })
        .collect::<Result<Vec<_>, ColumnarError>>()?;

    let table = Table::try_new(columns)?;
    debug!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        "built table"
    );
    Ok(table)
}

fn append_value(
    builder: &mut ColumnBuilder,
    value: &Value,
    options: &BuildOptions,
) -> Result<(), ColumnarError> {
    let promote = options.promote_int_to_float && builder.data_type().is_float();
    match value {
        Value::Null => builder.append_null(),
        Value::Bool(v) => builder.append_bool(*v)?,
        Value::Int(v) if promote => builder.append_f64(*v as f64)?,
        Value::Int(v) => builder.append_i64(*v)?,
        Value::UInt(v) if promote => builder.append_f64(*v as f64)?,
        Value::UInt(v) => builder.append_u64(*v)?,
        Value::Float(v) if v.is_nan() && options.nan_as_null => builder.append_null(),
        Value::Float(v) => builder.append_f64(*v)?,
        Value::Str(s) => builder.append_str(s)?,
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Seen {
    bool: bool,
    int: bool,
    negative: bool,
    uint: bool,
    above_i64: bool,
    float: bool,
    str: bool,
}

fn infer_type<S: ColumnSource + ?Sized>(
    source: &S,
    column: usize,
    options: &BuildOptions,
) -> Result<DataType, ColumnarError> {
    let mut seen = Seen::default();
    for row in 0..source.column_len(column) {
        match source.value(column, row) {
            Value::Null => {}
            Value::Bool(_) => seen.bool = true,
            Value::Int(v) => {
                seen.int = true;
                seen.negative |= *v < 0;
            }
            Value::UInt(v) => {
                seen.uint = true;
                seen.above_i64 |= *v > i64::MAX as u64;
            }
            Value::Float(_) => seen.float = true,
            Value::Str(_) => seen.str = true,
        }
    }

    let fail = |reason: &str| ColumnarError::SchemaInference {
        column: source.column_name(column).to_string(),
        reason: reason.to_string(),
    };

    let numeric = seen.int || seen.uint || seen.float;
    if [seen.bool, numeric, seen.str].iter().filter(|s| **s).count() > 1 {
        let kinds = [
            (seen.bool, "bool"),
            (numeric, "number"),
            (seen.str, "str"),
        ]
        .iter()
        .filter(|(s, _)| *s)
        .map(|(_, kind)| *kind)
        .join(", ");
        return Err(fail(&format!("heterogeneous values: {}", kinds)));
    }

    let data_type = if seen.bool {
        DataType::Boolean
    } else if seen.str {
        DataType::Utf8
    } else if seen.float {
        if (seen.int || seen.uint) && !options.promote_int_to_float {
            return Err(fail(
                "mixed integer and floating-point values without int-to-float promotion",
            ));
        }
        DataType::Float64
    } else if seen.int || seen.uint {
        if seen.negative && seen.above_i64 {
            return Err(fail(
                "no integer type holds both negative values and values above i64::MAX",
            ));
        }
        if seen.above_i64 || !seen.int {
            DataType::UInt64
        } else {
            DataType::Int64
        }
    } else {
        DataType::Null
    };
    Ok(data_type)
}
