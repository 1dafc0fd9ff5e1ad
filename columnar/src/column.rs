use std::{fmt::Debug, sync::Arc};

use crate::{
    buffer::{Bitmap, BitmapBuilder, Buffer},
    ColumnarError, DataType, Value, ValueKind,
};

/// One typed column: a value buffer, an offsets buffer for strings and an
/// optional validity bitmap.
///
/// Every constructor checks the layout invariants, so row access never has to
/// re-validate: fixed-width buffers hold exactly `len` values, string offsets
/// are monotonic and every string slice is valid UTF-8.
#[derive(Clone)]
pub struct Column<'a> {
    data_type: DataType,
    len: usize,
    null_count: usize,
    validity: Option<Bitmap<'a>>,
    offsets: Option<Buffer<'a>>,
    values: Buffer<'a>,
}

/// Which raw buffer of a column failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnPart {
    Validity,
    Offsets,
    Values,
}

impl<'a> Column<'a> {
    /// Assembles a column from raw buffers, checking them against `data_type`
    /// and `len`.
    pub fn try_from_parts(
        data_type: DataType,
        len: usize,
        validity: Option<Buffer<'a>>,
        offsets: Option<Buffer<'a>>,
        values: Buffer<'a>,
    ) -> Result<Self, ColumnarError> {
        Self::check_parts(data_type, len, validity, offsets, values).map_err(|(_, e)| e)
    }

    /// Like [Column::try_from_parts], also naming the buffer at fault.
    pub(crate) fn check_parts(
        data_type: DataType,
        len: usize,
        validity: Option<Buffer<'a>>,
        offsets: Option<Buffer<'a>>,
        values: Buffer<'a>,
    ) -> Result<Self, (ColumnPart, ColumnarError)> {
        let invalid = |part, reason: String| (part, ColumnarError::InvalidColumn(reason));
        if data_type == DataType::Null {
            if validity.is_some() {
                return Err(invalid(
                    ColumnPart::Validity,
                    "null column must not carry a validity bitmap".to_string(),
                ));
            }
            if offsets.is_some() {
                return Err(invalid(
                    ColumnPart::Offsets,
                    "null column must not carry offsets".to_string(),
                ));
            }
            if !values.is_empty() {
                return Err(invalid(
                    ColumnPart::Values,
                    format!("null column carries {} value bytes", values.len()),
                ));
            }
            return Ok(Self {
                data_type,
                len,
                null_count: len,
                validity: None,
                offsets: None,
                values,
            });
        }

        let validity = validity
            .map(|bits| Bitmap::try_new(bits, len))
            .transpose()
            .map_err(|e| (ColumnPart::Validity, e))?;
        let null_count = validity.as_ref().map_or(0, Bitmap::count_unset);

        match (data_type.has_offsets(), &offsets) {
            (true, None) => {
                return Err(invalid(
                    ColumnPart::Offsets,
                    format!("{} column requires an offsets buffer", data_type),
                ))
            }
            (false, Some(_)) => {
                return Err(invalid(
                    ColumnPart::Offsets,
                    format!("{} column must not carry an offsets buffer", data_type),
                ))
            }
            _ => {}
        }

        match data_type {
            DataType::Boolean => {
                if values.len() < len.div_ceil(8) {
                    return Err(invalid(
                        ColumnPart::Values,
                        format!(
                            "boolean values too short: {} bytes for {} rows",
                            values.len(),
                            len
                        ),
                    ));
                }
            }
            DataType::Utf8 => {
                if let Some(offsets) = &offsets {
                    validate_utf8(len, offsets, &values)?;
                }
            }
            _ => {
                let width = data_type.byte_width().unwrap_or_default();
                if Some(values.len()) != width.checked_mul(len) {
                    return Err(invalid(
                        ColumnPart::Values,
                        format!(
                            "{} values hold {} bytes, expected {} x {}",
                            data_type,
                            values.len(),
                            len,
                            width
                        ),
                    ));
                }
            }
        }

        Ok(Self {
            data_type,
            len,
            null_count,
            validity,
            offsets,
            values,
        })
    }

    pub fn from_i64s(values: impl IntoIterator<Item = Option<i64>>) -> Column<'static> {
        let mut builder = ColumnBuilder::new("", DataType::Int64);
        for value in values {
            match value {
                Some(v) => builder.push_fixed(&v.to_le_bytes()),
                None => builder.append_null(),
            }
        }
        builder.finish()
    }

    pub fn from_f64s(values: impl IntoIterator<Item = Option<f64>>) -> Column<'static> {
        let mut builder = ColumnBuilder::new("", DataType::Float64);
        for value in values {
            match value {
                Some(v) => builder.push_fixed(&v.to_le_bytes()),
                None => builder.append_null(),
            }
        }
        builder.finish()
    }

    pub fn from_bools(values: impl IntoIterator<Item = Option<bool>>) -> Column<'static> {
        let mut builder = ColumnBuilder::new("", DataType::Boolean);
        for value in values {
            match value {
                Some(v) => builder.push_bool(v),
                None => builder.append_null(),
            }
        }
        builder.finish()
    }

    pub fn from_strs<'s>(
        values: impl IntoIterator<Item = Option<&'s str>>,
    ) -> Result<Column<'static>, ColumnarError> {
        let mut builder = ColumnBuilder::new("", DataType::Utf8);
        for value in values {
            match value {
                Some(v) => builder.append_str(v)?,
                None => builder.append_null(),
            }
        }
        Ok(builder.finish())
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn null_count(&self) -> usize {
        self.null_count
    }

    pub fn validity(&self) -> Option<&Bitmap<'a>> {
        self.validity.as_ref()
    }

    pub fn offsets(&self) -> Option<&Buffer<'a>> {
        self.offsets.as_ref()
    }

    pub fn values(&self) -> &Buffer<'a> {
        &self.values
    }

    /// Buffers in serialization order: validity, offsets, values.
    pub fn buffers(&self) -> Vec<&Buffer<'a>> {
        let mut buffers = Vec::with_capacity(3);
        if let Some(validity) = &self.validity {
            buffers.push(validity.buffer());
        }
        if let Some(offsets) = &self.offsets {
            buffers.push(offsets);
        }
        buffers.push(&self.values);
        buffers
    }

    /// Panics when `index` is out of bounds, like slice indexing.
    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        assert!(
            index < self.len,
            "row {} out of bounds for column of length {}",
            index,
            self.len
        );
        if self.data_type == DataType::Null {
            return false;
        }
        self.validity.as_ref().map_or(true, |v| v.is_set(index))
    }

    #[inline]
    pub fn is_null(&self, index: usize) -> bool {
        !self.is_valid(index)
    }

    /// Raw bytes of row `index`: the little-endian value for fixed-width
    /// types, the UTF-8 bytes for strings, empty for booleans and nulls.
    #[inline]
    pub fn value_bytes(&self, index: usize) -> &[u8] {
        match self.data_type {
            DataType::Null | DataType::Boolean => &[],
            DataType::Utf8 => {
                let (start, end) = self.str_range(index);
                &self.values[start..end]
            }
            _ => {
                let width = self.data_type.byte_width().unwrap_or_default();
                &self.values[index * width..(index + 1) * width]
            }
        }
    }

    /// The string at row `index`, `None` for nulls and non-string columns.
    #[inline]
    pub fn str_value(&self, index: usize) -> Option<&str> {
        if self.data_type != DataType::Utf8 || !self.is_valid(index) {
            return None;
        }
        // Safety: every constructor validates the string slices as UTF-8
        Some(unsafe { std::str::from_utf8_unchecked(self.value_bytes(index)) })
    }

    #[inline]
    pub fn bool_value(&self, index: usize) -> Option<bool> {
        if self.data_type != DataType::Boolean || !self.is_valid(index) {
            return None;
        }
        Some((self.values[index / 8] >> (index % 8)) & 1 == 1)
    }

    /// Decodes row `index` into a fresh [Value].
    pub fn get(&self, index: usize) -> Value {
        if !self.is_valid(index) {
            return Value::Null;
        }
        let v = &self.values;
        match self.data_type {
            DataType::Null => Value::Null,
            DataType::Boolean => Value::Bool(self.bool_value(index).unwrap_or_default()),
            DataType::Int8 => Value::Int(i8::from_le_bytes(v.chunk(index)) as i64),
            DataType::Int16 => Value::Int(i16::from_le_bytes(v.chunk(index)) as i64),
            DataType::Int32 => Value::Int(i32::from_le_bytes(v.chunk(index)) as i64),
            DataType::Int64 => Value::Int(i64::from_le_bytes(v.chunk(index))),
            DataType::UInt8 => Value::UInt(u8::from_le_bytes(v.chunk(index)) as u64),
            DataType::UInt16 => Value::UInt(u16::from_le_bytes(v.chunk(index)) as u64),
            DataType::UInt32 => Value::UInt(u32::from_le_bytes(v.chunk(index)) as u64),
            DataType::UInt64 => Value::UInt(u64::from_le_bytes(v.chunk(index))),
            DataType::Float32 => Value::Float(f32::from_le_bytes(v.chunk(index)) as f64),
            DataType::Float64 => Value::Float(f64::from_le_bytes(v.chunk(index))),
            DataType::Utf8 => Value::Str(Arc::from(self.str_value(index).unwrap_or_default())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len).map(|i| self.get(i))
    }

    /// Copies any borrowed buffer so the column outlives its source.
    pub fn into_owned(self) -> Column<'static> {
        Column {
            data_type: self.data_type,
            len: self.len,
            null_count: self.null_count,
            validity: self.validity.map(Bitmap::into_owned),
            offsets: self.offsets.map(Buffer::into_owned),
            values: self.values.into_owned(),
        }
    }

    #[inline]
    fn str_range(&self, index: usize) -> (usize, usize) {
        match &self.offsets {
            Some(offsets) => (
                offsets.u32_at(index) as usize,
                offsets.u32_at(index + 1) as usize,
            ),
            None => (0, 0),
        }
    }
}

/// Offsets that are misshapen or decreasing blame the offsets buffer; offsets
/// pointing past the data or slicing invalid UTF-8 blame the values.
fn validate_utf8(
    len: usize,
    offsets: &Buffer,
    values: &Buffer,
) -> Result<(), (ColumnPart, ColumnarError)> {
    let invalid = |part, reason: String| (part, ColumnarError::InvalidColumn(reason));
    if Some(offsets.len()) != len.checked_add(1).and_then(|n| n.checked_mul(4)) {
        return Err(invalid(
            ColumnPart::Offsets,
            format!(
                "offsets hold {} bytes, expected {} entries",
                offsets.len(),
                len.saturating_add(1)
            ),
        ));
    }
    let mut start = offsets.u32_at(0) as usize;
    if start > values.len() {
        return Err(invalid(
            ColumnPart::Values,
            format!("first offset {} beyond {} data bytes", start, values.len()),
        ));
    }
    for i in 1..=len {
        let end = offsets.u32_at(i) as usize;
        if end < start {
            return Err(invalid(
                ColumnPart::Offsets,
                format!("offset {} is smaller than the one before it", i),
            ));
        }
        if end > values.len() {
            return Err(invalid(
                ColumnPart::Values,
                format!("offset {} beyond {} data bytes", i, values.len()),
            ));
        }
        if std::str::from_utf8(&values[start..end]).is_err() {
            return Err(invalid(
                ColumnPart::Values,
                format!("row {} is not valid utf-8", i - 1),
            ));
        }
        start = end;
    }
    Ok(())
}

/// Logical equality: same type and length, same null rows, same value bytes
/// for valid rows.
impl PartialEq for Column<'_> {
    fn eq(&self, other: &Self) -> bool {
        if self.data_type != other.data_type || self.len != other.len {
            return false;
        }
        (0..self.len).all(|i| match (self.is_valid(i), other.is_valid(i)) {
            (true, true) => {
                self.value_bytes(i) == other.value_bytes(i)
                    && self.bool_value(i) == other.bool_value(i)
            }
            (false, false) => true,
            _ => false,
        })
    }
}

impl Debug for Column<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("data_type", &self.data_type)
            .field("len", &self.len)
            .field("null_count", &self.null_count)
            .field("values", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Appends values of one declared type into fresh buffers.
pub struct ColumnBuilder {
    name: String,
    data_type: DataType,
    len: usize,
    null_count: usize,
    validity: BitmapBuilder,
    bools: BitmapBuilder,
    offsets: Vec<u8>,
    values: Vec<u8>,
}

impl ColumnBuilder {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self::with_capacity(name, data_type, 0)
    }

    pub fn with_capacity(name: impl Into<String>, data_type: DataType, capacity: usize) -> Self {
        let mut offsets = Vec::new();
        if data_type.has_offsets() {
            offsets.reserve(4 * (capacity + 1));
            offsets.extend_from_slice(&0u32.to_le_bytes());
        }
        let values = match data_type.byte_width() {
            Some(width) => Vec::with_capacity(width * capacity),
            None => Vec::new(),
        };
        Self {
            name: name.into(),
            data_type,
            len: 0,
            null_count: 0,
            validity: BitmapBuilder::with_capacity(capacity),
            bools: BitmapBuilder::default(),
            offsets,
            values,
        }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn append_null(&mut self) {
        match self.data_type {
            DataType::Null => {}
            DataType::Boolean => self.bools.push(false),
            DataType::Utf8 => {
                let end = self.values.len() as u32;
                self.offsets.extend_from_slice(&end.to_le_bytes());
            }
            _ => {
                let width = self.data_type.byte_width().unwrap_or_default();
                self.values.resize(self.values.len() + width, 0);
            }
        }
        self.validity.push(false);
        self.null_count += 1;
        self.len += 1;
    }

    pub fn append_bool(&mut self, value: bool) -> Result<(), ColumnarError> {
        if self.data_type != DataType::Boolean {
            return Err(self.mismatch(ValueKind::Bool));
        }
        self.push_bool(value);
        Ok(())
    }

    pub fn append_i64(&mut self, value: i64) -> Result<(), ColumnarError> {
        self.push_integer(value as i128, ValueKind::Int)
    }

    pub fn append_u64(&mut self, value: u64) -> Result<(), ColumnarError> {
        self.push_integer(value as i128, ValueKind::UInt)
    }

    /// Stores `value` bit-for-bit; NaN is a regular value here.
    pub fn append_f64(&mut self, value: f64) -> Result<(), ColumnarError> {
        match self.data_type {
            DataType::Float32 => self.push_fixed(&(value as f32).to_le_bytes()),
            DataType::Float64 => self.push_fixed(&value.to_le_bytes()),
            _ => return Err(self.mismatch(ValueKind::Float)),
        }
        Ok(())
    }

    pub fn append_str(&mut self, value: &str) -> Result<(), ColumnarError> {
        if self.data_type != DataType::Utf8 {
            return Err(self.mismatch(ValueKind::Str));
        }
        let end = u32::try_from(self.values.len() + value.len()).map_err(|_| {
            ColumnarError::InvalidColumn(format!(
                "string data of column `{}` exceeds u32 offsets",
                self.name
            ))
        })?;
        self.values.extend_from_slice(value.as_bytes());
        self.offsets.extend_from_slice(&end.to_le_bytes());
        self.push_valid();
        Ok(())
    }

    pub fn finish(self) -> Column<'static> {
        let len = self.len;
        if self.data_type == DataType::Null {
            return Column {
                data_type: self.data_type,
                len,
                null_count: len,
                validity: None,
                offsets: None,
                values: Buffer::empty(),
            };
        }
        let validity = (self.null_count > 0).then(|| self.validity.finish());
        let values = if self.data_type == DataType::Boolean {
            self.bools.into_bytes()
        } else {
            self.values
        };
        Column {
            data_type: self.data_type,
            len,
            null_count: self.null_count,
            validity,
            offsets: self
                .data_type
                .has_offsets()
                .then(|| Buffer::from_vec(self.offsets)),
            values: Buffer::from_vec(values),
        }
    }

    pub(crate) fn mismatch(&self, found: ValueKind) -> ColumnarError {
        ColumnarError::TypeMismatch {
            column: self.name.clone(),
            row: self.len,
            expected: self.data_type,
            found,
        }
    }

    fn push_integer(&mut self, value: i128, found: ValueKind) -> Result<(), ColumnarError> {
        let Some((min, max)) = self.data_type.integer_bounds() else {
            return Err(self.mismatch(found));
        };
        if value < min || value > max {
            return Err(self.mismatch(found));
        }
        match self.data_type {
            DataType::Int8 => self.push_fixed(&(value as i8).to_le_bytes()),
            DataType::Int16 => self.push_fixed(&(value as i16).to_le_bytes()),
            DataType::Int32 => self.push_fixed(&(value as i32).to_le_bytes()),
            DataType::Int64 => self.push_fixed(&(value as i64).to_le_bytes()),
            DataType::UInt8 => self.push_fixed(&(value as u8).to_le_bytes()),
            DataType::UInt16 => self.push_fixed(&(value as u16).to_le_bytes()),
            DataType::UInt32 => self.push_fixed(&(value as u32).to_le_bytes()),
            _ => self.push_fixed(&(value as u64).to_le_bytes()),
        }
        Ok(())
    }

    #[inline]
    fn push_fixed(&mut self, bytes: &[u8]) {
        self.values.extend_from_slice(bytes);
        self.push_valid();
    }

    #[inline]
    fn push_bool(&mut self, value: bool) {
        self.bools.push(value);
        self.push_valid();
    }

    #[inline]
    fn push_valid(&mut self) {
        self.validity.push(true);
        self.len += 1;
    }
}
