use arbitrary::Arbitrary;
use columnar_interchange::{
    build_table, deserialize, deserialize_components, materialize, serialize, BuildOptions,
    Frame, MaterializeOptions, Object, Value,
};

#[derive(Debug, Clone, Arbitrary, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl From<Cell> for Value {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Null => Value::Null,
            Cell::Bool(v) => Value::Bool(v),
            Cell::Int(v) => Value::Int(v),
            Cell::UInt(v) => Value::UInt(v),
            Cell::Float(v) => Value::Float(v),
            Cell::Str(v) => Value::from(v),
        }
    }
}

#[derive(Debug, Clone, Arbitrary, PartialEq)]
pub struct Sample {
    pub columns: Vec<(String, Vec<Cell>)>,
    pub promote_int_to_float: bool,
    pub nan_as_null: bool,
    pub deduplicate: bool,
}

impl Sample {
    pub fn frame(&self) -> Frame {
        self.columns
            .iter()
            .fold(Frame::new(), |frame, (name, cells)| {
                frame.with_column(name.clone(), cells.iter().cloned())
            })
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions::new()
            .promote_int_to_float(self.promote_int_to_float)
            .nan_as_null(self.nan_as_null)
    }
}

/// Builds, serializes both ways and materializes again. Whatever builds must
/// come back identical from the buffer and from the components.
pub fn check_roundtrip(sample: &Sample) {
    let Ok(table) = build_table(&sample.frame(), &sample.build_options()) else {
        return;
    };
    let options = MaterializeOptions::new().deduplicate(sample.deduplicate);
    let expected = materialize(&table, &options);
    let object = Object::from(table);
    let form = serialize(&object).unwrap();

    let buffer = form.to_buffer();
    let from_buffer = deserialize(&buffer).unwrap();
    assert_eq!(from_buffer, object);
    let components = form.to_components();
    let from_components = deserialize_components(components.header, &components.data).unwrap();
    assert_eq!(from_components, object);

    let table = from_buffer.as_table().unwrap();
    assert_eq!(materialize(table, &options), expected);
}

/// Raw fuzz input for the components path: header bytes plus components
/// cut at the given lengths.
#[derive(Debug, Clone, Arbitrary)]
pub struct RawComponents {
    pub header: Vec<u8>,
    pub data: Vec<u8>,
    pub cuts: Vec<u16>,
}

impl RawComponents {
    pub fn components(&self) -> Vec<&[u8]> {
        let mut rest = self.data.as_slice();
        let mut out = Vec::with_capacity(self.cuts.len());
        for cut in self.cuts.iter() {
            let (head, tail) = rest.split_at((*cut as usize).min(rest.len()));
            out.push(head);
            rest = tail;
        }
        out
    }
}
