use std::{collections::HashMap, sync::Arc};

/// Maps the exact bytes of a string to the one shared instance handed out
/// for it.
///
/// Keys borrow from the column being materialized, so a lookup never
/// allocates; only the first occurrence of each distinct string does.
#[derive(Debug, Default)]
pub struct Interner<'c> {
    table: HashMap<&'c [u8], Arc<str>>,
    lookups: usize,
}

impl<'c> Interner<'c> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, value: &'c str) -> Arc<str> {
        self.lookups += 1;
        self.table
            .entry(value.as_bytes())
            .or_insert_with(|| Arc::from(value))
            .clone()
    }

    /// Number of distinct strings seen.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn lookups(&self) -> usize {
        self.lookups
    }
}
