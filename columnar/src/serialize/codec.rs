use postcard::{de_flavors::Flavor as DeFlavor, ser_flavors::Flavor, Deserializer, Serializer};
use serde::{Deserialize, Serialize};

use crate::ColumnarError;

/// Read cursor that hands back whatever it did not consume, so the bytes
/// following the header stay addressable.
#[derive(Debug)]
pub struct Cursor<'de> {
    original: &'de [u8],
    pos: usize,
    end: usize,
}

impl<'de> Cursor<'de> {
    pub fn new(bytes: &'de [u8]) -> Self {
        Self {
            pos: 0,
            original: bytes,
            end: bytes.len(),
        }
    }
}

impl<'de> DeFlavor<'de> for Cursor<'de> {
    type Remainder = &'de [u8];
    type Source = &'de [u8];

    fn pop(&mut self) -> postcard::Result<u8> {
        if self.pos + 1 > self.end {
            Err(postcard::Error::DeserializeUnexpectedEnd)
        } else {
            let res = Ok(self.original[self.pos]);
            self.pos += 1;
            res
        }
    }

    fn try_take_n(&mut self, ct: usize) -> postcard::Result<&'de [u8]> {
        if self
            .pos
            .checked_add(ct)
            .ok_or(postcard::Error::DeserializeUnexpectedEnd)?
            > self.end
        {
            Err(postcard::Error::DeserializeUnexpectedEnd)
        } else {
            let sli = &self.original[self.pos..self.pos + ct];
            self.pos += ct;
            Ok(sli)
        }
    }

    fn finalize(self) -> postcard::Result<Self::Remainder> {
        Ok(&self.original[self.pos..])
    }
}

pub(crate) struct HeaderDecoder<'de> {
    de: Deserializer<'de, Cursor<'de>>,
}

impl<'de> HeaderDecoder<'de> {
    pub fn new(bytes: &'de [u8]) -> Self {
        Self {
            de: Deserializer::from_flavor(Cursor::new(bytes)),
        }
    }

    pub fn decode<T: Deserialize<'de>>(&mut self) -> Result<T, ColumnarError> {
        Ok(T::deserialize(&mut self.de)?)
    }

    /// The bytes after everything decoded so far.
    pub fn finalize(self) -> Result<&'de [u8], ColumnarError> {
        Ok(self.de.finalize()?)
    }
}

#[derive(Debug, Default, Clone)]
pub struct AllocVec {
    vec: Vec<u8>,
}

impl Flavor for AllocVec {
    type Output = Vec<u8>;

    #[inline(always)]
    fn try_extend(&mut self, data: &[u8]) -> postcard::Result<()> {
        self.vec.extend_from_slice(data);
        Ok(())
    }

    #[inline(always)]
    fn try_push(&mut self, data: u8) -> postcard::Result<()> {
        self.vec.push(data);
        Ok(())
    }

    fn finalize(self) -> postcard::Result<Self::Output> {
        Ok(self.vec)
    }
}

pub(crate) struct HeaderEncoder {
    ser: Serializer<AllocVec>,
}

impl HeaderEncoder {
    pub fn new() -> Self {
        Self {
            ser: Serializer {
                output: AllocVec::default(),
            },
        }
    }

    pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ColumnarError> {
        value.serialize(&mut self.ser)?;
        Ok(())
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, ColumnarError> {
        Ok(self.ser.output.finalize()?)
    }
}
