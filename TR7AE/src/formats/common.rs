//! Bounds-checked reads shared by the container, mesh and texture readers.
//!
//! Every structure in these files is addressed by absolute or base-relative
//! offsets, so readers index into one borrowed buffer instead of streaming.
//! A read past the end is reported as [`Error::MalformedContainer`] rather
//! than an IO error.

use std::marker::PhantomData;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// A borrowed byte buffer with offset-addressed reads in byte order `E`.
#[derive(Debug, Clone, Copy)]
pub struct ByteView<'a, E: ByteOrder = LittleEndian> {
    data: &'a [u8],
    order: PhantomData<E>,
}

/// Little-endian view, used by every PC structure.
pub type LeView<'a> = ByteView<'a, LittleEndian>;

/// Big-endian view, used by the PS3 texture headers.
pub type BeView<'a> = ByteView<'a, BigEndian>;

impl<'a, E: ByteOrder> ByteView<'a, E> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            order: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    /// Borrow `len` bytes starting at `offset`.
    pub fn bytes(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| {
                Error::malformed(format!(
                    "read of {len} bytes at {offset:#x} runs past the end of a {}-byte buffer",
                    self.data.len()
                ))
            })
    }

    pub fn u8_at(&self, offset: usize) -> Result<u8> {
        Ok(self.bytes(offset, 1)?[0])
    }

    pub fn i8_at(&self, offset: usize) -> Result<i8> {
        Ok(self.u8_at(offset)? as i8)
    }

    pub fn u16_at(&self, offset: usize) -> Result<u16> {
        Ok(E::read_u16(self.bytes(offset, 2)?))
    }

    pub fn i16_at(&self, offset: usize) -> Result<i16> {
        Ok(E::read_i16(self.bytes(offset, 2)?))
    }

    pub fn u32_at(&self, offset: usize) -> Result<u32> {
        Ok(E::read_u32(self.bytes(offset, 4)?))
    }

    pub fn i32_at(&self, offset: usize) -> Result<i32> {
        Ok(E::read_i32(self.bytes(offset, 4)?))
    }

    pub fn f32_at(&self, offset: usize) -> Result<f32> {
        Ok(E::read_f32(self.bytes(offset, 4)?))
    }

    pub fn vec3_at(&self, offset: usize) -> Result<[f32; 3]> {
        Ok([
            self.f32_at(offset)?,
            self.f32_at(offset + 4)?,
            self.f32_at(offset + 8)?,
        ])
    }

    /// Read a `u32` without failing; out-of-range reads yield `None`.
    pub fn peek_u32(&self, offset: usize) -> Option<u32> {
        self.u32_at(offset).ok()
    }
}

/// Render a four-character code for diagnostics, e.g. `"PCD9"`.
pub fn fourcc(value: u32) -> String {
    value
        .to_le_bytes()
        .iter()
        .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
        .collect()
}
