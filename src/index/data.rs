use std::ops::Range;

use crate::index::{IndexBuffer, IndexType};
use crate::resource::RawHandle;
use crate::utils::range::{self, RangeArgument};
use crate::PreconditionError;

/// Staging area for a range of indices of an index buffer.
#[derive(Debug, Clone)]
pub struct IndexBufferData {
    buffer: RawHandle,
    ty: IndexType,
    range: Range<usize>,
    bytes: Vec<u8>,
}

impl IndexBufferData {
    /// Builds a staging area for the `range` indices of the buffer.
    pub fn new<R>(buffer: &IndexBuffer, range: R) -> Result<IndexBufferData, PreconditionError>
        where R: RangeArgument<usize>
    {
        let range = range::resolve(&range, buffer.indices())?;
        let ty = buffer.ty();

        Ok(IndexBufferData {
            buffer: buffer.raw,
            ty,
            bytes: vec![0; range.len() * ty.size_bytes()],
            range,
        })
    }

    /// The indices covered by this staging area.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// The encoded indices.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub(crate) fn buffer(&self) -> RawHandle {
        self.buffer
    }

    #[inline]
    pub(crate) fn byte_offset(&self) -> usize {
        self.range.start * self.ty.size_bytes()
    }

    /// Sets the index at position `i` of the buffer.
    ///
    /// Fails if `value` doesn't fit the index type of the buffer.
    pub fn set(&mut self, i: usize, value: u32) -> Result<(), PreconditionError> {
        if !self.range.contains(&i) {
            return Err(PreconditionError::OutOfRange {
                index: i as u64,
                limit: self.range.end as u64,
            });
        }

        if value > self.ty.max_value() {
            return Err(PreconditionError::OutOfRange {
                index: value as u64,
                limit: self.ty.max_value() as u64 + 1,
            });
        }

        let size = self.ty.size_bytes();
        let start = (i - self.range.start) * size;
        let target = &mut self.bytes[start .. start + size];

        match self.ty {
            IndexType::U8 => target[0] = value as u8,
            IndexType::U16 => target.copy_from_slice(&(value as u16).to_ne_bytes()),
            IndexType::U32 => target.copy_from_slice(&value.to_ne_bytes()),
        }

        Ok(())
    }
}
