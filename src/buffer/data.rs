use std::ops::Range;
use std::rc::Rc;

use crate::buffer::{ArrayBuffer, ArrayDescriptor, ScalarType};
use crate::resource::RawHandle;
use crate::utils::range::{self, RangeArgument};
use crate::PreconditionError;

/// Staging area for a range of elements of an array buffer.
///
/// The values are encoded in the native byte order, which is what the driver expects. Elements
/// that are never set are uploaded as zeroes.
#[derive(Debug, Clone)]
pub struct ArrayBufferData {
    buffer: RawHandle,
    descriptor: Rc<ArrayDescriptor>,
    range: Range<usize>,
    bytes: Vec<u8>,
}

impl ArrayBufferData {
    /// Builds a staging area for the `range` elements of the buffer.
    ///
    /// `..` covers the whole buffer.
    pub fn new<R>(buffer: &ArrayBuffer, range: R) -> Result<ArrayBufferData, PreconditionError>
        where R: RangeArgument<usize>
    {
        let range = range::resolve(&range, buffer.elements())?;
        let stride = buffer.descriptor().stride();

        Ok(ArrayBufferData {
            buffer: buffer.raw,
            descriptor: buffer.descriptor_rc().clone(),
            bytes: vec![0; range.len() * stride],
            range,
        })
    }

    /// The elements covered by this staging area.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// The encoded elements.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub(crate) fn buffer(&self) -> RawHandle {
        self.buffer
    }

    /// Offset in bytes of the first element in the buffer.
    #[inline]
    pub(crate) fn byte_offset(&self) -> usize {
        self.range.start * self.descriptor.stride()
    }

    fn set<T, const N: usize, F>(&mut self, element: usize, name: &str, given: ScalarType,
                                 values: &[T], encode: F) -> Result<(), PreconditionError>
        where T: Copy, F: Fn(T) -> [u8; N]
    {
        if !self.range.contains(&element) {
            return Err(PreconditionError::OutOfRange {
                index: element as u64,
                limit: self.range.end as u64,
            });
        }

        let attribute = self.descriptor.attribute(name)?;
        if attribute.ty() != given || attribute.components() as usize != values.len() {
            return Err(PreconditionError::TypeMismatch {
                expected: format!("{} x {:?}", attribute.components(), attribute.ty()),
                given: format!("{} x {:?}", values.len(), given),
            });
        }

        let start = (element - self.range.start) * self.descriptor.stride() +
                    self.descriptor.attribute_offset(name)?;

        for (chunk, value) in self.bytes[start .. start + N * values.len()]
                                  .chunks_exact_mut(N).zip(values)
        {
            chunk.copy_from_slice(&encode(*value));
        }

        Ok(())
    }

    /// Sets the components of a `Float` attribute.
    pub fn set_f32(&mut self, element: usize, attribute: &str, values: &[f32])
                   -> Result<(), PreconditionError>
    {
        self.set(element, attribute, ScalarType::Float, values, f32::to_ne_bytes)
    }

    /// Sets the components of a `HalfFloat` attribute, given as raw IEEE 754 half bits.
    pub fn set_f16_bits(&mut self, element: usize, attribute: &str, values: &[u16])
                        -> Result<(), PreconditionError>
    {
        self.set(element, attribute, ScalarType::HalfFloat, values, u16::to_ne_bytes)
    }

    /// Sets the components of an `Int` attribute.
    pub fn set_i32(&mut self, element: usize, attribute: &str, values: &[i32])
                   -> Result<(), PreconditionError>
    {
        self.set(element, attribute, ScalarType::Int, values, i32::to_ne_bytes)
    }

    /// Sets the components of an `UnsignedInt` attribute.
    pub fn set_u32(&mut self, element: usize, attribute: &str, values: &[u32])
                   -> Result<(), PreconditionError>
    {
        self.set(element, attribute, ScalarType::UnsignedInt, values, u32::to_ne_bytes)
    }

    /// Sets the components of a `Short` attribute.
    pub fn set_i16(&mut self, element: usize, attribute: &str, values: &[i16])
                   -> Result<(), PreconditionError>
    {
        self.set(element, attribute, ScalarType::Short, values, i16::to_ne_bytes)
    }

    /// Sets the components of an `UnsignedShort` attribute.
    pub fn set_u16(&mut self, element: usize, attribute: &str, values: &[u16])
                   -> Result<(), PreconditionError>
    {
        self.set(element, attribute, ScalarType::UnsignedShort, values, u16::to_ne_bytes)
    }

    /// Sets the components of a `Byte` attribute.
    pub fn set_i8(&mut self, element: usize, attribute: &str, values: &[i8])
                  -> Result<(), PreconditionError>
    {
        self.set(element, attribute, ScalarType::Byte, values, i8::to_ne_bytes)
    }

    /// Sets the components of an `UnsignedByte` attribute.
    pub fn set_u8(&mut self, element: usize, attribute: &str, values: &[u8])
                  -> Result<(), PreconditionError>
    {
        self.set(element, attribute, ScalarType::UnsignedByte, values, u8::to_ne_bytes)
    }
}
