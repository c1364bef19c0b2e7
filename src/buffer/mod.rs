//! Array buffers, which hold vertex data.
//!
//! An `ArrayBuffer` is described by an `ArrayDescriptor`: a list of named attributes, each made
//! of one to four components of a `ScalarType`. The attributes are packed one after the other
//! in every element, without padding.
//!
//! Writing to a buffer goes through an `ArrayBufferData`, a staging area that covers a range of
//! elements and knows the layout of the buffer:
//!
//! ```no_run
//! # use glguard::{ContextBuilder, FakeDriver, FakeConfig};
//! use glguard::buffer::{ArrayAttribute, ArrayBufferData, ArrayDescriptor, ScalarType, UsageHint};
//!
//! # let interface = ContextBuilder::new().build(FakeDriver::new(FakeConfig::gl33())).unwrap();
//! let buffers = interface.array_buffers();
//! let descriptor = ArrayDescriptor::new(vec![
//!     ArrayAttribute::new("position", ScalarType::Float, 2),
//!     ArrayAttribute::new("color", ScalarType::UnsignedByte, 4),
//! ]).unwrap();
//!
//! let buffer = buffers.array_buffer_allocate(3, descriptor, UsageHint::StaticDraw).unwrap();
//! let mut data = ArrayBufferData::new(&buffer, ..).unwrap();
//! data.set_f32(0, "position", &[0.0, 1.0]).unwrap();
//! data.set_u8(0, "color", &[255, 0, 0, 255]).unwrap();
//!
//! buffers.array_buffer_bind(&buffer).unwrap();
//! buffers.array_buffer_update(&buffer, &data).unwrap();
//! ```
//!
use crate::context::Profile;
use crate::gl;
use crate::resource::ResourceKind;
use crate::{PreconditionError, ToGlEnum};

pub use self::array::{ArrayAttribute, ArrayBuffer, ArrayBuffers, ArrayDescriptor};
pub use self::data::ArrayBufferData;

pub(crate) use self::array::GlArrayBuffers;

mod array;
mod data;

/// Size in bytes of `count` items of `item_size` bytes each.
///
/// Sizes are passed to the driver as `GLsizeiptr`, so they must fit in an `isize`.
pub(crate) fn byte_size(kind: ResourceKind, count: usize, item_size: usize)
                        -> Result<usize, PreconditionError>
{
    count.checked_mul(item_size)
        .filter(|&size| size <= isize::MAX as usize)
        .ok_or(PreconditionError::SizeOverflow(kind))
}

/// `GL_HALF_FLOAT_OES` has a different value than the desktop enum.
const HALF_FLOAT_OES: gl::types::GLenum = 0x8D61;

/// Type of the components of an attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// `i8`
    Byte,
    /// `u8`
    UnsignedByte,
    /// `i16`
    Short,
    /// `u16`
    UnsignedShort,
    /// `i32`
    Int,
    /// `u32`
    UnsignedInt,
    /// 16-bit floating point.
    HalfFloat,
    /// `f32`
    Float,
}

impl ScalarType {
    /// Number of bytes of one component.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        match *self {
            ScalarType::Byte | ScalarType::UnsignedByte => 1,
            ScalarType::Short | ScalarType::UnsignedShort | ScalarType::HalfFloat => 2,
            ScalarType::Int | ScalarType::UnsignedInt | ScalarType::Float => 4,
        }
    }

    /// Returns true for integer types, false for floating point types.
    #[inline]
    pub fn is_integral(&self) -> bool {
        !matches!(*self, ScalarType::HalfFloat | ScalarType::Float)
    }

    /// Returns true for types that can hold negative values.
    #[inline]
    pub fn is_signed(&self) -> bool {
        !matches!(*self, ScalarType::UnsignedByte | ScalarType::UnsignedShort |
                         ScalarType::UnsignedInt)
    }

    pub(crate) fn to_glenum_for(&self, profile: Profile) -> gl::types::GLenum {
        match *self {
            ScalarType::HalfFloat if profile == Profile::Gles2 => HALF_FLOAT_OES,
            _ => self.to_glenum(),
        }
    }
}

impl ToGlEnum for ScalarType {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        match *self {
            ScalarType::Byte => gl::BYTE,
            ScalarType::UnsignedByte => gl::UNSIGNED_BYTE,
            ScalarType::Short => gl::SHORT,
            ScalarType::UnsignedShort => gl::UNSIGNED_SHORT,
            ScalarType::Int => gl::INT,
            ScalarType::UnsignedInt => gl::UNSIGNED_INT,
            ScalarType::HalfFloat => gl::HALF_FLOAT,
            ScalarType::Float => gl::FLOAT,
        }
    }
}

/// How often the contents of a buffer are expected to change, and who reads them.
///
/// This is only a hint given to the driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum UsageHint {
    StreamDraw,
    StreamRead,
    StreamCopy,
    StaticDraw,
    StaticRead,
    StaticCopy,
    DynamicDraw,
    DynamicRead,
    DynamicCopy,
}

impl UsageHint {
    /// OpenGL ES 2 only knows about the `*_DRAW` hints.
    pub(crate) fn to_glenum_for(&self, profile: Profile) -> gl::types::GLenum {
        if profile != Profile::Gles2 {
            return self.to_glenum();
        }

        match *self {
            UsageHint::StreamDraw | UsageHint::StreamRead | UsageHint::StreamCopy =>
                gl::STREAM_DRAW,
            UsageHint::StaticDraw | UsageHint::StaticRead | UsageHint::StaticCopy =>
                gl::STATIC_DRAW,
            UsageHint::DynamicDraw | UsageHint::DynamicRead | UsageHint::DynamicCopy =>
                gl::DYNAMIC_DRAW,
        }
    }
}

impl ToGlEnum for UsageHint {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        match *self {
            UsageHint::StreamDraw => gl::STREAM_DRAW,
            UsageHint::StreamRead => gl::STREAM_READ,
            UsageHint::StreamCopy => gl::STREAM_COPY,
            UsageHint::StaticDraw => gl::STATIC_DRAW,
            UsageHint::StaticRead => gl::STATIC_READ,
            UsageHint::StaticCopy => gl::STATIC_COPY,
            UsageHint::DynamicDraw => gl::DYNAMIC_DRAW,
            UsageHint::DynamicRead => gl::DYNAMIC_READ,
            UsageHint::DynamicCopy => gl::DYNAMIC_COPY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{byte_size, ScalarType, UsageHint};
    use crate::context::Profile;
    use crate::gl;
    use crate::resource::ResourceKind;
    use crate::PreconditionError;

    #[test]
    fn byte_sizes_fit_in_isize() {
        assert_eq!(byte_size(ResourceKind::ArrayBuffer, 3, 12), Ok(36));
        assert_eq!(byte_size(ResourceKind::ArrayBuffer, isize::MAX as usize, 1),
                   Ok(isize::MAX as usize));
        assert_eq!(byte_size(ResourceKind::ArrayBuffer, isize::MAX as usize / 2 + 1, 2),
                   Err(PreconditionError::SizeOverflow(ResourceKind::ArrayBuffer)));
        assert_eq!(byte_size(ResourceKind::IndexBuffer, usize::MAX, 4),
                   Err(PreconditionError::SizeOverflow(ResourceKind::IndexBuffer)));
    }

    #[test]
    fn scalar_sizes() {
        assert_eq!(ScalarType::Byte.size_bytes(), 1);
        assert_eq!(ScalarType::HalfFloat.size_bytes(), 2);
        assert_eq!(ScalarType::Float.size_bytes(), 4);
        assert!(ScalarType::UnsignedShort.is_integral());
        assert!(!ScalarType::UnsignedShort.is_signed());
        assert!(!ScalarType::HalfFloat.is_integral());
    }

    #[test]
    fn gles2_usage_hints() {
        assert_eq!(UsageHint::StaticRead.to_glenum_for(Profile::Gles2), gl::STATIC_DRAW);
        assert_eq!(UsageHint::StaticRead.to_glenum_for(Profile::Gles3), gl::STATIC_READ);
        assert_eq!(UsageHint::StreamCopy.to_glenum_for(Profile::Gles2), gl::STREAM_DRAW);
    }
}
