/*!
Index buffers, and the ways vertices are assembled into primitives.

An index buffer holds a list of vertex indices. The type of the indices is picked from the
number of elements of the array buffer that the indices refer to, so that the smallest type that
can address every element is used:

```
use glguard::index::IndexType;

assert_eq!(IndexType::for_element_count(256), IndexType::U8);
assert_eq!(IndexType::for_element_count(257), IndexType::U16);
assert_eq!(IndexType::for_element_count(65537), IndexType::U32);
```

*/
use crate::gl;
use crate::ToGlEnum;

pub use self::buffer::{IndexBuffer, IndexBuffers};
pub use self::data::IndexBufferData;

pub(crate) use self::buffer::GlIndexBuffers;

mod buffer;
mod data;

/// List of available primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Each vertex is an individual point.
    Points,
    /// Vertices are grouped by chunks of two vertices. Each chunk represents a line.
    Lines,
    /// Each vertex (except the last one) forms a line with the next vertex.
    LineStrip,
    /// Each vertex forms a line with the next vertex. The last vertex forms a line with the
    /// first one.
    LineLoop,
    /// Vertices are grouped by chunks of three vertices. Each chunk represents a triangle.
    ///
    /// The order of the vertices determines whether the triangle is clockwise or
    /// counter-clockwise, see `FaceWindingOrder`.
    Triangles,
    /// Each vertex (except the first one and the last one) forms a triangle with the previous
    /// and the next vertices.
    ///
    /// For example vertices `0, 1, 2` form a triangle, `1, 2, 3` form a triangle, `2, 3, 4` form a
    /// triangle, etc.
    TriangleStrip,
    /// Starting at the second vertex, each vertex forms a triangle with the next and the first
    /// vertices.
    ///
    /// For example vertices `0, 1, 2` form a triangle, `0, 2, 3` form a triangle, `0, 3, 4` form a
    /// triangle, etc.
    TriangleFan,
}

impl ToGlEnum for PrimitiveType {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        match *self {
            PrimitiveType::Points => gl::POINTS,
            PrimitiveType::Lines => gl::LINES,
            PrimitiveType::LineStrip => gl::LINE_STRIP,
            PrimitiveType::LineLoop => gl::LINE_LOOP,
            PrimitiveType::Triangles => gl::TRIANGLES,
            PrimitiveType::TriangleStrip => gl::TRIANGLE_STRIP,
            PrimitiveType::TriangleFan => gl::TRIANGLE_FAN,
        }
    }
}

/// Type of the indices in an index buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// u8
    U8,
    /// u16
    U16,
    /// u32
    U32,
}

impl IndexType {
    /// Returns the smallest type that can address `n` elements.
    #[inline]
    pub fn for_element_count(n: usize) -> IndexType {
        if n <= 256 {
            IndexType::U8
        } else if n <= 65536 {
            IndexType::U16
        } else {
            IndexType::U32
        }
    }

    /// Returns the number of bytes of one index.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        match *self {
            IndexType::U8 => 1,
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }

    /// Returns the largest index that this type can hold.
    #[inline]
    pub fn max_value(&self) -> u32 {
        match *self {
            IndexType::U8 => u8::MAX as u32,
            IndexType::U16 => u16::MAX as u32,
            IndexType::U32 => u32::MAX,
        }
    }
}

impl ToGlEnum for IndexType {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        match *self {
            IndexType::U8 => gl::UNSIGNED_BYTE,
            IndexType::U16 => gl::UNSIGNED_SHORT,
            IndexType::U32 => gl::UNSIGNED_INT,
        }
    }
}
