/*!
Strongly-typed, checked OpenGL interface.

Glguard sits between your code and an OpenGL context that you already own. Every operation maps
onto one or a few driver calls, and adds the checks that OpenGL itself doesn't do: distinct
handle types for each kind of object, a checked bind/use/delete protocol, checked attachment
formats and checked uniform types.

# Initialization

Glguard never creates windows or contexts. Either implement the `Backend` trait for the context
you have and call `ContextBuilder::build_with_backend`, or drive the in-memory `FakeDriver`,
which needs no GPU at all:

```no_run
use glguard::{ContextBuilder, FakeDriver, FakeConfig};

let interface = ContextBuilder::new()
    .with_debug(true)
    .build(FakeDriver::new(FakeConfig::gl33()))
    .unwrap();
```

The `Interface` that you get back exposes one object per capability (array buffers, textures,
shaders, blending, ...). The implementation of each capability is picked when the context is
created, depending on whether the context is GL 2.1, GL 3, GLES 2 or GLES 3. Capabilities that
don't exist on some of these versions are returned as an `Option`.

# Objects and handles

Allocating an object returns a handle (`ArrayBuffer`, `Texture2D`, `Program`, ...). Handles are
cheap to clone and carry the immutable properties of the object. Deleting an object invalidates
all the handles that point to it: any later use fails with `PreconditionError::Deleted`, and
passing a handle to a context other than the one that created it fails with
`PreconditionError::WrongContext`.

Operations that modify an object require the object to be bound first:

```no_run
# use glguard::{ContextBuilder, FakeDriver, FakeConfig};
use glguard::buffer::{ArrayAttribute, ArrayDescriptor, ScalarType, UsageHint};

# let interface = ContextBuilder::new().build(FakeDriver::new(FakeConfig::gl33())).unwrap();
let buffers = interface.array_buffers();
let descriptor = ArrayDescriptor::new(vec![
    ArrayAttribute::new("position", ScalarType::Float, 3),
]).unwrap();

let buffer = buffers.array_buffer_allocate(3, descriptor, UsageHint::StaticDraw).unwrap();
assert!(!buffers.array_buffer_is_bound(&buffer).unwrap());

buffers.array_buffer_bind(&buffer).unwrap();
buffers.array_buffer_delete(&buffer).unwrap();
assert!(buffers.array_buffer_bind(&buffer).is_err());
```

# Errors

All the operations return an `Error`, which is one of three kinds: the driver reported an error
(only detected in debug mode), the caller broke a usage rule, or a shader failed to compile or
link. Checks happen before any driver call, so a failed operation has no effect.

*/
#![warn(missing_docs)]

pub use crate::backend::Backend;
pub use crate::context::{Capabilities, ContextBuilder, Profile, SoftRestrictions};
pub use crate::driver::{Driver, GlDriver};
pub use crate::driver::fake::{FakeConfig, FakeDriver, FakeStatistics};
pub use crate::interface::Interface;
pub use crate::resource::ResourceKind;
pub use crate::state::Rect;
pub use crate::utils::range::RangeArgument;
pub use crate::version::{Api, Version};

use std::error::Error as StdError;
use std::fmt;

pub mod array_object;
pub mod backend;
pub mod buffer;
pub mod context;
pub mod draw;
pub mod driver;
pub mod framebuffer;
pub mod index;
pub mod interface;
pub mod program;
pub mod render_buffer;
pub mod state;
pub mod texture;

mod resource;
mod utils;
mod version;

#[allow(clippy::all, missing_docs, non_upper_case_globals, non_snake_case, dead_code)]
mod gl {
    include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs"));
}

/// Trait for objects that are OpenGL objects.
pub trait GlObject {
    /// The type of identifier for this object.
    type Id;

    /// Returns the id of the object.
    ///
    /// The id is only meaningful as long as the object hasn't been deleted.
    fn get_id(&self) -> Self::Id;
}

/// Internal trait for enums that can be turned into GLenum.
trait ToGlEnum {
    /// Returns the value.
    fn to_glenum(&self) -> gl::types::GLenum;
}

/// Error that can happen when calling an operation.
#[derive(Debug, Clone)]
pub enum Error {
    /// The driver reported an error. Only detected when debugging is enabled.
    Driver(DriverError),

    /// The caller broke one of the usage rules of the operation.
    Precondition(PreconditionError),

    /// A shader failed to compile, or a program failed to link.
    Compile(CompileError),
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Driver(ref e) => write!(fmt, "Driver error: {}", e),
            Error::Precondition(ref e) => write!(fmt, "Precondition violated: {}", e),
            Error::Compile(ref e) => write!(fmt, "Compilation failed: {}", e),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Driver(ref e) => Some(e),
            Error::Precondition(ref e) => Some(e),
            Error::Compile(ref e) => Some(e),
        }
    }
}

impl From<DriverError> for Error {
    #[inline]
    fn from(err: DriverError) -> Error {
        Error::Driver(err)
    }
}

impl From<PreconditionError> for Error {
    #[inline]
    fn from(err: PreconditionError) -> Error {
        Error::Precondition(err)
    }
}

impl From<CompileError> for Error {
    #[inline]
    fn from(err: CompileError) -> Error {
        Error::Compile(err)
    }
}

/// An error code returned by `glGetError`, together with the call that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    /// The raw error code.
    pub code: u32,
    /// The driver call, formatted the same way as in the trace output.
    pub call: String,
}

impl DriverError {
    /// Returns the symbolic name of the error code.
    pub fn name(&self) -> &'static str {
        match self.code {
            gl::INVALID_ENUM => "GL_INVALID_ENUM",
            gl::INVALID_VALUE => "GL_INVALID_VALUE",
            gl::INVALID_OPERATION => "GL_INVALID_OPERATION",
            gl::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
            gl::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
            gl::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
            gl::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
            _ => "unknown error",
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{} (0x{:x}) raised by {}", self.name(), self.code, self.call)
    }
}

impl StdError for DriverError {}

/// A shader failed to compile, or a program failed to link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// The name given to the shader or program.
    pub name: String,
    /// The diagnostics reported by the driver.
    pub log: String,
}

impl fmt::Display for CompileError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}: {}", self.name, self.log)
    }
}

impl StdError for CompileError {}

/// The caller broke one of the usage rules of an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PreconditionError {
    /// The object has already been deleted.
    Deleted(ResourceKind),

    /// The object was created by another context.
    WrongContext(ResourceKind),

    /// The object must be bound for this operation.
    NotBound(ResourceKind),

    /// A count or dimension of zero was given.
    ZeroSize(ResourceKind),

    /// An index is outside of the valid range `0..limit`.
    OutOfRange {
        /// The index that was given.
        index: u64,
        /// The exclusive upper bound.
        limit: u64,
    },

    /// A dimension is larger than what the implementation supports.
    TooLarge {
        /// The requested size.
        size: u32,
        /// The maximum size.
        max: u32,
    },

    /// The size in bytes of the object doesn't fit in `isize`.
    SizeOverflow(ResourceKind),

    /// The operation isn't available in this profile.
    NotSupported(&'static str),

    /// The format of an attachment can't be rendered as color.
    NotColorRenderable,

    /// The format of an attachment can't be rendered as depth.
    NotDepthRenderable,

    /// The format of an attachment can't be rendered as stencil.
    NotStencilRenderable,

    /// A texture is both attached to the draw framebuffer and bound to a texture unit.
    FeedbackLoop,

    /// No program is active.
    NoActiveProgram,

    /// The uniform doesn't belong to the active program.
    ProgramNotActive,

    /// The value doesn't match the declared type.
    TypeMismatch {
        /// The declared type.
        expected: String,
        /// The type of the value that was given.
        given: String,
    },

    /// No attribute with this name exists.
    UnknownAttribute(String),

    /// Two attributes have the same name.
    DuplicateAttribute(String),

    /// An array descriptor needs at least one attribute.
    EmptyDescriptor,

    /// Attributes have between one and four components.
    InvalidComponentCount(u8),

    /// The current draw framebuffer has no depth buffer.
    NoDepthBuffer,

    /// The current draw framebuffer has no stencil buffer.
    NoStencilBuffer,

    /// No draw framebuffer is bound.
    NoDrawFramebuffer,

    /// The framebuffer isn't complete.
    FramebufferIncomplete(crate::framebuffer::FramebufferStatus),

    /// All the texture units of the current unit context are in use.
    TextureUnitsExhausted,

    /// The unit context stack is full.
    UnitContextStackFull,

    /// The root unit context can't be popped.
    UnitContextRoot,

    /// The length of some data doesn't match what was expected.
    DataSizeMismatch {
        /// The expected length in bytes.
        expected: usize,
        /// The length that was given.
        given: usize,
    },

    /// A line of shader source doesn't end with a newline.
    MalformedSource {
        /// Index of the offending line.
        line: usize,
    },

    /// The staging data was created for another object.
    DataMismatch,

    /// Depth and stencil blits require nearest filtering.
    BlitFilter,

    /// The attribute slot of an array object builder is already assigned, and the builder does
    /// strict checking.
    AttributeAlreadyAssigned(u32),

    /// The bound array object has its own index buffer, which can't be replaced.
    IndexBufferAlreadyConfigured,
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::PreconditionError::*;
        match *self {
            Deleted(kind) => write!(fmt, "The {} has already been deleted", kind),
            WrongContext(kind) => write!(fmt, "The {} belongs to another context", kind),
            NotBound(kind) => write!(fmt, "The {} is not bound", kind),
            ZeroSize(kind) => write!(fmt, "Can't create a {} of size zero", kind),
            OutOfRange { index, limit } =>
                write!(fmt, "Index {} is out of range (must be less than {})", index, limit),
            TooLarge { size, max } =>
                write!(fmt, "Size {} exceeds the maximum of {}", size, max),
            SizeOverflow(kind) => write!(fmt, "The size of the {} overflows", kind),
            NotSupported(what) => write!(fmt, "Not supported by this context: {}", what),
            NotColorRenderable => fmt.write_str("The format is not color-renderable"),
            NotDepthRenderable => fmt.write_str("The format is not depth-renderable"),
            NotStencilRenderable => fmt.write_str("The format is not stencil-renderable"),
            FeedbackLoop => fmt.write_str("A texture attached to the draw framebuffer is also \
                                           bound to a texture unit"),
            NoActiveProgram => fmt.write_str("No program is active"),
            ProgramNotActive => fmt.write_str("The uniform's program is not the active program"),
            TypeMismatch { ref expected, ref given } =>
                write!(fmt, "Expected a value of type {}, got {}", expected, given),
            UnknownAttribute(ref name) => write!(fmt, "No attribute named `{}`", name),
            DuplicateAttribute(ref name) => write!(fmt, "Attribute `{}` is declared twice", name),
            EmptyDescriptor => fmt.write_str("An array descriptor needs at least one attribute"),
            InvalidComponentCount(n) =>
                write!(fmt, "Attributes have 1 to 4 components, got {}", n),
            NoDepthBuffer => fmt.write_str("The draw framebuffer has no depth buffer"),
            NoStencilBuffer => fmt.write_str("The draw framebuffer has no stencil buffer"),
            NoDrawFramebuffer => fmt.write_str("No draw framebuffer is bound"),
            FramebufferIncomplete(status) =>
                write!(fmt, "The framebuffer is incomplete: {:?}", status),
            TextureUnitsExhausted => fmt.write_str("No texture units are left"),
            UnitContextStackFull => fmt.write_str("The texture unit context stack is full"),
            UnitContextRoot => fmt.write_str("The root texture unit context can't be popped"),
            DataSizeMismatch { expected, given } =>
                write!(fmt, "Expected {} bytes of data, got {}", expected, given),
            MalformedSource { line } =>
                write!(fmt, "Line {} of the shader source doesn't end with a newline", line),
            DataMismatch => fmt.write_str("The data was prepared for another object"),
            BlitFilter => fmt.write_str("Depth and stencil blits require nearest filtering"),
            AttributeAlreadyAssigned(index) =>
                write!(fmt, "Attribute {} of the array object is already assigned", index),
            IndexBufferAlreadyConfigured =>
                fmt.write_str("The bound array object already has an index buffer"),
        }
    }
}

impl StdError for PreconditionError {}

/// Error that can happen while creating a context.
#[derive(Clone, Debug)]
pub enum CreationError {
    /// The version string returned by the driver couldn't be parsed.
    VersionString(String),

    /// The OpenGL implementation is too old.
    IncompatibleOpenGl(String),
}

impl fmt::Display for CreationError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CreationError::VersionString(ref s) =>
                write!(fmt, "Couldn't parse the OpenGL version string `{}`", s),
            CreationError::IncompatibleOpenGl(ref s) =>
                write!(fmt, "The OpenGL implementation is too old to work with glguard: {}", s),
        }
    }
}

impl StdError for CreationError {}
