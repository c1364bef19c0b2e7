use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::buffer::{byte_size, ArrayBuffer, UsageHint};
use crate::context::{CommandContext, Context, Profile};
use crate::gl;
use crate::index::{IndexBufferData, IndexType};
use crate::resource::{RawHandle, ResourceKind};
use crate::{Error, GlObject, PreconditionError};

/// Handle to an index buffer.
#[derive(Clone)]
pub struct IndexBuffer {
    pub(crate) raw: RawHandle,
    pub(crate) id: gl::types::GLuint,
    indices: usize,
    ty: IndexType,
    usage: UsageHint,
}

impl IndexBuffer {
    /// Number of indices.
    #[inline]
    pub fn indices(&self) -> usize {
        self.indices
    }

    /// Type of the indices.
    #[inline]
    pub fn ty(&self) -> IndexType {
        self.ty
    }

    /// The usage hint given at allocation.
    #[inline]
    pub fn usage(&self) -> UsageHint {
        self.usage
    }

    /// Total size of the buffer in bytes.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.indices * self.ty.size_bytes()
    }
}

impl PartialEq for IndexBuffer {
    #[inline]
    fn eq(&self, other: &IndexBuffer) -> bool {
        self.raw == other.raw
    }
}

impl Eq for IndexBuffer {}

impl fmt::Debug for IndexBuffer {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "IndexBuffer #{} ({} indices of type {:?})", self.id, self.indices, self.ty)
    }
}

impl GlObject for IndexBuffer {
    type Id = gl::types::GLuint;

    #[inline]
    fn get_id(&self) -> gl::types::GLuint {
        self.id
    }
}

/// Operations on index buffers.
pub trait IndexBuffers {
    /// Allocates a buffer of `indices` indices that refer to the elements of `array`.
    ///
    /// The type of the indices is picked from the number of elements of the array buffer.
    fn index_buffer_allocate(&self, array: &ArrayBuffer, indices: usize, usage: UsageHint)
                             -> Result<IndexBuffer, Error>;

    /// Allocates a buffer of `indices` indices of the given type.
    fn index_buffer_allocate_typed(&self, ty: IndexType, indices: usize, usage: UsageHint)
                                   -> Result<IndexBuffer, Error>;

    /// Binds the buffer to the element array target.
    ///
    /// While an array object other than the default one is bound, its index buffer is fixed:
    /// binding any other buffer fails with `IndexBufferAlreadyConfigured`.
    fn index_buffer_bind(&self, buffer: &IndexBuffer) -> Result<(), Error>;

    /// Unbinds whatever buffer is bound to the element array target.
    ///
    /// Fails with `IndexBufferAlreadyConfigured` if the bound array object has an index buffer.
    fn index_buffer_unbind(&self) -> Result<(), Error>;

    /// Returns true if this buffer is bound.
    fn index_buffer_is_bound(&self, buffer: &IndexBuffer) -> Result<bool, Error>;

    /// Returns true if any index buffer is bound.
    fn index_buffer_any_is_bound(&self) -> bool;

    /// Returns the bound buffer.
    fn index_buffer_get_bound(&self) -> Option<IndexBuffer>;

    /// Uploads the staged indices. The buffer must be bound.
    fn index_buffer_update(&self, buffer: &IndexBuffer, data: &IndexBufferData)
                           -> Result<(), Error>;

    /// Reads all the indices back. The buffer must be bound.
    ///
    /// Not supported on OpenGL ES 2.
    fn index_buffer_read(&self, buffer: &IndexBuffer) -> Result<Vec<u32>, Error>;

    /// Gives the buffer fresh storage of the same size. The buffer must be bound.
    fn index_buffer_reallocate(&self, buffer: &IndexBuffer) -> Result<(), Error>;

    /// Deletes the buffer, unbinding it first if it is bound.
    ///
    /// Array objects that use the buffer are left without an index buffer.
    fn index_buffer_delete(&self, buffer: &IndexBuffer) -> Result<(), Error>;
}

pub(crate) struct GlIndexBuffers {
    context: Rc<Context>,
}

impl GlIndexBuffers {
    pub fn new(context: Rc<Context>) -> GlIndexBuffers {
        GlIndexBuffers { context }
    }
}

/// Fails if the bound array object holds an index buffer other than `raw`.
fn check_configurable(ctxt: &CommandContext<'_>, raw: Option<RawHandle>) -> Result<(), Error> {
    if ctxt.bindings.array_object.is_some() && ctxt.bindings.index_buffer.is_some() &&
       ctxt.bindings.index_buffer != raw
    {
        return Err(PreconditionError::IndexBufferAlreadyConfigured.into());
    }

    Ok(())
}

fn check_bound(ctxt: &mut CommandContext<'_>, buffer: &IndexBuffer) -> Result<(), Error> {
    ctxt.resources.index_buffers.get(buffer.raw)?;
    if ctxt.bindings.index_buffer != Some(buffer.raw) {
        return Err(PreconditionError::NotBound(ResourceKind::IndexBuffer).into());
    }

    ctxt.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, buffer.id)
}

impl IndexBuffers for GlIndexBuffers {
    fn index_buffer_allocate(&self, array: &ArrayBuffer, indices: usize, usage: UsageHint)
                             -> Result<IndexBuffer, Error>
    {
        let ctxt = self.context.make_current();
        let elements = ctxt.resources.array_buffers.get(array.raw)?.elements();
        drop(ctxt);

        self.index_buffer_allocate_typed(IndexType::for_element_count(elements), indices, usage)
    }

    fn index_buffer_allocate_typed(&self, ty: IndexType, indices: usize, usage: UsageHint)
                                   -> Result<IndexBuffer, Error>
    {
        if indices == 0 {
            return Err(PreconditionError::ZeroSize(ResourceKind::IndexBuffer).into());
        }

        let mut ctxt = self.context.make_current();
        if ty == IndexType::U32 && ctxt.profile == Profile::Gles2 &&
           !ctxt.extensions.gl_oes_element_index_uint
        {
            return Err(PreconditionError::NotSupported("32-bit indices").into());
        }

        let size = byte_size(ResourceKind::IndexBuffer, indices, ty.size_bytes())?;
        let usage_enum = usage.to_glenum_for(ctxt.profile);

        let id = ctxt.call(format_args!("glGenBuffers(1)"), |gl| gl.gen_buffer())?;
        ctxt.created(|ctxt| {
            ctxt.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, id)?;
            ctxt.call(format_args!("glBufferData(GL_ELEMENT_ARRAY_BUFFER, {}, NULL, 0x{:x})",
                                   size, usage_enum),
                      |gl| gl.buffer_data(gl::ELEMENT_ARRAY_BUFFER, size, None, usage_enum))?;
            ctxt.restore_index_buffer()
        }, |ctxt| {
            ctxt.delete_buffer(id)?;
            ctxt.restore_index_buffer()
        })?;

        let raw = ctxt.resources.index_buffers.insert_with(|raw| IndexBuffer {
            raw, id, indices, ty, usage,
        });

        debug!("Allocated index buffer {} ({} indices of type {:?})", id, indices, ty);
        let buffer = ctxt.resources.index_buffers.get(raw)?.clone();
        Ok(buffer)
    }

    fn index_buffer_bind(&self, buffer: &IndexBuffer) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.index_buffers.get(buffer.raw)?;
        check_configurable(&ctxt, Some(buffer.raw))?;
        ctxt.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, buffer.id)?;
        ctxt.bindings.index_buffer = Some(buffer.raw);
        if let Some(object) = ctxt.bindings.array_object {
            ctxt.resources.array_objects.get_mut(object)?.index_buffer = Some(buffer.raw);
        }
        Ok(())
    }

    fn index_buffer_unbind(&self) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        check_configurable(&ctxt, None)?;
        ctxt.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, 0)?;
        ctxt.bindings.index_buffer = None;
        Ok(())
    }

    fn index_buffer_is_bound(&self, buffer: &IndexBuffer) -> Result<bool, Error> {
        let ctxt = self.context.make_current();
        ctxt.resources.index_buffers.get(buffer.raw)?;
        Ok(ctxt.bindings.index_buffer == Some(buffer.raw))
    }

    fn index_buffer_any_is_bound(&self) -> bool {
        self.context.make_current().bindings.index_buffer.is_some()
    }

    fn index_buffer_get_bound(&self) -> Option<IndexBuffer> {
        let ctxt = self.context.make_current();
        ctxt.bindings.index_buffer
            .and_then(|raw| ctxt.resources.index_buffers.get(raw).ok())
            .cloned()
    }

    fn index_buffer_update(&self, buffer: &IndexBuffer, data: &IndexBufferData)
                           -> Result<(), Error>
    {
        let mut ctxt = self.context.make_current();
        check_bound(&mut ctxt, buffer)?;
        if data.buffer() != buffer.raw {
            return Err(PreconditionError::DataMismatch.into());
        }

        let offset = data.byte_offset();
        let bytes = data.bytes();
        ctxt.call(format_args!("glBufferSubData(GL_ELEMENT_ARRAY_BUFFER, {}, {}, ..)", offset,
                               bytes.len()),
                  |gl| gl.buffer_sub_data(gl::ELEMENT_ARRAY_BUFFER, offset, bytes))
    }

    fn index_buffer_read(&self, buffer: &IndexBuffer) -> Result<Vec<u32>, Error> {
        let mut ctxt = self.context.make_current();
        check_bound(&mut ctxt, buffer)?;
        if ctxt.profile == Profile::Gles2 {
            return Err(PreconditionError::NotSupported("reading back buffers").into());
        }

        let mut bytes = vec![0; buffer.size_bytes()];
        ctxt.call(format_args!("glGetBufferSubData(GL_ELEMENT_ARRAY_BUFFER, 0, {}, ..)",
                               bytes.len()),
                  |gl| gl.get_buffer_sub_data(gl::ELEMENT_ARRAY_BUFFER, 0, &mut bytes))?;

        let indices = match buffer.ty {
            IndexType::U8 => bytes.iter().map(|&b| b as u32).collect(),
            IndexType::U16 => bytes.chunks_exact(2)
                                   .map(|c| u16::from_ne_bytes([c[0], c[1]]) as u32)
                                   .collect(),
            IndexType::U32 => bytes.chunks_exact(4)
                                   .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                                   .collect(),
        };

        Ok(indices)
    }

    fn index_buffer_reallocate(&self, buffer: &IndexBuffer) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        check_bound(&mut ctxt, buffer)?;

        let size = buffer.size_bytes();
        let usage = buffer.usage.to_glenum_for(ctxt.profile);
        ctxt.call(format_args!("glBufferData(GL_ELEMENT_ARRAY_BUFFER, {}, NULL, 0x{:x})", size,
                               usage),
                  |gl| gl.buffer_data(gl::ELEMENT_ARRAY_BUFFER, size, None, usage))
    }

    fn index_buffer_delete(&self, buffer: &IndexBuffer) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.index_buffers.remove(buffer.raw)?;
        if ctxt.bindings.index_buffer == Some(buffer.raw) {
            ctxt.bindings.index_buffer = None;
        }
        if ctxt.bindings.default_index_buffer == Some(buffer.raw) {
            ctxt.bindings.default_index_buffer = None;
        }
        for object in ctxt.resources.array_objects.values_mut() {
            if object.index_buffer == Some(buffer.raw) {
                object.index_buffer = None;
            }
        }

        debug!("Deleting index buffer {}", buffer.id);
        ctxt.delete_buffer(buffer.id)
    }
}
