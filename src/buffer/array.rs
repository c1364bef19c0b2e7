use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::buffer::{byte_size, ArrayBufferData, ScalarType, UsageHint};
use crate::context::{CommandContext, Context, Profile};
use crate::gl;
use crate::program::ProgramAttribute;
use crate::resource::{RawHandle, ResourceKind};
use crate::{Error, GlObject, PreconditionError};

/// One named attribute of every element of an array buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayAttribute {
    name: String,
    ty: ScalarType,
    components: u8,
}

impl ArrayAttribute {
    /// Builds an attribute. The number of components is checked by `ArrayDescriptor::new`.
    pub fn new<S: Into<String>>(name: S, ty: ScalarType, components: u8) -> ArrayAttribute {
        ArrayAttribute { name: name.into(), ty, components }
    }

    /// Name of the attribute.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type of each component.
    #[inline]
    pub fn ty(&self) -> ScalarType {
        self.ty
    }

    /// Number of components, between 1 and 4.
    #[inline]
    pub fn components(&self) -> u8 {
        self.components
    }

    /// Number of bytes of the attribute in each element.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.ty.size_bytes() * self.components as usize
    }
}

/// The layout of the elements of an array buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDescriptor {
    attributes: Vec<ArrayAttribute>,
    offsets: Vec<usize>,
    stride: usize,
}

impl ArrayDescriptor {
    /// Builds a descriptor. Attributes are laid out in order, without padding.
    pub fn new(attributes: Vec<ArrayAttribute>) -> Result<ArrayDescriptor, PreconditionError> {
        if attributes.is_empty() {
            return Err(PreconditionError::EmptyDescriptor);
        }

        let mut offsets = Vec::with_capacity(attributes.len());
        let mut stride = 0;

        for (i, attribute) in attributes.iter().enumerate() {
            if !(1 ..= 4).contains(&attribute.components) {
                return Err(PreconditionError::InvalidComponentCount(attribute.components));
            }

            if attributes[.. i].iter().any(|a| a.name == attribute.name) {
                return Err(PreconditionError::DuplicateAttribute(attribute.name.clone()));
            }

            offsets.push(stride);
            stride += attribute.size_bytes();
        }

        Ok(ArrayDescriptor { attributes, offsets, stride })
    }

    /// The attributes, in order.
    #[inline]
    pub fn attributes(&self) -> &[ArrayAttribute] {
        &self.attributes
    }

    /// Number of bytes of one element.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    fn position(&self, name: &str) -> Result<usize, PreconditionError> {
        self.attributes.iter().position(|a| a.name == name)
            .ok_or_else(|| PreconditionError::UnknownAttribute(name.to_owned()))
    }

    /// Returns the attribute with this name.
    pub fn attribute(&self, name: &str) -> Result<&ArrayAttribute, PreconditionError> {
        self.position(name).map(|i| &self.attributes[i])
    }

    /// Offset in bytes of the attribute from the start of an element.
    pub fn attribute_offset(&self, name: &str) -> Result<usize, PreconditionError> {
        self.position(name).map(|i| self.offsets[i])
    }

    /// Offset in bytes of the component `k` of the attribute from the start of an element.
    pub fn component_offset(&self, name: &str, k: u8) -> Result<usize, PreconditionError> {
        let i = self.position(name)?;
        let attribute = &self.attributes[i];
        if k >= attribute.components {
            return Err(PreconditionError::OutOfRange {
                index: k as u64,
                limit: attribute.components as u64,
            });
        }

        Ok(self.offsets[i] + k as usize * attribute.ty.size_bytes())
    }
}

/// Handle to an array buffer.
///
/// Cloning the handle doesn't duplicate the buffer.
#[derive(Clone)]
pub struct ArrayBuffer {
    pub(crate) raw: RawHandle,
    pub(crate) id: gl::types::GLuint,
    elements: usize,
    descriptor: Rc<ArrayDescriptor>,
    usage: UsageHint,
}

impl ArrayBuffer {
    /// Number of elements.
    #[inline]
    pub fn elements(&self) -> usize {
        self.elements
    }

    /// Layout of the elements.
    #[inline]
    pub fn descriptor(&self) -> &ArrayDescriptor {
        &self.descriptor
    }

    /// The usage hint given at allocation.
    #[inline]
    pub fn usage(&self) -> UsageHint {
        self.usage
    }

    /// Total size of the buffer in bytes.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.elements * self.descriptor.stride
    }

    /// Offset in bytes of the element `k`.
    pub fn element_offset(&self, k: usize) -> Result<usize, PreconditionError> {
        if k >= self.elements {
            return Err(PreconditionError::OutOfRange {
                index: k as u64,
                limit: self.elements as u64,
            });
        }

        Ok(k * self.descriptor.stride)
    }

    pub(crate) fn descriptor_rc(&self) -> &Rc<ArrayDescriptor> {
        &self.descriptor
    }
}

impl PartialEq for ArrayBuffer {
    #[inline]
    fn eq(&self, other: &ArrayBuffer) -> bool {
        self.raw == other.raw
    }
}

impl Eq for ArrayBuffer {}

impl fmt::Debug for ArrayBuffer {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ArrayBuffer #{} ({} elements of {} bytes)", self.id, self.elements,
               self.descriptor.stride)
    }
}

impl GlObject for ArrayBuffer {
    type Id = gl::types::GLuint;

    #[inline]
    fn get_id(&self) -> gl::types::GLuint {
        self.id
    }
}

/// Operations on array buffers.
pub trait ArrayBuffers {
    /// Allocates a buffer of `elements` elements. The contents are undefined.
    ///
    /// The buffer is not bound afterwards, and the buffer that was bound stays bound.
    fn array_buffer_allocate(&self, elements: usize, descriptor: ArrayDescriptor,
                             usage: UsageHint) -> Result<ArrayBuffer, Error>;

    /// Binds the buffer to the array target.
    fn array_buffer_bind(&self, buffer: &ArrayBuffer) -> Result<(), Error>;

    /// Unbinds whatever buffer is bound to the array target.
    fn array_buffer_unbind(&self) -> Result<(), Error>;

    /// Returns true if this buffer is bound.
    fn array_buffer_is_bound(&self, buffer: &ArrayBuffer) -> Result<bool, Error>;

    /// Returns true if any buffer is bound.
    fn array_buffer_any_is_bound(&self) -> bool;

    /// Returns the bound buffer.
    fn array_buffer_get_bound(&self) -> Option<ArrayBuffer>;

    /// Uploads the staged data. The buffer must be bound.
    fn array_buffer_update(&self, buffer: &ArrayBuffer, data: &ArrayBufferData)
                           -> Result<(), Error>;

    /// Reads the whole contents back. The buffer must be bound.
    ///
    /// Not supported on OpenGL ES 2.
    fn array_buffer_read(&self, buffer: &ArrayBuffer) -> Result<Vec<u8>, Error>;

    /// Gives the buffer fresh storage of the same size, with undefined contents.
    ///
    /// Drivers can then avoid waiting for draw calls that still use the old storage. The buffer
    /// must be bound.
    fn array_buffer_reallocate(&self, buffer: &ArrayBuffer) -> Result<(), Error>;

    /// Feeds the program attribute from an attribute of the buffer. The buffer must be bound.
    fn array_buffer_configure_attribute(&self, buffer: &ArrayBuffer, attribute: &str,
                                        program_attribute: &ProgramAttribute)
                                        -> Result<(), Error>;

    /// Stops feeding the program attribute from a buffer.
    fn array_buffer_unconfigure_attribute(&self, program_attribute: &ProgramAttribute)
                                          -> Result<(), Error>;

    /// Deletes the buffer, unbinding it first if it is bound.
    fn array_buffer_delete(&self, buffer: &ArrayBuffer) -> Result<(), Error>;
}

pub(crate) struct GlArrayBuffers {
    context: Rc<Context>,
}

impl GlArrayBuffers {
    pub fn new(context: Rc<Context>) -> GlArrayBuffers {
        GlArrayBuffers { context }
    }
}

/// Checks that the buffer is alive and bound, and makes sure the driver agrees.
fn check_bound(ctxt: &mut CommandContext<'_>, buffer: &ArrayBuffer) -> Result<(), Error> {
    ctxt.resources.array_buffers.get(buffer.raw)?;
    if ctxt.bindings.array_buffer != Some(buffer.raw) {
        return Err(PreconditionError::NotBound(ResourceKind::ArrayBuffer).into());
    }

    ctxt.bind_buffer(gl::ARRAY_BUFFER, buffer.id)
}

impl ArrayBuffers for GlArrayBuffers {
    fn array_buffer_allocate(&self, elements: usize, descriptor: ArrayDescriptor,
                             usage: UsageHint) -> Result<ArrayBuffer, Error>
    {
        if elements == 0 {
            return Err(PreconditionError::ZeroSize(ResourceKind::ArrayBuffer).into());
        }

        let size = byte_size(ResourceKind::ArrayBuffer, elements, descriptor.stride)?;
        let mut ctxt = self.context.make_current();
        let usage_enum = usage.to_glenum_for(ctxt.profile);

        let id = ctxt.call(format_args!("glGenBuffers(1)"), |gl| gl.gen_buffer())?;
        ctxt.created(|ctxt| {
            ctxt.bind_buffer(gl::ARRAY_BUFFER, id)?;
            ctxt.call(format_args!("glBufferData(GL_ARRAY_BUFFER, {}, NULL, 0x{:x})", size,
                                   usage_enum),
                      |gl| gl.buffer_data(gl::ARRAY_BUFFER, size, None, usage_enum))?;
            ctxt.restore_array_buffer()
        }, |ctxt| {
            ctxt.delete_buffer(id)?;
            ctxt.restore_array_buffer()
        })?;

        let descriptor = Rc::new(descriptor);
        let raw = ctxt.resources.array_buffers.insert_with(|raw| ArrayBuffer {
            raw, id, elements, descriptor, usage,
        });

        debug!("Allocated array buffer {} ({} elements, {} bytes)", id, elements, size);
        let buffer = ctxt.resources.array_buffers.get(raw)?.clone();
        Ok(buffer)
    }

    fn array_buffer_bind(&self, buffer: &ArrayBuffer) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.array_buffers.get(buffer.raw)?;
        ctxt.bind_buffer(gl::ARRAY_BUFFER, buffer.id)?;
        ctxt.bindings.array_buffer = Some(buffer.raw);
        Ok(())
    }

    fn array_buffer_unbind(&self) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.bind_buffer(gl::ARRAY_BUFFER, 0)?;
        ctxt.bindings.array_buffer = None;
        Ok(())
    }

    fn array_buffer_is_bound(&self, buffer: &ArrayBuffer) -> Result<bool, Error> {
        let ctxt = self.context.make_current();
        ctxt.resources.array_buffers.get(buffer.raw)?;
        Ok(ctxt.bindings.array_buffer == Some(buffer.raw))
    }

    fn array_buffer_any_is_bound(&self) -> bool {
        self.context.make_current().bindings.array_buffer.is_some()
    }

    fn array_buffer_get_bound(&self) -> Option<ArrayBuffer> {
        let ctxt = self.context.make_current();
        ctxt.bindings.array_buffer
            .and_then(|raw| ctxt.resources.array_buffers.get(raw).ok())
            .cloned()
    }

    fn array_buffer_update(&self, buffer: &ArrayBuffer, data: &ArrayBufferData)
                           -> Result<(), Error>
    {
        let mut ctxt = self.context.make_current();
        check_bound(&mut ctxt, buffer)?;
        if data.buffer() != buffer.raw {
            return Err(PreconditionError::DataMismatch.into());
        }

        let offset = data.byte_offset();
        let bytes = data.bytes();
        ctxt.call(format_args!("glBufferSubData(GL_ARRAY_BUFFER, {}, {}, ..)", offset,
                               bytes.len()),
                  |gl| gl.buffer_sub_data(gl::ARRAY_BUFFER, offset, bytes))
    }

    fn array_buffer_read(&self, buffer: &ArrayBuffer) -> Result<Vec<u8>, Error> {
        let mut ctxt = self.context.make_current();
        check_bound(&mut ctxt, buffer)?;
        if ctxt.profile == Profile::Gles2 {
            return Err(PreconditionError::NotSupported("reading back buffers").into());
        }

        let mut out = vec![0; buffer.size_bytes()];
        ctxt.call(format_args!("glGetBufferSubData(GL_ARRAY_BUFFER, 0, {}, ..)", out.len()),
                  |gl| gl.get_buffer_sub_data(gl::ARRAY_BUFFER, 0, &mut out))?;
        Ok(out)
    }

    fn array_buffer_reallocate(&self, buffer: &ArrayBuffer) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        check_bound(&mut ctxt, buffer)?;

        let size = buffer.size_bytes();
        let usage = buffer.usage.to_glenum_for(ctxt.profile);
        ctxt.call(format_args!("glBufferData(GL_ARRAY_BUFFER, {}, NULL, 0x{:x})", size, usage),
                  |gl| gl.buffer_data(gl::ARRAY_BUFFER, size, None, usage))
    }

    fn array_buffer_configure_attribute(&self, buffer: &ArrayBuffer, attribute: &str,
                                        program_attribute: &ProgramAttribute)
                                        -> Result<(), Error>
    {
        let mut ctxt = self.context.make_current();
        check_bound(&mut ctxt, buffer)?;

        let descriptor = &buffer.descriptor;
        let array_attribute = descriptor.attribute(attribute)?;
        let offset = descriptor.attribute_offset(attribute)?;

        let ty = program_attribute.ty();
        let components = match ty.attribute_components() {
            Some(c) => c,
            None if ty.is_integral() =>
                return Err(PreconditionError::NotSupported("integer vertex attributes").into()),
            None => return Err(PreconditionError::TypeMismatch {
                expected: ty.to_string(),
                given: format!("{} x {:?}", array_attribute.components, array_attribute.ty),
            }.into()),
        };

        if components != array_attribute.components {
            return Err(PreconditionError::TypeMismatch {
                expected: ty.to_string(),
                given: format!("{} x {:?}", array_attribute.components, array_attribute.ty),
            }.into());
        }

        let location = program_attribute.location() as gl::types::GLuint;
        let scalar = array_attribute.ty.to_glenum_for(ctxt.profile);
        let stride = descriptor.stride as gl::types::GLsizei;
        let components = components as gl::types::GLint;

        ctxt.call(format_args!("glEnableVertexAttribArray({})", location),
                  |gl| gl.enable_vertex_attrib_array(location))?;
        ctxt.call(format_args!("glVertexAttribPointer({}, {}, 0x{:x}, false, {}, {})",
                               location, components, scalar, stride, offset),
                  |gl| gl.vertex_attrib_pointer(location, components, scalar, false, stride,
                                                offset))
    }

    fn array_buffer_unconfigure_attribute(&self, program_attribute: &ProgramAttribute)
                                          -> Result<(), Error>
    {
        let mut ctxt = self.context.make_current();
        let location = program_attribute.location() as gl::types::GLuint;
        ctxt.call(format_args!("glDisableVertexAttribArray({})", location),
                  |gl| gl.disable_vertex_attrib_array(location))
    }

    fn array_buffer_delete(&self, buffer: &ArrayBuffer) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.array_buffers.remove(buffer.raw)?;
        if ctxt.bindings.array_buffer == Some(buffer.raw) {
            ctxt.bindings.array_buffer = None;
        }

        debug!("Deleting array buffer {}", buffer.id);
        ctxt.delete_buffer(buffer.id)
    }
}

#[cfg(test)]
mod tests {
    use super::{ArrayAttribute, ArrayDescriptor};
    use crate::buffer::ScalarType;
    use crate::PreconditionError;

    fn descriptor() -> ArrayDescriptor {
        ArrayDescriptor::new(vec![
            ArrayAttribute::new("position", ScalarType::Float, 3),
            ArrayAttribute::new("uv", ScalarType::UnsignedShort, 2),
            ArrayAttribute::new("flags", ScalarType::Byte, 1),
        ]).unwrap()
    }

    #[test]
    fn offsets_are_a_running_sum() {
        let d = descriptor();
        assert_eq!(d.stride(), 12 + 4 + 1);
        assert_eq!(d.attribute_offset("position"), Ok(0));
        assert_eq!(d.attribute_offset("uv"), Ok(12));
        assert_eq!(d.attribute_offset("flags"), Ok(16));
        assert_eq!(d.component_offset("position", 2), Ok(8));
        assert_eq!(d.component_offset("uv", 1), Ok(14));
    }

    #[test]
    fn component_out_of_range() {
        let d = descriptor();
        assert_eq!(d.component_offset("uv", 2),
                   Err(PreconditionError::OutOfRange { index: 2, limit: 2 }));
        assert_eq!(d.component_offset("normal", 0),
                   Err(PreconditionError::UnknownAttribute("normal".to_owned())));
    }

    #[test]
    fn invalid_descriptors() {
        assert_eq!(ArrayDescriptor::new(vec![]), Err(PreconditionError::EmptyDescriptor));

        let duplicate = ArrayDescriptor::new(vec![
            ArrayAttribute::new("a", ScalarType::Float, 1),
            ArrayAttribute::new("a", ScalarType::Int, 1),
        ]);
        assert_eq!(duplicate, Err(PreconditionError::DuplicateAttribute("a".to_owned())));

        let components = ArrayDescriptor::new(vec![ArrayAttribute::new("a", ScalarType::Float, 5)]);
        assert_eq!(components, Err(PreconditionError::InvalidComponentCount(5)));

        let zero = ArrayDescriptor::new(vec![ArrayAttribute::new("a", ScalarType::Float, 0)]);
        assert_eq!(zero, Err(PreconditionError::InvalidComponentCount(0)));
    }
}
