/*!
Array objects, which store which buffers feed which vertex attributes.

An array object remembers, for each vertex attribute slot, the array buffer and the attribute of
its descriptor that feeds the slot. It also remembers an index buffer. Binding the array object
restores all of this at once, instead of configuring each attribute before each draw call.

Array objects are described with an `ArrayObjectBuilder`, then allocated:

```no_run
# use glguard::{ContextBuilder, FakeDriver, FakeConfig};
use glguard::buffer::{ArrayAttribute, ArrayDescriptor, ScalarType, UsageHint};

# let interface = ContextBuilder::new().build(FakeDriver::new(FakeConfig::gl33())).unwrap();
let descriptor = ArrayDescriptor::new(vec![
    ArrayAttribute::new("position", ScalarType::Float, 3),
]).unwrap();
let buffer = interface.array_buffers()
    .array_buffer_allocate(3, descriptor, UsageHint::StaticDraw).unwrap();

let array_objects = interface.array_objects().unwrap();
let mut builder = array_objects.array_object_new_builder();
builder.set_attribute(0, &buffer, "position", false).unwrap();
let object = array_objects.array_object_allocate(&builder).unwrap();
array_objects.array_object_bind(&object).unwrap();
```

There is always a bound array object. When none of the user's objects is bound, the default
array object is, and that is the one that `ArrayBuffers::array_buffer_configure_attribute` and
`IndexBuffers::index_buffer_bind` modify. Once any other array object has an index buffer, it
keeps it until that buffer is deleted.

Array objects need OpenGL 3 or OpenGL ES 3.

*/
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::buffer::{ArrayAttribute, ArrayBuffer};
use crate::context::{CommandContext, Context};
use crate::gl;
use crate::index::IndexBuffer;
use crate::resource::RawHandle;
use crate::{Error, GlObject, PreconditionError};

/// A vertex attribute slot of an array object, fed by an attribute of an array buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayVertexAttribute {
    index: u32,
    buffer: ArrayBuffer,
    attribute: ArrayAttribute,
    offset: usize,
    normalized: bool,
}

impl ArrayVertexAttribute {
    /// The vertex attribute slot.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The buffer that feeds the slot.
    #[inline]
    pub fn buffer(&self) -> &ArrayBuffer {
        &self.buffer
    }

    /// The attribute of the buffer's descriptor that feeds the slot.
    #[inline]
    pub fn attribute(&self) -> &ArrayAttribute {
        &self.attribute
    }

    /// Offset in bytes of the attribute from the start of an element.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Distance in bytes between two consecutive values of the attribute.
    #[inline]
    pub fn stride(&self) -> usize {
        self.buffer.descriptor().stride()
    }

    /// Whether integer values are mapped to `[0, 1]` or `[-1, 1]`.
    #[inline]
    pub fn normalized(&self) -> bool {
        self.normalized
    }
}

/// Describes an array object before it is allocated.
///
/// A builder can be reused to allocate several array objects.
#[derive(Debug, Clone)]
pub struct ArrayObjectBuilder {
    attributes: Vec<Option<ArrayVertexAttribute>>,
    index_buffer: Option<IndexBuffer>,
    strict: bool,
}

impl ArrayObjectBuilder {
    fn new(max_attributes: u32) -> ArrayObjectBuilder {
        ArrayObjectBuilder {
            attributes: vec![None; max_attributes as usize],
            index_buffer: None,
            strict: false,
        }
    }

    fn slot(&self, index: u32) -> Result<usize, PreconditionError> {
        if index as usize >= self.attributes.len() {
            return Err(PreconditionError::OutOfRange {
                index: index as u64,
                limit: self.attributes.len() as u64,
            });
        }

        Ok(index as usize)
    }

    /// Number of vertex attribute slots.
    #[inline]
    pub fn maximum_vertex_attributes(&self) -> u32 {
        self.attributes.len() as u32
    }

    /// Returns what feeds the slot, if anything.
    pub fn attribute_at(&self, index: u32) -> Result<Option<&ArrayVertexAttribute>,
                                                     PreconditionError>
    {
        let slot = self.slot(index)?;
        Ok(self.attributes[slot].as_ref())
    }

    /// Feeds the slot `index` from the attribute named `attribute` of the buffer.
    ///
    /// With strict checking, fails if the slot is already assigned.
    pub fn set_attribute(&mut self, index: u32, buffer: &ArrayBuffer, attribute: &str,
                         normalized: bool) -> Result<(), PreconditionError>
    {
        let slot = self.slot(index)?;
        let descriptor = buffer.descriptor();
        let array_attribute = descriptor.attribute(attribute)?.clone();
        let offset = descriptor.attribute_offset(attribute)?;

        if self.strict && self.attributes[slot].is_some() {
            return Err(PreconditionError::AttributeAlreadyAssigned(index));
        }

        self.attributes[slot] = Some(ArrayVertexAttribute {
            index,
            buffer: buffer.clone(),
            attribute: array_attribute,
            offset,
            normalized,
        });
        Ok(())
    }

    /// Leaves the slot `index` without a buffer.
    pub fn disable_attribute(&mut self, index: u32) -> Result<(), PreconditionError> {
        let slot = self.slot(index)?;
        self.attributes[slot] = None;
        Ok(())
    }

    /// Refuses to overwrite slots that are already assigned. Disabled by default.
    #[inline]
    pub fn set_strict_checking(&mut self, enabled: bool) {
        self.strict = enabled;
    }

    /// Uses this index buffer for indexed draw calls.
    #[inline]
    pub fn set_index_buffer(&mut self, buffer: &IndexBuffer) {
        self.index_buffer = Some(buffer.clone());
    }

    /// Leaves indexed draw calls without an index buffer.
    #[inline]
    pub fn set_no_index_buffer(&mut self) {
        self.index_buffer = None;
    }

    /// The index buffer, if any.
    #[inline]
    pub fn index_buffer(&self) -> Option<&IndexBuffer> {
        self.index_buffer.as_ref()
    }

    /// Clears every slot and the index buffer. Strict checking is left as it is.
    pub fn reset(&mut self) {
        for attribute in self.attributes.iter_mut() {
            *attribute = None;
        }
        self.index_buffer = None;
    }
}

/// Handle to an array object.
#[derive(Clone)]
pub struct ArrayObject {
    pub(crate) raw: RawHandle,
    pub(crate) id: gl::types::GLuint,
    attributes: Rc<Vec<Option<ArrayVertexAttribute>>>,
    /// Only kept up to date in the context's record.
    pub(crate) index_buffer: Option<RawHandle>,
}

impl ArrayObject {
    /// Returns what feeds the slot, or `None` if the slot is disabled or doesn't exist.
    pub fn attribute_at(&self, index: u32) -> Option<&ArrayVertexAttribute> {
        self.attributes.get(index as usize).and_then(|a| a.as_ref())
    }

    /// The slots that are fed by a buffer.
    pub fn attributes(&self) -> impl Iterator<Item = &ArrayVertexAttribute> + '_ {
        self.attributes.iter().filter_map(|a| a.as_ref())
    }

    /// Number of vertex attribute slots.
    #[inline]
    pub fn maximum_vertex_attributes(&self) -> u32 {
        self.attributes.len() as u32
    }
}

impl PartialEq for ArrayObject {
    #[inline]
    fn eq(&self, other: &ArrayObject) -> bool {
        self.raw == other.raw
    }
}

impl Eq for ArrayObject {}

impl fmt::Debug for ArrayObject {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "ArrayObject #{} ({} attributes)", self.id, self.attributes().count())
    }
}

impl GlObject for ArrayObject {
    type Id = gl::types::GLuint;

    #[inline]
    fn get_id(&self) -> gl::types::GLuint {
        self.id
    }
}

/// Operations on array objects.
pub trait ArrayObjects {
    /// Returns an empty builder, with one slot per vertex attribute of the context.
    fn array_object_new_builder(&self) -> ArrayObjectBuilder;

    /// Returns a builder that describes the array object as it is now.
    fn array_object_new_builder_from(&self, object: &ArrayObject)
                                     -> Result<ArrayObjectBuilder, Error>;

    /// Allocates an array object. Every buffer named by the builder must still be alive.
    ///
    /// The bound array object and array buffer are left as they were.
    fn array_object_allocate(&self, builder: &ArrayObjectBuilder) -> Result<ArrayObject, Error>;

    /// Binds the array object. Its index buffer becomes the bound index buffer.
    fn array_object_bind(&self, object: &ArrayObject) -> Result<(), Error>;

    /// Binds the default array object back.
    fn array_object_unbind(&self) -> Result<(), Error>;

    /// Returns true if this array object is bound.
    fn array_object_is_bound(&self, object: &ArrayObject) -> Result<bool, Error>;

    /// Returns the bound array object, `None` meaning the default one.
    fn array_object_get_bound(&self) -> Option<ArrayObject>;

    /// Returns the index buffer of the array object.
    ///
    /// This is `None` once the index buffer has been deleted.
    fn array_object_index_buffer(&self, object: &ArrayObject)
                                 -> Result<Option<IndexBuffer>, Error>;

    /// Deletes the array object, binding the default one first if it is bound.
    fn array_object_delete(&self, object: &ArrayObject) -> Result<(), Error>;
}

pub(crate) struct GlArrayObjects {
    context: Rc<Context>,
}

impl GlArrayObjects {
    pub fn new(context: Rc<Context>) -> GlArrayObjects {
        GlArrayObjects { context }
    }
}

/// Binds an array object, `None` being the default one, and swaps in its index buffer.
fn switch(ctxt: &mut CommandContext<'_>, target: Option<RawHandle>) -> Result<(), Error> {
    let id = match target {
        Some(raw) => ctxt.resources.array_objects.get(raw)?.id,
        None => 0,
    };

    ctxt.bind_vertex_array(id)?;

    // the default array object's index buffer is only remembered while it is not bound
    if ctxt.bindings.array_object.is_none() {
        let current = ctxt.bindings.index_buffer;
        ctxt.bindings.default_index_buffer = current;
    }

    let index_buffer = match target {
        Some(raw) => ctxt.resources.array_objects.get(raw)?.index_buffer,
        None => ctxt.bindings.default_index_buffer,
    };
    ctxt.bindings.index_buffer = index_buffer;
    ctxt.bindings.array_object = target;
    Ok(())
}

impl ArrayObjects for GlArrayObjects {
    fn array_object_new_builder(&self) -> ArrayObjectBuilder {
        ArrayObjectBuilder::new(self.context.capabilities().max_vertex_attribs)
    }

    fn array_object_new_builder_from(&self, object: &ArrayObject)
                                     -> Result<ArrayObjectBuilder, Error>
    {
        let ctxt = self.context.make_current();
        let record = ctxt.resources.array_objects.get(object.raw)?;
        let index_buffer = record.index_buffer
            .and_then(|raw| ctxt.resources.index_buffers.get(raw).ok())
            .cloned();

        let mut builder = ArrayObjectBuilder::new(ctxt.capabilities.max_vertex_attribs);
        for attribute in record.attributes() {
            if let Some(slot) = builder.attributes.get_mut(attribute.index as usize) {
                *slot = Some(attribute.clone());
            }
        }
        builder.index_buffer = index_buffer;
        Ok(builder)
    }

    fn array_object_allocate(&self, builder: &ArrayObjectBuilder) -> Result<ArrayObject, Error> {
        let mut ctxt = self.context.make_current();
        let max = ctxt.capabilities.max_vertex_attribs;

        for attribute in builder.attributes.iter().flatten() {
            if attribute.index >= max {
                return Err(PreconditionError::OutOfRange {
                    index: attribute.index as u64,
                    limit: max as u64,
                }.into());
            }
            ctxt.resources.array_buffers.get(attribute.buffer.raw)?;
        }

        let index_buffer = match builder.index_buffer {
            Some(ref buffer) => {
                ctxt.resources.index_buffers.get(buffer.raw)?;
                Some((buffer.raw, buffer.id))
            },
            None => None,
        };

        let id = ctxt.call(format_args!("glGenVertexArrays(1)"), |gl| gl.gen_vertex_array())?;
        ctxt.created(|ctxt| {
            ctxt.bind_vertex_array(id)?;
            ctxt.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, index_buffer.map(|(_, id)| id)
                                                                   .unwrap_or(0))?;

            for index in 0 .. max {
                let attribute = match builder.attributes.get(index as usize) {
                    Some(Some(attribute)) => attribute,
                    _ => {
                        ctxt.call(format_args!("glDisableVertexAttribArray({})", index),
                                  |gl| gl.disable_vertex_attrib_array(index))?;
                        continue;
                    },
                };

                let scalar = attribute.attribute.ty().to_glenum_for(ctxt.profile);
                let components = attribute.attribute.components() as gl::types::GLint;
                let stride = attribute.stride() as gl::types::GLsizei;
                let (offset, normalized) = (attribute.offset, attribute.normalized);

                ctxt.bind_buffer(gl::ARRAY_BUFFER, attribute.buffer.id)?;
                ctxt.call(format_args!("glEnableVertexAttribArray({})", index),
                          |gl| gl.enable_vertex_attrib_array(index))?;
                ctxt.call(format_args!("glVertexAttribPointer({}, {}, 0x{:x}, {}, {}, {})",
                                       index, components, scalar, normalized, stride, offset),
                          |gl| gl.vertex_attrib_pointer(index, components, scalar, normalized,
                                                        stride, offset))?;
            }

            ctxt.restore_array_buffer()?;
            ctxt.restore_vertex_array()
        }, |ctxt| {
            ctxt.restore_vertex_array()?;
            ctxt.restore_array_buffer()?;
            ctxt.delete_vertex_array(id)
        })?;

        let attributes = Rc::new(builder.attributes.iter().take(max as usize).cloned().collect());
        let raw = ctxt.resources.array_objects.insert_with(|raw| ArrayObject {
            raw, id, attributes, index_buffer: index_buffer.map(|(raw, _)| raw),
        });

        let object = ctxt.resources.array_objects.get(raw)?.clone();
        debug!("Allocated array object {} ({} attributes)", id, object.attributes().count());
        Ok(object)
    }

    fn array_object_bind(&self, object: &ArrayObject) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.array_objects.get(object.raw)?;
        switch(&mut ctxt, Some(object.raw))
    }

    fn array_object_unbind(&self) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        switch(&mut ctxt, None)
    }

    fn array_object_is_bound(&self, object: &ArrayObject) -> Result<bool, Error> {
        let ctxt = self.context.make_current();
        ctxt.resources.array_objects.get(object.raw)?;
        Ok(ctxt.bindings.array_object == Some(object.raw))
    }

    fn array_object_get_bound(&self) -> Option<ArrayObject> {
        let ctxt = self.context.make_current();
        ctxt.bindings.array_object
            .and_then(|raw| ctxt.resources.array_objects.get(raw).ok())
            .cloned()
    }

    fn array_object_index_buffer(&self, object: &ArrayObject)
                                 -> Result<Option<IndexBuffer>, Error>
    {
        let ctxt = self.context.make_current();
        let record = ctxt.resources.array_objects.get(object.raw)?;
        Ok(record.index_buffer
                 .and_then(|raw| ctxt.resources.index_buffers.get(raw).ok())
                 .cloned())
    }

    fn array_object_delete(&self, object: &ArrayObject) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.array_objects.get(object.raw)?;
        if ctxt.bindings.array_object == Some(object.raw) {
            switch(&mut ctxt, None)?;
        }

        ctxt.resources.array_objects.remove(object.raw)?;
        debug!("Deleting array object {}", object.id);
        ctxt.delete_vertex_array(object.id)
    }
}
