//! Drawing primitives with the active program.

use std::rc::Rc;

use log::trace;

use crate::context::Context;
use crate::index::PrimitiveType;
use crate::resource::ResourceKind;
use crate::{Error, PreconditionError, ToGlEnum};

/// Issuing draw calls.
///
/// Both calls fail with `PreconditionError::NoActiveProgram` if no program is active.
pub trait Draw {
    /// Draws `count` vertices of the bound array buffers, starting at vertex `first`.
    fn draw_unindexed(&self, primitive: PrimitiveType, first: u32, count: u32)
                      -> Result<(), Error>;

    /// Draws every index of the bound index buffer.
    ///
    /// Fails with `PreconditionError::NotBound` if no index buffer is bound.
    fn draw_indexed(&self, primitive: PrimitiveType) -> Result<(), Error>;
}

/// Converts a vertex or index count to the `GLint`/`GLsizei` that the driver takes.
fn to_glint<T: Copy + Into<u64>>(value: T) -> Result<i32, PreconditionError> {
    let value = value.into();
    i32::try_from(value)
        .map_err(|_| PreconditionError::OutOfRange { index: value, limit: i32::MAX as u64 })
}

pub(crate) struct GlDraw {
    context: Rc<Context>,
}

impl GlDraw {
    pub fn new(context: Rc<Context>) -> GlDraw {
        GlDraw { context }
    }
}

impl Draw for GlDraw {
    fn draw_unindexed(&self, primitive: PrimitiveType, first: u32, count: u32)
                      -> Result<(), Error>
    {
        let mut ctxt = self.context.make_current();
        if ctxt.bindings.program.is_none() {
            return Err(PreconditionError::NoActiveProgram.into());
        }

        let first_gl = to_glint(first)?;
        let count_gl = to_glint(count)?;

        let mode = primitive.to_glenum();
        trace!("Drawing {} vertices as {:?}", count, primitive);
        ctxt.call(format_args!("glDrawArrays(0x{:x}, {}, {})", mode, first, count),
                  |gl| gl.draw_arrays(mode, first_gl, count_gl))
    }

    fn draw_indexed(&self, primitive: PrimitiveType) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        if ctxt.bindings.program.is_none() {
            return Err(PreconditionError::NoActiveProgram.into());
        }

        let raw = ctxt.bindings.index_buffer
            .ok_or(PreconditionError::NotBound(ResourceKind::IndexBuffer))?;
        let (indices, ty) = {
            let buffer = ctxt.resources.index_buffers.get(raw)?;
            (buffer.indices(), buffer.ty().to_glenum())
        };

        let count = to_glint(indices as u64)?;

        let mode = primitive.to_glenum();
        trace!("Drawing {} indices as {:?}", indices, primitive);
        ctxt.call(format_args!("glDrawElements(0x{:x}, {}, 0x{:x}, 0)", mode, indices, ty),
                  |gl| gl.draw_elements(mode, count, ty, 0))
    }
}
