use log::trace;

use crate::context::{update, CommandContext};
use crate::gl;
use crate::state::depth::set_clear_depth;
use crate::state::stencil::set_clear_stencil;
use crate::state::GlStates;
use crate::{Error, PreconditionError};

/// The buffers to clear, and the value to write in each of them.
///
/// A `None` leaves the buffer untouched.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ClearSpecification {
    /// Color written in every color buffer.
    pub color: Option<[f32; 4]>,
    /// Value written in the depth buffer.
    pub depth: Option<f32>,
    /// Value written in the stencil buffer.
    pub stencil: Option<i32>,
}

/// Clearing several buffers at once.
pub trait Clear {
    /// Clears the buffers of the current draw framebuffer with a single `glClear`.
    ///
    /// Fails with `PreconditionError::NoDepthBuffer` or `NoStencilBuffer` if a value is given
    /// for a buffer that the framebuffer doesn't have. Nothing is cleared in that case.
    fn clear(&self, spec: &ClearSpecification) -> Result<(), Error>;
}

/// Sets the clear color, but doesn't clear.
pub(super) fn set_clear_color(ctxt: &mut CommandContext<'_>, color: [f32; 4])
                              -> Result<(), Error>
{
    ctxt.cached(|caching, state| update(caching, &mut state.clear_color, color),
                format_args!("glClearColor({}, {}, {}, {})", color[0], color[1], color[2],
                             color[3]),
                |gl| gl.clear_color(color))
}

impl Clear for GlStates {
    fn clear(&self, spec: &ClearSpecification) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        let (depth_bits, stencil_bits) = ctxt.draw_framebuffer_bits();

        if spec.depth.is_some() && depth_bits == 0 {
            return Err(PreconditionError::NoDepthBuffer.into());
        }
        if spec.stencil.is_some() && stencil_bits == 0 {
            return Err(PreconditionError::NoStencilBuffer.into());
        }

        let mut mask = 0;
        if let Some(color) = spec.color {
            set_clear_color(&mut ctxt, color)?;
            mask |= gl::COLOR_BUFFER_BIT;
        }
        if let Some(depth) = spec.depth {
            set_clear_depth(&mut ctxt, depth)?;
            mask |= gl::DEPTH_BUFFER_BIT;
        }
        if let Some(stencil) = spec.stencil {
            set_clear_stencil(&mut ctxt, stencil)?;
            mask |= gl::STENCIL_BUFFER_BIT;
        }

        if mask == 0 {
            trace!("Nothing to clear");
            return Ok(());
        }

        ctxt.call(format_args!("glClear(0x{:x})", mask), |gl| gl.clear(mask))
    }
}
