use log::trace;

use crate::context::{update, CommandContext};
use crate::gl;
use crate::state::GlStates;
use crate::{Error, PreconditionError, ToGlEnum};

/// The function that the GPU will use to determine whether to write over an existing pixel
/// on the target.
///
/// The incoming depth value is compared with the value in the depth buffer, and the fragment
/// is discarded if the comparison fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DepthTest {
    /// Never replace the target pixel.
    Ignore,
    /// Always replace the target pixel.
    Overwrite,
    /// Replace if the z-value of the source is equal to the destination.
    IfEqual,
    /// Replace if the z-value of the source is different than the destination.
    IfNotEqual,
    /// Replace if the z-value of the source is more than the destination.
    IfMore,
    /// Replace if the z-value of the source is more than, or equal to the destination.
    IfMoreOrEqual,
    /// Replace if the z-value of the source is less than the destination.
    IfLess,
    /// Replace if the z-value of the source is less than, or equal to the destination.
    IfLessOrEqual,
}

impl ToGlEnum for DepthTest {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        match *self {
            DepthTest::Ignore => gl::NEVER,
            DepthTest::Overwrite => gl::ALWAYS,
            DepthTest::IfEqual => gl::EQUAL,
            DepthTest::IfNotEqual => gl::NOTEQUAL,
            DepthTest::IfMore => gl::GREATER,
            DepthTest::IfMoreOrEqual => gl::GEQUAL,
            DepthTest::IfLess => gl::LESS,
            DepthTest::IfLessOrEqual => gl::LEQUAL,
        }
    }
}

/// Depth testing and writing.
///
/// Everything except `depth_buffer_get_bits` fails with `PreconditionError::NoDepthBuffer`
/// if the current draw framebuffer has no depth buffer.
pub trait DepthBuffers {
    /// Bits of depth of the current draw framebuffer.
    fn depth_buffer_get_bits(&self) -> u32;

    /// Enables depth testing.
    fn depth_buffer_test_enable(&self, test: DepthTest) -> Result<(), Error>;

    /// Disables depth testing.
    fn depth_buffer_test_disable(&self) -> Result<(), Error>;

    /// Returns true if depth testing is enabled.
    fn depth_buffer_test_is_enabled(&self) -> Result<bool, Error>;

    /// Enables writing to the depth buffer. Enabled by default.
    fn depth_buffer_write_enable(&self) -> Result<(), Error>;

    /// Disables writing to the depth buffer.
    fn depth_buffer_write_disable(&self) -> Result<(), Error>;

    /// Returns true if writing to the depth buffer is enabled.
    fn depth_buffer_write_is_enabled(&self) -> Result<bool, Error>;

    /// Fills the depth buffer with a value.
    fn depth_buffer_clear(&self, depth: f32) -> Result<(), Error>;
}

fn check_depth_buffer(ctxt: &CommandContext<'_>) -> Result<(), Error> {
    if ctxt.draw_framebuffer_bits().0 == 0 {
        return Err(PreconditionError::NoDepthBuffer.into());
    }

    Ok(())
}

fn set_depth_mask(ctxt: &mut CommandContext<'_>, write: bool) -> Result<(), Error> {
    check_depth_buffer(ctxt)?;
    trace!("Setting depth write to {}", write);
    ctxt.cached(|caching, state| update(caching, &mut state.depth_mask, write),
                format_args!("glDepthMask({})", write),
                |gl| gl.depth_mask(write))?;
    ctxt.render.depth_write = write;
    Ok(())
}

/// Sets the clear depth, but doesn't clear.
pub(super) fn set_clear_depth(ctxt: &mut CommandContext<'_>, depth: f32) -> Result<(), Error> {
    ctxt.cached(|caching, state| update(caching, &mut state.clear_depth, depth),
                format_args!("glClearDepth({})", depth),
                |gl| gl.clear_depth(depth))
}

impl DepthBuffers for GlStates {
    fn depth_buffer_get_bits(&self) -> u32 {
        self.context.make_current().draw_framebuffer_bits().0
    }

    fn depth_buffer_test_enable(&self, test: DepthTest) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        check_depth_buffer(&ctxt)?;

        let function = test.to_glenum();
        trace!("Enabling depth test {:?}", test);
        ctxt.set_enabled(gl::DEPTH_TEST, true)?;
        ctxt.cached(|caching, state| update(caching, &mut state.depth_func, function),
                    format_args!("glDepthFunc(0x{:x})", function),
                    |gl| gl.depth_func(function))?;
        ctxt.render.depth_test = Some(test);
        Ok(())
    }

    fn depth_buffer_test_disable(&self) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        check_depth_buffer(&ctxt)?;

        trace!("Disabling depth test");
        ctxt.set_enabled(gl::DEPTH_TEST, false)?;
        ctxt.render.depth_test = None;
        Ok(())
    }

    fn depth_buffer_test_is_enabled(&self) -> Result<bool, Error> {
        let ctxt = self.context.make_current();
        check_depth_buffer(&ctxt)?;
        Ok(ctxt.render.depth_test.is_some())
    }

    fn depth_buffer_write_enable(&self) -> Result<(), Error> {
        set_depth_mask(&mut self.context.make_current(), true)
    }

    fn depth_buffer_write_disable(&self) -> Result<(), Error> {
        set_depth_mask(&mut self.context.make_current(), false)
    }

    fn depth_buffer_write_is_enabled(&self) -> Result<bool, Error> {
        let ctxt = self.context.make_current();
        check_depth_buffer(&ctxt)?;
        Ok(ctxt.render.depth_write)
    }

    fn depth_buffer_clear(&self, depth: f32) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        check_depth_buffer(&ctxt)?;

        set_clear_depth(&mut ctxt, depth)?;
        ctxt.call(format_args!("glClear(GL_DEPTH_BUFFER_BIT)"),
                  |gl| gl.clear(gl::DEPTH_BUFFER_BIT))
    }
}
