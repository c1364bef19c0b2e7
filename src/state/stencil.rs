use log::trace;

use crate::context::{update, CommandContext};
use crate::gl;
use crate::state::{FaceSelection, GlStates};
use crate::{Error, PreconditionError, ToGlEnum};

/// Specifies which comparison the GPU will do to determine whether a sample passes the stencil
/// test. The general equation is `(ref & mask) CMP (stencil & mask)`, where `ref` is the
/// reference value, `CMP` is the comparison chosen, and `stencil` is the current value in the
/// stencil buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StencilTest {
    /// The stencil test always passes.
    AlwaysPass,
    /// The stencil test always fails.
    AlwaysFail,
    /// `(ref & mask) < (stencil & mask)`
    IfLess,
    /// `(ref & mask) <= (stencil & mask)`
    IfLessOrEqual,
    /// `(ref & mask) > (stencil & mask)`
    IfMore,
    /// `(ref & mask) >= (stencil & mask)`
    IfMoreOrEqual,
    /// `(ref & mask) == (stencil & mask)`
    IfEqual,
    /// `(ref & mask) != (stencil & mask)`
    IfNotEqual,
}

impl ToGlEnum for StencilTest {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        match *self {
            StencilTest::AlwaysPass => gl::ALWAYS,
            StencilTest::AlwaysFail => gl::NEVER,
            StencilTest::IfLess => gl::LESS,
            StencilTest::IfLessOrEqual => gl::LEQUAL,
            StencilTest::IfMore => gl::GREATER,
            StencilTest::IfMoreOrEqual => gl::GEQUAL,
            StencilTest::IfEqual => gl::EQUAL,
            StencilTest::IfNotEqual => gl::NOTEQUAL,
        }
    }
}

/// Specificies which operation the GPU will do depending on the result of the stencil test.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]    // GLenum
pub enum StencilOperation {
    /// Keeps the value currently in the stencil buffer.
    Keep = gl::KEEP,

    /// Writes zero in the stencil buffer.
    Zero = gl::ZERO,

    /// Writes the reference value in the stencil buffer.
    Replace = gl::REPLACE,

    /// Increments the value currently in the stencil buffer. If the value is the
    /// maximum, don't do anything.
    Increment = gl::INCR,

    /// Increments the value currently in the stencil buffer. If the value is the
    /// maximum, wrap to `0`.
    IncrementWrap = gl::INCR_WRAP,

    /// Decrements the value currently in the stencil buffer. If the value is `0`,
    /// don't do anything.
    Decrement = gl::DECR,

    /// Decrements the value currently in the stencil buffer. If the value is `0`,
    /// wrap to `-1`.
    DecrementWrap = gl::DECR_WRAP,

    /// Inverts each bit of the value.
    Invert = gl::INVERT,
}

impl ToGlEnum for StencilOperation {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        *self as gl::types::GLenum
    }
}

/// Stencil testing and writing.
///
/// Everything except `stencil_buffer_get_bits` fails with
/// `PreconditionError::NoStencilBuffer` if the current draw framebuffer has no stencil buffer.
pub trait StencilBuffers {
    /// Bits of stencil of the current draw framebuffer.
    fn stencil_buffer_get_bits(&self) -> u32;

    /// Enables stencil testing.
    fn stencil_buffer_enable(&self) -> Result<(), Error>;

    /// Disables stencil testing.
    fn stencil_buffer_disable(&self) -> Result<(), Error>;

    /// Returns true if stencil testing is enabled.
    fn stencil_buffer_is_enabled(&self) -> Result<bool, Error>;

    /// Fills the stencil buffer with a value.
    fn stencil_buffer_clear(&self, stencil: i32) -> Result<(), Error>;

    /// Sets the test, the reference value and the mask used by the test.
    fn stencil_buffer_function(&self, faces: FaceSelection, test: StencilTest, reference: i32,
                               mask: u32) -> Result<(), Error>;

    /// Sets what happens when the stencil test fails, when it passes but the depth test fails,
    /// and when both pass.
    fn stencil_buffer_operation(&self, faces: FaceSelection, stencil_fail: StencilOperation,
                                depth_fail: StencilOperation, pass: StencilOperation)
                                -> Result<(), Error>;

    /// Sets the bits of the stencil buffer that can be written.
    fn stencil_buffer_mask(&self, faces: FaceSelection, mask: u32) -> Result<(), Error>;
}

fn check_stencil_buffer(ctxt: &CommandContext<'_>) -> Result<(), Error> {
    if ctxt.draw_framebuffer_bits().1 == 0 {
        return Err(PreconditionError::NoStencilBuffer.into());
    }

    Ok(())
}

/// Sets the clear value, but doesn't clear.
pub(super) fn set_clear_stencil(ctxt: &mut CommandContext<'_>, stencil: i32)
                                -> Result<(), Error>
{
    ctxt.cached(|caching, state| update(caching, &mut state.clear_stencil, stencil),
                format_args!("glClearStencil({})", stencil),
                |gl| gl.clear_stencil(stencil))
}

impl StencilBuffers for GlStates {
    fn stencil_buffer_get_bits(&self) -> u32 {
        self.context.make_current().draw_framebuffer_bits().1
    }

    fn stencil_buffer_enable(&self) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        check_stencil_buffer(&ctxt)?;
        trace!("Enabling stencil test");
        ctxt.set_enabled(gl::STENCIL_TEST, true)?;
        ctxt.render.stencil_test = true;
        Ok(())
    }

    fn stencil_buffer_disable(&self) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        check_stencil_buffer(&ctxt)?;
        trace!("Disabling stencil test");
        ctxt.set_enabled(gl::STENCIL_TEST, false)?;
        ctxt.render.stencil_test = false;
        Ok(())
    }

    fn stencil_buffer_is_enabled(&self) -> Result<bool, Error> {
        let ctxt = self.context.make_current();
        check_stencil_buffer(&ctxt)?;
        Ok(ctxt.render.stencil_test)
    }

    fn stencil_buffer_clear(&self, stencil: i32) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        check_stencil_buffer(&ctxt)?;

        set_clear_stencil(&mut ctxt, stencil)?;
        ctxt.call(format_args!("glClear(GL_STENCIL_BUFFER_BIT)"),
                  |gl| gl.clear(gl::STENCIL_BUFFER_BIT))
    }

    fn stencil_buffer_function(&self, faces: FaceSelection, test: StencilTest, reference: i32,
                               mask: u32) -> Result<(), Error>
    {
        let mut ctxt = self.context.make_current();
        check_stencil_buffer(&ctxt)?;

        let face = faces.to_glenum();
        let value = (test.to_glenum(), reference, mask);
        ctxt.cached(|caching, state| {
                        let mut changed = false;
                        for &slot in faces.slots() {
                            changed |= update(caching, &mut state.stencil_func[slot], value);
                        }
                        changed
                    },
                    format_args!("glStencilFuncSeparate(0x{:x}, 0x{:x}, {}, 0x{:x})", face,
                                 value.0, reference, mask),
                    |gl| gl.stencil_func_separate(face, value.0, reference, mask))
    }

    fn stencil_buffer_operation(&self, faces: FaceSelection, stencil_fail: StencilOperation,
                                depth_fail: StencilOperation, pass: StencilOperation)
                                -> Result<(), Error>
    {
        let mut ctxt = self.context.make_current();
        check_stencil_buffer(&ctxt)?;

        let face = faces.to_glenum();
        let value = (stencil_fail.to_glenum(), depth_fail.to_glenum(), pass.to_glenum());
        ctxt.cached(|caching, state| {
                        let mut changed = false;
                        for &slot in faces.slots() {
                            changed |= update(caching, &mut state.stencil_op[slot], value);
                        }
                        changed
                    },
                    format_args!("glStencilOpSeparate(0x{:x}, 0x{:x}, 0x{:x}, 0x{:x})", face,
                                 value.0, value.1, value.2),
                    |gl| gl.stencil_op_separate(face, value.0, value.1, value.2))
    }

    fn stencil_buffer_mask(&self, faces: FaceSelection, mask: u32) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        check_stencil_buffer(&ctxt)?;

        let face = faces.to_glenum();
        ctxt.cached(|caching, state| {
                        let mut changed = false;
                        for &slot in faces.slots() {
                            changed |= update(caching, &mut state.stencil_mask[slot], mask);
                        }
                        changed
                    },
                    format_args!("glStencilMaskSeparate(0x{:x}, 0x{:x})", face, mask),
                    |gl| gl.stencil_mask_separate(face, mask))
    }
}
