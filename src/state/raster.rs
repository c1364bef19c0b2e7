use log::trace;

use crate::context::update;
use crate::gl;
use crate::state::{FaceSelection, FaceWindingOrder, GlStates, Rect};
use crate::{Error, ToGlEnum};

/// How polygons are rasterized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    /// Only draw a single point at each vertex.
    Point,
    /// Only draw a line in the boundaries of each polygon.
    Line,
    /// Fill the content of the polygon. This is the default mode.
    Fill,
}

impl ToGlEnum for PolygonMode {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        match *self {
            PolygonMode::Point => gl::POINT,
            PolygonMode::Line => gl::LINE,
            PolygonMode::Fill => gl::FILL,
        }
    }
}

/// Bitwise operation between the fragment color and the color in the framebuffer.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]    // GLenum
pub enum LogicOp {
    Clear = gl::CLEAR,
    And = gl::AND,
    AndReverse = gl::AND_REVERSE,
    Copy = gl::COPY,
    AndInverted = gl::AND_INVERTED,
    Noop = gl::NOOP,
    Xor = gl::XOR,
    Or = gl::OR,
    Nor = gl::NOR,
    Equiv = gl::EQUIV,
    Invert = gl::INVERT,
    OrReverse = gl::OR_REVERSE,
    CopyInverted = gl::COPY_INVERTED,
    OrInverted = gl::OR_INVERTED,
    Nand = gl::NAND,
    Set = gl::SET,
}

impl ToGlEnum for LogicOp {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        *self as gl::types::GLenum
    }
}

/// Restricts rendering to an area of the framebuffer.
pub trait Scissor {
    /// Enables the scissor test with the given area.
    fn scissor_enable(&self, area: Rect) -> Result<(), Error>;

    /// Disables the scissor test.
    fn scissor_disable(&self) -> Result<(), Error>;

    /// Returns true if the scissor test is enabled.
    fn scissor_is_enabled(&self) -> bool;
}

/// Mapping of normalized device coordinates to the framebuffer.
pub trait Viewports {
    /// Sets the viewport.
    fn viewport_set(&self, area: Rect) -> Result<(), Error>;

    /// Returns the latest viewport set, `None` if it was never set.
    fn viewport_get(&self) -> Option<Rect>;
}

/// Polygon rasterization modes. Only available with desktop OpenGL.
pub trait PolygonModes {
    /// Sets the mode of both front and back faces.
    fn polygon_set_mode(&self, mode: PolygonMode) -> Result<(), Error>;

    /// Returns the current mode.
    fn polygon_get_mode(&self) -> PolygonMode;
}

/// Logical operations on colors. Only available with desktop OpenGL.
pub trait LogicOps {
    /// Enables the logical operation.
    fn logic_op_enable(&self, op: LogicOp) -> Result<(), Error>;

    /// Disables logical operations.
    fn logic_op_disable(&self) -> Result<(), Error>;

    /// Returns true if a logical operation is enabled.
    fn logic_op_is_enabled(&self) -> bool;
}

/// Writing to and clearing the color buffers.
pub trait ColorBuffers {
    /// Sets which channels can be written.
    fn color_buffer_mask(&self, red: bool, green: bool, blue: bool, alpha: bool)
                         -> Result<(), Error>;

    /// Fills the color buffers with a color.
    fn color_buffer_clear(&self, color: [f32; 4]) -> Result<(), Error>;
}

/// Discarding of polygons depending on the side that faces the viewer.
pub trait Culling {
    /// Enables culling of `faces`, where front faces are given by `order`.
    fn culling_enable(&self, faces: FaceSelection, order: FaceWindingOrder) -> Result<(), Error>;

    /// Disables culling.
    fn culling_disable(&self) -> Result<(), Error>;

    /// Returns true if culling is enabled.
    fn culling_is_enabled(&self) -> bool;
}

impl Scissor for GlStates {
    fn scissor_enable(&self, area: Rect) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        let (x, y, w, h) = area.to_gl();

        trace!("Enabling scissor test {:?}", area);
        ctxt.set_enabled(gl::SCISSOR_TEST, true)?;
        ctxt.cached(|caching, state| update(caching, &mut state.scissor, (x, y, w, h)),
                    format_args!("glScissor({}, {}, {}, {})", x, y, w, h),
                    |gl| gl.scissor(x, y, w, h))?;
        ctxt.render.scissor = Some(area);
        Ok(())
    }

    fn scissor_disable(&self) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        trace!("Disabling scissor test");
        ctxt.set_enabled(gl::SCISSOR_TEST, false)?;
        ctxt.render.scissor = None;
        Ok(())
    }

    fn scissor_is_enabled(&self) -> bool {
        self.context.make_current().render.scissor.is_some()
    }
}

impl Viewports for GlStates {
    fn viewport_set(&self, area: Rect) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        let (x, y, w, h) = area.to_gl();

        ctxt.cached(|caching, state| update(caching, &mut state.viewport, (x, y, w, h)),
                    format_args!("glViewport({}, {}, {}, {})", x, y, w, h),
                    |gl| gl.viewport(x, y, w, h))?;
        ctxt.render.viewport = Some(area);
        Ok(())
    }

    fn viewport_get(&self) -> Option<Rect> {
        self.context.make_current().render.viewport
    }
}

impl PolygonModes for GlStates {
    fn polygon_set_mode(&self, mode: PolygonMode) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        let value = mode.to_glenum();

        trace!("Setting polygon mode {:?}", mode);
        ctxt.cached(|caching, state| update(caching, &mut state.polygon_mode, value),
                    format_args!("glPolygonMode(GL_FRONT_AND_BACK, 0x{:x})", value),
                    |gl| gl.polygon_mode(value))?;
        ctxt.render.polygon_mode = mode;
        Ok(())
    }

    fn polygon_get_mode(&self) -> PolygonMode {
        self.context.make_current().render.polygon_mode
    }
}

impl LogicOps for GlStates {
    fn logic_op_enable(&self, op: LogicOp) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        let value = op.to_glenum();

        trace!("Enabling logic op {:?}", op);
        ctxt.set_enabled(gl::COLOR_LOGIC_OP, true)?;
        ctxt.cached(|caching, state| update(caching, &mut state.logic_op, value),
                    format_args!("glLogicOp(0x{:x})", value),
                    |gl| gl.logic_op(value))?;
        ctxt.render.logic_op = Some(op);
        Ok(())
    }

    fn logic_op_disable(&self) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.set_enabled(gl::COLOR_LOGIC_OP, false)?;
        ctxt.render.logic_op = None;
        Ok(())
    }

    fn logic_op_is_enabled(&self) -> bool {
        self.context.make_current().render.logic_op.is_some()
    }
}

impl ColorBuffers for GlStates {
    fn color_buffer_mask(&self, red: bool, green: bool, blue: bool, alpha: bool)
                         -> Result<(), Error>
    {
        let mut ctxt = self.context.make_current();
        let mask = [red, green, blue, alpha];
        ctxt.cached(|caching, state| update(caching, &mut state.color_mask, mask),
                    format_args!("glColorMask({}, {}, {}, {})", red, green, blue, alpha),
                    |gl| gl.color_mask(mask))
    }

    fn color_buffer_clear(&self, color: [f32; 4]) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        super::clear::set_clear_color(&mut ctxt, color)?;
        ctxt.call(format_args!("glClear(GL_COLOR_BUFFER_BIT)"),
                  |gl| gl.clear(gl::COLOR_BUFFER_BIT))
    }
}

impl Culling for GlStates {
    fn culling_enable(&self, faces: FaceSelection, order: FaceWindingOrder) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        let face = faces.to_glenum();
        let front = order.to_glenum();

        trace!("Enabling culling of {:?} with {:?} front faces", faces, order);
        ctxt.set_enabled(gl::CULL_FACE, true)?;
        ctxt.cached(|caching, state| update(caching, &mut state.cull_face, face),
                    format_args!("glCullFace(0x{:x})", face),
                    |gl| gl.cull_face(face))?;
        ctxt.cached(|caching, state| update(caching, &mut state.front_face, front),
                    format_args!("glFrontFace(0x{:x})", front),
                    |gl| gl.front_face(front))?;
        ctxt.render.culling = Some((faces, order));
        Ok(())
    }

    fn culling_disable(&self) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.set_enabled(gl::CULL_FACE, false)?;
        ctxt.render.culling = None;
        Ok(())
    }

    fn culling_is_enabled(&self) -> bool {
        self.context.make_current().render.culling.is_some()
    }
}
