/*!
Fixed-function state: blending, depth and stencil testing, scissoring, viewports, culling,
polygon modes, logic operations, color masks and clearing.

Each category is a trait. They all share the driver state cache of the context, so setting
a value that the driver already has doesn't reach the driver when state caching is enabled:

```no_run
# use glguard::{ContextBuilder, FakeDriver, FakeConfig};
use glguard::Rect;
use glguard::state::{Blend, DepthTest};

# let interface = ContextBuilder::new().build(FakeDriver::new(FakeConfig::gl33())).unwrap();
interface.viewports().viewport_set(Rect::new(0, 0, 640, 480)).unwrap();
interface.blending().blending_enable(&Blend::alpha_blending()).unwrap();
interface.depth_buffers().depth_buffer_test_enable(DepthTest::IfLess).unwrap();
```

The depth and stencil categories check that the current draw framebuffer has a depth or
stencil buffer. The default framebuffer has one if the driver reported depth or stencil bits.

*/
use std::rc::Rc;

use crate::context::Context;
use crate::gl;
use crate::ToGlEnum;

pub use self::blend::{Blend, Blending, BlendingFunction, LinearBlendingFactor};
pub use self::clear::{Clear, ClearSpecification};
pub use self::depth::{DepthBuffers, DepthTest};
pub use self::raster::{ColorBuffers, Culling, LogicOp, LogicOps, PolygonMode, PolygonModes,
                       Scissor, Viewports};
pub use self::stencil::{StencilBuffers, StencilOperation, StencilTest};

mod blend;
mod clear;
mod depth;
mod raster;
mod stencil;

/// An area of a framebuffer, in pixels, from the bottom-left corner.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Number of pixels between the left border and the area.
    pub left: u32,
    /// Number of pixels between the bottom border and the area.
    pub bottom: u32,
    /// Width of the area in pixels.
    pub width: u32,
    /// Height of the area in pixels.
    pub height: u32,
}

impl Rect {
    /// Builds an area.
    #[inline]
    pub const fn new(left: u32, bottom: u32, width: u32, height: u32) -> Rect {
        Rect { left, bottom, width, height }
    }

    /// `[x0, y0, x1, y1]`, the bottom-left corner and the exclusive top-right corner.
    #[inline]
    pub fn corners(&self) -> [i32; 4] {
        [
            self.left as i32,
            self.bottom as i32,
            (self.left + self.width) as i32,
            (self.bottom + self.height) as i32,
        ]
    }

    /// The `(x, y, width, height)` arguments of `glViewport` and `glScissor`.
    #[inline]
    fn to_gl(self) -> (gl::types::GLint, gl::types::GLint, gl::types::GLsizei, gl::types::GLsizei) {
        (self.left as gl::types::GLint, self.bottom as gl::types::GLint,
         self.width as gl::types::GLsizei, self.height as gl::types::GLsizei)
    }
}

/// Which faces of polygons an operation applies to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FaceSelection {
    /// Front faces only.
    Front,
    /// Back faces only.
    Back,
    /// Both front and back faces.
    FrontAndBack,
}

impl FaceSelection {
    /// Indices in the `[front, back]` arrays of the state cache.
    fn slots(self) -> &'static [usize] {
        match self {
            FaceSelection::Front => &[0],
            FaceSelection::Back => &[1],
            FaceSelection::FrontAndBack => &[0, 1],
        }
    }
}

impl ToGlEnum for FaceSelection {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        match *self {
            FaceSelection::Front => gl::FRONT,
            FaceSelection::Back => gl::BACK,
            FaceSelection::FrontAndBack => gl::FRONT_AND_BACK,
        }
    }
}

/// The winding order that makes a polygon front-facing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FaceWindingOrder {
    /// Clockwise polygons are front-facing.
    Clockwise,
    /// Counter-clockwise polygons are front-facing. This is the OpenGL default.
    CounterClockwise,
}

impl ToGlEnum for FaceWindingOrder {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        match *self {
            FaceWindingOrder::Clockwise => gl::CW,
            FaceWindingOrder::CounterClockwise => gl::CCW,
        }
    }
}

/// Implements every state category.
pub(crate) struct GlStates {
    context: Rc<Context>,
}

impl GlStates {
    pub fn new(context: Rc<Context>) -> GlStates {
        GlStates { context }
    }
}

#[cfg(test)]
mod tests {
    use super::{FaceSelection, Rect};

    #[test]
    fn corners() {
        assert_eq!(Rect::new(2, 3, 10, 20).corners(), [2, 3, 12, 23]);
        assert_eq!(Rect::default().corners(), [0, 0, 0, 0]);
    }

    #[test]
    fn face_slots() {
        assert_eq!(FaceSelection::Front.slots(), &[0]);
        assert_eq!(FaceSelection::FrontAndBack.slots(), &[0, 1]);
    }
}
