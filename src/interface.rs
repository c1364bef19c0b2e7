//! The facade that gives access to every capability of a context.

use std::fmt;
use std::rc::Rc;

use crate::array_object::{ArrayObjects, GlArrayObjects};
use crate::buffer::{ArrayBuffers, GlArrayBuffers};
use crate::context::{Context, Profile};
use crate::draw::{Draw, GlDraw};
use crate::framebuffer::{Framebuffers, GlFramebuffers, ReadFramebuffers};
use crate::index::{GlIndexBuffers, IndexBuffers};
use crate::program::{GlShaders, ShaderUniforms, Shaders};
use crate::render_buffer::{GlRenderbuffers, Renderbuffers};
use crate::state::{Blending, Clear, ColorBuffers, Culling, DepthBuffers, GlStates, LogicOps,
                   PolygonModes, Scissor, StencilBuffers, Viewports};
use crate::texture::{GlTextures, Textures, Textures2D, TexturesCube};
use crate::version::Version;

/// One implementation of each capability, for a single context.
///
/// The implementations are picked from the profile of the context when it is created.
/// Capabilities that the profile lacks are returned as `None`:
///
/// | capability          | GL 2.1 | GL 3 | GLES 2 | GLES 3 |
/// |---------------------|--------|------|--------|--------|
/// | `array_objects`     |        | yes  |        | yes    |
/// | `read_framebuffers` |        | yes  |        | yes    |
/// | `polygon_modes`     | yes    | yes  |        |        |
/// | `logic_ops`         | yes    | yes  |        |        |
pub struct Interface {
    context: Rc<Context>,
    array_buffers: GlArrayBuffers,
    array_objects: GlArrayObjects,
    index_buffers: GlIndexBuffers,
    textures: GlTextures,
    renderbuffers: GlRenderbuffers,
    framebuffers: GlFramebuffers,
    shaders: GlShaders,
    states: GlStates,
    draw: GlDraw,
}

impl Interface {
    pub(crate) fn new(context: Rc<Context>) -> Interface {
        Interface {
            array_buffers: GlArrayBuffers::new(context.clone()),
            array_objects: GlArrayObjects::new(context.clone()),
            index_buffers: GlIndexBuffers::new(context.clone()),
            textures: GlTextures::new(context.clone()),
            renderbuffers: GlRenderbuffers::new(context.clone()),
            framebuffers: GlFramebuffers::new(context.clone()),
            shaders: GlShaders::new(context.clone()),
            states: GlStates::new(context.clone()),
            draw: GlDraw::new(context.clone()),
            context,
        }
    }

    /// Returns the context shared by every capability.
    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Shortcut for `context().profile()`.
    #[inline]
    pub fn profile(&self) -> Profile {
        self.context.profile()
    }

    /// Shortcut for `context().version()`.
    #[inline]
    pub fn version(&self) -> &Version {
        self.context.version()
    }

    /// Array buffers.
    #[inline]
    pub fn array_buffers(&self) -> &dyn ArrayBuffers {
        &self.array_buffers
    }

    /// Array objects. Requires OpenGL 3 or OpenGL ES 3.
    pub fn array_objects(&self) -> Option<&dyn ArrayObjects> {
        if self.profile().has_array_objects() {
            Some(&self.array_objects)
        } else {
            None
        }
    }

    /// Index buffers.
    #[inline]
    pub fn index_buffers(&self) -> &dyn IndexBuffers {
        &self.index_buffers
    }

    /// Operations shared by every kind of texture.
    #[inline]
    pub fn textures(&self) -> &dyn Textures {
        &self.textures
    }

    /// Two-dimensional textures.
    #[inline]
    pub fn textures_2d(&self) -> &dyn Textures2D {
        &self.textures
    }

    /// Cube map textures.
    #[inline]
    pub fn textures_cube(&self) -> &dyn TexturesCube {
        &self.textures
    }

    /// Renderbuffers.
    #[inline]
    pub fn renderbuffers(&self) -> &dyn Renderbuffers {
        &self.renderbuffers
    }

    /// Framebuffers, and the draw framebuffer binding.
    #[inline]
    pub fn framebuffers(&self) -> &dyn Framebuffers {
        &self.framebuffers
    }

    /// Separate read framebuffers and blitting. Requires OpenGL 3 or OpenGL ES 3.
    pub fn read_framebuffers(&self) -> Option<&dyn ReadFramebuffers> {
        if self.profile().has_read_framebuffers() {
            Some(&self.framebuffers)
        } else {
            None
        }
    }

    /// Shaders and programs.
    #[inline]
    pub fn shaders(&self) -> &dyn Shaders {
        &self.shaders
    }

    /// Uniforms of the active program.
    #[inline]
    pub fn uniforms(&self) -> &dyn ShaderUniforms {
        &self.shaders
    }

    /// Blending.
    #[inline]
    pub fn blending(&self) -> &dyn Blending {
        &self.states
    }

    /// Depth testing and writing.
    #[inline]
    pub fn depth_buffers(&self) -> &dyn DepthBuffers {
        &self.states
    }

    /// Stencil testing and writing.
    #[inline]
    pub fn stencil_buffers(&self) -> &dyn StencilBuffers {
        &self.states
    }

    /// Scissor test.
    #[inline]
    pub fn scissor(&self) -> &dyn Scissor {
        &self.states
    }

    /// Viewport.
    #[inline]
    pub fn viewports(&self) -> &dyn Viewports {
        &self.states
    }

    /// Polygon modes. Not available with OpenGL ES.
    pub fn polygon_modes(&self) -> Option<&dyn PolygonModes> {
        if self.profile().is_gles() {
            None
        } else {
            Some(&self.states)
        }
    }

    /// Logical operations. Not available with OpenGL ES.
    pub fn logic_ops(&self) -> Option<&dyn LogicOps> {
        if self.profile().is_gles() {
            None
        } else {
            Some(&self.states)
        }
    }

    /// Color masks and clearing.
    #[inline]
    pub fn color_buffers(&self) -> &dyn ColorBuffers {
        &self.states
    }

    /// Face culling.
    #[inline]
    pub fn culling(&self) -> &dyn Culling {
        &self.states
    }

    /// Clearing several buffers at once.
    #[inline]
    pub fn clear(&self) -> &dyn Clear {
        &self.states
    }

    /// Draw calls.
    #[inline]
    pub fn draw(&self) -> &dyn Draw {
        &self.draw
    }
}

impl fmt::Debug for Interface {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "Interface(context #{}, {:?})", self.context.id(), self.profile())
    }
}
