use smallvec::SmallVec;

use crate::gl;
use crate::state::{Blend, DepthTest, FaceSelection, FaceWindingOrder, LogicOp, PolygonMode, Rect};

/// Represents the current OpenGL state, as far as the driver is concerned.
///
/// Every field is the latest value passed to the driver. `None` means "unknown", in which case
/// the next call always reaches the driver. The whole state is reset to unknown whenever the
/// driver reports an error, since we can't tell which part of the call took effect.
#[derive(Debug, Clone, Default)]
pub struct GlState {
    /// The latest buffer bound to `GL_ARRAY_BUFFER`.
    pub array_buffer_binding: Option<gl::types::GLuint>,

    /// The latest buffer bound to `GL_ELEMENT_ARRAY_BUFFER`. Belongs to the vertex array object,
    /// so it becomes unknown whenever another one is bound.
    pub element_array_buffer_binding: Option<gl::types::GLuint>,

    /// The latest value passed to `glBindVertexArray`.
    pub vertex_array: Option<gl::types::GLuint>,

    /// The id of the active texture unit.
    /// IMPORTANT: this is a raw number (0, 1, 2, ...), not an
    ///            enumeration (GL_TEXTURE0, GL_TEXTURE1, ...).
    pub active_texture: Option<gl::types::GLuint>,

    /// List of texture units. Grows on demand.
    pub texture_units: SmallVec<[TextureUnitState; 32]>,

    /// The latest render buffer bound with `glBindRenderbuffer`.
    pub renderbuffer: Option<gl::types::GLuint>,

    /// The latest framebuffer bound to `GL_DRAW_FRAMEBUFFER`, or to `GL_FRAMEBUFFER`.
    pub draw_framebuffer: Option<gl::types::GLuint>,

    /// The latest framebuffer bound to `GL_READ_FRAMEBUFFER`, or to `GL_FRAMEBUFFER`.
    pub read_framebuffer: Option<gl::types::GLuint>,

    /// The latest value passed to `glUseProgram`.
    pub program: Option<gl::types::GLuint>,

    /// Whether GL_BLEND is enabled
    pub enabled_blend: Option<bool>,

    /// Whether GL_CULL_FACE is enabled
    pub enabled_cull_face: Option<bool>,

    /// Whether GL_DEPTH_TEST is enabled
    pub enabled_depth_test: Option<bool>,

    /// Whether GL_SCISSOR_TEST is enabled
    pub enabled_scissor_test: Option<bool>,

    /// Whether GL_STENCIL_TEST is enabled
    pub enabled_stencil_test: Option<bool>,

    /// Whether GL_COLOR_LOGIC_OP is enabled
    pub enabled_color_logic_op: Option<bool>,

    /// The latest values passed to `glBlendEquationSeparate`.
    pub blend_equation: Option<(gl::types::GLenum, gl::types::GLenum)>,

    /// The latest values passed to `glBlendFuncSeparate`.
    pub blend_func: Option<(gl::types::GLenum, gl::types::GLenum,
                            gl::types::GLenum, gl::types::GLenum)>,

    /// The latest value passed to `glBlendColor`.
    pub blend_color: Option<[f32; 4]>,

    /// The latest value passed to `glDepthFunc`.
    pub depth_func: Option<gl::types::GLenum>,

    /// The latest value passed to `glDepthMask`.
    pub depth_mask: Option<bool>,

    /// The latest value passed to `glClearColor`.
    pub clear_color: Option<[f32; 4]>,

    /// The latest value passed to `glClearDepth`.
    pub clear_depth: Option<f32>,

    /// The latest value passed to `glClearStencil`.
    pub clear_stencil: Option<gl::types::GLint>,

    /// The latest values passed to `glStencilFuncSeparate`, front then back.
    pub stencil_func: [Option<(gl::types::GLenum, gl::types::GLint, gl::types::GLuint)>; 2],

    /// The latest values passed to `glStencilOpSeparate`, front then back.
    pub stencil_op: [Option<(gl::types::GLenum, gl::types::GLenum, gl::types::GLenum)>; 2],

    /// The latest values passed to `glStencilMaskSeparate`, front then back.
    pub stencil_mask: [Option<gl::types::GLuint>; 2],

    /// The latest values passed to `glViewport`.
    pub viewport: Option<(gl::types::GLint, gl::types::GLint,
                          gl::types::GLsizei, gl::types::GLsizei)>,

    /// The latest values passed to `glScissor`.
    pub scissor: Option<(gl::types::GLint, gl::types::GLint,
                         gl::types::GLsizei, gl::types::GLsizei)>,

    /// The latest value passed to `glPolygonMode`.
    pub polygon_mode: Option<gl::types::GLenum>,

    /// The latest value passed to `glLogicOp`.
    pub logic_op: Option<gl::types::GLenum>,

    /// The latest values passed to `glColorMask`.
    pub color_mask: Option<[bool; 4]>,

    /// The latest value passed to `glCullFace`.
    pub cull_face: Option<gl::types::GLenum>,

    /// The latest value passed to `glFrontFace`.
    pub front_face: Option<gl::types::GLenum>,
}

/// State of a texture unit (the one designated by `glActiveTexture`).
#[derive(Debug, Copy, Clone, Default)]
pub struct TextureUnitState {
    /// Id of the texture bound to `GL_TEXTURE_2D`.
    pub texture_2d: Option<gl::types::GLuint>,

    /// Id of the texture bound to `GL_TEXTURE_CUBE_MAP`.
    pub texture_cube: Option<gl::types::GLuint>,
}

impl GlState {
    /// Returns the cache slot for a `glEnable` capability.
    pub fn enabled(&mut self, cap: gl::types::GLenum) -> Option<&mut Option<bool>> {
        match cap {
            gl::BLEND => Some(&mut self.enabled_blend),
            gl::CULL_FACE => Some(&mut self.enabled_cull_face),
            gl::DEPTH_TEST => Some(&mut self.enabled_depth_test),
            gl::SCISSOR_TEST => Some(&mut self.enabled_scissor_test),
            gl::STENCIL_TEST => Some(&mut self.enabled_stencil_test),
            gl::COLOR_LOGIC_OP => Some(&mut self.enabled_color_logic_op),
            _ => None,
        }
    }

    /// Returns the state of a texture unit, growing the list if necessary.
    pub fn texture_unit(&mut self, unit: gl::types::GLuint) -> &mut TextureUnitState {
        let unit = unit as usize;
        if self.texture_units.len() <= unit {
            self.texture_units.resize(unit + 1, TextureUnitState::default());
        }
        &mut self.texture_units[unit]
    }

    /// The driver unbinds a buffer when it is deleted.
    pub fn forget_buffer(&mut self, id: gl::types::GLuint) {
        forget(&mut self.array_buffer_binding, id);
        forget(&mut self.element_array_buffer_binding, id);
    }

    /// The driver unbinds a texture from every unit when it is deleted.
    pub fn forget_texture(&mut self, id: gl::types::GLuint) {
        for unit in self.texture_units.iter_mut() {
            forget(&mut unit.texture_2d, id);
            forget(&mut unit.texture_cube, id);
        }
    }

    /// The driver falls back to no vertex array object at all when the bound one is deleted.
    pub fn forget_vertex_array(&mut self, id: gl::types::GLuint) {
        if self.vertex_array == Some(id) {
            self.vertex_array = Some(0);
            self.element_array_buffer_binding = None;
        }
    }

    pub fn forget_renderbuffer(&mut self, id: gl::types::GLuint) {
        forget(&mut self.renderbuffer, id);
    }

    pub fn forget_framebuffer(&mut self, id: gl::types::GLuint) {
        forget(&mut self.draw_framebuffer, id);
        forget(&mut self.read_framebuffer, id);
    }
}

fn forget(slot: &mut Option<gl::types::GLuint>, id: gl::types::GLuint) {
    if *slot == Some(id) {
        *slot = Some(0);
    }
}

/// Stores `value` in the cache slot, and returns true if the driver must be called.
///
/// When caching is disabled, the driver is always called. The slot is still updated, so that
/// enabling the cache later doesn't rely on stale values.
#[inline]
pub fn update<T: PartialEq>(caching: bool, slot: &mut Option<T>, value: T) -> bool {
    if caching && slot.as_ref() == Some(&value) {
        return false;
    }

    *slot = Some(value);
    true
}

/// The state as the user of the interface set it.
///
/// Contrary to `GlState`, this is always accurate, and is what the `*_is_enabled` queries
/// return.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub blend: Option<Blend>,
    pub depth_test: Option<DepthTest>,
    pub depth_write: bool,
    pub stencil_test: bool,
    pub scissor: Option<Rect>,
    pub viewport: Option<Rect>,
    pub logic_op: Option<LogicOp>,
    pub culling: Option<(FaceSelection, FaceWindingOrder)>,
    pub polygon_mode: PolygonMode,
}

impl Default for RenderState {
    fn default() -> RenderState {
        RenderState {
            blend: None,
            depth_test: None,
            depth_write: true,
            stencil_test: false,
            scissor: None,
            viewport: None,
            logic_op: None,
            culling: None,
            polygon_mode: PolygonMode::Fill,
        }
    }
}
