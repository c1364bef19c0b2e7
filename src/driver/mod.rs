/*!
The narrow call surface between glguard and OpenGL.

Every operation of the `Interface` ends up as a sequence of calls to a `Driver`. The arguments
are raw OpenGL names and enums, exactly like the C API. All the checks happen before the
driver is reached.

There are two implementations:

 - `GlDriver` calls the real OpenGL functions, loaded through a `Backend`.
 - `FakeDriver` keeps everything in memory. It is used by the tests and can be used by
   anyone who wants to exercise rendering code without a GPU.

*/
use crate::gl::types::{GLbitfield, GLenum, GLint, GLsizei, GLuint};

pub use self::gl::GlDriver;

pub mod fake;
mod gl;
mod glsl;

/// A value that can be written to a uniform.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    /// `glUniform1f`
    Float(f32),
    /// `glUniform2f`
    Vec2([f32; 2]),
    /// `glUniform3f`
    Vec3([f32; 3]),
    /// `glUniform4f`
    Vec4([f32; 4]),
    /// `glUniform1i`
    SignedInt(i32),
    /// `glUniform2i`
    IntVec2([i32; 2]),
    /// `glUniform3i`
    IntVec3([i32; 3]),
    /// `glUniform4i`
    IntVec4([i32; 4]),
    /// `glUniform1ui`
    UnsignedInt(u32),
    /// `glUniform2ui`
    UnsignedIntVec2([u32; 2]),
    /// `glUniform3ui`
    UnsignedIntVec3([u32; 3]),
    /// `glUniform4ui`
    UnsignedIntVec4([u32; 4]),
    /// `glUniformMatrix3fv`, column-major.
    Mat3([[f32; 3]; 3]),
    /// `glUniformMatrix4fv`, column-major.
    Mat4([[f32; 4]; 4]),
}

impl UniformValue {
    /// Returns true for the values written with `glUniform*ui`, which need OpenGL 3 or
    /// OpenGL ES 3.
    #[inline]
    pub fn is_unsigned(&self) -> bool {
        matches!(*self, UniformValue::UnsignedInt(_) | UniformValue::UnsignedIntVec2(_) |
                        UniformValue::UnsignedIntVec3(_) | UniformValue::UnsignedIntVec4(_))
    }
}

/// An attribute or uniform reported by `glGetActiveAttrib` or `glGetActiveUniform`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveVariable {
    /// Name as reported by the driver. Arrays may be reported as `name[0]`.
    pub name: String,
    /// The `GL_FLOAT_VEC3`-like type enum.
    pub ty: GLenum,
    /// Number of array elements, 1 for non-arrays.
    pub size: GLint,
    /// Location, or -1 for built-ins.
    pub location: GLint,
}

/// Synchronous calls onto an OpenGL implementation.
///
/// None of these methods report errors directly. Errors are queued, like in OpenGL, and
/// retrieved with `get_error`.
pub trait Driver {
    /// `glGetString`
    fn get_string(&mut self, name: GLenum) -> Option<String>;
    /// `glGetIntegerv` for a single value.
    fn get_integer(&mut self, name: GLenum) -> GLint;
    /// `glGetError`
    fn get_error(&mut self) -> GLenum;
    /// The list of supported extensions.
    fn extensions(&mut self) -> Vec<String>;

    /// `glGenBuffers` for a single buffer.
    fn gen_buffer(&mut self) -> GLuint;
    /// `glDeleteBuffers` for a single buffer.
    fn delete_buffer(&mut self, id: GLuint);
    /// `glBindBuffer`
    fn bind_buffer(&mut self, target: GLenum, id: GLuint);
    /// `glBufferData`. Passing `None` allocates uninitialized storage.
    fn buffer_data(&mut self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum);
    /// `glBufferSubData`
    fn buffer_sub_data(&mut self, target: GLenum, offset: usize, data: &[u8]);
    /// Reads back part of the buffer bound to `target`.
    fn get_buffer_sub_data(&mut self, target: GLenum, offset: usize, out: &mut [u8]);

    /// `glEnableVertexAttribArray`
    fn enable_vertex_attrib_array(&mut self, index: GLuint);
    /// `glDisableVertexAttribArray`
    fn disable_vertex_attrib_array(&mut self, index: GLuint);
    /// `glVertexAttribPointer` with an offset into the bound array buffer.
    fn vertex_attrib_pointer(&mut self, index: GLuint, components: GLint, ty: GLenum,
                             normalized: bool, stride: GLsizei, offset: usize);

    /// `glGenVertexArrays` for a single vertex array object.
    fn gen_vertex_array(&mut self) -> GLuint;
    /// `glDeleteVertexArrays` for a single vertex array object.
    fn delete_vertex_array(&mut self, id: GLuint);
    /// `glBindVertexArray`
    fn bind_vertex_array(&mut self, id: GLuint);

    /// `glGenTextures` for a single texture.
    fn gen_texture(&mut self) -> GLuint;
    /// `glDeleteTextures` for a single texture.
    fn delete_texture(&mut self, id: GLuint);
    /// `glActiveTexture(GL_TEXTURE0 + unit)`
    fn active_texture(&mut self, unit: GLuint);
    /// `glBindTexture`
    fn bind_texture(&mut self, target: GLenum, id: GLuint);
    /// `glTexImage2D`
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(&mut self, target: GLenum, level: GLint, internal_format: GLint,
                    width: GLsizei, height: GLsizei, format: GLenum, ty: GLenum,
                    data: Option<&[u8]>);
    /// `glTexSubImage2D`
    #[allow(clippy::too_many_arguments)]
    fn tex_sub_image_2d(&mut self, target: GLenum, level: GLint, x: GLint, y: GLint,
                        width: GLsizei, height: GLsizei, format: GLenum, ty: GLenum,
                        data: &[u8]);
    /// `glGetTexImage`. `out` must be exactly the size of the image.
    fn get_tex_image(&mut self, target: GLenum, level: GLint, format: GLenum, ty: GLenum,
                     out: &mut [u8]);
    /// `glTexParameteri`
    fn tex_parameter(&mut self, target: GLenum, name: GLenum, value: GLint);
    /// `glGenerateMipmap`
    fn generate_mipmap(&mut self, target: GLenum);

    /// `glGenRenderbuffers` for a single renderbuffer.
    fn gen_renderbuffer(&mut self) -> GLuint;
    /// `glDeleteRenderbuffers` for a single renderbuffer.
    fn delete_renderbuffer(&mut self, id: GLuint);
    /// `glBindRenderbuffer(GL_RENDERBUFFER, id)`
    fn bind_renderbuffer(&mut self, id: GLuint);
    /// `glRenderbufferStorage(GL_RENDERBUFFER, ...)`
    fn renderbuffer_storage(&mut self, internal_format: GLenum, width: GLsizei, height: GLsizei);

    /// `glGenFramebuffers` for a single framebuffer.
    fn gen_framebuffer(&mut self) -> GLuint;
    /// `glDeleteFramebuffers` for a single framebuffer.
    fn delete_framebuffer(&mut self, id: GLuint);
    /// `glBindFramebuffer`
    fn bind_framebuffer(&mut self, target: GLenum, id: GLuint);
    /// `glFramebufferTexture2D` at level 0.
    fn framebuffer_texture_2d(&mut self, target: GLenum, attachment: GLenum,
                              tex_target: GLenum, texture: GLuint);
    /// `glFramebufferRenderbuffer`
    fn framebuffer_renderbuffer(&mut self, target: GLenum, attachment: GLenum,
                                renderbuffer: GLuint);
    /// `glDrawBuffers`
    fn draw_buffers(&mut self, buffers: &[GLenum]);
    /// `glCheckFramebufferStatus`
    fn check_framebuffer_status(&mut self, target: GLenum) -> GLenum;
    /// `glBlitFramebuffer`, the rectangles being `(x0, y0, x1, y1)`.
    fn blit_framebuffer(&mut self, source: [GLint; 4], target: [GLint; 4], mask: GLbitfield,
                        filter: GLenum);

    /// `glCreateShader`
    fn create_shader(&mut self, ty: GLenum) -> GLuint;
    /// `glShaderSource`
    fn shader_source(&mut self, shader: GLuint, lines: &[&str]);
    /// `glCompileShader`
    fn compile_shader(&mut self, shader: GLuint);
    /// `glGetShaderiv(GL_COMPILE_STATUS)`
    fn shader_compile_status(&mut self, shader: GLuint) -> bool;
    /// `glGetShaderInfoLog`
    fn shader_info_log(&mut self, shader: GLuint) -> String;
    /// `glDeleteShader`
    fn delete_shader(&mut self, shader: GLuint);
    /// `glCreateProgram`
    fn create_program(&mut self) -> GLuint;
    /// `glAttachShader`
    fn attach_shader(&mut self, program: GLuint, shader: GLuint);
    /// `glLinkProgram`
    fn link_program(&mut self, program: GLuint);
    /// `glGetProgramiv(GL_LINK_STATUS)`
    fn program_link_status(&mut self, program: GLuint) -> bool;
    /// `glGetProgramInfoLog`
    fn program_info_log(&mut self, program: GLuint) -> String;
    /// `glGetActiveAttrib` and `glGetAttribLocation` for every active attribute.
    fn active_attributes(&mut self, program: GLuint) -> Vec<ActiveVariable>;
    /// `glGetActiveUniform` and `glGetUniformLocation` for every active uniform.
    fn active_uniforms(&mut self, program: GLuint) -> Vec<ActiveVariable>;
    /// `glUseProgram`
    fn use_program(&mut self, program: GLuint);
    /// `glDeleteProgram`
    fn delete_program(&mut self, program: GLuint);
    /// `glUniform*` on the program in use.
    fn uniform(&mut self, location: GLint, value: UniformValue);

    /// `glEnable`
    fn enable(&mut self, cap: GLenum);
    /// `glDisable`
    fn disable(&mut self, cap: GLenum);
    /// `glBlendFuncSeparate`
    fn blend_func_separate(&mut self, src_rgb: GLenum, dst_rgb: GLenum, src_alpha: GLenum,
                           dst_alpha: GLenum);
    /// `glBlendEquationSeparate`
    fn blend_equation_separate(&mut self, rgb: GLenum, alpha: GLenum);
    /// `glBlendColor`
    fn blend_color(&mut self, color: [f32; 4]);
    /// `glDepthFunc`
    fn depth_func(&mut self, func: GLenum);
    /// `glDepthMask`
    fn depth_mask(&mut self, write: bool);
    /// `glClearDepth`
    fn clear_depth(&mut self, depth: f32);
    /// `glStencilFuncSeparate`
    fn stencil_func_separate(&mut self, face: GLenum, func: GLenum, reference: GLint, mask: GLuint);
    /// `glStencilOpSeparate`
    fn stencil_op_separate(&mut self, face: GLenum, sfail: GLenum, dpfail: GLenum, dppass: GLenum);
    /// `glStencilMaskSeparate`
    fn stencil_mask_separate(&mut self, face: GLenum, mask: GLuint);
    /// `glClearStencil`
    fn clear_stencil(&mut self, value: GLint);
    /// `glClearColor`
    fn clear_color(&mut self, color: [f32; 4]);
    /// `glClear`
    fn clear(&mut self, mask: GLbitfield);
    /// `glScissor`
    fn scissor(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    /// `glViewport`
    fn viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    /// `glPolygonMode(GL_FRONT_AND_BACK, mode)`
    fn polygon_mode(&mut self, mode: GLenum);
    /// `glLogicOp`
    fn logic_op(&mut self, op: GLenum);
    /// `glColorMask`
    fn color_mask(&mut self, mask: [bool; 4]);
    /// `glCullFace`
    fn cull_face(&mut self, face: GLenum);
    /// `glFrontFace`
    fn front_face(&mut self, mode: GLenum);

    /// `glDrawArrays`
    fn draw_arrays(&mut self, mode: GLenum, first: GLint, count: GLsizei);
    /// `glDrawElements` with an offset into the bound index buffer.
    fn draw_elements(&mut self, mode: GLenum, count: GLsizei, ty: GLenum, offset: usize);
}
