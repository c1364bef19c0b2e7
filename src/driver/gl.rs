use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::backend::Backend;
use crate::driver::{ActiveVariable, Driver, UniformValue};
use crate::gl;
use crate::gl::types::{GLbitfield, GLboolean, GLchar, GLenum, GLint, GLsizei, GLuint};
use crate::version::{self, Api, Version};

/// Driver that calls the real OpenGL functions.
///
/// The functions are loaded once, when the driver is created. The context must stay current
/// for as long as the driver is used; `ContextBuilder::build_with_backend` takes care of this
/// by making the backend current before each operation.
pub struct GlDriver {
    gl: gl::Gl,
    version: Version,
}

impl GlDriver {
    /// Loads the OpenGL functions of the backend's context.
    ///
    /// # Safety
    ///
    /// The backend must implement `get_proc_address` correctly.
    pub unsafe fn new<B: ?Sized + Backend>(backend: &B) -> GlDriver {
        backend.make_current();
        let gl = gl::Gl::load_with(|symbol| backend.get_proc_address(symbol) as *const _);

        let version = get_string(&gl, gl::VERSION)
            .and_then(|s| version::parse_version_string(&s))
            .unwrap_or(Version(Api::Gl, 1, 0));

        GlDriver { gl, version }
    }

    fn is_gles(&self) -> bool {
        self.version.0 == Api::GlEs
    }
}

unsafe fn get_string(gl: &gl::Gl, name: GLenum) -> Option<String> {
    let ptr = gl.GetString(name);
    if ptr.is_null() {
        return None;
    }

    Some(CStr::from_ptr(ptr as *const c_char).to_string_lossy().into_owned())
}

unsafe fn read_log(len: GLint, fetch: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> String {
    if len <= 0 {
        return String::new();
    }

    let mut buffer: Vec<u8> = vec![0; len as usize];
    let mut written = 0;
    fetch(len, &mut written as *mut GLsizei, buffer.as_mut_ptr() as *mut GLchar);
    buffer.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buffer).into_owned()
}

impl GlDriver {
    unsafe fn active_variables(&self, program: GLuint, count_name: GLenum, max_len_name: GLenum,
                               uniforms: bool) -> Vec<ActiveVariable>
    {
        let mut count = 0;
        self.gl.GetProgramiv(program, count_name, &mut count);
        let mut max_len = 0;
        self.gl.GetProgramiv(program, max_len_name, &mut max_len);

        let mut name_buffer: Vec<u8> = vec![0; max_len.max(1) as usize];
        let mut result = Vec::with_capacity(count.max(0) as usize);

        for index in 0 .. count.max(0) as GLuint {
            let mut name_len = 0;
            let mut size = 0;
            let mut ty = 0;

            if uniforms {
                self.gl.GetActiveUniform(program, index, name_buffer.len() as GLsizei,
                                         &mut name_len, &mut size, &mut ty,
                                         name_buffer.as_mut_ptr() as *mut GLchar);
            } else {
                self.gl.GetActiveAttrib(program, index, name_buffer.len() as GLsizei,
                                        &mut name_len, &mut size, &mut ty,
                                        name_buffer.as_mut_ptr() as *mut GLchar);
            }

            let name = String::from_utf8_lossy(&name_buffer[.. name_len.max(0) as usize])
                .into_owned();

            let location = match CString::new(name.clone()) {
                Ok(c_name) if uniforms => self.gl.GetUniformLocation(program, c_name.as_ptr()),
                Ok(c_name) => self.gl.GetAttribLocation(program, c_name.as_ptr()),
                Err(_) => -1,
            };

            result.push(ActiveVariable { name, ty, size, location });
        }

        result
    }
}

impl Driver for GlDriver {
    fn get_string(&mut self, name: GLenum) -> Option<String> {
        unsafe { get_string(&self.gl, name) }
    }

    fn get_integer(&mut self, name: GLenum) -> GLint {
        let mut value = 0;

        unsafe {
            // the default framebuffer's bits are attachment parameters in core contexts
            match name {
                gl::DEPTH_BITS | gl::STENCIL_BITS if self.version >= Version(Api::Gl, 3, 0) => {
                    let (attachment, pname) = if name == gl::DEPTH_BITS {
                        (gl::DEPTH, gl::FRAMEBUFFER_ATTACHMENT_DEPTH_SIZE)
                    } else {
                        (gl::STENCIL, gl::FRAMEBUFFER_ATTACHMENT_STENCIL_SIZE)
                    };
                    self.gl.BindFramebuffer(gl::FRAMEBUFFER, 0);
                    self.gl.GetFramebufferAttachmentParameteriv(gl::FRAMEBUFFER, attachment,
                                                                pname, &mut value);
                },
                _ => self.gl.GetIntegerv(name, &mut value),
            }
        }

        value
    }

    fn get_error(&mut self) -> GLenum {
        unsafe { self.gl.GetError() }
    }

    fn extensions(&mut self) -> Vec<String> {
        unsafe {
            if self.version >= Version(Api::Gl, 3, 0) || self.version >= Version(Api::GlEs, 3, 0) {
                let mut num_extensions = 0;
                self.gl.GetIntegerv(gl::NUM_EXTENSIONS, &mut num_extensions);

                (0 .. num_extensions.max(0)).filter_map(|num| {
                    let ext = self.gl.GetStringi(gl::EXTENSIONS, num as GLuint);
                    if ext.is_null() {
                        None
                    } else {
                        Some(CStr::from_ptr(ext as *const c_char).to_string_lossy().into_owned())
                    }
                }).collect()

            } else {
                get_string(&self.gl, gl::EXTENSIONS)
                    .map(|list| list.split_whitespace().map(|e| e.to_owned()).collect())
                    .unwrap_or_default()
            }
        }
    }

    fn gen_buffer(&mut self) -> GLuint {
        let mut id = 0;
        unsafe { self.gl.GenBuffers(1, &mut id) };
        id
    }

    fn delete_buffer(&mut self, id: GLuint) {
        unsafe { self.gl.DeleteBuffers(1, &id) }
    }

    fn bind_buffer(&mut self, target: GLenum, id: GLuint) {
        unsafe { self.gl.BindBuffer(target, id) }
    }

    fn buffer_data(&mut self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum) {
        let ptr = data.map(|d| d.as_ptr() as *const _).unwrap_or(ptr::null());
        unsafe { self.gl.BufferData(target, size as isize, ptr, usage) }
    }

    fn buffer_sub_data(&mut self, target: GLenum, offset: usize, data: &[u8]) {
        unsafe {
            self.gl.BufferSubData(target, offset as isize, data.len() as isize,
                                  data.as_ptr() as *const _)
        }
    }

    fn get_buffer_sub_data(&mut self, target: GLenum, offset: usize, out: &mut [u8]) {
        unsafe {
            if self.is_gles() {
                let ptr = self.gl.MapBufferRange(target, offset as isize, out.len() as isize,
                                                 gl::MAP_READ_BIT);
                if !ptr.is_null() {
                    ptr::copy_nonoverlapping(ptr as *const u8, out.as_mut_ptr(), out.len());
                    self.gl.UnmapBuffer(target);
                }
            } else {
                self.gl.GetBufferSubData(target, offset as isize, out.len() as isize,
                                         out.as_mut_ptr() as *mut _);
            }
        }
    }

    fn enable_vertex_attrib_array(&mut self, index: GLuint) {
        unsafe { self.gl.EnableVertexAttribArray(index) }
    }

    fn disable_vertex_attrib_array(&mut self, index: GLuint) {
        unsafe { self.gl.DisableVertexAttribArray(index) }
    }

    fn vertex_attrib_pointer(&mut self, index: GLuint, components: GLint, ty: GLenum,
                             normalized: bool, stride: GLsizei, offset: usize)
    {
        unsafe {
            self.gl.VertexAttribPointer(index, components, ty, normalized as GLboolean, stride,
                                        offset as *const _)
        }
    }

    fn gen_vertex_array(&mut self) -> GLuint {
        let mut id = 0;
        unsafe { self.gl.GenVertexArrays(1, &mut id) };
        id
    }

    fn delete_vertex_array(&mut self, id: GLuint) {
        unsafe { self.gl.DeleteVertexArrays(1, &id) }
    }

    fn bind_vertex_array(&mut self, id: GLuint) {
        unsafe { self.gl.BindVertexArray(id) }
    }

    fn gen_texture(&mut self) -> GLuint {
        let mut id = 0;
        unsafe { self.gl.GenTextures(1, &mut id) };
        id
    }

    fn delete_texture(&mut self, id: GLuint) {
        unsafe { self.gl.DeleteTextures(1, &id) }
    }

    fn active_texture(&mut self, unit: GLuint) {
        unsafe { self.gl.ActiveTexture(gl::TEXTURE0 + unit) }
    }

    fn bind_texture(&mut self, target: GLenum, id: GLuint) {
        unsafe { self.gl.BindTexture(target, id) }
    }

    fn tex_image_2d(&mut self, target: GLenum, level: GLint, internal_format: GLint,
                    width: GLsizei, height: GLsizei, format: GLenum, ty: GLenum,
                    data: Option<&[u8]>)
    {
        let ptr = data.map(|d| d.as_ptr() as *const _).unwrap_or(ptr::null());
        unsafe {
            self.gl.PixelStorei(gl::UNPACK_ALIGNMENT, 1);
            self.gl.TexImage2D(target, level, internal_format, width, height, 0, format, ty, ptr)
        }
    }

    fn tex_sub_image_2d(&mut self, target: GLenum, level: GLint, x: GLint, y: GLint,
                        width: GLsizei, height: GLsizei, format: GLenum, ty: GLenum,
                        data: &[u8])
    {
        unsafe {
            self.gl.PixelStorei(gl::UNPACK_ALIGNMENT, 1);
            self.gl.TexSubImage2D(target, level, x, y, width, height, format, ty,
                                  data.as_ptr() as *const _)
        }
    }

    fn get_tex_image(&mut self, target: GLenum, level: GLint, format: GLenum, ty: GLenum,
                     out: &mut [u8])
    {
        unsafe {
            self.gl.PixelStorei(gl::PACK_ALIGNMENT, 1);
            self.gl.GetTexImage(target, level, format, ty, out.as_mut_ptr() as *mut _)
        }
    }

    fn tex_parameter(&mut self, target: GLenum, name: GLenum, value: GLint) {
        unsafe { self.gl.TexParameteri(target, name, value) }
    }

    fn generate_mipmap(&mut self, target: GLenum) {
        unsafe { self.gl.GenerateMipmap(target) }
    }

    fn gen_renderbuffer(&mut self) -> GLuint {
        let mut id = 0;
        unsafe { self.gl.GenRenderbuffers(1, &mut id) };
        id
    }

    fn delete_renderbuffer(&mut self, id: GLuint) {
        unsafe { self.gl.DeleteRenderbuffers(1, &id) }
    }

    fn bind_renderbuffer(&mut self, id: GLuint) {
        unsafe { self.gl.BindRenderbuffer(gl::RENDERBUFFER, id) }
    }

    fn renderbuffer_storage(&mut self, internal_format: GLenum, width: GLsizei, height: GLsizei) {
        unsafe { self.gl.RenderbufferStorage(gl::RENDERBUFFER, internal_format, width, height) }
    }

    fn gen_framebuffer(&mut self) -> GLuint {
        let mut id = 0;
        unsafe { self.gl.GenFramebuffers(1, &mut id) };
        id
    }

    fn delete_framebuffer(&mut self, id: GLuint) {
        unsafe { self.gl.DeleteFramebuffers(1, &id) }
    }

    fn bind_framebuffer(&mut self, target: GLenum, id: GLuint) {
        unsafe { self.gl.BindFramebuffer(target, id) }
    }

    fn framebuffer_texture_2d(&mut self, target: GLenum, attachment: GLenum,
                              tex_target: GLenum, texture: GLuint)
    {
        unsafe { self.gl.FramebufferTexture2D(target, attachment, tex_target, texture, 0) }
    }

    fn framebuffer_renderbuffer(&mut self, target: GLenum, attachment: GLenum,
                                renderbuffer: GLuint)
    {
        unsafe {
            self.gl.FramebufferRenderbuffer(target, attachment, gl::RENDERBUFFER, renderbuffer)
        }
    }

    fn draw_buffers(&mut self, buffers: &[GLenum]) {
        unsafe { self.gl.DrawBuffers(buffers.len() as GLsizei, buffers.as_ptr()) }
    }

    fn check_framebuffer_status(&mut self, target: GLenum) -> GLenum {
        unsafe { self.gl.CheckFramebufferStatus(target) }
    }

    fn blit_framebuffer(&mut self, source: [GLint; 4], target: [GLint; 4], mask: GLbitfield,
                        filter: GLenum)
    {
        unsafe {
            self.gl.BlitFramebuffer(source[0], source[1], source[2], source[3],
                                    target[0], target[1], target[2], target[3], mask, filter)
        }
    }

    fn create_shader(&mut self, ty: GLenum) -> GLuint {
        unsafe { self.gl.CreateShader(ty) }
    }

    fn shader_source(&mut self, shader: GLuint, lines: &[&str]) {
        let pointers: Vec<*const GLchar> = lines.iter().map(|l| l.as_ptr() as *const GLchar)
                                                .collect();
        let lengths: Vec<GLint> = lines.iter().map(|l| l.len() as GLint).collect();

        unsafe {
            self.gl.ShaderSource(shader, lines.len() as GLsizei, pointers.as_ptr(),
                                 lengths.as_ptr())
        }
    }

    fn compile_shader(&mut self, shader: GLuint) {
        unsafe { self.gl.CompileShader(shader) }
    }

    fn shader_compile_status(&mut self, shader: GLuint) -> bool {
        let mut status = 0;
        unsafe { self.gl.GetShaderiv(shader, gl::COMPILE_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn shader_info_log(&mut self, shader: GLuint) -> String {
        unsafe {
            let mut len = 0;
            self.gl.GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
            let gl = &self.gl;
            read_log(len, |max, written, buffer| gl.GetShaderInfoLog(shader, max, written, buffer))
        }
    }

    fn delete_shader(&mut self, shader: GLuint) {
        unsafe { self.gl.DeleteShader(shader) }
    }

    fn create_program(&mut self) -> GLuint {
        unsafe { self.gl.CreateProgram() }
    }

    fn attach_shader(&mut self, program: GLuint, shader: GLuint) {
        unsafe { self.gl.AttachShader(program, shader) }
    }

    fn link_program(&mut self, program: GLuint) {
        unsafe { self.gl.LinkProgram(program) }
    }

    fn program_link_status(&mut self, program: GLuint) -> bool {
        let mut status = 0;
        unsafe { self.gl.GetProgramiv(program, gl::LINK_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn program_info_log(&mut self, program: GLuint) -> String {
        unsafe {
            let mut len = 0;
            self.gl.GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
            let gl = &self.gl;
            read_log(len, |max, written, buffer| {
                gl.GetProgramInfoLog(program, max, written, buffer)
            })
        }
    }

    fn active_attributes(&mut self, program: GLuint) -> Vec<ActiveVariable> {
        unsafe {
            self.active_variables(program, gl::ACTIVE_ATTRIBUTES,
                                  gl::ACTIVE_ATTRIBUTE_MAX_LENGTH, false)
        }
    }

    fn active_uniforms(&mut self, program: GLuint) -> Vec<ActiveVariable> {
        unsafe {
            self.active_variables(program, gl::ACTIVE_UNIFORMS, gl::ACTIVE_UNIFORM_MAX_LENGTH,
                                  true)
        }
    }

    fn use_program(&mut self, program: GLuint) {
        unsafe { self.gl.UseProgram(program) }
    }

    fn delete_program(&mut self, program: GLuint) {
        unsafe { self.gl.DeleteProgram(program) }
    }

    fn uniform(&mut self, location: GLint, value: UniformValue) {
        unsafe {
            match value {
                UniformValue::Float(v) => self.gl.Uniform1f(location, v),
                UniformValue::Vec2(v) => self.gl.Uniform2fv(location, 1, v.as_ptr()),
                UniformValue::Vec3(v) => self.gl.Uniform3fv(location, 1, v.as_ptr()),
                UniformValue::Vec4(v) => self.gl.Uniform4fv(location, 1, v.as_ptr()),
                UniformValue::SignedInt(v) => self.gl.Uniform1i(location, v),
                UniformValue::IntVec2(v) => self.gl.Uniform2iv(location, 1, v.as_ptr()),
                UniformValue::IntVec3(v) => self.gl.Uniform3iv(location, 1, v.as_ptr()),
                UniformValue::IntVec4(v) => self.gl.Uniform4iv(location, 1, v.as_ptr()),
                UniformValue::UnsignedInt(v) => self.gl.Uniform1ui(location, v),
                UniformValue::UnsignedIntVec2(v) => self.gl.Uniform2uiv(location, 1, v.as_ptr()),
                UniformValue::UnsignedIntVec3(v) => self.gl.Uniform3uiv(location, 1, v.as_ptr()),
                UniformValue::UnsignedIntVec4(v) => self.gl.Uniform4uiv(location, 1, v.as_ptr()),
                UniformValue::Mat3(v) => {
                    self.gl.UniformMatrix3fv(location, 1, gl::FALSE, v.as_ptr() as *const f32)
                },
                UniformValue::Mat4(v) => {
                    self.gl.UniformMatrix4fv(location, 1, gl::FALSE, v.as_ptr() as *const f32)
                },
            }
        }
    }

    fn enable(&mut self, cap: GLenum) {
        unsafe { self.gl.Enable(cap) }
    }

    fn disable(&mut self, cap: GLenum) {
        unsafe { self.gl.Disable(cap) }
    }

    fn blend_func_separate(&mut self, src_rgb: GLenum, dst_rgb: GLenum, src_alpha: GLenum,
                           dst_alpha: GLenum)
    {
        unsafe { self.gl.BlendFuncSeparate(src_rgb, dst_rgb, src_alpha, dst_alpha) }
    }

    fn blend_equation_separate(&mut self, rgb: GLenum, alpha: GLenum) {
        unsafe { self.gl.BlendEquationSeparate(rgb, alpha) }
    }

    fn blend_color(&mut self, color: [f32; 4]) {
        unsafe { self.gl.BlendColor(color[0], color[1], color[2], color[3]) }
    }

    fn depth_func(&mut self, func: GLenum) {
        unsafe { self.gl.DepthFunc(func) }
    }

    fn depth_mask(&mut self, write: bool) {
        unsafe { self.gl.DepthMask(if write { gl::TRUE } else { gl::FALSE }) }
    }

    fn clear_depth(&mut self, depth: f32) {
        unsafe {
            if self.is_gles() || self.version >= Version(Api::Gl, 4, 1) {
                self.gl.ClearDepthf(depth)
            } else {
                self.gl.ClearDepth(depth as f64)
            }
        }
    }

    fn stencil_func_separate(&mut self, face: GLenum, func: GLenum, reference: GLint, mask: GLuint) {
        unsafe { self.gl.StencilFuncSeparate(face, func, reference, mask) }
    }

    fn stencil_op_separate(&mut self, face: GLenum, sfail: GLenum, dpfail: GLenum, dppass: GLenum) {
        unsafe { self.gl.StencilOpSeparate(face, sfail, dpfail, dppass) }
    }

    fn stencil_mask_separate(&mut self, face: GLenum, mask: GLuint) {
        unsafe { self.gl.StencilMaskSeparate(face, mask) }
    }

    fn clear_stencil(&mut self, value: GLint) {
        unsafe { self.gl.ClearStencil(value) }
    }

    fn clear_color(&mut self, color: [f32; 4]) {
        unsafe { self.gl.ClearColor(color[0], color[1], color[2], color[3]) }
    }

    fn clear(&mut self, mask: GLbitfield) {
        unsafe { self.gl.Clear(mask) }
    }

    fn scissor(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { self.gl.Scissor(x, y, width, height) }
    }

    fn viewport(&mut self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { self.gl.Viewport(x, y, width, height) }
    }

    fn polygon_mode(&mut self, mode: GLenum) {
        unsafe { self.gl.PolygonMode(gl::FRONT_AND_BACK, mode) }
    }

    fn logic_op(&mut self, op: GLenum) {
        unsafe { self.gl.LogicOp(op) }
    }

    fn color_mask(&mut self, mask: [bool; 4]) {
        let b = |v: bool| if v { gl::TRUE } else { gl::FALSE };
        unsafe { self.gl.ColorMask(b(mask[0]), b(mask[1]), b(mask[2]), b(mask[3])) }
    }

    fn cull_face(&mut self, face: GLenum) {
        unsafe { self.gl.CullFace(face) }
    }

    fn front_face(&mut self, mode: GLenum) {
        unsafe { self.gl.FrontFace(mode) }
    }

    fn draw_arrays(&mut self, mode: GLenum, first: GLint, count: GLsizei) {
        unsafe { self.gl.DrawArrays(mode, first, count) }
    }

    fn draw_elements(&mut self, mode: GLenum, count: GLsizei, ty: GLenum, offset: usize) {
        unsafe { self.gl.DrawElements(mode, count, ty, offset as *const _) }
    }
}
