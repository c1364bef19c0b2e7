/*!
An OpenGL implementation that doesn't need a GPU.

The fake driver keeps its objects in memory and checks the usual OpenGL error conditions
(binding a name that doesn't exist, uploading to a target without a buffer, setting a uniform
without a program, ...) by queueing errors, just like a real driver. Nothing is ever rendered.

`FakeDriver` is cheap to clone, and all the clones share the same state. Keep a clone around
after handing the driver to a context to inspect what the context did:

```
use glguard::{ContextBuilder, FakeConfig, FakeDriver};

let driver = FakeDriver::new(FakeConfig::gl33());
let interface = ContextBuilder::new().build(driver.clone()).unwrap();

interface.scissor().scissor_disable().unwrap();
assert_eq!(driver.statistics().calls("glDisable"), 1);
```

*/
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use fnv::{FnvHashMap, FnvHashSet};
use log::{debug, trace};

use crate::driver::glsl;
use crate::driver::{ActiveVariable, Driver, UniformValue};
use crate::gl;
use crate::gl::types::{GLbitfield, GLenum, GLint, GLsizei, GLuint};
use crate::version::{self, Api, Version};

/// What the fake driver pretends to be.
#[derive(Debug, Clone)]
pub struct FakeConfig {
    /// Returned by `glGetString(GL_VERSION)`.
    pub version: String,
    /// Returned by `glGetString(GL_SHADING_LANGUAGE_VERSION)`.
    pub shading_language_version: String,
    /// The list of supported extensions.
    pub extensions: Vec<String>,
    /// `GL_MAX_TEXTURE_SIZE`
    pub max_texture_size: GLint,
    /// `GL_MAX_CUBE_MAP_TEXTURE_SIZE`
    pub max_cube_map_texture_size: GLint,
    /// `GL_MAX_COMBINED_TEXTURE_IMAGE_UNITS`
    pub max_combined_texture_image_units: GLint,
    /// `GL_MAX_VERTEX_ATTRIBS`
    pub max_vertex_attribs: GLint,
    /// `GL_MAX_COLOR_ATTACHMENTS`
    pub max_color_attachments: GLint,
    /// `GL_MAX_DRAW_BUFFERS`
    pub max_draw_buffers: GLint,
    /// Depth bits of the default framebuffer.
    pub depth_bits: GLint,
    /// Stencil bits of the default framebuffer.
    pub stencil_bits: GLint,
}

impl FakeConfig {
    /// A desktop OpenGL 2.1 context with the framebuffer object extension.
    pub fn gl21() -> FakeConfig {
        FakeConfig {
            version: "2.1 glguard fake".to_owned(),
            shading_language_version: "1.20".to_owned(),
            extensions: vec!["GL_EXT_framebuffer_object".to_owned(),
                             "GL_EXT_framebuffer_blit".to_owned(),
                             "GL_EXT_packed_depth_stencil".to_owned()],
            max_texture_size: 4096,
            max_cube_map_texture_size: 4096,
            max_combined_texture_image_units: 16,
            max_vertex_attribs: 16,
            max_color_attachments: 4,
            max_draw_buffers: 4,
            depth_bits: 24,
            stencil_bits: 8,
        }
    }

    /// A desktop OpenGL 3.3 core context.
    pub fn gl33() -> FakeConfig {
        FakeConfig {
            version: "3.3.0 glguard fake".to_owned(),
            shading_language_version: "3.30".to_owned(),
            extensions: vec!["GL_ARB_framebuffer_object".to_owned()],
            max_texture_size: 16384,
            max_cube_map_texture_size: 16384,
            max_combined_texture_image_units: 32,
            max_vertex_attribs: 16,
            max_color_attachments: 8,
            max_draw_buffers: 8,
            depth_bits: 24,
            stencil_bits: 8,
        }
    }

    /// An OpenGL ES 2.0 context.
    pub fn gles2() -> FakeConfig {
        FakeConfig {
            version: "OpenGL ES 2.0 glguard fake".to_owned(),
            shading_language_version: "OpenGL ES GLSL ES 1.00".to_owned(),
            extensions: vec!["GL_OES_depth24".to_owned(),
                             "GL_OES_packed_depth_stencil".to_owned(),
                             "GL_OES_rgb8_rgba8".to_owned(),
                             "GL_OES_depth_texture".to_owned()],
            max_texture_size: 2048,
            max_cube_map_texture_size: 1024,
            max_combined_texture_image_units: 8,
            max_vertex_attribs: 8,
            max_color_attachments: 1,
            max_draw_buffers: 1,
            depth_bits: 16,
            stencil_bits: 0,
        }
    }

    /// An OpenGL ES 3.0 context.
    pub fn gles3() -> FakeConfig {
        FakeConfig {
            version: "OpenGL ES 3.0 glguard fake".to_owned(),
            shading_language_version: "OpenGL ES GLSL ES 3.00".to_owned(),
            extensions: vec![],
            max_texture_size: 4096,
            max_cube_map_texture_size: 2048,
            max_combined_texture_image_units: 32,
            max_vertex_attribs: 16,
            max_color_attachments: 4,
            max_draw_buffers: 4,
            depth_bits: 24,
            stencil_bits: 8,
        }
    }
}

impl Default for FakeConfig {
    fn default() -> FakeConfig {
        FakeConfig::gl33()
    }
}

/// Number of times each driver function has been called.
#[derive(Debug, Clone, Default)]
pub struct FakeStatistics {
    calls: FnvHashMap<&'static str, u64>,
}

impl FakeStatistics {
    /// Number of calls to the function with this name, for example `"glBindBuffer"`.
    pub fn calls(&self, function: &str) -> u64 {
        self.calls.get(function).cloned().unwrap_or(0)
    }

    /// Total number of calls, `glGetError` included.
    pub fn total(&self) -> u64 {
        self.calls.values().sum()
    }
}

struct FakeTexture {
    target: Option<GLenum>,
    width: GLsizei,
    height: GLsizei,
    /// Level 0 of each image target, with its size and bytes per pixel.
    images: FnvHashMap<GLenum, FakeImage>,
}

struct FakeImage {
    width: usize,
    pixel_size: usize,
    texels: Vec<u8>,
}

/// What a vertex array object holds. The name 0 is the default one.
#[derive(Default)]
struct FakeVertexArray {
    element_array_buffer: GLuint,
    attrib_arrays: FnvHashSet<GLuint>,
    attrib_buffers: FnvHashMap<GLuint, GLuint>,
}

struct FakeFramebuffer {
    attachments: FnvHashMap<GLenum, GLuint>,
    draw_buffers: Vec<GLenum>,
}

struct FakeShader {
    ty: GLenum,
    source: String,
    compiled: bool,
    log: String,
}

struct FakeProgram {
    attached: Vec<GLuint>,
    linked: bool,
    log: String,
    attributes: Vec<ActiveVariable>,
    uniforms: Vec<ActiveVariable>,
    values: FnvHashMap<GLint, UniformValue>,
}

struct FakeState {
    config: FakeConfig,
    next_name: GLuint,
    errors: VecDeque<GLenum>,
    failures: Vec<(String, GLenum)>,
    statistics: FakeStatistics,

    buffers: FnvHashMap<GLuint, Vec<u8>>,
    buffer_bindings: FnvHashMap<GLenum, GLuint>,
    vertex_arrays: FnvHashMap<GLuint, FakeVertexArray>,
    vertex_array: GLuint,

    textures: FnvHashMap<GLuint, FakeTexture>,
    active_texture: GLuint,
    texture_bindings: FnvHashMap<(GLuint, GLenum), GLuint>,

    renderbuffers: FnvHashMap<GLuint, Option<GLenum>>,
    renderbuffer_binding: GLuint,

    framebuffers: FnvHashMap<GLuint, FakeFramebuffer>,
    draw_framebuffer: GLuint,
    read_framebuffer: GLuint,

    shaders: FnvHashMap<GLuint, FakeShader>,
    programs: FnvHashMap<GLuint, FakeProgram>,
    current_program: GLuint,

    enabled: FnvHashSet<GLenum>,
    draws: u64,
}

impl FakeState {
    /// Counts a call. Returns false if the call must fail, in which case its error is raised.
    fn record(&mut self, function: &'static str) -> bool {
        trace!("{}", function);
        *self.statistics.calls.entry(function).or_insert(0) += 1;

        match self.failures.iter().position(|(f, _)| f == function) {
            Some(i) => {
                let (_, code) = self.failures.remove(i);
                self.raise(code);
                false
            },
            None => true,
        }
    }

    fn raise(&mut self, code: GLenum) {
        debug!("Raising 0x{:x}", code);
        self.errors.push_back(code);
    }

    fn version(&self) -> Option<Version> {
        version::parse_version_string(&self.config.version)
    }

    /// `glUniform*ui` only exists since OpenGL 3.0 and OpenGL ES 3.0.
    fn has_unsigned_uniforms(&self) -> bool {
        match self.version() {
            Some(v @ Version(Api::Gl, ..)) => v >= Version(Api::Gl, 3, 0),
            Some(v @ Version(Api::GlEs, ..)) => v >= Version(Api::GlEs, 3, 0),
            None => false,
        }
    }

    /// Vertex array objects only exist since OpenGL 3.0 and OpenGL ES 3.0.
    fn has_vertex_arrays(&self) -> bool {
        self.has_unsigned_uniforms()
    }

    /// `glGetTexImage` doesn't exist in OpenGL ES.
    fn has_tex_image_readback(&self) -> bool {
        matches!(self.version(), Some(Version(Api::Gl, ..)))
    }

    fn current_vertex_array(&mut self) -> &mut FakeVertexArray {
        let current = self.vertex_array;
        self.vertex_arrays.entry(current).or_default()
    }

    /// The element array binding belongs to the bound vertex array object.
    fn buffer_binding(&self, target: GLenum) -> GLuint {
        if target == gl::ELEMENT_ARRAY_BUFFER {
            self.vertex_arrays.get(&self.vertex_array).map(|v| v.element_array_buffer)
                              .unwrap_or(0)
        } else {
            self.buffer_bindings.get(&target).cloned().unwrap_or(0)
        }
    }

    fn new_name(&mut self) -> GLuint {
        let name = self.next_name;
        self.next_name += 1;
        name
    }

    fn bound_buffer(&mut self, target: GLenum) -> Option<GLuint> {
        match self.buffer_binding(target) {
            0 => {
                self.raise(gl::INVALID_OPERATION);
                None
            },
            id => Some(id),
        }
    }

    fn texture_binding_target(target: GLenum) -> GLenum {
        match target {
            gl::TEXTURE_CUBE_MAP_POSITIVE_X | gl::TEXTURE_CUBE_MAP_NEGATIVE_X |
            gl::TEXTURE_CUBE_MAP_POSITIVE_Y | gl::TEXTURE_CUBE_MAP_NEGATIVE_Y |
            gl::TEXTURE_CUBE_MAP_POSITIVE_Z | gl::TEXTURE_CUBE_MAP_NEGATIVE_Z => gl::TEXTURE_CUBE_MAP,
            other => other,
        }
    }

    fn bound_texture(&mut self, target: GLenum) -> Option<GLuint> {
        let key = (self.active_texture, FakeState::texture_binding_target(target));
        match self.texture_bindings.get(&key).cloned() {
            Some(id) if id != 0 => Some(id),
            _ => {
                self.raise(gl::INVALID_OPERATION);
                None
            },
        }
    }

    fn framebuffer_for(&mut self, target: GLenum) -> Option<GLuint> {
        let id = match target {
            gl::READ_FRAMEBUFFER => self.read_framebuffer,
            gl::DRAW_FRAMEBUFFER | gl::FRAMEBUFFER => self.draw_framebuffer,
            _ => {
                self.raise(gl::INVALID_ENUM);
                return None;
            },
        };

        if id == 0 {
            self.raise(gl::INVALID_OPERATION);
            return None;
        }

        Some(id)
    }

    fn current_program(&mut self) -> Option<&mut FakeProgram> {
        if self.current_program == 0 {
            self.raise(gl::INVALID_OPERATION);
            return None;
        }

        let current = self.current_program;
        self.programs.get_mut(&current)
    }

    fn link(&mut self, program: GLuint) {
        let attached = match self.programs.get(&program) {
            Some(p) => p.attached.clone(),
            None => {
                self.raise(gl::INVALID_VALUE);
                return;
            },
        };

        let mut log = String::new();
        let mut stages = Vec::new();
        for shader in &attached {
            if let Some(s) = self.shaders.get(shader) {
                if !s.compiled {
                    log.push_str("error: attached shader is not compiled\n");
                }
                stages.push((s.ty, s.source.clone()));
            }
        }

        for (ty, name) in [(gl::VERTEX_SHADER, "vertex"), (gl::FRAGMENT_SHADER, "fragment")] {
            if !stages.iter().any(|&(t, _)| t == ty) {
                log.push_str(&format!("error: no {} shader attached\n", name));
            }
        }

        let mut attributes = Vec::new();
        let mut uniforms: Vec<ActiveVariable> = Vec::new();
        let mut next_uniform_location = 0;

        for (ty, source) in &stages {
            let declarations = glsl::scan(source, *ty == gl::VERTEX_SHADER);

            for input in declarations.inputs {
                let location = attributes.len() as GLint;
                attributes.push(ActiveVariable {
                    name: input.name, ty: input.ty, size: input.size, location,
                });
            }

            for uniform in declarations.uniforms {
                let name = if uniform.size > 1 {
                    format!("{}[0]", uniform.name)
                } else {
                    uniform.name
                };

                match uniforms.iter().find(|u| u.name == name).map(|u| u.ty) {
                    Some(existing) if existing != uniform.ty => {
                        log.push_str(&format!("error: uniform `{}` declared with conflicting \
                                               types\n", name));
                    },
                    Some(_) => (),
                    None => {
                        uniforms.push(ActiveVariable {
                            name, ty: uniform.ty, size: uniform.size,
                            location: next_uniform_location,
                        });
                        next_uniform_location += uniform.size;
                    },
                }
            }
        }

        if let Some(p) = self.programs.get_mut(&program) {
            p.linked = log.is_empty();
            p.log = log;
            p.values.clear();
            if p.linked {
                p.attributes = attributes;
                p.uniforms = uniforms;
            } else {
                p.attributes.clear();
                p.uniforms.clear();
            }
        }
    }
}

/// A driver that keeps everything in memory. See the module documentation.
#[derive(Clone)]
pub struct FakeDriver {
    state: Rc<RefCell<FakeState>>,
}

impl FakeDriver {
    /// Builds a fake driver.
    pub fn new(config: FakeConfig) -> FakeDriver {
        FakeDriver {
            state: Rc::new(RefCell::new(FakeState {
                config,
                next_name: 1,
                errors: VecDeque::new(),
                failures: Vec::new(),
                statistics: FakeStatistics::default(),
                buffers: FnvHashMap::default(),
                buffer_bindings: FnvHashMap::default(),
                vertex_arrays: Some((0, FakeVertexArray::default())).into_iter().collect(),
                vertex_array: 0,
                textures: FnvHashMap::default(),
                active_texture: 0,
                texture_bindings: FnvHashMap::default(),
                renderbuffers: FnvHashMap::default(),
                renderbuffer_binding: 0,
                framebuffers: FnvHashMap::default(),
                draw_framebuffer: 0,
                read_framebuffer: 0,
                shaders: FnvHashMap::default(),
                programs: FnvHashMap::default(),
                current_program: 0,
                enabled: FnvHashSet::default(),
                draws: 0,
            })),
        }
    }

    /// Returns a copy of the call counters.
    pub fn statistics(&self) -> FakeStatistics {
        self.state.borrow().statistics.clone()
    }

    /// Resets the call counters to zero.
    pub fn reset_statistics(&self) {
        self.state.borrow_mut().statistics = FakeStatistics::default();
    }

    /// Queues an error, as if the next call had failed.
    pub fn push_error(&self, code: GLenum) {
        self.state.borrow_mut().raise(code);
    }

    /// Makes the next call to `function`, for example `"glBufferData"`, raise `code` instead
    /// of doing anything.
    pub fn fail_next(&self, function: &str, code: GLenum) {
        self.state.borrow_mut().failures.push((function.to_owned(), code));
    }

    /// Returns true if the capability has been enabled with `glEnable`.
    pub fn is_enabled(&self, cap: GLenum) -> bool {
        self.state.borrow().enabled.contains(&cap)
    }

    /// Returns the contents of a buffer.
    pub fn buffer_contents(&self, id: GLuint) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&id).cloned()
    }

    /// Returns the buffer bound to a target. `GL_ELEMENT_ARRAY_BUFFER` is read from the bound
    /// vertex array object.
    pub fn buffer_binding(&self, target: GLenum) -> GLuint {
        self.state.borrow().buffer_binding(target)
    }

    /// Returns the vertex array object that is bound, 0 for the default one.
    pub fn vertex_array_binding(&self) -> GLuint {
        self.state.borrow().vertex_array
    }

    /// Returns the buffer that feeds a vertex attribute of the bound vertex array object.
    pub fn attrib_array_buffer(&self, index: GLuint) -> GLuint {
        let state = self.state.borrow();
        state.vertex_arrays.get(&state.vertex_array)
             .and_then(|v| v.attrib_buffers.get(&index).cloned())
             .unwrap_or(0)
    }

    /// Returns the texture bound to a target of a texture unit.
    pub fn texture_binding(&self, unit: GLuint, target: GLenum) -> GLuint {
        self.state.borrow().texture_bindings.get(&(unit, target)).cloned().unwrap_or(0)
    }

    /// Returns the framebuffer bound for drawing.
    pub fn draw_framebuffer_binding(&self) -> GLuint {
        self.state.borrow().draw_framebuffer
    }

    /// Returns the program in use.
    pub fn current_program(&self) -> GLuint {
        self.state.borrow().current_program
    }

    /// Returns the last value written to a uniform of a program.
    pub fn uniform_value(&self, program: GLuint, location: GLint) -> Option<UniformValue> {
        self.state.borrow().programs.get(&program).and_then(|p| p.values.get(&location).cloned())
    }

    /// Returns true if the vertex attribute array is enabled in the bound vertex array object.
    pub fn is_attrib_array_enabled(&self, index: GLuint) -> bool {
        let state = self.state.borrow();
        state.vertex_arrays.get(&state.vertex_array)
             .map(|v| v.attrib_arrays.contains(&index))
             .unwrap_or(false)
    }

    /// Number of successful draw calls.
    pub fn draw_count(&self) -> u64 {
        self.state.borrow().draws
    }

    /// Number of live OpenGL objects of every kind.
    pub fn live_objects(&self) -> usize {
        let state = self.state.borrow();
        state.buffers.len() + state.textures.len() + state.renderbuffers.len() +
            state.framebuffers.len() + state.shaders.len() + state.programs.len() +
            state.vertex_arrays.len() - 1
    }
}

impl Driver for FakeDriver {
    fn get_string(&mut self, name: GLenum) -> Option<String> {
        let mut state = self.state.borrow_mut();
        state.record("glGetString");
        match name {
            gl::VERSION => Some(state.config.version.clone()),
            gl::SHADING_LANGUAGE_VERSION => Some(state.config.shading_language_version.clone()),
            gl::VENDOR => Some("glguard".to_owned()),
            gl::RENDERER => Some("fake".to_owned()),
            gl::EXTENSIONS => Some(state.config.extensions.join(" ")),
            _ => {
                state.raise(gl::INVALID_ENUM);
                None
            },
        }
    }

    fn get_integer(&mut self, name: GLenum) -> GLint {
        let mut state = self.state.borrow_mut();
        state.record("glGetIntegerv");
        match name {
            gl::MAX_TEXTURE_SIZE => state.config.max_texture_size,
            gl::MAX_CUBE_MAP_TEXTURE_SIZE => state.config.max_cube_map_texture_size,
            gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS => state.config.max_combined_texture_image_units,
            gl::MAX_VERTEX_ATTRIBS => state.config.max_vertex_attribs,
            gl::MAX_COLOR_ATTACHMENTS => state.config.max_color_attachments,
            gl::MAX_DRAW_BUFFERS => state.config.max_draw_buffers,
            gl::DEPTH_BITS => state.config.depth_bits,
            gl::STENCIL_BITS => state.config.stencil_bits,
            gl::NUM_EXTENSIONS => state.config.extensions.len() as GLint,
            _ => {
                state.raise(gl::INVALID_ENUM);
                0
            },
        }
    }

    fn get_error(&mut self) -> GLenum {
        let mut state = self.state.borrow_mut();
        state.record("glGetError");
        state.errors.pop_front().unwrap_or(gl::NO_ERROR)
    }

    fn extensions(&mut self) -> Vec<String> {
        self.state.borrow().config.extensions.clone()
    }

    fn gen_buffer(&mut self) -> GLuint {
        let mut state = self.state.borrow_mut();
        if !state.record("glGenBuffers") {
            return 0;
        }
        let id = state.new_name();
        state.buffers.insert(id, Vec::new());
        id
    }

    fn delete_buffer(&mut self, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glDeleteBuffers") {
            return;
        }
        state.buffers.remove(&id);
        for binding in state.buffer_bindings.values_mut() {
            if *binding == id {
                *binding = 0;
            }
        }

        // only the bound vertex array object forgets the buffer
        let vertex_array = state.current_vertex_array();
        if vertex_array.element_array_buffer == id {
            vertex_array.element_array_buffer = 0;
        }
        vertex_array.attrib_buffers.retain(|_, buffer| *buffer != id);
    }

    fn bind_buffer(&mut self, target: GLenum, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glBindBuffer") {
            return;
        }
        if id != 0 && !state.buffers.contains_key(&id) {
            state.raise(gl::INVALID_OPERATION);
            return;
        }
        if target == gl::ELEMENT_ARRAY_BUFFER {
            state.current_vertex_array().element_array_buffer = id;
        } else {
            state.buffer_bindings.insert(target, id);
        }
    }

    fn buffer_data(&mut self, target: GLenum, size: usize, data: Option<&[u8]>, _: GLenum) {
        let mut state = self.state.borrow_mut();
        if !state.record("glBufferData") {
            return;
        }
        if let Some(id) = state.bound_buffer(target) {
            let storage = match data {
                Some(data) => data[.. size.min(data.len())].to_vec(),
                None => vec![0; size],
            };
            state.buffers.insert(id, storage);
        }
    }

    fn buffer_sub_data(&mut self, target: GLenum, offset: usize, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        if !state.record("glBufferSubData") {
            return;
        }
        if let Some(id) = state.bound_buffer(target) {
            let in_range = match state.buffers.get_mut(&id) {
                Some(storage) if offset + data.len() <= storage.len() => {
                    storage[offset .. offset + data.len()].copy_from_slice(data);
                    true
                },
                _ => false,
            };
            if !in_range {
                state.raise(gl::INVALID_VALUE);
            }
        }
    }

    fn get_buffer_sub_data(&mut self, target: GLenum, offset: usize, out: &mut [u8]) {
        let mut state = self.state.borrow_mut();
        if !state.record("glGetBufferSubData") {
            return;
        }
        if let Some(id) = state.bound_buffer(target) {
            let in_range = match state.buffers.get(&id) {
                Some(storage) if offset + out.len() <= storage.len() => {
                    out.copy_from_slice(&storage[offset .. offset + out.len()]);
                    true
                },
                _ => false,
            };
            if !in_range {
                state.raise(gl::INVALID_VALUE);
            }
        }
    }

    fn enable_vertex_attrib_array(&mut self, index: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glEnableVertexAttribArray") {
            return;
        }
        state.current_vertex_array().attrib_arrays.insert(index);
    }

    fn disable_vertex_attrib_array(&mut self, index: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glDisableVertexAttribArray") {
            return;
        }
        state.current_vertex_array().attrib_arrays.remove(&index);
    }

    fn vertex_attrib_pointer(&mut self, index: GLuint, components: GLint, _: GLenum, _: bool,
                             _: GLsizei, _: usize)
    {
        let mut state = self.state.borrow_mut();
        if !state.record("glVertexAttribPointer") {
            return;
        }
        if !(1 ..= 4).contains(&components) || index as GLint >= state.config.max_vertex_attribs
        {
            state.raise(gl::INVALID_VALUE);
        } else if let Some(buffer) = state.bound_buffer(gl::ARRAY_BUFFER) {
            state.current_vertex_array().attrib_buffers.insert(index, buffer);
        }
    }

    fn gen_vertex_array(&mut self) -> GLuint {
        let mut state = self.state.borrow_mut();
        if !state.record("glGenVertexArrays") {
            return 0;
        }
        if !state.has_vertex_arrays() {
            state.raise(gl::INVALID_OPERATION);
            return 0;
        }
        let id = state.new_name();
        state.vertex_arrays.insert(id, FakeVertexArray::default());
        id
    }

    fn delete_vertex_array(&mut self, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glDeleteVertexArrays") {
            return;
        }
        if !state.has_vertex_arrays() {
            state.raise(gl::INVALID_OPERATION);
            return;
        }
        if id == 0 {
            return;
        }
        state.vertex_arrays.remove(&id);
        if state.vertex_array == id {
            state.vertex_array = 0;
        }
    }

    fn bind_vertex_array(&mut self, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glBindVertexArray") {
            return;
        }
        if !state.has_vertex_arrays() || !state.vertex_arrays.contains_key(&id) {
            state.raise(gl::INVALID_OPERATION);
            return;
        }
        state.vertex_array = id;
    }

    fn gen_texture(&mut self) -> GLuint {
        let mut state = self.state.borrow_mut();
        if !state.record("glGenTextures") {
            return 0;
        }
        let id = state.new_name();
        state.textures.insert(id, FakeTexture {
            target: None, width: 0, height: 0, images: FnvHashMap::default(),
        });
        id
    }

    fn delete_texture(&mut self, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glDeleteTextures") {
            return;
        }
        state.textures.remove(&id);
        state.texture_bindings.retain(|_, bound| *bound != id);
    }

    fn active_texture(&mut self, unit: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glActiveTexture") {
            return;
        }
        if unit as GLint >= state.config.max_combined_texture_image_units {
            state.raise(gl::INVALID_ENUM);
            return;
        }
        state.active_texture = unit;
    }

    fn bind_texture(&mut self, target: GLenum, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glBindTexture") {
            return;
        }

        if id != 0 {
            // a texture keeps the target it was first bound to
            let compatible = match state.textures.get_mut(&id) {
                None => false,
                Some(texture) => match texture.target {
                    Some(t) if t != target => false,
                    _ => {
                        texture.target = Some(target);
                        true
                    },
                },
            };

            if !compatible {
                state.raise(gl::INVALID_OPERATION);
                return;
            }
        }

        let unit = state.active_texture;
        state.texture_bindings.insert((unit, target), id);
    }

    fn tex_image_2d(&mut self, target: GLenum, level: GLint, _: GLint, width: GLsizei,
                    height: GLsizei, format: GLenum, ty: GLenum, data: Option<&[u8]>)
    {
        let mut state = self.state.borrow_mut();
        if !state.record("glTexImage2D") {
            return;
        }
        let max = if FakeState::texture_binding_target(target) == gl::TEXTURE_CUBE_MAP {
            state.config.max_cube_map_texture_size
        } else {
            state.config.max_texture_size
        };
        if width <= 0 || height <= 0 || width > max || height > max {
            state.raise(gl::INVALID_VALUE);
            return;
        }
        if let Some(id) = state.bound_texture(target) {
            if let Some(texture) = state.textures.get_mut(&id) {
                texture.width = width;
                texture.height = height;

                if level == 0 {
                    match pixel_size(format, ty) {
                        Some(pixel_size) => {
                            let len = width as usize * height as usize * pixel_size;
                            let texels = match data {
                                Some(data) => data[.. len.min(data.len())].to_vec(),
                                None => vec![0; len],
                            };
                            texture.images.insert(target, FakeImage {
                                width: width as usize, pixel_size, texels,
                            });
                        },
                        None => {
                            texture.images.remove(&target);
                        },
                    }
                }
            }
        }
    }

    fn tex_sub_image_2d(&mut self, target: GLenum, level: GLint, x: GLint, y: GLint,
                        width: GLsizei, height: GLsizei, _: GLenum, _: GLenum, data: &[u8])
    {
        let mut state = self.state.borrow_mut();
        if !state.record("glTexSubImage2D") {
            return;
        }
        if let Some(id) = state.bound_texture(target) {
            let fits = state.textures.get(&id)
                .map(|t| x >= 0 && y >= 0 && x + width <= t.width && y + height <= t.height)
                .unwrap_or(false);
            if !fits {
                state.raise(gl::INVALID_VALUE);
                return;
            }

            let image = state.textures.get_mut(&id).and_then(|t| t.images.get_mut(&target));
            if let (0, Some(image)) = (level, image) {
                let row = width as usize * image.pixel_size;
                for (k, source) in data.chunks(row).take(height as usize).enumerate() {
                    let start = ((y as usize + k) * image.width + x as usize) * image.pixel_size;
                    image.texels[start .. start + source.len()].copy_from_slice(source);
                }
            }
        }
    }

    fn get_tex_image(&mut self, target: GLenum, level: GLint, format: GLenum, ty: GLenum,
                     out: &mut [u8])
    {
        let mut state = self.state.borrow_mut();
        if !state.record("glGetTexImage") {
            return;
        }
        if !state.has_tex_image_readback() || level != 0 {
            state.raise(gl::INVALID_OPERATION);
            return;
        }
        if let Some(id) = state.bound_texture(target) {
            let copied = match state.textures.get(&id).and_then(|t| t.images.get(&target)) {
                Some(image) if image.texels.len() == out.len() &&
                               pixel_size(format, ty) == Some(image.pixel_size) =>
                {
                    out.copy_from_slice(&image.texels);
                    true
                },
                _ => false,
            };
            if !copied {
                state.raise(gl::INVALID_OPERATION);
            }
        }
    }

    fn tex_parameter(&mut self, target: GLenum, _: GLenum, _: GLint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glTexParameteri") {
            return;
        }
        state.bound_texture(target);
    }

    fn generate_mipmap(&mut self, target: GLenum) {
        let mut state = self.state.borrow_mut();
        if !state.record("glGenerateMipmap") {
            return;
        }
        state.bound_texture(target);
    }

    fn gen_renderbuffer(&mut self) -> GLuint {
        let mut state = self.state.borrow_mut();
        if !state.record("glGenRenderbuffers") {
            return 0;
        }
        let id = state.new_name();
        state.renderbuffers.insert(id, None);
        id
    }

    fn delete_renderbuffer(&mut self, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glDeleteRenderbuffers") {
            return;
        }
        state.renderbuffers.remove(&id);
        if state.renderbuffer_binding == id {
            state.renderbuffer_binding = 0;
        }
    }

    fn bind_renderbuffer(&mut self, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glBindRenderbuffer") {
            return;
        }
        if id != 0 && !state.renderbuffers.contains_key(&id) {
            state.raise(gl::INVALID_OPERATION);
            return;
        }
        state.renderbuffer_binding = id;
    }

    fn renderbuffer_storage(&mut self, internal_format: GLenum, width: GLsizei, height: GLsizei) {
        let mut state = self.state.borrow_mut();
        if !state.record("glRenderbufferStorage") {
            return;
        }
        let bound = state.renderbuffer_binding;
        if bound == 0 {
            state.raise(gl::INVALID_OPERATION);
        } else if width <= 0 || height <= 0 {
            state.raise(gl::INVALID_VALUE);
        } else {
            state.renderbuffers.insert(bound, Some(internal_format));
        }
    }

    fn gen_framebuffer(&mut self) -> GLuint {
        let mut state = self.state.borrow_mut();
        if !state.record("glGenFramebuffers") {
            return 0;
        }
        let id = state.new_name();
        state.framebuffers.insert(id, FakeFramebuffer {
            attachments: FnvHashMap::default(),
            draw_buffers: vec![gl::COLOR_ATTACHMENT0],
        });
        id
    }

    fn delete_framebuffer(&mut self, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glDeleteFramebuffers") {
            return;
        }
        state.framebuffers.remove(&id);
        if state.draw_framebuffer == id {
            state.draw_framebuffer = 0;
        }
        if state.read_framebuffer == id {
            state.read_framebuffer = 0;
        }
    }

    fn bind_framebuffer(&mut self, target: GLenum, id: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glBindFramebuffer") {
            return;
        }
        if id != 0 && !state.framebuffers.contains_key(&id) {
            state.raise(gl::INVALID_OPERATION);
            return;
        }
        match target {
            gl::FRAMEBUFFER => {
                state.draw_framebuffer = id;
                state.read_framebuffer = id;
            },
            gl::DRAW_FRAMEBUFFER => state.draw_framebuffer = id,
            gl::READ_FRAMEBUFFER => state.read_framebuffer = id,
            _ => state.raise(gl::INVALID_ENUM),
        }
    }

    fn framebuffer_texture_2d(&mut self, target: GLenum, attachment: GLenum, _: GLenum,
                              texture: GLuint)
    {
        let mut state = self.state.borrow_mut();
        if !state.record("glFramebufferTexture2D") {
            return;
        }
        if texture != 0 && !state.textures.contains_key(&texture) {
            state.raise(gl::INVALID_OPERATION);
            return;
        }
        if let Some(id) = state.framebuffer_for(target) {
            if let Some(fb) = state.framebuffers.get_mut(&id) {
                fb.attachments.insert(attachment, texture);
            }
        }
    }

    fn framebuffer_renderbuffer(&mut self, target: GLenum, attachment: GLenum,
                                renderbuffer: GLuint)
    {
        let mut state = self.state.borrow_mut();
        if !state.record("glFramebufferRenderbuffer") {
            return;
        }
        if renderbuffer != 0 && !state.renderbuffers.contains_key(&renderbuffer) {
            state.raise(gl::INVALID_OPERATION);
            return;
        }
        if let Some(id) = state.framebuffer_for(target) {
            if let Some(fb) = state.framebuffers.get_mut(&id) {
                fb.attachments.insert(attachment, renderbuffer);
            }
        }
    }

    fn draw_buffers(&mut self, buffers: &[GLenum]) {
        let mut state = self.state.borrow_mut();
        if !state.record("glDrawBuffers") {
            return;
        }
        if buffers.len() as GLint > state.config.max_draw_buffers {
            state.raise(gl::INVALID_VALUE);
            return;
        }
        if let Some(id) = state.framebuffer_for(gl::DRAW_FRAMEBUFFER) {
            if let Some(fb) = state.framebuffers.get_mut(&id) {
                fb.draw_buffers = buffers.to_vec();
            }
        }
    }

    fn check_framebuffer_status(&mut self, target: GLenum) -> GLenum {
        let mut state = self.state.borrow_mut();
        state.record("glCheckFramebufferStatus");
        let id = match target {
            gl::READ_FRAMEBUFFER => state.read_framebuffer,
            _ => state.draw_framebuffer,
        };

        if id == 0 {
            return gl::FRAMEBUFFER_COMPLETE;
        }

        let fb = match state.framebuffers.get(&id) {
            Some(fb) => fb,
            None => return gl::FRAMEBUFFER_UNDEFINED,
        };

        let attached = |point: &GLenum| fb.attachments.get(point).map(|&id| id != 0)
                                                                  .unwrap_or(false);

        if !fb.attachments.values().any(|&id| id != 0) {
            gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT
        } else if fb.draw_buffers.iter().any(|b| *b != gl::NONE && !attached(b)) {
            gl::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER
        } else {
            gl::FRAMEBUFFER_COMPLETE
        }
    }

    fn blit_framebuffer(&mut self, _: [GLint; 4], _: [GLint; 4], mask: GLbitfield, filter: GLenum) {
        let mut state = self.state.borrow_mut();
        if !state.record("glBlitFramebuffer") {
            return;
        }
        if mask & (gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT) != 0 && filter != gl::NEAREST {
            state.raise(gl::INVALID_OPERATION);
        }
    }

    fn create_shader(&mut self, ty: GLenum) -> GLuint {
        let mut state = self.state.borrow_mut();
        if !state.record("glCreateShader") {
            return 0;
        }
        let id = state.new_name();
        state.shaders.insert(id, FakeShader {
            ty, source: String::new(), compiled: false, log: String::new(),
        });
        id
    }

    fn shader_source(&mut self, shader: GLuint, lines: &[&str]) {
        let mut state = self.state.borrow_mut();
        if !state.record("glShaderSource") {
            return;
        }
        match state.shaders.get_mut(&shader) {
            Some(s) => s.source = lines.concat(),
            None => state.raise(gl::INVALID_VALUE),
        }
    }

    fn compile_shader(&mut self, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glCompileShader") {
            return;
        }
        if !state.shaders.contains_key(&shader) {
            state.raise(gl::INVALID_VALUE);
            return;
        }

        let s = match state.shaders.get_mut(&shader) {
            Some(s) => s,
            None => return,
        };

        s.log.clear();
        if s.source.trim().is_empty() {
            s.log.push_str("0:0: error: empty shader source\n");
        } else if !glsl::balanced(&s.source) {
            s.log.push_str("0:0: error: syntax error, unbalanced braces\n");
        } else if !s.source.contains("main") {
            s.log.push_str("0:0: error: missing entry point `main`\n");
        }
        s.compiled = s.log.is_empty();
    }

    fn shader_compile_status(&mut self, shader: GLuint) -> bool {
        let mut state = self.state.borrow_mut();
        state.record("glGetShaderiv");
        state.shaders.get(&shader).map(|s| s.compiled).unwrap_or(false)
    }

    fn shader_info_log(&mut self, shader: GLuint) -> String {
        let mut state = self.state.borrow_mut();
        state.record("glGetShaderInfoLog");
        state.shaders.get(&shader).map(|s| s.log.clone()).unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glDeleteShader") {
            return;
        }
        state.shaders.remove(&shader);
    }

    fn create_program(&mut self) -> GLuint {
        let mut state = self.state.borrow_mut();
        if !state.record("glCreateProgram") {
            return 0;
        }
        let id = state.new_name();
        state.programs.insert(id, FakeProgram {
            attached: Vec::new(),
            linked: false,
            log: String::new(),
            attributes: Vec::new(),
            uniforms: Vec::new(),
            values: FnvHashMap::default(),
        });
        id
    }

    fn attach_shader(&mut self, program: GLuint, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glAttachShader") {
            return;
        }
        if !state.shaders.contains_key(&shader) {
            state.raise(gl::INVALID_VALUE);
            return;
        }
        match state.programs.get_mut(&program) {
            Some(p) => p.attached.push(shader),
            None => state.raise(gl::INVALID_VALUE),
        }
    }

    fn link_program(&mut self, program: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glLinkProgram") {
            return;
        }
        state.link(program);
    }

    fn program_link_status(&mut self, program: GLuint) -> bool {
        let mut state = self.state.borrow_mut();
        state.record("glGetProgramiv");
        state.programs.get(&program).map(|p| p.linked).unwrap_or(false)
    }

    fn program_info_log(&mut self, program: GLuint) -> String {
        let mut state = self.state.borrow_mut();
        state.record("glGetProgramInfoLog");
        state.programs.get(&program).map(|p| p.log.clone()).unwrap_or_default()
    }

    fn active_attributes(&mut self, program: GLuint) -> Vec<ActiveVariable> {
        let mut state = self.state.borrow_mut();
        state.record("glGetActiveAttrib");
        state.programs.get(&program).map(|p| p.attributes.clone()).unwrap_or_default()
    }

    fn active_uniforms(&mut self, program: GLuint) -> Vec<ActiveVariable> {
        let mut state = self.state.borrow_mut();
        state.record("glGetActiveUniform");
        state.programs.get(&program).map(|p| p.uniforms.clone()).unwrap_or_default()
    }

    fn use_program(&mut self, program: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glUseProgram") {
            return;
        }
        if program != 0 && !state.programs.get(&program).map(|p| p.linked).unwrap_or(false) {
            state.raise(gl::INVALID_OPERATION);
            return;
        }
        state.current_program = program;
    }

    fn delete_program(&mut self, program: GLuint) {
        let mut state = self.state.borrow_mut();
        if !state.record("glDeleteProgram") {
            return;
        }
        state.programs.remove(&program);
        if state.current_program == program {
            state.current_program = 0;
        }
    }

    fn uniform(&mut self, location: GLint, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        if !state.record("glUniform") {
            return;
        }
        if location == -1 {
            return;
        }

        if value.is_unsigned() && !state.has_unsigned_uniforms() {
            state.raise(gl::INVALID_OPERATION);
            return;
        }

        let valid = match state.current_program() {
            Some(program) => {
                let valid = program.uniforms.iter()
                    .any(|u| location >= u.location && location < u.location + u.size);
                if valid {
                    program.values.insert(location, value);
                }
                valid
            },
            None => return,
        };

        if !valid {
            state.raise(gl::INVALID_OPERATION);
        }
    }

    fn enable(&mut self, cap: GLenum) {
        let mut state = self.state.borrow_mut();
        if !state.record("glEnable") {
            return;
        }
        state.enabled.insert(cap);
    }

    fn disable(&mut self, cap: GLenum) {
        let mut state = self.state.borrow_mut();
        if !state.record("glDisable") {
            return;
        }
        state.enabled.remove(&cap);
    }

    fn blend_func_separate(&mut self, _: GLenum, _: GLenum, _: GLenum, _: GLenum) {
        self.state.borrow_mut().record("glBlendFuncSeparate");
    }

    fn blend_equation_separate(&mut self, _: GLenum, _: GLenum) {
        self.state.borrow_mut().record("glBlendEquationSeparate");
    }

    fn blend_color(&mut self, _: [f32; 4]) {
        self.state.borrow_mut().record("glBlendColor");
    }

    fn depth_func(&mut self, _: GLenum) {
        self.state.borrow_mut().record("glDepthFunc");
    }

    fn depth_mask(&mut self, _: bool) {
        self.state.borrow_mut().record("glDepthMask");
    }

    fn clear_depth(&mut self, _: f32) {
        self.state.borrow_mut().record("glClearDepth");
    }

    fn stencil_func_separate(&mut self, _: GLenum, _: GLenum, _: GLint, _: GLuint) {
        self.state.borrow_mut().record("glStencilFuncSeparate");
    }

    fn stencil_op_separate(&mut self, _: GLenum, _: GLenum, _: GLenum, _: GLenum) {
        self.state.borrow_mut().record("glStencilOpSeparate");
    }

    fn stencil_mask_separate(&mut self, _: GLenum, _: GLuint) {
        self.state.borrow_mut().record("glStencilMaskSeparate");
    }

    fn clear_stencil(&mut self, _: GLint) {
        self.state.borrow_mut().record("glClearStencil");
    }

    fn clear_color(&mut self, _: [f32; 4]) {
        self.state.borrow_mut().record("glClearColor");
    }

    fn clear(&mut self, _: GLbitfield) {
        self.state.borrow_mut().record("glClear");
    }

    fn scissor(&mut self, _: GLint, _: GLint, width: GLsizei, height: GLsizei) {
        let mut state = self.state.borrow_mut();
        if !state.record("glScissor") {
            return;
        }
        if width < 0 || height < 0 {
            state.raise(gl::INVALID_VALUE);
        }
    }

    fn viewport(&mut self, _: GLint, _: GLint, width: GLsizei, height: GLsizei) {
        let mut state = self.state.borrow_mut();
        if !state.record("glViewport") {
            return;
        }
        if width < 0 || height < 0 {
            state.raise(gl::INVALID_VALUE);
        }
    }

    fn polygon_mode(&mut self, _: GLenum) {
        self.state.borrow_mut().record("glPolygonMode");
    }

    fn logic_op(&mut self, _: GLenum) {
        self.state.borrow_mut().record("glLogicOp");
    }

    fn color_mask(&mut self, _: [bool; 4]) {
        self.state.borrow_mut().record("glColorMask");
    }

    fn cull_face(&mut self, _: GLenum) {
        self.state.borrow_mut().record("glCullFace");
    }

    fn front_face(&mut self, _: GLenum) {
        self.state.borrow_mut().record("glFrontFace");
    }

    fn draw_arrays(&mut self, _: GLenum, first: GLint, count: GLsizei) {
        let mut state = self.state.borrow_mut();
        if !state.record("glDrawArrays") {
            return;
        }
        if first < 0 || count < 0 {
            state.raise(gl::INVALID_VALUE);
        } else if state.current_program().is_some() {
            state.draws += 1;
        }
    }

    fn draw_elements(&mut self, _: GLenum, count: GLsizei, _: GLenum, _: usize) {
        let mut state = self.state.borrow_mut();
        if !state.record("glDrawElements") {
            return;
        }
        if count < 0 {
            state.raise(gl::INVALID_VALUE);
        } else if state.current_program().is_some() &&
                  state.bound_buffer(gl::ELEMENT_ARRAY_BUFFER).is_some()
        {
            state.draws += 1;
        }
    }
}

/// Bytes per pixel of client data of this format and type.
fn pixel_size(format: GLenum, ty: GLenum) -> Option<usize> {
    let packed = match ty {
        gl::UNSIGNED_SHORT_5_6_5 | gl::UNSIGNED_SHORT_4_4_4_4 |
        gl::UNSIGNED_SHORT_5_5_5_1 => Some(2),
        gl::UNSIGNED_INT_24_8 | gl::UNSIGNED_INT_2_10_10_10_REV => Some(4),
        gl::FLOAT_32_UNSIGNED_INT_24_8_REV => Some(8),
        _ => None,
    };
    if packed.is_some() {
        return packed;
    }

    let components = match format {
        gl::RED | gl::RED_INTEGER | gl::DEPTH_COMPONENT | gl::ALPHA | gl::LUMINANCE => 1,
        gl::RG | gl::RG_INTEGER | gl::LUMINANCE_ALPHA => 2,
        gl::RGB | gl::RGB_INTEGER => 3,
        gl::RGBA | gl::RGBA_INTEGER | gl::BGRA => 4,
        _ => return None,
    };
    let size = match ty {
        gl::UNSIGNED_BYTE | gl::BYTE => 1,
        gl::UNSIGNED_SHORT | gl::SHORT | gl::HALF_FLOAT => 2,
        gl::UNSIGNED_INT | gl::INT | gl::FLOAT => 4,
        _ => return None,
    };

    Some(components * size)
}

#[cfg(test)]
mod tests {
    use super::{FakeConfig, FakeDriver};
    use crate::driver::Driver;
    use crate::gl;

    #[test]
    fn buffer_upload_requires_binding() {
        let mut driver = FakeDriver::new(FakeConfig::gl33());
        driver.buffer_data(gl::ARRAY_BUFFER, 4, None, gl::STATIC_DRAW);
        assert_eq!(driver.get_error(), gl::INVALID_OPERATION);

        let id = driver.gen_buffer();
        driver.bind_buffer(gl::ARRAY_BUFFER, id);
        driver.buffer_data(gl::ARRAY_BUFFER, 4, None, gl::STATIC_DRAW);
        driver.buffer_sub_data(gl::ARRAY_BUFFER, 2, &[7, 8]);
        assert_eq!(driver.get_error(), gl::NO_ERROR);
        assert_eq!(driver.buffer_contents(id), Some(vec![0, 0, 7, 8]));

        driver.buffer_sub_data(gl::ARRAY_BUFFER, 3, &[1, 2]);
        assert_eq!(driver.get_error(), gl::INVALID_VALUE);
    }

    #[test]
    fn deleted_names_are_unbound() {
        let mut driver = FakeDriver::new(FakeConfig::gl33());
        let id = driver.gen_buffer();
        driver.bind_buffer(gl::ARRAY_BUFFER, id);
        driver.delete_buffer(id);
        assert_eq!(driver.buffer_binding(gl::ARRAY_BUFFER), 0);

        driver.bind_buffer(gl::ARRAY_BUFFER, id);
        assert_eq!(driver.get_error(), gl::INVALID_OPERATION);
    }

    #[test]
    fn link_reflects_declarations() {
        let mut driver = FakeDriver::new(FakeConfig::gl33());
        let vertex = driver.create_shader(gl::VERTEX_SHADER);
        driver.shader_source(vertex, &["in vec2 position;\n", "uniform mat4 matrix;\n",
                                       "void main() {}\n"]);
        driver.compile_shader(vertex);
        let fragment = driver.create_shader(gl::FRAGMENT_SHADER);
        driver.shader_source(fragment, &["uniform vec4 color;\n", "void main() {}\n"]);
        driver.compile_shader(fragment);
        assert!(driver.shader_compile_status(vertex));
        assert!(driver.shader_compile_status(fragment));

        let program = driver.create_program();
        driver.attach_shader(program, vertex);
        driver.attach_shader(program, fragment);
        driver.link_program(program);
        assert!(driver.program_link_status(program));

        let attributes = driver.active_attributes(program);
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].ty, gl::FLOAT_VEC2);

        let uniforms = driver.active_uniforms(program);
        let names: Vec<_> = uniforms.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["matrix", "color"]);
    }

    #[test]
    fn link_without_fragment_shader_fails() {
        let mut driver = FakeDriver::new(FakeConfig::gl33());
        let vertex = driver.create_shader(gl::VERTEX_SHADER);
        driver.shader_source(vertex, &["void main() {}\n"]);
        driver.compile_shader(vertex);
        let program = driver.create_program();
        driver.attach_shader(program, vertex);
        driver.link_program(program);
        assert!(!driver.program_link_status(program));
        assert!(driver.program_info_log(program).contains("fragment"));
    }

    #[test]
    fn uniform_without_program() {
        let mut driver = FakeDriver::new(FakeConfig::gl33());
        driver.uniform(0, super::UniformValue::Float(1.0));
        assert_eq!(driver.get_error(), gl::INVALID_OPERATION);
    }

    #[test]
    fn injected_failures_skip_the_call() {
        let mut driver = FakeDriver::new(FakeConfig::gl33());
        let id = driver.gen_buffer();
        driver.bind_buffer(gl::ARRAY_BUFFER, id);
        driver.fail_next("glBufferData", gl::OUT_OF_MEMORY);

        driver.buffer_data(gl::ARRAY_BUFFER, 4, None, gl::STATIC_DRAW);
        assert_eq!(driver.get_error(), gl::OUT_OF_MEMORY);
        assert_eq!(driver.buffer_contents(id), Some(vec![]));
        assert_eq!(driver.statistics().calls("glBufferData"), 1);

        // only the next call fails
        driver.buffer_data(gl::ARRAY_BUFFER, 4, None, gl::STATIC_DRAW);
        assert_eq!(driver.get_error(), gl::NO_ERROR);
        assert_eq!(driver.buffer_contents(id), Some(vec![0; 4]));
    }

    #[test]
    fn unsigned_uniforms_need_version_3() {
        for (config, supported) in [(FakeConfig::gl21(), false), (FakeConfig::gles2(), false),
                                    (FakeConfig::gl33(), true), (FakeConfig::gles3(), true)]
        {
            let driver = FakeDriver::new(config);
            assert_eq!(driver.state.borrow().has_unsigned_uniforms(), supported);
        }

        let mut driver = FakeDriver::new(FakeConfig::gles2());
        driver.uniform(0, super::UniformValue::UnsignedInt(1));
        assert_eq!(driver.get_error(), gl::INVALID_OPERATION);
    }

    #[test]
    fn statistics_count_calls() {
        let mut driver = FakeDriver::new(FakeConfig::gl33());
        driver.enable(gl::BLEND);
        driver.enable(gl::BLEND);
        driver.disable(gl::BLEND);
        let stats = driver.statistics();
        assert_eq!(stats.calls("glEnable"), 2);
        assert_eq!(stats.calls("glDisable"), 1);
        assert_eq!(stats.total(), 3);
        assert!(!driver.is_enabled(gl::BLEND));
    }
}
