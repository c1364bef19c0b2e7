//! The context owns the driver, the objects and every piece of state.
//!
//! The capability objects of an `Interface` share a `Rc<Context>`. Each operation starts with
//! `Context::make_current`, which returns a `CommandContext` giving mutable access to
//! everything for the duration of the operation.

use std::cell::{Cell, RefCell, RefMut};
use std::fmt;
use std::io::Write;

use backtrace::Backtrace;
use log::{debug, error, trace, warn};
use smallvec::SmallVec;

use crate::backend::Backend;
use crate::driver::Driver;
use crate::gl;
use crate::resource::{self, RawHandle, Resources};
use crate::version::{self, Api, Version};
use crate::{CreationError, DriverError, Error};

pub use self::builder::ContextBuilder;
pub use self::capabilities::{Capabilities, SoftRestrictions};
pub use self::extensions::ExtensionsList;

pub(crate) use self::state::{update, GlState, RenderState};

mod builder;
mod capabilities;
mod extensions;
mod state;

/// The API family and version band of a context.
///
/// The profile decides which implementation of each capability an `Interface` uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Profile {
    /// OpenGL 2.1 with framebuffer objects.
    Gl21,
    /// OpenGL 3.0 and above.
    Gl3,
    /// OpenGL ES 2.0.
    Gles2,
    /// OpenGL ES 3.0 and above.
    Gles3,
}

impl Profile {
    /// Returns the profile of a version, or `None` if the version is too old.
    pub fn from_version(version: &Version) -> Option<Profile> {
        match *version {
            Version(Api::Gl, major, _) if major >= 3 => Some(Profile::Gl3),
            v if v >= Version(Api::Gl, 2, 1) => Some(Profile::Gl21),
            Version(Api::GlEs, major, _) if major >= 3 => Some(Profile::Gles3),
            Version(Api::GlEs, 2, _) => Some(Profile::Gles2),
            _ => None,
        }
    }

    /// Returns true for OpenGL ES profiles.
    #[inline]
    pub fn is_gles(self) -> bool {
        matches!(self, Profile::Gles2 | Profile::Gles3)
    }

    /// Returns true if draw and read framebuffers have separate binding points.
    #[inline]
    pub fn has_read_framebuffers(self) -> bool {
        matches!(self, Profile::Gl3 | Profile::Gles3)
    }

    /// Returns true if vertex array objects are available.
    #[inline]
    pub fn has_array_objects(self) -> bool {
        matches!(self, Profile::Gl3 | Profile::Gles3)
    }
}

/// What a texture unit is bound to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum UnitBinding {
    Texture2D(RawHandle),
    TextureCube(RawHandle),
}

/// The objects bound by the user of the interface.
pub(crate) struct Bindings {
    pub array_buffer: Option<RawHandle>,
    /// The index buffer of the bound array object.
    pub index_buffer: Option<RawHandle>,
    /// `None` for the default array object.
    pub array_object: Option<RawHandle>,
    /// The index buffer of the default array object, while another one is bound.
    pub default_index_buffer: Option<RawHandle>,
    pub texture_units: SmallVec<[Option<UnitBinding>; 32]>,
    pub draw_framebuffer: Option<RawHandle>,
    pub read_framebuffer: Option<RawHandle>,
    pub program: Option<RawHandle>,
}

impl Bindings {
    fn new(texture_units: u32) -> Bindings {
        Bindings {
            array_buffer: None,
            index_buffer: None,
            array_object: None,
            default_index_buffer: None,
            texture_units: SmallVec::from_elem(None, texture_units as usize),
            draw_framebuffer: None,
            read_framebuffer: None,
            program: None,
        }
    }

    /// Returns the units to which this texture is bound.
    pub fn units_of(&self, texture: UnitBinding) -> impl Iterator<Item = u32> + '_ {
        self.texture_units.iter().enumerate()
            .filter(move |(_, b)| **b == Some(texture))
            .map(|(unit, _)| unit as u32)
    }
}

pub(crate) struct Config {
    pub debug: bool,
    pub state_caching: bool,
    pub uniform_type_checking: Cell<bool>,
    pub uniform_activity_checking: Cell<bool>,
}

/// Owns the driver and everything that has been created through it.
pub struct Context {
    id: u64,
    driver: RefCell<Box<dyn Driver>>,
    backend: Option<Box<dyn Backend>>,
    trace: RefCell<Option<Box<dyn Write>>>,
    state: RefCell<GlState>,
    render: RefCell<RenderState>,
    bindings: RefCell<Bindings>,
    resources: RefCell<Resources>,
    version: Version,
    glsl_version: Option<Version>,
    profile: Profile,
    default_vertex_array: Option<gl::types::GLuint>,
    extensions: ExtensionsList,
    capabilities: Capabilities,
    config: Config,
}

/// Gives access to everything during one operation.
pub(crate) struct CommandContext<'a> {
    driver: RefMut<'a, Box<dyn Driver>>,
    trace: RefMut<'a, Option<Box<dyn Write>>>,
    state: RefMut<'a, GlState>,
    pub render: RefMut<'a, RenderState>,
    pub bindings: RefMut<'a, Bindings>,
    pub resources: RefMut<'a, Resources>,
    pub version: &'a Version,
    pub profile: Profile,
    pub default_vertex_array: Option<gl::types::GLuint>,
    pub extensions: &'a ExtensionsList,
    pub capabilities: &'a Capabilities,
    pub config: &'a Config,
}

impl Context {
    pub(crate) fn new(mut driver: Box<dyn Driver>, backend: Option<Box<dyn Backend>>,
                      builder: ContextBuilder) -> Result<Context, CreationError>
    {
        let version_string = driver.get_string(gl::VERSION).unwrap_or_default();
        let version = version::parse_version_string(&version_string)
            .ok_or_else(|| CreationError::VersionString(version_string.clone()))?;

        let profile = Profile::from_version(&version).ok_or_else(|| {
            CreationError::IncompatibleOpenGl(format!("{} is below OpenGL 2.1 and OpenGL ES 2.0",
                                                      version))
        })?;

        let extensions = ExtensionsList::from_strings(driver.extensions());
        if profile == Profile::Gl21 && !extensions.gl_arb_framebuffer_object &&
           !extensions.gl_ext_framebuffer_object
        {
            return Err(CreationError::IncompatibleOpenGl(
                "OpenGL implementation doesn't support framebuffers".to_owned()));
        }

        let glsl_version = driver.get_string(gl::SHADING_LANGUAGE_VERSION)
            .and_then(|s| version::parse_glsl_version_string(&s));
        if glsl_version.is_none() {
            warn!("Couldn't parse the shading language version of {}", version);
        }

        let capabilities = capabilities::get_capabilities(&mut *driver, profile,
                                                          &builder.soft_restrictions);

        // core profiles refuse vertex attributes without a vertex array object, this one stands
        // in for the default array object
        let default_vertex_array = if profile.has_array_objects() {
            let id = driver.gen_vertex_array();
            driver.bind_vertex_array(id);
            Some(id)
        } else {
            None
        };

        // some drivers raise errors for the queries above, they mustn't leak into the first
        // operation
        for _ in 0 .. 16 {
            if driver.get_error() == gl::NO_ERROR {
                break;
            }
        }

        let id = resource::new_context_id();
        debug!("Created context #{} for {} ({:?}), {:?}", id, version, profile, capabilities);

        Ok(Context {
            id,
            driver: RefCell::new(driver),
            backend,
            trace: RefCell::new(builder.trace),
            state: RefCell::new(GlState::default()),
            render: RefCell::new(RenderState::default()),
            bindings: RefCell::new(Bindings::new(capabilities.texture_units)),
            resources: RefCell::new(Resources::new(id)),
            version,
            glsl_version,
            profile,
            default_vertex_array,
            extensions,
            capabilities,
            config: Config {
                debug: builder.debug,
                state_caching: builder.state_caching,
                uniform_type_checking: Cell::new(true),
                uniform_activity_checking: Cell::new(true),
            },
        })
    }

    /// Makes the backend current if necessary, and gives access to the state.
    ///
    /// # Panic
    ///
    /// Panics if called while another `CommandContext` of the same context is alive.
    pub(crate) fn make_current(&self) -> CommandContext<'_> {
        if let Some(ref backend) = self.backend {
            if !backend.is_current() {
                unsafe { backend.make_current() };
            }
        }

        CommandContext {
            driver: self.driver.borrow_mut(),
            trace: self.trace.borrow_mut(),
            state: self.state.borrow_mut(),
            render: self.render.borrow_mut(),
            bindings: self.bindings.borrow_mut(),
            resources: self.resources.borrow_mut(),
            version: &self.version,
            profile: self.profile,
            default_vertex_array: self.default_vertex_array,
            extensions: &self.extensions,
            capabilities: &self.capabilities,
            config: &self.config,
        }
    }

    /// Identifier of this context, unique in the process.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the version of OpenGL.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Returns the version of the shading language, if the driver reported a readable one.
    pub fn glsl_version(&self) -> Option<&Version> {
        self.glsl_version.as_ref()
    }

    /// Returns the profile that selected the capability implementations.
    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Returns the capabilities, with soft restrictions applied.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns the extensions that glguard cares about.
    pub fn extensions(&self) -> &ExtensionsList {
        &self.extensions
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if let Some(id) = self.default_vertex_array {
            if let Some(ref backend) = self.backend {
                if !backend.is_current() {
                    unsafe { backend.make_current() };
                }
            }

            let driver = self.driver.get_mut();
            driver.bind_vertex_array(0);
            driver.delete_vertex_array(id);
            debug!("Deleted the default vertex array {} of context #{}", id, self.id);
        }
    }
}

impl<'a> CommandContext<'a> {
    /// Calls the driver.
    ///
    /// The call is written to the trace output if there is one. In debug mode, `glGetError` is
    /// checked afterwards and any error is returned.
    pub fn call<R, F>(&mut self, call: fmt::Arguments<'_>, f: F) -> Result<R, Error>
        where F: FnOnce(&mut dyn Driver) -> R
    {
        if let Some(trace) = self.trace.as_mut() {
            if let Err(err) = writeln!(trace, "{}", call) {
                warn!("Couldn't write to the trace output: {}", err);
            }
        }

        let result = f(&mut **self.driver);

        if self.config.debug {
            let code = self.driver.get_error();
            if code != gl::NO_ERROR {
                let err = DriverError { code, call: call.to_string() };
                error!("{}\n{:?}", err, Backtrace::new());
                *self.state = GlState::default();
                return Err(Error::Driver(err));
            }
        }

        Ok(result)
    }

    #[inline]
    fn caching(&self) -> bool {
        self.config.state_caching
    }

    /// Binds a buffer at the driver level.
    pub fn bind_buffer(&mut self, target: gl::types::GLenum, id: gl::types::GLuint)
                       -> Result<(), Error>
    {
        let caching = self.caching();
        let slot = match target {
            gl::ARRAY_BUFFER => &mut self.state.array_buffer_binding,
            _ => &mut self.state.element_array_buffer_binding,
        };

        if update(caching, slot, id) {
            trace!("Binding buffer {} to 0x{:x}", id, target);
            self.call(format_args!("glBindBuffer(0x{:x}, {})", target, id),
                      |gl| gl.bind_buffer(target, id))?;
        }

        Ok(())
    }

    /// Binds a texture to a unit at the driver level.
    pub fn bind_texture(&mut self, unit: gl::types::GLuint, target: gl::types::GLenum,
                        id: gl::types::GLuint) -> Result<(), Error>
    {
        let caching = self.caching();

        if update(caching, &mut self.state.active_texture, unit) {
            self.call(format_args!("glActiveTexture(GL_TEXTURE0 + {})", unit),
                      |gl| gl.active_texture(unit))?;
        }

        let texture_unit = self.state.texture_unit(unit);
        let slot = match target {
            gl::TEXTURE_CUBE_MAP => &mut texture_unit.texture_cube,
            _ => &mut texture_unit.texture_2d,
        };

        if update(caching, slot, id) {
            trace!("Binding texture {} to 0x{:x} of unit {}", id, target, unit);
            self.call(format_args!("glBindTexture(0x{:x}, {})", target, id),
                      |gl| gl.bind_texture(target, id))?;
        }

        Ok(())
    }

    /// Binds a vertex array object at the driver level. 0 binds the default array object.
    pub fn bind_vertex_array(&mut self, id: gl::types::GLuint) -> Result<(), Error> {
        let id = match (id, self.default_vertex_array) {
            (0, Some(default)) => default,
            _ => id,
        };

        let caching = self.caching();
        if update(caching, &mut self.state.vertex_array, id) {
            trace!("Binding vertex array {}", id);
            self.state.element_array_buffer_binding = None;
            self.call(format_args!("glBindVertexArray({})", id),
                      |gl| gl.bind_vertex_array(id))?;
        }

        Ok(())
    }

    pub fn bind_renderbuffer(&mut self, id: gl::types::GLuint) -> Result<(), Error> {
        let caching = self.caching();
        if update(caching, &mut self.state.renderbuffer, id) {
            self.call(format_args!("glBindRenderbuffer(GL_RENDERBUFFER, {})", id),
                      |gl| gl.bind_renderbuffer(id))?;
        }

        Ok(())
    }

    /// Binds a framebuffer for drawing at the driver level.
    ///
    /// Profiles without separate read framebuffers bind `GL_FRAMEBUFFER`, which also changes
    /// the read framebuffer.
    pub fn bind_draw_framebuffer(&mut self, id: gl::types::GLuint) -> Result<(), Error> {
        let caching = self.caching();

        if self.profile.has_read_framebuffers() {
            if update(caching, &mut self.state.draw_framebuffer, id) {
                trace!("Binding draw framebuffer {}", id);
                self.call(format_args!("glBindFramebuffer(GL_DRAW_FRAMEBUFFER, {})", id),
                          |gl| gl.bind_framebuffer(gl::DRAW_FRAMEBUFFER, id))?;
            }
        } else {
            let changed = update(caching, &mut self.state.draw_framebuffer, id) |
                          update(caching, &mut self.state.read_framebuffer, id);
            if changed {
                trace!("Binding framebuffer {}", id);
                self.call(format_args!("glBindFramebuffer(GL_FRAMEBUFFER, {})", id),
                          |gl| gl.bind_framebuffer(gl::FRAMEBUFFER, id))?;
            }
        }

        Ok(())
    }

    /// Binds a framebuffer for reading at the driver level.
    pub fn bind_read_framebuffer(&mut self, id: gl::types::GLuint) -> Result<(), Error> {
        debug_assert!(self.profile.has_read_framebuffers());

        let caching = self.caching();
        if update(caching, &mut self.state.read_framebuffer, id) {
            trace!("Binding read framebuffer {}", id);
            self.call(format_args!("glBindFramebuffer(GL_READ_FRAMEBUFFER, {})", id),
                      |gl| gl.bind_framebuffer(gl::READ_FRAMEBUFFER, id))?;
        }

        Ok(())
    }

    pub fn use_program(&mut self, id: gl::types::GLuint) -> Result<(), Error> {
        let caching = self.caching();
        if update(caching, &mut self.state.program, id) {
            trace!("Using program {}", id);
            self.call(format_args!("glUseProgram({})", id), |gl| gl.use_program(id))?;
        }

        Ok(())
    }

    /// Calls `glEnable` or `glDisable`.
    pub fn set_enabled(&mut self, cap: gl::types::GLenum, enabled: bool) -> Result<(), Error> {
        let caching = self.caching();
        let needed = match self.state.enabled(cap) {
            Some(slot) => update(caching, slot, enabled),
            None => true,
        };

        if needed {
            if enabled {
                self.call(format_args!("glEnable(0x{:x})", cap), |gl| gl.enable(cap))?;
            } else {
                self.call(format_args!("glDisable(0x{:x})", cap), |gl| gl.disable(cap))?;
            }
        }

        Ok(())
    }

    /// Runs `f` on the driver state cache, and calls the driver if it returns true.
    ///
    /// Used by the state categories, which each own a few fields of the cache.
    pub fn cached<F, C>(&mut self, select: F, call: fmt::Arguments<'_>, c: C) -> Result<(), Error>
        where F: FnOnce(bool, &mut GlState) -> bool, C: FnOnce(&mut dyn Driver)
    {
        let caching = self.caching();
        if select(caching, &mut *self.state) {
            self.call(call, c)?;
        }

        Ok(())
    }

    /// Runs the steps that follow the creation of an object.
    ///
    /// If `steps` fails, `undo` runs to delete the object and restore the bindings, and the
    /// error of `steps` is returned. A failure of `undo` is only logged.
    pub fn created<R, S, U>(&mut self, steps: S, undo: U) -> Result<R, Error>
        where S: FnOnce(&mut CommandContext<'a>) -> Result<R, Error>,
              U: FnOnce(&mut CommandContext<'a>) -> Result<(), Error>
    {
        match steps(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                if let Err(undo_err) = undo(self) {
                    warn!("Couldn't clean up after `{}`: {}", err, undo_err);
                }
                Err(err)
            },
        }
    }

    /// Deletes a buffer, and forgets it in the driver state.
    pub fn delete_buffer(&mut self, id: gl::types::GLuint) -> Result<(), Error> {
        self.call(format_args!("glDeleteBuffers({})", id), |gl| gl.delete_buffer(id))?;
        self.state.forget_buffer(id);
        Ok(())
    }

    pub fn delete_vertex_array(&mut self, id: gl::types::GLuint) -> Result<(), Error> {
        self.call(format_args!("glDeleteVertexArrays({})", id),
                  |gl| gl.delete_vertex_array(id))?;
        self.state.forget_vertex_array(id);
        Ok(())
    }

    pub fn delete_texture(&mut self, id: gl::types::GLuint) -> Result<(), Error> {
        self.call(format_args!("glDeleteTextures({})", id), |gl| gl.delete_texture(id))?;
        self.state.forget_texture(id);
        Ok(())
    }

    pub fn delete_renderbuffer(&mut self, id: gl::types::GLuint) -> Result<(), Error> {
        self.call(format_args!("glDeleteRenderbuffers({})", id),
                  |gl| gl.delete_renderbuffer(id))?;
        self.state.forget_renderbuffer(id);
        Ok(())
    }

    pub fn delete_framebuffer(&mut self, id: gl::types::GLuint) -> Result<(), Error> {
        self.call(format_args!("glDeleteFramebuffers({})", id),
                  |gl| gl.delete_framebuffer(id))?;
        self.state.forget_framebuffer(id);
        Ok(())
    }

    /// Rebinds the array buffer that the user bound, after an internal bind.
    pub fn restore_array_buffer(&mut self) -> Result<(), Error> {
        let id = self.bindings.array_buffer
            .and_then(|raw| self.resources.array_buffers.get(raw).ok())
            .map(|r| r.id)
            .unwrap_or(0);
        self.bind_buffer(gl::ARRAY_BUFFER, id)
    }

    /// Rebinds the array object that the user bound, after an internal bind.
    pub fn restore_vertex_array(&mut self) -> Result<(), Error> {
        let id = self.bindings.array_object
            .and_then(|raw| self.resources.array_objects.get(raw).ok())
            .map(|a| a.id)
            .unwrap_or(0);
        self.bind_vertex_array(id)
    }

    /// Rebinds the index buffer that the user bound, after an internal bind.
    pub fn restore_index_buffer(&mut self) -> Result<(), Error> {
        let id = self.bindings.index_buffer
            .and_then(|raw| self.resources.index_buffers.get(raw).ok())
            .map(|r| r.id)
            .unwrap_or(0);
        self.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, id)
    }

    /// Rebinds what the user bound to `target` of a texture unit, after an internal bind.
    pub fn restore_texture_unit(&mut self, unit: u32, target: gl::types::GLenum)
                                -> Result<(), Error>
    {
        let binding = self.bindings.texture_units.get(unit as usize).cloned().flatten();
        let id = match (binding, target) {
            (Some(UnitBinding::Texture2D(raw)), gl::TEXTURE_2D) =>
                self.resources.textures_2d.get(raw).map(|r| r.id).unwrap_or(0),
            (Some(UnitBinding::TextureCube(raw)), gl::TEXTURE_CUBE_MAP) =>
                self.resources.textures_cube.get(raw).map(|r| r.id).unwrap_or(0),
            _ => 0,
        };

        self.bind_texture(unit, target, id)
    }

    /// Rebinds the draw framebuffer that the user bound, after an internal bind.
    pub fn restore_draw_framebuffer(&mut self) -> Result<(), Error> {
        let id = self.bindings.draw_framebuffer
            .and_then(|raw| self.resources.framebuffers.get(raw).ok())
            .map(|r| r.id)
            .unwrap_or(0);
        self.bind_draw_framebuffer(id)?;

        // with a single binding point, the read framebuffer followed
        if !self.profile.has_read_framebuffers() {
            self.bindings.read_framebuffer = self.bindings.draw_framebuffer;
        }

        Ok(())
    }

    /// Depth and stencil bits of the draw framebuffer, the default one if none is bound.
    pub fn draw_framebuffer_bits(&self) -> (u32, u32) {
        let bound = self.bindings.draw_framebuffer
            .and_then(|raw| self.resources.framebuffers.get(raw).ok());
        match bound {
            Some(fb) => (fb.depth_bits, fb.stencil_bits),
            None => (self.capabilities.depth_bits, self.capabilities.stencil_bits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Profile;
    use crate::version::{Api, Version};

    #[test]
    fn profiles() {
        assert_eq!(Profile::from_version(&Version(Api::Gl, 4, 6)), Some(Profile::Gl3));
        assert_eq!(Profile::from_version(&Version(Api::Gl, 3, 0)), Some(Profile::Gl3));
        assert_eq!(Profile::from_version(&Version(Api::Gl, 2, 1)), Some(Profile::Gl21));
        assert_eq!(Profile::from_version(&Version(Api::Gl, 2, 0)), None);
        assert_eq!(Profile::from_version(&Version(Api::GlEs, 3, 2)), Some(Profile::Gles3));
        assert_eq!(Profile::from_version(&Version(Api::GlEs, 2, 0)), Some(Profile::Gles2));
        assert_eq!(Profile::from_version(&Version(Api::GlEs, 1, 1)), None);
    }

    #[test]
    fn read_framebuffers() {
        assert!(Profile::Gl3.has_read_framebuffers());
        assert!(Profile::Gles3.has_read_framebuffers());
        assert!(!Profile::Gl21.has_read_framebuffers());
        assert!(!Profile::Gles2.has_read_framebuffers());
    }
}
