use std::fmt;

use log::debug;

use crate::context::CommandContext;
use crate::gl;
use crate::program::{program, GlShaders, Program, COMPILER_GLOBAL_LOCK};
use crate::resource::{RawHandle, Record};
use crate::version::{Api, Version};
use crate::{CompileError, Error, GlObject, PreconditionError};

macro_rules! shader_handle {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Clone)]
        pub struct $name {
            pub(crate) raw: RawHandle,
            pub(crate) id: gl::types::GLuint,
            name: String,
        }

        impl $name {
            /// The name given at compilation.
            #[inline]
            pub fn name(&self) -> &str {
                &self.name
            }
        }

        impl PartialEq for $name {
            #[inline]
            fn eq(&self, other: &$name) -> bool {
                self.raw == other.raw
            }
        }

        impl Eq for $name {}

        impl fmt::Debug for $name {
            fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(fmt, "{} #{} ({:?})", stringify!($name), self.id, self.name)
            }
        }

        impl GlObject for $name {
            type Id = gl::types::GLuint;

            #[inline]
            fn get_id(&self) -> gl::types::GLuint {
                self.id
            }
        }
    };
}

shader_handle! {
    /// A compiled vertex shader.
    VertexShader
}

shader_handle! {
    /// A compiled geometry shader.
    GeometryShader
}

shader_handle! {
    /// A compiled fragment shader.
    FragmentShader
}

/// Compilation, linking and activation of programs.
pub trait Shaders {
    /// Compiles a vertex shader. Each line must end with `\n`.
    fn shader_compile_vertex(&self, name: &str, lines: &[&str]) -> Result<VertexShader, Error>;

    /// Compiles a geometry shader. Each line must end with `\n`.
    ///
    /// Geometry shaders are only available with OpenGL 3.2 and above.
    fn shader_compile_geometry(&self, name: &str, lines: &[&str])
                               -> Result<GeometryShader, Error>;

    /// Compiles a fragment shader. Each line must end with `\n`.
    fn shader_compile_fragment(&self, name: &str, lines: &[&str])
                               -> Result<FragmentShader, Error>;

    /// Links a program. The shaders can be deleted afterwards.
    fn shader_link_program(&self, name: &str, vertex: &VertexShader,
                           geometry: Option<&GeometryShader>, fragment: &FragmentShader)
                           -> Result<Program, Error>;

    /// Makes the program active.
    fn shader_activate_program(&self, program: &Program) -> Result<(), Error>;

    /// Deactivates the active program, if any.
    fn shader_deactivate_program(&self) -> Result<(), Error>;

    /// Returns the active program.
    fn shader_activated_program(&self) -> Option<Program>;

    /// Returns true if the program is active.
    fn shader_is_activated(&self, program: &Program) -> Result<bool, Error>;

    /// Deletes a vertex shader. Programs linked with it are unaffected.
    fn shader_delete_vertex(&self, shader: &VertexShader) -> Result<(), Error>;

    /// Deletes a geometry shader. Programs linked with it are unaffected.
    fn shader_delete_geometry(&self, shader: &GeometryShader) -> Result<(), Error>;

    /// Deletes a fragment shader. Programs linked with it are unaffected.
    fn shader_delete_fragment(&self, shader: &FragmentShader) -> Result<(), Error>;

    /// Deletes a program, deactivating it first if it is active.
    fn shader_delete_program(&self, program: &Program) -> Result<(), Error>;
}

/// Checks the source, then compiles it. Returns the name of the compiled shader.
fn compile(ctxt: &mut CommandContext<'_>, ty: gl::types::GLenum, name: &str, lines: &[&str])
           -> Result<gl::types::GLuint, Error>
{
    if let Some(line) = lines.iter().position(|l| !l.ends_with('\n')) {
        return Err(PreconditionError::MalformedSource { line }.into());
    }

    if lines.iter().all(|l| l.trim().is_empty()) {
        return Err(CompileError {
            name: name.to_owned(),
            log: "the source is empty".to_owned(),
        }.into());
    }

    let _lock = COMPILER_GLOBAL_LOCK.lock();

    let id = ctxt.call(format_args!("glCreateShader(0x{:x})", ty), |gl| gl.create_shader(ty))?;
    let log = ctxt.created(|ctxt| {
        ctxt.call(format_args!("glShaderSource({}, {} lines)", id, lines.len()),
                  |gl| gl.shader_source(id, lines))?;
        ctxt.call(format_args!("glCompileShader({})", id), |gl| gl.compile_shader(id))?;

        let compiled = ctxt.call(format_args!("glGetShaderiv({}, GL_COMPILE_STATUS)", id),
                                 |gl| gl.shader_compile_status(id))?;
        if compiled {
            return Ok(None);
        }

        ctxt.call(format_args!("glGetShaderInfoLog({})", id), |gl| gl.shader_info_log(id))
            .map(Some)
    }, |ctxt| delete_shader(ctxt, id))?;

    if let Some(log) = log {
        delete_shader(ctxt, id)?;
        debug!("Shader {:?} failed to compile", name);
        return Err(CompileError { name: name.to_owned(), log }.into());
    }

    debug!("Compiled shader {} ({:?})", id, name);
    Ok(id)
}

fn delete_shader(ctxt: &mut CommandContext<'_>, id: gl::types::GLuint) -> Result<(), Error> {
    debug!("Deleting shader {}", id);
    ctxt.call(format_args!("glDeleteShader({})", id), |gl| gl.delete_shader(id))
}

impl Shaders for GlShaders {
    fn shader_compile_vertex(&self, name: &str, lines: &[&str]) -> Result<VertexShader, Error> {
        let mut ctxt = self.context.make_current();
        let id = compile(&mut ctxt, gl::VERTEX_SHADER, name, lines)?;
        let raw = ctxt.resources.vertex_shaders.insert(Record::new(id, name.to_owned()));
        Ok(VertexShader { raw, id, name: name.to_owned() })
    }

    fn shader_compile_geometry(&self, name: &str, lines: &[&str])
                               -> Result<GeometryShader, Error>
    {
        let mut ctxt = self.context.make_current();
        // false for every OpenGL ES version
        let supported = *ctxt.version >= Version(Api::Gl, 3, 2);
        if !supported {
            return Err(PreconditionError::NotSupported("geometry shaders").into());
        }

        let id = compile(&mut ctxt, gl::GEOMETRY_SHADER, name, lines)?;
        let raw = ctxt.resources.geometry_shaders.insert(Record::new(id, name.to_owned()));
        Ok(GeometryShader { raw, id, name: name.to_owned() })
    }

    fn shader_compile_fragment(&self, name: &str, lines: &[&str])
                               -> Result<FragmentShader, Error>
    {
        let mut ctxt = self.context.make_current();
        let id = compile(&mut ctxt, gl::FRAGMENT_SHADER, name, lines)?;
        let raw = ctxt.resources.fragment_shaders.insert(Record::new(id, name.to_owned()));
        Ok(FragmentShader { raw, id, name: name.to_owned() })
    }

    fn shader_link_program(&self, name: &str, vertex: &VertexShader,
                           geometry: Option<&GeometryShader>, fragment: &FragmentShader)
                           -> Result<Program, Error>
    {
        let mut ctxt = self.context.make_current();
        ctxt.resources.vertex_shaders.get(vertex.raw)?;
        ctxt.resources.fragment_shaders.get(fragment.raw)?;
        if let Some(geometry) = geometry {
            ctxt.resources.geometry_shaders.get(geometry.raw)?;
        }

        let mut shaders = vec![vertex.id, fragment.id];
        shaders.extend(geometry.map(|g| g.id));

        let _lock = COMPILER_GLOBAL_LOCK.lock();
        program::link(&mut ctxt, name, &shaders)
    }

    fn shader_activate_program(&self, program: &Program) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.programs.get(program.raw)?;
        ctxt.use_program(program.id)?;
        ctxt.bindings.program = Some(program.raw);
        Ok(())
    }

    fn shader_deactivate_program(&self) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.use_program(0)?;
        ctxt.bindings.program = None;
        Ok(())
    }

    fn shader_activated_program(&self) -> Option<Program> {
        let ctxt = self.context.make_current();
        let program = ctxt.bindings.program
            .and_then(|raw| ctxt.resources.programs.get(raw).ok())
            .cloned();
        program
    }

    fn shader_is_activated(&self, program: &Program) -> Result<bool, Error> {
        let ctxt = self.context.make_current();
        ctxt.resources.programs.get(program.raw)?;
        Ok(ctxt.bindings.program == Some(program.raw))
    }

    fn shader_delete_vertex(&self, shader: &VertexShader) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.vertex_shaders.remove(shader.raw)?;
        delete_shader(&mut ctxt, shader.id)
    }

    fn shader_delete_geometry(&self, shader: &GeometryShader) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.geometry_shaders.remove(shader.raw)?;
        delete_shader(&mut ctxt, shader.id)
    }

    fn shader_delete_fragment(&self, shader: &FragmentShader) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.fragment_shaders.remove(shader.raw)?;
        delete_shader(&mut ctxt, shader.id)
    }

    fn shader_delete_program(&self, program: &Program) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.programs.remove(program.raw)?;
        if ctxt.bindings.program == Some(program.raw) {
            ctxt.use_program(0)?;
            ctxt.bindings.program = None;
        }

        debug!("Deleting program {} ({:?})", program.id, program.name());
        let id = program.id;
        ctxt.call(format_args!("glDeleteProgram({})", id), |gl| gl.delete_program(id))
    }
}

