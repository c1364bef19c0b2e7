use std::fmt;
use std::rc::Rc;

use fnv::FnvHashMap;
use log::{debug, warn};

use crate::context::CommandContext;
use crate::driver::ActiveVariable;
use crate::gl;
use crate::program::GlslType;
use crate::resource::RawHandle;
use crate::{CompileError, Error, GlObject};

/// An active attribute of a linked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramAttribute {
    name: String,
    location: i32,
    ty: GlslType,
}

impl ProgramAttribute {
    /// Name as declared in the vertex shader.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location assigned by the linker.
    #[inline]
    pub fn location(&self) -> i32 {
        self.location
    }

    /// Declared type.
    #[inline]
    pub fn ty(&self) -> GlslType {
        self.ty
    }
}

/// An active uniform of a linked program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramUniform {
    pub(crate) program: RawHandle,
    name: String,
    location: i32,
    ty: GlslType,
    size: u32,
}

impl ProgramUniform {
    /// Name as declared in the shader, without any `[0]` suffix.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location assigned by the linker.
    #[inline]
    pub fn location(&self) -> i32 {
        self.location
    }

    /// Declared type.
    #[inline]
    pub fn ty(&self) -> GlslType {
        self.ty
    }

    /// Number of array elements, 1 for non-arrays.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }
}

/// Handle to a linked program, with the attributes and uniforms that the linker kept.
#[derive(Clone)]
pub struct Program {
    pub(crate) raw: RawHandle,
    pub(crate) id: gl::types::GLuint,
    name: String,
    attributes: Rc<FnvHashMap<String, ProgramAttribute>>,
    uniforms: Rc<FnvHashMap<String, ProgramUniform>>,
}

impl Program {
    /// The name given at link time.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The active attributes, by name.
    #[inline]
    pub fn attributes(&self) -> &FnvHashMap<String, ProgramAttribute> {
        &self.attributes
    }

    /// The active uniforms, by name.
    #[inline]
    pub fn uniforms(&self) -> &FnvHashMap<String, ProgramUniform> {
        &self.uniforms
    }

    /// Returns an active attribute.
    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&ProgramAttribute> {
        self.attributes.get(name)
    }

    /// Returns an active uniform. Arrays are found by their name without `[0]`.
    #[inline]
    pub fn uniform(&self, name: &str) -> Option<&ProgramUniform> {
        self.uniforms.get(name)
    }
}

impl PartialEq for Program {
    #[inline]
    fn eq(&self, other: &Program) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Program {}

impl fmt::Debug for Program {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "Program #{} ({:?}, {} attributes, {} uniforms)", self.id, self.name,
               self.attributes.len(), self.uniforms.len())
    }
}

impl GlObject for Program {
    type Id = gl::types::GLuint;

    #[inline]
    fn get_id(&self) -> gl::types::GLuint {
        self.id
    }
}

/// Filters the reflection output of the driver. Built-ins and types that glguard doesn't model
/// are skipped.
fn reflect<'a>(program: &'a str, variables: Vec<ActiveVariable>)
               -> impl Iterator<Item = (String, i32, GlslType, u32)> + 'a
{
    variables.into_iter().filter_map(move |v| {
        if v.location < 0 || v.name.starts_with("gl_") {
            return None;
        }

        let ty = match GlslType::from_glenum(v.ty) {
            Some(ty) => ty,
            None => {
                warn!("Program {:?}: skipping `{}` of unsupported type 0x{:x}", program, v.name,
                      v.ty);
                return None;
            },
        };

        let name = match v.name.strip_suffix("[0]") {
            Some(stripped) => stripped.to_owned(),
            None => v.name,
        };

        Some((name, v.location, ty, v.size.max(1) as u32))
    })
}

/// Links the shaders into a new program and stores it. Must be called with the compiler lock.
pub(crate) fn link(ctxt: &mut CommandContext<'_>, name: &str, shaders: &[gl::types::GLuint])
                   -> Result<Program, Error>
{
    let id = ctxt.call(format_args!("glCreateProgram()"), |gl| gl.create_program())?;
    let delete = |ctxt: &mut CommandContext<'_>| {
        ctxt.call(format_args!("glDeleteProgram({})", id), |gl| gl.delete_program(id))
    };

    let linked = ctxt.created(|ctxt| {
        for &shader in shaders {
            ctxt.call(format_args!("glAttachShader({}, {})", id, shader),
                      |gl| gl.attach_shader(id, shader))?;
        }

        ctxt.call(format_args!("glLinkProgram({})", id), |gl| gl.link_program(id))?;
        let linked = ctxt.call(format_args!("glGetProgramiv({}, GL_LINK_STATUS)", id),
                               |gl| gl.program_link_status(id))?;
        if !linked {
            let log = ctxt.call(format_args!("glGetProgramInfoLog({})", id),
                                |gl| gl.program_info_log(id))?;
            return Ok(Err(log));
        }

        let attributes = ctxt.call(format_args!("glGetActiveAttrib({}, ..)", id),
                                   |gl| gl.active_attributes(id))?;
        let uniforms = ctxt.call(format_args!("glGetActiveUniform({}, ..)", id),
                                 |gl| gl.active_uniforms(id))?;
        Ok(Ok((attributes, uniforms)))
    }, delete)?;

    let (active_attributes, active_uniforms) = match linked {
        Ok(active) => active,
        Err(log) => {
            delete(&mut *ctxt)?;
            debug!("Program {:?} failed to link", name);
            return Err(CompileError { name: name.to_owned(), log }.into());
        },
    };

    let attributes = reflect(name, active_attributes)
        .map(|(name, location, ty, _)| {
            (name.clone(), ProgramAttribute { name, location, ty })
        })
        .collect::<FnvHashMap<_, _>>();

    let raw = ctxt.resources.programs.insert_with(|raw| {
        let uniforms = reflect(name, active_uniforms)
            .map(|(uniform, location, ty, size)| {
                (uniform.clone(), ProgramUniform { program: raw, name: uniform, location, ty,
                                                   size })
            })
            .collect::<FnvHashMap<_, _>>();

        Program {
            raw,
            id,
            name: name.to_owned(),
            attributes: Rc::new(attributes),
            uniforms: Rc::new(uniforms),
        }
    });

    let program = ctxt.resources.programs.get(raw)?.clone();

    debug!("Linked program {} ({:?}) with {} attributes and {} uniforms", id, name,
           program.attributes.len(), program.uniforms.len());
    Ok(program)
}
