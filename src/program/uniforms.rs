use log::trace;

use crate::context::Profile;
use crate::driver::UniformValue;
use crate::program::{GlShaders, GlslType, ProgramUniform};
use crate::texture::TextureUnit;
use crate::{Error, PreconditionError};

/// Writing values to the uniforms of the active program.
///
/// Every `uniform_put_*` function checks, unless disabled:
///
///  - that the program of the uniform is the active program (activity checking),
///  - that the value matches the GLSL type of the uniform (type checking).
pub trait ShaderUniforms {
    /// Enables or disables type checking. Enabled by default.
    fn set_type_checking(&self, enabled: bool);

    /// Returns true if type checking is enabled.
    fn is_type_checking(&self) -> bool;

    /// Enables or disables activity checking. Enabled by default.
    fn set_activity_checking(&self, enabled: bool);

    /// Returns true if activity checking is enabled.
    fn is_activity_checking(&self) -> bool;

    /// Writes a `float`.
    fn uniform_put_float(&self, uniform: &ProgramUniform, value: f32) -> Result<(), Error>;

    /// Writes an `int` or a `bool`.
    fn uniform_put_int(&self, uniform: &ProgramUniform, value: i32) -> Result<(), Error>;

    /// Writes a `uint` or a `bool`.
    ///
    /// OpenGL 2.1 and OpenGL ES 2 have no `uint`, only `bool` uniforms can be written there.
    fn uniform_put_uint(&self, uniform: &ProgramUniform, value: u32) -> Result<(), Error>;

    /// Writes a `vec2`.
    fn uniform_put_vec2f(&self, uniform: &ProgramUniform, value: [f32; 2]) -> Result<(), Error>;

    /// Writes a `vec3`.
    fn uniform_put_vec3f(&self, uniform: &ProgramUniform, value: [f32; 3]) -> Result<(), Error>;

    /// Writes a `vec4`.
    fn uniform_put_vec4f(&self, uniform: &ProgramUniform, value: [f32; 4]) -> Result<(), Error>;

    /// Writes an `ivec2`.
    fn uniform_put_vec2i(&self, uniform: &ProgramUniform, value: [i32; 2]) -> Result<(), Error>;

    /// Writes an `ivec3`.
    fn uniform_put_vec3i(&self, uniform: &ProgramUniform, value: [i32; 3]) -> Result<(), Error>;

    /// Writes an `ivec4`.
    fn uniform_put_vec4i(&self, uniform: &ProgramUniform, value: [i32; 4]) -> Result<(), Error>;

    /// Writes a `uvec2`.
    fn uniform_put_vec2ui(&self, uniform: &ProgramUniform, value: [u32; 2])
                          -> Result<(), Error>;

    /// Writes a `uvec3`.
    fn uniform_put_vec3ui(&self, uniform: &ProgramUniform, value: [u32; 3])
                          -> Result<(), Error>;

    /// Writes a `uvec4`.
    fn uniform_put_vec4ui(&self, uniform: &ProgramUniform, value: [u32; 4])
                          -> Result<(), Error>;

    /// Writes a `mat3`, given as columns.
    fn uniform_put_mat3(&self, uniform: &ProgramUniform, value: [[f32; 3]; 3])
                        -> Result<(), Error>;

    /// Writes a `mat4`, given as columns.
    fn uniform_put_mat4(&self, uniform: &ProgramUniform, value: [[f32; 4]; 4])
                        -> Result<(), Error>;

    /// Makes a `sampler2D` or `sampler2DShadow` read from a texture unit.
    fn uniform_put_texture_2d_unit(&self, uniform: &ProgramUniform, unit: TextureUnit)
                                   -> Result<(), Error>;

    /// Makes a `samplerCube` read from a texture unit.
    fn uniform_put_texture_cube_unit(&self, uniform: &ProgramUniform, unit: TextureUnit)
                                     -> Result<(), Error>;
}

impl GlShaders {
    fn put(&self, uniform: &ProgramUniform, accepted: &[GlslType], given: &str,
           value: UniformValue) -> Result<(), Error>
    {
        let mut ctxt = self.context.make_current();
        ctxt.resources.programs.get(uniform.program)?;

        if ctxt.config.uniform_activity_checking.get() {
            match ctxt.bindings.program {
                None => return Err(PreconditionError::NoActiveProgram.into()),
                Some(active) if active != uniform.program =>
                    return Err(PreconditionError::ProgramNotActive.into()),
                Some(_) => (),
            }
        }

        if ctxt.config.uniform_type_checking.get() && !accepted.contains(&uniform.ty()) {
            return Err(PreconditionError::TypeMismatch {
                expected: uniform.ty().to_string(),
                given: given.to_owned(),
            }.into());
        }

        let value = match value {
            v if !v.is_unsigned() || !matches!(ctxt.profile, Profile::Gl21 | Profile::Gles2) => v,
            // booleans can always be written with `glUniform1i`
            UniformValue::UnsignedInt(v) if uniform.ty() == GlslType::Bool =>
                UniformValue::SignedInt((v != 0) as i32),
            _ => return Err(PreconditionError::NotSupported("unsigned integer uniforms").into()),
        };

        let location = uniform.location();
        trace!("Setting uniform {:?} ({}) to {:?}", uniform.name(), location, value);
        ctxt.call(format_args!("glUniform({}, {:?})", location, value),
                  |gl| gl.uniform(location, value))
    }
}

impl ShaderUniforms for GlShaders {
    fn set_type_checking(&self, enabled: bool) {
        self.context.make_current().config.uniform_type_checking.set(enabled);
    }

    fn is_type_checking(&self) -> bool {
        self.context.make_current().config.uniform_type_checking.get()
    }

    fn set_activity_checking(&self, enabled: bool) {
        self.context.make_current().config.uniform_activity_checking.set(enabled);
    }

    fn is_activity_checking(&self) -> bool {
        self.context.make_current().config.uniform_activity_checking.get()
    }

    fn uniform_put_float(&self, uniform: &ProgramUniform, value: f32) -> Result<(), Error> {
        self.put(uniform, &[GlslType::Float], "float", UniformValue::Float(value))
    }

    fn uniform_put_int(&self, uniform: &ProgramUniform, value: i32) -> Result<(), Error> {
        self.put(uniform, &[GlslType::Int, GlslType::Bool], "int",
                 UniformValue::SignedInt(value))
    }

    fn uniform_put_uint(&self, uniform: &ProgramUniform, value: u32) -> Result<(), Error> {
        self.put(uniform, &[GlslType::UnsignedInt, GlslType::Bool], "uint",
                 UniformValue::UnsignedInt(value))
    }

    fn uniform_put_vec2f(&self, uniform: &ProgramUniform, value: [f32; 2]) -> Result<(), Error> {
        self.put(uniform, &[GlslType::FloatVec2], "vec2", UniformValue::Vec2(value))
    }

    fn uniform_put_vec3f(&self, uniform: &ProgramUniform, value: [f32; 3]) -> Result<(), Error> {
        self.put(uniform, &[GlslType::FloatVec3], "vec3", UniformValue::Vec3(value))
    }

    fn uniform_put_vec4f(&self, uniform: &ProgramUniform, value: [f32; 4]) -> Result<(), Error> {
        self.put(uniform, &[GlslType::FloatVec4], "vec4", UniformValue::Vec4(value))
    }

    fn uniform_put_vec2i(&self, uniform: &ProgramUniform, value: [i32; 2]) -> Result<(), Error> {
        self.put(uniform, &[GlslType::IntVec2, GlslType::BoolVec2], "ivec2",
                 UniformValue::IntVec2(value))
    }

    fn uniform_put_vec3i(&self, uniform: &ProgramUniform, value: [i32; 3]) -> Result<(), Error> {
        self.put(uniform, &[GlslType::IntVec3, GlslType::BoolVec3], "ivec3",
                 UniformValue::IntVec3(value))
    }

    fn uniform_put_vec4i(&self, uniform: &ProgramUniform, value: [i32; 4]) -> Result<(), Error> {
        self.put(uniform, &[GlslType::IntVec4, GlslType::BoolVec4], "ivec4",
                 UniformValue::IntVec4(value))
    }

    fn uniform_put_vec2ui(&self, uniform: &ProgramUniform, value: [u32; 2])
                          -> Result<(), Error>
    {
        self.put(uniform, &[GlslType::UnsignedIntVec2], "uvec2",
                 UniformValue::UnsignedIntVec2(value))
    }

    fn uniform_put_vec3ui(&self, uniform: &ProgramUniform, value: [u32; 3])
                          -> Result<(), Error>
    {
        self.put(uniform, &[GlslType::UnsignedIntVec3], "uvec3",
                 UniformValue::UnsignedIntVec3(value))
    }

    fn uniform_put_vec4ui(&self, uniform: &ProgramUniform, value: [u32; 4])
                          -> Result<(), Error>
    {
        self.put(uniform, &[GlslType::UnsignedIntVec4], "uvec4",
                 UniformValue::UnsignedIntVec4(value))
    }

    fn uniform_put_mat3(&self, uniform: &ProgramUniform, value: [[f32; 3]; 3])
                        -> Result<(), Error>
    {
        self.put(uniform, &[GlslType::FloatMat3], "mat3", UniformValue::Mat3(value))
    }

    fn uniform_put_mat4(&self, uniform: &ProgramUniform, value: [[f32; 4]; 4])
                        -> Result<(), Error>
    {
        self.put(uniform, &[GlslType::FloatMat4], "mat4", UniformValue::Mat4(value))
    }

    fn uniform_put_texture_2d_unit(&self, uniform: &ProgramUniform, unit: TextureUnit)
                                   -> Result<(), Error>
    {
        self.put(uniform, &[GlslType::Sampler2D, GlslType::Sampler2DShadow], "sampler2D",
                 UniformValue::SignedInt(unit.index() as i32))
    }

    fn uniform_put_texture_cube_unit(&self, uniform: &ProgramUniform, unit: TextureUnit)
                                     -> Result<(), Error>
    {
        self.put(uniform, &[GlslType::SamplerCube], "samplerCube",
                 UniformValue::SignedInt(unit.index() as i32))
    }
}
