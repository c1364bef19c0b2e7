/*!
Shaders, programs and uniforms.

Shaders are compiled from a list of lines, each ending with `\n`. A program is linked from a
vertex shader, an optional geometry shader and a fragment shader. Linking queries the active
attributes and uniforms, so that the resulting `Program` knows their names, locations and
types:

```no_run
# use glguard::{ContextBuilder, FakeDriver, FakeConfig};
# let interface = ContextBuilder::new().build(FakeDriver::new(FakeConfig::gl33())).unwrap();
let shaders = interface.shaders();

let vertex = shaders.shader_compile_vertex("vertex", &[
    "#version 330\n",
    "in vec2 position;\n",
    "void main() { gl_Position = vec4(position, 0.0, 1.0); }\n",
]).unwrap();

let fragment = shaders.shader_compile_fragment("fragment", &[
    "#version 330\n",
    "uniform vec4 color;\n",
    "out vec4 out_color;\n",
    "void main() { out_color = color; }\n",
]).unwrap();

let program = shaders.shader_link_program("flat", &vertex, None, &fragment).unwrap();
shaders.shader_activate_program(&program).unwrap();

let color = program.uniform("color").unwrap();
interface.uniforms().uniform_put_vec4f(color, [1.0, 0.0, 0.0, 1.0]).unwrap();
```

Writing a uniform checks by default that the program of the uniform is active, and that the
type of the value matches the declared type. Both checks can be turned off.

*/
use std::fmt;
use std::rc::Rc;
use std::sync::Mutex;

use lazy_static::lazy_static;

use crate::context::Context;
use crate::gl;

pub use self::program::{Program, ProgramAttribute, ProgramUniform};
pub use self::shader::{FragmentShader, GeometryShader, Shaders, VertexShader};
pub use self::uniforms::ShaderUniforms;

mod program;
mod shader;
mod uniforms;

// Some drivers crash when two contexts compile or link at the same time.
lazy_static! {
    static ref COMPILER_GLOBAL_LOCK: Mutex<()> = Mutex::new(());
}

/// The type of an attribute or a uniform, as declared in GLSL.
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GlslType {
    Float,
    FloatVec2,
    FloatVec3,
    FloatVec4,
    Int,
    IntVec2,
    IntVec3,
    IntVec4,
    UnsignedInt,
    UnsignedIntVec2,
    UnsignedIntVec3,
    UnsignedIntVec4,
    Bool,
    BoolVec2,
    BoolVec3,
    BoolVec4,
    FloatMat2,
    FloatMat3,
    FloatMat4,
    Sampler2D,
    Sampler2DShadow,
    SamplerCube,
}

impl GlslType {
    /// Returns the type corresponding to a `GL_FLOAT_VEC3`-like enum.
    pub fn from_glenum(value: gl::types::GLenum) -> Option<GlslType> {
        Some(match value {
            gl::FLOAT => GlslType::Float,
            gl::FLOAT_VEC2 => GlslType::FloatVec2,
            gl::FLOAT_VEC3 => GlslType::FloatVec3,
            gl::FLOAT_VEC4 => GlslType::FloatVec4,
            gl::INT => GlslType::Int,
            gl::INT_VEC2 => GlslType::IntVec2,
            gl::INT_VEC3 => GlslType::IntVec3,
            gl::INT_VEC4 => GlslType::IntVec4,
            gl::UNSIGNED_INT => GlslType::UnsignedInt,
            gl::UNSIGNED_INT_VEC2 => GlslType::UnsignedIntVec2,
            gl::UNSIGNED_INT_VEC3 => GlslType::UnsignedIntVec3,
            gl::UNSIGNED_INT_VEC4 => GlslType::UnsignedIntVec4,
            gl::BOOL => GlslType::Bool,
            gl::BOOL_VEC2 => GlslType::BoolVec2,
            gl::BOOL_VEC3 => GlslType::BoolVec3,
            gl::BOOL_VEC4 => GlslType::BoolVec4,
            gl::FLOAT_MAT2 => GlslType::FloatMat2,
            gl::FLOAT_MAT3 => GlslType::FloatMat3,
            gl::FLOAT_MAT4 => GlslType::FloatMat4,
            gl::SAMPLER_2D => GlslType::Sampler2D,
            gl::SAMPLER_2D_SHADOW => GlslType::Sampler2DShadow,
            gl::SAMPLER_CUBE => GlslType::SamplerCube,
            _ => return None,
        })
    }

    /// Number of components of a floating-point vertex attribute of this type.
    ///
    /// Returns `None` for types that can't be fed from a float array attribute.
    pub fn attribute_components(&self) -> Option<u8> {
        match *self {
            GlslType::Float => Some(1),
            GlslType::FloatVec2 => Some(2),
            GlslType::FloatVec3 => Some(3),
            GlslType::FloatVec4 => Some(4),
            _ => None,
        }
    }

    /// Returns true for signed and unsigned integer scalars and vectors.
    pub fn is_integral(&self) -> bool {
        use self::GlslType::*;
        matches!(*self, Int | IntVec2 | IntVec3 | IntVec4 | UnsignedInt | UnsignedIntVec2 |
                        UnsignedIntVec3 | UnsignedIntVec4)
    }

    /// Returns true for sampler types.
    #[inline]
    pub fn is_sampler(&self) -> bool {
        matches!(*self, GlslType::Sampler2D | GlslType::Sampler2DShadow | GlslType::SamplerCube)
    }
}

impl fmt::Display for GlslType {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            GlslType::Float => "float",
            GlslType::FloatVec2 => "vec2",
            GlslType::FloatVec3 => "vec3",
            GlslType::FloatVec4 => "vec4",
            GlslType::Int => "int",
            GlslType::IntVec2 => "ivec2",
            GlslType::IntVec3 => "ivec3",
            GlslType::IntVec4 => "ivec4",
            GlslType::UnsignedInt => "uint",
            GlslType::UnsignedIntVec2 => "uvec2",
            GlslType::UnsignedIntVec3 => "uvec3",
            GlslType::UnsignedIntVec4 => "uvec4",
            GlslType::Bool => "bool",
            GlslType::BoolVec2 => "bvec2",
            GlslType::BoolVec3 => "bvec3",
            GlslType::BoolVec4 => "bvec4",
            GlslType::FloatMat2 => "mat2",
            GlslType::FloatMat3 => "mat3",
            GlslType::FloatMat4 => "mat4",
            GlslType::Sampler2D => "sampler2D",
            GlslType::Sampler2DShadow => "sampler2DShadow",
            GlslType::SamplerCube => "samplerCube",
        };

        fmt.write_str(name)
    }
}

/// Implements `Shaders` and `ShaderUniforms`.
pub(crate) struct GlShaders {
    context: Rc<Context>,
}

impl GlShaders {
    pub fn new(context: Rc<Context>) -> GlShaders {
        GlShaders { context }
    }
}
