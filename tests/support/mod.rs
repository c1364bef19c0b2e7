/*!
Test supports module.

*/

#![allow(dead_code)]

use glguard::buffer::{ArrayAttribute, ArrayBuffer, ArrayDescriptor, ScalarType, UsageHint};
use glguard::program::Program;
use glguard::texture::{Texture2D, TextureFilterMag, TextureFilterMin, TextureFormat, TextureWrap};
use glguard::{ContextBuilder, Error, FakeConfig, FakeDriver, Interface, PreconditionError};

/// Builds an interface over a fake OpenGL 3.3 driver, with debugging enabled.
pub fn build_interface() -> (Interface, FakeDriver) {
    build_interface_with(FakeConfig::gl33())
}

/// Builds an interface over a fake driver, with debugging enabled.
pub fn build_interface_with(config: FakeConfig) -> (Interface, FakeDriver) {
    let driver = FakeDriver::new(config);
    let interface = ContextBuilder::new()
        .with_debug(true)
        .build(driver.clone())
        .unwrap();
    (interface, driver)
}

/// Every fake configuration, one per profile.
pub fn all_configs() -> Vec<FakeConfig> {
    vec![FakeConfig::gl21(), FakeConfig::gl33(), FakeConfig::gles2(), FakeConfig::gles3()]
}

/// Returns the precondition that the operation violated, and panics for any other outcome.
pub fn precondition<T: std::fmt::Debug>(result: Result<T, Error>) -> PreconditionError {
    match result {
        Err(Error::Precondition(err)) => err,
        other => panic!("expected a precondition error, got {:?}", other),
    }
}

/// A buffer of `elements` vertices with a `position: vec3` and a `uv: vec2` attribute.
pub fn build_array_buffer(interface: &Interface, elements: usize) -> ArrayBuffer {
    let descriptor = ArrayDescriptor::new(vec![
        ArrayAttribute::new("position", ScalarType::Float, 3),
        ArrayAttribute::new("uv", ScalarType::Float, 2),
    ]).unwrap();

    interface.array_buffers()
        .array_buffer_allocate(elements, descriptor, UsageHint::StaticDraw)
        .unwrap()
}

/// A 4x4 RGBA texture.
pub fn build_texture_2d(interface: &Interface) -> Texture2D {
    interface.textures_2d()
        .texture_2d_allocate(4, 4, TextureFormat::RGBA8, TextureWrap::Repeat,
                             TextureWrap::Repeat, TextureFilterMin::Nearest,
                             TextureFilterMag::Nearest)
        .unwrap()
}

pub const VERTEX_SOURCE: &[&str] = &[
    "#version 330\n",
    "in vec3 position;\n",
    "in vec2 uv;\n",
    "uniform mat4 matrix;\n",
    "out vec2 v_uv;\n",
    "void main() {\n",
    "    v_uv = uv;\n",
    "    gl_Position = matrix * vec4(position, 1.0);\n",
    "}\n",
];

pub const FRAGMENT_SOURCE: &[&str] = &[
    "#version 330\n",
    "in vec2 v_uv;\n",
    "uniform sampler2D tex;\n",
    "uniform float brightness;\n",
    "uniform int mode;\n",
    "uniform vec4 tints[3];\n",
    "out vec4 color;\n",
    "void main() {\n",
    "    color = texture(tex, v_uv) * brightness * tints[mode];\n",
    "}\n",
];

/// Compiles and links the program made of `VERTEX_SOURCE` and `FRAGMENT_SOURCE`.
pub fn build_program(interface: &Interface) -> Program {
    let shaders = interface.shaders();
    let vertex = shaders.shader_compile_vertex("vertex", VERTEX_SOURCE).unwrap();
    let fragment = shaders.shader_compile_fragment("fragment", FRAGMENT_SOURCE).unwrap();
    shaders.shader_link_program("program", &vertex, None, &fragment).unwrap()
}
