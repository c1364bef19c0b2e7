use glguard::driver::UniformValue;
use glguard::{Error, FakeConfig, GlObject, PreconditionError, ResourceKind};

mod support;

#[test]
fn put_values() {
    let (interface, driver) = support::build_interface();
    let program = support::build_program(&interface);
    interface.shaders().shader_activate_program(&program).unwrap();
    let uniforms = interface.uniforms();

    let brightness = program.uniform("brightness").unwrap();
    uniforms.uniform_put_float(brightness, 0.5).unwrap();
    assert_eq!(driver.uniform_value(program.get_id(), brightness.location()),
               Some(UniformValue::Float(0.5)));

    let mode = program.uniform("mode").unwrap();
    uniforms.uniform_put_int(mode, 2).unwrap();
    assert_eq!(driver.uniform_value(program.get_id(), mode.location()),
               Some(UniformValue::SignedInt(2)));

    let tints = program.uniform("tints").unwrap();
    uniforms.uniform_put_vec4f(tints, [1.0, 0.5, 0.25, 1.0]).unwrap();
    assert_eq!(driver.uniform_value(program.get_id(), tints.location()),
               Some(UniformValue::Vec4([1.0, 0.5, 0.25, 1.0])));

    let matrix = program.uniform("matrix").unwrap();
    let identity = [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0],
                    [0.0, 0.0, 0.0, 1.0]];
    uniforms.uniform_put_mat4(matrix, identity).unwrap();
    assert_eq!(driver.uniform_value(program.get_id(), matrix.location()),
               Some(UniformValue::Mat4(identity)));
}

#[test]
fn samplers_take_texture_units() {
    let (interface, driver) = support::build_interface();
    let program = support::build_program(&interface);
    interface.shaders().shader_activate_program(&program).unwrap();
    let unit = interface.textures().texture_units()[5];

    let tex = program.uniform("tex").unwrap();
    interface.uniforms().uniform_put_texture_2d_unit(tex, unit).unwrap();
    assert_eq!(driver.uniform_value(program.get_id(), tex.location()),
               Some(UniformValue::SignedInt(5)));

    match support::precondition(interface.uniforms().uniform_put_texture_cube_unit(tex, unit)) {
        PreconditionError::TypeMismatch { .. } => (),
        err => panic!("{:?}", err),
    }
}

#[test]
fn type_checking() {
    let (interface, driver) = support::build_interface();
    let program = support::build_program(&interface);
    interface.shaders().shader_activate_program(&program).unwrap();
    let uniforms = interface.uniforms();
    let brightness = program.uniform("brightness").unwrap();
    assert!(uniforms.is_type_checking());

    match support::precondition(uniforms.uniform_put_int(brightness, 1)) {
        PreconditionError::TypeMismatch { expected, given } => {
            assert_eq!(expected, "float");
            assert_eq!(given, "int");
        },
        err => panic!("{:?}", err),
    }
    assert!(support::precondition(uniforms.uniform_put_vec2f(brightness, [0.0, 0.0]))
                .to_string().contains("vec2"));

    uniforms.set_type_checking(false);
    assert!(!uniforms.is_type_checking());
    uniforms.uniform_put_int(brightness, 1).unwrap();
    assert_eq!(driver.uniform_value(program.get_id(), brightness.location()),
               Some(UniformValue::SignedInt(1)));
}

#[test]
fn activity_checking() {
    let (interface, _) = support::build_interface();
    let first = support::build_program(&interface);
    let second = support::build_program(&interface);
    let uniforms = interface.uniforms();
    let brightness = first.uniform("brightness").unwrap();

    assert_eq!(support::precondition(uniforms.uniform_put_float(brightness, 1.0)),
               PreconditionError::NoActiveProgram);

    interface.shaders().shader_activate_program(&second).unwrap();
    assert_eq!(support::precondition(uniforms.uniform_put_float(brightness, 1.0)),
               PreconditionError::ProgramNotActive);

    interface.shaders().shader_activate_program(&first).unwrap();
    uniforms.uniform_put_float(brightness, 1.0).unwrap();
}

#[test]
fn without_activity_checking_the_driver_complains() {
    let (interface, _) = support::build_interface();
    let program = support::build_program(&interface);
    let other = interface.shaders().shader_link_program(
        "other",
        &interface.shaders().shader_compile_vertex("vertex", &[
            "in vec2 position;\n",
            "void main() {\n",
            "}\n",
        ]).unwrap(),
        None,
        &interface.shaders().shader_compile_fragment("fragment", &[
            "void main() {\n",
            "}\n",
        ]).unwrap(),
    ).unwrap();

    let uniforms = interface.uniforms();
    uniforms.set_activity_checking(false);
    assert!(!uniforms.is_activity_checking());

    // `other` has no uniform at the location of `tints`
    interface.shaders().shader_activate_program(&other).unwrap();
    match uniforms.uniform_put_vec4f(program.uniform("tints").unwrap(), [0.0; 4]) {
        Err(Error::Driver(err)) => assert_eq!(err.name(), "GL_INVALID_OPERATION"),
        other => panic!("{:?}", other),
    }
}

#[test]
fn uniforms_of_deleted_programs() {
    let (interface, _) = support::build_interface();
    let program = support::build_program(&interface);
    let brightness = program.uniform("brightness").unwrap().clone();
    interface.shaders().shader_delete_program(&program).unwrap();

    assert_eq!(support::precondition(interface.uniforms().uniform_put_float(&brightness, 1.0)),
               PreconditionError::Deleted(ResourceKind::Program));
}

fn build_unsigned_program(interface: &glguard::Interface) -> glguard::program::Program {
    let shaders = interface.shaders();
    let vertex = shaders.shader_compile_vertex("vertex", &[
        "attribute vec2 position;\n",
        "void main() {\n",
        "}\n",
    ]).unwrap();
    let fragment = shaders.shader_compile_fragment("fragment", &[
        "uniform bool flag;\n",
        "uniform uint count;\n",
        "uniform uvec2 range;\n",
        "void main() {\n",
        "}\n",
    ]).unwrap();
    shaders.shader_link_program("unsigned", &vertex, None, &fragment).unwrap()
}

#[test]
fn unsigned_uniforms_without_glsl_uint() {
    for config in vec![FakeConfig::gl21(), FakeConfig::gles2()] {
        let (interface, driver) = support::build_interface_with(config);
        let program = build_unsigned_program(&interface);
        interface.shaders().shader_activate_program(&program).unwrap();
        let uniforms = interface.uniforms();

        // booleans go through `glUniform1i`
        let flag = program.uniform("flag").unwrap();
        uniforms.uniform_put_uint(flag, 7).unwrap();
        assert_eq!(driver.uniform_value(program.get_id(), flag.location()),
                   Some(UniformValue::SignedInt(1)));

        let count = program.uniform("count").unwrap();
        assert_eq!(support::precondition(uniforms.uniform_put_uint(count, 3)),
                   PreconditionError::NotSupported("unsigned integer uniforms"));
        let range = program.uniform("range").unwrap();
        assert_eq!(support::precondition(uniforms.uniform_put_vec2ui(range, [1, 2])),
                   PreconditionError::NotSupported("unsigned integer uniforms"));
        assert_eq!(driver.uniform_value(program.get_id(), count.location()), None);
    }
}

#[test]
fn unsigned_uniforms_with_glsl_uint() {
    for config in vec![FakeConfig::gl33(), FakeConfig::gles3()] {
        let (interface, driver) = support::build_interface_with(config);
        let program = build_unsigned_program(&interface);
        interface.shaders().shader_activate_program(&program).unwrap();
        let uniforms = interface.uniforms();

        let flag = program.uniform("flag").unwrap();
        uniforms.uniform_put_uint(flag, 7).unwrap();
        assert_eq!(driver.uniform_value(program.get_id(), flag.location()),
                   Some(UniformValue::UnsignedInt(7)));

        let range = program.uniform("range").unwrap();
        uniforms.uniform_put_vec2ui(range, [1, 2]).unwrap();
        assert_eq!(driver.uniform_value(program.get_id(), range.location()),
                   Some(UniformValue::UnsignedIntVec2([1, 2])));
    }
}
