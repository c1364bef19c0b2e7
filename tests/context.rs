use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use glguard::state::{Blend, DepthTest};
use glguard::{ContextBuilder, CreationError, Error, FakeConfig, FakeDriver, Profile, Rect,
              SoftRestrictions};

mod support;

// GL_INVALID_OPERATION
const INVALID_OPERATION: u32 = 0x0502;

/// A `Write` whose contents can be read after it has been given away.
#[derive(Clone, Default)]
struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.borrow().clone()).unwrap()
            .lines().map(|l| l.to_owned()).collect()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn profiles() {
    let expected = [Profile::Gl21, Profile::Gl3, Profile::Gles2, Profile::Gles3];
    for (config, profile) in support::all_configs().into_iter().zip(expected.iter()) {
        let (interface, _) = support::build_interface_with(config);
        assert_eq!(interface.profile(), *profile);
    }
}

#[test]
fn optional_capabilities() {
    let (gl21, _) = support::build_interface_with(FakeConfig::gl21());
    assert!(gl21.read_framebuffers().is_none());
    assert!(gl21.polygon_modes().is_some());
    assert!(gl21.logic_ops().is_some());

    let (gl3, _) = support::build_interface_with(FakeConfig::gl33());
    assert!(gl3.read_framebuffers().is_some());
    assert!(gl3.polygon_modes().is_some());

    let (gles2, _) = support::build_interface_with(FakeConfig::gles2());
    assert!(gles2.read_framebuffers().is_none());
    assert!(gles2.polygon_modes().is_none());
    assert!(gles2.logic_ops().is_none());

    let (gles3, _) = support::build_interface_with(FakeConfig::gles3());
    assert!(gles3.read_framebuffers().is_some());
    assert!(gles3.logic_ops().is_none());
    assert!(gles3.array_objects().is_some());
    assert!(gl21.array_objects().is_none());
}

#[test]
fn default_vertex_array_is_deleted_with_the_context() {
    let (interface, driver) = support::build_interface();
    let default = driver.vertex_array_binding();
    assert_ne!(default, 0);
    assert_eq!(driver.live_objects(), 1);

    drop(interface);
    assert_eq!(driver.vertex_array_binding(), 0);
    assert_eq!(driver.live_objects(), 0);
    assert_eq!(driver.statistics().calls("glDeleteVertexArrays"), 1);
}

#[test]
fn too_old() {
    let config = FakeConfig { version: "1.5 ancient".to_owned(), .. FakeConfig::gl33() };
    match ContextBuilder::new().build(FakeDriver::new(config)) {
        Err(CreationError::IncompatibleOpenGl(_)) => (),
        other => panic!("{:?}", other),
    }
}

#[test]
fn gl21_without_framebuffers() {
    let config = FakeConfig { extensions: vec![], .. FakeConfig::gl21() };
    match ContextBuilder::new().build(FakeDriver::new(config)) {
        Err(CreationError::IncompatibleOpenGl(_)) => (),
        other => panic!("{:?}", other),
    }
}

#[test]
fn unreadable_version() {
    let config = FakeConfig { version: "banana".to_owned(), .. FakeConfig::gl33() };
    assert!(ContextBuilder::new().build(FakeDriver::new(config)).is_err());
}

#[test]
fn soft_restrictions() {
    let interface = ContextBuilder::new()
        .with_soft_restrictions(SoftRestrictions {
            texture_units: Some(2),
            color_attachments: Some(1),
            draw_buffers: Some(1),
        })
        .build(FakeDriver::new(FakeConfig::gl33()))
        .unwrap();

    assert_eq!(interface.textures().texture_units().len(), 2);
    assert_eq!(interface.framebuffers().framebuffer_color_attachment_points().len(), 1);
    assert_eq!(interface.framebuffers().framebuffer_draw_buffers().len(), 1);
    assert_eq!(interface.context().capabilities().texture_units, 2);
}

#[test]
fn restrictions_above_the_driver_are_ignored() {
    let interface = ContextBuilder::new()
        .with_soft_restrictions(SoftRestrictions {
            texture_units: Some(1000),
            .. Default::default()
        })
        .build(FakeDriver::new(FakeConfig::gl33()))
        .unwrap();

    assert_eq!(interface.textures().texture_units().len(), 32);
}

#[test]
fn debug_mode_reports_driver_errors() {
    let (interface, driver) = support::build_interface();
    driver.push_error(INVALID_OPERATION);

    match interface.scissor().scissor_disable() {
        Err(Error::Driver(err)) => {
            assert_eq!(err.code, INVALID_OPERATION);
            assert_eq!(err.name(), "GL_INVALID_OPERATION");
            assert!(err.call.starts_with("glDisable"));
        },
        other => panic!("{:?}", other),
    }

    // the error has been consumed
    interface.scissor().scissor_disable().unwrap();
}

#[test]
fn errors_are_ignored_without_debug() {
    let driver = FakeDriver::new(FakeConfig::gl33());
    let interface = ContextBuilder::new().build(driver.clone()).unwrap();
    driver.push_error(INVALID_OPERATION);
    interface.scissor().scissor_disable().unwrap();
}

#[test]
fn caching_coalesces_redundant_calls() {
    let (interface, driver) = support::build_interface();
    driver.reset_statistics();

    for _ in 0 .. 5 {
        interface.viewports().viewport_set(Rect::new(0, 0, 64, 64)).unwrap();
        interface.blending().blending_enable(&Blend::alpha_blending()).unwrap();
        interface.depth_buffers().depth_buffer_test_enable(DepthTest::IfLess).unwrap();
    }

    let stats = driver.statistics();
    assert_eq!(stats.calls("glViewport"), 1);
    assert_eq!(stats.calls("glBlendFuncSeparate"), 1);
    assert_eq!(stats.calls("glDepthFunc"), 1);
    assert_eq!(stats.calls("glEnable"), 2);

    interface.viewports().viewport_set(Rect::new(0, 0, 32, 32)).unwrap();
    assert_eq!(driver.statistics().calls("glViewport"), 2);
}

#[test]
fn no_caching_calls_every_time() {
    let driver = FakeDriver::new(FakeConfig::gl33());
    let interface = ContextBuilder::new()
        .with_state_caching(false)
        .build(driver.clone())
        .unwrap();
    driver.reset_statistics();

    for _ in 0 .. 5 {
        interface.viewports().viewport_set(Rect::new(0, 0, 64, 64)).unwrap();
        interface.blending().blending_enable(&Blend::alpha_blending()).unwrap();
    }

    let stats = driver.statistics();
    assert_eq!(stats.calls("glViewport"), 5);
    assert_eq!(stats.calls("glBlendFuncSeparate"), 5);
    assert_eq!(stats.calls("glEnable"), 5);
}

#[test]
fn caching_bindings() {
    let (interface, driver) = support::build_interface();
    let buffer = support::build_array_buffer(&interface, 4);
    driver.reset_statistics();

    for _ in 0 .. 3 {
        interface.array_buffers().array_buffer_bind(&buffer).unwrap();
    }

    assert_eq!(driver.statistics().calls("glBindBuffer"), 1);
}

#[test]
fn trace_output() {
    let output = SharedOutput::default();
    let interface = ContextBuilder::new()
        .with_trace(output.clone())
        .build(FakeDriver::new(FakeConfig::gl33()))
        .unwrap();

    interface.viewports().viewport_set(Rect::new(1, 2, 3, 4)).unwrap();
    interface.scissor().scissor_disable().unwrap();

    let lines = output.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "glViewport(1, 2, 3, 4)");
    assert!(lines[1].starts_with("glDisable("));
}

#[test]
fn versions() {
    let (interface, _) = support::build_interface();
    assert_eq!(interface.version().1, 3);
    assert_eq!(interface.version().2, 3);
    assert!(interface.context().glsl_version().is_some());
}
