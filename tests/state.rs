use glguard::framebuffer::FramebufferBuilder;
use glguard::render_buffer::RenderbufferFormat;
use glguard::state::{Blend, BlendingFunction, ClearSpecification, DepthTest, FaceSelection,
                     FaceWindingOrder, LinearBlendingFactor, LogicOp, PolygonMode,
                     StencilOperation, StencilTest};
use glguard::{FakeConfig, PreconditionError, Rect};

mod support;

// GL_BLEND, GL_DEPTH_TEST, GL_STENCIL_TEST, GL_SCISSOR_TEST, GL_CULL_FACE, GL_COLOR_LOGIC_OP
const BLEND: u32 = 0x0BE2;
const DEPTH_TEST: u32 = 0x0B71;
const STENCIL_TEST: u32 = 0x0B90;
const SCISSOR_TEST: u32 = 0x0C11;
const CULL_FACE: u32 = 0x0B44;
const COLOR_LOGIC_OP: u32 = 0x0BF2;

#[test]
fn blending() {
    let (interface, driver) = support::build_interface();
    let blending = interface.blending();
    assert!(!blending.blending_is_enabled());
    assert_eq!(blending.blending_current(), None);

    let blend = Blend::alpha_blending();
    blending.blending_enable(&blend).unwrap();
    assert!(blending.blending_is_enabled());
    assert_eq!(blending.blending_current(), Some(blend));
    assert!(driver.is_enabled(BLEND));

    blending.blending_disable().unwrap();
    assert!(!blending.blending_is_enabled());
    assert!(!driver.is_enabled(BLEND));
}

#[test]
fn blend_color_only_for_constant_factors() {
    let (interface, driver) = support::build_interface();
    let blending = interface.blending();
    driver.reset_statistics();

    blending.blending_enable(&Blend::alpha_blending()).unwrap();
    assert_eq!(driver.statistics().calls("glBlendColor"), 0);

    let constant = Blend {
        color: BlendingFunction::Addition {
            source: LinearBlendingFactor::ConstantColor,
            destination: LinearBlendingFactor::One,
        },
        constant_value: (0.5, 0.5, 0.5, 1.0),
        .. Blend::alpha_blending()
    };
    blending.blending_enable(&constant).unwrap();
    assert_eq!(driver.statistics().calls("glBlendColor"), 1);
}

#[test]
fn min_max_blending_needs_gl3() {
    let min = Blend { color: BlendingFunction::Min, .. Blend::alpha_blending() };

    for config in vec![FakeConfig::gl21(), FakeConfig::gles2()] {
        let (interface, driver) = support::build_interface_with(config);
        match support::precondition(interface.blending().blending_enable(&min)) {
            PreconditionError::NotSupported(_) => (),
            err => panic!("{:?}", err),
        }
        assert!(!interface.blending().blending_is_enabled());
        assert!(!driver.is_enabled(BLEND));
    }

    for config in vec![FakeConfig::gl33(), FakeConfig::gles3()] {
        let (interface, _) = support::build_interface_with(config);
        interface.blending().blending_enable(&min).unwrap();
    }
}

#[test]
fn depth_buffer() {
    let (interface, driver) = support::build_interface();
    let depth = interface.depth_buffers();
    assert_eq!(depth.depth_buffer_get_bits(), 24);
    assert!(!depth.depth_buffer_test_is_enabled().unwrap());

    depth.depth_buffer_test_enable(DepthTest::IfLessOrEqual).unwrap();
    assert!(depth.depth_buffer_test_is_enabled().unwrap());
    assert!(driver.is_enabled(DEPTH_TEST));

    depth.depth_buffer_write_disable().unwrap();
    assert!(!depth.depth_buffer_write_is_enabled().unwrap());
    depth.depth_buffer_write_enable().unwrap();
    assert!(depth.depth_buffer_write_is_enabled().unwrap());

    depth.depth_buffer_clear(1.0).unwrap();
    depth.depth_buffer_test_disable().unwrap();
    assert!(!driver.is_enabled(DEPTH_TEST));
}

#[test]
fn stencil_buffer() {
    let (interface, driver) = support::build_interface();
    let stencil = interface.stencil_buffers();
    assert_eq!(stencil.stencil_buffer_get_bits(), 8);

    stencil.stencil_buffer_enable().unwrap();
    assert!(stencil.stencil_buffer_is_enabled().unwrap());
    assert!(driver.is_enabled(STENCIL_TEST));

    driver.reset_statistics();
    stencil.stencil_buffer_function(FaceSelection::FrontAndBack, StencilTest::IfEqual, 1, 0xff)
           .unwrap();
    stencil.stencil_buffer_function(FaceSelection::Front, StencilTest::IfEqual, 1, 0xff)
           .unwrap();
    assert_eq!(driver.statistics().calls("glStencilFuncSeparate"), 1);

    stencil.stencil_buffer_function(FaceSelection::Back, StencilTest::AlwaysPass, 0, 0xff)
           .unwrap();
    assert_eq!(driver.statistics().calls("glStencilFuncSeparate"), 2);

    stencil.stencil_buffer_operation(FaceSelection::FrontAndBack, StencilOperation::Keep,
                                     StencilOperation::Keep, StencilOperation::Replace)
           .unwrap();
    stencil.stencil_buffer_mask(FaceSelection::Front, 0x0f).unwrap();
    stencil.stencil_buffer_clear(0).unwrap();

    stencil.stencil_buffer_disable().unwrap();
    assert!(!driver.is_enabled(STENCIL_TEST));
}

#[test]
fn gles2_default_framebuffer_has_no_stencil() {
    let (interface, driver) = support::build_interface_with(FakeConfig::gles2());
    let stencil = interface.stencil_buffers();
    assert_eq!(stencil.stencil_buffer_get_bits(), 0);
    assert_eq!(interface.depth_buffers().depth_buffer_get_bits(), 16);

    driver.reset_statistics();
    assert_eq!(support::precondition(stencil.stencil_buffer_enable()),
               PreconditionError::NoStencilBuffer);
    assert_eq!(support::precondition(stencil.stencil_buffer_is_enabled()),
               PreconditionError::NoStencilBuffer);
    assert_eq!(support::precondition(stencil.stencil_buffer_mask(FaceSelection::Back, 1)),
               PreconditionError::NoStencilBuffer);
    assert_eq!(driver.statistics().calls("glEnable"), 0);

    interface.depth_buffers().depth_buffer_test_enable(DepthTest::IfLess).unwrap();
}

#[test]
fn depth_follows_the_draw_framebuffer() {
    let (interface, _) = support::build_interface();
    let framebuffers = interface.framebuffers();
    let color = interface.renderbuffers()
        .renderbuffer_allocate(RenderbufferFormat::RGBA8, 8, 8).unwrap();
    let depth = interface.renderbuffers()
        .renderbuffer_allocate(RenderbufferFormat::Depth16, 8, 8).unwrap();

    let mut builder = FramebufferBuilder::new();
    builder.attach_color_renderbuffer(framebuffers.framebuffer_color_attachment_points()[0],
                                      &color);
    let without_depth = framebuffers.framebuffer_allocate(&builder).unwrap();
    builder.attach_depth_renderbuffer(&depth);
    let with_depth = framebuffers.framebuffer_allocate(&builder).unwrap();

    framebuffers.framebuffer_draw_bind(&without_depth).unwrap();
    assert_eq!(interface.depth_buffers().depth_buffer_get_bits(), 0);
    assert_eq!(support::precondition(interface.depth_buffers().depth_buffer_clear(1.0)),
               PreconditionError::NoDepthBuffer);
    assert_eq!(support::precondition(interface.stencil_buffers().stencil_buffer_enable()),
               PreconditionError::NoStencilBuffer);

    framebuffers.framebuffer_draw_bind(&with_depth).unwrap();
    assert_eq!(interface.depth_buffers().depth_buffer_get_bits(), 16);
    interface.depth_buffers().depth_buffer_clear(1.0).unwrap();

    framebuffers.framebuffer_draw_unbind().unwrap();
    assert_eq!(interface.depth_buffers().depth_buffer_get_bits(), 24);
}

#[test]
fn scissor_and_viewport() {
    let (interface, driver) = support::build_interface();
    let scissor = interface.scissor();
    let viewports = interface.viewports();

    assert!(!scissor.scissor_is_enabled());
    scissor.scissor_enable(Rect::new(2, 4, 10, 20)).unwrap();
    assert!(scissor.scissor_is_enabled());
    assert!(driver.is_enabled(SCISSOR_TEST));
    scissor.scissor_disable().unwrap();
    assert!(!driver.is_enabled(SCISSOR_TEST));

    assert_eq!(viewports.viewport_get(), None);
    viewports.viewport_set(Rect::new(0, 0, 800, 600)).unwrap();
    assert_eq!(viewports.viewport_get(), Some(Rect::new(0, 0, 800, 600)));
}

#[test]
fn culling() {
    let (interface, driver) = support::build_interface();
    let culling = interface.culling();

    culling.culling_enable(FaceSelection::Back, FaceWindingOrder::CounterClockwise).unwrap();
    assert!(culling.culling_is_enabled());
    assert!(driver.is_enabled(CULL_FACE));

    culling.culling_disable().unwrap();
    assert!(!culling.culling_is_enabled());
    assert!(!driver.is_enabled(CULL_FACE));
}

#[test]
fn polygon_modes_and_logic_ops() {
    let (interface, driver) = support::build_interface_with(FakeConfig::gl21());
    let polygons = interface.polygon_modes().unwrap();
    let logic_ops = interface.logic_ops().unwrap();

    assert_eq!(polygons.polygon_get_mode(), PolygonMode::Fill);
    polygons.polygon_set_mode(PolygonMode::Line).unwrap();
    assert_eq!(polygons.polygon_get_mode(), PolygonMode::Line);
    assert_eq!(driver.statistics().calls("glPolygonMode"), 1);

    logic_ops.logic_op_enable(LogicOp::Xor).unwrap();
    assert!(logic_ops.logic_op_is_enabled());
    assert!(driver.is_enabled(COLOR_LOGIC_OP));
    logic_ops.logic_op_disable().unwrap();
    assert!(!logic_ops.logic_op_is_enabled());
}

#[test]
fn clear_in_one_call() {
    let (interface, driver) = support::build_interface();
    driver.reset_statistics();

    interface.clear().clear(&ClearSpecification {
        color: Some([0.0, 0.0, 0.0, 1.0]),
        depth: Some(1.0),
        stencil: Some(0),
    }).unwrap();

    let stats = driver.statistics();
    assert_eq!(stats.calls("glClear"), 1);
    assert_eq!(stats.calls("glClearColor"), 1);
    assert_eq!(stats.calls("glClearDepth"), 1);
    assert_eq!(stats.calls("glClearStencil"), 1);

    interface.clear().clear(&ClearSpecification::default()).unwrap();
    assert_eq!(driver.statistics().calls("glClear"), 1);

    interface.color_buffers().color_buffer_mask(true, true, true, false).unwrap();
    interface.color_buffers().color_buffer_clear([1.0, 0.0, 0.0, 1.0]).unwrap();
    assert_eq!(driver.statistics().calls("glClear"), 2);
}

#[test]
fn clear_checks_before_clearing() {
    let (interface, driver) = support::build_interface_with(FakeConfig::gles2());
    driver.reset_statistics();

    let spec = ClearSpecification {
        color: Some([0.0; 4]),
        stencil: Some(0),
        .. Default::default()
    };
    assert_eq!(support::precondition(interface.clear().clear(&spec)),
               PreconditionError::NoStencilBuffer);
    assert_eq!(driver.statistics().calls("glClear"), 0);
    assert_eq!(driver.statistics().calls("glClearColor"), 0);
}
