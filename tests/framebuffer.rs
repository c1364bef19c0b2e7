use glguard::framebuffer::{BlitBuffers, BlitFilter, FramebufferBuilder, FramebufferStatus};
use glguard::render_buffer::RenderbufferFormat;
use glguard::texture::{CubeMapFace, TextureFilterMag, TextureFilterMin, TextureFormat,
                       TextureWrap};
use glguard::{Error, FakeConfig, GlObject, Interface, PreconditionError, Rect,
              ResourceKind};

mod support;

fn color_renderbuffer(interface: &Interface) -> glguard::render_buffer::Renderbuffer {
    interface.renderbuffers().renderbuffer_allocate(RenderbufferFormat::RGBA4, 16, 16).unwrap()
}

#[test]
fn attachment_points_follow_the_driver() {
    let expected = [(4, 4), (8, 8), (1, 1), (4, 4)];
    for (config, &(points, buffers)) in support::all_configs().into_iter().zip(expected.iter()) {
        let (interface, _) = support::build_interface_with(config);
        let framebuffers = interface.framebuffers();
        assert_eq!(framebuffers.framebuffer_color_attachment_points().len(), points);
        assert_eq!(framebuffers.framebuffer_draw_buffers().len(), buffers);
    }
}

#[test]
fn allocate_and_bind() {
    let (interface, driver) = support::build_interface();
    let framebuffers = interface.framebuffers();
    let points = framebuffers.framebuffer_color_attachment_points();

    let color = support::build_texture_2d(&interface);
    let depth = interface.renderbuffers()
        .renderbuffer_allocate(RenderbufferFormat::Depth24Stencil8, 4, 4).unwrap();

    let mut builder = FramebufferBuilder::new();
    builder.attach_color_texture_2d(points[0], &color);
    builder.attach_depth_stencil_renderbuffer(&depth);
    let framebuffer = framebuffers.framebuffer_allocate(&builder).unwrap();

    assert_eq!(framebuffer.color_attachment_points(), &points[.. 1]);
    assert_eq!(framebuffer.depth_bits(), 24);
    assert_eq!(framebuffer.stencil_bits(), 8);

    // allocating doesn't bind
    assert!(!framebuffers.framebuffer_draw_any_is_bound());
    assert_eq!(driver.draw_framebuffer_binding(), 0);

    framebuffers.framebuffer_draw_bind(&framebuffer).unwrap();
    assert!(framebuffers.framebuffer_draw_is_bound(&framebuffer).unwrap());
    assert_eq!(framebuffers.framebuffer_draw_get_bound(), Some(framebuffer.clone()));
    assert_eq!(driver.draw_framebuffer_binding(), framebuffer.get_id());
    assert_eq!(framebuffers.framebuffer_draw_validate().unwrap(), FramebufferStatus::Complete);

    framebuffers.framebuffer_draw_unbind().unwrap();
    assert!(!framebuffers.framebuffer_draw_any_is_bound());
    assert_eq!(framebuffers.framebuffer_draw_get_bound(), None);
    assert_eq!(driver.draw_framebuffer_binding(), 0);
}

#[test]
fn validate_needs_a_framebuffer() {
    let (interface, _) = support::build_interface();
    assert_eq!(support::precondition(interface.framebuffers().framebuffer_draw_validate()),
               PreconditionError::NoDrawFramebuffer);
}

#[test]
fn incomplete_framebuffers_are_deleted() {
    let (interface, driver) = support::build_interface();
    let framebuffers = interface.framebuffers();
    let before = driver.live_objects();

    let builder = FramebufferBuilder::new();
    assert_eq!(support::precondition(framebuffers.framebuffer_allocate(&builder)),
               PreconditionError::FramebufferIncomplete(
                   FramebufferStatus::IncompleteMissingAttachment));
    assert_eq!(driver.live_objects(), before);
    assert_eq!(driver.draw_framebuffer_binding(), 0);
}

#[test]
fn draw_buffer_to_a_missing_attachment() {
    let (interface, _) = support::build_interface();
    let framebuffers = interface.framebuffers();
    let points = framebuffers.framebuffer_color_attachment_points();
    let draw_buffers = framebuffers.framebuffer_draw_buffers();
    let color = color_renderbuffer(&interface);

    let mut builder = FramebufferBuilder::new();
    builder.attach_color_renderbuffer(points[0], &color);
    builder.map_draw_buffer(draw_buffers[0], points[0]);
    builder.map_draw_buffer(draw_buffers[1], points[3]);

    assert_eq!(support::precondition(framebuffers.framebuffer_allocate(&builder)),
               PreconditionError::FramebufferIncomplete(FramebufferStatus::IncompleteDrawBuffer));

    builder.attach_color_renderbuffer(points[3], &color_renderbuffer(&interface));
    framebuffers.framebuffer_allocate(&builder).unwrap();
}

#[test]
fn draw_buffer_remapping() {
    let (interface, _) = support::build_interface();
    let framebuffers = interface.framebuffers();
    let points = framebuffers.framebuffer_color_attachment_points();
    let draw_buffers = framebuffers.framebuffer_draw_buffers();

    let mut builder = FramebufferBuilder::new();
    builder.attach_color_renderbuffer(points[0], &color_renderbuffer(&interface));
    builder.attach_color_renderbuffer(points[1], &color_renderbuffer(&interface));
    builder.map_draw_buffer(draw_buffers[0], points[1]);
    builder.map_draw_buffer(draw_buffers[1], points[0]);
    framebuffers.framebuffer_allocate(&builder).unwrap();

    builder.map_draw_buffer(draw_buffers[1], points[1]);
    match support::precondition(framebuffers.framebuffer_allocate(&builder)) {
        PreconditionError::NotSupported(_) => (),
        err => panic!("{:?}", err),
    }
}

#[test]
fn gles_can_not_remap_draw_buffers() {
    let (interface, _) = support::build_interface_with(FakeConfig::gles3());
    let framebuffers = interface.framebuffers();
    let points = framebuffers.framebuffer_color_attachment_points();
    let draw_buffers = framebuffers.framebuffer_draw_buffers();

    let mut builder = FramebufferBuilder::new();
    builder.attach_color_renderbuffer(points[1], &color_renderbuffer(&interface));
    builder.map_draw_buffer(draw_buffers[0], points[1]);
    match support::precondition(framebuffers.framebuffer_allocate(&builder)) {
        PreconditionError::NotSupported(_) => (),
        err => panic!("{:?}", err),
    }

    builder.unmap_draw_buffer(draw_buffers[0]);
    builder.map_draw_buffer(draw_buffers[1], points[1]);
    framebuffers.framebuffer_allocate(&builder).unwrap();
}

#[test]
fn attachment_points_out_of_range() {
    let (gl33, _) = support::build_interface();
    let (gles2, _) = support::build_interface_with(FakeConfig::gles2());
    let point = gl33.framebuffers().framebuffer_color_attachment_points()[2];

    let mut builder = FramebufferBuilder::new();
    builder.attach_color_renderbuffer(point, &color_renderbuffer(&gles2));
    assert_eq!(support::precondition(gles2.framebuffers().framebuffer_allocate(&builder)),
               PreconditionError::OutOfRange { index: 2, limit: 1 });
}

#[test]
fn attachments_must_fit_their_role() {
    let (interface, _) = support::build_interface();
    let framebuffers = interface.framebuffers();
    let point = framebuffers.framebuffer_color_attachment_points()[0];
    let renderbuffers = interface.renderbuffers();

    let depth = renderbuffers.renderbuffer_allocate(RenderbufferFormat::Depth24, 4, 4).unwrap();
    let color = renderbuffers.renderbuffer_allocate(RenderbufferFormat::RGBA8, 4, 4).unwrap();
    let float3 = interface.textures_2d()
        .texture_2d_allocate(4, 4, TextureFormat::RGB32F, TextureWrap::Repeat,
                             TextureWrap::Repeat, TextureFilterMin::Nearest,
                             TextureFilterMag::Nearest)
        .unwrap();

    let mut builder = FramebufferBuilder::new();
    builder.attach_color_renderbuffer(point, &depth);
    assert_eq!(support::precondition(framebuffers.framebuffer_allocate(&builder)),
               PreconditionError::NotColorRenderable);

    builder.attach_color_texture_2d(point, &float3);
    assert_eq!(support::precondition(framebuffers.framebuffer_allocate(&builder)),
               PreconditionError::NotColorRenderable);

    builder.attach_color_renderbuffer(point, &color);
    builder.attach_depth_renderbuffer(&color);
    assert_eq!(support::precondition(framebuffers.framebuffer_allocate(&builder)),
               PreconditionError::NotDepthRenderable);

    builder.attach_depth_stencil_renderbuffer(&depth);
    assert_eq!(support::precondition(framebuffers.framebuffer_allocate(&builder)),
               PreconditionError::NotStencilRenderable);

    builder.attach_depth_renderbuffer(&depth);
    let framebuffer = framebuffers.framebuffer_allocate(&builder).unwrap();
    assert_eq!(framebuffer.depth_bits(), 24);
    assert_eq!(framebuffer.stencil_bits(), 0);
}

#[test]
fn deleted_attachments() {
    let (interface, _) = support::build_interface();
    let framebuffers = interface.framebuffers();
    let point = framebuffers.framebuffer_color_attachment_points()[0];
    let texture = support::build_texture_2d(&interface);
    interface.textures_2d().texture_2d_delete(&texture).unwrap();

    let mut builder = FramebufferBuilder::new();
    builder.attach_color_texture_2d(point, &texture);
    assert_eq!(support::precondition(framebuffers.framebuffer_allocate(&builder)),
               PreconditionError::Deleted(ResourceKind::Texture2D));
}

#[test]
fn cube_faces_as_color() {
    let (interface, driver) = support::build_interface();
    let framebuffers = interface.framebuffers();
    let points = framebuffers.framebuffer_color_attachment_points();
    let cube = interface.textures_cube()
        .texture_cube_allocate(16, TextureFormat::RGBA8, TextureWrap::ClampToEdge,
                               TextureWrap::ClampToEdge, TextureWrap::ClampToEdge,
                               TextureFilterMin::Linear, TextureFilterMag::Linear)
        .unwrap();

    let mut builder = FramebufferBuilder::new();
    builder.attach_color_texture_cube(points[0], &cube, CubeMapFace::PositiveX);
    builder.attach_color_texture_cube(points[1], &cube, CubeMapFace::NegativeZ);
    framebuffers.framebuffer_allocate(&builder).unwrap();

    assert_eq!(driver.statistics().calls("glFramebufferTexture2D"), 2);
}

#[test]
fn gles2_depth_stencil_is_attached_twice() {
    let (interface, driver) = support::build_interface_with(FakeConfig::gles2());
    let framebuffers = interface.framebuffers();
    let point = framebuffers.framebuffer_color_attachment_points()[0];
    let depth_stencil = interface.renderbuffers()
        .renderbuffer_allocate(RenderbufferFormat::Depth24Stencil8, 16, 16).unwrap();

    let mut builder = FramebufferBuilder::new();
    builder.attach_color_renderbuffer(point, &color_renderbuffer(&interface));
    builder.attach_depth_stencil_renderbuffer(&depth_stencil);
    driver.reset_statistics();
    let framebuffer = framebuffers.framebuffer_allocate(&builder).unwrap();

    let stats = driver.statistics();
    assert_eq!(stats.calls("glFramebufferRenderbuffer"), 3);
    assert_eq!(stats.calls("glDrawBuffers"), 0);
    assert_eq!(framebuffer.stencil_bits(), 8);
}

#[test]
fn delete_unbinds() {
    let (interface, driver) = support::build_interface();
    let framebuffers = interface.framebuffers();
    let point = framebuffers.framebuffer_color_attachment_points()[0];

    let mut builder = FramebufferBuilder::new();
    builder.attach_color_renderbuffer(point, &color_renderbuffer(&interface));
    let framebuffer = framebuffers.framebuffer_allocate(&builder).unwrap();
    framebuffers.framebuffer_draw_bind(&framebuffer).unwrap();

    framebuffers.framebuffer_delete(&framebuffer).unwrap();
    assert!(!framebuffers.framebuffer_draw_any_is_bound());
    assert_eq!(driver.draw_framebuffer_binding(), 0);
    assert_eq!(support::precondition(framebuffers.framebuffer_draw_bind(&framebuffer)),
               PreconditionError::Deleted(ResourceKind::Framebuffer));
}

#[test]
fn read_framebuffers_and_blit() {
    let (interface, driver) = support::build_interface();
    let framebuffers = interface.framebuffers();
    let read = interface.read_framebuffers().unwrap();
    let point = framebuffers.framebuffer_color_attachment_points()[0];

    let mut builder = FramebufferBuilder::new();
    builder.attach_color_renderbuffer(point, &color_renderbuffer(&interface));
    let source = framebuffers.framebuffer_allocate(&builder).unwrap();

    read.framebuffer_read_bind(&source).unwrap();
    assert!(read.framebuffer_read_is_bound(&source).unwrap());
    assert!(!framebuffers.framebuffer_draw_is_bound(&source).unwrap());

    read.framebuffer_blit(Rect::new(0, 0, 16, 16), Rect::new(0, 0, 32, 32),
                          BlitBuffers::color(), BlitFilter::Linear).unwrap();
    assert_eq!(driver.statistics().calls("glBlitFramebuffer"), 1);

    let depth = BlitBuffers { depth: true, .. Default::default() };
    assert_eq!(support::precondition(read.framebuffer_blit(Rect::new(0, 0, 16, 16),
                                                           Rect::new(0, 0, 32, 32), depth,
                                                           BlitFilter::Linear)),
               PreconditionError::BlitFilter);
    read.framebuffer_blit(Rect::new(0, 0, 16, 16), Rect::new(0, 0, 16, 16), depth,
                          BlitFilter::Nearest).unwrap();

    read.framebuffer_read_unbind().unwrap();
    assert!(!read.framebuffer_read_any_is_bound());
}

#[test]
fn failed_attachment_is_undone() {
    let (interface, driver) = support::build_interface();
    let framebuffers = interface.framebuffers();
    let points = framebuffers.framebuffer_color_attachment_points();

    let mut builder = FramebufferBuilder::new();
    builder.attach_color_renderbuffer(points[0], &color_renderbuffer(&interface));
    let bound = framebuffers.framebuffer_allocate(&builder).unwrap();
    framebuffers.framebuffer_draw_bind(&bound).unwrap();

    let texture = support::build_texture_2d(&interface);
    let mut builder = FramebufferBuilder::new();
    builder.attach_color_texture_2d(points[0], &texture);
    let live = driver.live_objects();

    // GL_OUT_OF_MEMORY
    driver.fail_next("glFramebufferTexture2D", 0x0505);
    match framebuffers.framebuffer_allocate(&builder) {
        Err(Error::Driver(err)) => assert_eq!(err.name(), "GL_OUT_OF_MEMORY"),
        other => panic!("{:?}", other),
    }
    assert_eq!(driver.live_objects(), live);
    assert_eq!(driver.draw_framebuffer_binding(), bound.get_id());
    assert!(framebuffers.framebuffer_draw_is_bound(&bound).unwrap());
}
