use glguard::render_buffer::RenderbufferFormat;
use glguard::{Error, FakeConfig, PreconditionError, ResourceKind};

mod support;

#[test]
fn allocate() {
    let (interface, driver) = support::build_interface();
    let renderbuffer = interface.renderbuffers()
        .renderbuffer_allocate(RenderbufferFormat::Depth24Stencil8, 640, 480)
        .unwrap();

    assert_eq!(renderbuffer.format(), RenderbufferFormat::Depth24Stencil8);
    assert_eq!(renderbuffer.dimensions(), (640, 480));
    assert_eq!(driver.statistics().calls("glRenderbufferStorage"), 1);
}

#[test]
fn sizes() {
    let (interface, _) = support::build_interface_with(FakeConfig::gles2());
    let renderbuffers = interface.renderbuffers();

    assert_eq!(support::precondition(renderbuffers.renderbuffer_allocate(
                   RenderbufferFormat::RGBA4, 0, 16)),
               PreconditionError::ZeroSize(ResourceKind::Renderbuffer));
    assert_eq!(support::precondition(renderbuffers.renderbuffer_allocate(
                   RenderbufferFormat::RGBA4, 16, 2049)),
               PreconditionError::TooLarge { size: 2049, max: 2048 });
}

#[test]
fn gles2_formats_need_extensions() {
    let config = FakeConfig { extensions: vec![], .. FakeConfig::gles2() };
    let (interface, _) = support::build_interface_with(config);
    let renderbuffers = interface.renderbuffers();

    for &format in &[RenderbufferFormat::RGBA8, RenderbufferFormat::Depth24,
                     RenderbufferFormat::Depth24Stencil8]
    {
        match support::precondition(renderbuffers.renderbuffer_allocate(format, 4, 4)) {
            PreconditionError::NotSupported(_) => (),
            err => panic!("{:?}: {:?}", format, err),
        }
    }

    for &format in &[RenderbufferFormat::RGBA4, RenderbufferFormat::RGB565,
                     RenderbufferFormat::RGB5A1, RenderbufferFormat::Depth16,
                     RenderbufferFormat::Stencil8]
    {
        renderbuffers.renderbuffer_allocate(format, 4, 4).unwrap();
    }
}

#[test]
fn delete_twice() {
    let (interface, driver) = support::build_interface();
    let renderbuffers = interface.renderbuffers();
    let before = driver.live_objects();
    let renderbuffer = renderbuffers.renderbuffer_allocate(RenderbufferFormat::RGBA8, 4, 4)
                                    .unwrap();
    assert_eq!(driver.live_objects(), before + 1);

    renderbuffers.renderbuffer_delete(&renderbuffer).unwrap();
    assert_eq!(driver.live_objects(), before);
    assert_eq!(support::precondition(renderbuffers.renderbuffer_delete(&renderbuffer)),
               PreconditionError::Deleted(ResourceKind::Renderbuffer));
}

#[test]
fn failed_storage_deletes_the_renderbuffer() {
    let (interface, driver) = support::build_interface();
    let before = driver.live_objects();

    // GL_OUT_OF_MEMORY
    driver.fail_next("glRenderbufferStorage", 0x0505);
    match interface.renderbuffers().renderbuffer_allocate(RenderbufferFormat::RGBA8, 4, 4) {
        Err(Error::Driver(err)) => assert_eq!(err.name(), "GL_OUT_OF_MEMORY"),
        other => panic!("{:?}", other),
    }
    assert_eq!(driver.live_objects(), before);
    assert_eq!(driver.statistics().calls("glDeleteRenderbuffers"), 1);
}
