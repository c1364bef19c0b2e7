use glguard::buffer::UsageHint;
use glguard::index::{IndexBufferData, IndexType};
use glguard::{Error, FakeConfig, GlObject, PreconditionError, ResourceKind};

mod support;

#[test]
fn type_follows_the_array_buffer() {
    let (interface, _) = support::build_interface();
    let indices = interface.index_buffers();

    for &(elements, ty) in &[(1, IndexType::U8), (256, IndexType::U8), (257, IndexType::U16),
                             (65536, IndexType::U16), (65537, IndexType::U32)]
    {
        let array = support::build_array_buffer(&interface, elements);
        let buffer = indices.index_buffer_allocate(&array, 6, UsageHint::StaticDraw).unwrap();
        assert_eq!(buffer.ty(), ty);
        assert_eq!(buffer.indices(), 6);
        assert_eq!(buffer.size_bytes(), 6 * ty.size_bytes());
    }
}

#[test]
fn zero_indices() {
    let (interface, _) = support::build_interface();
    let err = support::precondition(
        interface.index_buffers().index_buffer_allocate_typed(IndexType::U16, 0,
                                                              UsageHint::StaticDraw));
    assert_eq!(err, PreconditionError::ZeroSize(ResourceKind::IndexBuffer));
}

#[test]
fn deleted_array_buffer() {
    let (interface, _) = support::build_interface();
    let array = support::build_array_buffer(&interface, 3);
    interface.array_buffers().array_buffer_delete(&array).unwrap();

    let err = support::precondition(
        interface.index_buffers().index_buffer_allocate(&array, 3, UsageHint::StaticDraw));
    assert_eq!(err, PreconditionError::Deleted(ResourceKind::ArrayBuffer));
}

#[test]
fn u32_on_gles2() {
    let (interface, _) = support::build_interface_with(FakeConfig::gles2());
    match support::precondition(interface.index_buffers()
                                         .index_buffer_allocate_typed(IndexType::U32, 3,
                                                                      UsageHint::StaticDraw)) {
        PreconditionError::NotSupported(_) => (),
        err => panic!("{:?}", err),
    }

    let mut config = FakeConfig::gles2();
    config.extensions.push("GL_OES_element_index_uint".to_owned());
    let (interface, _) = support::build_interface_with(config);
    interface.index_buffers()
             .index_buffer_allocate_typed(IndexType::U32, 3, UsageHint::StaticDraw)
             .unwrap();
}

#[test]
fn update_then_read() {
    let (interface, _) = support::build_interface();
    let indices = interface.index_buffers();
    let buffer = indices.index_buffer_allocate_typed(IndexType::U16, 4, UsageHint::DynamicDraw)
                        .unwrap();

    let mut data = IndexBufferData::new(&buffer, ..).unwrap();
    for (i, value) in [3, 1, 65535, 2].iter().enumerate() {
        data.set(i, *value).unwrap();
    }
    assert!(data.set(0, 65536).is_err());
    assert!(data.set(4, 0).is_err());

    let err = support::precondition(indices.index_buffer_update(&buffer, &data));
    assert_eq!(err, PreconditionError::NotBound(ResourceKind::IndexBuffer));

    indices.index_buffer_bind(&buffer).unwrap();
    indices.index_buffer_update(&buffer, &data).unwrap();
    assert_eq!(indices.index_buffer_read(&buffer).unwrap(), vec![3, 1, 65535, 2]);
}

#[test]
fn partial_update() {
    let (interface, _) = support::build_interface();
    let indices = interface.index_buffers();
    let buffer = indices.index_buffer_allocate_typed(IndexType::U8, 5, UsageHint::StaticDraw)
                        .unwrap();
    indices.index_buffer_bind(&buffer).unwrap();

    let mut data = IndexBufferData::new(&buffer, 2 .. 4).unwrap();
    data.set(2, 7).unwrap();
    data.set(3, 9).unwrap();
    assert!(data.set(1, 0).is_err());
    indices.index_buffer_update(&buffer, &data).unwrap();

    assert_eq!(indices.index_buffer_read(&buffer).unwrap(), vec![0, 0, 7, 9, 0]);
}

#[test]
fn bind_and_delete() {
    let (interface, _) = support::build_interface();
    let indices = interface.index_buffers();
    let buffer = indices.index_buffer_allocate_typed(IndexType::U8, 3, UsageHint::StaticDraw)
                        .unwrap();

    assert!(!indices.index_buffer_is_bound(&buffer).unwrap());
    indices.index_buffer_bind(&buffer).unwrap();
    assert!(indices.index_buffer_is_bound(&buffer).unwrap());
    assert_eq!(indices.index_buffer_get_bound(), Some(buffer.clone()));

    indices.index_buffer_delete(&buffer).unwrap();
    assert!(!indices.index_buffer_any_is_bound());
    assert!(indices.index_buffer_bind(&buffer).is_err());
    assert!(indices.index_buffer_delete(&buffer).is_err());
    assert!(indices.index_buffer_reallocate(&buffer).is_err());
}

#[test]
fn size_in_bytes_overflows() {
    let (interface, driver) = support::build_interface();
    let err = support::precondition(interface.index_buffers()
        .index_buffer_allocate_typed(IndexType::U32, usize::MAX / 2, UsageHint::StaticDraw));
    assert_eq!(err, PreconditionError::SizeOverflow(ResourceKind::IndexBuffer));
    assert_eq!(driver.statistics().calls("glGenBuffers"), 0);
}

#[test]
fn failed_allocation_is_undone() {
    let (interface, driver) = support::build_interface();
    let indices = interface.index_buffers();
    let first = indices.index_buffer_allocate_typed(IndexType::U16, 3, UsageHint::StaticDraw)
                       .unwrap();
    indices.index_buffer_bind(&first).unwrap();
    let live = driver.live_objects();

    // GL_OUT_OF_MEMORY
    driver.fail_next("glBufferData", 0x0505);
    match indices.index_buffer_allocate_typed(IndexType::U16, 3, UsageHint::StaticDraw) {
        Err(Error::Driver(err)) => assert_eq!(err.name(), "GL_OUT_OF_MEMORY"),
        other => panic!("{:?}", other),
    }

    assert_eq!(driver.live_objects(), live);
    // GL_ELEMENT_ARRAY_BUFFER
    assert_eq!(driver.buffer_binding(0x8893), first.get_id());

    let mut data = IndexBufferData::new(&first, ..).unwrap();
    data.set(1, 40).unwrap();
    indices.index_buffer_update(&first, &data).unwrap();
    assert_eq!(indices.index_buffer_read(&first).unwrap(), vec![0, 40, 0]);
}
