use glguard::buffer::UsageHint;
use glguard::index::{IndexType, PrimitiveType};
use glguard::{Error, FakeConfig, GlObject, PreconditionError, ResourceKind};

mod support;

const ARRAY_BUFFER: u32 = 0x8892;
const ELEMENT_ARRAY_BUFFER: u32 = 0x8893;
const OUT_OF_MEMORY: u32 = 0x0505;

#[test]
fn only_on_gl3_and_gles3() {
    for config in support::all_configs() {
        let (interface, driver) = support::build_interface_with(config);
        let has_objects = interface.profile().has_array_objects();
        assert_eq!(interface.array_objects().is_some(), has_objects);
        // the context binds a default array object of its own
        assert_eq!(driver.vertex_array_binding() != 0, has_objects);
    }
}

#[test]
fn allocate_bind_unbind() {
    let (interface, driver) = support::build_interface();
    let objects = interface.array_objects().unwrap();
    let buffer = support::build_array_buffer(&interface, 3);
    interface.array_buffers().array_buffer_bind(&buffer).unwrap();
    let default = driver.vertex_array_binding();

    let mut builder = objects.array_object_new_builder();
    assert_eq!(builder.maximum_vertex_attributes(), 16);
    builder.set_attribute(0, &buffer, "position", false).unwrap();
    builder.set_attribute(3, &buffer, "uv", true).unwrap();

    let object = objects.array_object_allocate(&builder).unwrap();
    assert!(!objects.array_object_is_bound(&object).unwrap());
    assert_eq!(driver.vertex_array_binding(), default);
    assert_eq!(driver.buffer_binding(ARRAY_BUFFER), buffer.get_id());
    assert!(!driver.is_attrib_array_enabled(0));

    objects.array_object_bind(&object).unwrap();
    assert!(objects.array_object_is_bound(&object).unwrap());
    assert_eq!(objects.array_object_get_bound(), Some(object.clone()));
    assert_eq!(driver.vertex_array_binding(), object.get_id());
    assert!(driver.is_attrib_array_enabled(0));
    assert!(!driver.is_attrib_array_enabled(1));
    assert!(driver.is_attrib_array_enabled(3));
    assert_eq!(driver.attrib_array_buffer(3), buffer.get_id());

    let uv = object.attribute_at(3).unwrap();
    assert_eq!(uv.offset(), 12);
    assert_eq!(uv.stride(), 20);
    assert!(uv.normalized());
    assert_eq!(object.attributes().count(), 2);

    objects.array_object_unbind().unwrap();
    assert_eq!(objects.array_object_get_bound(), None);
    assert!(!objects.array_object_is_bound(&object).unwrap());
    assert_eq!(driver.vertex_array_binding(), default);
    assert!(!driver.is_attrib_array_enabled(0));

    objects.array_object_bind(&object).unwrap();
    assert_eq!(driver.vertex_array_binding(), object.get_id());
    assert!(driver.is_attrib_array_enabled(3));
}

#[test]
fn builder_checks() {
    let (interface, _) = support::build_interface();
    let objects = interface.array_objects().unwrap();
    let buffer = support::build_array_buffer(&interface, 3);
    let mut builder = objects.array_object_new_builder();

    assert_eq!(builder.set_attribute(16, &buffer, "position", false),
               Err(PreconditionError::OutOfRange { index: 16, limit: 16 }));
    assert_eq!(builder.set_attribute(0, &buffer, "normal", false),
               Err(PreconditionError::UnknownAttribute("normal".to_owned())));

    builder.set_attribute(0, &buffer, "position", false).unwrap();
    builder.set_attribute(0, &buffer, "uv", false).unwrap();
    assert_eq!(builder.attribute_at(0).unwrap().unwrap().attribute().name(), "uv");

    builder.set_strict_checking(true);
    assert_eq!(builder.set_attribute(0, &buffer, "position", false),
               Err(PreconditionError::AttributeAlreadyAssigned(0)));
    builder.disable_attribute(0).unwrap();
    builder.set_attribute(0, &buffer, "position", false).unwrap();

    builder.reset();
    assert_eq!(builder.attribute_at(0), Ok(None));
    assert_eq!(builder.set_attribute(0, &buffer, "uv", false), Ok(()));
    assert_eq!(builder.set_attribute(0, &buffer, "uv", false),
               Err(PreconditionError::AttributeAlreadyAssigned(0)));
}

#[test]
fn builder_from_an_object() {
    let (interface, _) = support::build_interface();
    let objects = interface.array_objects().unwrap();
    let buffer = support::build_array_buffer(&interface, 3);
    let indices = interface.index_buffers()
        .index_buffer_allocate_typed(IndexType::U16, 3, UsageHint::StaticDraw)
        .unwrap();

    let mut builder = objects.array_object_new_builder();
    builder.set_attribute(2, &buffer, "uv", false).unwrap();
    builder.set_index_buffer(&indices);
    let object = objects.array_object_allocate(&builder).unwrap();

    let copy = objects.array_object_new_builder_from(&object).unwrap();
    assert_eq!(copy.attribute_at(2).unwrap(), object.attribute_at(2));
    assert_eq!(copy.attribute_at(0), Ok(None));
    assert_eq!(copy.index_buffer(), Some(&indices));
}

#[test]
fn each_object_has_its_index_buffer() {
    let (interface, driver) = support::build_interface();
    let objects = interface.array_objects().unwrap();
    let index_buffers = interface.index_buffers();
    let buffer = support::build_array_buffer(&interface, 3);
    let first = index_buffers.index_buffer_allocate_typed(IndexType::U16, 3,
                                                          UsageHint::StaticDraw).unwrap();
    let second = index_buffers.index_buffer_allocate_typed(IndexType::U16, 6,
                                                           UsageHint::StaticDraw).unwrap();
    index_buffers.index_buffer_bind(&first).unwrap();

    let mut builder = objects.array_object_new_builder();
    builder.set_attribute(0, &buffer, "position", false).unwrap();
    builder.set_index_buffer(&second);
    let object = objects.array_object_allocate(&builder).unwrap();
    assert_eq!(index_buffers.index_buffer_get_bound(), Some(first.clone()));
    assert_eq!(driver.buffer_binding(ELEMENT_ARRAY_BUFFER), first.get_id());

    objects.array_object_bind(&object).unwrap();
    assert_eq!(index_buffers.index_buffer_get_bound(), Some(second.clone()));
    assert_eq!(driver.buffer_binding(ELEMENT_ARRAY_BUFFER), second.get_id());
    assert_eq!(objects.array_object_index_buffer(&object).unwrap(), Some(second.clone()));

    assert_eq!(support::precondition(index_buffers.index_buffer_bind(&first)),
               PreconditionError::IndexBufferAlreadyConfigured);
    assert_eq!(support::precondition(index_buffers.index_buffer_unbind()),
               PreconditionError::IndexBufferAlreadyConfigured);
    index_buffers.index_buffer_bind(&second).unwrap();

    // the default array object gets its index buffer back
    objects.array_object_unbind().unwrap();
    assert_eq!(index_buffers.index_buffer_get_bound(), Some(first.clone()));
    assert_eq!(driver.buffer_binding(ELEMENT_ARRAY_BUFFER), first.get_id());
    index_buffers.index_buffer_unbind().unwrap();

    objects.array_object_bind(&object).unwrap();
    assert_eq!(index_buffers.index_buffer_get_bound(), Some(second.clone()));
    objects.array_object_unbind().unwrap();
    assert_eq!(index_buffers.index_buffer_get_bound(), None);
}

#[test]
fn indexed_draws_use_the_bound_object() {
    let (interface, driver) = support::build_interface();
    let objects = interface.array_objects().unwrap();
    let program = support::build_program(&interface);
    interface.shaders().shader_activate_program(&program).unwrap();
    let buffer = support::build_array_buffer(&interface, 3);
    let indices = interface.index_buffers()
        .index_buffer_allocate_typed(IndexType::U16, 3, UsageHint::StaticDraw)
        .unwrap();

    let mut builder = objects.array_object_new_builder();
    builder.set_attribute(0, &buffer, "position", false).unwrap();
    builder.set_index_buffer(&indices);
    let object = objects.array_object_allocate(&builder).unwrap();
    assert_eq!(support::precondition(interface.draw().draw_indexed(PrimitiveType::Triangles)),
               PreconditionError::NotBound(ResourceKind::IndexBuffer));

    objects.array_object_bind(&object).unwrap();
    interface.draw().draw_indexed(PrimitiveType::Triangles).unwrap();

    objects.array_object_unbind().unwrap();
    assert_eq!(support::precondition(interface.draw().draw_indexed(PrimitiveType::Triangles)),
               PreconditionError::NotBound(ResourceKind::IndexBuffer));
    assert_eq!(driver.draw_count(), 1);
}

#[test]
fn deleting_the_index_buffer_clears_it_everywhere() {
    let (interface, _) = support::build_interface();
    let objects = interface.array_objects().unwrap();
    let index_buffers = interface.index_buffers();
    let indices = index_buffers.index_buffer_allocate_typed(IndexType::U8, 3,
                                                            UsageHint::StaticDraw).unwrap();

    let mut builder = objects.array_object_new_builder();
    builder.set_index_buffer(&indices);
    let first = objects.array_object_allocate(&builder).unwrap();
    let second = objects.array_object_allocate(&builder).unwrap();
    objects.array_object_bind(&second).unwrap();
    assert_eq!(index_buffers.index_buffer_get_bound(), Some(indices.clone()));

    index_buffers.index_buffer_delete(&indices).unwrap();
    assert_eq!(index_buffers.index_buffer_get_bound(), None);
    assert_eq!(objects.array_object_index_buffer(&first).unwrap(), None);
    assert_eq!(objects.array_object_index_buffer(&second).unwrap(), None);

    objects.array_object_bind(&first).unwrap();
    assert!(!index_buffers.index_buffer_any_is_bound());

    // an object without an index buffer takes the next one that is bound
    let other = index_buffers.index_buffer_allocate_typed(IndexType::U8, 3,
                                                          UsageHint::StaticDraw).unwrap();
    index_buffers.index_buffer_bind(&other).unwrap();
    assert_eq!(objects.array_object_index_buffer(&first).unwrap(), Some(other));
}

#[test]
fn allocation_checks_the_buffers() {
    let (interface, driver) = support::build_interface();
    let objects = interface.array_objects().unwrap();
    let buffer = support::build_array_buffer(&interface, 3);
    let mut builder = objects.array_object_new_builder();
    builder.set_attribute(0, &buffer, "position", false).unwrap();
    interface.array_buffers().array_buffer_delete(&buffer).unwrap();

    assert_eq!(support::precondition(objects.array_object_allocate(&builder)),
               PreconditionError::Deleted(ResourceKind::ArrayBuffer));
    assert_eq!(driver.statistics().calls("glGenVertexArrays"), 1);
}

#[test]
fn delete() {
    let (interface, driver) = support::build_interface();
    let objects = interface.array_objects().unwrap();
    let default = driver.vertex_array_binding();
    let live = driver.live_objects();

    let object = objects.array_object_allocate(&objects.array_object_new_builder()).unwrap();
    assert_eq!(driver.live_objects(), live + 1);
    objects.array_object_bind(&object).unwrap();

    objects.array_object_delete(&object).unwrap();
    assert_eq!(driver.live_objects(), live);
    assert_eq!(driver.vertex_array_binding(), default);
    assert_eq!(objects.array_object_get_bound(), None);

    assert_eq!(support::precondition(objects.array_object_bind(&object)),
               PreconditionError::Deleted(ResourceKind::ArrayObject));
    assert_eq!(support::precondition(objects.array_object_delete(&object)),
               PreconditionError::Deleted(ResourceKind::ArrayObject));
}

#[test]
fn failed_allocation_is_undone() {
    let (interface, driver) = support::build_interface_with(FakeConfig::gles3());
    let objects = interface.array_objects().unwrap();
    let buffer = support::build_array_buffer(&interface, 3);
    let mut builder = objects.array_object_new_builder();
    builder.set_attribute(0, &buffer, "position", false).unwrap();
    let first = objects.array_object_allocate(&builder).unwrap();
    objects.array_object_bind(&first).unwrap();
    let live = driver.live_objects();

    driver.fail_next("glVertexAttribPointer", OUT_OF_MEMORY);
    match objects.array_object_allocate(&builder) {
        Err(Error::Driver(err)) => assert_eq!(err.name(), "GL_OUT_OF_MEMORY"),
        other => panic!("{:?}", other),
    }

    assert_eq!(driver.live_objects(), live);
    assert_eq!(driver.vertex_array_binding(), first.get_id());
    assert_eq!(driver.buffer_binding(ARRAY_BUFFER), 0);
    assert!(objects.array_object_is_bound(&first).unwrap());
}
