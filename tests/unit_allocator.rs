use glguard::texture::unit_allocator::TextureUnitAllocator;
use glguard::texture::{TextureFilterMag, TextureFilterMin, TextureFormat, TextureWrap};
use glguard::{ContextBuilder, FakeConfig, FakeDriver, Interface, PreconditionError,
              SoftRestrictions};

mod support;

fn build_interface_with_units(units: u32) -> Interface {
    ContextBuilder::new()
        .with_debug(true)
        .with_soft_restrictions(SoftRestrictions {
            texture_units: Some(units),
            .. Default::default()
        })
        .build(FakeDriver::new(FakeConfig::gl33()))
        .unwrap()
}

#[test]
#[should_panic]
fn depth_zero_is_refused() {
    let (interface, _) = support::build_interface();
    TextureUnitAllocator::new(&interface, 0);
}

#[test]
fn units_are_handed_out_in_order() {
    let (interface, _) = support::build_interface();
    let mut allocator = TextureUnitAllocator::new(&interface, 4);
    let texture = support::build_texture_2d(&interface);

    assert_eq!(allocator.depth(), 1);
    let first = allocator.bind_texture_2d(&interface, &texture).unwrap();
    let second = allocator.bind_texture_2d(&interface, &texture).unwrap();
    assert_eq!((first.index(), second.index()), (0, 1));
    assert_eq!(allocator.units_used(), 2);
    assert_eq!(allocator.units_free(), 30);
}

#[test]
fn nested_contexts_continue_and_restore() {
    let (interface, _) = support::build_interface();
    let textures = interface.textures_2d();
    let mut allocator = TextureUnitAllocator::new(&interface, 4);
    let outer = support::build_texture_2d(&interface);
    let inner = support::build_texture_2d(&interface);

    let unit = allocator.bind_texture_2d(&interface, &outer).unwrap();
    allocator.push_context().unwrap();
    assert_eq!(allocator.depth(), 2);

    let inner_unit = allocator.bind_texture_2d(&interface, &inner).unwrap();
    assert_eq!(inner_unit.index(), 1);
    assert!(textures.texture_2d_is_bound(inner_unit, &inner).unwrap());

    // the nested context rebinds the unit of its parent behind the allocator's back
    textures.texture_2d_bind(unit, &inner).unwrap();

    allocator.pop_context(&interface).unwrap();
    assert_eq!(allocator.depth(), 1);
    assert_eq!(allocator.units_used(), 1);
    assert!(textures.texture_2d_is_bound(unit, &outer).unwrap());
    assert!(!interface.textures().texture_unit_is_bound(inner_unit).unwrap());
}

#[test]
fn popping_restores_deleted_textures_as_unbound() {
    let (interface, _) = support::build_interface();
    let mut allocator = TextureUnitAllocator::new(&interface, 2);
    let texture = support::build_texture_2d(&interface);

    let unit = allocator.bind_texture_2d(&interface, &texture).unwrap();
    allocator.push_context().unwrap();
    interface.textures_2d().texture_2d_delete(&texture).unwrap();
    allocator.pop_context(&interface).unwrap();

    assert!(!interface.textures().texture_unit_is_bound(unit).unwrap());
}

#[test]
fn the_root_can_not_be_popped() {
    let (interface, _) = support::build_interface();
    let mut allocator = TextureUnitAllocator::new(&interface, 2);
    assert_eq!(support::precondition(allocator.pop_context(&interface)),
               PreconditionError::UnitContextRoot);
}

#[test]
fn stack_depth_is_limited() {
    let (interface, _) = support::build_interface();
    let mut allocator = TextureUnitAllocator::new(&interface, 3);
    allocator.push_context().unwrap();
    allocator.push_context().unwrap();
    assert_eq!(support::precondition(allocator.push_context()),
               PreconditionError::UnitContextStackFull);
    assert_eq!(allocator.depth(), 3);
}

#[test]
fn units_run_out() {
    let interface = build_interface_with_units(2);
    let mut allocator = TextureUnitAllocator::new(&interface, 4);
    let texture = support::build_texture_2d(&interface);

    allocator.bind_texture_2d(&interface, &texture).unwrap();
    assert_eq!(support::precondition(allocator.push_context_with_reserved(2)),
               PreconditionError::TextureUnitsExhausted);
    assert_eq!(allocator.depth(), 1);

    allocator.push_context_with_reserved(1).unwrap();
    allocator.bind_texture_2d(&interface, &texture).unwrap();
    assert_eq!(allocator.units_free(), 0);
    assert_eq!(support::precondition(allocator.bind_texture_2d(&interface, &texture)),
               PreconditionError::TextureUnitsExhausted);
}

#[test]
fn allocate_and_bind() {
    let interface = build_interface_with_units(2);
    let mut allocator = TextureUnitAllocator::new(&interface, 2);

    let (unit, texture) = allocator
        .allocate_texture_2d(&interface, 8, 8, TextureFormat::RGBA8, TextureWrap::Repeat,
                             TextureWrap::Repeat, TextureFilterMin::Linear,
                             TextureFilterMag::Linear)
        .unwrap();
    assert!(interface.textures_2d().texture_2d_is_bound(unit, &texture).unwrap());

    let (unit, cube) = allocator
        .allocate_texture_cube(&interface, 8, TextureFormat::RGBA8, TextureWrap::Repeat,
                               TextureWrap::Repeat, TextureWrap::Repeat,
                               TextureFilterMin::Linear, TextureFilterMag::Linear)
        .unwrap();
    assert_eq!(unit.index(), 1);
    assert!(interface.textures_cube().texture_cube_is_bound(unit, &cube).unwrap());

    // no unit left, so nothing is allocated
    assert_eq!(support::precondition(allocator.allocate_texture_2d(
                   &interface, 8, 8, TextureFormat::RGBA8, TextureWrap::Repeat,
                   TextureWrap::Repeat, TextureFilterMin::Linear, TextureFilterMag::Linear)),
               PreconditionError::TextureUnitsExhausted);
}
