use glguard::buffer::ArrayBuffer;
use glguard::texture::Texture2D;
use glguard::{FakeConfig, PreconditionError, ResourceKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

mod support;

const UNITS: usize = 4;

struct Model {
    buffers: Vec<(ArrayBuffer, bool)>,
    bound_buffer: Option<usize>,
    textures: Vec<(Texture2D, bool)>,
    units: [Option<usize>; UNITS],
}

impl Model {
    fn live(&self) -> usize {
        self.buffers.iter().filter(|&&(_, alive)| alive).count() +
            self.textures.iter().filter(|&&(_, alive)| alive).count()
    }
}

fn run(seed: u64, config: FakeConfig) {
    let mut rng = StdRng::seed_from_u64(seed);
    let (interface, driver) = support::build_interface_with(config);
    let buffers = interface.array_buffers();
    let textures = interface.textures_2d();
    let units = interface.textures().texture_units();
    let base = driver.live_objects();

    let mut model = Model {
        buffers: Vec::new(),
        bound_buffer: None,
        textures: Vec::new(),
        units: [None; UNITS],
    };

    for _ in 0 .. 300 {
        match rng.gen_range(0 .. 9) {
            0 => {
                let buffer = support::build_array_buffer(&interface, rng.gen_range(1 .. 16));
                model.buffers.push((buffer, true));
            },
            1 => {
                model.textures.push((support::build_texture_2d(&interface), true));
            },
            2 if !model.buffers.is_empty() => {
                let index = rng.gen_range(0 .. model.buffers.len());
                let (ref buffer, alive) = model.buffers[index];
                let result = buffers.array_buffer_bind(buffer);
                if alive {
                    result.unwrap();
                    model.bound_buffer = Some(index);
                } else {
                    assert_eq!(support::precondition(result),
                               PreconditionError::Deleted(ResourceKind::ArrayBuffer));
                }
            },
            3 => {
                buffers.array_buffer_unbind().unwrap();
                model.bound_buffer = None;
            },
            4 if !model.buffers.is_empty() => {
                let index = rng.gen_range(0 .. model.buffers.len());
                let result = buffers.array_buffer_delete(&model.buffers[index].0);
                if model.buffers[index].1 {
                    result.unwrap();
                    model.buffers[index].1 = false;
                    if model.bound_buffer == Some(index) {
                        model.bound_buffer = None;
                    }
                } else {
                    assert_eq!(support::precondition(result),
                               PreconditionError::Deleted(ResourceKind::ArrayBuffer));
                }
            },
            5 if !model.textures.is_empty() => {
                let index = rng.gen_range(0 .. model.textures.len());
                let unit = rng.gen_range(0 .. UNITS);
                let result = textures.texture_2d_bind(units[unit], &model.textures[index].0);
                if model.textures[index].1 {
                    result.unwrap();
                    model.units[unit] = Some(index);
                } else {
                    assert_eq!(support::precondition(result),
                               PreconditionError::Deleted(ResourceKind::Texture2D));
                }
            },
            6 => {
                let unit = rng.gen_range(0 .. UNITS);
                interface.textures().texture_unit_unbind(units[unit]).unwrap();
                model.units[unit] = None;
            },
            7 if !model.textures.is_empty() => {
                let index = rng.gen_range(0 .. model.textures.len());
                let result = textures.texture_2d_delete(&model.textures[index].0);
                if model.textures[index].1 {
                    result.unwrap();
                    model.textures[index].1 = false;
                    for bound in model.units.iter_mut() {
                        if *bound == Some(index) {
                            *bound = None;
                        }
                    }
                } else {
                    assert_eq!(support::precondition(result),
                               PreconditionError::Deleted(ResourceKind::Texture2D));
                }
            },
            _ => (),
        }

        // the interface must agree with the model after every step
        assert_eq!(buffers.array_buffer_any_is_bound(), model.bound_buffer.is_some());
        for (index, &(ref buffer, alive)) in model.buffers.iter().enumerate() {
            match buffers.array_buffer_is_bound(buffer) {
                Ok(bound) => {
                    assert!(alive);
                    assert_eq!(bound, model.bound_buffer == Some(index));
                },
                Err(_) => assert!(!alive),
            }
        }

        for (unit, &bound) in model.units.iter().enumerate() {
            assert_eq!(interface.textures().texture_unit_is_bound(units[unit]).unwrap(),
                       bound.is_some());
            if let Some(index) = bound {
                assert!(textures.texture_2d_is_bound(units[unit], &model.textures[index].0)
                                .unwrap());
            }
        }

        assert_eq!(driver.live_objects() - base, model.live());
    }
}

#[test]
fn random_lifecycles_gl33() {
    for seed in 0 .. 8 {
        run(seed, FakeConfig::gl33());
    }
}

#[test]
fn random_lifecycles_on_every_profile() {
    let seed = rand::random();
    for config in support::all_configs() {
        run(seed, config);
    }
}
