/*!
Stack-based allocation of texture units.

Rendering code is often nested: a renderer binds a few textures, then calls into a helper that
binds its own textures without knowing which units are already taken. The allocator hands out
units from a stack of contexts. Each context continues where its parent stopped, and popping
a context rebinds what the parent had bound.

```no_run
# use glguard::{ContextBuilder, FakeDriver, FakeConfig};
# use glguard::texture::{TextureFilterMag, TextureFilterMin, TextureFormat, TextureWrap};
use glguard::texture::unit_allocator::TextureUnitAllocator;

# let interface = ContextBuilder::new().build(FakeDriver::new(FakeConfig::gl33())).unwrap();
# let texture = interface.textures_2d().texture_2d_allocate(4, 4, TextureFormat::RGBA8,
#     TextureWrap::Repeat, TextureWrap::Repeat, TextureFilterMin::Linear,
#     TextureFilterMag::Linear).unwrap();
let mut allocator = TextureUnitAllocator::new(&interface, 8);

let first = allocator.bind_texture_2d(&interface, &texture).unwrap();

allocator.push_context().unwrap();
let second = allocator.bind_texture_2d(&interface, &texture).unwrap();
assert_eq!(second.index(), first.index() + 1);
allocator.pop_context(&interface).unwrap();
```

*/
use log::trace;
use smallvec::SmallVec;

use crate::interface::Interface;
use crate::texture::{Texture2D, TextureCube, TextureFilterMag, TextureFilterMin, TextureFormat,
                     TextureUnit, TextureWrap};
use crate::{Error, PreconditionError};

#[derive(Debug, Clone)]
enum Bound {
    Texture2D(Texture2D),
    TextureCube(TextureCube),
}

#[derive(Debug, Clone)]
struct Frame {
    /// Index of the first unit that this frame hasn't used.
    next: usize,
    bindings: SmallVec<[Option<Bound>; 32]>,
}

/// Allocates texture units from a stack of contexts.
#[derive(Debug)]
pub struct TextureUnitAllocator {
    units: Vec<TextureUnit>,
    max_depth: usize,
    frames: Vec<Frame>,
}

impl TextureUnitAllocator {
    /// Builds an allocator over the units of the interface. The stack starts with the root
    /// context, and can hold up to `max_depth` contexts.
    ///
    /// # Panic
    ///
    /// Panics if `max_depth` is zero.
    pub fn new(interface: &Interface, max_depth: usize) -> TextureUnitAllocator {
        assert!(max_depth >= 1, "The stack must be able to hold the root context");

        let units = interface.textures().texture_units();
        let root = Frame {
            next: 0,
            bindings: SmallVec::from_elem(None, units.len()),
        };

        TextureUnitAllocator {
            units,
            max_depth,
            frames: vec![root],
        }
    }

    /// Number of contexts on the stack, the root included.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Number of units used by the current context and its parents.
    #[inline]
    pub fn units_used(&self) -> usize {
        self.current().next
    }

    /// Number of units that the current context can still hand out.
    #[inline]
    pub fn units_free(&self) -> usize {
        self.units.len() - self.current().next
    }

    fn current(&self) -> &Frame {
        self.frames.last().expect("the root context is never popped")
    }

    fn current_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("the root context is never popped")
    }

    fn check_available(&self, required: usize) -> Result<(), Error> {
        if self.current().next + required > self.units.len() {
            return Err(PreconditionError::TextureUnitsExhausted.into());
        }

        Ok(())
    }

    /// Starts a new context, that sees the bindings of the current one.
    pub fn push_context(&mut self) -> Result<(), Error> {
        if self.frames.len() >= self.max_depth {
            return Err(PreconditionError::UnitContextStackFull.into());
        }

        trace!("Pushing texture unit context {}", self.frames.len());
        let frame = self.current().clone();
        self.frames.push(frame);
        Ok(())
    }

    /// Starts a new context, after checking that `reserved` more units are available.
    pub fn push_context_with_reserved(&mut self, reserved: usize) -> Result<(), Error> {
        self.check_available(reserved)?;
        self.push_context()
    }

    /// Binds a texture to the next free unit of the current context.
    pub fn bind_texture_2d(&mut self, interface: &Interface, texture: &Texture2D)
                           -> Result<TextureUnit, Error>
    {
        self.check_available(1)?;
        let unit = self.units[self.current().next];
        interface.textures_2d().texture_2d_bind(unit, texture)?;
        self.record(Bound::Texture2D(texture.clone()));
        Ok(unit)
    }

    /// Binds a cube map to the next free unit of the current context.
    pub fn bind_texture_cube(&mut self, interface: &Interface, texture: &TextureCube)
                             -> Result<TextureUnit, Error>
    {
        self.check_available(1)?;
        let unit = self.units[self.current().next];
        interface.textures_cube().texture_cube_bind(unit, texture)?;
        self.record(Bound::TextureCube(texture.clone()));
        Ok(unit)
    }

    /// Allocates a texture and binds it to the next free unit of the current context.
    #[allow(clippy::too_many_arguments)]
    pub fn allocate_texture_2d(&mut self, interface: &Interface, width: u32, height: u32,
                               format: TextureFormat, wrap_s: TextureWrap,
                               wrap_t: TextureWrap, min_filter: TextureFilterMin,
                               mag_filter: TextureFilterMag)
                               -> Result<(TextureUnit, Texture2D), Error>
    {
        self.check_available(1)?;
        let texture = interface.textures_2d().texture_2d_allocate(width, height, format,
                                                                  wrap_s, wrap_t, min_filter,
                                                                  mag_filter)?;
        let unit = self.bind_texture_2d(interface, &texture)?;
        Ok((unit, texture))
    }

    /// Allocates a cube map and binds it to the next free unit of the current context.
    #[allow(clippy::too_many_arguments)]
    pub fn allocate_texture_cube(&mut self, interface: &Interface, size: u32,
                                 format: TextureFormat, wrap_r: TextureWrap,
                                 wrap_s: TextureWrap, wrap_t: TextureWrap,
                                 min_filter: TextureFilterMin, mag_filter: TextureFilterMag)
                                 -> Result<(TextureUnit, TextureCube), Error>
    {
        self.check_available(1)?;
        let texture = interface.textures_cube().texture_cube_allocate(size, format, wrap_r,
                                                                      wrap_s, wrap_t,
                                                                      min_filter, mag_filter)?;
        let unit = self.bind_texture_cube(interface, &texture)?;
        Ok((unit, texture))
    }

    fn record(&mut self, bound: Bound) {
        let frame = self.current_mut();
        frame.bindings[frame.next] = Some(bound);
        frame.next += 1;
    }

    /// Ends the current context, and rebinds every unit the way the parent context had it.
    ///
    /// Textures of the parent that have been deleted in the meantime leave their unit unbound.
    pub fn pop_context(&mut self, interface: &Interface) -> Result<(), Error> {
        if self.frames.len() == 1 {
            return Err(PreconditionError::UnitContextRoot.into());
        }

        self.frames.pop();
        trace!("Popped texture unit context, restoring context {}", self.frames.len() - 1);

        let units = self.units.clone();
        let frame = self.current_mut();
        for (unit, binding) in units.into_iter().zip(frame.bindings.iter_mut()) {
            let restored = match *binding {
                Some(Bound::Texture2D(ref t)) => interface.textures_2d().texture_2d_bind(unit, t),
                Some(Bound::TextureCube(ref t)) =>
                    interface.textures_cube().texture_cube_bind(unit, t),
                None => interface.textures().texture_unit_unbind(unit),
            };

            match restored {
                Err(Error::Precondition(PreconditionError::Deleted(_))) => {
                    trace!("Unit {} restored as unbound, its texture was deleted", unit.index());
                    *binding = None;
                    interface.textures().texture_unit_unbind(unit)?;
                },
                other => other?,
            }
        }

        Ok(())
    }
}
