/*!
Two-dimensional and cube map textures, and the texture units they are bound to.

A texture is used by binding it to a `TextureUnit`, and then by writing the unit to a sampler
uniform of the active program. Updating a texture or regenerating its mipmaps also goes
through a unit: the texture must be bound to the unit that is named.

```no_run
# use glguard::{ContextBuilder, FakeDriver, FakeConfig};
use glguard::texture::{TextureFilterMag, TextureFilterMin, TextureFormat, TextureUpdate,
                       TextureWrap};
use glguard::Rect;

# let interface = ContextBuilder::new().build(FakeDriver::new(FakeConfig::gl33())).unwrap();
let textures = interface.textures_2d();
let units = interface.textures().texture_units();

let texture = textures.texture_2d_allocate(64, 64, TextureFormat::RGBA8,
                                           TextureWrap::Repeat, TextureWrap::Repeat,
                                           TextureFilterMin::Linear,
                                           TextureFilterMag::Linear).unwrap();
textures.texture_2d_bind(units[0], &texture).unwrap();

let update = TextureUpdate::new(TextureFormat::RGBA8, Rect::new(0, 0, 2, 2),
                                vec![255; 2 * 2 * 4]).unwrap();
textures.texture_2d_update(units[0], &texture, &update).unwrap();
```

Binding a texture that is attached to the draw framebuffer would make the draw calls read and
write the same memory, so it is refused with `PreconditionError::FeedbackLoop`.

*/
use std::rc::Rc;

use log::trace;

use crate::context::{CommandContext, Context, UnitBinding};
use crate::gl;
use crate::state::Rect;
use crate::{Error, PreconditionError, ToGlEnum};

pub use self::cube::{CubeMapFace, TextureCube, TexturesCube};
pub use self::format::TextureFormat;
pub use self::texture2d::{Texture2D, Textures2D};

mod cube;
mod format;
mod texture2d;
pub mod unit_allocator;

/// A texture unit of the context.
///
/// The units of a context are listed by `Textures::texture_units`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureUnit(u32);

impl TextureUnit {
    /// Index of the unit, as written to sampler uniforms.
    #[inline]
    pub fn index(&self) -> u32 {
        self.0
    }
}

/// Function to use for out-of-bounds texture coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    /// Samples at coord `x + 1` map to coord `x`.
    Repeat,

    /// Samples at coord `x + 1` map to coord `1 - x`.
    MirroredRepeat,

    /// Samples at coord `x + 1` map to coord `1`.
    ClampToEdge,
}

impl ToGlEnum for TextureWrap {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        match *self {
            TextureWrap::Repeat => gl::REPEAT,
            TextureWrap::MirroredRepeat => gl::MIRRORED_REPEAT,
            TextureWrap::ClampToEdge => gl::CLAMP_TO_EDGE,
        }
    }
}

/// The function that the GPU will use when loading the value of a texel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureFilterMag {
    /// The nearest texel will be loaded.
    Nearest,

    /// All nearby texels will be loaded and their values will be merged.
    Linear,
}

impl ToGlEnum for TextureFilterMag {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        match *self {
            TextureFilterMag::Nearest => gl::NEAREST,
            TextureFilterMag::Linear => gl::LINEAR,
        }
    }
}

/// The function that the GPU will use when loading the value of a texel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureFilterMin {
    /// The nearest texel will be loaded.
    ///
    /// Only uses the main texture, mipmaps are totally ignored.
    Nearest,

    /// All nearby texels will be loaded and their values will be merged.
    ///
    /// Only uses the main texture, mipmaps are totally ignored.
    Linear,

    /// The nearest texel of the nearest mipmap will be loaded.
    NearestMipmapNearest,

    /// Takes the nearest texel from the two nearest mipmaps, and merges them.
    LinearMipmapNearest,

    /// Same as `Linear` but from the nearest mipmap.
    NearestMipmapLinear,

    /// Same as `Linear` but from the two nearest mipmaps.
    LinearMipmapLinear,
}

impl TextureFilterMin {
    /// Returns true if the filter samples the mipmaps.
    #[inline]
    pub fn uses_mipmaps(&self) -> bool {
        !matches!(*self, TextureFilterMin::Nearest | TextureFilterMin::Linear)
    }
}

impl ToGlEnum for TextureFilterMin {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        match *self {
            TextureFilterMin::Nearest => gl::NEAREST,
            TextureFilterMin::Linear => gl::LINEAR,
            TextureFilterMin::NearestMipmapNearest => gl::NEAREST_MIPMAP_NEAREST,
            TextureFilterMin::LinearMipmapNearest => gl::LINEAR_MIPMAP_NEAREST,
            TextureFilterMin::NearestMipmapLinear => gl::NEAREST_MIPMAP_LINEAR,
            TextureFilterMin::LinearMipmapLinear => gl::LINEAR_MIPMAP_LINEAR,
        }
    }
}

/// New contents for a region of a texture.
///
/// The pixels are tightly packed rows, starting with the bottom row.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureUpdate {
    format: TextureFormat,
    area: Rect,
    data: Vec<u8>,
}

impl TextureUpdate {
    /// Builds an update of `area`, whose pixels are in the given format.
    ///
    /// Fails if `data` isn't exactly `width * height * bytes_per_pixel` bytes long.
    pub fn new(format: TextureFormat, area: Rect, data: Vec<u8>)
               -> Result<TextureUpdate, PreconditionError>
    {
        let expected = area.width as usize * area.height as usize * format.bytes_per_pixel();
        if data.len() != expected {
            return Err(PreconditionError::DataSizeMismatch { expected, given: data.len() });
        }

        Ok(TextureUpdate { format, area, data })
    }

    /// The format of the pixels.
    #[inline]
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// The region that is updated.
    #[inline]
    pub fn area(&self) -> &Rect {
        &self.area
    }

    /// The pixels.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Checks that the update can be applied to a texture of this format and size.
    fn check(&self, format: TextureFormat, width: u32, height: u32)
             -> Result<(), PreconditionError>
    {
        if self.format != format {
            return Err(PreconditionError::TypeMismatch {
                expected: format!("{:?}", format),
                given: format!("{:?}", self.format),
            });
        }

        let right = self.area.left as u64 + self.area.width as u64;
        if right > width as u64 {
            return Err(PreconditionError::OutOfRange { index: right - 1, limit: width as u64 });
        }

        let top = self.area.bottom as u64 + self.area.height as u64;
        if top > height as u64 {
            return Err(PreconditionError::OutOfRange { index: top - 1, limit: height as u64 });
        }

        Ok(())
    }
}

/// Operations on texture units.
pub trait Textures {
    /// Returns the texture units that can be used.
    fn texture_units(&self) -> Vec<TextureUnit>;

    /// Unbinds whatever texture is bound to the unit.
    fn texture_unit_unbind(&self, unit: TextureUnit) -> Result<(), Error>;

    /// Returns true if a texture is bound to the unit.
    fn texture_unit_is_bound(&self, unit: TextureUnit) -> Result<bool, Error>;

    /// Maximum width and height of a texture.
    fn texture_max_size(&self) -> u32;

    /// Maximum size of the faces of a cube texture.
    fn texture_cube_max_size(&self) -> u32;
}

/// Implementation of `Textures`, `Textures2D` and `TexturesCube` for every profile.
pub(crate) struct GlTextures {
    context: Rc<Context>,
}

impl GlTextures {
    pub fn new(context: Rc<Context>) -> GlTextures {
        GlTextures { context }
    }
}

impl Textures for GlTextures {
    fn texture_units(&self) -> Vec<TextureUnit> {
        (0 .. self.context.capabilities().texture_units).map(TextureUnit).collect()
    }

    fn texture_unit_unbind(&self, unit: TextureUnit) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        unbind_unit(&mut ctxt, unit)
    }

    fn texture_unit_is_bound(&self, unit: TextureUnit) -> Result<bool, Error> {
        let ctxt = self.context.make_current();
        check_unit(&ctxt, unit)?;
        Ok(ctxt.bindings.texture_units[unit.0 as usize].is_some())
    }

    fn texture_max_size(&self) -> u32 {
        self.context.capabilities().max_texture_size
    }

    fn texture_cube_max_size(&self) -> u32 {
        self.context.capabilities().max_cube_map_texture_size
    }
}

/// Checks that the unit exists in this context.
fn check_unit(ctxt: &CommandContext<'_>, unit: TextureUnit) -> Result<(), Error> {
    let units = ctxt.bindings.texture_units.len() as u32;
    if unit.0 >= units {
        return Err(PreconditionError::OutOfRange {
            index: unit.0 as u64,
            limit: units as u64,
        }.into());
    }

    Ok(())
}

/// Checks the dimensions and the format of a new texture.
fn check_allocation(ctxt: &CommandContext<'_>, kind: crate::ResourceKind, width: u32,
                    height: u32, max: u32, format: TextureFormat) -> Result<(), Error>
{
    if width == 0 || height == 0 {
        return Err(PreconditionError::ZeroSize(kind).into());
    }

    if width > max || height > max {
        return Err(PreconditionError::TooLarge { size: width.max(height), max }.into());
    }

    if !format.is_available(ctxt.profile, ctxt.extensions) {
        return Err(PreconditionError::NotSupported("texture format").into());
    }

    Ok(())
}

/// Sets the wrapping and filtering parameters of the texture bound to `target`.
fn set_parameters(ctxt: &mut CommandContext<'_>, target: gl::types::GLenum,
                  parameters: &[(gl::types::GLenum, gl::types::GLenum)]) -> Result<(), Error>
{
    for &(name, value) in parameters {
        let value = value as gl::types::GLint;
        ctxt.call(format_args!("glTexParameteri(0x{:x}, 0x{:x}, 0x{:x})", target, name, value),
                  |gl| gl.tex_parameter(target, name, value))?;
    }

    Ok(())
}

/// Binds a texture to a unit on behalf of the user.
fn bind_unit(ctxt: &mut CommandContext<'_>, unit: TextureUnit, binding: UnitBinding,
             id: gl::types::GLuint) -> Result<(), Error>
{
    check_unit(ctxt, unit)?;

    let attached = ctxt.bindings.draw_framebuffer
        .and_then(|raw| ctxt.resources.framebuffers.get(raw).ok())
        .map(|fb| fb.textures.contains(&binding))
        .unwrap_or(false);
    if attached {
        return Err(PreconditionError::FeedbackLoop.into());
    }

    // a unit holds a single texture, whatever its target
    let (target, other) = match binding {
        UnitBinding::Texture2D(_) => (gl::TEXTURE_2D, gl::TEXTURE_CUBE_MAP),
        UnitBinding::TextureCube(_) => (gl::TEXTURE_CUBE_MAP, gl::TEXTURE_2D),
    };

    let previous = ctxt.bindings.texture_units[unit.0 as usize];
    if previous.map(|b| b.target() == other).unwrap_or(false) {
        ctxt.bind_texture(unit.0, other, 0)?;
    }

    trace!("Binding {:?} to unit {}", binding, unit.0);
    ctxt.bind_texture(unit.0, target, id)?;
    ctxt.bindings.texture_units[unit.0 as usize] = Some(binding);
    Ok(())
}

fn unbind_unit(ctxt: &mut CommandContext<'_>, unit: TextureUnit) -> Result<(), Error> {
    check_unit(ctxt, unit)?;

    if let Some(binding) = ctxt.bindings.texture_units[unit.0 as usize].take() {
        trace!("Unbinding unit {}", unit.0);
        ctxt.bind_texture(unit.0, binding.target(), 0)?;
    }

    Ok(())
}

/// Checks that the texture is bound to the unit.
fn check_bound(ctxt: &CommandContext<'_>, unit: TextureUnit, binding: UnitBinding,
               kind: crate::ResourceKind) -> Result<(), Error>
{
    check_unit(ctxt, unit)?;
    if ctxt.bindings.texture_units[unit.0 as usize] != Some(binding) {
        return Err(PreconditionError::NotBound(kind).into());
    }

    Ok(())
}

/// Forgets the logical bindings of a texture that is being deleted.
fn unbind_everywhere(ctxt: &mut CommandContext<'_>, binding: UnitBinding) {
    for slot in ctxt.bindings.texture_units.iter_mut() {
        if *slot == Some(binding) {
            *slot = None;
        }
    }
}

impl UnitBinding {
    /// The bind target of the texture.
    #[inline]
    pub(crate) fn target(&self) -> gl::types::GLenum {
        match *self {
            UnitBinding::Texture2D(_) => gl::TEXTURE_2D,
            UnitBinding::TextureCube(_) => gl::TEXTURE_CUBE_MAP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TextureFilterMin, TextureFormat, TextureUpdate};
    use crate::state::Rect;
    use crate::PreconditionError;

    #[test]
    fn update_length_must_match() {
        let ok = TextureUpdate::new(TextureFormat::RGBA8, Rect::new(0, 0, 4, 2), vec![0; 32]);
        assert!(ok.is_ok());

        let short = TextureUpdate::new(TextureFormat::RGB565, Rect::new(0, 0, 4, 2), vec![0; 8]);
        assert_eq!(short, Err(PreconditionError::DataSizeMismatch { expected: 16, given: 8 }));
    }

    #[test]
    fn update_must_fit() {
        let update = TextureUpdate::new(TextureFormat::R8, Rect::new(2, 0, 3, 1), vec![0; 3])
            .unwrap();
        assert_eq!(update.check(TextureFormat::R8, 5, 1), Ok(()));
        assert_eq!(update.check(TextureFormat::R8, 4, 1),
                   Err(PreconditionError::OutOfRange { index: 4, limit: 4 }));
        assert!(matches!(update.check(TextureFormat::RG8, 5, 1),
                         Err(PreconditionError::TypeMismatch { .. })));
    }

    #[test]
    fn mipmap_filters() {
        assert!(!TextureFilterMin::Linear.uses_mipmaps());
        assert!(TextureFilterMin::LinearMipmapNearest.uses_mipmaps());
    }
}
