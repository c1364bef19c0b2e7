use std::fmt;

use log::debug;

use crate::context::UnitBinding;
use crate::gl;
use crate::resource::{RawHandle, Record, ResourceKind};
use crate::texture::{self, GlTextures, TextureFilterMag, TextureFilterMin, TextureFormat,
                     TextureUnit, TextureUpdate, TextureWrap};
use crate::{Error, GlObject, PreconditionError, ToGlEnum};

/// Handle to a two-dimensional texture.
#[derive(Clone)]
pub struct Texture2D {
    pub(crate) raw: RawHandle,
    pub(crate) id: gl::types::GLuint,
    width: u32,
    height: u32,
    format: TextureFormat,
    wrap_s: TextureWrap,
    wrap_t: TextureWrap,
    min_filter: TextureFilterMin,
    mag_filter: TextureFilterMag,
}

impl Texture2D {
    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Format of the texels.
    #[inline]
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Wrapping along the S and T coordinates.
    #[inline]
    pub fn wrap(&self) -> (TextureWrap, TextureWrap) {
        (self.wrap_s, self.wrap_t)
    }

    /// Minification filter.
    #[inline]
    pub fn min_filter(&self) -> TextureFilterMin {
        self.min_filter
    }

    /// Magnification filter.
    #[inline]
    pub fn mag_filter(&self) -> TextureFilterMag {
        self.mag_filter
    }

    /// Size in bytes of the base level.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }

    #[inline]
    pub(crate) fn binding(&self) -> UnitBinding {
        UnitBinding::Texture2D(self.raw)
    }
}

impl PartialEq for Texture2D {
    #[inline]
    fn eq(&self, other: &Texture2D) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Texture2D {}

impl fmt::Debug for Texture2D {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "Texture2D #{} ({}x{}, {:?})", self.id, self.width, self.height,
               self.format)
    }
}

impl GlObject for Texture2D {
    type Id = gl::types::GLuint;

    #[inline]
    fn get_id(&self) -> gl::types::GLuint {
        self.id
    }
}

/// Operations on two-dimensional textures.
pub trait Textures2D {
    /// Allocates a texture. The contents are undefined.
    ///
    /// The texture isn't bound to any unit afterwards.
    #[allow(clippy::too_many_arguments)]
    fn texture_2d_allocate(&self, width: u32, height: u32, format: TextureFormat,
                           wrap_s: TextureWrap, wrap_t: TextureWrap,
                           min_filter: TextureFilterMin, mag_filter: TextureFilterMag)
                           -> Result<Texture2D, Error>;

    /// Binds the texture to a unit, replacing whatever was bound to it.
    fn texture_2d_bind(&self, unit: TextureUnit, texture: &Texture2D) -> Result<(), Error>;

    /// Returns true if the texture is bound to this unit.
    fn texture_2d_is_bound(&self, unit: TextureUnit, texture: &Texture2D)
                           -> Result<bool, Error>;

    /// Returns true if the texture is bound to any unit.
    fn texture_2d_is_bound_anywhere(&self, texture: &Texture2D) -> Result<bool, Error>;

    /// Replaces a region of the base level. The texture must be bound to `unit`.
    fn texture_2d_update(&self, unit: TextureUnit, texture: &Texture2D,
                         update: &TextureUpdate) -> Result<(), Error>;

    /// Rebuilds the mipmaps from the base level. The texture must be bound to `unit`.
    fn texture_2d_regenerate_mipmaps(&self, unit: TextureUnit, texture: &Texture2D)
                                     -> Result<(), Error>;

    /// Reads the base level back, row by row from the bottom. The texture must be bound to
    /// `unit`.
    ///
    /// Not supported on OpenGL ES.
    fn texture_2d_get_image(&self, unit: TextureUnit, texture: &Texture2D)
                            -> Result<Vec<u8>, Error>;

    /// Deletes the texture, unbinding it from every unit.
    fn texture_2d_delete(&self, texture: &Texture2D) -> Result<(), Error>;
}

impl Textures2D for GlTextures {
    fn texture_2d_allocate(&self, width: u32, height: u32, format: TextureFormat,
                           wrap_s: TextureWrap, wrap_t: TextureWrap,
                           min_filter: TextureFilterMin, mag_filter: TextureFilterMag)
                           -> Result<Texture2D, Error>
    {
        let mut ctxt = self.context.make_current();
        let max = ctxt.capabilities.max_texture_size;
        texture::check_allocation(&ctxt, ResourceKind::Texture2D, width, height, max, format)?;

        let internal_format = format.internal_format_for(ctxt.profile);
        let (client_format, client_type) = format.client_format();

        let (w, h) = (width as gl::types::GLsizei, height as gl::types::GLsizei);
        let id = ctxt.call(format_args!("glGenTextures(1)"), |gl| gl.gen_texture())?;
        ctxt.created(|ctxt| {
            ctxt.bind_texture(0, gl::TEXTURE_2D, id)?;
            texture::set_parameters(ctxt, gl::TEXTURE_2D, &[
                (gl::TEXTURE_WRAP_S, wrap_s.to_glenum()),
                (gl::TEXTURE_WRAP_T, wrap_t.to_glenum()),
                (gl::TEXTURE_MIN_FILTER, min_filter.to_glenum()),
                (gl::TEXTURE_MAG_FILTER, mag_filter.to_glenum()),
            ])?;

            ctxt.call(format_args!("glTexImage2D(GL_TEXTURE_2D, 0, 0x{:x}, {}, {}, 0, 0x{:x}, \
                                    0x{:x}, NULL)", internal_format, w, h, client_format,
                                   client_type),
                      |gl| gl.tex_image_2d(gl::TEXTURE_2D, 0, internal_format, w, h,
                                           client_format, client_type, None))?;
            ctxt.restore_texture_unit(0, gl::TEXTURE_2D)
        }, |ctxt| {
            ctxt.delete_texture(id)?;
            ctxt.restore_texture_unit(0, gl::TEXTURE_2D)
        })?;

        let label = format!("texture-2d-{}", id);
        let raw = ctxt.resources.textures_2d.insert(Record::new(id, label));

        debug!("Allocated 2D texture {} ({}x{}, {:?})", id, width, height, format);
        Ok(Texture2D {
            raw, id, width, height, format, wrap_s, wrap_t, min_filter, mag_filter,
        })
    }

    fn texture_2d_bind(&self, unit: TextureUnit, texture: &Texture2D) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.textures_2d.get(texture.raw)?;
        texture::bind_unit(&mut ctxt, unit, texture.binding(), texture.id)
    }

    fn texture_2d_is_bound(&self, unit: TextureUnit, texture: &Texture2D)
                           -> Result<bool, Error>
    {
        let ctxt = self.context.make_current();
        ctxt.resources.textures_2d.get(texture.raw)?;
        texture::check_unit(&ctxt, unit)?;
        Ok(ctxt.bindings.texture_units[unit.index() as usize] == Some(texture.binding()))
    }

    fn texture_2d_is_bound_anywhere(&self, texture: &Texture2D) -> Result<bool, Error> {
        let ctxt = self.context.make_current();
        ctxt.resources.textures_2d.get(texture.raw)?;
        let bound = ctxt.bindings.units_of(texture.binding()).next().is_some();
        Ok(bound)
    }

    fn texture_2d_update(&self, unit: TextureUnit, texture: &Texture2D,
                         update: &TextureUpdate) -> Result<(), Error>
    {
        let mut ctxt = self.context.make_current();
        ctxt.resources.textures_2d.get(texture.raw)?;
        texture::check_bound(&ctxt, unit, texture.binding(), ResourceKind::Texture2D)?;
        update.check(texture.format, texture.width, texture.height)?;

        let area = update.area();
        let (x, y) = (area.left as gl::types::GLint, area.bottom as gl::types::GLint);
        let (w, h) = (area.width as gl::types::GLsizei, area.height as gl::types::GLsizei);
        let (client_format, client_type) = texture.format.client_format();
        let data = update.data();

        ctxt.bind_texture(unit.index(), gl::TEXTURE_2D, texture.id)?;
        ctxt.call(format_args!("glTexSubImage2D(GL_TEXTURE_2D, 0, {}, {}, {}, {}, 0x{:x}, \
                                0x{:x}, ..)", x, y, w, h, client_format, client_type),
                  |gl| gl.tex_sub_image_2d(gl::TEXTURE_2D, 0, x, y, w, h, client_format,
                                           client_type, data))
    }

    fn texture_2d_regenerate_mipmaps(&self, unit: TextureUnit, texture: &Texture2D)
                                     -> Result<(), Error>
    {
        let mut ctxt = self.context.make_current();
        ctxt.resources.textures_2d.get(texture.raw)?;
        texture::check_bound(&ctxt, unit, texture.binding(), ResourceKind::Texture2D)?;
        if texture.format.is_integer() || texture.format.is_depth_renderable() {
            return Err(PreconditionError::NotSupported("mipmaps of this texture format").into());
        }

        ctxt.bind_texture(unit.index(), gl::TEXTURE_2D, texture.id)?;
        ctxt.call(format_args!("glGenerateMipmap(GL_TEXTURE_2D)"),
                  |gl| gl.generate_mipmap(gl::TEXTURE_2D))
    }

    fn texture_2d_get_image(&self, unit: TextureUnit, texture: &Texture2D)
                            -> Result<Vec<u8>, Error>
    {
        let mut ctxt = self.context.make_current();
        ctxt.resources.textures_2d.get(texture.raw)?;
        texture::check_bound(&ctxt, unit, texture.binding(), ResourceKind::Texture2D)?;
        if ctxt.profile.is_gles() {
            return Err(PreconditionError::NotSupported("reading back textures").into());
        }

        let len = texture.width as usize * texture.height as usize *
                  texture.format.bytes_per_pixel();
        let (client_format, client_type) = texture.format.client_format();
        let mut out = vec![0u8; len];

        ctxt.bind_texture(unit.index(), gl::TEXTURE_2D, texture.id)?;
        ctxt.call(format_args!("glGetTexImage(GL_TEXTURE_2D, 0, 0x{:x}, 0x{:x}, ..)",
                               client_format, client_type),
                  |gl| gl.get_tex_image(gl::TEXTURE_2D, 0, client_format, client_type,
                                        &mut out))?;
        Ok(out)
    }

    fn texture_2d_delete(&self, texture: &Texture2D) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.textures_2d.remove(texture.raw)?;
        texture::unbind_everywhere(&mut ctxt, texture.binding());

        debug!("Deleting 2D texture {}", texture.id);
        ctxt.delete_texture(texture.id)
    }
}
