use std::fmt;

use log::debug;

use crate::context::UnitBinding;
use crate::gl;
use crate::resource::{RawHandle, Record, ResourceKind};
use crate::texture::{self, GlTextures, TextureFilterMag, TextureFilterMin, TextureFormat,
                     TextureUnit, TextureUpdate, TextureWrap};
use crate::{Error, GlObject, PreconditionError, ToGlEnum};

/// A face of a cube map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CubeMapFace {
    /// The +X face.
    PositiveX,
    /// The -X face.
    NegativeX,
    /// The +Y face.
    PositiveY,
    /// The -Y face.
    NegativeY,
    /// The +Z face.
    PositiveZ,
    /// The -Z face.
    NegativeZ,
}

impl CubeMapFace {
    /// The six faces, in the order of their enums.
    pub const ALL: [CubeMapFace; 6] = [
        CubeMapFace::PositiveX, CubeMapFace::NegativeX,
        CubeMapFace::PositiveY, CubeMapFace::NegativeY,
        CubeMapFace::PositiveZ, CubeMapFace::NegativeZ,
    ];
}

impl ToGlEnum for CubeMapFace {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        match *self {
            CubeMapFace::PositiveX => gl::TEXTURE_CUBE_MAP_POSITIVE_X,
            CubeMapFace::NegativeX => gl::TEXTURE_CUBE_MAP_NEGATIVE_X,
            CubeMapFace::PositiveY => gl::TEXTURE_CUBE_MAP_POSITIVE_Y,
            CubeMapFace::NegativeY => gl::TEXTURE_CUBE_MAP_NEGATIVE_Y,
            CubeMapFace::PositiveZ => gl::TEXTURE_CUBE_MAP_POSITIVE_Z,
            CubeMapFace::NegativeZ => gl::TEXTURE_CUBE_MAP_NEGATIVE_Z,
        }
    }
}

/// Handle to a cube map texture. The six faces are squares of the same size.
#[derive(Clone)]
pub struct TextureCube {
    pub(crate) raw: RawHandle,
    pub(crate) id: gl::types::GLuint,
    size: u32,
    format: TextureFormat,
    wrap: [TextureWrap; 3],
    min_filter: TextureFilterMin,
    mag_filter: TextureFilterMag,
}

impl TextureCube {
    /// Width and height of each face.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Format of the texels.
    #[inline]
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Wrapping along the R, S and T coordinates.
    #[inline]
    pub fn wrap(&self) -> [TextureWrap; 3] {
        self.wrap
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

    #[inline]
    pub(crate) fn binding(&self) -> UnitBinding {
        UnitBinding::TextureCube(self.raw)
    }
}

impl PartialEq for TextureCube {
    #[inline]
    fn eq(&self, other: &TextureCube) -> bool {
        self.raw == other.raw
    }
}

impl Eq for TextureCube {}

impl fmt::Debug for TextureCube {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "TextureCube #{} ({}x{}, {:?})", self.id, self.size, self.size, self.format)
    }
}

impl GlObject for TextureCube {
    type Id = gl::types::GLuint;

    #[inline]
    fn get_id(&self) -> gl::types::GLuint {
        self.id
    }
}

/// Operations on cube map textures.
pub trait TexturesCube {
    /// Allocates a cube map whose faces are `size` by `size` pixels. The contents are undefined.
    #[allow(clippy::too_many_arguments)]
    fn texture_cube_allocate(&self, size: u32, format: TextureFormat, wrap_r: TextureWrap,
                             wrap_s: TextureWrap, wrap_t: TextureWrap,
                             min_filter: TextureFilterMin, mag_filter: TextureFilterMag)
                             -> Result<TextureCube, Error>;

    /// Binds the texture to a unit, replacing whatever was bound to it.
    fn texture_cube_bind(&self, unit: TextureUnit, texture: &TextureCube) -> Result<(), Error>;

    /// Returns true if the texture is bound to this unit.
    fn texture_cube_is_bound(&self, unit: TextureUnit, texture: &TextureCube)
                             -> Result<bool, Error>;

    /// Returns true if the texture is bound to any unit.
    fn texture_cube_is_bound_anywhere(&self, texture: &TextureCube) -> Result<bool, Error>;

    /// Replaces a region of a face. The texture must be bound to `unit`.
    fn texture_cube_update(&self, unit: TextureUnit, texture: &TextureCube, face: CubeMapFace,
                           update: &TextureUpdate) -> Result<(), Error>;

    /// Rebuilds the mipmaps of every face. The texture must be bound to `unit`.
    fn texture_cube_regenerate_mipmaps(&self, unit: TextureUnit, texture: &TextureCube)
                                       -> Result<(), Error>;

    /// Reads the base level of a face back. The texture must be bound to `unit`.
    ///
    /// Not supported on OpenGL ES.
    fn texture_cube_get_image(&self, unit: TextureUnit, texture: &TextureCube,
                              face: CubeMapFace) -> Result<Vec<u8>, Error>;

    /// Deletes the texture, unbinding it from every unit.
    fn texture_cube_delete(&self, texture: &TextureCube) -> Result<(), Error>;
}

impl TexturesCube for GlTextures {
    fn texture_cube_allocate(&self, size: u32, format: TextureFormat, wrap_r: TextureWrap,
                             wrap_s: TextureWrap, wrap_t: TextureWrap,
                             min_filter: TextureFilterMin, mag_filter: TextureFilterMag)
                             -> Result<TextureCube, Error>
    {
        let mut ctxt = self.context.make_current();
        let max = ctxt.capabilities.max_cube_map_texture_size;
        texture::check_allocation(&ctxt, ResourceKind::TextureCube, size, size, max, format)?;

        let internal_format = format.internal_format_for(ctxt.profile);
        let (client_format, client_type) = format.client_format();

        let mut parameters = vec![
            (gl::TEXTURE_WRAP_S, wrap_s.to_glenum()),
            (gl::TEXTURE_WRAP_T, wrap_t.to_glenum()),
            (gl::TEXTURE_MIN_FILTER, min_filter.to_glenum()),
            (gl::TEXTURE_MAG_FILTER, mag_filter.to_glenum()),
        ];

        // GLES 2 has no third texture coordinate
        if ctxt.profile != crate::context::Profile::Gles2 {
            parameters.push((gl::TEXTURE_WRAP_R, wrap_r.to_glenum()));
        }

        let side = size as gl::types::GLsizei;
        let id = ctxt.call(format_args!("glGenTextures(1)"), |gl| gl.gen_texture())?;
        ctxt.created(|ctxt| {
            ctxt.bind_texture(0, gl::TEXTURE_CUBE_MAP, id)?;
            texture::set_parameters(ctxt, gl::TEXTURE_CUBE_MAP, &parameters)?;

            for face in CubeMapFace::ALL.iter() {
                let target = face.to_glenum();
                ctxt.call(format_args!("glTexImage2D(0x{:x}, 0, 0x{:x}, {}, {}, 0, 0x{:x}, \
                                        0x{:x}, NULL)", target, internal_format, side, side,
                                       client_format, client_type),
                          |gl| gl.tex_image_2d(target, 0, internal_format, side, side,
                                               client_format, client_type, None))?;
            }

            ctxt.restore_texture_unit(0, gl::TEXTURE_CUBE_MAP)
        }, |ctxt| {
            ctxt.delete_texture(id)?;
            ctxt.restore_texture_unit(0, gl::TEXTURE_CUBE_MAP)
        })?;

        let label = format!("texture-cube-{}", id);
        let raw = ctxt.resources.textures_cube.insert(Record::new(id, label));

        debug!("Allocated cube texture {} ({}x{}, {:?})", id, size, size, format);
        Ok(TextureCube {
            raw, id, size, format,
            wrap: [wrap_r, wrap_s, wrap_t],
            min_filter, mag_filter,
        })
    }

    fn texture_cube_bind(&self, unit: TextureUnit, texture: &TextureCube) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.textures_cube.get(texture.raw)?;
        texture::bind_unit(&mut ctxt, unit, texture.binding(), texture.id)
    }

    fn texture_cube_is_bound(&self, unit: TextureUnit, texture: &TextureCube)
                             -> Result<bool, Error>
    {
        let ctxt = self.context.make_current();
        ctxt.resources.textures_cube.get(texture.raw)?;
        texture::check_unit(&ctxt, unit)?;
        Ok(ctxt.bindings.texture_units[unit.index() as usize] == Some(texture.binding()))
    }

    fn texture_cube_is_bound_anywhere(&self, texture: &TextureCube) -> Result<bool, Error> {
        let ctxt = self.context.make_current();
        ctxt.resources.textures_cube.get(texture.raw)?;
        let bound = ctxt.bindings.units_of(texture.binding()).next().is_some();
        Ok(bound)
    }

    fn texture_cube_update(&self, unit: TextureUnit, texture: &TextureCube, face: CubeMapFace,
                           update: &TextureUpdate) -> Result<(), Error>
    {
        let mut ctxt = self.context.make_current();
        ctxt.resources.textures_cube.get(texture.raw)?;
        texture::check_bound(&ctxt, unit, texture.binding(), ResourceKind::TextureCube)?;
        update.check(texture.format, texture.size, texture.size)?;

        let area = update.area();
        let (x, y) = (area.left as gl::types::GLint, area.bottom as gl::types::GLint);
        let (w, h) = (area.width as gl::types::GLsizei, area.height as gl::types::GLsizei);
        let (client_format, client_type) = texture.format.client_format();
        let target = face.to_glenum();
        let data = update.data();

        ctxt.bind_texture(unit.index(), gl::TEXTURE_CUBE_MAP, texture.id)?;
        ctxt.call(format_args!("glTexSubImage2D(0x{:x}, 0, {}, {}, {}, {}, 0x{:x}, 0x{:x}, ..)",
                               target, x, y, w, h, client_format, client_type),
                  |gl| gl.tex_sub_image_2d(target, 0, x, y, w, h, client_format, client_type,
                                           data))
    }

    fn texture_cube_regenerate_mipmaps(&self, unit: TextureUnit, texture: &TextureCube)
                                       -> Result<(), Error>
    {
        let mut ctxt = self.context.make_current();
        ctxt.resources.textures_cube.get(texture.raw)?;
        texture::check_bound(&ctxt, unit, texture.binding(), ResourceKind::TextureCube)?;
        if texture.format.is_integer() || texture.format.is_depth_renderable() {
            return Err(PreconditionError::NotSupported("mipmaps of this texture format").into());
        }

        ctxt.bind_texture(unit.index(), gl::TEXTURE_CUBE_MAP, texture.id)?;
        ctxt.call(format_args!("glGenerateMipmap(GL_TEXTURE_CUBE_MAP)"),
                  |gl| gl.generate_mipmap(gl::TEXTURE_CUBE_MAP))
    }

    fn texture_cube_get_image(&self, unit: TextureUnit, texture: &TextureCube,
                              face: CubeMapFace) -> Result<Vec<u8>, Error>
    {
        let mut ctxt = self.context.make_current();
        ctxt.resources.textures_cube.get(texture.raw)?;
        texture::check_bound(&ctxt, unit, texture.binding(), ResourceKind::TextureCube)?;
        if ctxt.profile.is_gles() {
            return Err(PreconditionError::NotSupported("reading back textures").into());
        }

        let side = texture.size as usize;
        let mut out = vec![0u8; side * side * texture.format.bytes_per_pixel()];
        let (client_format, client_type) = texture.format.client_format();
        let target = face.to_glenum();

        ctxt.bind_texture(unit.index(), gl::TEXTURE_CUBE_MAP, texture.id)?;
        ctxt.call(format_args!("glGetTexImage(0x{:x}, 0, 0x{:x}, 0x{:x}, ..)",
                               target, client_format, client_type),
                  |gl| gl.get_tex_image(target, 0, client_format, client_type, &mut out))?;
        Ok(out)
    }

    fn texture_cube_delete(&self, texture: &TextureCube) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.textures_cube.remove(texture.raw)?;
        texture::unbind_everywhere(&mut ctxt, texture.binding());

        debug!("Deleting cube texture {}", texture.id);
        ctxt.delete_texture(texture.id)
    }
}
