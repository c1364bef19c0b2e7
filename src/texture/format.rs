use crate::context::{ExtensionsList, Profile};
use crate::gl;
use crate::ToGlEnum;

/// Format of the internal representation of a texture.
///
/// The name describes the channels and the size of each channel. `F` suffixes are floating
/// point, `I` and `UI` suffixes are signed and unsigned integers that are read as integers by
/// shaders, and no suffix means unsigned normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum TextureFormat {
    R8,
    RG8,
    RGB8,
    RGBA8,
    R16F,
    RG16F,
    RGB16F,
    RGBA16F,
    R32F,
    RG32F,
    RGB32F,
    RGBA32F,
    R8I,
    RG8I,
    RGB8I,
    RGBA8I,
    R8UI,
    RG8UI,
    RGB8UI,
    RGBA8UI,
    R16I,
    RG16I,
    RGB16I,
    RGBA16I,
    R16UI,
    RG16UI,
    RGB16UI,
    RGBA16UI,
    R32I,
    RG32I,
    RGB32I,
    RGBA32I,
    R32UI,
    RG32UI,
    RGB32UI,
    RGBA32UI,
    RGB565,
    RGBA4444,
    RGBA5551,
    RGBA1010102,
    Depth16,
    Depth24,
    Depth32F,
    Depth24Stencil8,
    Depth32FStencil8,
}

/// What kind of data a format holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Normalized,
    Float,
    Integer,
    Depth,
    DepthStencil,
}

struct Info {
    kind: Kind,
    channels: u8,
    internal_format: gl::types::GLenum,
    format: gl::types::GLenum,
    ty: gl::types::GLenum,
    bytes: usize,
}

const fn info(kind: Kind, channels: u8, internal_format: gl::types::GLenum,
              format: gl::types::GLenum, ty: gl::types::GLenum, bytes: usize) -> Info
{
    Info { kind, channels, internal_format, format, ty, bytes }
}

/// Returns the external format of unsized or integer data with this many channels.
const fn channels_format(channels: u8, integer: bool) -> gl::types::GLenum {
    match (channels, integer) {
        (1, false) => gl::RED,
        (2, false) => gl::RG,
        (3, false) => gl::RGB,
        (4, false) => gl::RGBA,
        (1, true) => gl::RED_INTEGER,
        (2, true) => gl::RG_INTEGER,
        (3, true) => gl::RGB_INTEGER,
        _ => gl::RGBA_INTEGER,
    }
}

const fn int(channels: u8, internal_format: gl::types::GLenum, ty: gl::types::GLenum,
             size: usize) -> Info
{
    info(Kind::Integer, channels, internal_format, channels_format(channels, true), ty,
         size * channels as usize)
}

impl TextureFormat {
    fn info(&self) -> Info {
        use self::TextureFormat::*;
        use self::Kind::*;

        match *self {
            R8 => info(Normalized, 1, gl::R8, gl::RED, gl::UNSIGNED_BYTE, 1),
            RG8 => info(Normalized, 2, gl::RG8, gl::RG, gl::UNSIGNED_BYTE, 2),
            RGB8 => info(Normalized, 3, gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE, 3),
            RGBA8 => info(Normalized, 4, gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE, 4),
            R16F => info(Float, 1, gl::R16F, gl::RED, gl::HALF_FLOAT, 2),
            RG16F => info(Float, 2, gl::RG16F, gl::RG, gl::HALF_FLOAT, 4),
            RGB16F => info(Float, 3, gl::RGB16F, gl::RGB, gl::HALF_FLOAT, 6),
            RGBA16F => info(Float, 4, gl::RGBA16F, gl::RGBA, gl::HALF_FLOAT, 8),
            R32F => info(Float, 1, gl::R32F, gl::RED, gl::FLOAT, 4),
            RG32F => info(Float, 2, gl::RG32F, gl::RG, gl::FLOAT, 8),
            RGB32F => info(Float, 3, gl::RGB32F, gl::RGB, gl::FLOAT, 12),
            RGBA32F => info(Float, 4, gl::RGBA32F, gl::RGBA, gl::FLOAT, 16),
            R8I => int(1, gl::R8I, gl::BYTE, 1),
            RG8I => int(2, gl::RG8I, gl::BYTE, 1),
            RGB8I => int(3, gl::RGB8I, gl::BYTE, 1),
            RGBA8I => int(4, gl::RGBA8I, gl::BYTE, 1),
            R8UI => int(1, gl::R8UI, gl::UNSIGNED_BYTE, 1),
            RG8UI => int(2, gl::RG8UI, gl::UNSIGNED_BYTE, 1),
            RGB8UI => int(3, gl::RGB8UI, gl::UNSIGNED_BYTE, 1),
            RGBA8UI => int(4, gl::RGBA8UI, gl::UNSIGNED_BYTE, 1),
            R16I => int(1, gl::R16I, gl::SHORT, 2),
            RG16I => int(2, gl::RG16I, gl::SHORT, 2),
            RGB16I => int(3, gl::RGB16I, gl::SHORT, 2),
            RGBA16I => int(4, gl::RGBA16I, gl::SHORT, 2),
            R16UI => int(1, gl::R16UI, gl::UNSIGNED_SHORT, 2),
            RG16UI => int(2, gl::RG16UI, gl::UNSIGNED_SHORT, 2),
            RGB16UI => int(3, gl::RGB16UI, gl::UNSIGNED_SHORT, 2),
            RGBA16UI => int(4, gl::RGBA16UI, gl::UNSIGNED_SHORT, 2),
            R32I => int(1, gl::R32I, gl::INT, 4),
            RG32I => int(2, gl::RG32I, gl::INT, 4),
            RGB32I => int(3, gl::RGB32I, gl::INT, 4),
            RGBA32I => int(4, gl::RGBA32I, gl::INT, 4),
            R32UI => int(1, gl::R32UI, gl::UNSIGNED_INT, 4),
            RG32UI => int(2, gl::RG32UI, gl::UNSIGNED_INT, 4),
            RGB32UI => int(3, gl::RGB32UI, gl::UNSIGNED_INT, 4),
            RGBA32UI => int(4, gl::RGBA32UI, gl::UNSIGNED_INT, 4),
            RGB565 => info(Normalized, 3, gl::RGB565, gl::RGB, gl::UNSIGNED_SHORT_5_6_5, 2),
            RGBA4444 => info(Normalized, 4, gl::RGBA4, gl::RGBA, gl::UNSIGNED_SHORT_4_4_4_4, 2),
            RGBA5551 => info(Normalized, 4, gl::RGB5_A1, gl::RGBA, gl::UNSIGNED_SHORT_5_5_5_1, 2),
            RGBA1010102 => info(Normalized, 4, gl::RGB10_A2, gl::RGBA,
                                gl::UNSIGNED_INT_2_10_10_10_REV, 4),
            Depth16 => info(Depth, 1, gl::DEPTH_COMPONENT16, gl::DEPTH_COMPONENT,
                            gl::UNSIGNED_SHORT, 2),
            Depth24 => info(Depth, 1, gl::DEPTH_COMPONENT24, gl::DEPTH_COMPONENT,
                            gl::UNSIGNED_INT, 4),
            Depth32F => info(Depth, 1, gl::DEPTH_COMPONENT32F, gl::DEPTH_COMPONENT, gl::FLOAT, 4),
            Depth24Stencil8 => info(DepthStencil, 2, gl::DEPTH24_STENCIL8, gl::DEPTH_STENCIL,
                                    gl::UNSIGNED_INT_24_8, 4),
            Depth32FStencil8 => info(DepthStencil, 2, gl::DEPTH32F_STENCIL8, gl::DEPTH_STENCIL,
                                     gl::FLOAT_32_UNSIGNED_INT_24_8_REV, 8),
        }
    }

    /// Number of bytes of one pixel, as uploaded by `TextureUpdate`.
    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        self.info().bytes
    }

    /// Number of channels.
    #[inline]
    pub fn channels(&self) -> u8 {
        self.info().channels
    }

    /// Returns true if the format can be attached as a color buffer.
    ///
    /// Three-channel integer and floating point formats are not required to be renderable, and
    /// are treated as not renderable.
    pub fn is_color_renderable(&self) -> bool {
        let info = self.info();
        match info.kind {
            Kind::Normalized => true,
            Kind::Float | Kind::Integer => info.channels != 3,
            Kind::Depth | Kind::DepthStencil => false,
        }
    }

    /// Returns true if the format can be attached as a depth buffer.
    #[inline]
    pub fn is_depth_renderable(&self) -> bool {
        matches!(self.info().kind, Kind::Depth | Kind::DepthStencil)
    }

    /// Returns true if the format can be attached as a stencil buffer.
    #[inline]
    pub fn is_stencil_renderable(&self) -> bool {
        self.info().kind == Kind::DepthStencil
    }

    /// Returns true for integer formats, which can't be filtered.
    #[inline]
    pub fn is_integer(&self) -> bool {
        self.info().kind == Kind::Integer
    }

    /// Number of bits of depth, or zero.
    pub fn depth_bits(&self) -> u32 {
        match *self {
            TextureFormat::Depth16 => 16,
            TextureFormat::Depth24 | TextureFormat::Depth24Stencil8 => 24,
            TextureFormat::Depth32F | TextureFormat::Depth32FStencil8 => 32,
            _ => 0,
        }
    }

    /// Number of bits of stencil, or zero.
    #[inline]
    pub fn stencil_bits(&self) -> u32 {
        if self.is_stencil_renderable() { 8 } else { 0 }
    }

    /// Returns true if textures of this format can be created in the profile.
    pub fn is_available(&self, profile: Profile, extensions: &ExtensionsList) -> bool {
        use self::TextureFormat::*;

        match profile {
            Profile::Gl3 | Profile::Gles3 => true,
            Profile::Gl21 => match *self {
                RGB8 | RGBA8 | RGBA4444 | RGBA5551 | RGBA1010102 | Depth16 | Depth24 => true,
                Depth24Stencil8 => extensions.gl_ext_packed_depth_stencil ||
                                   extensions.gl_arb_framebuffer_object,
                _ => false,
            },
            Profile::Gles2 => match *self {
                RGB8 | RGBA8 | RGB565 | RGBA4444 | RGBA5551 => true,
                Depth16 => extensions.gl_oes_depth_texture,
                Depth24 => extensions.gl_oes_depth_texture && extensions.gl_oes_depth24,
                Depth24Stencil8 => extensions.gl_oes_packed_depth_stencil,
                _ => false,
            },
        }
    }

    /// The internal format passed to `glTexImage2D`.
    ///
    /// OpenGL ES 2 has no sized formats for textures, and takes the external format instead.
    pub(crate) fn internal_format_for(&self, profile: Profile) -> gl::types::GLint {
        if profile == Profile::Gles2 {
            self.info().format as gl::types::GLint
        } else {
            self.info().internal_format as gl::types::GLint
        }
    }

    /// The external format and type of the uploaded data.
    #[inline]
    pub(crate) fn client_format(&self) -> (gl::types::GLenum, gl::types::GLenum) {
        let info = self.info();
        (info.format, info.ty)
    }
}

impl ToGlEnum for TextureFormat {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        self.info().internal_format
    }
}

#[cfg(test)]
mod tests {
    use super::TextureFormat;
    use crate::context::{ExtensionsList, Profile};
    use crate::gl;

    #[test]
    fn pixel_sizes() {
        assert_eq!(TextureFormat::RGBA8.bytes_per_pixel(), 4);
        assert_eq!(TextureFormat::RGB16F.bytes_per_pixel(), 6);
        assert_eq!(TextureFormat::RGBA32UI.bytes_per_pixel(), 16);
        assert_eq!(TextureFormat::RGB565.bytes_per_pixel(), 2);
        assert_eq!(TextureFormat::Depth32FStencil8.bytes_per_pixel(), 8);
    }

    #[test]
    fn renderability() {
        assert!(TextureFormat::RGBA8.is_color_renderable());
        assert!(!TextureFormat::RGB32F.is_color_renderable());
        assert!(TextureFormat::RG16UI.is_color_renderable());
        assert!(!TextureFormat::Depth24.is_color_renderable());
        assert!(TextureFormat::Depth24.is_depth_renderable());
        assert!(!TextureFormat::Depth24.is_stencil_renderable());
        assert!(TextureFormat::Depth24Stencil8.is_stencil_renderable());
        assert_eq!(TextureFormat::Depth24Stencil8.depth_bits(), 24);
        assert_eq!(TextureFormat::Depth24Stencil8.stencil_bits(), 8);
    }

    #[test]
    fn availability() {
        let none = ExtensionsList::default();
        let depth = ExtensionsList { gl_oes_depth_texture: true, ..Default::default() };

        assert!(TextureFormat::RGBA32F.is_available(Profile::Gl3, &none));
        assert!(!TextureFormat::RGBA32F.is_available(Profile::Gl21, &none));
        assert!(TextureFormat::RGB565.is_available(Profile::Gles2, &none));
        assert!(!TextureFormat::Depth16.is_available(Profile::Gles2, &none));
        assert!(TextureFormat::Depth16.is_available(Profile::Gles2, &depth));
        assert!(!TextureFormat::Depth24.is_available(Profile::Gles2, &depth));
    }

    #[test]
    fn unsized_formats_on_gles2() {
        assert_eq!(TextureFormat::RGBA8.internal_format_for(Profile::Gles2), gl::RGBA as i32);
        assert_eq!(TextureFormat::RGBA8.internal_format_for(Profile::Gl3), gl::RGBA8 as i32);
    }
}
