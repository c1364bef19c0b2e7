/*!

A renderbuffer is similar to a texture, but is optimized for usage as a draw target.

Contrary to a texture, you can't sample nor modify the content of a renderbuffer. You should
prefer renderbuffers over textures when you know that you don't need to read or modify the data
of the attachment, which is usually the case of depth and stencil buffers.

*/
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::context::{Context, ExtensionsList, Profile};
use crate::gl;
use crate::resource::{RawHandle, Record, ResourceKind};
use crate::{Error, GlObject, PreconditionError, ToGlEnum};

/// Format of the storage of a renderbuffer.
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RenderbufferFormat {
    RGBA4,
    RGB565,
    RGB5A1,
    RGB8,
    RGBA8,
    Depth16,
    Depth24,
    Depth24Stencil8,
    Stencil8,
}

impl RenderbufferFormat {
    /// Returns true if the format can be attached as a color buffer.
    #[inline]
    pub fn is_color_renderable(&self) -> bool {
        use self::RenderbufferFormat::*;
        matches!(*self, RGBA4 | RGB565 | RGB5A1 | RGB8 | RGBA8)
    }

    /// Returns true if the format can be attached as a depth buffer.
    #[inline]
    pub fn is_depth_renderable(&self) -> bool {
        self.depth_bits() > 0
    }

    /// Returns true if the format can be attached as a stencil buffer.
    #[inline]
    pub fn is_stencil_renderable(&self) -> bool {
        self.stencil_bits() > 0
    }

    /// Number of bits of depth.
    pub fn depth_bits(&self) -> u32 {
        match *self {
            RenderbufferFormat::Depth16 => 16,
            RenderbufferFormat::Depth24 | RenderbufferFormat::Depth24Stencil8 => 24,
            _ => 0,
        }
    }

    /// Number of bits of stencil.
    pub fn stencil_bits(&self) -> u32 {
        match *self {
            RenderbufferFormat::Depth24Stencil8 | RenderbufferFormat::Stencil8 => 8,
            _ => 0,
        }
    }

    /// Returns true if renderbuffers of this format can be allocated.
    pub fn is_available(&self, profile: Profile, extensions: &ExtensionsList) -> bool {
        use self::RenderbufferFormat::*;

        match (profile, *self) {
            (Profile::Gles2, RGB8) | (Profile::Gles2, RGBA8) => extensions.gl_oes_rgb8_rgba8,
            (Profile::Gles2, Depth24) => extensions.gl_oes_depth24,
            (Profile::Gles2, Depth24Stencil8) => extensions.gl_oes_packed_depth_stencil,
            (Profile::Gl21, Depth24Stencil8) => extensions.gl_arb_framebuffer_object ||
                                                 extensions.gl_ext_packed_depth_stencil,
            _ => true,
        }
    }
}

impl ToGlEnum for RenderbufferFormat {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        match *self {
            RenderbufferFormat::RGBA4 => gl::RGBA4,
            RenderbufferFormat::RGB565 => gl::RGB565,
            RenderbufferFormat::RGB5A1 => gl::RGB5_A1,
            RenderbufferFormat::RGB8 => gl::RGB8,
            RenderbufferFormat::RGBA8 => gl::RGBA8,
            RenderbufferFormat::Depth16 => gl::DEPTH_COMPONENT16,
            RenderbufferFormat::Depth24 => gl::DEPTH_COMPONENT24,
            RenderbufferFormat::Depth24Stencil8 => gl::DEPTH24_STENCIL8,
            RenderbufferFormat::Stencil8 => gl::STENCIL_INDEX8,
        }
    }
}

/// Handle to a renderbuffer.
#[derive(Clone)]
pub struct Renderbuffer {
    pub(crate) raw: RawHandle,
    pub(crate) id: gl::types::GLuint,
    format: RenderbufferFormat,
    width: u32,
    height: u32,
}

impl Renderbuffer {
    /// Format of the storage.
    #[inline]
    pub fn format(&self) -> RenderbufferFormat {
        self.format
    }

    /// Returns the dimensions of the renderbuffer.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl PartialEq for Renderbuffer {
    #[inline]
    fn eq(&self, other: &Renderbuffer) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Renderbuffer {}

impl fmt::Debug for Renderbuffer {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "Renderbuffer #{} ({}x{}, {:?})", self.id, self.width, self.height,
               self.format)
    }
}

impl GlObject for Renderbuffer {
    type Id = gl::types::GLuint;

    #[inline]
    fn get_id(&self) -> gl::types::GLuint {
        self.id
    }
}

/// Operations on renderbuffers.
pub trait Renderbuffers {
    /// Allocates a renderbuffer. The contents are undefined.
    fn renderbuffer_allocate(&self, format: RenderbufferFormat, width: u32, height: u32)
                             -> Result<Renderbuffer, Error>;

    /// Deletes the renderbuffer.
    ///
    /// Framebuffers that have it attached keep a dangling attachment, like in OpenGL.
    fn renderbuffer_delete(&self, renderbuffer: &Renderbuffer) -> Result<(), Error>;
}

pub(crate) struct GlRenderbuffers {
    context: Rc<Context>,
}

impl GlRenderbuffers {
    pub fn new(context: Rc<Context>) -> GlRenderbuffers {
        GlRenderbuffers { context }
    }
}

impl Renderbuffers for GlRenderbuffers {
    fn renderbuffer_allocate(&self, format: RenderbufferFormat, width: u32, height: u32)
                             -> Result<Renderbuffer, Error>
    {
        if width == 0 || height == 0 {
            return Err(PreconditionError::ZeroSize(ResourceKind::Renderbuffer).into());
        }

        let mut ctxt = self.context.make_current();
        let max = ctxt.capabilities.max_texture_size;
        if width > max || height > max {
            return Err(PreconditionError::TooLarge { size: width.max(height), max }.into());
        }

        if !format.is_available(ctxt.profile, ctxt.extensions) {
            return Err(PreconditionError::NotSupported("renderbuffer format").into());
        }

        let internal_format = format.to_glenum();
        let (w, h) = (width as gl::types::GLsizei, height as gl::types::GLsizei);

        let id = ctxt.call(format_args!("glGenRenderbuffers(1)"), |gl| gl.gen_renderbuffer())?;
        ctxt.created(|ctxt| {
            ctxt.bind_renderbuffer(id)?;
            ctxt.call(format_args!("glRenderbufferStorage(GL_RENDERBUFFER, 0x{:x}, {}, {})",
                                   internal_format, w, h),
                      |gl| gl.renderbuffer_storage(internal_format, w, h))
        }, |ctxt| ctxt.delete_renderbuffer(id))?;

        let label = format!("renderbuffer-{}", id);
        let raw = ctxt.resources.renderbuffers.insert(Record::new(id, label));

        debug!("Allocated renderbuffer {} ({}x{}, {:?})", id, width, height, format);
        Ok(Renderbuffer { raw, id, format, width, height })
    }

    fn renderbuffer_delete(&self, renderbuffer: &Renderbuffer) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.renderbuffers.remove(renderbuffer.raw)?;

        debug!("Deleting renderbuffer {}", renderbuffer.id);
        ctxt.delete_renderbuffer(renderbuffer.id)
    }
}
