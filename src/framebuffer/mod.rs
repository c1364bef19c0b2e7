/*!
Framebuffers, the render targets made of textures and renderbuffers.

A framebuffer is described with a `FramebufferBuilder`, then allocated in one go. Allocation
checks the attachments and the completeness of the result, so a `Framebuffer` handle always
points to a complete framebuffer:

```no_run
# use glguard::{ContextBuilder, FakeDriver, FakeConfig};
use glguard::framebuffer::FramebufferBuilder;
use glguard::render_buffer::RenderbufferFormat;
use glguard::texture::{TextureFilterMag, TextureFilterMin, TextureFormat, TextureWrap};

# let interface = ContextBuilder::new().build(FakeDriver::new(FakeConfig::gl33())).unwrap();
let framebuffers = interface.framebuffers();
let points = framebuffers.framebuffer_color_attachment_points();

let color = interface.textures_2d().texture_2d_allocate(256, 256, TextureFormat::RGBA8,
    TextureWrap::ClampToEdge, TextureWrap::ClampToEdge, TextureFilterMin::Linear,
    TextureFilterMag::Linear).unwrap();
let depth = interface.renderbuffers()
    .renderbuffer_allocate(RenderbufferFormat::Depth24Stencil8, 256, 256).unwrap();

let mut builder = FramebufferBuilder::new();
builder.attach_color_texture_2d(points[0], &color);
builder.attach_depth_stencil_renderbuffer(&depth);

let framebuffer = framebuffers.framebuffer_allocate(&builder).unwrap();
framebuffers.framebuffer_draw_bind(&framebuffer).unwrap();
```

On OpenGL 2.1 and OpenGL ES 2 there is a single framebuffer binding point, so binding a draw
framebuffer also binds it for reading, and `Interface::read_framebuffers` returns `None`.

*/
use std::fmt;
use std::rc::Rc;

use log::{debug, trace};
use smallvec::SmallVec;

use crate::context::{CommandContext, Context, Profile, UnitBinding};
use crate::gl;
use crate::render_buffer::Renderbuffer;
use crate::resource::{RawHandle, ResourceKind};
use crate::state::Rect;
use crate::texture::{CubeMapFace, Texture2D, TextureCube};
use crate::{Error, GlObject, PreconditionError, ToGlEnum};

/// A color attachment point of a framebuffer, `GL_COLOR_ATTACHMENTi`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorAttachmentPoint(u32);

impl ColorAttachmentPoint {
    /// The `i` of `GL_COLOR_ATTACHMENTi`.
    #[inline]
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl ToGlEnum for ColorAttachmentPoint {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        gl::COLOR_ATTACHMENT0 + self.0
    }
}

/// A draw buffer, which is the `i` of the `out` variable at location `i` of a fragment shader.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawBuffer(u32);

impl DrawBuffer {
    /// Index of the draw buffer.
    #[inline]
    pub fn index(&self) -> u32 {
        self.0
    }
}

/// Something that can be attached as a color buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorAttachment {
    /// The base level of a 2D texture.
    Texture2D(Texture2D),
    /// The base level of a face of a cube map.
    TextureCube(TextureCube, CubeMapFace),
    /// A renderbuffer.
    Renderbuffer(Renderbuffer),
}

/// Something that can be attached as a depth buffer or as a depth-stencil buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum DepthAttachment {
    /// The base level of a 2D texture.
    Texture2D(Texture2D),
    /// A renderbuffer.
    Renderbuffer(Renderbuffer),
}

/// Describes a framebuffer before it is allocated.
#[derive(Debug, Clone, Default)]
pub struct FramebufferBuilder {
    colors: SmallVec<[(ColorAttachmentPoint, ColorAttachment); 4]>,
    depth: Option<DepthAttachment>,
    depth_stencil: Option<DepthAttachment>,
    draw_buffers: SmallVec<[(DrawBuffer, ColorAttachmentPoint); 4]>,
}

impl FramebufferBuilder {
    /// Builds an empty description.
    pub fn new() -> FramebufferBuilder {
        FramebufferBuilder::default()
    }

    fn attach_color(&mut self, point: ColorAttachmentPoint, attachment: ColorAttachment) {
        self.detach_color(point);
        self.colors.push((point, attachment));
        self.colors.sort_by_key(|&(p, _)| p);
    }

    /// Attaches a 2D texture at a color attachment point.
    pub fn attach_color_texture_2d(&mut self, point: ColorAttachmentPoint, texture: &Texture2D) {
        self.attach_color(point, ColorAttachment::Texture2D(texture.clone()));
    }

    /// Attaches a face of a cube map at a color attachment point.
    pub fn attach_color_texture_cube(&mut self, point: ColorAttachmentPoint,
                                     texture: &TextureCube, face: CubeMapFace)
    {
        self.attach_color(point, ColorAttachment::TextureCube(texture.clone(), face));
    }

    /// Attaches a renderbuffer at a color attachment point.
    pub fn attach_color_renderbuffer(&mut self, point: ColorAttachmentPoint,
                                     renderbuffer: &Renderbuffer)
    {
        self.attach_color(point, ColorAttachment::Renderbuffer(renderbuffer.clone()));
    }

    /// Removes whatever is attached at a color attachment point.
    pub fn detach_color(&mut self, point: ColorAttachmentPoint) {
        self.colors.retain(|&mut (p, _)| p != point);
    }

    /// Attaches a 2D texture as the depth buffer. Removes the depth-stencil attachment.
    pub fn attach_depth_texture_2d(&mut self, texture: &Texture2D) {
        self.depth_stencil = None;
        self.depth = Some(DepthAttachment::Texture2D(texture.clone()));
    }

    /// Attaches a renderbuffer as the depth buffer. Removes the depth-stencil attachment.
    pub fn attach_depth_renderbuffer(&mut self, renderbuffer: &Renderbuffer) {
        self.depth_stencil = None;
        self.depth = Some(DepthAttachment::Renderbuffer(renderbuffer.clone()));
    }

    /// Attaches a 2D texture as the depth-stencil buffer. Removes the depth attachment.
    pub fn attach_depth_stencil_texture_2d(&mut self, texture: &Texture2D) {
        self.depth = None;
        self.depth_stencil = Some(DepthAttachment::Texture2D(texture.clone()));
    }

    /// Attaches a renderbuffer as the depth-stencil buffer. Removes the depth attachment.
    pub fn attach_depth_stencil_renderbuffer(&mut self, renderbuffer: &Renderbuffer) {
        self.depth = None;
        self.depth_stencil = Some(DepthAttachment::Renderbuffer(renderbuffer.clone()));
    }

    /// Removes the depth and the depth-stencil attachments.
    pub fn detach_depth(&mut self) {
        self.depth = None;
        self.depth_stencil = None;
    }

    /// Writes the fragment shader output of `draw_buffer` to the attachment at `point`.
    ///
    /// If no draw buffer is ever mapped, draw buffer `i` is mapped to attachment point `i` for
    /// every attached color buffer.
    pub fn map_draw_buffer(&mut self, draw_buffer: DrawBuffer, point: ColorAttachmentPoint) {
        self.unmap_draw_buffer(draw_buffer);
        self.draw_buffers.push((draw_buffer, point));
        self.draw_buffers.sort_by_key(|&(d, _)| d);
    }

    /// Discards the output of `draw_buffer`.
    pub fn unmap_draw_buffer(&mut self, draw_buffer: DrawBuffer) {
        self.draw_buffers.retain(|&mut (d, _)| d != draw_buffer);
    }

    /// The color attachments, sorted by attachment point.
    pub fn color_attachments(&self) -> impl Iterator<Item = &(ColorAttachmentPoint, ColorAttachment)> {
        self.colors.iter()
    }

    /// The depth attachment.
    #[inline]
    pub fn depth_attachment(&self) -> Option<&DepthAttachment> {
        self.depth.as_ref()
    }

    /// The depth-stencil attachment.
    #[inline]
    pub fn depth_stencil_attachment(&self) -> Option<&DepthAttachment> {
        self.depth_stencil.as_ref()
    }

    /// The list passed to `glDrawBuffers`.
    fn draw_buffer_list(&self) -> SmallVec<[gl::types::GLenum; 8]> {
        let mapping: SmallVec<[(DrawBuffer, ColorAttachmentPoint); 4]> =
            if self.draw_buffers.is_empty() {
                self.colors.iter().map(|&(p, _)| (DrawBuffer(p.0), p)).collect()
            } else {
                self.draw_buffers.clone()
            };

        let count = mapping.last().map(|&(d, _)| d.0 as usize + 1).unwrap_or(0);
        let mut list: SmallVec<[gl::types::GLenum; 8]> = SmallVec::from_elem(gl::NONE, count);
        for (draw_buffer, point) in mapping {
            list[draw_buffer.0 as usize] = point.to_glenum();
        }

        if list.is_empty() {
            list.push(gl::NONE);
        }

        list
    }
}

/// Result of `glCheckFramebufferStatus`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FramebufferStatus {
    /// The framebuffer can be rendered to.
    Complete,
    /// `GL_FRAMEBUFFER_UNDEFINED`
    Undefined,
    /// `GL_FRAMEBUFFER_INCOMPLETE_ATTACHMENT`
    IncompleteAttachment,
    /// `GL_FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT`
    IncompleteMissingAttachment,
    /// `GL_FRAMEBUFFER_INCOMPLETE_DIMENSIONS`, only reported by OpenGL ES 2.
    IncompleteDimensions,
    /// `GL_FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER`
    IncompleteDrawBuffer,
    /// `GL_FRAMEBUFFER_INCOMPLETE_READ_BUFFER`
    IncompleteReadBuffer,
    /// `GL_FRAMEBUFFER_INCOMPLETE_MULTISAMPLE`
    IncompleteMultisample,
    /// `GL_FRAMEBUFFER_UNSUPPORTED`
    Unsupported,
    /// A value that glguard doesn't know about.
    Unknown(u32),
}

/// `GL_FRAMEBUFFER_INCOMPLETE_DIMENSIONS` was removed from desktop OpenGL.
const FRAMEBUFFER_INCOMPLETE_DIMENSIONS: gl::types::GLenum = 0x8CD9;

impl FramebufferStatus {
    pub(crate) fn from_glenum(value: gl::types::GLenum) -> FramebufferStatus {
        match value {
            gl::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
            gl::FRAMEBUFFER_UNDEFINED => FramebufferStatus::Undefined,
            gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
            gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT =>
                FramebufferStatus::IncompleteMissingAttachment,
            FRAMEBUFFER_INCOMPLETE_DIMENSIONS => FramebufferStatus::IncompleteDimensions,
            gl::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => FramebufferStatus::IncompleteDrawBuffer,
            gl::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => FramebufferStatus::IncompleteReadBuffer,
            gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => FramebufferStatus::IncompleteMultisample,
            gl::FRAMEBUFFER_UNSUPPORTED => FramebufferStatus::Unsupported,
            other => FramebufferStatus::Unknown(other),
        }
    }
}

/// Handle to a complete framebuffer.
#[derive(Clone)]
pub struct Framebuffer {
    pub(crate) raw: RawHandle,
    pub(crate) id: gl::types::GLuint,
    pub(crate) textures: SmallVec<[UnitBinding; 4]>,
    pub(crate) depth_bits: u32,
    pub(crate) stencil_bits: u32,
    color_points: SmallVec<[ColorAttachmentPoint; 4]>,
}

impl Framebuffer {
    /// The attachment points that have a color buffer.
    #[inline]
    pub fn color_attachment_points(&self) -> &[ColorAttachmentPoint] {
        &self.color_points
    }

    /// Bits of depth of the depth attachment, 0 if there is none.
    #[inline]
    pub fn depth_bits(&self) -> u32 {
        self.depth_bits
    }

    /// Bits of stencil of the depth-stencil attachment, 0 if there is none.
    #[inline]
    pub fn stencil_bits(&self) -> u32 {
        self.stencil_bits
    }
}

impl PartialEq for Framebuffer {
    #[inline]
    fn eq(&self, other: &Framebuffer) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Framebuffer {}

impl fmt::Debug for Framebuffer {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "Framebuffer #{} ({} color attachments, {} depth bits, {} stencil bits)",
               self.id, self.color_points.len(), self.depth_bits, self.stencil_bits)
    }
}

impl GlObject for Framebuffer {
    type Id = gl::types::GLuint;

    #[inline]
    fn get_id(&self) -> gl::types::GLuint {
        self.id
    }
}

/// The buffers copied by a blit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct BlitBuffers {
    /// Copy the color buffer.
    pub color: bool,
    /// Copy the depth buffer.
    pub depth: bool,
    /// Copy the stencil buffer.
    pub stencil: bool,
}

impl BlitBuffers {
    /// Only the color buffer.
    #[inline]
    pub fn color() -> BlitBuffers {
        BlitBuffers { color: true, depth: false, stencil: false }
    }

    fn mask(&self) -> gl::types::GLbitfield {
        let mut mask = 0;
        if self.color { mask |= gl::COLOR_BUFFER_BIT; }
        if self.depth { mask |= gl::DEPTH_BUFFER_BIT; }
        if self.stencil { mask |= gl::STENCIL_BUFFER_BIT; }
        mask
    }
}

/// Filtering applied when the source and target areas of a blit have different sizes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlitFilter {
    /// Takes the nearest pixel.
    Nearest,
    /// Interpolates between pixels. Only valid for color blits.
    Linear,
}

impl ToGlEnum for BlitFilter {
    #[inline]
    fn to_glenum(&self) -> gl::types::GLenum {
        match *self {
            BlitFilter::Nearest => gl::NEAREST,
            BlitFilter::Linear => gl::LINEAR,
        }
    }
}

/// Operations on framebuffers.
pub trait Framebuffers {
    /// Returns the color attachment points that can be used.
    fn framebuffer_color_attachment_points(&self) -> Vec<ColorAttachmentPoint>;

    /// Returns the draw buffers that can be used.
    fn framebuffer_draw_buffers(&self) -> Vec<DrawBuffer>;

    /// Allocates a framebuffer with the attachments of the builder.
    ///
    /// Fails if an attachment has been deleted or has a format that doesn't fit its role, if
    /// the draw buffer mapping isn't supported, or if the driver reports that the framebuffer
    /// is incomplete.
    fn framebuffer_allocate(&self, builder: &FramebufferBuilder) -> Result<Framebuffer, Error>;

    /// Binds the framebuffer for drawing.
    ///
    /// Fails if one of its textures is bound to a texture unit.
    fn framebuffer_draw_bind(&self, framebuffer: &Framebuffer) -> Result<(), Error>;

    /// Binds the default framebuffer for drawing.
    fn framebuffer_draw_unbind(&self) -> Result<(), Error>;

    /// Returns true if the framebuffer is bound for drawing.
    fn framebuffer_draw_is_bound(&self, framebuffer: &Framebuffer) -> Result<bool, Error>;

    /// Returns true if any framebuffer other than the default one is bound for drawing.
    fn framebuffer_draw_any_is_bound(&self) -> bool;

    /// Returns the framebuffer bound for drawing.
    fn framebuffer_draw_get_bound(&self) -> Option<Framebuffer>;

    /// Asks the driver whether the framebuffer bound for drawing is complete.
    fn framebuffer_draw_validate(&self) -> Result<FramebufferStatus, Error>;

    /// Deletes the framebuffer, unbinding it first if it is bound.
    fn framebuffer_delete(&self, framebuffer: &Framebuffer) -> Result<(), Error>;
}

/// Operations on read framebuffers. Only available with OpenGL 3 and OpenGL ES 3.
pub trait ReadFramebuffers {
    /// Binds the framebuffer for reading.
    fn framebuffer_read_bind(&self, framebuffer: &Framebuffer) -> Result<(), Error>;

    /// Binds the default framebuffer for reading.
    fn framebuffer_read_unbind(&self) -> Result<(), Error>;

    /// Returns true if the framebuffer is bound for reading.
    fn framebuffer_read_is_bound(&self, framebuffer: &Framebuffer) -> Result<bool, Error>;

    /// Returns true if any framebuffer other than the default one is bound for reading.
    fn framebuffer_read_any_is_bound(&self) -> bool;

    /// Copies an area of the read framebuffer to an area of the draw framebuffer.
    ///
    /// Depth and stencil blits require `BlitFilter::Nearest`.
    fn framebuffer_blit(&self, source: Rect, target: Rect, buffers: BlitBuffers,
                        filter: BlitFilter) -> Result<(), Error>;
}

pub(crate) struct GlFramebuffers {
    context: Rc<Context>,
}

impl GlFramebuffers {
    pub fn new(context: Rc<Context>) -> GlFramebuffers {
        GlFramebuffers { context }
    }
}

/// What the checks of an attachment extract from it.
struct Resolved {
    id: gl::types::GLuint,
    texture_target: Option<gl::types::GLenum>,
    binding: Option<UnitBinding>,
}

fn resolve_color(ctxt: &CommandContext<'_>, attachment: &ColorAttachment)
                 -> Result<Resolved, Error>
{
    let (renderable, resolved) = match *attachment {
        ColorAttachment::Texture2D(ref t) => {
            ctxt.resources.textures_2d.get(t.raw)?;
            (t.format().is_color_renderable(),
             Resolved { id: t.id, texture_target: Some(gl::TEXTURE_2D),
                        binding: Some(UnitBinding::Texture2D(t.raw)) })
        },
        ColorAttachment::TextureCube(ref t, face) => {
            ctxt.resources.textures_cube.get(t.raw)?;
            (t.format().is_color_renderable(),
             Resolved { id: t.id, texture_target: Some(face.to_glenum()),
                        binding: Some(UnitBinding::TextureCube(t.raw)) })
        },
        ColorAttachment::Renderbuffer(ref r) => {
            ctxt.resources.renderbuffers.get(r.raw)?;
            (r.format().is_color_renderable(),
             Resolved { id: r.id, texture_target: None, binding: None })
        },
    };

    if !renderable {
        return Err(PreconditionError::NotColorRenderable.into());
    }

    Ok(resolved)
}

/// Returns the attachment and its depth and stencil bits.
fn resolve_depth(ctxt: &CommandContext<'_>, attachment: &DepthAttachment, stencil: bool)
                 -> Result<(Resolved, u32, u32), Error>
{
    let (depth_bits, stencil_bits, resolved) = match *attachment {
        DepthAttachment::Texture2D(ref t) => {
            ctxt.resources.textures_2d.get(t.raw)?;
            (t.format().depth_bits(), t.format().stencil_bits(),
             Resolved { id: t.id, texture_target: Some(gl::TEXTURE_2D),
                        binding: Some(UnitBinding::Texture2D(t.raw)) })
        },
        DepthAttachment::Renderbuffer(ref r) => {
            ctxt.resources.renderbuffers.get(r.raw)?;
            (r.format().depth_bits(), r.format().stencil_bits(),
             Resolved { id: r.id, texture_target: None, binding: None })
        },
    };

    if depth_bits == 0 {
        return Err(PreconditionError::NotDepthRenderable.into());
    }

    if stencil && stencil_bits == 0 {
        return Err(PreconditionError::NotStencilRenderable.into());
    }

    Ok((resolved, depth_bits, if stencil { stencil_bits } else { 0 }))
}

/// Checks the indices of the attachment points and the draw buffer mapping.
fn check_mapping(ctxt: &CommandContext<'_>, builder: &FramebufferBuilder) -> Result<(), Error> {
    let points = ctxt.capabilities.color_attachments;
    for &(point, _) in builder.colors.iter() {
        if point.0 >= points {
            return Err(PreconditionError::OutOfRange {
                index: point.0 as u64,
                limit: points as u64,
            }.into());
        }
    }

    let draw_buffers = ctxt.capabilities.draw_buffers;
    for (i, &(draw_buffer, point)) in builder.draw_buffers.iter().enumerate() {
        if draw_buffer.0 >= draw_buffers {
            return Err(PreconditionError::OutOfRange {
                index: draw_buffer.0 as u64,
                limit: draw_buffers as u64,
            }.into());
        }

        if builder.draw_buffers[.. i].iter().any(|&(_, p)| p == point) {
            return Err(PreconditionError::NotSupported(
                "mapping two draw buffers to the same attachment point").into());
        }

        // GLES only allows draw buffer `i` to write to attachment point `i`
        if ctxt.profile.is_gles() && draw_buffer.0 != point.0 {
            return Err(PreconditionError::NotSupported("draw buffer remapping").into());
        }
    }

    Ok(())
}

fn attach(ctxt: &mut CommandContext<'_>, target: gl::types::GLenum,
          attachment: gl::types::GLenum, resolved: &Resolved) -> Result<(), Error>
{
    let id = resolved.id;
    match resolved.texture_target {
        Some(tex_target) => {
            ctxt.call(format_args!("glFramebufferTexture2D(0x{:x}, 0x{:x}, 0x{:x}, {}, 0)",
                                   target, attachment, tex_target, id),
                      |gl| gl.framebuffer_texture_2d(target, attachment, tex_target, id))
        },
        None => {
            ctxt.call(format_args!("glFramebufferRenderbuffer(0x{:x}, 0x{:x}, GL_RENDERBUFFER, \
                                    {})", target, attachment, id),
                      |gl| gl.framebuffer_renderbuffer(target, attachment, id))
        },
    }
}

fn draw_target(profile: Profile) -> gl::types::GLenum {
    if profile.has_read_framebuffers() {
        gl::DRAW_FRAMEBUFFER
    } else {
        gl::FRAMEBUFFER
    }
}

impl Framebuffers for GlFramebuffers {
    fn framebuffer_color_attachment_points(&self) -> Vec<ColorAttachmentPoint> {
        (0 .. self.context.capabilities().color_attachments).map(ColorAttachmentPoint).collect()
    }

    fn framebuffer_draw_buffers(&self) -> Vec<DrawBuffer> {
        (0 .. self.context.capabilities().draw_buffers).map(DrawBuffer).collect()
    }

    fn framebuffer_allocate(&self, builder: &FramebufferBuilder) -> Result<Framebuffer, Error> {
        let mut ctxt = self.context.make_current();

        let mut colors = SmallVec::<[(ColorAttachmentPoint, Resolved); 4]>::new();
        for &(point, ref attachment) in builder.colors.iter() {
            colors.push((point, resolve_color(&ctxt, attachment)?));
        }

        let depth = match builder.depth {
            Some(ref d) => Some(resolve_depth(&ctxt, d, false)?),
            None => None,
        };
        let depth_stencil = match builder.depth_stencil {
            Some(ref d) => Some(resolve_depth(&ctxt, d, true)?),
            None => None,
        };

        check_mapping(&ctxt, builder)?;

        let target = draw_target(ctxt.profile);
        let id = ctxt.call(format_args!("glGenFramebuffers(1)"), |gl| gl.gen_framebuffer())?;
        let status = ctxt.created(|ctxt| {
            ctxt.bind_draw_framebuffer(id)?;

            for &(point, ref resolved) in colors.iter() {
                attach(ctxt, target, point.to_glenum(), resolved)?;
            }

            if let Some((ref resolved, _, _)) = depth {
                attach(ctxt, target, gl::DEPTH_ATTACHMENT, resolved)?;
            }

            if let Some((ref resolved, _, _)) = depth_stencil {
                if ctxt.profile.has_read_framebuffers() {
                    attach(ctxt, target, gl::DEPTH_STENCIL_ATTACHMENT, resolved)?;
                } else {
                    attach(ctxt, target, gl::DEPTH_ATTACHMENT, resolved)?;
                    attach(ctxt, target, gl::STENCIL_ATTACHMENT, resolved)?;
                }
            }

            if ctxt.profile != Profile::Gles2 {
                let list = builder.draw_buffer_list();
                ctxt.call(format_args!("glDrawBuffers({:?})", list),
                          |gl| gl.draw_buffers(&list))?;
            }

            let status = ctxt.call(format_args!("glCheckFramebufferStatus(0x{:x})", target),
                                   |gl| gl.check_framebuffer_status(target))?;
            ctxt.restore_draw_framebuffer()?;
            Ok(status)
        }, |ctxt| {
            ctxt.delete_framebuffer(id)?;
            ctxt.restore_draw_framebuffer()
        })?;

        let status = FramebufferStatus::from_glenum(status);
        if status != FramebufferStatus::Complete {
            debug!("Framebuffer {} is incomplete ({:?}), deleting it", id, status);
            ctxt.delete_framebuffer(id)?;
            return Err(PreconditionError::FramebufferIncomplete(status).into());
        }

        let (depth_bits, stencil_bits) = depth.as_ref().or(depth_stencil.as_ref())
            .map(|&(_, d, s)| (d, s))
            .unwrap_or((0, 0));

        let textures = colors.iter().map(|(_, r)| r)
            .chain(depth.iter().chain(depth_stencil.iter()).map(|(r, _, _)| r))
            .filter_map(|r| r.binding)
            .collect();

        let color_points = colors.iter().map(|&(p, _)| p).collect();

        let raw = ctxt.resources.framebuffers.insert_with(|raw| Framebuffer {
            raw, id, textures, depth_bits, stencil_bits, color_points,
        });

        let framebuffer = ctxt.resources.framebuffers.get(raw)?.clone();

        debug!("Allocated framebuffer {}", id);
        Ok(framebuffer)
    }

    fn framebuffer_draw_bind(&self, framebuffer: &Framebuffer) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.framebuffers.get(framebuffer.raw)?;

        let loops = framebuffer.textures.iter()
            .any(|&t| ctxt.bindings.units_of(t).next().is_some());
        if loops {
            return Err(PreconditionError::FeedbackLoop.into());
        }

        trace!("Binding draw framebuffer {}", framebuffer.id);
        ctxt.bind_draw_framebuffer(framebuffer.id)?;
        ctxt.bindings.draw_framebuffer = Some(framebuffer.raw);
        if !ctxt.profile.has_read_framebuffers() {
            ctxt.bindings.read_framebuffer = Some(framebuffer.raw);
        }

        Ok(())
    }

    fn framebuffer_draw_unbind(&self) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.bind_draw_framebuffer(0)?;
        ctxt.bindings.draw_framebuffer = None;
        if !ctxt.profile.has_read_framebuffers() {
            ctxt.bindings.read_framebuffer = None;
        }

        Ok(())
    }

    fn framebuffer_draw_is_bound(&self, framebuffer: &Framebuffer) -> Result<bool, Error> {
        let ctxt = self.context.make_current();
        ctxt.resources.framebuffers.get(framebuffer.raw)?;
        Ok(ctxt.bindings.draw_framebuffer == Some(framebuffer.raw))
    }

    fn framebuffer_draw_any_is_bound(&self) -> bool {
        self.context.make_current().bindings.draw_framebuffer.is_some()
    }

    fn framebuffer_draw_get_bound(&self) -> Option<Framebuffer> {
        let ctxt = self.context.make_current();
        let bound = ctxt.bindings.draw_framebuffer
            .and_then(|raw| ctxt.resources.framebuffers.get(raw).ok())
            .cloned();
        bound
    }

    fn framebuffer_draw_validate(&self) -> Result<FramebufferStatus, Error> {
        let mut ctxt = self.context.make_current();
        if ctxt.bindings.draw_framebuffer.is_none() {
            return Err(PreconditionError::NoDrawFramebuffer.into());
        }

        let target = draw_target(ctxt.profile);
        let status = ctxt.call(format_args!("glCheckFramebufferStatus(0x{:x})", target),
                               |gl| gl.check_framebuffer_status(target))?;
        Ok(FramebufferStatus::from_glenum(status))
    }

    fn framebuffer_delete(&self, framebuffer: &Framebuffer) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.framebuffers.remove(framebuffer.raw)?;
        if ctxt.bindings.draw_framebuffer == Some(framebuffer.raw) {
            ctxt.bindings.draw_framebuffer = None;
        }
        if ctxt.bindings.read_framebuffer == Some(framebuffer.raw) {
            ctxt.bindings.read_framebuffer = None;
        }

        debug!("Deleting framebuffer {}", framebuffer.id);
        ctxt.delete_framebuffer(framebuffer.id)
    }
}

impl ReadFramebuffers for GlFramebuffers {
    fn framebuffer_read_bind(&self, framebuffer: &Framebuffer) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.resources.framebuffers.get(framebuffer.raw)?;
        ctxt.bind_read_framebuffer(framebuffer.id)?;
        ctxt.bindings.read_framebuffer = Some(framebuffer.raw);
        Ok(())
    }

    fn framebuffer_read_unbind(&self) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        ctxt.bind_read_framebuffer(0)?;
        ctxt.bindings.read_framebuffer = None;
        Ok(())
    }

    fn framebuffer_read_is_bound(&self, framebuffer: &Framebuffer) -> Result<bool, Error> {
        let ctxt = self.context.make_current();
        ctxt.resources.framebuffers.get(framebuffer.raw)?;
        Ok(ctxt.bindings.read_framebuffer == Some(framebuffer.raw))
    }

    fn framebuffer_read_any_is_bound(&self) -> bool {
        self.context.make_current().bindings.read_framebuffer.is_some()
    }

    fn framebuffer_blit(&self, source: Rect, target: Rect, buffers: BlitBuffers,
                        filter: BlitFilter) -> Result<(), Error>
    {
        if (buffers.depth || buffers.stencil) && filter != BlitFilter::Nearest {
            return Err(PreconditionError::BlitFilter.into());
        }

        let mut ctxt = self.context.make_current();
        let src = source.corners();
        let dst = target.corners();
        let mask = buffers.mask();
        let filter = filter.to_glenum();

        ctxt.call(format_args!("glBlitFramebuffer({:?}, {:?}, 0x{:x}, 0x{:x})", src, dst, mask,
                               filter),
                  |gl| gl.blit_framebuffer(src, dst, mask, filter))
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorAttachmentPoint, DrawBuffer, FramebufferBuilder, FramebufferStatus};
    use crate::gl;

    #[test]
    fn status_values() {
        assert_eq!(FramebufferStatus::from_glenum(gl::FRAMEBUFFER_COMPLETE),
                   FramebufferStatus::Complete);
        assert_eq!(FramebufferStatus::from_glenum(0x8CD9), FramebufferStatus::IncompleteDimensions);
        assert_eq!(FramebufferStatus::from_glenum(1), FramebufferStatus::Unknown(1));
    }

    #[test]
    fn explicit_draw_buffer_list() {
        let mut builder = FramebufferBuilder::new();
        builder.map_draw_buffer(DrawBuffer(2), ColorAttachmentPoint(0));
        builder.map_draw_buffer(DrawBuffer(0), ColorAttachmentPoint(1));
        assert_eq!(builder.draw_buffer_list().as_slice(),
                   &[gl::COLOR_ATTACHMENT1, gl::NONE, gl::COLOR_ATTACHMENT0]);

        builder.unmap_draw_buffer(DrawBuffer(2));
        assert_eq!(builder.draw_buffer_list().as_slice(), &[gl::COLOR_ATTACHMENT1]);
    }

    #[test]
    fn empty_builder_draws_nowhere() {
        let builder = FramebufferBuilder::new();
        assert_eq!(builder.draw_buffer_list().as_slice(), &[gl::NONE]);
    }
}
