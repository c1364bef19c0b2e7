use log::warn;

use crate::context::Profile;
use crate::driver::Driver;
use crate::gl;

/// Limits that hide part of what the driver supports.
///
/// Mostly useful in tests, to check that code behaves when fewer texture units or color
/// attachments are available than on the development machine. A limit above what the driver
/// supports has no effect.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SoftRestrictions {
    /// Maximum number of texture units to expose.
    pub texture_units: Option<u32>,
    /// Maximum number of color attachment points to expose.
    pub color_attachments: Option<u32>,
    /// Maximum number of draw buffers to expose.
    pub draw_buffers: Option<u32>,
}

/// Represents the capabilities of the context, with soft restrictions applied.
#[derive(Debug, Clone)]
pub struct Capabilities {
    /// Number of bits in the default framebuffer's depth buffer.
    pub depth_bits: u32,

    /// Number of bits in the default framebuffer's stencil buffer.
    pub stencil_bits: u32,

    /// Maximum number of textures that can be bound at once.
    ///
    /// `glActiveTexture` must be between `GL_TEXTURE0` and `GL_TEXTURE0` + this value - 1.
    pub texture_units: u32,

    /// Maximum width and height of a texture.
    pub max_texture_size: u32,

    /// Maximum width and height of the faces of a cube map.
    pub max_cube_map_texture_size: u32,

    /// Number of color attachment points of a framebuffer.
    pub color_attachments: u32,

    /// Maximum number of elements that can be passed with `glDrawBuffers`.
    pub draw_buffers: u32,

    /// Number of vertex attributes, and so of attribute slots of an array object.
    pub max_vertex_attribs: u32,
}

fn restrict(what: &str, driver: u32, soft: Option<u32>) -> u32 {
    match soft {
        Some(soft) if soft > driver => {
            warn!("Soft restriction of {} {} is above the driver's limit of {}",
                  soft, what, driver);
            driver
        },
        Some(soft) => soft,
        None => driver,
    }
}

/// Loads the capabilities.
pub fn get_capabilities(driver: &mut dyn Driver, profile: Profile,
                        restrictions: &SoftRestrictions) -> Capabilities
{
    let positive = |v: gl::types::GLint| v.max(0) as u32;

    let texture_units = positive(driver.get_integer(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS));
    let max_texture_size = positive(driver.get_integer(gl::MAX_TEXTURE_SIZE));
    let max_cube_map_texture_size = positive(driver.get_integer(gl::MAX_CUBE_MAP_TEXTURE_SIZE));

    // GLES 2 has no multiple render targets at all
    let (color_attachments, draw_buffers) = if profile == Profile::Gles2 {
        (1, 1)
    } else {
        (positive(driver.get_integer(gl::MAX_COLOR_ATTACHMENTS)).max(1),
         positive(driver.get_integer(gl::MAX_DRAW_BUFFERS)).max(1))
    };

    Capabilities {
        depth_bits: positive(driver.get_integer(gl::DEPTH_BITS)),
        stencil_bits: positive(driver.get_integer(gl::STENCIL_BITS)),
        texture_units: restrict("texture units", texture_units, restrictions.texture_units),
        max_texture_size,
        max_cube_map_texture_size,
        color_attachments: restrict("color attachments", color_attachments,
                                    restrictions.color_attachments),
        draw_buffers: restrict("draw buffers", draw_buffers, restrictions.draw_buffers),
        max_vertex_attribs: positive(driver.get_integer(gl::MAX_VERTEX_ATTRIBS)),
    }
}

#[cfg(test)]
mod tests {
    use super::{get_capabilities, SoftRestrictions};
    use crate::context::Profile;
    use crate::driver::fake::{FakeConfig, FakeDriver};

    #[test]
    fn restrictions_cap_the_driver() {
        let mut driver = FakeDriver::new(FakeConfig::gl33());
        let restrictions = SoftRestrictions {
            texture_units: Some(4),
            color_attachments: Some(100),
            draw_buffers: None,
        };

        let caps = get_capabilities(&mut driver, Profile::Gl3, &restrictions);
        assert_eq!(caps.texture_units, 4);
        assert_eq!(caps.color_attachments, 8);
        assert_eq!(caps.draw_buffers, 8);
        assert_eq!(caps.depth_bits, 24);
    }

    #[test]
    fn gles2_has_a_single_attachment() {
        let mut driver = FakeDriver::new(FakeConfig::gles2());
        let caps = get_capabilities(&mut driver, Profile::Gles2, &SoftRestrictions::default());
        assert_eq!(caps.color_attachments, 1);
        assert_eq!(caps.draw_buffers, 1);
        assert_eq!(caps.max_texture_size, 2048);
        assert_eq!(caps.max_cube_map_texture_size, 1024);
        assert_eq!(caps.max_vertex_attribs, 8);
        assert_eq!(caps.stencil_bits, 0);
    }
}
