/// Contains data about the list of extensions.
///
/// Only the extensions that change the behavior of glguard are listed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionsList {
    /// GL_ARB_framebuffer_object
    pub gl_arb_framebuffer_object: bool,
    /// GL_EXT_framebuffer_object
    pub gl_ext_framebuffer_object: bool,
    /// GL_EXT_packed_depth_stencil
    pub gl_ext_packed_depth_stencil: bool,
    /// GL_OES_depth24
    pub gl_oes_depth24: bool,
    /// GL_OES_depth_texture
    pub gl_oes_depth_texture: bool,
    /// GL_OES_element_index_uint
    pub gl_oes_element_index_uint: bool,
    /// GL_OES_packed_depth_stencil
    pub gl_oes_packed_depth_stencil: bool,
    /// GL_OES_rgb8_rgba8
    pub gl_oes_rgb8_rgba8: bool,
}

impl ExtensionsList {
    /// Builds the list from the names returned by the driver.
    pub fn from_strings<I, S>(strings: I) -> ExtensionsList
        where I: IntoIterator<Item = S>, S: AsRef<str>
    {
        let mut extensions = ExtensionsList::default();

        for extension in strings {
            match extension.as_ref() {
                "GL_ARB_framebuffer_object" => extensions.gl_arb_framebuffer_object = true,
                "GL_EXT_framebuffer_object" => extensions.gl_ext_framebuffer_object = true,
                "GL_EXT_packed_depth_stencil" => extensions.gl_ext_packed_depth_stencil = true,
                "GL_OES_depth24" => extensions.gl_oes_depth24 = true,
                "GL_OES_depth_texture" => extensions.gl_oes_depth_texture = true,
                "GL_OES_element_index_uint" => extensions.gl_oes_element_index_uint = true,
                "GL_OES_packed_depth_stencil" => extensions.gl_oes_packed_depth_stencil = true,
                "GL_OES_rgb8_rgba8" => extensions.gl_oes_rgb8_rgba8 = true,
                _ => ()
            }
        }

        extensions
    }
}

#[cfg(test)]
mod tests {
    use super::ExtensionsList;

    #[test]
    fn unknown_names_are_ignored() {
        let list = ExtensionsList::from_strings(vec!["GL_OES_depth24", "GL_FOO_bar", ""]);
        assert!(list.gl_oes_depth24);
        assert!(!list.gl_oes_packed_depth_stencil);
        assert!(!list.gl_arb_framebuffer_object);
    }
}
