use std::cmp::Ordering;
use std::fmt;

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the same API.
/// For example, both `Version(Api::Gl, 3, 0) >= Version(Api::GlEs, 3, 0)` and
/// `Version(Api::GlEs, 3, 0) >= Version(Api::Gl, 3, 0)` return `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Version(pub Api, pub u8, pub u8);

/// Describes an OpenGL-related API.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Api {
    /// Regular OpenGL.
    Gl,
    /// OpenGL embedded system.
    GlEs,
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<Ordering> {
        if self.0 != other.0 {
            return None;
        }

        match self.1.cmp(&other.1) {
            Ordering::Equal => Some(self.2.cmp(&other.2)),
            a => Some(a)
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Api::Gl => write!(f, "OpenGL {}.{}", self.1, self.2),
            Api::GlEs => write!(f, "OpenGL ES {}.{}", self.1, self.2),
        }
    }
}

/// Parses the string returned by `glGetString(GL_VERSION)`.
///
/// Returns `None` if the string doesn't start with a `major.minor` pair.
pub fn parse_version_string(version: &str) -> Option<Version> {
    let version = version.trim_start();

    let (version, gles) = if let Some(rest) = version.strip_prefix("OpenGL ES ") {
        (rest, true)
    } else if let Some(rest) = version.strip_prefix("OpenGL ES-") {
        // "OpenGL ES-CM 1.1" and friends
        (rest.split(' ').nth(1)?, true)
    } else {
        (version, false)
    };

    let version = version.split(' ').next()?;

    let mut iter = version.split('.');
    let major = iter.next()?;
    let minor = iter.next()?;

    // some drivers append garbage to the minor number, eg. "3.3.0" or "4.6Mesa"
    let minor: String = minor.chars().take_while(|c| c.is_ascii_digit()).collect();

    Some(Version(
        if gles { Api::GlEs } else { Api::Gl },
        major.parse().ok()?,
        minor.parse().ok()?,
    ))
}

/// Parses the string returned by `glGetString(GL_SHADING_LANGUAGE_VERSION)`.
pub fn parse_glsl_version_string(version: &str) -> Option<Version> {
    let version = version.trim_start();

    let (version, gles) = if let Some(rest) = version.strip_prefix("OpenGL ES GLSL ES ") {
        (rest, true)
    } else {
        (version, false)
    };

    let version = version.split(' ').next()?;
    let mut iter = version.split('.');
    let major = iter.next()?.parse().ok()?;
    let minor: String = iter.next()?.chars().take_while(|c| c.is_ascii_digit()).collect();

    Some(Version(if gles { Api::GlEs } else { Api::Gl }, major, minor.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::{parse_glsl_version_string, parse_version_string, Api, Version};

    #[test]
    fn desktop_versions() {
        assert_eq!(parse_version_string("3.3.0 NVIDIA 390.25"), Some(Version(Api::Gl, 3, 3)));
        assert_eq!(parse_version_string("2.1 Mesa 20.0.8"), Some(Version(Api::Gl, 2, 1)));
        assert_eq!(parse_version_string("4.6 (Core Profile) Mesa 23.1"), Some(Version(Api::Gl, 4, 6)));
    }

    #[test]
    fn embedded_versions() {
        assert_eq!(parse_version_string("OpenGL ES 2.0 Mesa"), Some(Version(Api::GlEs, 2, 0)));
        assert_eq!(parse_version_string("OpenGL ES 3.2 v1.r26p0"), Some(Version(Api::GlEs, 3, 2)));
        assert_eq!(parse_version_string("OpenGL ES-CM 1.1"), Some(Version(Api::GlEs, 1, 1)));
    }

    #[test]
    fn garbage() {
        assert_eq!(parse_version_string(""), None);
        assert_eq!(parse_version_string("hello"), None);
        assert_eq!(parse_version_string("3"), None);
    }

    #[test]
    fn glsl_versions() {
        assert_eq!(parse_glsl_version_string("3.30 NVIDIA via Cg compiler"),
                   Some(Version(Api::Gl, 3, 30)));
        assert_eq!(parse_glsl_version_string("OpenGL ES GLSL ES 1.00"),
                   Some(Version(Api::GlEs, 1, 0)));
    }

    #[test]
    fn cross_api_comparison() {
        assert!(!(Version(Api::Gl, 3, 0) >= Version(Api::GlEs, 3, 0)));
        assert!(!(Version(Api::GlEs, 3, 0) >= Version(Api::Gl, 3, 0)));
        assert!(Version(Api::Gl, 3, 3) > Version(Api::Gl, 3, 0));
    }
}
