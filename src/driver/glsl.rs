//! A very small GLSL declaration scanner.
//!
//! The fake driver doesn't compile anything. It only needs to know which attributes and
//! uniforms a shader declares, so that linking produces a plausible reflection. Everything
//! inside braces is skipped, and the remaining top-level statements are matched against
//! `[layout(...)] [qualifiers] (attribute|in|uniform) type name[N];`.

use crate::gl;
use crate::gl::types::GLenum;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub ty: GLenum,
    pub size: i32,
}

#[derive(Debug, Default, Clone)]
pub struct Declarations {
    pub inputs: Vec<Declaration>,
    pub uniforms: Vec<Declaration>,
}

/// Returns the `GL_*` enum of a GLSL type name.
pub fn type_enum(name: &str) -> Option<GLenum> {
    Some(match name {
        "float" => gl::FLOAT,
        "vec2" => gl::FLOAT_VEC2,
        "vec3" => gl::FLOAT_VEC3,
        "vec4" => gl::FLOAT_VEC4,
        "int" => gl::INT,
        "ivec2" => gl::INT_VEC2,
        "ivec3" => gl::INT_VEC3,
        "ivec4" => gl::INT_VEC4,
        "uint" => gl::UNSIGNED_INT,
        "uvec2" => gl::UNSIGNED_INT_VEC2,
        "uvec3" => gl::UNSIGNED_INT_VEC3,
        "uvec4" => gl::UNSIGNED_INT_VEC4,
        "bool" => gl::BOOL,
        "bvec2" => gl::BOOL_VEC2,
        "bvec3" => gl::BOOL_VEC3,
        "bvec4" => gl::BOOL_VEC4,
        "mat2" => gl::FLOAT_MAT2,
        "mat3" => gl::FLOAT_MAT3,
        "mat4" => gl::FLOAT_MAT4,
        "sampler2D" => gl::SAMPLER_2D,
        "samplerCube" => gl::SAMPLER_CUBE,
        "sampler2DShadow" => gl::SAMPLER_2D_SHADOW,
        _ => return None,
    })
}

const QUALIFIERS: &[&str] = &[
    "highp", "mediump", "lowp", "flat", "smooth", "noperspective", "centroid", "invariant",
    "const",
];

/// Removes comments and the contents of every `{ ... }` block.
fn top_level(source: &str) -> String {
    let mut result = String::with_capacity(source.len());
    let mut depth = 0usize;

    for line in source.lines() {
        let line = match line.find("//") {
            Some(pos) => &line[.. pos],
            None => line,
        };

        // preprocessor lines don't end with a semicolon
        if depth == 0 && line.trim_start().starts_with('#') {
            continue;
        }

        for c in line.chars() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        result.push(';');
                    }
                },
                _ if depth == 0 => result.push(c),
                _ => (),
            }
        }

        result.push(' ');
    }

    result
}

/// Returns true if the braces of the source are balanced.
pub fn balanced(source: &str) -> bool {
    let mut depth = 0i64;
    for c in source.chars() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            },
            _ => (),
        }
    }

    depth == 0
}

/// Scans the declarations of a shader. `vertex` enables the `attribute` and `in` inputs.
pub fn scan(source: &str, vertex: bool) -> Declarations {
    let mut declarations = Declarations::default();

    for statement in top_level(source).split(';') {
        let mut statement = statement.trim();

        if statement.starts_with("layout") {
            statement = match statement.find(')') {
                Some(pos) => statement[pos + 1 ..].trim_start(),
                None => continue,
            };
        }

        let mut tokens = statement.split_whitespace()
                                  .filter(|t| !QUALIFIERS.contains(t));

        let storage = match tokens.next() {
            Some(s) => s,
            None => continue,
        };

        let (ty, name) = match (tokens.next(), tokens.next()) {
            (Some(ty), Some(name)) => (ty, name),
            _ => continue,
        };

        let ty = match type_enum(ty) {
            Some(ty) => ty,
            None => continue,
        };

        let (name, size) = match name.find('[') {
            Some(pos) => {
                let size = name[pos + 1 ..].trim_end_matches(']').parse().unwrap_or(1);
                (&name[.. pos], size)
            },
            None => (name, 1),
        };

        let declaration = Declaration { name: name.to_owned(), ty, size };

        match storage {
            "uniform" => declarations.uniforms.push(declaration),
            "attribute" | "in" if vertex => declarations.inputs.push(declaration),
            _ => (),
        }
    }

    declarations
}

#[cfg(test)]
mod tests {
    use super::{balanced, scan};
    use crate::gl;

    const VERTEX: &str = "#version 330\n\
        layout(location = 0) in vec3 position;\n\
        in highp vec2 uv; // texture coordinates\n\
        uniform mat4 matrix;\n\
        uniform float weights[4];\n\
        out vec2 v_uv;\n\
        void main() {\n\
            float unused = 1.0;\n\
            gl_Position = matrix * vec4(position, 1.0);\n\
        }\n";

    #[test]
    fn vertex_declarations() {
        let declarations = scan(VERTEX, true);

        let inputs: Vec<_> = declarations.inputs.iter().map(|d| (d.name.as_str(), d.ty)).collect();
        assert_eq!(inputs, vec![("position", gl::FLOAT_VEC3), ("uv", gl::FLOAT_VEC2)]);

        assert_eq!(declarations.uniforms.len(), 2);
        assert_eq!(declarations.uniforms[0].ty, gl::FLOAT_MAT4);
        assert_eq!(declarations.uniforms[1].name, "weights");
        assert_eq!(declarations.uniforms[1].size, 4);
    }

    #[test]
    fn fragment_inputs_are_not_attributes() {
        let declarations = scan("in vec2 v_uv;\nuniform sampler2D tex;\nvoid main() {}\n", false);
        assert!(declarations.inputs.is_empty());
        assert_eq!(declarations.uniforms[0].ty, gl::SAMPLER_2D);
    }

    #[test]
    fn uniform_blocks_are_skipped() {
        let declarations = scan("uniform Block { mat4 m; };\nuniform vec4 color;\n", false);
        assert_eq!(declarations.uniforms.len(), 1);
        assert_eq!(declarations.uniforms[0].name, "color");
    }

    #[test]
    fn brace_balance() {
        assert!(balanced("void main() { if (x) { } }"));
        assert!(!balanced("void main() {"));
        assert!(!balanced("} {"));
    }
}
