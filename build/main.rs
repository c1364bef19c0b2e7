use std::env;
use std::fs::File;
use std::path::Path;

use gl_generator::{Api, Fallbacks, Profile, Registry, StructGenerator};

fn main() {
    let dest = env::var("OUT_DIR").unwrap();
    let mut file = File::create(&Path::new(&dest).join("gl_bindings.rs")).unwrap();

    // GLES 2/3 entry points are a subset of these, and the compatibility profile keeps
    // the enums removed from core (DEPTH_BITS, STENCIL_BITS) that GL 2.1 still needs
    Registry::new(Api::Gl, (4, 6), Profile::Compatibility, Fallbacks::All, [
                      "GL_ARB_framebuffer_object",
                      "GL_EXT_framebuffer_object",
                      "GL_EXT_framebuffer_blit",
                      "GL_EXT_packed_depth_stencil",
                  ])
        .write_bindings(StructGenerator, &mut file)
        .unwrap();

    println!("cargo:rerun-if-changed=build/main.rs");
}
