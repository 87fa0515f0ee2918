extern crate gl_generator;

use gl_generator::{Api, Fallbacks, Profile, Registry, StructGenerator};

fn main() {
  let out_dir = std::env::var("OUT_DIR").unwrap();
  let path = std::path::Path::new(&out_dir).join("bindings.rs");
  let mut file = std::fs::File::create(path).unwrap();

  // Everything up to GL 4.6 core, plus the extensions whose entry points or
  // constants are not part of any core version and that the state blocks can
  // select as dispatch targets.
  Registry::new(
    Api::Gl,
    (4, 6),
    Profile::Core,
    Fallbacks::All,
    [
      "GL_APPLE_vertex_array_object",
      "GL_ARB_robustness",
      "GL_EXT_debug_label",
      "GL_EXT_debug_marker",
      "GL_EXT_direct_state_access",
      "GL_EXT_framebuffer_blit",
      "GL_EXT_framebuffer_object",
      "GL_EXT_texture_filter_anisotropic",
      "GL_GREMEDY_string_marker",
    ],
  )
  .write_bindings(StructGenerator, &mut file)
  .unwrap();

  println!("cargo:rerun-if-changed=build.rs");
}
