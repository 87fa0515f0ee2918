//! A scriptable, call-counting mock GL driver.
//!
//! The loader hands out `extern "system"` stubs that read their answers from
//! and record their calls into a thread-local [`Driver`]. Tests install a
//! fresh driver, create a context against [`loader`] and then assert on call
//! counts.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CString;
use std::os::raw::c_void;
use std::ptr;

use lucent::gl;
use lucent::gl::types::*;

pub struct Driver {
  pub vendor: CString,
  pub renderer: CString,
  pub version: CString,
  pub extensions: Vec<CString>,
  pub legacy_extensions: CString,
  pub integers: HashMap<GLenum, Vec<GLint>>,
  pub floats: HashMap<GLenum, Vec<GLfloat>>,
  pub calls: HashMap<&'static str, usize>,
  next_name: GLuint,
}

impl Driver {
  fn base(version: &str, major: GLint, minor: GLint) -> Driver {
    let mut integers = HashMap::new();
    integers.insert(gl::MAJOR_VERSION, vec![major]);
    integers.insert(gl::MINOR_VERSION, vec![minor]);
    integers.insert(gl::MAX_VIEWPORT_DIMS, vec![16384, 16384]);
    integers.insert(gl::MAX_DRAW_BUFFERS, vec![8]);
    integers.insert(gl::MAX_COLOR_ATTACHMENTS, vec![8]);
    integers.insert(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS, vec![48]);
    integers.insert(gl::MAX_TEXTURE_SIZE, vec![16384]);
    integers.insert(gl::MAX_VERTEX_ATTRIBS, vec![16]);
    integers.insert(gl::MAX_UNIFORM_BUFFER_BINDINGS, vec![36]);
    integers.insert(gl::UNIFORM_BUFFER_OFFSET_ALIGNMENT, vec![256]);
    integers.insert(gl::MAX_LABEL_LENGTH, vec![256]);

    let mut floats = HashMap::new();
    floats.insert(gl::MAX_TEXTURE_MAX_ANISOTROPY_EXT, vec![16.0]);

    Driver {
      vendor: CString::new("Mock Vendor").unwrap(),
      renderer: CString::new("Mock Renderer").unwrap(),
      version: CString::new(version).unwrap(),
      extensions: Vec::new(),
      legacy_extensions: CString::new("").unwrap(),
      integers,
      floats,
      calls: HashMap::new(),
      next_name: 1,
    }
  }

  /// A plain desktop 3.3 driver advertising nothing beyond core.
  pub fn gl33() -> Driver {
    Driver::base("3.3.0 Mock GL Driver", 3, 3)
  }

  /// A desktop 4.5 driver; DSA is core here.
  pub fn gl45() -> Driver {
    Driver::base("4.5.0 Mock GL Driver", 4, 5)
  }

  /// A legacy desktop 2.1 driver; only the string paths work.
  pub fn gl21() -> Driver {
    Driver::base("2.1 Mock Legacy Driver", 0, 0)
  }

  /// An ES2-profile context on top of an ES3-class ANGLE implementation; the
  /// version string is the only giveaway.
  pub fn es2_angle() -> Driver {
    let mut driver = Driver::base("OpenGL ES 2.0 (ANGLE 2.1.0.mock)", 3, 0);
    driver.vendor = CString::new("Google Inc.").unwrap();
    driver.renderer = CString::new("ANGLE (Mock Direct3D11 vs_5_0)").unwrap();
    driver
  }

  pub fn with_version(mut self, version: &str) -> Driver {
    self.version = CString::new(version).unwrap();
    self
  }

  pub fn with_vendor(mut self, vendor: &str) -> Driver {
    self.vendor = CString::new(vendor).unwrap();
    self
  }

  pub fn with_renderer(mut self, renderer: &str) -> Driver {
    self.renderer = CString::new(renderer).unwrap();
    self
  }

  pub fn with_extensions(mut self, extensions: &[&str]) -> Driver {
    self.extensions = extensions
      .iter()
      .map(|e| CString::new(*e).unwrap())
      .collect();
    self.legacy_extensions = CString::new(extensions.join(" ")).unwrap();
    self
  }

  pub fn with_integer(mut self, pname: GLenum, values: &[GLint]) -> Driver {
    self.integers.insert(pname, values.to_vec());
    self
  }
}

thread_local! {
  static DRIVER: RefCell<Driver> = RefCell::new(Driver::gl33());
}

/// Install a fresh driver script (and zeroed call counters) for this thread.
pub fn install(driver: Driver) {
  DRIVER.with(|d| *d.borrow_mut() = driver);
}

/// How many times the named entry point was called since [`install`].
pub fn calls(name: &str) -> usize {
  DRIVER.with(|d| d.borrow().calls.get(name).copied().unwrap_or(0))
}

fn count(name: &'static str) {
  DRIVER.with(|d| *d.borrow_mut().calls.entry(name).or_insert(0) += 1);
}

fn alloc_names(n: GLsizei, names: *mut GLuint) {
  DRIVER.with(|d| {
    let mut driver = d.borrow_mut();

    for i in 0..n as usize {
      unsafe {
        *names.add(i) = driver.next_name;
      }
      driver.next_name += 1;
    }
  });
}

extern "system" fn get_string(name: GLenum) -> *const GLubyte {
  count("glGetString");

  DRIVER.with(|d| {
    let driver = d.borrow();

    match name {
      gl::VENDOR => driver.vendor.as_ptr() as *const GLubyte,
      gl::RENDERER => driver.renderer.as_ptr() as *const GLubyte,
      gl::VERSION => driver.version.as_ptr() as *const GLubyte,
      gl::EXTENSIONS => {
        drop(driver);
        count("glGetString(GL_EXTENSIONS)");
        d.borrow().legacy_extensions.as_ptr() as *const GLubyte
      }
      _ => ptr::null(),
    }
  })
}

extern "system" fn get_stringi(name: GLenum, index: GLuint) -> *const GLubyte {
  count("glGetStringi");

  DRIVER.with(|d| {
    let driver = d.borrow();

    if name == gl::EXTENSIONS {
      driver
        .extensions
        .get(index as usize)
        .map_or(ptr::null(), |e| e.as_ptr() as *const GLubyte)
    } else {
      ptr::null()
    }
  })
}

extern "system" fn get_integerv(pname: GLenum, data: *mut GLint) {
  count("glGetIntegerv");

  DRIVER.with(|d| {
    let driver = d.borrow();

    if pname == gl::NUM_EXTENSIONS {
      unsafe {
        *data = driver.extensions.len() as GLint;
      }
      return;
    }

    if let Some(values) = driver.integers.get(&pname) {
      for (i, value) in values.iter().enumerate() {
        unsafe {
          *data.add(i) = *value;
        }
      }
    }
  });
}

extern "system" fn get_floatv(pname: GLenum, data: *mut GLfloat) {
  count("glGetFloatv");

  DRIVER.with(|d| {
    let driver = d.borrow();

    if let Some(values) = driver.floats.get(&pname) {
      for (i, value) in values.iter().enumerate() {
        unsafe {
          *data.add(i) = *value;
        }
      }
    }
  });
}

extern "system" fn get_error() -> GLenum {
  count("glGetError");
  gl::NO_ERROR
}

extern "system" fn gen_framebuffers(n: GLsizei, names: *mut GLuint) {
  count("glGenFramebuffers");
  alloc_names(n, names);
}

extern "system" fn create_framebuffers(n: GLsizei, names: *mut GLuint) {
  count("glCreateFramebuffers");
  alloc_names(n, names);
}

extern "system" fn bind_framebuffer(_target: GLenum, _framebuffer: GLuint) {
  count("glBindFramebuffer");
}

extern "system" fn check_framebuffer_status(_target: GLenum) -> GLenum {
  count("glCheckFramebufferStatus");
  gl::FRAMEBUFFER_COMPLETE
}

extern "system" fn check_named_framebuffer_status(_framebuffer: GLuint, _target: GLenum) -> GLenum {
  count("glCheckNamedFramebufferStatus");
  gl::FRAMEBUFFER_COMPLETE
}

extern "system" fn blit_framebuffer(
  _: GLint,
  _: GLint,
  _: GLint,
  _: GLint,
  _: GLint,
  _: GLint,
  _: GLint,
  _: GLint,
  _: GLbitfield,
  _: GLenum,
) {
  count("glBlitFramebuffer");
}

extern "system" fn invalidate_framebuffer(_: GLenum, _: GLsizei, _: *const GLenum) {
  count("glInvalidateFramebuffer");
}

extern "system" fn viewport(_: GLint, _: GLint, _: GLsizei, _: GLsizei) {
  count("glViewport");
}

extern "system" fn gen_buffers(n: GLsizei, names: *mut GLuint) {
  count("glGenBuffers");
  alloc_names(n, names);
}

extern "system" fn create_buffers(n: GLsizei, names: *mut GLuint) {
  count("glCreateBuffers");
  alloc_names(n, names);
}

extern "system" fn bind_buffer(_target: GLenum, _buffer: GLuint) {
  count("glBindBuffer");
}

extern "system" fn bind_buffer_base(_target: GLenum, _index: GLuint, _buffer: GLuint) {
  count("glBindBufferBase");
}

extern "system" fn gen_vertex_arrays(n: GLsizei, names: *mut GLuint) {
  count("glGenVertexArrays");
  alloc_names(n, names);
}

extern "system" fn create_vertex_arrays(n: GLsizei, names: *mut GLuint) {
  count("glCreateVertexArrays");
  alloc_names(n, names);
}

extern "system" fn bind_vertex_array(_vertex_array: GLuint) {
  count("glBindVertexArray");
}

extern "system" fn delete_vertex_arrays(_n: GLsizei, _names: *const GLuint) {
  count("glDeleteVertexArrays");
}

extern "system" fn gen_textures(n: GLsizei, names: *mut GLuint) {
  count("glGenTextures");
  alloc_names(n, names);
}

extern "system" fn create_textures(_target: GLenum, n: GLsizei, names: *mut GLuint) {
  count("glCreateTextures");
  alloc_names(n, names);
}

extern "system" fn active_texture(_unit: GLenum) {
  count("glActiveTexture");
}

extern "system" fn bind_texture(_target: GLenum, _texture: GLuint) {
  count("glBindTexture");
}

extern "system" fn bind_texture_unit(_unit: GLuint, _texture: GLuint) {
  count("glBindTextureUnit");
}

extern "system" fn use_program(_program: GLuint) {
  count("glUseProgram");
}

extern "system" fn program_uniform_1i(_program: GLuint, _location: GLint, _value: GLint) {
  count("glProgramUniform1i");
}

extern "system" fn uniform_1i(_location: GLint, _value: GLint) {
  count("glUniform1i");
}

extern "system" fn release_shader_compiler() {
  count("glReleaseShaderCompiler");
}

extern "system" fn clear_color(_: GLfloat, _: GLfloat, _: GLfloat, _: GLfloat) {
  count("glClearColor");
}

extern "system" fn line_width(_: GLfloat) {
  count("glLineWidth");
}

extern "system" fn scissor(_: GLint, _: GLint, _: GLsizei, _: GLsizei) {
  count("glScissor");
}

extern "system" fn pixel_storei(_: GLenum, _: GLint) {
  count("glPixelStorei");
}

extern "system" fn gen_queries(n: GLsizei, names: *mut GLuint) {
  count("glGenQueries");
  alloc_names(n, names);
}

extern "system" fn create_queries(_target: GLenum, n: GLsizei, names: *mut GLuint) {
  count("glCreateQueries");
  alloc_names(n, names);
}

extern "system" fn query_counter(_query: GLuint, _target: GLenum) {
  count("glQueryCounter");
}

extern "system" fn gen_transform_feedbacks(n: GLsizei, names: *mut GLuint) {
  count("glGenTransformFeedbacks");
  alloc_names(n, names);
}

extern "system" fn create_transform_feedbacks(n: GLsizei, names: *mut GLuint) {
  count("glCreateTransformFeedbacks");
  alloc_names(n, names);
}

extern "system" fn bind_transform_feedback(_target: GLenum, _transform_feedback: GLuint) {
  count("glBindTransformFeedback");
}

extern "system" fn get_graphics_reset_status() -> GLenum {
  count("glGetGraphicsResetStatus");
  gl::NO_ERROR
}

extern "system" fn object_label(_: GLenum, _: GLuint, _: GLsizei, _: *const GLchar) {
  count("glObjectLabel");
}

extern "system" fn debug_message_insert(
  _: GLenum,
  _: GLenum,
  _: GLuint,
  _: GLenum,
  _: GLsizei,
  _: *const GLchar,
) {
  count("glDebugMessageInsert");
}

/// Resolve a mock entry point; unknown symbols stay unresolved, like a real
/// loader on a driver that does not export them.
pub fn loader(symbol: &str) -> *const c_void {
  match symbol {
    "glGetString" => {
      let f: extern "system" fn(GLenum) -> *const GLubyte = get_string;
      f as *const c_void
    }
    "glGetStringi" => {
      let f: extern "system" fn(GLenum, GLuint) -> *const GLubyte = get_stringi;
      f as *const c_void
    }
    "glGetIntegerv" => {
      let f: extern "system" fn(GLenum, *mut GLint) = get_integerv;
      f as *const c_void
    }
    "glGetFloatv" => {
      let f: extern "system" fn(GLenum, *mut GLfloat) = get_floatv;
      f as *const c_void
    }
    "glGetError" => {
      let f: extern "system" fn() -> GLenum = get_error;
      f as *const c_void
    }
    "glGenFramebuffers" => {
      let f: extern "system" fn(GLsizei, *mut GLuint) = gen_framebuffers;
      f as *const c_void
    }
    "glCreateFramebuffers" => {
      let f: extern "system" fn(GLsizei, *mut GLuint) = create_framebuffers;
      f as *const c_void
    }
    "glBindFramebuffer" => {
      let f: extern "system" fn(GLenum, GLuint) = bind_framebuffer;
      f as *const c_void
    }
    "glCheckFramebufferStatus" => {
      let f: extern "system" fn(GLenum) -> GLenum = check_framebuffer_status;
      f as *const c_void
    }
    "glCheckNamedFramebufferStatus" => {
      let f: extern "system" fn(GLuint, GLenum) -> GLenum = check_named_framebuffer_status;
      f as *const c_void
    }
    "glBlitFramebuffer" => {
      let f: extern "system" fn(
        GLint,
        GLint,
        GLint,
        GLint,
        GLint,
        GLint,
        GLint,
        GLint,
        GLbitfield,
        GLenum,
      ) = blit_framebuffer;
      f as *const c_void
    }
    "glInvalidateFramebuffer" => {
      let f: extern "system" fn(GLenum, GLsizei, *const GLenum) = invalidate_framebuffer;
      f as *const c_void
    }
    "glViewport" => {
      let f: extern "system" fn(GLint, GLint, GLsizei, GLsizei) = viewport;
      f as *const c_void
    }
    "glGenBuffers" => {
      let f: extern "system" fn(GLsizei, *mut GLuint) = gen_buffers;
      f as *const c_void
    }
    "glCreateBuffers" => {
      let f: extern "system" fn(GLsizei, *mut GLuint) = create_buffers;
      f as *const c_void
    }
    "glBindBuffer" => {
      let f: extern "system" fn(GLenum, GLuint) = bind_buffer;
      f as *const c_void
    }
    "glBindBufferBase" => {
      let f: extern "system" fn(GLenum, GLuint, GLuint) = bind_buffer_base;
      f as *const c_void
    }
    "glGenVertexArrays" => {
      let f: extern "system" fn(GLsizei, *mut GLuint) = gen_vertex_arrays;
      f as *const c_void
    }
    "glCreateVertexArrays" => {
      let f: extern "system" fn(GLsizei, *mut GLuint) = create_vertex_arrays;
      f as *const c_void
    }
    "glBindVertexArray" => {
      let f: extern "system" fn(GLuint) = bind_vertex_array;
      f as *const c_void
    }
    "glDeleteVertexArrays" => {
      let f: extern "system" fn(GLsizei, *const GLuint) = delete_vertex_arrays;
      f as *const c_void
    }
    "glGenTextures" => {
      let f: extern "system" fn(GLsizei, *mut GLuint) = gen_textures;
      f as *const c_void
    }
    "glCreateTextures" => {
      let f: extern "system" fn(GLenum, GLsizei, *mut GLuint) = create_textures;
      f as *const c_void
    }
    "glActiveTexture" => {
      let f: extern "system" fn(GLenum) = active_texture;
      f as *const c_void
    }
    "glBindTexture" => {
      let f: extern "system" fn(GLenum, GLuint) = bind_texture;
      f as *const c_void
    }
    "glBindTextureUnit" => {
      let f: extern "system" fn(GLuint, GLuint) = bind_texture_unit;
      f as *const c_void
    }
    "glUseProgram" => {
      let f: extern "system" fn(GLuint) = use_program;
      f as *const c_void
    }
    "glProgramUniform1i" => {
      let f: extern "system" fn(GLuint, GLint, GLint) = program_uniform_1i;
      f as *const c_void
    }
    "glUniform1i" => {
      let f: extern "system" fn(GLint, GLint) = uniform_1i;
      f as *const c_void
    }
    "glReleaseShaderCompiler" => {
      let f: extern "system" fn() = release_shader_compiler;
      f as *const c_void
    }
    "glClearColor" => {
      let f: extern "system" fn(GLfloat, GLfloat, GLfloat, GLfloat) = clear_color;
      f as *const c_void
    }
    "glLineWidth" => {
      let f: extern "system" fn(GLfloat) = line_width;
      f as *const c_void
    }
    "glScissor" => {
      let f: extern "system" fn(GLint, GLint, GLsizei, GLsizei) = scissor;
      f as *const c_void
    }
    "glPixelStorei" => {
      let f: extern "system" fn(GLenum, GLint) = pixel_storei;
      f as *const c_void
    }
    "glGenQueries" => {
      let f: extern "system" fn(GLsizei, *mut GLuint) = gen_queries;
      f as *const c_void
    }
    "glCreateQueries" => {
      let f: extern "system" fn(GLenum, GLsizei, *mut GLuint) = create_queries;
      f as *const c_void
    }
    "glQueryCounter" => {
      let f: extern "system" fn(GLuint, GLenum) = query_counter;
      f as *const c_void
    }
    "glGenTransformFeedbacks" => {
      let f: extern "system" fn(GLsizei, *mut GLuint) = gen_transform_feedbacks;
      f as *const c_void
    }
    "glCreateTransformFeedbacks" => {
      let f: extern "system" fn(GLsizei, *mut GLuint) = create_transform_feedbacks;
      f as *const c_void
    }
    "glBindTransformFeedback" => {
      let f: extern "system" fn(GLenum, GLuint) = bind_transform_feedback;
      f as *const c_void
    }
    "glGetGraphicsResetStatus" => {
      let f: extern "system" fn() -> GLenum = get_graphics_reset_status;
      f as *const c_void
    }
    "glObjectLabel" => {
      let f: extern "system" fn(GLenum, GLuint, GLsizei, *const GLchar) = object_label;
      f as *const c_void
    }
    "glDebugMessageInsert" => {
      let f: extern "system" fn(GLenum, GLenum, GLuint, GLenum, GLsizei, *const GLchar) =
        debug_message_insert;
      f as *const c_void
    }
    _ => ptr::null(),
  }
}
