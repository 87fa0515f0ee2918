//! Vertex array object dispatch and binding cache.

use crate::context::Capabilities;
use crate::extension::Extension;
use crate::gl;
use crate::gl::types::*;
use crate::state::Cached;
use crate::version::Version;

pub struct MeshState {
  create_implementation: unsafe fn(&gl::Gl) -> (GLuint, bool),
  bind_implementation: unsafe fn(&gl::Gl, GLuint),

  bound_vertex_array: Cached<GLuint>,
  // Kept bound for the whole context lifetime when vertex arrays were
  // administratively disabled on a context that refuses to draw without one.
  scratch_vertex_array: GLuint,

  max_vertex_attributes: Cached<GLint>,
  has_vertex_arrays: bool,
}

impl MeshState {
  pub(crate) unsafe fn new(gl: &gl::Gl, caps: &Capabilities) -> MeshState {
    let version = caps.version();
    let dsa = caps.is_extension_supported(Extension::ArbDirectStateAccess);
    let vao = caps.is_extension_supported(Extension::ArbVertexArrayObject)
      || caps.is_extension_supported(Extension::OesVertexArrayObject);
    let apple_vao = caps.is_extension_supported(Extension::AppleVertexArrayObject);

    let create_implementation: unsafe fn(&gl::Gl) -> (GLuint, bool) = if vao {
      if dsa {
        create_dsa
      } else {
        create_default
      }
    } else if apple_vao {
      create_apple
    } else {
      create_unavailable
    };

    let bind_implementation: unsafe fn(&gl::Gl, GLuint) = if vao {
      bind_default
    } else if apple_vao {
      bind_apple
    } else {
      bind_noop
    };

    let mut bound_vertex_array = Cached::unknown();
    let mut scratch_vertex_array = 0;

    // Core-era contexts require a vertex array bound to draw anything. When
    // the extension was administratively disabled the entry points still
    // exist, so one hidden object is created and stays bound.
    let vao_in_core = version >= Version::GL300 || version >= Version::GLES300;
    let vao_disabled = caps.is_extension_disabled(Extension::ArbVertexArrayObject)
      || caps.is_extension_disabled(Extension::OesVertexArrayObject);

    if vao_in_core && vao_disabled {
      gl.GenVertexArrays(1, &mut scratch_vertex_array);
      gl.BindVertexArray(scratch_vertex_array);
      bound_vertex_array = Cached::new(scratch_vertex_array);
    }

    MeshState {
      create_implementation,
      bind_implementation,
      bound_vertex_array,
      scratch_vertex_array,
      max_vertex_attributes: Cached::unknown(),
      has_vertex_arrays: vao || apple_vao,
    }
  }

  /// Whether vertex array objects exist on this context. Without them,
  /// [`create`](Self::create) hands out the zero name and binding is a no-op.
  pub fn has_vertex_arrays(&self) -> bool {
    self.has_vertex_arrays
  }

  /// Allocate a vertex array name; see [`FramebufferState::create`] for the
  /// meaning of the returned flag.
  ///
  /// [`FramebufferState::create`]: crate::state::FramebufferState::create
  pub unsafe fn create(&self, gl: &gl::Gl) -> (GLuint, bool) {
    let implementation = self.create_implementation;
    implementation(gl)
  }

  /// Bind `vertex_array`, skipping the driver call when the cache already
  /// agrees. Returns whether a driver call was issued.
  pub unsafe fn bind(&mut self, gl: &gl::Gl, vertex_array: GLuint) -> bool {
    if self.bound_vertex_array.is_invalid(&vertex_array) {
      let implementation = self.bind_implementation;
      implementation(gl, vertex_array);
      self.bound_vertex_array.set(vertex_array);
      true
    } else {
      false
    }
  }

  /// Unconditionally bind the zero vertex array.
  ///
  /// This is the barrier used around foreign GL code: before handing over so
  /// foreign code cannot scribble on the tracked object, and after taking
  /// back since the cache can no longer be trusted.
  pub unsafe fn unbind(&mut self, gl: &gl::Gl) {
    let implementation = self.bind_implementation;
    implementation(gl, 0);
    self.bound_vertex_array.set(0);
  }

  /// Number of generic vertex attributes. Queried once.
  pub unsafe fn max_vertex_attributes(&mut self, gl: &gl::Gl) -> GLint {
    if let Some(max) = self.max_vertex_attributes.get() {
      return max;
    }

    let mut max = 0;
    gl.GetIntegerv(gl::MAX_VERTEX_ATTRIBS, &mut max);
    self.max_vertex_attributes.set(max);
    max
  }

  /// Forget the cached binding; the selected implementations are untouched.
  pub fn reset(&mut self) {
    self.bound_vertex_array.invalidate();
  }

  pub(crate) unsafe fn destroy(&mut self, gl: &gl::Gl) {
    if self.scratch_vertex_array != 0 {
      gl.DeleteVertexArrays(1, &self.scratch_vertex_array);
      self.scratch_vertex_array = 0;
    }
  }
}

unsafe fn create_default(gl: &gl::Gl) -> (GLuint, bool) {
  let mut vertex_array = 0;
  gl.GenVertexArrays(1, &mut vertex_array);
  (vertex_array, false)
}

unsafe fn create_dsa(gl: &gl::Gl) -> (GLuint, bool) {
  let mut vertex_array = 0;
  gl.CreateVertexArrays(1, &mut vertex_array);
  (vertex_array, true)
}

unsafe fn create_apple(gl: &gl::Gl) -> (GLuint, bool) {
  let mut vertex_array = 0;
  gl.GenVertexArraysAPPLE(1, &mut vertex_array);
  (vertex_array, false)
}

// Vertex arrays are absent; client-side attribute setup applies and the zero
// name stands in for "no object".
unsafe fn create_unavailable(_: &gl::Gl) -> (GLuint, bool) {
  (0, false)
}

unsafe fn bind_default(gl: &gl::Gl, vertex_array: GLuint) {
  gl.BindVertexArray(vertex_array);
}

unsafe fn bind_apple(gl: &gl::Gl, vertex_array: GLuint) {
  gl.BindVertexArrayAPPLE(vertex_array);
}

unsafe fn bind_noop(_: &gl::Gl, _: GLuint) {}
