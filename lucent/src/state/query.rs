//! Query object dispatch.
//!
//! Queries are begin/end scoped rather than bound, so there is nothing worth
//! caching here; the block only carries dispatch.

use crate::context::Capabilities;
use crate::extension::Extension;
use crate::gl;
use crate::gl::types::*;
use crate::version::Version;

pub struct QueryState {
  create_implementation: unsafe fn(&gl::Gl, GLenum) -> (GLuint, bool),
  query_counter_implementation: unsafe fn(&gl::Gl, GLuint),
}

impl QueryState {
  pub(crate) fn new(caps: &Capabilities) -> QueryState {
    let version = caps.version();
    let dsa = caps.is_extension_supported(Extension::ArbDirectStateAccess);
    let timer = version >= Version::GL330
      || caps.is_extension_supported(Extension::ArbTimerQuery)
      || caps.is_extension_supported(Extension::ExtDisjointTimerQuery);

    let create_implementation: unsafe fn(&gl::Gl, GLenum) -> (GLuint, bool) =
      if dsa { create_dsa } else { create_default };

    let query_counter_implementation: unsafe fn(&gl::Gl, GLuint) =
      if timer { query_counter_default } else { query_counter_noop };

    QueryState {
      create_implementation,
      query_counter_implementation,
    }
  }

  /// Allocate a query name for `target`; see [`FramebufferState::create`]
  /// for the meaning of the returned flag.
  ///
  /// [`FramebufferState::create`]: crate::state::FramebufferState::create
  pub unsafe fn create(&self, gl: &gl::Gl, target: GLenum) -> (GLuint, bool) {
    let implementation = self.create_implementation;
    implementation(gl, target)
  }

  /// Record the GPU timestamp into `query`. No-op without timer queries.
  pub unsafe fn timestamp(&self, gl: &gl::Gl, query: GLuint) {
    let implementation = self.query_counter_implementation;
    implementation(gl, query)
  }
}

unsafe fn create_default(gl: &gl::Gl, _: GLenum) -> (GLuint, bool) {
  let mut query = 0;
  gl.GenQueries(1, &mut query);
  (query, false)
}

unsafe fn create_dsa(gl: &gl::Gl, target: GLenum) -> (GLuint, bool) {
  let mut query = 0;
  gl.CreateQueries(target, 1, &mut query);
  (query, true)
}

unsafe fn query_counter_default(gl: &gl::Gl, query: GLuint) {
  gl.QueryCounter(query, gl::TIMESTAMP);
}

unsafe fn query_counter_noop(_: &gl::Gl, _: GLuint) {}
