//! Debug annotation dispatch: object labels and stream markers.
//!
//! Purely diagnostic, so every operation degrades to a no-op instead of
//! gating callers behind a predicate.

use std::os::raw::c_void;

use crate::context::Capabilities;
use crate::extension::Extension;
use crate::gl;
use crate::gl::types::*;
use crate::state::Cached;
use crate::version::Version;

pub struct DebugState {
  label_implementation: unsafe fn(&gl::Gl, GLenum, GLuint, &str),
  message_insert_implementation: unsafe fn(&gl::Gl, &str),

  max_label_length: Cached<GLint>,
  has_debug: bool,
}

impl DebugState {
  pub(crate) fn new(caps: &Capabilities) -> DebugState {
    let version = caps.version();
    let khr = version >= Version::GL430
      || version >= Version::GLES320
      || caps.is_extension_supported(Extension::KhrDebug);

    let label_implementation: unsafe fn(&gl::Gl, GLenum, GLuint, &str) = if khr {
      label_khr
    } else if caps.is_extension_supported(Extension::ExtDebugLabel) {
      label_ext
    } else {
      label_noop
    };

    let message_insert_implementation: unsafe fn(&gl::Gl, &str) = if khr {
      message_insert_khr
    } else if caps.is_extension_supported(Extension::ExtDebugMarker) {
      message_insert_ext
    } else if caps.is_extension_supported(Extension::GremedyStringMarker) {
      message_insert_gremedy
    } else {
      message_insert_noop
    };

    DebugState {
      label_implementation,
      message_insert_implementation,
      max_label_length: Cached::unknown(),
      has_debug: khr,
    }
  }

  /// Attach a human-readable label to the object `name` of kind
  /// `identifier` (e.g. [`gl::BUFFER`], [`gl::TEXTURE`]).
  pub unsafe fn label(&self, gl: &gl::Gl, identifier: GLenum, name: GLuint, label: &str) {
    let implementation = self.label_implementation;
    implementation(gl, identifier, name, label)
  }

  /// Drop a marker string into the command stream for capture tools.
  pub unsafe fn insert_message(&self, gl: &gl::Gl, message: &str) {
    let implementation = self.message_insert_implementation;
    implementation(gl, message)
  }

  /// Longest label the implementation stores, or 0 without debug support; in
  /// that case no driver query is ever made.
  pub unsafe fn max_label_length(&mut self, gl: &gl::Gl) -> GLint {
    if !self.has_debug {
      return 0;
    }

    if let Some(max) = self.max_label_length.get() {
      return max;
    }

    let mut max = 0;
    gl.GetIntegerv(gl::MAX_LABEL_LENGTH, &mut max);
    self.max_label_length.set(max);
    max
  }
}

unsafe fn label_khr(gl: &gl::Gl, identifier: GLenum, name: GLuint, label: &str) {
  gl.ObjectLabel(
    identifier,
    name,
    label.len() as GLsizei,
    label.as_ptr() as *const GLchar,
  );
}

unsafe fn label_ext(gl: &gl::Gl, identifier: GLenum, name: GLuint, label: &str) {
  gl.LabelObjectEXT(
    identifier,
    name,
    label.len() as GLsizei,
    label.as_ptr() as *const GLchar,
  );
}

unsafe fn label_noop(_: &gl::Gl, _: GLenum, _: GLuint, _: &str) {}

unsafe fn message_insert_khr(gl: &gl::Gl, message: &str) {
  gl.DebugMessageInsert(
    gl::DEBUG_SOURCE_APPLICATION,
    gl::DEBUG_TYPE_MARKER,
    0,
    gl::DEBUG_SEVERITY_NOTIFICATION,
    message.len() as GLsizei,
    message.as_ptr() as *const GLchar,
  );
}

unsafe fn message_insert_ext(gl: &gl::Gl, message: &str) {
  gl.InsertEventMarkerEXT(message.len() as GLsizei, message.as_ptr() as *const GLchar);
}

unsafe fn message_insert_gremedy(gl: &gl::Gl, message: &str) {
  gl.StringMarkerGREMEDY(message.len() as GLsizei, message.as_ptr() as *const c_void);
}

unsafe fn message_insert_noop(_: &gl::Gl, _: &str) {}
