//! Transform feedback object dispatch and binding cache.

use crate::context::Capabilities;
use crate::extension::Extension;
use crate::gl;
use crate::gl::types::*;
use crate::state::Cached;
use crate::version::Version;

pub struct TransformFeedbackState {
  create_implementation: unsafe fn(&gl::Gl) -> (GLuint, bool),

  binding: Cached<GLuint>,
  has_transform_feedback: bool,
}

impl TransformFeedbackState {
  pub(crate) fn new(caps: &Capabilities) -> TransformFeedbackState {
    let version = caps.version();
    let dsa = caps.is_extension_supported(Extension::ArbDirectStateAccess);
    let has_transform_feedback = version >= Version::GL400
      || version >= Version::GLES300
      || caps.is_extension_supported(Extension::ArbTransformFeedback2);

    let create_implementation: unsafe fn(&gl::Gl) -> (GLuint, bool) =
      if !has_transform_feedback {
        create_unavailable
      } else if dsa {
        create_dsa
      } else {
        create_default
      };

    TransformFeedbackState {
      create_implementation,
      binding: Cached::unknown(),
      has_transform_feedback,
    }
  }

  /// Whether transform feedback objects exist on this context.
  pub fn has_transform_feedback(&self) -> bool {
    self.has_transform_feedback
  }

  /// Allocate a transform feedback name, or the zero name when the feature
  /// is absent; see [`FramebufferState::create`] for the returned flag.
  ///
  /// [`FramebufferState::create`]: crate::state::FramebufferState::create
  pub unsafe fn create(&self, gl: &gl::Gl) -> (GLuint, bool) {
    let implementation = self.create_implementation;
    implementation(gl)
  }

  /// Bind `transform_feedback`, skipping the driver call when the cache
  /// already agrees. Returns whether a driver call was issued. Callers must
  /// check [`has_transform_feedback`](Self::has_transform_feedback) first.
  pub unsafe fn bind(&mut self, gl: &gl::Gl, transform_feedback: GLuint) -> bool {
    if self.binding.is_invalid(&transform_feedback) {
      gl.BindTransformFeedback(gl::TRANSFORM_FEEDBACK, transform_feedback);
      self.binding.set(transform_feedback);
      true
    } else {
      false
    }
  }

  /// Forget the cached binding.
  pub fn reset(&mut self) {
    self.binding.invalidate();
  }
}

unsafe fn create_default(gl: &gl::Gl) -> (GLuint, bool) {
  let mut transform_feedback = 0;
  gl.GenTransformFeedbacks(1, &mut transform_feedback);
  (transform_feedback, false)
}

unsafe fn create_dsa(gl: &gl::Gl) -> (GLuint, bool) {
  let mut transform_feedback = 0;
  gl.CreateTransformFeedbacks(1, &mut transform_feedback);
  (transform_feedback, true)
}

unsafe fn create_unavailable(_: &gl::Gl) -> (GLuint, bool) {
  (0, false)
}
