//! Global renderer toggles: clear color, scissor, line width, robustness.

use crate::context::Capabilities;
use crate::extension::Extension;
use crate::gl;
use crate::gl::types::*;
use crate::state::Cached;
use crate::version::Version;

pub struct RendererState {
  graphics_reset_status_implementation: unsafe fn(&gl::Gl) -> GLenum,

  clear_color: Cached<[GLfloat; 4]>,
  line_width: Cached<GLfloat>,
  scissor: Cached<[GLint; 4]>,
}

impl RendererState {
  pub(crate) fn new(caps: &Capabilities) -> RendererState {
    let version = caps.version();

    let graphics_reset_status_implementation: unsafe fn(&gl::Gl) -> GLenum = if version
      >= Version::GL450
      || version >= Version::GLES320
      || caps.is_extension_supported(Extension::KhrRobustness)
    {
      graphics_reset_status_default
    } else if caps.is_extension_supported(Extension::ArbRobustness) {
      graphics_reset_status_arb
    } else {
      // Without robustness the context can never report a reset.
      graphics_reset_status_noop
    };

    RendererState {
      graphics_reset_status_implementation,
      clear_color: Cached::unknown(),
      line_width: Cached::unknown(),
      scissor: Cached::unknown(),
    }
  }

  /// Set the clear color, skipping the driver call when unchanged.
  pub unsafe fn set_clear_color(&mut self, gl: &gl::Gl, clear_color: [GLfloat; 4]) -> bool {
    if self.clear_color.is_invalid(&clear_color) {
      gl.ClearColor(
        clear_color[0],
        clear_color[1],
        clear_color[2],
        clear_color[3],
      );
      self.clear_color.set(clear_color);
      true
    } else {
      false
    }
  }

  /// Set the line width, skipping the driver call when unchanged.
  pub unsafe fn set_line_width(&mut self, gl: &gl::Gl, width: GLfloat) -> bool {
    if self.line_width.is_invalid(&width) {
      gl.LineWidth(width);
      self.line_width.set(width);
      true
    } else {
      false
    }
  }

  /// Set the scissor rectangle, skipping the driver call when unchanged.
  pub unsafe fn set_scissor(&mut self, gl: &gl::Gl, scissor: [GLint; 4]) -> bool {
    if self.scissor.is_invalid(&scissor) {
      gl.Scissor(scissor[0], scissor[1], scissor[2], scissor[3]);
      self.scissor.set(scissor);
      true
    } else {
      false
    }
  }

  /// Whether the context experienced a graphics reset. Always `NO_ERROR` on
  /// contexts without a robustness path.
  pub unsafe fn graphics_reset_status(&self, gl: &gl::Gl) -> GLenum {
    let implementation = self.graphics_reset_status_implementation;
    implementation(gl)
  }

  /// Forget the cached toggles; implementations are untouched.
  pub fn reset(&mut self) {
    self.clear_color.invalidate();
    self.line_width.invalidate();
    self.scissor.invalidate();
  }
}

unsafe fn graphics_reset_status_default(gl: &gl::Gl) -> GLenum {
  gl.GetGraphicsResetStatus()
}

unsafe fn graphics_reset_status_arb(gl: &gl::Gl) -> GLenum {
  gl.GetGraphicsResetStatusARB()
}

unsafe fn graphics_reset_status_noop(_: &gl::Gl) -> GLenum {
  gl::NO_ERROR
}
