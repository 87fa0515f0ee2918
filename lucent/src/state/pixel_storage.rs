//! Pixel pack/unpack alignment cache.

use crate::gl;
use crate::gl::types::*;
use crate::state::Cached;

pub struct PixelStorageState {
  pack_alignment: Cached<GLint>,
  unpack_alignment: Cached<GLint>,
}

impl PixelStorageState {
  pub(crate) fn new() -> PixelStorageState {
    PixelStorageState {
      pack_alignment: Cached::unknown(),
      unpack_alignment: Cached::unknown(),
    }
  }

  /// Set the read-back row alignment, skipping the driver call when
  /// unchanged.
  pub unsafe fn set_pack_alignment(&mut self, gl: &gl::Gl, alignment: GLint) -> bool {
    if self.pack_alignment.is_invalid(&alignment) {
      gl.PixelStorei(gl::PACK_ALIGNMENT, alignment);
      self.pack_alignment.set(alignment);
      true
    } else {
      false
    }
  }

  /// Set the upload row alignment, skipping the driver call when unchanged.
  pub unsafe fn set_unpack_alignment(&mut self, gl: &gl::Gl, alignment: GLint) -> bool {
    if self.unpack_alignment.is_invalid(&alignment) {
      gl.PixelStorei(gl::UNPACK_ALIGNMENT, alignment);
      self.unpack_alignment.set(alignment);
      true
    } else {
      false
    }
  }

  /// Forget the cached alignments.
  pub fn reset(&mut self) {
    self.pack_alignment.invalidate();
    self.unpack_alignment.invalidate();
  }
}
