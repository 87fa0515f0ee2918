//! Texture dispatch, unit tracking and binding cache.

use crate::context::Capabilities;
use crate::extension::Extension;
use crate::gl;
use crate::gl::types::*;
use crate::state::Cached;
use crate::version::Version;

pub struct TextureState {
  create_implementation: unsafe fn(&gl::Gl, GLenum) -> (GLuint, bool),
  bind_implementation: unsafe fn(&mut TextureState, &gl::Gl, u32, GLenum, GLuint),

  active_unit: Cached<u32>,
  // One slot per texture unit, keyed (target, name); grown on demand past
  // the platform minimum.
  bindings: Vec<Cached<(GLenum, GLuint)>>,

  max_units: Cached<GLint>,
  max_size: Cached<GLint>,
  max_anisotropy: Cached<GLfloat>,
  has_anisotropy: bool,
}

impl TextureState {
  pub(crate) fn new(caps: &Capabilities) -> TextureState {
    let dsa = caps.is_extension_supported(Extension::ArbDirectStateAccess);
    let has_anisotropy = caps.version() >= Version::GL460
      || caps.is_extension_supported(Extension::ArbTextureFilterAnisotropic)
      || caps.is_extension_supported(Extension::ExtTextureFilterAnisotropic);

    let create_implementation: unsafe fn(&gl::Gl, GLenum) -> (GLuint, bool) =
      if dsa { create_dsa } else { create_default };

    let bind_implementation: unsafe fn(&mut TextureState, &gl::Gl, u32, GLenum, GLuint) =
      if dsa { bind_dsa } else { bind_default };

    TextureState {
      create_implementation,
      bind_implementation,
      active_unit: Cached::unknown(),
      bindings: Vec::new(),
      max_units: Cached::unknown(),
      max_size: Cached::unknown(),
      max_anisotropy: Cached::unknown(),
      has_anisotropy,
    }
  }

  /// Allocate a texture name for `target`; see [`FramebufferState::create`]
  /// for the meaning of the returned flag.
  ///
  /// [`FramebufferState::create`]: crate::state::FramebufferState::create
  pub unsafe fn create(&self, gl: &gl::Gl, target: GLenum) -> (GLuint, bool) {
    let implementation = self.create_implementation;
    implementation(gl, target)
  }

  /// Switch the active texture unit, skipping the driver call when the cache
  /// already agrees.
  pub unsafe fn set_active_unit(&mut self, gl: &gl::Gl, unit: u32) -> bool {
    if self.active_unit.is_invalid(&unit) {
      gl.ActiveTexture(gl::TEXTURE0 + unit);
      self.active_unit.set(unit);
      true
    } else {
      false
    }
  }

  /// Bind `texture` to `target` on `unit`, skipping the driver call when the
  /// cache already agrees. Returns whether a driver call was issued.
  pub unsafe fn bind(
    &mut self,
    gl: &gl::Gl,
    unit: u32,
    target: GLenum,
    texture: GLuint,
  ) -> bool {
    let slot_index = unit as usize;

    if self.bindings.len() <= slot_index {
      // not enough registered texture units; let's grow a bit more
      self.bindings.resize(slot_index + 1, Cached::unknown());
    }

    if !self.bindings[slot_index].is_invalid(&(target, texture)) {
      return false;
    }

    let implementation = self.bind_implementation;
    implementation(self, gl, unit, target, texture);
    self.bindings[slot_index].set((target, texture));
    true
  }

  /// Note that `texture` was deleted; slots still naming it flip to the
  /// unbound state without a driver call.
  pub fn forget(&mut self, texture: GLuint) {
    for slot in &mut self.bindings {
      if let Some((target, bound)) = slot.get() {
        if bound == texture {
          slot.set((target, 0));
        }
      }
    }
  }

  /// Number of combined texture units. Queried once.
  pub unsafe fn max_units(&mut self, gl: &gl::Gl) -> GLint {
    if let Some(max) = self.max_units.get() {
      return max;
    }

    let mut max = 0;
    gl.GetIntegerv(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS, &mut max);
    self.max_units.set(max);
    max
  }

  /// Largest texture dimension. Queried once.
  pub unsafe fn max_size(&mut self, gl: &gl::Gl) -> GLint {
    if let Some(max) = self.max_size.get() {
      return max;
    }

    let mut max = 0;
    gl.GetIntegerv(gl::MAX_TEXTURE_SIZE, &mut max);
    self.max_size.set(max);
    max
  }

  /// Largest anisotropic filtering factor, or 0 when the extension is
  /// absent; in that case no driver query is ever made.
  pub unsafe fn max_anisotropy(&mut self, gl: &gl::Gl) -> GLfloat {
    if !self.has_anisotropy {
      return 0.0;
    }

    if let Some(max) = self.max_anisotropy.get() {
      return max;
    }

    let mut max = 0.0;
    gl.GetFloatv(gl::MAX_TEXTURE_MAX_ANISOTROPY_EXT, &mut max);
    self.max_anisotropy.set(max);
    max
  }

  /// Forget the active unit and every cached binding.
  pub fn reset(&mut self) {
    self.active_unit.invalidate();

    for slot in &mut self.bindings {
      slot.invalidate();
    }
  }
}

unsafe fn create_default(gl: &gl::Gl, _: GLenum) -> (GLuint, bool) {
  let mut texture = 0;
  gl.GenTextures(1, &mut texture);
  (texture, false)
}

unsafe fn create_dsa(gl: &gl::Gl, target: GLenum) -> (GLuint, bool) {
  let mut texture = 0;
  gl.CreateTextures(target, 1, &mut texture);
  (texture, true)
}

unsafe fn bind_default(
  state: &mut TextureState,
  gl: &gl::Gl,
  unit: u32,
  target: GLenum,
  texture: GLuint,
) {
  state.set_active_unit(gl, unit);
  gl.BindTexture(target, texture);
}

unsafe fn bind_dsa(_: &mut TextureState, gl: &gl::Gl, unit: u32, _: GLenum, texture: GLuint) {
  gl.BindTextureUnit(unit, texture);
}
