//! Framebuffer dispatch and binding cache.
//!
//! Framebuffers have the richest dispatch surface of all domains: allocation
//! and status checks exist as bound-object, ARB-DSA and EXT-DSA variants,
//! binding exists as a core and an EXT entry point, and blitting may be
//! entirely absent. The viewport rectangle also lives here since it follows
//! the draw framebuffer around.

use crate::context::Capabilities;
use crate::extension::Extension;
use crate::gl;
use crate::gl::types::*;
use crate::state::Cached;
use crate::version::{Api, Version};

/// Framebuffer bind points.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FramebufferTarget {
  /// Target of draw commands.
  Draw,
  /// Target of read-back commands.
  Read,
  /// Both at once.
  Both,
}

impl FramebufferTarget {
  fn gl_enum(self) -> GLenum {
    match self {
      FramebufferTarget::Draw => gl::DRAW_FRAMEBUFFER,
      FramebufferTarget::Read => gl::READ_FRAMEBUFFER,
      FramebufferTarget::Both => gl::FRAMEBUFFER,
    }
  }
}

pub struct FramebufferState {
  create_implementation: unsafe fn(&gl::Gl) -> (GLuint, bool),
  bind_implementation: unsafe fn(&mut FramebufferState, &gl::Gl, FramebufferTarget, GLuint),
  check_status_implementation:
    unsafe fn(&mut FramebufferState, &gl::Gl, GLuint, FramebufferTarget) -> GLenum,
  blit_implementation: Option<unsafe fn(&gl::Gl, [GLint; 4], [GLint; 4], GLbitfield, GLenum)>,
  invalidate_implementation: unsafe fn(&gl::Gl, GLenum, &[GLenum]),

  bound_draw: Cached<GLuint>,
  bound_read: Cached<GLuint>,
  viewport: Cached<[GLint; 4]>,

  max_viewport_dims: Cached<[GLint; 2]>,
  max_draw_buffers: Cached<GLint>,
  max_color_attachments: Cached<GLint>,
  has_framebuffers: bool,
  has_draw_buffers: bool,
}

impl FramebufferState {
  pub(crate) fn new(caps: &Capabilities) -> FramebufferState {
    let version = caps.version();
    let dsa = caps.is_extension_supported(Extension::ArbDirectStateAccess);
    let ext_dsa = caps.is_extension_supported(Extension::ExtDirectStateAccess);
    let core_fbo = version >= Version::GL300
      || version.is_es()
      || caps.is_extension_supported(Extension::ArbFramebufferObject);
    let ext_fbo = caps.is_extension_supported(Extension::ExtFramebufferObject);
    // Draw and read bind points only split once a blit path exists; before
    // that there is a single FRAMEBUFFER bind point covering both roles.
    let separate_targets = match version.api() {
      Api::Gl => core_fbo || caps.is_extension_supported(Extension::ExtFramebufferBlit),
      Api::Gles => {
        version >= Version::GLES300
          || caps.is_extension_supported(Extension::AngleFramebufferBlit)
          || caps.is_extension_supported(Extension::NvFramebufferBlit)
      }
    };

    let create_implementation: unsafe fn(&gl::Gl) -> (GLuint, bool) = if dsa {
      create_dsa
    } else if core_fbo {
      create_default
    } else {
      create_ext
    };

    let bind_implementation: unsafe fn(&mut FramebufferState, &gl::Gl, FramebufferTarget, GLuint) =
      match (core_fbo, separate_targets) {
        (true, true) => bind_default,
        (true, false) => bind_single,
        (false, true) => bind_ext,
        (false, false) => bind_ext_single,
      };

    let check_status_implementation: unsafe fn(
      &mut FramebufferState,
      &gl::Gl,
      GLuint,
      FramebufferTarget,
    ) -> GLenum = if dsa {
      check_status_dsa
    } else if ext_dsa {
      check_status_ext_dsa
    } else if core_fbo && separate_targets {
      check_status_default
    } else if core_fbo {
      check_status_single
    } else {
      check_status_ext
    };

    let blit_implementation: Option<
      unsafe fn(&gl::Gl, [GLint; 4], [GLint; 4], GLbitfield, GLenum),
    > = if version >= Version::GL300
      || version >= Version::GLES300
      || caps.is_extension_supported(Extension::ArbFramebufferObject)
    {
      Some(blit_default as unsafe fn(&gl::Gl, [GLint; 4], [GLint; 4], GLbitfield, GLenum))
    } else if caps.is_extension_supported(Extension::ExtFramebufferBlit) {
      Some(blit_ext)
    } else {
      None
    };

    let invalidate_implementation: unsafe fn(&gl::Gl, GLenum, &[GLenum]) = if version
      >= Version::GL430
      || version >= Version::GLES300
      || caps.is_extension_supported(Extension::ArbInvalidateSubdata)
    {
      invalidate_default
    } else {
      // No invalidation entry point anywhere: a documented no-op, the
      // operation is a hint.
      invalidate_noop
    };

    FramebufferState {
      create_implementation,
      bind_implementation,
      check_status_implementation,
      blit_implementation,
      invalidate_implementation,
      bound_draw: Cached::unknown(),
      bound_read: Cached::unknown(),
      viewport: Cached::unknown(),
      max_viewport_dims: Cached::unknown(),
      max_draw_buffers: Cached::unknown(),
      max_color_attachments: Cached::unknown(),
      has_framebuffers: core_fbo || ext_fbo,
      has_draw_buffers: !version.is_es() || version >= Version::GLES300,
    }
  }

  /// Whether framebuffer objects exist at all on this context.
  pub fn has_framebuffers(&self) -> bool {
    self.has_framebuffers
  }

  /// Allocate a framebuffer name through the fastest supported path.
  ///
  /// Returns the name and whether the driver has realized the object yet;
  /// Gen-style names only come into existence at their first bind, so some
  /// entry points cannot take them until then.
  pub unsafe fn create(&self, gl: &gl::Gl) -> (GLuint, bool) {
    let implementation = self.create_implementation;
    implementation(gl)
  }

  /// Bind `framebuffer` to `target`, skipping the driver call when the cache
  /// already agrees.
  ///
  /// Returns whether a driver call was issued; `true` also means a deferred
  /// object is realized from now on.
  pub unsafe fn bind(
    &mut self,
    gl: &gl::Gl,
    target: FramebufferTarget,
    framebuffer: GLuint,
  ) -> bool {
    let stale = match target {
      FramebufferTarget::Draw => self.bound_draw.is_invalid(&framebuffer),
      FramebufferTarget::Read => self.bound_read.is_invalid(&framebuffer),
      FramebufferTarget::Both => {
        self.bound_draw.is_invalid(&framebuffer) || self.bound_read.is_invalid(&framebuffer)
      }
    };

    if !stale {
      return false;
    }

    let implementation = self.bind_implementation;
    implementation(self, gl, target, framebuffer);
    true
  }

  /// Completeness status of `framebuffer`, through the fastest path that can
  /// answer without disturbing more state than necessary.
  pub unsafe fn check_status(
    &mut self,
    gl: &gl::Gl,
    framebuffer: GLuint,
    target: FramebufferTarget,
  ) -> GLenum {
    let implementation = self.check_status_implementation;
    implementation(self, gl, framebuffer, target)
  }

  /// Whether [`blit`](Self::blit) may be called on this context.
  pub fn can_blit(&self) -> bool {
    self.blit_implementation.is_some()
  }

  /// Blit between the currently bound read and draw framebuffers.
  ///
  /// Calling this without [`can_blit`](Self::can_blit) is a programming
  /// error.
  pub unsafe fn blit(
    &mut self,
    gl: &gl::Gl,
    src: [GLint; 4],
    dst: [GLint; 4],
    mask: GLbitfield,
    filter: GLenum,
  ) {
    match self.blit_implementation {
      Some(implementation) => implementation(gl, src, dst, mask, filter),
      None => panic!("framebuffer blit invoked on a context without blit support"),
    }
  }

  /// Hint that the given attachments of `target` need not be preserved.
  pub unsafe fn invalidate(&mut self, gl: &gl::Gl, target: FramebufferTarget, attachments: &[GLenum]) {
    let implementation = self.invalidate_implementation;
    implementation(gl, target.gl_enum(), attachments)
  }

  /// Set the viewport rectangle, skipping the driver call when unchanged.
  pub unsafe fn set_viewport(&mut self, gl: &gl::Gl, viewport: [GLint; 4]) -> bool {
    if self.viewport.is_invalid(&viewport) {
      gl.Viewport(viewport[0], viewport[1], viewport[2], viewport[3]);
      self.viewport.set(viewport);
      true
    } else {
      false
    }
  }

  /// Largest viewport the implementation accepts. Queried once.
  pub unsafe fn max_viewport_dims(&mut self, gl: &gl::Gl) -> [GLint; 2] {
    if let Some(dims) = self.max_viewport_dims.get() {
      return dims;
    }

    let mut dims = [0; 2];
    gl.GetIntegerv(gl::MAX_VIEWPORT_DIMS, dims.as_mut_ptr());
    self.max_viewport_dims.set(dims);
    dims
  }

  /// Number of simultaneous draw buffers, or 0 when the context has none.
  pub unsafe fn max_draw_buffers(&mut self, gl: &gl::Gl) -> GLint {
    if !self.has_draw_buffers {
      return 0;
    }

    if let Some(max) = self.max_draw_buffers.get() {
      return max;
    }

    let mut max = 0;
    gl.GetIntegerv(gl::MAX_DRAW_BUFFERS, &mut max);
    self.max_draw_buffers.set(max);
    max
  }

  /// Number of color attachment points, or 0 without framebuffer support.
  pub unsafe fn max_color_attachments(&mut self, gl: &gl::Gl) -> GLint {
    if !self.has_framebuffers {
      return 0;
    }

    if let Some(max) = self.max_color_attachments.get() {
      return max;
    }

    let mut max = 0;
    gl.GetIntegerv(gl::MAX_COLOR_ATTACHMENTS, &mut max);
    self.max_color_attachments.set(max);
    max
  }

  /// Forget the cached bindings and viewport; the next calls are forced
  /// through to the driver. Selected implementations are untouched.
  pub fn reset(&mut self) {
    self.bound_draw.invalidate();
    self.bound_read.invalidate();
    self.viewport.invalidate();
  }
}

unsafe fn create_default(gl: &gl::Gl) -> (GLuint, bool) {
  let mut framebuffer = 0;
  gl.GenFramebuffers(1, &mut framebuffer);
  (framebuffer, false)
}

unsafe fn create_dsa(gl: &gl::Gl) -> (GLuint, bool) {
  let mut framebuffer = 0;
  gl.CreateFramebuffers(1, &mut framebuffer);
  (framebuffer, true)
}

unsafe fn create_ext(gl: &gl::Gl) -> (GLuint, bool) {
  let mut framebuffer = 0;
  gl.GenFramebuffersEXT(1, &mut framebuffer);
  (framebuffer, false)
}

unsafe fn bind_default(
  state: &mut FramebufferState,
  gl: &gl::Gl,
  target: FramebufferTarget,
  framebuffer: GLuint,
) {
  gl.BindFramebuffer(target.gl_enum(), framebuffer);
  note_bound(state, target, framebuffer);
}

unsafe fn bind_single(
  state: &mut FramebufferState,
  gl: &gl::Gl,
  _: FramebufferTarget,
  framebuffer: GLuint,
) {
  gl.BindFramebuffer(gl::FRAMEBUFFER, framebuffer);
  note_bound(state, FramebufferTarget::Both, framebuffer);
}

unsafe fn bind_ext(
  state: &mut FramebufferState,
  gl: &gl::Gl,
  target: FramebufferTarget,
  framebuffer: GLuint,
) {
  gl.BindFramebufferEXT(target.gl_enum(), framebuffer);
  note_bound(state, target, framebuffer);
}

unsafe fn bind_ext_single(
  state: &mut FramebufferState,
  gl: &gl::Gl,
  _: FramebufferTarget,
  framebuffer: GLuint,
) {
  // Without a blit extension there is one bind point covering both roles.
  gl.BindFramebufferEXT(gl::FRAMEBUFFER, framebuffer);
  note_bound(state, FramebufferTarget::Both, framebuffer);
}

fn note_bound(state: &mut FramebufferState, target: FramebufferTarget, framebuffer: GLuint) {
  match target {
    FramebufferTarget::Draw => state.bound_draw.set(framebuffer),
    FramebufferTarget::Read => state.bound_read.set(framebuffer),
    FramebufferTarget::Both => {
      state.bound_draw.set(framebuffer);
      state.bound_read.set(framebuffer);
    }
  }
}

unsafe fn check_status_default(
  state: &mut FramebufferState,
  gl: &gl::Gl,
  framebuffer: GLuint,
  target: FramebufferTarget,
) -> GLenum {
  state.bind(gl, target, framebuffer);
  gl.CheckFramebufferStatus(target.gl_enum())
}

unsafe fn check_status_single(
  state: &mut FramebufferState,
  gl: &gl::Gl,
  framebuffer: GLuint,
  _: FramebufferTarget,
) -> GLenum {
  state.bind(gl, FramebufferTarget::Both, framebuffer);
  gl.CheckFramebufferStatus(gl::FRAMEBUFFER)
}

unsafe fn check_status_ext(
  state: &mut FramebufferState,
  gl: &gl::Gl,
  framebuffer: GLuint,
  _: FramebufferTarget,
) -> GLenum {
  state.bind(gl, FramebufferTarget::Both, framebuffer);
  gl.CheckFramebufferStatusEXT(gl::FRAMEBUFFER)
}

unsafe fn check_status_dsa(
  _: &mut FramebufferState,
  gl: &gl::Gl,
  framebuffer: GLuint,
  target: FramebufferTarget,
) -> GLenum {
  gl.CheckNamedFramebufferStatus(framebuffer, target.gl_enum())
}

unsafe fn check_status_ext_dsa(
  _: &mut FramebufferState,
  gl: &gl::Gl,
  framebuffer: GLuint,
  target: FramebufferTarget,
) -> GLenum {
  gl.CheckNamedFramebufferStatusEXT(framebuffer, target.gl_enum())
}

unsafe fn blit_default(
  gl: &gl::Gl,
  src: [GLint; 4],
  dst: [GLint; 4],
  mask: GLbitfield,
  filter: GLenum,
) {
  gl.BlitFramebuffer(
    src[0], src[1], src[2], src[3], dst[0], dst[1], dst[2], dst[3], mask, filter,
  );
}

unsafe fn blit_ext(
  gl: &gl::Gl,
  src: [GLint; 4],
  dst: [GLint; 4],
  mask: GLbitfield,
  filter: GLenum,
) {
  gl.BlitFramebufferEXT(
    src[0], src[1], src[2], src[3], dst[0], dst[1], dst[2], dst[3], mask, filter,
  );
}

unsafe fn invalidate_default(gl: &gl::Gl, target: GLenum, attachments: &[GLenum]) {
  gl.InvalidateFramebuffer(target, attachments.len() as GLsizei, attachments.as_ptr());
}

unsafe fn invalidate_noop(_: &gl::Gl, _: GLenum, _: &[GLenum]) {}
