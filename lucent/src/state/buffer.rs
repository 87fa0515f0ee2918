//! Buffer dispatch and binding cache.

use crate::context::Capabilities;
use crate::extension::Extension;
use crate::gl;
use crate::gl::types::*;
use crate::state::Cached;
use crate::version::Version;

/// Buffer bind targets tracked by the cache.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BufferTarget {
  Array,
  CopyRead,
  CopyWrite,
  ElementArray,
  PixelPack,
  PixelUnpack,
  TransformFeedback,
  Uniform,
}

impl BufferTarget {
  const COUNT: usize = 8;

  fn index(self) -> usize {
    self as usize
  }

  fn gl_enum(self) -> GLenum {
    match self {
      BufferTarget::Array => gl::ARRAY_BUFFER,
      BufferTarget::CopyRead => gl::COPY_READ_BUFFER,
      BufferTarget::CopyWrite => gl::COPY_WRITE_BUFFER,
      BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
      BufferTarget::PixelPack => gl::PIXEL_PACK_BUFFER,
      BufferTarget::PixelUnpack => gl::PIXEL_UNPACK_BUFFER,
      BufferTarget::TransformFeedback => gl::TRANSFORM_FEEDBACK_BUFFER,
      BufferTarget::Uniform => gl::UNIFORM_BUFFER,
    }
  }
}

pub struct BufferState {
  create_implementation: unsafe fn(&gl::Gl) -> (GLuint, bool),

  bindings: [Cached<GLuint>; BufferTarget::COUNT],
  // Indexed uniform bindings; grown on demand, the platform minimum is more
  // than most programs ever touch.
  uniform_bindings: Vec<Cached<GLuint>>,

  uniform_offset_alignment: Cached<GLint>,
  max_uniform_bindings: Cached<GLint>,
  has_uniform_buffers: bool,
}

impl BufferState {
  pub(crate) fn new(caps: &Capabilities) -> BufferState {
    let version = caps.version();
    let dsa = caps.is_extension_supported(Extension::ArbDirectStateAccess);
    let has_uniform_buffers = version >= Version::GL310
      || version >= Version::GLES300
      || caps.is_extension_supported(Extension::ArbUniformBufferObject);

    let create_implementation: unsafe fn(&gl::Gl) -> (GLuint, bool) =
      if dsa { create_dsa } else { create_default };

    BufferState {
      create_implementation,
      bindings: [Cached::unknown(); BufferTarget::COUNT],
      uniform_bindings: Vec::new(),
      uniform_offset_alignment: Cached::unknown(),
      max_uniform_bindings: Cached::unknown(),
      has_uniform_buffers,
    }
  }

  /// Whether indexed uniform buffer bindings exist on this context.
  pub fn has_uniform_buffers(&self) -> bool {
    self.has_uniform_buffers
  }

  /// Allocate a buffer name; see [`FramebufferState::create`] for the
  /// meaning of the returned flag.
  ///
  /// [`FramebufferState::create`]: crate::state::FramebufferState::create
  pub unsafe fn create(&self, gl: &gl::Gl) -> (GLuint, bool) {
    let implementation = self.create_implementation;
    implementation(gl)
  }

  /// Bind `buffer` to `target`, skipping the driver call when the cache
  /// already agrees. Returns whether a driver call was issued.
  pub unsafe fn bind(&mut self, gl: &gl::Gl, target: BufferTarget, buffer: GLuint) -> bool {
    let slot = &mut self.bindings[target.index()];

    if slot.is_invalid(&buffer) {
      gl.BindBuffer(target.gl_enum(), buffer);
      slot.set(buffer);
      true
    } else {
      false
    }
  }

  /// Bind `buffer` to the indexed uniform binding point `index`.
  pub unsafe fn bind_base(&mut self, gl: &gl::Gl, index: u32, buffer: GLuint) -> bool {
    let slot_index = index as usize;

    if self.uniform_bindings.len() <= slot_index {
      // not enough registered buffer bindings; let's grow a bit more
      self.uniform_bindings.resize(slot_index + 1, Cached::unknown());
    }

    if self.uniform_bindings[slot_index].is_invalid(&buffer) {
      gl.BindBufferBase(gl::UNIFORM_BUFFER, index, buffer);
      self.uniform_bindings[slot_index].set(buffer);
      // Indexed binds also reset the generic bind point.
      self.bindings[BufferTarget::Uniform.index()].set(buffer);
      true
    } else {
      false
    }
  }

  /// Note that `buffer` was deleted: slots still naming it flip to the
  /// unbound state without a driver call, since deletion already unbinds
  /// driver-side.
  pub fn forget(&mut self, buffer: GLuint) {
    for slot in &mut self.bindings {
      if slot.get() == Some(buffer) {
        slot.set(0);
      }
    }

    for slot in &mut self.uniform_bindings {
      if slot.get() == Some(buffer) {
        slot.set(0);
      }
    }
  }

  /// Required alignment of indexed uniform binding offsets; 0 when uniform
  /// buffers are unavailable. Queried once.
  pub unsafe fn uniform_offset_alignment(&mut self, gl: &gl::Gl) -> GLint {
    if !self.has_uniform_buffers {
      return 0;
    }

    if let Some(alignment) = self.uniform_offset_alignment.get() {
      return alignment;
    }

    let mut alignment = 0;
    gl.GetIntegerv(gl::UNIFORM_BUFFER_OFFSET_ALIGNMENT, &mut alignment);
    self.uniform_offset_alignment.set(alignment);
    alignment
  }

  /// Number of indexed uniform binding points; 0 when unavailable.
  pub unsafe fn max_uniform_bindings(&mut self, gl: &gl::Gl) -> GLint {
    if !self.has_uniform_buffers {
      return 0;
    }

    if let Some(max) = self.max_uniform_bindings.get() {
      return max;
    }

    let mut max = 0;
    gl.GetIntegerv(gl::MAX_UNIFORM_BUFFER_BINDINGS, &mut max);
    self.max_uniform_bindings.set(max);
    max
  }

  /// Forget every cached binding; implementations are untouched.
  pub fn reset(&mut self) {
    for slot in &mut self.bindings {
      slot.invalidate();
    }

    for slot in &mut self.uniform_bindings {
      slot.invalidate();
    }
  }
}

unsafe fn create_default(gl: &gl::Gl) -> (GLuint, bool) {
  let mut buffer = 0;
  gl.GenBuffers(1, &mut buffer);
  (buffer, false)
}

unsafe fn create_dsa(gl: &gl::Gl) -> (GLuint, bool) {
  let mut buffer = 0;
  gl.CreateBuffers(1, &mut buffer);
  (buffer, true)
}
