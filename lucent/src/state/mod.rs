//! Graphics state: per-domain dispatch tables and binding caches.
//!
//! Each domain of the API gets one state block. A block is built once, right
//! after capability resolution, and does two things:
//!
//! - it selects, for every operation that has several wire-compatible
//!   implementations, the fastest one the context supports, and freezes that
//!   choice into a function-pointer field (`*_implementation`); callers pay
//!   no per-call capability branch afterwards;
//! - it caches the currently bound object per bind target (and a few
//!   viewport-like scalars) so redundant driver calls can be skipped, plus
//!   lazily memoized implementation-defined limits.
//!
//! A cached binding is only correct as long as every change went through the
//! wrappers. Code that hands control to raw GL calls must treat
//! [`State::reset`] as a barrier in both directions; see [`StateMask`].

use bitflags::bitflags;

use crate::context::Capabilities;
use crate::gl;

pub mod buffer;
pub mod debug;
pub mod framebuffer;
pub mod mesh;
pub mod pixel_storage;
pub mod query;
pub mod renderer;
pub mod shader_program;
pub mod texture;
pub mod transform_feedback;

pub use self::buffer::{BufferState, BufferTarget};
pub use self::debug::DebugState;
pub use self::framebuffer::{FramebufferState, FramebufferTarget};
pub use self::mesh::MeshState;
pub use self::pixel_storage::PixelStorageState;
pub use self::query::QueryState;
pub use self::renderer::RendererState;
pub use self::shader_program::ShaderProgramState;
pub use self::texture::TextureState;
pub use self::transform_feedback::TransformFeedbackState;

/// Cached value.
///
/// A cached value is used to prevent issuing costy GPU commands if we know
/// the target value is already set to what the command tries to set. An empty
/// cache is the disengaged state: it compares invalid against every value, so
/// the next command is forced through to the driver. `None` doubles as the
/// sentinel on purpose; no valid object id or rectangle is sacrificed for it.
#[derive(Clone, Copy, Debug)]
pub struct Cached<T>(Option<T>)
where
  T: Copy + PartialEq;

impl<T> Cached<T>
where
  T: Copy + PartialEq,
{
  /// A cache holding no value yet.
  pub fn unknown() -> Self {
    Cached(None)
  }

  /// Cache a value.
  pub fn new(initial: T) -> Self {
    Cached(Some(initial))
  }

  /// Explicitly disengage the cached value.
  ///
  /// This is necessary when we want to be able to force a GPU command to run.
  pub fn invalidate(&mut self) {
    self.0 = None;
  }

  pub fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  pub fn get(&self) -> Option<T> {
    self.0
  }

  /// Check if the cached value is invalid regarding a value.
  ///
  /// A non-cached value (i.e. empty) is always invalid whatever the compared
  /// value. If a value is already cached, then it's invalid if it's not equal
  /// to the input value.
  pub fn is_invalid(&self, new_val: &T) -> bool {
    match &self.0 {
      Some(t) => t != new_val,
      None => true,
    }
  }
}

bitflags! {
  /// Subsystems whose cached state can be re-synchronized independently.
  ///
  /// Resetting invalidates caches so the next dedup check misses; it never
  /// re-wires the implementations selected at construction. The exception is
  /// [`MESH_VAO`], which actually unbinds the tracked vertex array object so
  /// foreign GL code cannot scribble over it.
  ///
  /// [`MESH_VAO`]: StateMask::MESH_VAO
  pub struct StateMask: u32 {
    const BUFFERS = 1 << 0;
    const FRAMEBUFFERS = 1 << 1;
    const MESHES = 1 << 2;
    /// Unbind the tracked vertex array object.
    const MESH_VAO = 1 << 3;
    const PIXEL_STORAGE = 1 << 4;
    const RENDERER = 1 << 5;
    const SHADERS = 1 << 6;
    const TEXTURES = 1 << 7;
    const TRANSFORM_FEEDBACK = 1 << 8;

    /// What to reset right before handing control to foreign GL code.
    const ENTER_EXTERNAL = Self::MESH_VAO.bits;
    /// What to reset right after foreign GL code may have touched anything.
    const EXIT_EXTERNAL = Self::BUFFERS.bits
      | Self::FRAMEBUFFERS.bits
      | Self::MESHES.bits
      | Self::MESH_VAO.bits
      | Self::PIXEL_STORAGE.bits
      | Self::RENDERER.bits
      | Self::SHADERS.bits
      | Self::TEXTURES.bits
      | Self::TRANSFORM_FEEDBACK.bits;
  }
}

/// Aggregate of every per-domain state block; exactly one per context.
pub struct State {
  pub buffer: BufferState,
  pub debug: DebugState,
  pub framebuffer: FramebufferState,
  pub mesh: MeshState,
  pub pixel_storage: PixelStorageState,
  pub query: QueryState,
  pub renderer: RendererState,
  pub shader_program: ShaderProgramState,
  pub texture: TextureState,
  pub transform_feedback: TransformFeedbackState,
}

impl State {
  /// Build every domain block.
  ///
  /// Must run strictly after version and extension resolution: each block
  /// wires its implementations by probing `caps`.
  pub(crate) unsafe fn new(gl: &gl::Gl, caps: &Capabilities) -> State {
    State {
      buffer: BufferState::new(caps),
      debug: DebugState::new(caps),
      framebuffer: FramebufferState::new(caps),
      mesh: MeshState::new(gl, caps),
      pixel_storage: PixelStorageState::new(),
      query: QueryState::new(caps),
      renderer: RendererState::new(caps),
      shader_program: ShaderProgramState::new(caps),
      texture: TextureState::new(caps),
      transform_feedback: TransformFeedbackState::new(caps),
    }
  }

  /// Invalidate the cached bindings of the selected subsystems.
  ///
  /// Apart from [`StateMask::MESH_VAO`] this issues no driver call; it only
  /// forces the next dedup checks to miss and re-synchronize.
  pub unsafe fn reset(&mut self, gl: &gl::Gl, mask: StateMask) {
    if mask.contains(StateMask::BUFFERS) {
      self.buffer.reset();
    }

    if mask.contains(StateMask::FRAMEBUFFERS) {
      self.framebuffer.reset();
    }

    if mask.contains(StateMask::MESHES) {
      self.mesh.reset();
    }

    if mask.contains(StateMask::PIXEL_STORAGE) {
      self.pixel_storage.reset();
    }

    if mask.contains(StateMask::RENDERER) {
      self.renderer.reset();
    }

    if mask.contains(StateMask::SHADERS) {
      self.shader_program.reset();
    }

    if mask.contains(StateMask::TEXTURES) {
      self.texture.reset();
    }

    if mask.contains(StateMask::TRANSFORM_FEEDBACK) {
      self.transform_feedback.reset();
    }

    if mask.contains(StateMask::MESH_VAO) {
      self.mesh.unbind(gl);
    }
  }

  /// Release GL-side helper objects before the native context goes away.
  pub(crate) unsafe fn destroy(&mut self, gl: &gl::Gl) {
    self.mesh.destroy(gl);
  }
}
