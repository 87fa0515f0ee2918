//! The compiled-in extension registry.
//!
//! Every extension the crate knows how to take advantage of is declared here,
//! once, with the flavor it belongs to, the minimum version required to even
//! query it and the version at which it was folded into core (if ever). The
//! declaration order yields a dense index that the [`Context`] uses for O(1)
//! capability lookups through a fixed-width bitset and a parallel
//! required-version array.
//!
//! [`Context`]: crate::context::Context

use crate::version::{known_versions, Api, Version};

macro_rules! extensions {
  ($($variant:ident { $name:literal, $api:ident, required: $required:ident, core: $core:expr },)*) => {
    /// A known extension.
    ///
    /// The discriminant doubles as the dense registry index; it is stable
    /// within a build but carries no meaning across builds.
    #[allow(missing_docs)]
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub enum Extension {
      $($variant),*
    }

    impl Extension {
      /// Number of extensions compiled into the registry.
      pub const COUNT: usize = [$(Extension::$variant),*].len();

      /// Every known extension, in registration order.
      pub const ALL: [Extension; Self::COUNT] = [$(Extension::$variant),*];

      /// Dense registry index.
      pub fn index(self) -> usize {
        self as usize
      }

      /// Canonical name, as drivers advertise it.
      pub fn name(self) -> &'static str {
        match self {
          $(Extension::$variant => $name),*
        }
      }

      /// Flavor the extension belongs to.
      pub fn api(self) -> Api {
        match self {
          $(Extension::$variant => Api::$api),*
        }
      }

      /// Minimum version required for the extension to be queryable at all.
      pub fn required_version(self) -> Version {
        match self {
          $(Extension::$variant => Version::$required),*
        }
      }

      /// Version at which the extension was folded into core, if any.
      pub fn core_version(self) -> Option<Version> {
        match self {
          $(Extension::$variant => $core),*
        }
      }

      /// Look an extension up by its canonical name.
      pub fn from_name(name: &str) -> Option<Extension> {
        match name {
          $($name => Some(Extension::$variant),)*
          _ => None,
        }
      }
    }
  };
}

extensions! {
  // Desktop OpenGL, grouped by the version that absorbed them.
  ArbFramebufferObject { "GL_ARB_framebuffer_object", Gl, required: GL210, core: Some(Version::GL300) },
  ArbVertexArrayObject { "GL_ARB_vertex_array_object", Gl, required: GL210, core: Some(Version::GL300) },
  ArbMapBufferRange { "GL_ARB_map_buffer_range", Gl, required: GL210, core: Some(Version::GL300) },
  ArbUniformBufferObject { "GL_ARB_uniform_buffer_object", Gl, required: GL210, core: Some(Version::GL310) },
  ArbCopyBuffer { "GL_ARB_copy_buffer", Gl, required: GL210, core: Some(Version::GL310) },
  ArbSync { "GL_ARB_sync", Gl, required: GL210, core: Some(Version::GL320) },
  ArbSamplerObjects { "GL_ARB_sampler_objects", Gl, required: GL210, core: Some(Version::GL330) },
  ArbTimerQuery { "GL_ARB_timer_query", Gl, required: GL210, core: Some(Version::GL330) },
  ArbExplicitAttribLocation { "GL_ARB_explicit_attrib_location", Gl, required: GL210, core: Some(Version::GL330) },
  ArbTransformFeedback2 { "GL_ARB_transform_feedback2", Gl, required: GL210, core: Some(Version::GL400) },
  ArbTransformFeedback3 { "GL_ARB_transform_feedback3", Gl, required: GL210, core: Some(Version::GL400) },
  ArbEs2Compatibility { "GL_ARB_ES2_compatibility", Gl, required: GL210, core: Some(Version::GL410) },
  ArbSeparateShaderObjects { "GL_ARB_separate_shader_objects", Gl, required: GL210, core: Some(Version::GL410) },
  ArbViewportArray { "GL_ARB_viewport_array", Gl, required: GL210, core: Some(Version::GL410) },
  ArbTextureStorage { "GL_ARB_texture_storage", Gl, required: GL210, core: Some(Version::GL420) },
  ArbBaseInstance { "GL_ARB_base_instance", Gl, required: GL210, core: Some(Version::GL420) },
  KhrDebug { "GL_KHR_debug", Gl, required: GL210, core: Some(Version::GL430) },
  ArbInvalidateSubdata { "GL_ARB_invalidate_subdata", Gl, required: GL210, core: Some(Version::GL430) },
  ArbEs3Compatibility { "GL_ARB_ES3_compatibility", Gl, required: GL210, core: Some(Version::GL430) },
  ArbVertexAttribBinding { "GL_ARB_vertex_attrib_binding", Gl, required: GL210, core: Some(Version::GL430) },
  ArbBufferStorage { "GL_ARB_buffer_storage", Gl, required: GL210, core: Some(Version::GL440) },
  ArbMultiBind { "GL_ARB_multi_bind", Gl, required: GL300, core: Some(Version::GL440) },
  ArbDirectStateAccess { "GL_ARB_direct_state_access", Gl, required: GL300, core: Some(Version::GL450) },
  ArbEs31Compatibility { "GL_ARB_ES3_1_compatibility", Gl, required: GL210, core: Some(Version::GL450) },
  KhrRobustness { "GL_KHR_robustness", Gl, required: GL210, core: Some(Version::GL450) },
  ArbTextureFilterAnisotropic { "GL_ARB_texture_filter_anisotropic", Gl, required: GL210, core: Some(Version::GL460) },

  // Desktop extensions that never made it into a core version.
  ExtDirectStateAccess { "GL_EXT_direct_state_access", Gl, required: GL210, core: None },
  ExtFramebufferObject { "GL_EXT_framebuffer_object", Gl, required: GL210, core: None },
  ExtFramebufferBlit { "GL_EXT_framebuffer_blit", Gl, required: GL210, core: None },
  AppleVertexArrayObject { "GL_APPLE_vertex_array_object", Gl, required: GL210, core: None },
  ArbRobustness { "GL_ARB_robustness", Gl, required: GL210, core: None },
  ExtDebugLabel { "GL_EXT_debug_label", Gl, required: GL210, core: None },
  ExtDebugMarker { "GL_EXT_debug_marker", Gl, required: GL210, core: None },
  GremedyStringMarker { "GL_GREMEDY_string_marker", Gl, required: GL210, core: None },
  ExtTextureFilterAnisotropic { "GL_EXT_texture_filter_anisotropic", Gl, required: GL210, core: None },
  ArbEs32Compatibility { "GL_ARB_ES3_2_compatibility", Gl, required: GL210, core: None },

  // OpenGL ES.
  OesVertexArrayObject { "GL_OES_vertex_array_object", Gles, required: GLES200, core: Some(Version::GLES300) },
  ExtMapBufferRange { "GL_EXT_map_buffer_range", Gles, required: GLES200, core: Some(Version::GLES300) },
  ExtTextureStorage { "GL_EXT_texture_storage", Gles, required: GLES200, core: Some(Version::GLES300) },
  OesTexture3D { "GL_OES_texture_3D", Gles, required: GLES200, core: Some(Version::GLES300) },
  ExtSeparateShaderObjects { "GL_EXT_separate_shader_objects", Gles, required: GLES200, core: Some(Version::GLES310) },
  ExtDisjointTimerQuery { "GL_EXT_disjoint_timer_query", Gles, required: GLES200, core: None },
  ExtDiscardFramebuffer { "GL_EXT_discard_framebuffer", Gles, required: GLES200, core: None },
  OesMapbuffer { "GL_OES_mapbuffer", Gles, required: GLES200, core: None },
  ExtMultisampledRenderToTexture { "GL_EXT_multisampled_render_to_texture", Gles, required: GLES200, core: None },
  AngleFramebufferBlit { "GL_ANGLE_framebuffer_blit", Gles, required: GLES200, core: None },
  NvFramebufferBlit { "GL_NV_framebuffer_blit", Gles, required: GLES200, core: None },
  ExtRobustness { "GL_EXT_robustness", Gles, required: GLES200, core: None },
}

/// Extensions folded into core at `edge`, in registration order; `edge =
/// None` lists the ones of that flavor that never became core.
///
/// Asking about a version edge outside the flavor's known set is a
/// programming error, not a runtime condition.
pub(crate) fn extensions_new_in(
  api: Api,
  edge: Option<Version>,
) -> impl Iterator<Item = Extension> {
  if let Some(version) = edge {
    assert!(
      version.api() == api && known_versions(api).contains(&version),
      "unknown {} version edge {}",
      api,
      version,
    );
  }

  Extension::ALL
    .iter()
    .copied()
    .filter(move |e| e.api() == api && e.core_version() == edge)
}

const WORDS: usize = (Extension::COUNT + 63) / 64;

/// Fixed-width bitset indexed by [`Extension::index`].
#[derive(Clone, Debug)]
pub(crate) struct ExtensionSet {
  words: [u64; WORDS],
}

impl ExtensionSet {
  pub(crate) const fn new() -> Self {
    ExtensionSet { words: [0; WORDS] }
  }

  pub(crate) fn insert(&mut self, extension: Extension) {
    let i = extension.index();
    self.words[i / 64] |= 1 << (i % 64);
  }

  pub(crate) fn contains(&self, extension: Extension) -> bool {
    let i = extension.index();
    self.words[i / 64] & (1 << (i % 64)) != 0
  }
}
