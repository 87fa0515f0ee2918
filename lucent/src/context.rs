//! The capability-resolved context.
//!
//! A [`Context`] wraps one native GL context: it negotiates the version,
//! resolves which extensions are actually usable, applies driver workarounds
//! and user disables, and owns the per-domain [`State`] blocks that freeze
//! the fastest supported code paths into function pointers.
//!
//! # Currentness and threads
//!
//! A `Context` is `!Send` and `!Sync`; it never leaves the thread that made
//! the native context current. At most one `Context` is current per thread at
//! a time, tracked by a thread-local pointer. Wrapper code never stores a
//! context reference; it re-fetches [`Context::current`] on every call so
//! several logical contexts can come and go over a program's lifetime.
//!
//! # External GL code
//!
//! The binding caches are only correct while every state change goes through
//! this crate. Around foreign GL calls, [`Context::reset_state`] is the
//! barrier: [`StateMask::ENTER_EXTERNAL`] before handing control over,
//! [`StateMask::EXIT_EXTERNAL`] after taking it back.

use log::{debug, error, info};
use std::cell::{RefCell, RefMut};
use std::collections::HashMap;
use std::error;
use std::ffi::CStr;
use std::fmt;
use std::iter::once;
use std::marker::PhantomData;
use std::os::raw::{c_char, c_void};
use std::process;
use std::ptr;
use std::rc::{Rc, Weak};

use crate::config::{ContextConfig, LogVerbosity};
use crate::driver::{self, DetectedDriver, DRIVER_WORKAROUNDS};
use crate::extension::{extensions_new_in, Extension, ExtensionSet};
use crate::gl;
use crate::gl::types::*;
use crate::state::{State, StateMask};
use crate::version::{self, known_versions, Api, Version};

// One current context per thread; `Weak` so dropping the owning `Rc` is what
// ends currentness.
thread_local! {
  static CURRENT_CONTEXT: RefCell<Option<Weak<Context>>> = RefCell::new(None);
}

/// An error that might happen during context creation.
#[non_exhaustive]
#[derive(Debug)]
pub enum ContextError {
  /// Another context is already current on this thread.
  AlreadyCurrent,
  /// The loader could not resolve even the baseline entry points.
  MissingEntryPoints,
  /// The driver returned no version string.
  NoVersionString,
  /// The version string could not be parsed.
  MalformedVersionString(String),
  /// The driver is older than the minimum this build targets.
  UnsupportedVersion(String),
}

impl fmt::Display for ContextError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ContextError::AlreadyCurrent => {
        write!(f, "another context is already current on this thread")
      }
      ContextError::MissingEntryPoints => {
        write!(f, "the function loader resolved no usable entry points")
      }
      ContextError::NoVersionString => write!(f, "the driver returned no version string"),
      ContextError::MalformedVersionString(ref s) => {
        write!(f, "cannot parse version string {:?}", s)
      }
      ContextError::UnsupportedVersion(ref s) => {
        write!(f, "unsupported version: {:?}", s)
      }
    }
  }
}

impl error::Error for ContextError {}

/// The resolved capability set: negotiated version, support bits and the
/// required-version override array.
///
/// Split out of [`Context`] so the state blocks can probe capabilities while
/// the context is still being assembled.
pub(crate) struct Capabilities {
  version: Version,
  extension_status: ExtensionSet,
  required_version: [Option<Version>; Extension::COUNT],
  registry_required_version: [Option<Version>; Extension::COUNT],
}

impl Capabilities {
  pub(crate) fn version(&self) -> Version {
    self.version
  }

  pub(crate) fn is_version_supported(&self, version: Version) -> bool {
    if self.version.api() == Api::Gl && version.api() == Api::Gles {
      // A desktop context may emulate an ES profile; the answer then lives
      // in the matching compatibility extension, not the raw version.
      let bridge = match version {
        v if v >= Version::GLES320 => Extension::ArbEs32Compatibility,
        v if v >= Version::GLES310 => Extension::ArbEs31Compatibility,
        v if v >= Version::GLES300 => Extension::ArbEs3Compatibility,
        _ => Extension::ArbEs2Compatibility,
      };

      return self.is_extension_supported(bridge);
    }

    self.version >= version
  }

  pub(crate) fn is_extension_supported(&self, extension: Extension) -> bool {
    self.is_extension_supported_at(extension, self.version)
  }

  pub(crate) fn is_extension_supported_at(&self, extension: Extension, version: Version) -> bool {
    match self.required_version[extension.index()] {
      Some(required) => required <= version && self.extension_status.contains(extension),
      None => false,
    }
  }

  pub(crate) fn is_extension_disabled(&self, extension: Extension) -> bool {
    self.required_version[extension.index()]
      != self.registry_required_version[extension.index()]
  }
}

/// One negotiated, capability-resolved connection to a native GL context.
pub struct Context {
  gl: gl::Gl,
  caps: Capabilities,

  vendor: String,
  renderer: String,
  version_string: String,

  driver: DetectedDriver,
  workarounds: Vec<&'static str>,
  disabled_extensions: Vec<Extension>,

  state: RefCell<State>,

  _marker: PhantomData<*const ()>, // !Send and !Sync
}

impl fmt::Debug for Context {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Context")
      .field("vendor", &self.vendor)
      .field("renderer", &self.renderer)
      .field("version_string", &self.version_string)
      .field("driver", &self.driver)
      .field("workarounds", &self.workarounds)
      .finish_non_exhaustive()
  }
}

impl Context {
  /// Create a context over the native context currently current on this
  /// thread, resolving its capabilities once.
  ///
  /// `loader` resolves entry point names into callable addresses; it comes
  /// from whatever windowing layer created the native context. On success
  /// the new context is registered as this thread's current one.
  ///
  /// Failure is a logged, recoverable condition: the caller decides whether
  /// to retry with different settings or give up. The one exception is a
  /// second context while one is current, which is reported as
  /// [`ContextError::AlreadyCurrent`] before any driver call is made.
  ///
  /// # Safety
  ///
  /// The native context the loader belongs to must be current on this thread
  /// and must outlive the returned [`Context`], and the loader must return
  /// either null or pointers to the real entry points.
  pub unsafe fn try_new<F>(
    config: &ContextConfig,
    mut loader: F,
  ) -> Result<Rc<Context>, ContextError>
  where
    F: FnMut(&str) -> *const c_void,
  {
    if Context::has_current() {
      return Err(ContextError::AlreadyCurrent);
    }

    let gl = gl::Gl::load_with(|symbol| loader(symbol));

    if !gl.GetString.is_loaded() || !gl.GetIntegerv.is_loaded() {
      return Err(ContextError::MissingEntryPoints);
    }

    let (version, version_string) = version::resolve(&gl)?;
    let api = version.api();

    // Extensions folded into a version at or below the negotiated one are
    // supported outright; drivers need not advertise what is already core.
    // Only extensions from future versions (and the never-core ones) that
    // this context could actually use are worth looking up in the driver's
    // list, so collect those into a name map first.
    let mut extension_status = ExtensionSet::new();
    let mut future: HashMap<&'static str, Extension> = HashMap::new();

    for edge in known_versions(api).iter().copied().map(Some).chain(once(None)) {
      let folded = edge.map_or(false, |edge| version >= edge);

      for extension in extensions_new_in(api, edge) {
        if folded {
          extension_status.insert(extension);
        } else if extension.required_version() <= version {
          future.insert(extension.name(), extension);
        }
      }
    }

    for name in query_extension_strings(&gl, version) {
      if let Some(&extension) = future.get(name.as_str()) {
        extension_status.insert(extension);
      }
    }

    // The override array starts at each extension's registry-declared
    // requirement; "is this usable" then always reduces to one compare plus
    // one bit test. Disabling means raising the slot past anything
    // reachable, leaving the support bit untouched.
    let mut required_version = [None; Extension::COUNT];

    for extension in Extension::ALL {
      if extension.api() == api {
        required_version[extension.index()] = Some(extension.required_version());
      }
    }

    let registry_required_version = required_version;

    let mut caps = Capabilities {
      version,
      extension_status,
      required_version,
      registry_required_version,
    };

    let vendor = get_string(&gl, gl::VENDOR);
    let renderer = get_string(&gl, gl::RENDERER);
    let driver = driver::detect(&vendor, &renderer, &version_string);

    let mut workarounds = Vec::new();

    for workaround in DRIVER_WORKAROUNDS {
      if config.disabled_workarounds.iter().any(|n| n == workaround.name) {
        continue;
      }

      if !(workaround.applies)(driver, version) {
        continue;
      }

      let mut used = false;

      for &extension in workaround.disables {
        if caps.is_extension_supported(extension) {
          caps.required_version[extension.index()] = None;
          used = true;
        }
      }

      if used {
        workarounds.push(workaround.name);
      }
    }

    let mut disabled_extensions = Vec::new();

    for name in &config.disabled_extensions {
      let extension = Extension::from_name(name)
        .or_else(|| Extension::from_name(&format!("GL_{}", name)));

      match extension {
        Some(extension) if extension.api() == api => {
          caps.required_version[extension.index()] = None;
          disabled_extensions.push(extension);
        }
        _ => debug!("ignoring disable request for unknown extension {}", name),
      }
    }

    if config.verbosity == LogVerbosity::Default {
      info!("Renderer: {} by {}", renderer, vendor);
      info!("{} version: {}", api, version_string);

      if !disabled_extensions.is_empty() {
        let names: Vec<_> = disabled_extensions.iter().map(|e| e.name()).collect();
        info!("Disabling extensions: {}", names.join(" "));
      }

      if !workarounds.is_empty() {
        info!("Using driver workarounds: {}", workarounds.join(" "));
      }
    }

    // The state blocks probe `caps` for their dispatch wiring, so they are
    // built strictly after everything above settled.
    let state = RefCell::new(State::new(&gl, &caps));

    let context = Rc::new(Context {
      gl,
      caps,
      vendor,
      renderer,
      version_string,
      driver,
      workarounds,
      disabled_extensions,
      state,
      _marker: PhantomData,
    });

    CURRENT_CONTEXT.with(|current| {
      *current.borrow_mut() = Some(Rc::downgrade(&context));
    });

    Ok(context)
  }

  /// Like [`try_new`](Context::try_new) but exits the process with status 1
  /// after logging when creation fails.
  ///
  /// # Safety
  ///
  /// Same contract as [`try_new`](Context::try_new).
  pub unsafe fn new<F>(config: &ContextConfig, loader: F) -> Rc<Context>
  where
    F: FnMut(&str) -> *const c_void,
  {
    match Context::try_new(config, loader) {
      Ok(context) => context,
      Err(e) => {
        error!("cannot create context: {}", e);
        process::exit(1);
      }
    }
  }

  /// The context current on this thread, if any.
  pub fn try_current() -> Option<Rc<Context>> {
    CURRENT_CONTEXT.with(|current| current.borrow().as_ref().and_then(Weak::upgrade))
  }

  /// The context current on this thread.
  ///
  /// Calling this with no current context is a programming error.
  pub fn current() -> Rc<Context> {
    Context::try_current().expect("no context is current on this thread")
  }

  /// Whether any context is current on this thread.
  pub fn has_current() -> bool {
    Context::try_current().is_some()
  }

  /// The negotiated version.
  pub fn version(&self) -> Version {
    self.caps.version()
  }

  /// Whether functionality of `version` is usable. Same-flavor versions
  /// compare directly; a desktop context asked about an ES version answers
  /// through the matching compatibility extension.
  pub fn is_version_supported(&self, version: Version) -> bool {
    self.caps.is_version_supported(version)
  }

  /// Whether `extension` is usable on this context. O(1), no driver call.
  pub fn is_extension_supported(&self, extension: Extension) -> bool {
    self.caps.is_extension_supported(extension)
  }

  /// Whether `extension` would be usable if the context ran at `version`,
  /// for decisions that must be made as of a pinned (e.g. shading language)
  /// version rather than the negotiated one.
  pub fn is_extension_supported_at(&self, extension: Extension, version: Version) -> bool {
    self.caps.is_extension_supported_at(extension, version)
  }

  /// Whether `extension` was turned off by a driver workaround or an
  /// explicit disable, regardless of what the driver advertises.
  pub fn is_extension_disabled(&self, extension: Extension) -> bool {
    self.caps.is_extension_disabled(extension)
  }

  /// Every usable extension, in registry order. Intended for diagnostics.
  pub fn supported_extensions(&self) -> Vec<Extension> {
    Extension::ALL
      .iter()
      .copied()
      .filter(|&e| self.caps.is_extension_supported(e))
      .collect()
  }

  /// Best-effort driver classification used for workaround selection.
  pub fn detected_driver(&self) -> DetectedDriver {
    self.driver
  }

  /// Names of the driver workarounds in effect.
  pub fn active_workarounds(&self) -> &[&'static str] {
    &self.workarounds
  }

  /// The driver's vendor string.
  pub fn vendor(&self) -> &str {
    &self.vendor
  }

  /// The driver's renderer string.
  pub fn renderer(&self) -> &str {
    &self.renderer
  }

  /// The raw version string the version was negotiated from.
  pub fn version_string(&self) -> &str {
    &self.version_string
  }

  /// The loaded function table.
  pub fn gl(&self) -> &gl::Gl {
    &self.gl
  }

  /// The per-domain state blocks.
  ///
  /// Panics when the state is already borrowed; callers must not hold the
  /// guard across calls that take it again (e.g.
  /// [`reset_state`](Context::reset_state)).
  pub fn state(&self) -> RefMut<State> {
    self.state.borrow_mut()
  }

  /// Re-synchronize the cached state of the selected subsystems with the
  /// actual driver state; see [`StateMask`].
  ///
  /// # Safety
  ///
  /// The wrapped native context must be current on this thread.
  pub unsafe fn reset_state(&self, mask: StateMask) {
    self.state.borrow_mut().reset(&self.gl, mask);
  }
}

impl Drop for Context {
  fn drop(&mut self) {
    // GL-side helper objects must go before the native context does.
    unsafe {
      self.state.borrow_mut().destroy(&self.gl);
    }

    CURRENT_CONTEXT.with(|current| {
      let mut current = current.borrow_mut();

      if current
        .as_ref()
        .map_or(false, |weak| ptr::eq(weak.as_ptr(), self))
      {
        *current = None;
      }
    });
  }
}

/// Enumerate the driver's advertised extensions: indexed enumeration on
/// 3.0-style APIs, the single space-separated string on legacy ones.
unsafe fn query_extension_strings(gl: &gl::Gl, version: Version) -> Vec<String> {
  if version >= Version::GL300 || version >= Version::GLES300 {
    let mut count: GLint = 0;
    gl.GetIntegerv(gl::NUM_EXTENSIONS, &mut count);

    (0..count)
      .filter_map(|i| {
        let raw = gl.GetStringi(gl::EXTENSIONS, i as GLuint);

        if raw.is_null() {
          None
        } else {
          Some(
            CStr::from_ptr(raw as *const c_char)
              .to_string_lossy()
              .into_owned(),
          )
        }
      })
      .collect()
  } else {
    let raw = gl.GetString(gl::EXTENSIONS);

    if raw.is_null() {
      return Vec::new();
    }

    CStr::from_ptr(raw as *const c_char)
      .to_string_lossy()
      .split_whitespace()
      .map(str::to_owned)
      .collect()
  }
}

unsafe fn get_string(gl: &gl::Gl, name: GLenum) -> String {
  let raw = gl.GetString(name);

  if raw.is_null() {
    String::new()
  } else {
    CStr::from_ptr(raw as *const c_char)
      .to_string_lossy()
      .into_owned()
  }
}
