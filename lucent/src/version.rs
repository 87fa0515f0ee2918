//! API flavors and negotiated versions.
//!
//! A [`Version`] pairs an API flavor with a `major.minor` number. Versions of
//! different flavors are deliberately unordered: comparing a desktop version
//! against an ES version yields `false` for every ordering operator, which
//! keeps capability checks honest when a context of one flavor is asked about
//! the other.

use std::cmp::Ordering;
use std::ffi::CStr;
use std::fmt;
use std::os::raw::c_char;

use crate::context::ContextError;
use crate::gl;
use crate::gl::types::*;

/// Flavor of the API a context speaks.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Api {
  /// Desktop OpenGL.
  Gl,
  /// OpenGL ES.
  Gles,
}

impl fmt::Display for Api {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      Api::Gl => f.write_str("OpenGL"),
      Api::Gles => f.write_str("OpenGL ES"),
    }
  }
}

/// A version of one API flavor.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Version(pub Api, pub u8, pub u8);

impl Version {
  pub const GL210: Version = Version(Api::Gl, 2, 1);
  pub const GL300: Version = Version(Api::Gl, 3, 0);
  pub const GL310: Version = Version(Api::Gl, 3, 1);
  pub const GL320: Version = Version(Api::Gl, 3, 2);
  pub const GL330: Version = Version(Api::Gl, 3, 3);
  pub const GL400: Version = Version(Api::Gl, 4, 0);
  pub const GL410: Version = Version(Api::Gl, 4, 1);
  pub const GL420: Version = Version(Api::Gl, 4, 2);
  pub const GL430: Version = Version(Api::Gl, 4, 3);
  pub const GL440: Version = Version(Api::Gl, 4, 4);
  pub const GL450: Version = Version(Api::Gl, 4, 5);
  pub const GL460: Version = Version(Api::Gl, 4, 6);

  pub const GLES200: Version = Version(Api::Gles, 2, 0);
  pub const GLES300: Version = Version(Api::Gles, 3, 0);
  pub const GLES310: Version = Version(Api::Gles, 3, 1);
  pub const GLES320: Version = Version(Api::Gles, 3, 2);

  /// Flavor of this version.
  pub fn api(self) -> Api {
    self.0
  }

  /// Whether this is an OpenGL ES version.
  pub fn is_es(self) -> bool {
    self.0 == Api::Gles
  }
}

impl PartialOrd for Version {
  fn partial_cmp(&self, other: &Version) -> Option<Ordering> {
    if self.0 != other.0 {
      None
    } else {
      Some((self.1, self.2).cmp(&(other.1, other.2)))
    }
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    write!(f, "{} {}.{}", self.0, self.1, self.2)
  }
}

/// Desktop version edges this build knows about, oldest first.
pub const KNOWN_GL_VERSIONS: [Version; 12] = [
  Version::GL210,
  Version::GL300,
  Version::GL310,
  Version::GL320,
  Version::GL330,
  Version::GL400,
  Version::GL410,
  Version::GL420,
  Version::GL430,
  Version::GL440,
  Version::GL450,
  Version::GL460,
];

/// ES version edges this build knows about, oldest first.
pub const KNOWN_GLES_VERSIONS: [Version; 4] = [
  Version::GLES200,
  Version::GLES300,
  Version::GLES310,
  Version::GLES320,
];

pub(crate) fn known_versions(api: Api) -> &'static [Version] {
  match api {
    Api::Gl => &KNOWN_GL_VERSIONS,
    Api::Gles => &KNOWN_GLES_VERSIONS,
  }
}

/// Oldest version of each flavor the crate accepts.
pub(crate) fn minimal_version(api: Api) -> Version {
  match api {
    Api::Gl => Version::GL210,
    Api::Gles => Version::GLES200,
  }
}

/// Version strings that pin the context to a specific profile no matter what
/// the driver otherwise implements. Some drivers expose an ES2-profile
/// context on top of an ES3 implementation and only the version string tells;
/// matching is data so the list can grow without touching control flow.
const LEGACY_VERSION_STRINGS: &[(&str, Version)] = &[
  ("OpenGL ES 2.0", Version::GLES200),
  ("OpenGL ES 3.0", Version::GLES300),
];

/// Negotiate the version with the driver.
///
/// 3.0-style APIs answer the integer version queries, which are
/// authoritative. Legacy APIs only have the version string; a leading `X.Y`
/// is parsed out of it, tolerating the vendor chatter that follows.
pub(crate) unsafe fn resolve(gl: &gl::Gl) -> Result<(Version, String), ContextError> {
  let raw = gl.GetString(gl::VERSION);

  if raw.is_null() {
    return Err(ContextError::NoVersionString);
  }

  let string = CStr::from_ptr(raw as *const c_char)
    .to_string_lossy()
    .into_owned();

  for &(needle, version) in LEGACY_VERSION_STRINGS {
    if string.contains(needle) {
      return Ok((version, string));
    }
  }

  let (api, rest) = match string.strip_prefix("OpenGL ES ") {
    Some(rest) => (Api::Gles, rest),
    None => (Api::Gl, string.as_str()),
  };

  let (mut major, mut minor) = match parse_major_minor(rest) {
    Some(pair) => pair,
    None => return Err(ContextError::MalformedVersionString(string)),
  };

  if major >= 3 {
    let mut queried_major: GLint = 0;
    let mut queried_minor: GLint = 0;
    gl.GetIntegerv(gl::MAJOR_VERSION, &mut queried_major);
    gl.GetIntegerv(gl::MINOR_VERSION, &mut queried_minor);

    if queried_major > 0 {
      major = queried_major as u8;
      minor = queried_minor as u8;
    }
  }

  match clamp_to_known(api, major, minor) {
    Some(version) => Ok((version, string)),
    None => Err(ContextError::UnsupportedVersion(string)),
  }
}

/// Parse a leading `major.minor` pair, ignoring whatever follows the minor
/// number ("3.3.0 NVIDIA 470.57", "3.1 Mesa 21.0.3", …).
fn parse_major_minor(s: &str) -> Option<(u8, u8)> {
  let mut parts = s.splitn(2, '.');
  let major = parts.next()?.trim().parse().ok()?;
  let minor = parts
    .next()?
    .chars()
    .take_while(char::is_ascii_digit)
    .collect::<String>()
    .parse()
    .ok()?;

  Some((major, minor))
}

/// Round a raw `major.minor` down to the newest known edge it reaches, or
/// reject it when it does not even reach the build minimum.
fn clamp_to_known(api: Api, major: u8, minor: u8) -> Option<Version> {
  let mut found = None;

  for &candidate in known_versions(api) {
    if (major, minor) >= (candidate.1, candidate.2) {
      found = Some(candidate);
    }
  }

  debug_assert!(found.map_or(true, |v| v >= minimal_version(api)));
  found
}
