//! Capability-resolved OpenGL context management and state caching.
//!
//! This crate is the layer between typed GL object wrappers and the raw
//! driver. It answers two questions once, at context creation, instead of on
//! every call:
//!
//! - **Which code path?** Many logical operations exist in several
//!   wire-compatible renditions (a direct-state-access entry point, an older
//!   vendor extension, a guaranteed fallback). Each per-domain state block
//!   probes the resolved capabilities and freezes the fastest supported
//!   rendition into a function-pointer field.
//! - **Is this call redundant?** Each block caches the object bound per
//!   target (and a few viewport-like scalars) so a bind of what is already
//!   bound costs nothing, plus lazily memoized implementation-defined
//!   limits.
//!
//! Capability resolution itself is two-tiered: extensions folded into the
//! negotiated core version are marked supported without ever consulting the
//! driver's extension list; only newer ones get the single string-list pass.
//! Known-broken driver builds are handled by workarounds that raise an
//! extension's required version out of reach, and users can do the same by
//! name through [`ContextConfig`].
//!
//! The crate deliberately stops below rendering: no draw calls, no scene
//! management, no typed wrappers. Those are consumers of [`Context`] and
//! [`State`].

pub mod config;
pub mod context;
pub mod driver;
pub mod extension;
#[allow(
  non_upper_case_globals,
  non_snake_case,
  non_camel_case_types,
  missing_docs,
  clippy::all
)]
pub mod gl;
pub mod state;
pub mod version;

pub use crate::config::{ContextConfig, LogVerbosity};
pub use crate::context::{Context, ContextError};
pub use crate::driver::DetectedDriver;
pub use crate::extension::Extension;
pub use crate::state::{State, StateMask};
pub use crate::version::{Api, Version};
