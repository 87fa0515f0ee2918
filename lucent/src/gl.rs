//! OpenGL bindings, generated at build time from the Khronos registry.
//!
//! The [`Gl`] struct is a per-context function table: every entry point is
//! resolved through the loader callback once, and `is_loaded` tells whether a
//! symbol was actually found. Nothing in here is global; two contexts carry
//! two tables.

include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
