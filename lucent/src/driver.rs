//! Driver fingerprinting and workarounds.
//!
//! The fingerprint is a coarse, best-effort classification derived from the
//! vendor, renderer and version strings. It exists for exactly one purpose:
//! selecting workarounds for driver builds known to ship a broken
//! implementation of an otherwise-advertised extension. When nothing matches
//! the classification stays empty and no workaround applies.

use bitflags::bitflags;

use crate::extension::Extension;
use crate::version::Version;

bitflags! {
  /// Best-effort classification of the driver in charge.
  ///
  /// Not guaranteed accurate and unavailable in sandboxed deployments where
  /// the strings are masked; consumers must treat it as a hint.
  pub struct DetectedDriver: u32 {
    /// AMD/ATI proprietary drivers.
    const AMD = 1 << 0;
    /// ANGLE, GL-on-D3D/Metal/Vulkan translation.
    const ANGLE = 1 << 1;
    /// Intel's Windows driver (the Linux driver is Mesa).
    const INTEL_WINDOWS = 1 << 2;
    /// Any Mesa driver.
    const MESA = 1 << 3;
    /// NVidia proprietary drivers.
    const NVIDIA = 1 << 4;
    /// VMware SVGA3D virtualized device.
    const SVGA3D = 1 << 5;
    /// Google SwiftShader software rasterizer.
    const SWIFTSHADER = 1 << 6;
  }
}

pub(crate) fn detect(vendor: &str, renderer: &str, version: &str) -> DetectedDriver {
  let mut driver = DetectedDriver::empty();

  if vendor.contains("ATI Technologies") || vendor.contains("AMD") {
    driver |= DetectedDriver::AMD;
  }

  if renderer.contains("ANGLE") {
    driver |= DetectedDriver::ANGLE;
  }

  if vendor.contains("Intel") && cfg!(windows) {
    driver |= DetectedDriver::INTEL_WINDOWS;
  }

  if vendor.contains("Mesa") || version.contains("Mesa") {
    driver |= DetectedDriver::MESA;
  }

  if vendor.contains("NVIDIA") {
    driver |= DetectedDriver::NVIDIA;
  }

  if renderer.contains("SVGA3D") {
    driver |= DetectedDriver::SVGA3D;
  }

  if renderer.contains("SwiftShader") {
    driver |= DetectedDriver::SWIFTSHADER;
  }

  driver
}

/// A named exception for a driver build that advertises an extension it
/// implements incorrectly. Applying one raises the extension's required
/// version past anything reachable, so it reads as unsupported; the support
/// bitset itself is never touched.
pub(crate) struct DriverWorkaround {
  pub(crate) name: &'static str,
  pub(crate) applies: fn(DetectedDriver, Version) -> bool,
  pub(crate) disables: &'static [Extension],
}

fn intel_windows(driver: DetectedDriver, _: Version) -> bool {
  driver.contains(DetectedDriver::INTEL_WINDOWS)
}

fn svga3d(driver: DetectedDriver, _: Version) -> bool {
  driver.contains(DetectedDriver::SVGA3D)
}

fn amd(driver: DetectedDriver, _: Version) -> bool {
  driver.contains(DetectedDriver::AMD)
}

fn swiftshader(driver: DetectedDriver, _: Version) -> bool {
  driver.contains(DetectedDriver::SWIFTSHADER)
}

pub(crate) const DRIVER_WORKAROUNDS: &[DriverWorkaround] = &[
  // Intel's Windows driver exposes DSA with broken multi-bind interactions;
  // the non-DSA paths behave.
  DriverWorkaround {
    name: "intel-windows-broken-dsa",
    applies: intel_windows,
    disables: &[Extension::ArbDirectStateAccess],
  },
  // SVGA3D advertises both DSA flavors but corrupts named-object uploads.
  DriverWorkaround {
    name: "svga3d-broken-dsa",
    applies: svga3d,
    disables: &[Extension::ArbDirectStateAccess, Extension::ExtDirectStateAccess],
  },
  // The EXT variant predates ARB DSA and rots on AMD; the ARB one is fine.
  DriverWorkaround {
    name: "amd-broken-ext-dsa",
    applies: amd,
    disables: &[Extension::ExtDirectStateAccess],
  },
  // SwiftShader answers timer queries with garbage timestamps.
  DriverWorkaround {
    name: "swiftshader-broken-timer-query",
    applies: swiftshader,
    disables: &[Extension::ArbTimerQuery, Extension::ExtDisjointTimerQuery],
  },
];
