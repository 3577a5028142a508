//! Host OS and architecture detection.

use serde::Serialize;

use crate::consts::{ENV_OS_ARCH, ENV_OS_NAME};

/// The raw OS and architecture names reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostInfo {
  pub os_name: String,
  pub arch_name: String,
}

impl HostInfo {
  pub fn new(os_name: impl Into<String>, arch_name: impl Into<String>) -> Self {
    Self {
      os_name: os_name.into(),
      arch_name: arch_name.into(),
    }
  }

  /// Detect the running host.
  ///
  /// `USBLOAD_OS_NAME` and `USBLOAD_OS_ARCH` take precedence over the
  /// compile-time target.
  pub fn detect() -> Self {
    let os_name = std::env::var(ENV_OS_NAME).unwrap_or_else(|_| target_os_name().to_string());
    let arch_name = std::env::var(ENV_OS_ARCH).unwrap_or_else(|_| target_arch_name().to_string());
    Self { os_name, arch_name }
  }
}

/// Conventional host name for the compile-time target OS.
fn target_os_name() -> &'static str {
  match std::env::consts::OS {
    "linux" => "Linux",
    "windows" => "Windows",
    "macos" => "Mac OS X",
    "freebsd" => "FreeBSD",
    "solaris" | "illumos" => "SunOS",
    other => other,
  }
}

fn target_arch_name() -> &'static str {
  match std::env::consts::ARCH {
    "x86" => "i386",
    other => other,
  }
}
