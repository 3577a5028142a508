//! Shared library file extension per operating system.

use std::collections::BTreeMap;

use tracing::debug;

use super::os::Os;
use crate::consts::ENV_LIBEXT_PREFIX;
use crate::error::{LoaderError, Result};

pub const EXT_SO: &str = "so";
pub const EXT_DLL: &str = "dll";
pub const EXT_DYLIB: &str = "dylib";

/// Environment variable an operator sets to force the extension for `os`.
///
/// The OS token is upper-cased and anything outside `[A-Z0-9]` becomes `_`,
/// e.g. `plan9` -> `USBLOAD_LIBEXT_PLAN9`.
pub fn override_key(os: &Os) -> String {
  let suffix: String = os
    .as_str()
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() {
        c.to_ascii_uppercase()
      } else {
        '_'
      }
    })
    .collect();
  format!("{ENV_LIBEXT_PREFIX}{suffix}")
}

/// Default extension for the OS family, if it is a known one.
pub fn default_extension(os: &Os) -> Option<&'static str> {
  match os {
    Os::Linux | Os::FreeBsd | Os::SunOs => Some(EXT_SO),
    Os::Windows => Some(EXT_DLL),
    Os::MacOsX => Some(EXT_DYLIB),
    Os::Other(_) => None,
  }
}

/// Resolve the library extension, consulting `overrides` (keyed by OS token)
/// before the defaults.
pub fn resolve_extension(os: &Os, overrides: &BTreeMap<String, String>) -> Result<String> {
  if let Some(ext) = overrides.get(os.as_str()) {
    debug!(os = %os, ext = %ext, "using library extension override");
    return Ok(ext.clone());
  }

  default_extension(os)
    .map(str::to_string)
    .ok_or_else(|| LoaderError::PlatformUnsupported {
      os: os.to_string(),
      override_key: override_key(os),
    })
}
