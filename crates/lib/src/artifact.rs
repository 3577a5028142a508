//! Names of the native artifacts required on each platform.

use serde::Serialize;

use crate::consts::WRAPPER_LIB_STEM;
use crate::platform::Os;
use crate::platform::ext::{EXT_DLL, EXT_DYLIB};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
  /// The wrapper library, always required.
  Primary,
  /// The USB access library itself, bundled only where the OS lacks it.
  Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactDescriptor {
  pub name: String,
  pub kind: ArtifactKind,
}

/// File name of the wrapper library, e.g. `libusbload.so`.
pub fn primary_artifact_name(ext: &str) -> String {
  format!("{WRAPPER_LIB_STEM}.{ext}")
}

/// File name of the companion USB library, or `None` where the OS provides it
/// system-wide.
pub fn secondary_artifact_name(os: &Os) -> Option<String> {
  match os {
    Os::Windows => Some(format!("libusb0.{EXT_DLL}")),
    Os::MacOsX => Some(format!("libusb.{EXT_DYLIB}")),
    _ => None,
  }
}

/// Artifacts for one platform in extraction order: the companion library
/// first so it sits next to the wrapper before the wrapper is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSet {
  pub secondary: Option<ArtifactDescriptor>,
  pub primary: ArtifactDescriptor,
}

impl ArtifactSet {
  pub fn for_platform(os: &Os, ext: &str) -> Self {
    Self {
      secondary: secondary_artifact_name(os).map(|name| ArtifactDescriptor {
        name,
        kind: ArtifactKind::Secondary,
      }),
      primary: ArtifactDescriptor {
        name: primary_artifact_name(ext),
        kind: ArtifactKind::Primary,
      },
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = &ArtifactDescriptor> {
    self.secondary.iter().chain(std::iter::once(&self.primary))
  }
}
