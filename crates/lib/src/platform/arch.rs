use std::fmt;

use serde::Serialize;

use super::os::{Os, strip_spaces};

/// CPU architecture token used in platform keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Arch {
  X86,
  X86_64,
  /// macOS artifacts are fat binaries covering every architecture.
  Universal,
  Other(String),
}

impl Arch {
  /// Resolve a host-reported architecture name for the given OS.
  ///
  /// The `i386` and `amd64` aliases are matched exactly as reported.
  pub fn from_name(os: &Os, name: &str) -> Self {
    if *os == Os::MacOsX {
      return Self::Universal;
    }
    match name {
      "i386" => Self::X86,
      "amd64" => Self::X86_64,
      other => match strip_spaces(&other.to_lowercase()).as_str() {
        "x86" => Self::X86,
        "x86_64" => Self::X86_64,
        normalized => Self::Other(normalized.to_string()),
      },
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Self::X86 => "x86",
      Self::X86_64 => "x86_64",
      Self::Universal => "universal",
      Self::Other(name) => name,
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl From<Arch> for String {
  fn from(arch: Arch) -> Self {
    arch.as_str().to_string()
  }
}
