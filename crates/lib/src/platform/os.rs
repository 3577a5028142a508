use std::fmt;

use serde::Serialize;

/// Canonical operating system token used in platform keys.
///
/// Unknown systems keep their normalized name so they still produce a
/// usable, if unofficial, key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Os {
  Linux,
  FreeBsd,
  SunOs,
  Windows,
  MacOsX,
  Other(String),
}

impl Os {
  /// Resolve a host-reported OS name (e.g. "Windows 10", "Mac OS X").
  ///
  /// Anything containing "windows" in any letter case maps to [`Os::Windows`];
  /// everything else is lower-cased with spaces removed.
  pub fn from_name(name: &str) -> Self {
    let lower = name.to_lowercase();
    if lower.contains("windows") {
      return Self::Windows;
    }
    match strip_spaces(&lower).as_str() {
      "linux" => Self::Linux,
      "freebsd" => Self::FreeBsd,
      "sunos" => Self::SunOs,
      "macosx" => Self::MacOsX,
      other => Self::Other(other.to_string()),
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Self::Linux => "linux",
      Self::FreeBsd => "freebsd",
      Self::SunOs => "sunos",
      Self::Windows => "windows",
      Self::MacOsX => "macosx",
      Self::Other(name) => name,
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl From<Os> for String {
  fn from(os: Os) -> Self {
    os.as_str().to_string()
  }
}

pub(crate) fn strip_spaces(s: &str) -> String {
  s.chars().filter(|c| *c != ' ').collect()
}
