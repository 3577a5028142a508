//! Bundled native resources.
//!
//! Artifacts are addressed as `<NATIVES_ROOT>/<platform-key>/<artifact-name>`.
//! A bundle either exposes them as plain files (an unpacked layout) or as
//! byte streams that have to be copied out before they can be loaded.

mod archive;
mod dir;
mod embedded;

use std::fmt;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

pub use archive::ZipBundle;
pub use dir::DirBundle;
pub use embedded::EmbeddedBundle;

use crate::config::ConfigError;
use crate::consts::{COPY_BUFFER_SIZE, NATIVES_ROOT};
use crate::platform::PlatformKey;

/// Slash-separated path of a resource inside a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourcePath(String);

impl ResourcePath {
  pub fn new(platform: &PlatformKey, artifact: &str) -> Self {
    Self(format!("{NATIVES_ROOT}/{platform}/{artifact}"))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn segments(&self) -> impl Iterator<Item = &str> {
    self.0.split('/').filter(|s| !s.is_empty())
  }
}

impl fmt::Display for ResourcePath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Where a located resource lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceLocation {
  /// Already a plain file on disk; usable without copying.
  File(PathBuf),
  /// Packed inside the bundle; must be copied out through
  /// [`ResourceBundle::copy_to`].
  Packed,
}

pub trait ResourceBundle: Send + Sync {
  /// Human-readable origin of the bundle, for diagnostics.
  fn describe(&self) -> String;

  fn locate(&self, path: &ResourcePath) -> Option<ResourceLocation>;

  /// Stream the resource's bytes into `out`, returning the number copied.
  fn copy_to(&self, path: &ResourcePath, out: &mut dyn Write) -> io::Result<u64>;
}

/// Copy `input` to `output` through a fixed-size buffer until end of stream.
pub(crate) fn copy_stream(input: &mut dyn Read, output: &mut dyn Write) -> io::Result<u64> {
  let mut buffer = [0u8; COPY_BUFFER_SIZE];
  let mut total = 0u64;

  loop {
    let read = match input.read(&mut buffer) {
      Ok(0) => break,
      Ok(n) => n,
      Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
      Err(e) => return Err(e),
    };
    output.write_all(&buffer[..read])?;
    total += read as u64;
  }

  output.flush()?;
  Ok(total)
}

/// Open a bundle from disk: `.zip` files are read as archives, anything else
/// as an unpacked directory root.
pub fn open_bundle(path: &Path) -> Result<Box<dyn ResourceBundle>, ConfigError> {
  let is_zip = path
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|e| e.eq_ignore_ascii_case("zip"));

  if is_zip {
    Ok(Box::new(ZipBundle::open(path)?))
  } else {
    Ok(Box::new(DirBundle::new(path)?))
  }
}
