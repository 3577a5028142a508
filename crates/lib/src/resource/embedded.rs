use std::collections::HashMap;
use std::io::{self, Write};

use super::{ResourceBundle, ResourceLocation, ResourcePath, copy_stream};

/// Resources compiled into the binary, keyed by their full resource path.
///
/// ```ignore
/// let bundle = EmbeddedBundle::new()
///   .with("usbload/natives/linux-x86_64/libusbload.so", include_bytes!("../natives/libusbload.so"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmbeddedBundle {
  entries: HashMap<String, &'static [u8]>,
}

impl EmbeddedBundle {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, path: impl Into<String>, bytes: &'static [u8]) -> Self {
    self.entries.insert(path.into(), bytes);
    self
  }
}

impl ResourceBundle for EmbeddedBundle {
  fn describe(&self) -> String {
    format!("embedded bundle ({} entries)", self.entries.len())
  }

  fn locate(&self, path: &ResourcePath) -> Option<ResourceLocation> {
    self.entries.contains_key(path.as_str()).then_some(ResourceLocation::Packed)
  }

  fn copy_to(&self, path: &ResourcePath, out: &mut dyn Write) -> io::Result<u64> {
    match self.entries.get(path.as_str()) {
      Some(bytes) => copy_stream(&mut &bytes[..], out),
      None => Err(io::Error::new(io::ErrorKind::NotFound, path.to_string())),
    }
  }
}
