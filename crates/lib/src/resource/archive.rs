use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::ZipArchive;

use crate::config::ConfigError;

use super::{ResourceBundle, ResourceLocation, ResourcePath, copy_stream};

/// Bundle whose resources are packed inside a zip archive.
///
/// The entry index is read once when the bundle is opened; entries are
/// inflated on demand, straight into the destination.
#[derive(Debug, Clone)]
pub struct ZipBundle {
  archive: PathBuf,
  /// Resource path -> entry name as stored in the archive. Some archivers
  /// write entries with a leading `/`.
  entries: HashMap<String, String>,
}

impl ZipBundle {
  pub fn open(archive: impl Into<PathBuf>) -> Result<Self, ConfigError> {
    let archive = archive.into();
    let reader = open_archive(&archive).map_err(|source| ConfigError::InvalidBundle {
      path: archive.clone(),
      source,
    })?;

    let entries: HashMap<String, String> = reader
      .file_names()
      .filter(|name| !name.ends_with('/'))
      .map(|name| (name.trim_start_matches('/').to_string(), name.to_string()))
      .collect();
    debug!(archive = %archive.display(), entries = entries.len(), "opened zip bundle");

    Ok(Self { archive, entries })
  }
}

fn open_archive(path: &Path) -> io::Result<ZipArchive<BufReader<File>>> {
  let file = File::open(path)?;
  ZipArchive::new(BufReader::new(file)).map_err(io::Error::other)
}

impl ResourceBundle for ZipBundle {
  fn describe(&self) -> String {
    format!("archive {}", self.archive.display())
  }

  fn locate(&self, path: &ResourcePath) -> Option<ResourceLocation> {
    self.entries.contains_key(path.as_str()).then_some(ResourceLocation::Packed)
  }

  fn copy_to(&self, path: &ResourcePath, out: &mut dyn Write) -> io::Result<u64> {
    let not_found = || {
      io::Error::new(
        io::ErrorKind::NotFound,
        format!("{path} not found in {}", self.archive.display()),
      )
    };

    let entry_name = self.entries.get(path.as_str()).ok_or_else(not_found)?;
    let mut reader = open_archive(&self.archive)?;
    let mut entry = match reader.by_name(entry_name) {
      Ok(entry) => entry,
      Err(zip::result::ZipError::FileNotFound) => return Err(not_found()),
      Err(e) => return Err(io::Error::other(e)),
    };
    copy_stream(&mut entry, out)
  }
}
