use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::config::ConfigError;

use super::{ResourceBundle, ResourceLocation, ResourcePath, copy_stream};

/// Unpacked bundle rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct DirBundle {
  root: PathBuf,
}

impl DirBundle {
  pub fn new(root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
    let root = root.into();
    if !root.is_dir() {
      return Err(ConfigError::BundleNotFound(root));
    }
    Ok(Self { root })
  }

  fn resolve(&self, path: &ResourcePath) -> PathBuf {
    path.segments().fold(self.root.clone(), |acc, seg| acc.join(seg))
  }
}

impl ResourceBundle for DirBundle {
  fn describe(&self) -> String {
    format!("directory {}", self.root.display())
  }

  fn locate(&self, path: &ResourcePath) -> Option<ResourceLocation> {
    let file = self.resolve(path);
    if !file.is_file() {
      return None;
    }
    let absolute = dunce::canonicalize(&file)
      .or_else(|_| std::path::absolute(&file))
      .unwrap_or(file);
    Some(ResourceLocation::File(absolute))
  }

  fn copy_to(&self, path: &ResourcePath, out: &mut dyn Write) -> io::Result<u64> {
    let mut file = File::open(self.resolve(path))?;
    copy_stream(&mut file, out)
  }
}
