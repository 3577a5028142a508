//! Failure taxonomy of the loader.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ConfigError;

/// Opaque error reported by a native-load primitive.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum LoaderError {
  /// No shared library extension is known for the OS and no override is set.
  #[error(
    "unable to determine the shared library file extension for operating system '{os}'\n\
     Set {override_key}=<FILE-EXTENSION> (or libext.{os} in the config file)"
  )]
  PlatformUnsupported { os: String, override_key: String },

  #[error("native library not found for platform '{platform}': {resource}")]
  ArtifactNotFound { platform: String, resource: String },

  #[error("unable to extract native library {resource} to {}: {source}", dest.display())]
  ExtractionFailed {
    resource: String,
    dest: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(
    "unable to create temporary directory for native libraries in {}: {source}",
    display_parent(parent.as_deref())
  )]
  TempDirectoryCreationFailed {
    /// Configured parent directory, `None` for the system temp dir.
    parent: Option<PathBuf>,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to load native library {}: {source}", path.display())]
  NativeLoadFailed {
    path: PathBuf,
    #[source]
    source: BoxError,
  },

  #[error("native libraries have not been loaded yet")]
  NotLoaded,

  #[error(transparent)]
  Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, LoaderError>;

fn display_parent(parent: Option<&Path>) -> String {
  match parent {
    Some(path) => path.display().to_string(),
    None => format!("the system temp dir ({})", std::env::temp_dir().display()),
  }
}
