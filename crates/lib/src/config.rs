//! Loader configuration.
//!
//! Values are layered: defaults, then an optional TOML file, then the
//! environment (`USBLOAD_*`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{ENV_NATIVES, ENV_OS_ARCH, ENV_OS_NAME, ENV_TMPDIR};
use crate::platform::ext::override_key;
use crate::platform::{HostInfo, Os};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid config file '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: Box<toml::de::Error>,
  },

  #[error("native bundle not found: {0}")]
  BundleNotFound(PathBuf),

  #[error("invalid native bundle '{path}': {source}")]
  InvalidBundle {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("cannot determine default bundle location: {0}")]
  NoDefaultBundle(#[source] std::io::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
  /// Directory or `.zip` archive holding the bundled natives. Defaults to the
  /// directory of the running executable.
  pub bundle: Option<PathBuf>,
  /// Parent of the private extraction directory. Defaults to the system
  /// temporary directory.
  pub temp_parent: Option<PathBuf>,
  /// Reported OS name, replacing the detected value.
  pub os_name: Option<String>,
  /// Reported architecture name, replacing the detected value.
  pub os_arch: Option<String>,
  /// Library extension overrides keyed by OS token (e.g. `haiku = "so"`).
  pub libext: BTreeMap<String, String>,
}

impl LoaderConfig {
  pub fn from_toml_str(s: &str, origin: &Path) -> Result<Self, ConfigError> {
    toml::from_str(s).map_err(|e| ConfigError::Parse {
      path: origin.to_path_buf(),
      source: Box::new(e),
    })
  }

  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let config = Self::from_toml_str(&content, path)?;
    debug!(path = %path.display(), "loaded config file");
    Ok(config)
  }

  /// Defaults overlaid with the environment.
  pub fn from_env() -> Self {
    let mut config = Self::default();
    config.apply_env();
    config
  }

  /// Overlay `USBLOAD_*` environment variables onto this config.
  ///
  /// The extension override is read for the OS the config resolves to, after
  /// any OS name override has been applied.
  pub fn apply_env(&mut self) {
    if let Ok(path) = std::env::var(ENV_NATIVES) {
      self.bundle = Some(PathBuf::from(path));
    }
    if let Ok(path) = std::env::var(ENV_TMPDIR) {
      self.temp_parent = Some(PathBuf::from(path));
    }
    if let Ok(name) = std::env::var(ENV_OS_NAME) {
      self.os_name = Some(name);
    }
    if let Ok(arch) = std::env::var(ENV_OS_ARCH) {
      self.os_arch = Some(arch);
    }

    let os = Os::from_name(&self.host().os_name);
    let key = override_key(&os);
    if let Ok(ext) = std::env::var(&key) {
      debug!(key = %key, ext = %ext, "library extension override from environment");
      self.libext.insert(os.as_str().to_string(), ext);
    }
  }

  /// Detected host with the configured overrides applied.
  pub fn host(&self) -> HostInfo {
    let detected = HostInfo::detect();
    HostInfo {
      os_name: self.os_name.clone().unwrap_or(detected.os_name),
      arch_name: self.os_arch.clone().unwrap_or(detected.arch_name),
    }
  }

  /// The configured bundle location, or the executable's directory.
  pub fn bundle_path(&self) -> Result<PathBuf, ConfigError> {
    if let Some(path) = &self.bundle {
      return Ok(path.clone());
    }
    let exe = std::env::current_exe().map_err(ConfigError::NoDefaultBundle)?;
    exe
      .parent()
      .map(Path::to_path_buf)
      .ok_or_else(|| ConfigError::NoDefaultBundle(std::io::Error::other("executable has no parent directory")))
  }
}
