//! One-time, process-wide loading of the bundled native libraries.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use crate::artifact::ArtifactSet;
use crate::config::LoaderConfig;
use crate::error::{BoxError, LoaderError, Result};
use crate::extract::Extractor;
use crate::platform::PlatformKey;
use crate::platform::ext::resolve_extension;
use crate::resource::{ResourceBundle, open_bundle};

/// The host's mechanism for mapping a native library into the process.
pub trait NativeLoad: Send + Sync {
  /// Proof that a library was mapped, handed out to native collaborators.
  type Handle: Clone + Send + Sync + 'static;

  fn load(&self, path: &Path) -> std::result::Result<Self::Handle, BoxError>;
}

/// Dynamic loading through the platform loader (`dlopen` / `LoadLibrary`).
///
/// Libraries are never unloaded; the handle stays valid for the life of the
/// process, like any library mapped at startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLoad;

impl NativeLoad for SystemLoad {
  type Handle = &'static libloading::Library;

  fn load(&self, path: &Path) -> std::result::Result<Self::Handle, BoxError> {
    // SAFETY: loading runs the library's initializers. The bundled natives are
    // trusted artifacts shipped with this crate's consumer.
    let library = unsafe { libloading::Library::new(path) }?;
    Ok(Box::leak(Box::new(library)))
  }
}

#[derive(Debug)]
enum LoadState<H> {
  NotLoaded,
  Loaded { path: PathBuf, handle: H },
}

/// Owner of the native load state.
///
/// Construct one at startup and share it by reference; [`Loader::load`] may be
/// called from any thread and maps the libraries at most once.
pub struct Loader<L: NativeLoad = SystemLoad> {
  platform: PlatformKey,
  libext: BTreeMap<String, String>,
  bundle: Box<dyn ResourceBundle>,
  native: L,
  state: Mutex<LoadState<L::Handle>>,
  // Dropped last so nothing is removed while the state still refers to it.
  extractor: Extractor,
}

impl Loader<SystemLoad> {
  /// Loader for the real host, reading the bundle named by `config`.
  pub fn from_config(config: &LoaderConfig) -> Result<Self> {
    let bundle = open_bundle(&config.bundle_path()?)?;
    Ok(Self::with_parts(config, bundle, SystemLoad))
  }
}

impl<L: NativeLoad> Loader<L> {
  pub fn with_parts(config: &LoaderConfig, bundle: Box<dyn ResourceBundle>, native: L) -> Self {
    let platform = PlatformKey::resolve(&config.host());
    debug!(platform = %platform, bundle = %bundle.describe(), "created native loader");
    Self {
      platform,
      libext: config.libext.clone(),
      bundle,
      native,
      state: Mutex::new(LoadState::NotLoaded),
      extractor: Extractor::new(config.temp_parent.clone()),
    }
  }

  fn lock(&self) -> MutexGuard<'_, LoadState<L::Handle>> {
    self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  pub fn platform(&self) -> &PlatformKey {
    &self.platform
  }

  pub fn bundle(&self) -> &dyn ResourceBundle {
    self.bundle.as_ref()
  }

  pub fn extractor(&self) -> &Extractor {
    &self.extractor
  }

  /// Shared library extension for this platform.
  pub fn extension(&self) -> Result<String> {
    resolve_extension(&self.platform.os, &self.libext)
  }

  pub fn artifacts(&self) -> Result<ArtifactSet> {
    Ok(ArtifactSet::for_platform(&self.platform.os, &self.extension()?))
  }

  pub fn extract_artifact(&self, artifact: &str) -> Result<PathBuf> {
    self
      .extractor
      .extract_artifact(self.bundle.as_ref(), &self.platform, artifact)
  }

  /// Materialize every artifact for this platform and return the path of the
  /// wrapper library.
  ///
  /// The companion library goes first so it sits in the same directory as the
  /// wrapper, where the platform loader resolves dependencies from.
  pub fn prepare_artifacts(&self) -> Result<PathBuf> {
    let artifacts = self.artifacts()?;
    if let Some(secondary) = &artifacts.secondary {
      self.extract_artifact(&secondary.name)?;
    }
    self.extract_artifact(&artifacts.primary.name)
  }

  /// Load the native libraries unless that already succeeded.
  ///
  /// A failed attempt leaves the loader unloaded, so calling again retries
  /// extraction and loading from scratch.
  pub fn load(&self) -> Result<()> {
    let mut state = self.lock();
    if let LoadState::Loaded { path, .. } = &*state {
      debug!(path = %path.display(), "native libraries already loaded");
      return Ok(());
    }

    let path = self.prepare_artifacts()?;
    let handle = self
      .native
      .load(&path)
      .map_err(|source| LoaderError::NativeLoadFailed {
        path: path.clone(),
        source,
      })?;

    info!(platform = %self.platform, path = %path.display(), "loaded native libraries");
    *state = LoadState::Loaded { path, handle };
    Ok(())
  }

  pub fn is_loaded(&self) -> bool {
    matches!(*self.lock(), LoadState::Loaded { .. })
  }

  /// Path the wrapper library was loaded from.
  pub fn loaded_path(&self) -> Option<PathBuf> {
    match &*self.lock() {
      LoadState::Loaded { path, .. } => Some(path.clone()),
      LoadState::NotLoaded => None,
    }
  }

  /// Handle to the loaded wrapper library. Native calls are only valid once
  /// this succeeds.
  pub fn handle(&self) -> Result<L::Handle> {
    match &*self.lock() {
      LoadState::Loaded { handle, .. } => Ok(handle.clone()),
      LoadState::NotLoaded => Err(LoaderError::NotLoaded),
    }
  }
}
