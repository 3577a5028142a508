use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use usbload_lib::{Loader, LoaderConfig};

use crate::output::{OutputFormat, emit, field, library_label, ready};

#[derive(Serialize)]
struct LoadReport {
  platform: String,
  path: Option<PathBuf>,
  loaded: bool,
}

pub fn cmd_load(mut config: LoaderConfig, bundle: Option<PathBuf>, output: OutputFormat) -> Result<()> {
  if bundle.is_some() {
    config.bundle = bundle;
  }

  let start = Instant::now();
  let loader = Loader::from_config(&config).context("Failed to open native bundle")?;
  loader.load().context("Failed to load native libraries")?;
  let elapsed = start.elapsed();

  // Second call is a no-op once loaded.
  loader.load().context("Failed to load native libraries")?;
  info!("repeated load was a no-op");

  let report = LoadReport {
    platform: loader.platform().to_string(),
    path: loader.loaded_path(),
    loaded: loader.is_loaded(),
  };

  emit(output, &report, |report| {
    ready("Native libraries loaded");
    field("Platform", &report.platform);
    if let Some(path) = &report.path {
      field("Library", library_label(path));
    }
    field("Took", format!("{elapsed:.1?}"));
  })
}
