use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;

use usbload_lib::{Loader, LoaderConfig};

use crate::output::{OutputFormat, emit, extraction_summary, field, library_label, ready};

#[derive(Serialize)]
struct ExtractReport {
  platform: String,
  bundle: String,
  primary: PathBuf,
  extracted: Vec<PathBuf>,
}

/// Materialize the natives for this platform.
///
/// Extracted copies live in a private temporary directory that is removed
/// when the command exits; unpacked bundles are reported in place.
pub fn cmd_extract(mut config: LoaderConfig, bundle: Option<PathBuf>, output: OutputFormat) -> Result<()> {
  if bundle.is_some() {
    config.bundle = bundle;
  }

  let start = Instant::now();
  let loader = Loader::from_config(&config).context("Failed to open native bundle")?;
  let primary = loader.prepare_artifacts().context("Failed to extract native libraries")?;

  let report = ExtractReport {
    platform: loader.platform().to_string(),
    bundle: loader.bundle().describe(),
    primary,
    extracted: loader.extractor().extracted(),
  };

  let elapsed = start.elapsed();
  emit(output, &report, |report| {
    ready("Native libraries ready");
    field("Platform", &report.platform);
    field("Bundle", &report.bundle);
    field("Primary", library_label(&report.primary));
    field("Took", format!("{elapsed:.1?}"));
    println!("{}", extraction_summary(&report.extracted));
  })
}
