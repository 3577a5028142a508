use anyhow::Result;
use serde::Serialize;

use usbload_lib::LoaderConfig;
use usbload_lib::artifact::ArtifactSet;
use usbload_lib::platform::ext::{override_key, resolve_extension};
use usbload_lib::platform::{HostInfo, PlatformKey};

use crate::output::{OutputFormat, emit, field, secondary_label, unsupported};

#[derive(Serialize)]
struct InfoReport {
  host: HostInfo,
  platform: String,
  extension: Option<String>,
  override_key: String,
  artifacts: Option<ArtifactSet>,
  error: Option<String>,
}

pub fn cmd_info(config: &LoaderConfig, output: OutputFormat) -> Result<()> {
  let host = config.host();
  let platform = PlatformKey::resolve(&host);
  let override_key = override_key(&platform.os);

  let (extension, artifacts, error) = match resolve_extension(&platform.os, &config.libext) {
    Ok(ext) => {
      let artifacts = ArtifactSet::for_platform(&platform.os, &ext);
      (Some(ext), Some(artifacts), None)
    }
    Err(e) => (None, None, Some(e.to_string())),
  };

  let report = InfoReport {
    host,
    platform: platform.to_string(),
    extension,
    override_key,
    artifacts,
    error,
  };

  emit(output, &report, |report| {
    println!("System:");
    field("Platform", &report.platform);
    field("OS", format!("{} ({})", platform.os, report.host.os_name));
    field("Arch", format!("{} ({})", platform.arch, report.host.arch_name));
    field("Override", &report.override_key);

    if let (Some(ext), Some(artifacts)) = (&report.extension, &report.artifacts) {
      field("Extension", ext);
      field("Primary", &artifacts.primary.name);
      field("Secondary", secondary_label(artifacts.secondary.as_ref()));
    } else if let Some(error) = &report.error {
      unsupported(error);
    }
  })
}
