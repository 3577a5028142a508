mod extract;
mod info;
mod load;

use std::path::Path;

use anyhow::{Context, Result};
use usbload_lib::LoaderConfig;

pub use extract::cmd_extract;
pub use info::cmd_info;
pub use load::cmd_load;

/// Config file (if any) overlaid with the environment.
pub fn load_config(path: Option<&Path>) -> Result<LoaderConfig> {
  let mut config = match path {
    Some(path) => LoaderConfig::from_file(path).context("Failed to load config")?,
    None => LoaderConfig::default(),
  };
  config.apply_env();
  Ok(config)
}
