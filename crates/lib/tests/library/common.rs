//! Shared fixtures for the library integration tests.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use usbload_lib::error::BoxError;
use usbload_lib::{LoaderConfig, NativeLoad};
use zip::write::SimpleFileOptions;

/// Native primitive that only counts calls.
#[derive(Clone, Default)]
pub struct CountingLoad(Arc<AtomicUsize>);

impl CountingLoad {
  pub fn calls(&self) -> usize {
    self.0.load(Ordering::SeqCst)
  }
}

impl NativeLoad for CountingLoad {
  type Handle = ();

  fn load(&self, path: &Path) -> Result<(), BoxError> {
    assert!(path.is_file());
    self.0.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }
}

pub fn config(os: &str, arch: &str, bundle: &Path, temp: &Path) -> LoaderConfig {
  LoaderConfig {
    bundle: Some(bundle.to_path_buf()),
    temp_parent: Some(temp.to_path_buf()),
    os_name: Some(os.into()),
    os_arch: Some(arch.into()),
    ..Default::default()
  }
}

pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
  let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
  for (name, data) in entries {
    writer.start_file(*name, SimpleFileOptions::default()).unwrap();
    writer.write_all(data).unwrap();
  }
  writer.finish().unwrap();
}
