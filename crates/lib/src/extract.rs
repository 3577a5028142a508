//! Materializing bundled artifacts on disk.
//!
//! Resources that are already plain files are used in place. Packed resources
//! are copied into a private temporary directory that is created on first use
//! and shared by every later extraction. Copies are written to a scratch file
//! and renamed over the destination, so a library that is already mapped is
//! never truncated. The directory and its contents are removed when the
//! [`Extractor`] is dropped during normal shutdown; a killed process leaves
//! them behind.

use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, info, warn};

use crate::consts::TEMP_DIR_PREFIX;
use crate::error::{LoaderError, Result};
use crate::platform::PlatformKey;
use crate::resource::{ResourceBundle, ResourceLocation, ResourcePath};

#[derive(Debug, Default)]
struct ExtractState {
  dir: Option<TempDir>,
  extracted: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct Extractor {
  temp_parent: Option<PathBuf>,
  state: Mutex<ExtractState>,
}

impl Extractor {
  pub fn new(temp_parent: Option<PathBuf>) -> Self {
    Self {
      temp_parent,
      state: Mutex::new(ExtractState::default()),
    }
  }

  fn lock(&self) -> MutexGuard<'_, ExtractState> {
    self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  /// The private extraction directory, if it has been created.
  pub fn temp_dir(&self) -> Option<PathBuf> {
    self.lock().dir.as_ref().map(|d| d.path().to_path_buf())
  }

  /// Files copied out of the bundle so far.
  pub fn extracted(&self) -> Vec<PathBuf> {
    self.lock().extracted.clone()
  }

  /// Make `artifact` for `platform` available as a file and return its path.
  ///
  /// Plain files in the bundle are returned as-is. Everything else is copied
  /// into the extraction directory under its artifact name. An earlier copy
  /// is replaced by rename, never rewritten in place.
  pub fn extract_artifact(&self, bundle: &dyn ResourceBundle, platform: &PlatformKey, artifact: &str) -> Result<PathBuf> {
    let resource = ResourcePath::new(platform, artifact);

    let location = bundle.locate(&resource).ok_or_else(|| LoaderError::ArtifactNotFound {
      platform: platform.to_string(),
      resource: format!("{resource} in {}", bundle.describe()),
    })?;

    if let ResourceLocation::File(path) = location {
      debug!(resource = %resource, path = %path.display(), "using unpacked native library in place");
      return Ok(path);
    }

    // Held across the copy so concurrent extractions neither race to create
    // the directory nor interleave writes to the same file.
    let mut state = self.lock();
    let dir = match &state.dir {
      Some(dir) => dir.path().to_path_buf(),
      None => {
        let dir = self.create_temp_dir()?;
        let path = dir.path().to_path_buf();
        state.dir = Some(dir);
        path
      }
    };

    let dest = dir.join(artifact);
    let extraction_failed = |source: io::Error| LoaderError::ExtractionFailed {
      resource: resource.to_string(),
      dest: dest.clone(),
      source,
    };

    let mut scratch = NamedTempFile::new_in(&dir).map_err(extraction_failed)?;
    let bytes = bundle
      .copy_to(&resource, scratch.as_file_mut())
      .map_err(extraction_failed)?;
    scratch.persist(&dest).map_err(|e| extraction_failed(e.error))?;
    info!(resource = %resource, dest = %dest.display(), bytes, "extracted native library");

    if !state.extracted.contains(&dest) {
      state.extracted.push(dest.clone());
    }
    Ok(dest)
  }

  fn create_temp_dir(&self) -> Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(TEMP_DIR_PREFIX);
    let dir = match &self.temp_parent {
      Some(parent) => builder.tempdir_in(parent),
      None => builder.tempdir(),
    }
    .map_err(|source| LoaderError::TempDirectoryCreationFailed {
      parent: self.temp_parent.clone(),
      source,
    })?;

    debug!(path = %dir.path().display(), "created native library directory");
    Ok(dir)
  }

  /// Remove extracted files and the extraction directory now.
  ///
  /// Failures are logged and otherwise ignored; a later extraction creates a
  /// fresh directory.
  pub fn cleanup(&self) {
    let mut state = self.lock();
    for file in state.extracted.drain(..) {
      if let Err(e) = std::fs::remove_file(&file)
        && e.kind() != io::ErrorKind::NotFound
      {
        warn!(path = %file.display(), error = %e, "failed to remove extracted native library");
      }
    }
    if let Some(dir) = state.dir.take() {
      let path = dir.path().to_path_buf();
      if let Err(e) = dir.close() {
        warn!(path = %path.display(), error = %e, "failed to remove native library directory");
      }
    }
  }
}

impl Drop for Extractor {
  fn drop(&mut self) {
    self.cleanup();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::HostInfo;
  use crate::resource::{DirBundle, EmbeddedBundle};
  use std::fs;
  use std::io::{Read, Write};
  use std::path::Path;
  use tracing_test::traced_test;

  const LINUX_LIB: &str = "usbload/natives/linux-x86_64/libusbload.so";

  fn linux() -> PlatformKey {
    PlatformKey::resolve(&HostInfo::new("Linux", "amd64"))
  }

  /// Reader that fails after the first chunk.
  struct FailingReader(bool);

  impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
      if self.0 {
        return Err(io::Error::other("disk on fire"));
      }
      self.0 = true;
      buf[0] = 0x7f;
      Ok(1)
    }
  }

  struct BrokenBundle;

  impl ResourceBundle for BrokenBundle {
    fn describe(&self) -> String {
      "broken".into()
    }

    fn locate(&self, _: &ResourcePath) -> Option<ResourceLocation> {
      Some(ResourceLocation::Packed)
    }

    fn copy_to(&self, _: &ResourcePath, out: &mut dyn Write) -> io::Result<u64> {
      crate::resource::copy_stream(&mut FailingReader(false), out)
    }
  }

  #[test]
  fn packed_resource_copied_into_temp_dir() {
    let scratch = tempfile::tempdir().unwrap();
    let bundle = EmbeddedBundle::new().with(LINUX_LIB, b"\x7fELF-wrapper");
    let extractor = Extractor::new(Some(scratch.path().to_path_buf()));

    let path = extractor.extract_artifact(&bundle, &linux(), "libusbload.so").unwrap();

    assert_eq!(path.file_name().unwrap(), "libusbload.so");
    assert_eq!(path.parent().map(Path::to_path_buf), extractor.temp_dir());
    assert!(path.starts_with(scratch.path()));
    assert_eq!(fs::read(&path).unwrap(), b"\x7fELF-wrapper");
  }

  #[test]
  fn extraction_is_idempotent() {
    let scratch = tempfile::tempdir().unwrap();
    let bundle = EmbeddedBundle::new().with(LINUX_LIB, b"lib");
    let extractor = Extractor::new(Some(scratch.path().to_path_buf()));

    let first = extractor.extract_artifact(&bundle, &linux(), "libusbload.so").unwrap();
    let second = extractor.extract_artifact(&bundle, &linux(), "libusbload.so").unwrap();

    assert_eq!(first, second);
    assert_eq!(extractor.extracted(), vec![first]);
  }

  #[test]
  fn temp_dir_shared_between_artifacts() {
    let scratch = tempfile::tempdir().unwrap();
    let bundle = EmbeddedBundle::new()
      .with("usbload/natives/windows-x86_64/libusb0.dll", b"a")
      .with("usbload/natives/windows-x86_64/libusbload.dll", b"b");
    let extractor = Extractor::new(Some(scratch.path().to_path_buf()));
    let windows = PlatformKey::resolve(&HostInfo::new("Windows 10", "amd64"));

    let dep = extractor.extract_artifact(&bundle, &windows, "libusb0.dll").unwrap();
    let lib = extractor.extract_artifact(&bundle, &windows, "libusbload.dll").unwrap();

    assert_eq!(dep.parent(), lib.parent());
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 1);
  }

  #[test]
  fn plain_file_used_in_place() {
    let root = tempfile::tempdir().unwrap();
    let lib_dir = root.path().join("usbload/natives/linux-x86_64");
    fs::create_dir_all(&lib_dir).unwrap();
    fs::write(lib_dir.join("libusbload.so"), b"lib").unwrap();

    let bundle = DirBundle::new(root.path()).unwrap();
    let extractor = Extractor::default();
    let path = extractor.extract_artifact(&bundle, &linux(), "libusbload.so").unwrap();

    assert_eq!(path, dunce::canonicalize(lib_dir.join("libusbload.so")).unwrap());
    assert_eq!(extractor.temp_dir(), None);
  }

  #[test]
  fn missing_artifact_writes_nothing() {
    let scratch = tempfile::tempdir().unwrap();
    let extractor = Extractor::new(Some(scratch.path().to_path_buf()));

    let err = extractor
      .extract_artifact(&EmbeddedBundle::new(), &linux(), "libusbload.so")
      .unwrap_err();

    match err {
      LoaderError::ArtifactNotFound { platform, resource } => {
        assert_eq!(platform, "linux-x86_64");
        assert!(resource.contains(LINUX_LIB));
      }
      other => panic!("unexpected error: {other}"),
    }
    assert_eq!(extractor.temp_dir(), None);
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
  }

  #[test]
  fn copy_failure_wraps_io_error() {
    let scratch = tempfile::tempdir().unwrap();
    let extractor = Extractor::new(Some(scratch.path().to_path_buf()));

    let err = extractor
      .extract_artifact(&BrokenBundle, &linux(), "libusbload.so")
      .unwrap_err();

    match err {
      LoaderError::ExtractionFailed { resource, dest, source } => {
        assert_eq!(resource, LINUX_LIB);
        assert_eq!(dest.file_name().unwrap(), "libusbload.so");
        assert_eq!(source.to_string(), "disk on fire");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn unusable_temp_parent_reported() {
    let scratch = tempfile::tempdir().unwrap();
    let not_a_dir = scratch.path().join("file");
    fs::write(&not_a_dir, b"").unwrap();

    let bundle = EmbeddedBundle::new().with(LINUX_LIB, b"lib");
    let extractor = Extractor::new(Some(not_a_dir.clone()));
    let err = extractor.extract_artifact(&bundle, &linux(), "libusbload.so").unwrap_err();
    match err {
      LoaderError::TempDirectoryCreationFailed { parent, .. } => {
        assert_eq!(parent.as_deref(), Some(not_a_dir.as_path()));
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn drop_removes_extracted_files() {
    let scratch = tempfile::tempdir().unwrap();
    let bundle = EmbeddedBundle::new().with(LINUX_LIB, b"lib");

    let (path, dir) = {
      let extractor = Extractor::new(Some(scratch.path().to_path_buf()));
      let path = extractor.extract_artifact(&bundle, &linux(), "libusbload.so").unwrap();
      (path, extractor.temp_dir().unwrap())
    };

    assert!(!path.exists());
    assert!(!dir.exists());
  }

  #[test]
  #[traced_test]
  fn logs_extraction() {
    let scratch = tempfile::tempdir().unwrap();
    let bundle = EmbeddedBundle::new().with(LINUX_LIB, b"lib");
    let extractor = Extractor::new(Some(scratch.path().to_path_buf()));

    extractor.extract_artifact(&bundle, &linux(), "libusbload.so").unwrap();
    assert!(logs_contain("extracted native library"));
  }

  #[test]
  fn failed_copy_leaves_no_partial_file() {
    let scratch = tempfile::tempdir().unwrap();
    let extractor = Extractor::new(Some(scratch.path().to_path_buf()));

    extractor
      .extract_artifact(&BrokenBundle, &linux(), "libusbload.so")
      .unwrap_err();

    let dir = extractor.temp_dir().unwrap();
    assert_eq!(fs::read_dir(dir).unwrap().count(), 0);
    assert!(extractor.extracted().is_empty());
  }

  #[test]
  fn zip_entries_with_leading_slash_extract() {
    let scratch = tempfile::tempdir().unwrap();
    let archive = scratch.path().join("natives.zip");
    let mut writer = zip::ZipWriter::new(fs::File::create(&archive).unwrap());
    writer
      .start_file(format!("/{LINUX_LIB}"), zip::write::SimpleFileOptions::default())
      .unwrap();
    writer.write_all(b"rooted").unwrap();
    writer.finish().unwrap();

    let bundle = crate::resource::ZipBundle::open(&archive).unwrap();
    let extractor = Extractor::new(Some(scratch.path().to_path_buf()));
    let path = extractor.extract_artifact(&bundle, &linux(), "libusbload.so").unwrap();

    assert_eq!(fs::read(path).unwrap(), b"rooted");
  }

  #[cfg(unix)]
  #[test]
  fn reextraction_replaces_file_instead_of_truncating() {
    use std::os::unix::fs::MetadataExt;

    let scratch = tempfile::tempdir().unwrap();
    let bundle = EmbeddedBundle::new().with(LINUX_LIB, b"wrapper");
    let extractor = Extractor::new(Some(scratch.path().to_path_buf()));

    let first = extractor.extract_artifact(&bundle, &linux(), "libusbload.so").unwrap();
    // Stands in for the mapping held by the platform loader.
    let mut held = fs::File::open(&first).unwrap();
    let first_inode = fs::metadata(&first).unwrap().ino();

    let second = extractor.extract_artifact(&bundle, &linux(), "libusbload.so").unwrap();

    assert_eq!(first, second);
    assert_ne!(fs::metadata(&second).unwrap().ino(), first_inode);
    let mut original = Vec::new();
    held.read_to_end(&mut original).unwrap();
    assert_eq!(original, b"wrapper");
  }
}
