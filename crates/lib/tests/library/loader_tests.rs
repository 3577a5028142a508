//! End-to-end loader scenarios over on-disk bundles.

use std::fs;

use tempfile::TempDir;
use usbload_lib::artifact::{ArtifactKind, ArtifactSet};
use usbload_lib::platform::ext::resolve_extension;
use usbload_lib::resource::open_bundle;
use usbload_lib::{HostInfo, Loader, LoaderError, PlatformKey};

use super::common::{CountingLoad, config, write_zip};

#[test]
fn windows_amd64_scenario() {
  let key = PlatformKey::resolve(&HostInfo::new("Windows 10", "amd64"));
  assert_eq!(key.to_string(), "windows-x86_64");

  let ext = resolve_extension(&key.os, &Default::default()).unwrap();
  assert_eq!(ext, "dll");

  let set = ArtifactSet::for_platform(&key.os, &ext);
  assert_eq!(set.primary.name, "libusbload.dll");
  let secondary = set.secondary.unwrap();
  assert_eq!(secondary.name, "libusb0.dll");
  assert_eq!(secondary.kind, ArtifactKind::Secondary);
}

#[test]
fn linux_i386_scenario() {
  let key = PlatformKey::resolve(&HostInfo::new("Linux", "i386"));
  assert_eq!(key.to_string(), "linux-x86");

  let ext = resolve_extension(&key.os, &Default::default()).unwrap();
  assert_eq!(ext, "so");
  assert_eq!(ArtifactSet::for_platform(&key.os, &ext).secondary, None);
}

#[test]
fn unpacked_directory_loads_in_place() {
  let bundle_dir = TempDir::new().unwrap();
  let temp = TempDir::new().unwrap();
  let lib_dir = bundle_dir.path().join("usbload/natives/linux-x86_64");
  fs::create_dir_all(&lib_dir).unwrap();
  fs::write(lib_dir.join("libusbload.so"), b"lib").unwrap();

  let config = config("Linux", "amd64", bundle_dir.path(), temp.path());
  let native = CountingLoad::default();
  let loader = Loader::with_parts(&config, open_bundle(bundle_dir.path()).unwrap(), native.clone());

  loader.load().unwrap();
  loader.load().unwrap();

  assert_eq!(native.calls(), 1);
  assert!(loader.loaded_path().unwrap().starts_with(dunce::canonicalize(bundle_dir.path()).unwrap()));
  assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn zip_bundle_extracts_side_by_side() {
  let scratch = TempDir::new().unwrap();
  let temp = TempDir::new().unwrap();
  let archive = scratch.path().join("natives.zip");
  write_zip(
    &archive,
    &[
      ("usbload/natives/macosx-universal/libusb.dylib", &b"dep"[..]),
      ("usbload/natives/macosx-universal/libusbload.dylib", &b"lib"[..]),
    ],
  );

  let config = config("Mac OS X", "aarch64", &archive, temp.path());
  let loader = Loader::with_parts(&config, open_bundle(&archive).unwrap(), CountingLoad::default());

  loader.load().unwrap();

  let primary = loader.loaded_path().unwrap();
  assert!(primary.starts_with(temp.path()));
  assert_eq!(fs::read(&primary).unwrap(), b"lib");
  assert_eq!(fs::read(primary.with_file_name("libusb.dylib")).unwrap(), b"dep");

  drop(loader);
  assert!(!primary.exists());
}

#[test]
fn from_config_reports_missing_artifact() {
  let bundle_dir = TempDir::new().unwrap();
  let temp = TempDir::new().unwrap();
  let config = config("Linux", "amd64", bundle_dir.path(), temp.path());

  let loader = Loader::from_config(&config).unwrap();
  let err = loader.load().unwrap_err();

  assert!(matches!(err, LoaderError::ArtifactNotFound { .. }));
  assert!(err.to_string().contains("usbload/natives/linux-x86_64/libusbload.so"));
  assert!(!loader.is_loaded());
}

#[test]
fn from_config_rejects_missing_bundle() {
  let temp = TempDir::new().unwrap();
  let config = config("Linux", "amd64", &temp.path().join("missing"), temp.path());

  assert!(matches!(Loader::from_config(&config), Err(LoaderError::Config(_))));
}

#[test]
fn zip_entries_stored_with_leading_slash_load() {
  let scratch = TempDir::new().unwrap();
  let temp = TempDir::new().unwrap();
  let archive = scratch.path().join("natives.zip");
  write_zip(&archive, &[("/usbload/natives/linux-x86/libusbload.so", &b"rooted"[..])]);

  let config = config("Linux", "i386", &archive, temp.path());
  let native = CountingLoad::default();
  let loader = Loader::with_parts(&config, open_bundle(&archive).unwrap(), native.clone());

  loader.load().unwrap();

  assert_eq!(native.calls(), 1);
  assert_eq!(fs::read(loader.loaded_path().unwrap()).unwrap(), b"rooted");
}
