//! Fixed names shared across the crate.

pub const APP_NAME: &str = "usbload";

/// Root of the bundled resource namespace. Artifacts live under
/// `<NATIVES_ROOT>/<platform-key>/<artifact-name>`.
pub const NATIVES_ROOT: &str = "usbload/natives";

/// File stem of the wrapper library that is always required.
pub const WRAPPER_LIB_STEM: &str = "libusbload";

/// Prefix of the private extraction directory.
pub const TEMP_DIR_PREFIX: &str = "usbload";

pub const COPY_BUFFER_SIZE: usize = 8192;

pub const ENV_NATIVES: &str = "USBLOAD_NATIVES";
pub const ENV_TMPDIR: &str = "USBLOAD_TMPDIR";
pub const ENV_OS_NAME: &str = "USBLOAD_OS_NAME";
pub const ENV_OS_ARCH: &str = "USBLOAD_OS_ARCH";
pub const ENV_LIBEXT_PREFIX: &str = "USBLOAD_LIBEXT_";
