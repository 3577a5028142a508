//! usbload-lib: locating, extracting and loading the native USB wrapper
//! libraries bundled with an application.
//!
//! - `platform`: pure resolution of the host's OS, architecture, platform key
//!   and shared library extension
//! - `artifact`: which native files a platform needs
//! - `resource`: bundles holding the prebuilt natives (directory, zip, embedded)
//! - `extract`: materializing bundled natives in a private temporary directory
//! - `loader`: the process-wide, load-once [`Loader`]

pub mod artifact;
pub mod config;
pub mod consts;
pub mod error;
pub mod extract;
pub mod loader;
pub mod platform;
pub mod resource;

pub use config::{ConfigError, LoaderConfig};
pub use error::{LoaderError, Result};
pub use loader::{Loader, NativeLoad, SystemLoad};
pub use platform::{HostInfo, PlatformKey};
