pub mod arch;
pub mod ext;
pub mod host;
pub mod os;

use std::fmt;

use serde::Serialize;
use tracing::debug;

pub use arch::Arch;
pub use host::HostInfo;
pub use os::Os;

/// Lookup key for bundled artifacts, combining OS and architecture
/// (e.g. "linux-x86_64").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PlatformKey {
  pub os: Os,
  pub arch: Arch,
}

impl PlatformKey {
  /// Resolve the key from the reported host names.
  pub fn resolve(host: &HostInfo) -> Self {
    let os = Os::from_name(&host.os_name);
    let arch = Arch::from_name(&os, &host.arch_name);
    let key = Self { os, arch };
    debug!(os_name = %host.os_name, arch_name = %host.arch_name, key = %key, "resolved platform");
    key
  }
}

impl fmt::Display for PlatformKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.os, self.arch)
  }
}
