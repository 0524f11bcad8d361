//! Host operating system integration.

mod browser;
mod notification;

pub use browser::open_in_browser;
pub use notification::{DesktopNotifier, Notifier};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating systems ghostie ships release builds for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[serde(rename = "macos")]
    MacOs,
    Linux,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::MacOs, Platform::Linux];

    /// The platform of the running binary, `None` on anything unsupported.
    pub fn current() -> Option<Self> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a platform.
    pub fn from_os(os: &str) -> Option<Self> {
        match os {
            "macos" => Some(Platform::MacOs),
            "linux" => Some(Platform::Linux),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
        }
    }

    /// Rust target triple of the published release archive.
    pub fn target_triple(self) -> &'static str {
        match self {
            Platform::MacOs => "x86_64-apple-darwin",
            Platform::Linux => "x86_64-unknown-linux-gnu",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
