//! Release metadata for distributing ghostie as a pre-built binary, and the tooling
//! that verifies and installs those archives.

pub mod checksum;
pub mod formula;
pub mod install;

pub use formula::{Formula, FormulaIssue, PlatformAsset};
pub use install::{default_bin_dir, Installer};

use thiserror::Error;

use crate::platform::Platform;

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("no release archive is published for '{os}'")]
    UnsupportedPlatform { os: String },

    #[error("more than one release archive is declared for '{platform}'")]
    AmbiguousPlatform { platform: Platform },

    #[error("invalid sha256 checksum '{value}': {reason}")]
    InvalidChecksum { value: String, reason: String },

    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("failed to download {url}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("download of {url} failed with status {status}")]
    DownloadStatus {
        url: String,
        status: reqwest::StatusCode,
    },
}
