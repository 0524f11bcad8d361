use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;
use url::Url;

use super::checksum::parse_sha256;
use super::ReleaseError;
use crate::platform::Platform;
use crate::shell::Shell;

const CAVEATS: &str = "ONE MORE STEP!\n\
Add the following to the end of your ~/.bashrc, ~/.zshrc, or ~/.config/fish/config.fish file.";

const GHOSTIE_VERSION: &str = "v0.1.0";
const GHOSTIE_HOMEPAGE: &str = "https://github.com/attriaayush/ghostie";
const GHOSTIE_MACOS_SHA256: &str =
    "eb1fcc3eafb4588dc0c62fda6134b808bccca57e428dd6d1194ddfce05a6e5d7";
const GHOSTIE_LINUX_SHA256: &str =
    "d2bfea37c323d492406f749a7a3f7f803fa05a4ed603caab79bab3f97855a667";

/// A pre-built release archive for one operating system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformAsset {
    pub platform: Platform,
    pub url: String,
    pub sha256: String,
}

/// Release metadata: what to download for each platform and what to install from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    pub name: String,
    pub desc: String,
    pub version: String,
    pub homepage: String,
    pub license: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Executable installed from the archive.
    pub binary: String,
    #[serde(rename = "asset", default)]
    pub assets: Vec<PlatformAsset>,
}

/// One problem found by [`Formula::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaIssue {
    pub field: String,
    pub message: String,
}

impl FormulaIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FormulaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Download URL of a GitHub release archive built for `platform`.
pub fn release_url(homepage: &str, name: &str, version: &str, platform: Platform) -> String {
    format!(
        "{}/releases/download/{version}/{name}-{version}-{}.tar.gz",
        homepage.trim_end_matches('/'),
        platform.target_triple()
    )
}

impl Formula {
    /// The formula published for this release of ghostie.
    pub fn ghostie() -> Self {
        let asset = |platform, sha256: &str| PlatformAsset {
            platform,
            url: release_url(GHOSTIE_HOMEPAGE, "ghostie", GHOSTIE_VERSION, platform),
            sha256: sha256.to_string(),
        };

        Self {
            name: "ghostie".to_string(),
            desc: "Github notifications in your terminal".to_string(),
            version: GHOSTIE_VERSION.to_string(),
            homepage: GHOSTIE_HOMEPAGE.to_string(),
            license: "MIT".to_string(),
            depends_on: vec!["sqlite".to_string()],
            binary: "ghostie".to_string(),
            assets: vec![
                asset(Platform::MacOs, GHOSTIE_MACOS_SHA256),
                asset(Platform::Linux, GHOSTIE_LINUX_SHA256),
            ],
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read formula file {:?}", path))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse formula file {:?}", path))
    }

    /// Select the archive for `platform`. Exactly one asset must match.
    pub fn asset_for(&self, platform: Platform) -> Result<&PlatformAsset, ReleaseError> {
        let mut matching = self.assets.iter().filter(|asset| asset.platform == platform);
        let asset = matching
            .next()
            .ok_or_else(|| ReleaseError::UnsupportedPlatform {
                os: platform.to_string(),
            })?;
        if matching.next().is_some() {
            return Err(ReleaseError::AmbiguousPlatform { platform });
        }
        Ok(asset)
    }

    pub fn asset_for_host(&self) -> Result<&PlatformAsset, ReleaseError> {
        let platform = Platform::current().ok_or_else(|| ReleaseError::UnsupportedPlatform {
            os: std::env::consts::OS.to_string(),
        })?;
        self.asset_for(platform)
    }

    /// The post-install message with the integration lines for the user's shell,
    /// bash when `$SHELL` names none ghostie knows.
    pub fn caveats(&self) -> String {
        self.caveats_for(Shell::detect().unwrap_or(Shell::Bash))
    }

    /// Post-install message followed by the integration lines for `shell`.
    pub fn caveats_for(&self, shell: Shell) -> String {
        format!("{CAVEATS}\n\n{}", shell.snippet())
    }

    /// Check the metadata for mistakes a release would otherwise only reveal at install time.
    pub fn validate(&self) -> Vec<FormulaIssue> {
        let mut issues = Vec::new();

        if self.name.trim().is_empty() {
            issues.push(FormulaIssue::new("name", "must not be empty"));
        }
        if self.version.trim().is_empty() {
            issues.push(FormulaIssue::new("version", "must not be empty"));
        }
        if self.binary.trim().is_empty() || self.binary.contains('/') {
            issues.push(FormulaIssue::new(
                "binary",
                "must be a plain executable name",
            ));
        }
        if let Err(message) = check_http_url(&self.homepage) {
            issues.push(FormulaIssue::new("homepage", message));
        }
        if self.assets.is_empty() {
            issues.push(FormulaIssue::new("asset", "no platform archives declared"));
        }

        for asset in &self.assets {
            let field = format!("asset.{}", asset.platform);

            if let Err(err) = parse_sha256(&asset.sha256) {
                issues.push(FormulaIssue::new(format!("{field}.sha256"), err.to_string()));
            }
            if let Err(message) = check_http_url(&asset.url) {
                issues.push(FormulaIssue::new(format!("{field}.url"), message));
            }
            if !self.version.trim().is_empty() && !asset.url.contains(&self.version) {
                issues.push(FormulaIssue::new(
                    format!("{field}.url"),
                    format!("does not embed version '{}'", self.version),
                ));
            }
        }

        for platform in Platform::ALL {
            if let Err(err @ ReleaseError::AmbiguousPlatform { .. }) = self.asset_for(platform) {
                issues.push(FormulaIssue::new(format!("asset.{platform}"), err.to_string()));
            }
        }

        issues
    }

    /// Render the metadata as a Homebrew formula.
    pub fn to_homebrew(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "class {} < Formula", class_name(&self.name));
        let _ = writeln!(out, "  desc {}", ruby_string(&self.desc));
        let _ = writeln!(out, "  version {}", ruby_string(&self.version));
        let _ = writeln!(out, "  homepage {}", ruby_string(&self.homepage));
        let _ = writeln!(out, "  license {}", ruby_string(&self.license));

        if !self.depends_on.is_empty() {
            out.push('\n');
            for dependency in &self.depends_on {
                let _ = writeln!(out, "  depends_on {}", ruby_string(dependency));
            }
        }

        for asset in &self.assets {
            let block = match asset.platform {
                Platform::MacOs => "on_macos",
                Platform::Linux => "on_linux",
            };
            let url = if self.version.is_empty() {
                ruby_string(&asset.url)
            } else {
                ruby_string(&asset.url).replace(&self.version, "#{version}")
            };
            out.push('\n');
            let _ = writeln!(out, "  {block} do");
            let _ = writeln!(out, "    url {url}");
            let _ = writeln!(out, "    sha256 {}", ruby_string(&asset.sha256));
            let _ = writeln!(out, "  end");
        }

        out.push('\n');
        let _ = writeln!(out, "  def install");
        let _ = writeln!(out, "    bin.install {}", ruby_string(&self.binary));
        let _ = writeln!(out, "  end");
        out.push('\n');
        let _ = writeln!(out, "  def caveats");
        let _ = writeln!(out, "    <<~EOS");
        for line in CAVEATS.lines() {
            let _ = writeln!(out, "      {line}");
        }
        let _ = writeln!(out, "    EOS");
        let _ = writeln!(out, "  end");
        out.push_str("end\n");
        out
    }
}

fn check_http_url(value: &str) -> Result<(), String> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(format!("unsupported scheme '{}'", url.scheme())),
        Err(err) => Err(format!("invalid url '{value}': {err}")),
    }
}

fn class_name(name: &str) -> String {
    name.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn ruby_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
