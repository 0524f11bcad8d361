use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const DEFAULT_API_URL: &str = "https://api.github.com/";
const MIN_POLL_INTERVAL_SECS: u64 = 10;
const MAX_POLL_INTERVAL_SECS: u64 = 24 * 60 * 60;
// GitHub only keeps notifications for a few months.
const MAX_LOOKBACK_DAYS: i64 = 365;

/// User settings read from `config.toml` in the ghostie home.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds between two polls of the notifications endpoint.
    pub poll_interval_secs: u64,
    /// How far back each poll asks GitHub for notifications.
    pub lookback_days: i64,
    /// How long the desktop notification stays on screen.
    pub notification_timeout_ms: u64,
    pub desktop_notifications: bool,
    /// Base URL of the GitHub REST API, with trailing slash.
    pub api_url: String,
    /// Also mark the thread as read on GitHub when it is opened from `view`.
    pub mark_read_on_open: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            lookback_days: 2,
            notification_timeout_ms: 3000,
            desktop_notifications: true,
            api_url: DEFAULT_API_URL.to_string(),
            mark_read_on_open: false,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file {:?}", path))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            toml::to_string_pretty(self).context("Failed to serialize ghostie config file")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {:?}", path))?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.poll_interval_secs
                .clamp(MIN_POLL_INTERVAL_SECS, MAX_POLL_INTERVAL_SECS),
        )
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(self.notification_timeout_ms)
    }

    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::days(self.lookback_days.clamp(0, MAX_LOOKBACK_DAYS))
    }
}
