use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const HOME_ENV: &str = "GHOSTIE_HOME";
const HOME_DIR_NAME: &str = ".ghostie";

/// Locations inside the ghostie home directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomePath {
    /// Home root: $GHOSTIE_HOME or ~/.ghostie
    Root,
    /// User configuration: home/config.toml
    Config,
    /// Notification cache: home/notifications.db
    Cache,
    /// Persisted GitHub token: home/github.token
    Token,
    /// Background process id: home/ghostie.pid
    PidFile,
    /// Background process stdout: home/daemon.out.log
    StdoutLog,
    /// Background process stderr: home/daemon.err.log
    StderrLog,
    /// Downloaded release archives: home/releases
    Releases,
}

/// Home - every file ghostie reads or writes lives under this directory.
#[derive(Debug, Clone)]
pub struct Home {
    root: PathBuf,
}

impl Home {
    /// Resolve the home directory from `$GHOSTIE_HOME`, falling back to `~/.ghostie`.
    pub fn from_env() -> Result<Self> {
        if let Some(root) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
            return Ok(Self::at(PathBuf::from(root)));
        }

        let base_dirs = directories::BaseDirs::new().context("Failed to get home directory")?;
        Ok(Self::at(base_dirs.home_dir().join(HOME_DIR_NAME)))
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, path_type: HomePath) -> PathBuf {
        match path_type {
            HomePath::Root => self.root.clone(),
            HomePath::Config => self.root.join("config.toml"),
            HomePath::Cache => self.root.join("notifications.db"),
            HomePath::Token => self.root.join("github.token"),
            HomePath::PidFile => self.root.join("ghostie.pid"),
            HomePath::StdoutLog => self.root.join("daemon.out.log"),
            HomePath::StderrLog => self.root.join("daemon.err.log"),
            HomePath::Releases => self.root.join("releases"),
        }
    }

    /// Create the home directory if it does not exist yet.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create ghostie home {:?}", self.root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn from_env_prefers_override() {
        let temp = TempDir::new().unwrap();
        env::set_var(HOME_ENV, temp.path());
        let home = Home::from_env().unwrap();
        env::remove_var(HOME_ENV);

        assert_eq!(home.root(), temp.path());
    }

    #[test]
    #[serial]
    fn from_env_ignores_empty_override() {
        env::set_var(HOME_ENV, "");
        let home = Home::from_env().unwrap();
        env::remove_var(HOME_ENV);

        assert!(home.root().ends_with(".ghostie"));
    }

    #[test]
    fn paths_live_under_root() {
        let home = Home::at("/tmp/ghostie-home");
        assert_eq!(
            home.path(HomePath::Cache),
            PathBuf::from("/tmp/ghostie-home/notifications.db")
        );
        assert_eq!(
            home.path(HomePath::Token),
            PathBuf::from("/tmp/ghostie-home/github.token")
        );
        for kind in [
            HomePath::Config,
            HomePath::PidFile,
            HomePath::StdoutLog,
            HomePath::StderrLog,
            HomePath::Releases,
        ] {
            assert!(home.path(kind).starts_with("/tmp/ghostie-home"));
        }
    }

    #[test]
    fn ensure_creates_root() {
        let temp = TempDir::new().unwrap();
        let home = Home::at(temp.path().join("nested/.ghostie"));
        home.ensure().unwrap();
        assert!(home.root().is_dir());
    }
}
