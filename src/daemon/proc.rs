use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, Signal, System};
use tracing::{debug, warn};

/// Tracks the background process through a pid file.
#[derive(Debug, Clone)]
pub struct ProcManager {
    pid_file: PathBuf,
}

impl ProcManager {
    pub fn new(pid_file: impl Into<PathBuf>) -> Self {
        Self {
            pid_file: pid_file.into(),
        }
    }

    pub fn pid_file(&self) -> &Path {
        &self.pid_file
    }

    /// The recorded pid if that process is still alive. Stale pid files are removed.
    pub fn running_pid(&self) -> Result<Option<u32>> {
        let Some(pid) = self.read_pid()? else {
            return Ok(None);
        };

        if is_alive(pid) {
            return Ok(Some(pid));
        }

        debug!("removing stale pid file for process {pid}");
        self.remove()?;
        Ok(None)
    }

    pub fn record(&self, pid: u32) -> Result<()> {
        if let Some(parent) = self.pid_file.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create pid directory {:?}", parent))?;
        }
        fs::write(&self.pid_file, pid.to_string())
            .with_context(|| format!("Failed to write pid file {:?}", self.pid_file))
    }

    /// Ask the recorded process to terminate. Returns the pid that was signalled.
    pub fn terminate(&self) -> Result<Option<u32>> {
        let Some(pid) = self.running_pid()? else {
            return Ok(None);
        };

        let mut system = System::new();
        let process_pid = Pid::from_u32(pid);
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[process_pid]),
            false,
            ProcessRefreshKind::nothing(),
        );

        match system.process(process_pid) {
            Some(process) => {
                if process.kill_with(Signal::Term).is_none() {
                    // SIGTERM is unsupported on this platform; fall back to a hard kill.
                    process.kill();
                }
            }
            None => debug!("process {pid} exited before it could be signalled"),
        }

        self.remove()?;
        Ok(Some(pid))
    }

    fn read_pid(&self) -> Result<Option<u32>> {
        if !self.pid_file.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.pid_file)
            .with_context(|| format!("Failed to read pid file {:?}", self.pid_file))?;
        let trimmed = contents.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        match trimmed.parse::<u32>() {
            Ok(pid) => Ok(Some(pid)),
            Err(err) => {
                warn!("ignoring malformed pid file {:?}: {err}", self.pid_file);
                self.remove()?;
                Ok(None)
            }
        }
    }

    fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.pid_file) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to remove pid file {:?}", self.pid_file))
            }
        }
    }
}

fn is_alive(pid: u32) -> bool {
    let mut system = System::new();
    let process_pid = Pid::from_u32(pid);
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[process_pid]),
        false,
        ProcessRefreshKind::nothing(),
    );
    system.process(process_pid).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // Far above any default pid_max, so never a live process.
    const DEAD_PID: u32 = 2_000_000_000;

    fn manager() -> (TempDir, ProcManager) {
        let temp = TempDir::new().unwrap();
        let manager = ProcManager::new(temp.path().join("ghostie.pid"));
        (temp, manager)
    }

    #[test]
    fn no_pid_file_means_not_running() {
        let (_temp, manager) = manager();
        assert_eq!(manager.running_pid().unwrap(), None);
        assert_eq!(manager.terminate().unwrap(), None);
    }

    #[test]
    fn live_pid_is_reported() {
        let (_temp, manager) = manager();
        let own_pid = std::process::id();
        manager.record(own_pid).unwrap();

        assert_eq!(manager.running_pid().unwrap(), Some(own_pid));
        assert!(manager.pid_file().exists());
    }

    #[test]
    fn stale_pid_file_is_removed() {
        let (_temp, manager) = manager();
        manager.record(DEAD_PID).unwrap();

        assert_eq!(manager.running_pid().unwrap(), None);
        assert!(!manager.pid_file().exists());
    }

    #[test]
    fn malformed_pid_file_is_removed() {
        let (_temp, manager) = manager();
        fs::write(manager.pid_file(), "not-a-pid").unwrap();

        assert_eq!(manager.running_pid().unwrap(), None);
        assert!(!manager.pid_file().exists());
    }

    #[cfg(unix)]
    #[test]
    fn terminate_stops_child_process() {
        let (_temp, manager) = manager();
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        manager.record(child.id()).unwrap();

        assert_eq!(manager.terminate().unwrap(), Some(child.id()));
        let status = child.wait().unwrap();
        assert!(!status.success());
        assert!(!manager.pid_file().exists());
    }
}
