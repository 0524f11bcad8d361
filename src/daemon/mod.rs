//! Lifecycle of the background polling process.

mod proc;

pub use proc::ProcManager;

use anyhow::{bail, Context, Result};
use std::env;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use crate::home::{Home, HomePath};

/// Hidden subcommand the detached child runs.
pub const POLL_SUBCOMMAND: &str = "__poll";
const EXECUTABLE_ENV: &str = "GHOSTIE_EXECUTABLE";

pub struct Daemon {
    home: Home,
    proc: ProcManager,
}

impl Daemon {
    pub fn new(home: &Home) -> Self {
        Self {
            home: home.clone(),
            proc: ProcManager::new(home.path(HomePath::PidFile)),
        }
    }

    pub fn running_pid(&self) -> Result<Option<u32>> {
        self.proc.running_pid()
    }

    /// Spawn the poller detached from the terminal and record its pid.
    pub fn start(&self) -> Result<u32> {
        if let Some(pid) = self.proc.running_pid()? {
            bail!("The background process is already running, process id: {pid}");
        }

        self.home.ensure()?;
        let executable = executable()?;
        let stdout_path = self.home.path(HomePath::StdoutLog);
        let stderr_path = self.home.path(HomePath::StderrLog);
        let stdout = create_log(&stdout_path)?;
        let stderr = create_log(&stderr_path)?;

        let mut cmd = Command::new(&executable);
        cmd.arg(POLL_SUBCOMMAND)
            .env("GHOSTIE_HOME", self.home.root())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // SAFETY: setsid is async-signal-safe and touches no parent state.
            unsafe {
                cmd.pre_exec(|| {
                    if libc::setsid() == -1 {
                        return Err(std::io::Error::last_os_error());
                    }
                    Ok(())
                });
            }
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn background process {:?}", executable))?;
        let pid = child.id();
        self.proc.record(pid)?;
        debug!("ghostie successfully started as a background process (pid {pid})");
        Ok(pid)
    }

    /// Returns the pid that was stopped, `None` when nothing was running.
    pub fn stop(&self) -> Result<Option<u32>> {
        let stopped = self.proc.terminate()?;
        if let Some(pid) = stopped {
            debug!("ghostie background process {pid} stopped by user");
        }
        Ok(stopped)
    }

    /// Background process output: stdout, followed by stderr when there is any.
    pub fn logs(&self) -> Result<String> {
        let stdout = read_log(&self.home.path(HomePath::StdoutLog))?;
        let stderr = read_log(&self.home.path(HomePath::StderrLog))?;

        if stderr.trim().is_empty() {
            return Ok(stdout);
        }

        let mut combined = stdout;
        if !combined.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&stderr);
        Ok(combined)
    }

    pub fn clear_logs(&self) -> Result<()> {
        for kind in [HomePath::StdoutLog, HomePath::StderrLog] {
            let path = self.home.path(kind);
            if path.exists() {
                create_log(&path)?;
            }
        }
        Ok(())
    }
}

fn executable() -> Result<PathBuf> {
    if let Some(path) = env::var_os(EXECUTABLE_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    env::current_exe().context("Failed to locate the ghostie executable")
}

fn create_log(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("Failed to create log file {:?}", path))
}

fn read_log(path: &Path) -> Result<String> {
    if !path.exists() {
        return Ok(String::new());
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read log file {:?}", path))
}
