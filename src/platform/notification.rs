use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};

const APP_NAME: &str = "Ghostie";

/// Something that can surface a short message to the user outside the terminal.
pub trait Notifier {
    fn send(&self, message: &str, timeout: Duration);
}

/// Native desktop notifications: `notify-send` on Linux, `osascript` on macOS.
///
/// When the helper binary is not installed notifications are skipped.
#[derive(Debug, Clone, Default)]
pub struct DesktopNotifier {
    program: Option<PathBuf>,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        let name = if cfg!(target_os = "macos") {
            "osascript"
        } else {
            "notify-send"
        };

        let program = match which::which(name) {
            Ok(path) => Some(path),
            Err(err) => {
                debug!("desktop notifications disabled, {name} not found: {err}");
                None
            }
        };

        Self { program }
    }

    pub fn is_available(&self) -> bool {
        self.program.is_some()
    }
}

fn notify_send_args(message: &str, timeout: Duration) -> Vec<String> {
    vec![
        "-t".to_string(),
        timeout.as_millis().to_string(),
        "-a".to_string(),
        APP_NAME.to_string(),
        APP_NAME.to_string(),
        message.to_string(),
    ]
}

fn osascript_args(message: &str) -> Vec<String> {
    let escaped = message.replace('\\', "\\\\").replace('"', "\\\"");
    vec![
        "-e".to_string(),
        format!("display notification \"{escaped}\" with title \"{APP_NAME}\""),
    ]
}

impl Notifier for DesktopNotifier {
    fn send(&self, message: &str, timeout: Duration) {
        let Some(program) = &self.program else {
            return;
        };

        // macOS decides on its own how long a banner stays visible.
        let args = if cfg!(target_os = "macos") {
            osascript_args(message)
        } else {
            notify_send_args(message, timeout)
        };

        let status = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => debug!("desktop notification sent"),
            Ok(status) => warn!("desktop notification exited with {status}"),
            Err(err) => warn!("failed to run {}: {err}", program.display()),
        }
    }
}
