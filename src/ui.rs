use anstyle::{AnsiColor, Style};
use is_terminal::IsTerminal;
use std::fmt::Display;
use std::io::{self, Write};
use std::time::{Duration, Instant};

const STATUS_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy)]
enum StatusKind {
    Pending,
    Success,
    Info,
    Warn,
    Error,
}

impl StatusKind {
    fn to_stderr(self) -> bool {
        matches!(self, StatusKind::Warn | StatusKind::Error)
    }

    fn style(self) -> Style {
        let style = Style::new().bold();
        match self {
            StatusKind::Pending => style.fg_color(Some(AnsiColor::Cyan.into())),
            StatusKind::Success => style.fg_color(Some(AnsiColor::Green.into())),
            StatusKind::Info => style.fg_color(Some(AnsiColor::Blue.into())),
            StatusKind::Warn => style.fg_color(Some(AnsiColor::Yellow.into())),
            StatusKind::Error => style.fg_color(Some(AnsiColor::Red.into())),
        }
    }
}

fn supports_color(is_terminal: bool) -> bool {
    is_terminal && std::env::var_os("NO_COLOR").is_none()
}

fn render_status(kind: StatusKind, label: &str, message: &str, color: bool) -> String {
    let padded_label = format!("{:>width$}", label, width = STATUS_WIDTH);

    let (prefix, suffix) = if color {
        let style = kind.style();
        (style.render().to_string(), style.render_reset().to_string())
    } else {
        (String::new(), String::new())
    };

    let mut rendered = String::new();
    for (idx, line) in message.split('\n').enumerate() {
        if idx == 0 {
            rendered.push_str(&format!("{prefix}{padded_label}{suffix} {line}\n"));
        } else {
            rendered.push_str(&format!("{:>width$} {line}\n", "", width = STATUS_WIDTH));
        }
    }
    rendered
}

fn write_status(kind: StatusKind, label: &str, message: &str) {
    // Status output is best effort; a closed pipe must not abort the command.
    if kind.to_stderr() {
        let stderr = io::stderr();
        let rendered = render_status(kind, label, message, supports_color(stderr.is_terminal()));
        let mut handle = stderr.lock();
        let _ = handle.write_all(rendered.as_bytes());
        let _ = handle.flush();
    } else {
        let stdout = io::stdout();
        let rendered = render_status(kind, label, message, supports_color(stdout.is_terminal()));
        let mut handle = stdout.lock();
        let _ = handle.write_all(rendered.as_bytes());
        let _ = handle.flush();
    }
}

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 60 {
        let minutes = duration.as_secs() / 60;
        let seconds = duration.as_secs() % 60;
        if seconds == 0 {
            format!("{minutes}m")
        } else {
            format!("{minutes}m {seconds}s")
        }
    } else if duration.as_secs_f64() >= 1.0 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if duration.as_millis() >= 1 {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{}µs", duration.as_micros())
    }
}

pub fn info(message: impl Display) {
    write_status(StatusKind::Info, "Info", &message.to_string());
}

pub fn warn(message: impl Display) {
    write_status(StatusKind::Warn, "Warning", &message.to_string());
}

pub fn error(message: impl Display) {
    write_status(StatusKind::Error, "Error", &message.to_string());
}

pub fn success(label: &str, message: impl Display) {
    write_status(StatusKind::Success, label, &message.to_string());
}

/// A long running step that reports its elapsed time when it finishes.
pub struct Progress {
    message: String,
    started: Instant,
    complete: bool,
}

impl Progress {
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Self {
        let label = label.into();
        let message = message.into();
        write_status(StatusKind::Pending, &label, &message);

        Self {
            message,
            started: Instant::now(),
            complete: false,
        }
    }

    pub fn success(mut self, label: &str) {
        self.complete = true;
        let elapsed = format_duration(self.started.elapsed());
        write_status(
            StatusKind::Success,
            label,
            &format!("{} in {elapsed}", self.message),
        );
    }

    pub fn fail(mut self, error: impl Display) {
        self.complete = true;
        let elapsed = format_duration(self.started.elapsed());
        write_status(
            StatusKind::Error,
            "Failed",
            &format!("{} after {elapsed}: {error}", self.message),
        );
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if !self.complete {
            let combined = format!("{} (aborted)", self.message);
            write_status(StatusKind::Warn, "Cancelled", &combined);
            self.complete = true;
        }
    }
}
