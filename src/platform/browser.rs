use anyhow::{bail, Context, Result};
use std::process::{Command, Stdio};

fn opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

/// Open `url` with the system's default browser.
pub fn open_in_browser(url: &str) -> Result<()> {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        bail!("Refusing to open non-http url '{url}'");
    }

    let program = which::which(opener())
        .with_context(|| format!("'{}' is required to open urls in a browser", opener()))?;

    // The opener returns immediately; its own output would corrupt the terminal UI.
    Command::new(&program)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to run {}", program.display()))?;
    Ok(())
}
