use crate::daemon::Daemon;
use crate::home::Home;
use crate::ui;
use anyhow::Result;

pub fn execute(home: &Home) -> Result<()> {
    match Daemon::new(home).stop()? {
        Some(pid) => ui::success("Stopped", format!("ghostie background process (pid {pid})")),
        None => ui::info("ghostie is not running"),
    }
    Ok(())
}
