use crate::daemon::Daemon;
use crate::home::Home;
use crate::ui;
use anyhow::Result;

pub fn execute(home: &Home) -> Result<()> {
    let logs = Daemon::new(home).logs()?;
    if logs.trim().is_empty() {
        ui::info("No logs yet");
    } else {
        print!("{logs}");
    }
    Ok(())
}

pub fn clear(home: &Home) -> Result<()> {
    Daemon::new(home).clear_logs()?;
    ui::success("Cleared", "background process logs");
    Ok(())
}
