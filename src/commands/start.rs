use crate::daemon::Daemon;
use crate::home::Home;
use crate::token::Token;
use crate::ui;
use anyhow::Result;

pub fn execute(home: &Home) -> Result<()> {
    // The child would only exit on its first poll without a token
    Token::resolve(home)?;

    let daemon = Daemon::new(home);
    if let Some(pid) = daemon.running_pid()? {
        ui::info(format!("ghostie is already running (pid {pid})"));
        return Ok(());
    }

    let pid = daemon.start()?;
    ui::success("Started", format!("ghostie background process (pid {pid})"));
    Ok(())
}
