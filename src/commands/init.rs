use crate::release::Formula;
use crate::shell::Shell;
use anyhow::{bail, Result};

pub fn execute(shell: Option<String>) -> Result<()> {
    let shell = match shell {
        Some(name) => match Shell::from_name(&name) {
            Some(shell) => shell,
            None => bail!("Unsupported shell '{name}' (expected zsh, bash or fish)"),
        },
        None => match Shell::detect() {
            Some(shell) => shell,
            None => bail!("Could not detect shell from $SHELL, pass --shell"),
        },
    };

    println!("# Shell: {shell} ({})", shell.rc_file());
    println!("{}", Formula::ghostie().caveats_for(shell));
    Ok(())
}
