use std::env;
use std::fmt;

/// Shells ghostie knows how to integrate with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Zsh,
    Bash,
    Fish,
}

impl Shell {
    pub const ALL: [Shell; 3] = [Shell::Zsh, Shell::Bash, Shell::Fish];

    pub fn from_name(name: &str) -> Option<Self> {
        // Accept full paths such as /bin/zsh as found in $SHELL.
        let name = name.rsplit('/').next().unwrap_or(name);
        match name.to_lowercase().as_str() {
            "zsh" => Some(Shell::Zsh),
            "bash" => Some(Shell::Bash),
            "fish" => Some(Shell::Fish),
            _ => None,
        }
    }

    /// Detect the user's shell from `$SHELL`.
    pub fn detect() -> Option<Self> {
        env::var("SHELL").ok().and_then(|value| Self::from_name(&value))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Shell::Zsh => "zsh",
            Shell::Bash => "bash",
            Shell::Fish => "fish",
        }
    }

    /// Startup file the integration snippet belongs in, relative to `$HOME`.
    pub fn rc_file(self) -> &'static str {
        match self {
            Shell::Zsh => "~/.zshrc",
            Shell::Bash => "~/.bashrc",
            Shell::Fish => "~/.config/fish/config.fish",
        }
    }

    /// Lines that start the background poller whenever a new shell opens.
    ///
    /// `ghostie start` refuses to start a second process, so running this from every
    /// shell is safe.
    pub fn snippet(self) -> String {
        match self {
            Shell::Zsh | Shell::Bash => {
                "# ghostie: keep GitHub notifications polling in the background\n\
                 if command -v ghostie >/dev/null 2>&1; then\n  \
                 ghostie start >/dev/null 2>&1\n\
                 fi"
                .to_string()
            }
            Shell::Fish => "# ghostie: keep GitHub notifications polling in the background\n\
                 if command -q ghostie\n    \
                 ghostie start >/dev/null 2>&1\n\
                 end"
            .to_string(),
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
