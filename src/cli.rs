use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ghostie - manage your GitHub notifications in the terminal
///
/// A background process polls the GitHub notifications API and keeps unseen
/// notifications in a local cache. Browse them with `ghostie view`, open one in
/// the browser, and it disappears from the list.
#[derive(Parser, Debug)]
#[command(name = "ghostie", author, about, long_about = None)]
#[command(subcommand_required = true, arg_required_else_help = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open UI to manage GitHub notifications
    #[command(short_flag = 'V')]
    View,

    /// Query the count of unread GitHub notifications
    #[command(short_flag = 'C')]
    Count,

    /// Fetch notifications once in the foreground
    Sync,

    /// Run ghostie as a background process
    Start,

    /// Stop the background process
    Stop,

    /// Show logs from the background process
    #[command(short_flag = 'L')]
    Logs,

    /// Clear logs from the background process
    #[command(name = "clear-logs")]
    ClearLogs,

    /// Prune notifications from the local cache
    #[command(short_flag = 'P')]
    Prune {
        /// Only remove notifications last updated more than DAYS days ago
        #[arg(long, value_name = "DAYS")]
        older_than: Option<u32>,
    },

    /// Manage the GitHub token
    #[command(subcommand)]
    Token(TokenAction),

    /// Print the shell integration that starts ghostie with every new shell
    Init {
        /// Shell type (auto-detects from $SHELL if not specified)
        #[arg(short, long, value_name = "SHELL")]
        shell: Option<String>,
    },

    /// Inspect, validate and install release builds
    #[command(subcommand)]
    Release(ReleaseAction),

    /// Run the polling loop in the foreground (used by `ghostie start`)
    #[command(name = "__poll", hide = true)]
    Poll,
}

#[derive(Subcommand, Debug)]
pub enum TokenAction {
    /// Persist a personal access token (reads stdin when omitted)
    Set {
        /// Token without a `token`/`bearer` prefix
        #[arg(value_name = "TOKEN")]
        token: Option<String>,
    },

    /// Remove the persisted token
    Clear,

    /// Show whether a token is configured and where it comes from
    Status,
}

#[derive(Subcommand, Debug)]
pub enum ReleaseAction {
    /// Show release metadata and the archive for this platform
    Info,

    /// Validate release metadata
    Check {
        /// Formula file to validate instead of the built-in one
        #[arg(short, long, value_name = "FILE")]
        formula: Option<PathBuf>,
    },

    /// Print the Homebrew formula
    Formula {
        /// Formula file to render instead of the built-in one
        #[arg(short, long, value_name = "FILE")]
        formula: Option<PathBuf>,
    },

    /// Download, verify and install the release binary for this platform
    Install {
        /// Directory to install the binary into (default ~/.local/bin)
        #[arg(long, value_name = "DIR")]
        bin_dir: Option<String>,

        /// Formula file to install from instead of the built-in one
        #[arg(short, long, value_name = "FILE")]
        formula: Option<PathBuf>,
    },
}
