// Public API
pub mod cli;
pub mod commands;

// Core domain types
pub mod cache;
pub mod config;
pub mod daemon;
pub mod github;
pub mod home;
pub mod platform;
pub mod poll;
pub mod release;
pub mod shell;
pub mod token;
pub mod tui;
mod ui;

// Re-export main types
pub use cache::{Cache, Notification};
pub use config::Config;
pub use daemon::Daemon;
pub use github::{Github, GithubError};
pub use home::{Home, HomePath};
pub use platform::Platform;
pub use release::{Formula, ReleaseError};
pub use shell::Shell;
pub use token::Token;
