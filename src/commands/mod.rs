use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::github::Github;
use crate::home::{Home, HomePath};
use crate::token::Token;
use anyhow::{Context, Result};
use tokio::runtime::Runtime;

mod count;
mod init;
mod logs;
mod poll_cmd;
mod prune;
mod release_cmd;
mod start;
mod stop;
mod sync;
mod token_cmd;
mod view;

pub fn execute(cli: Cli) -> Result<()> {
    // Every file ghostie touches lives under the home directory
    let home = Home::from_env()?;

    match cli.command {
        Commands::View => view::execute(&home),

        Commands::Count => count::execute(&home),

        Commands::Sync => sync::execute(&home),

        Commands::Start => start::execute(&home),

        Commands::Stop => stop::execute(&home),

        Commands::Logs => logs::execute(&home),

        Commands::ClearLogs => logs::clear(&home),

        Commands::Prune { older_than } => prune::execute(&home, older_than),

        Commands::Token(action) => token_cmd::execute(&home, action),

        Commands::Init { shell } => init::execute(shell),

        Commands::Release(action) => release_cmd::execute(&home, action),

        Commands::Poll => poll_cmd::execute(&home),
    }
}

fn load_config(home: &Home) -> Result<Config> {
    Config::load(&home.path(HomePath::Config))
}

/// GitHub client for the configured API, failing early when no token is available.
fn github_client(home: &Home, config: &Config) -> Result<Github> {
    let token = Token::resolve(home)?;
    Github::with_host(&config.api_url, &token).context("Failed to create GitHub client")
}

fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}
