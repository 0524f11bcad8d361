use anyhow::Result;
use clap::Parser;
use ghostie::cli::Cli;
use ghostie::commands;
use is_terminal::IsTerminal;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "ghostie=debug,info"
    } else {
        "ghostie=info,warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    // Execute command
    commands::execute(cli)
}
