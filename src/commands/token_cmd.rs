use crate::cli::TokenAction;
use crate::home::{Home, HomePath};
use crate::token::{Token, TokenSource};
use crate::ui;
use anyhow::{Context, Result};
use std::io::{self, BufRead};

pub fn execute(home: &Home, action: TokenAction) -> Result<()> {
    match action {
        TokenAction::Set { token } => {
            let secret = match token {
                Some(token) => token,
                None => read_stdin_line()?,
            };
            Token::set(home, &secret)?;
            ui::success(
                "Saved",
                format!("GitHub token in {:?}", home.path(HomePath::Token)),
            );
            Ok(())
        }
        TokenAction::Clear => {
            if Token::clear(home)? {
                ui::success("Removed", "persisted GitHub token");
            } else {
                ui::info("No persisted GitHub token");
            }
            Ok(())
        }
        TokenAction::Status => {
            match Token::find(home)? {
                Some(token) => match token.source() {
                    TokenSource::File => ui::info(format!(
                        "GitHub token read from {:?}",
                        home.path(HomePath::Token)
                    )),
                    TokenSource::Environment => {
                        ui::info("GitHub token read from the GITHUB_TOKEN environment variable")
                    }
                },
                None => ui::warn("No GitHub token configured, run 'ghostie token set'"),
            }
            Ok(())
        }
    }
}

fn read_stdin_line() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read token from stdin")?;
    Ok(line)
}
