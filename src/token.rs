use anyhow::{bail, Context, Result};
use std::env;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::home::{Home, HomePath};

const TOKEN_ENV: &str = "GITHUB_TOKEN";
const TOKEN_PREFIX: &str = "GITHUB_TOKEN=";

/// Where a resolved token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    File,
    Environment,
}

/// A GitHub personal access token.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    secret: String,
    source: TokenSource,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("secret", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

impl Token {
    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn source(&self) -> TokenSource {
        self.source
    }

    /// Look up the token: persisted file first, then `$GITHUB_TOKEN`.
    pub fn find(home: &Home) -> Result<Option<Self>> {
        let token_file = home.path(HomePath::Token);
        if token_file.exists() {
            let contents = fs::read_to_string(&token_file)
                .with_context(|| format!("Failed to read token file {:?}", token_file))?;
            if let Some(secret) = parse_token_file(&contents) {
                return Ok(Some(Self {
                    secret,
                    source: TokenSource::File,
                }));
            }
        }

        Ok(env::var(TOKEN_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(|secret| Self {
                secret,
                source: TokenSource::Environment,
            }))
    }

    pub fn resolve(home: &Home) -> Result<Self> {
        match Self::find(home)? {
            Some(token) => Ok(token),
            None => bail!(
                "No GitHub token found. Run 'ghostie token set' or export {TOKEN_ENV}."
            ),
        }
    }

    pub fn is_set(home: &Home) -> Result<bool> {
        Ok(Self::find(home)?.is_some())
    }

    /// Persist the token in the home directory, readable by the owner only.
    pub fn set(home: &Home, secret: &str) -> Result<()> {
        let secret = secret.trim();
        if secret.is_empty() {
            bail!("Refusing to persist an empty GitHub token");
        }
        if secret.contains(char::is_whitespace) {
            bail!("GitHub token must not contain whitespace");
        }

        home.ensure()?;
        let token_file = home.path(HomePath::Token);
        if token_file.exists() {
            restrict_permissions(&token_file)?;
        }
        write_private(&token_file, &format!("{TOKEN_PREFIX}{secret}\n"))
            .with_context(|| format!("Failed to write token file {:?}", token_file))
    }

    /// Remove the persisted token. Returns whether a file was removed.
    pub fn clear(home: &Home) -> Result<bool> {
        let token_file = home.path(HomePath::Token);
        if !token_file.exists() {
            return Ok(false);
        }
        fs::remove_file(&token_file)
            .with_context(|| format!("Failed to remove token file {:?}", token_file))?;
        Ok(true)
    }
}

fn parse_token_file(contents: &str) -> Option<String> {
    contents
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.strip_prefix(TOKEN_PREFIX).unwrap_or(line).trim())
        .filter(|secret| !secret.is_empty())
        .map(str::to_string)
}

/// Write `contents` to a file that is created readable by the owner only.
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)?.write_all(contents.as_bytes())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to set permissions on {:?}", path))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
