use crate::cache::Cache;
use crate::home::{Home, HomePath};
use crate::tui;
use anyhow::{Context, Result};

use super::{github_client, load_config, runtime};

pub fn execute(home: &Home) -> Result<()> {
    let config = load_config(home)?;
    let cache = Cache::open(&home.path(HomePath::Cache))?;

    if !config.mark_read_on_open {
        return tui::run(&cache, |_| Ok(()));
    }

    let github = github_client(home, &config)?;
    let runtime = runtime()?;
    tui::run(&cache, |notification| {
        runtime
            .block_on(github.notifications().mark_as_read(&notification.id))
            .with_context(|| format!("Failed to mark {} as read on GitHub", notification.id))
    })
}
