use crate::cache::Cache;
use crate::home::{Home, HomePath};
use crate::platform::DesktopNotifier;
use crate::{poll, ui};
use anyhow::Result;

use super::{github_client, load_config, runtime};

pub fn execute(home: &Home) -> Result<()> {
    let config = load_config(home)?;
    let github = github_client(home, &config)?;
    let mut cache = Cache::open(&home.path(HomePath::Cache))?;
    let notifier = DesktopNotifier::new();

    let progress = ui::Progress::new("Syncing", "GitHub notifications");
    match runtime()?.block_on(poll::poll_once(&github, &mut cache, &notifier, &config)) {
        Ok(count) => {
            progress.success("Synced");
            ui::info(format!("{count} new, {} unread in total", cache.count()?));
            Ok(())
        }
        Err(err) => {
            progress.fail(format!("{err:#}"));
            Err(err)
        }
    }
}
