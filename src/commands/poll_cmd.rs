use crate::cache::Cache;
use crate::home::{Home, HomePath};
use crate::platform::DesktopNotifier;
use crate::poll;
use anyhow::Result;
use tracing::warn;

use super::{github_client, load_config, runtime};

pub fn execute(home: &Home) -> Result<()> {
    let config = load_config(home)?;
    let github = github_client(home, &config)?;
    let mut cache = Cache::open(&home.path(HomePath::Cache))?;

    let notifier = DesktopNotifier::new();
    if config.desktop_notifications && !notifier.is_available() {
        warn!("no desktop notifier found, new notifications will only be cached");
    }

    runtime()?.block_on(poll::run(&github, &mut cache, &notifier, &config))
}
