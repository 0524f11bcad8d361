use anyhow::{Context, Result};
use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::cache::{Cache, Notification};
use crate::config::Config;
use crate::github::{Github, GithubError};
use crate::platform::Notifier;

/// Fetch recent notifications, store the ones not cached yet and announce them.
///
/// Returns how many new notifications were stored.
pub async fn poll_once(
    github: &Github,
    cache: &mut Cache,
    notifier: &dyn Notifier,
    config: &Config,
) -> Result<usize> {
    let since = Utc::now() - config.lookback();
    let fetched = github
        .notifications()
        .list()
        .since(since)
        .fetch()
        .await
        .context("Failed to fetch notifications")?;
    debug!(fetched = fetched.len(), %since, "fetched notifications");

    let cached = cache.ids()?;
    let fresh: Vec<Notification> = fetched
        .into_iter()
        .filter(|notification| !cached.contains(&notification.id))
        .map(Notification::from)
        .collect();

    cache
        .write_batch(&fresh)
        .context("Failed to write to the cache")?;

    let count = fresh.len();
    if count > 0 && config.desktop_notifications {
        notifier.send(
            &format!("{count} new notifications"),
            config.notification_timeout(),
        );
    }

    info!("Found {count} new notifications");
    Ok(count)
}

/// Poll on a fixed interval until ctrl-c or SIGTERM.
///
/// Failed cycles are logged and retried on the next tick, except a rejected token which
/// ends the loop.
pub async fn run(
    github: &Github,
    cache: &mut Cache,
    notifier: &dyn Notifier,
    config: &Config,
) -> Result<()> {
    info!(
        "polling GitHub notifications every {}s",
        config.poll_interval().as_secs()
    );
    run_until(
        github,
        cache,
        notifier,
        config,
        config.poll_interval(),
        shutdown_signal(),
    )
    .await
}

async fn run_until<F>(
    github: &Github,
    cache: &mut Cache,
    notifier: &dyn Notifier,
    config: &Config,
    period: Duration,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("ghostie background process stopped");
                return Ok(());
            }
            _ = ticker.tick() => {
                if let Err(err) = poll_once(github, cache, notifier, config).await {
                    if matches!(err.downcast_ref::<GithubError>(), Some(GithubError::Unauthorized)) {
                        return Err(err);
                    }
                    error!("{err:#}");
                }
            }
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(err) => {
            error!("failed to install SIGTERM handler: {err}");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
