//! Full screen notification browser.

mod app;
mod view;

pub use app::{Action, App, StatefulList};
pub use view::format_age;

use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::Duration;
use tracing::debug;

use crate::cache::{Cache, Notification};

const TICK_RATE: Duration = Duration::from_millis(250);

/// Open the notification list. `on_open` runs after the user picked a notification and
/// it was handed to the browser; errors are shown in the status line.
pub fn run<F>(cache: &Cache, on_open: F) -> Result<()>
where
    F: FnMut(&Notification) -> Result<()>,
{
    let app = App::new(cache.read_all()?);

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, app, cache, on_open);
    ratatui::restore();

    result
}

fn event_loop<F>(
    terminal: &mut DefaultTerminal,
    mut app: App,
    cache: &Cache,
    mut on_open: F,
) -> Result<()>
where
    F: FnMut(&Notification) -> Result<()>,
{
    loop {
        terminal
            .draw(|frame| view::render(frame, &mut app, Utc::now()))
            .context("Failed to draw the terminal UI")?;

        if !event::poll(TICK_RATE).context("Failed to poll terminal events")? {
            continue;
        }

        let Event::Key(key) = event::read().context("Failed to read terminal event")? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.handle_key(key.code) {
            Action::Quit => return Ok(()),
            Action::Open => open_selected(
                &mut app,
                cache,
                crate::platform::open_in_browser,
                &mut on_open,
            )?,
            Action::None => {}
        }
    }
}

fn open_selected<O, F>(app: &mut App, cache: &Cache, open: O, on_open: &mut F) -> Result<()>
where
    O: FnOnce(&str) -> Result<()>,
    F: FnMut(&Notification) -> Result<()>,
{
    let Some(current) = app.list.current().cloned() else {
        return Ok(());
    };

    if let Err(err) = open(&current.url) {
        app.status = Some(format!("Could not open url: {} ({err:#})", current.url));
        return Ok(());
    }

    debug!("opened notification {}", current.id);
    cache.delete_by_id(&current.id)?;
    app.list.remove_current();
    app.status = match on_open(&current) {
        Ok(()) => None,
        Err(err) => Some(format!("{err:#}")),
    };
    Ok(())
}
