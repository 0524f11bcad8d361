use crossterm::event::KeyCode;
use ratatui::widgets::ListState;

use crate::cache::Notification;

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Open,
}

/// A list of items with a wrapping selection.
#[derive(Debug)]
pub struct StatefulList<T> {
    pub state: ListState,
    pub items: Vec<T>,
}

impl<T> StatefulList<T> {
    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            state: ListState::default(),
            items,
        }
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn unselect(&mut self) {
        self.state.select(None);
    }

    pub fn current(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    /// Remove the selected item, keeping the selection on the same row where possible.
    pub fn remove_current(&mut self) -> Option<T> {
        let index = self.state.selected().filter(|i| *i < self.items.len())?;
        let removed = self.items.remove(index);

        if self.items.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(index.min(self.items.len() - 1)));
        }
        Some(removed)
    }
}

pub struct App {
    pub list: StatefulList<Notification>,
    /// One line of feedback shown above the key help, e.g. a failed browser launch.
    pub status: Option<String>,
}

impl App {
    pub fn new(notifications: Vec<Notification>) -> Self {
        let mut list = StatefulList::with_items(notifications);
        list.next();
        Self { list, status: None }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('c') | KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Left => {
                self.list.unselect();
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.list.next();
                Action::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.list.previous();
                Action::None
            }
            KeyCode::Enter => Action::Open,
            _ => Action::None,
        }
    }
}
