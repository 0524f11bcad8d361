use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::app::App;
use crate::cache::Notification;

const HELP: &str =
    "    (↑/k) scroll up    (↓/j) scroll down    (q/esc) quit    (enter) open in browser    ";
const DARK_GREEN: Color = Color::Rgb(34, 139, 34);

/// Human readable age: hours for the first two days, days afterwards.
pub fn format_age(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = (now - updated_at).max(chrono::Duration::zero());

    if age.num_hours() <= 48 {
        return format!("{} hours", age.num_hours());
    }

    format!("{} days", age.num_days())
}

fn list_item(index: usize, notification: &Notification, now: DateTime<Utc>) -> ListItem<'static> {
    let lines = vec![
        Line::from(Span::styled(
            format!(
                "({}) [{}] {}",
                index + 1,
                notification.kind.to_lowercase(),
                notification.subject
            ),
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(DARK_GREEN),
        )),
        Line::from(format!(
            "{} ⏰ {} ago",
            notification.name,
            format_age(notification.updated_at, now)
        )),
    ];
    ListItem::new(lines).style(Style::default().fg(Color::White))
}

pub fn render(frame: &mut Frame, app: &mut App, now: DateTime<Utc>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(90), Constraint::Percentage(10)])
        .vertical_margin(2)
        .horizontal_margin(4)
        .split(frame.area());

    let total = app.list.items.len();
    let items: Vec<ListItem> = app
        .list
        .items
        .iter()
        .enumerate()
        .map(|(index, notification)| list_item(index, notification, now))
        .collect();

    let title = Line::from(Span::styled(
        format!(" ghostie - Showing {total} notifications "),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("👉");
    frame.render_stateful_widget(list, chunks[0], &mut app.list.state);

    let mut footer = vec![Line::from(Span::styled(
        HELP,
        Style::default().add_modifier(Modifier::BOLD).fg(Color::Green),
    ))];
    if let Some(status) = &app.status {
        footer.insert(
            0,
            Line::from(Span::styled(status.clone(), Style::default().fg(Color::Yellow))),
        );
    }
    frame.render_widget(Paragraph::new(footer), chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::a_notification;
    use chrono::{Duration, TimeZone};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 11, 23, 12, 0, 0).unwrap()
    }

    #[test]
    fn age_in_hours_up_to_two_days() {
        assert_eq!(format_age(now() - Duration::minutes(30), now()), "0 hours");
        assert_eq!(format_age(now() - Duration::hours(5), now()), "5 hours");
        assert_eq!(format_age(now() - Duration::hours(48), now()), "48 hours");
    }

    #[test]
    fn age_in_days_afterwards() {
        assert_eq!(format_age(now() - Duration::hours(49), now()), "2 days");
        assert_eq!(format_age(now() - Duration::days(9), now()), "9 days");
    }

    #[test]
    fn age_in_the_future_is_zero() {
        assert_eq!(format_age(now() + Duration::hours(3), now()), "0 hours");
    }

    fn rendered(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(110, 30)).unwrap();
        terminal.draw(|frame| render(frame, app, now())).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn renders_title_and_items() {
        let mut app = App::new(vec![
            a_notification("1", now() - Duration::hours(3)),
            a_notification("2", now() - Duration::days(4)),
        ]);
        let screen = rendered(&mut app);

        assert!(screen.contains("ghostie - Showing 2 notifications"));
        assert!(screen.contains("(1) [pullrequest] I need review"));
        assert!(screen.contains("3 hours ago"));
        assert!(screen.contains("4 days ago"));
        assert!(screen.contains("(q/esc) quit"));
    }

    #[test]
    fn renders_status_line() {
        let mut app = App::new(Vec::new());
        app.status = Some("Could not open url".to_string());
        let screen = rendered(&mut app);

        assert!(screen.contains("Showing 0 notifications"));
        assert!(screen.contains("Could not open url"));
    }
}
