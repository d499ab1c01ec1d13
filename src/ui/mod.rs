pub mod client_wizard;
pub mod clients;
pub mod components;
pub mod prospect_wizard;
pub mod prospects;

use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Spans,
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

/// The two record views reachable from the navbar
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum View {
    Prospects,
    Clients,
}

pub fn render_navbar<B: Backend>(frame: &mut Frame<B>, area: Rect, active: View) {
    let titles = ["Prospects", "Clients"]
        .iter()
        .map(|t| Spans::from(*t))
        .collect();

    let selected = match active {
        View::Prospects => 0,
        View::Clients => 1,
    };

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title("Client & Prospect Management")
                .borders(Borders::ALL),
        )
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

/// One-line error banner; renders nothing when there is no message
pub fn render_error<B: Backend>(frame: &mut Frame<B>, area: Rect, error: Option<&str>) {
    if let Some(message) = error {
        let banner = Paragraph::new(message).style(Style::default().fg(Color::Red));
        frame.render_widget(banner, area);
    }
}

// Helper function to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Form text becomes `None` when left blank
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Appends or removes a character of a text field being edited
pub fn edit_text(value: &mut String, key: crossterm::event::KeyCode) {
    use crossterm::event::KeyCode;

    match key {
        KeyCode::Char(c) => value.push(c),
        KeyCode::Backspace => {
            value.pop();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  "), None);
        assert_eq!(non_empty(" Bole "), Some("Bole".to_string()));
    }

    #[test]
    fn test_edit_text() {
        let mut value = String::from("Ac");
        edit_text(&mut value, KeyCode::Char('m'));
        edit_text(&mut value, KeyCode::Char('e'));
        assert_eq!(value, "Acme");
        edit_text(&mut value, KeyCode::Backspace);
        edit_text(&mut value, KeyCode::Left);
        assert_eq!(value, "Acm");
    }
}
